//! Deterministic record identification
//!
//! Record ids are derived from content: a SHA-256 hash over the five identity
//! fields, with a fixed-width prefix interpreted as an unsigned integer.
//! Identical key fields always produce the same base id, so re-fetching an
//! overlapping window reproduces the ids of already-stored records and the
//! store-level upsert deduplicates them.
//!
//! When two records with *different* content hash to the same base id, the id
//! is probed linearly (`id + 1`) until a free slot is found in the
//! caller-supplied set of live ids. This is a cheap collision-mitigation
//! scheme, not a cryptographic primitive; callers must reload the live id set
//! from the stores at the start of every run.

use crate::domain::RawUpdateRecord;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Number of hash bytes interpreted as the base id (48 bits)
///
/// Keeps every id, and any linearly probed successor, comfortably inside a
/// signed 64-bit store column.
const ID_PREFIX_BYTES: usize = 6;

/// Canonical identity key of a record
///
/// The ordered `|`-joined concatenation of the five fields that make a
/// report unique: generic name, company, presentation, update date, NDC.
pub fn identity_key(record: &RawUpdateRecord) -> String {
    [
        record.generic_name.as_str(),
        record.company_name.as_str(),
        record.presentation.as_str(),
        &record.update_date.format("%Y-%m-%d").to_string(),
        record.ndc.as_str(),
    ]
    .join("|")
}

/// Base id for a record: a 48-bit prefix of the SHA-256 of its identity key
pub fn base_id(record: &RawUpdateRecord) -> u64 {
    let digest = Sha256::digest(identity_key(record).as_bytes());
    let mut bytes = [0u8; 8];
    bytes[8 - ID_PREFIX_BYTES..].copy_from_slice(&digest[..ID_PREFIX_BYTES]);
    u64::from_be_bytes(bytes)
}

/// Assigns a free id to a record, registering it in `existing_ids`
///
/// Starts from the record's base id and probes `id + 1` until a slot not
/// present in `existing_ids` is found. The returned id is inserted into the
/// set before returning.
pub fn assign_id(record: &RawUpdateRecord, existing_ids: &mut HashSet<u64>) -> u64 {
    let mut id = base_id(record);
    while !existing_ids.insert(id) {
        id += 1;
    }
    id
}
