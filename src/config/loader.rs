//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ShortfallConfig;
use crate::domain::errors::ShortfallError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ShortfallConfig
/// 4. Applies environment variable overrides (SHORTFALL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use shortfall::config::loader::load_config;
///
/// let config = load_config("shortfall.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ShortfallConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ShortfallError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ShortfallError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ShortfallConfig = toml::from_str(&contents)
        .map_err(|e| ShortfallError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ShortfallError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ShortfallError::Other(e.to_string()))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ShortfallError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the SHORTFALL_* prefix
///
/// Environment variables follow the pattern: SHORTFALL_<SECTION>_<KEY>
/// For example: SHORTFALL_OPENFDA_BASE_URL, SHORTFALL_APPLICATION_LOG_LEVEL
fn apply_env_overrides(config: &mut ShortfallConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("SHORTFALL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SHORTFALL_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // OpenFDA overrides
    if let Ok(val) = std::env::var("SHORTFALL_OPENFDA_BASE_URL") {
        config.openfda.base_url = val;
    }
    if let Ok(val) = std::env::var("SHORTFALL_OPENFDA_DAYS_BACK") {
        if let Ok(days) = val.parse() {
            config.openfda.days_back = days;
        }
    }
    if let Ok(val) = std::env::var("SHORTFALL_OPENFDA_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.openfda.limit = limit;
        }
    }
    if let Ok(val) = std::env::var("SHORTFALL_OPENFDA_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.openfda.timeout_seconds = timeout;
        }
    }

    // Postgres overrides (only if a postgres section is configured)
    if let Some(ref mut pg_config) = config.postgres {
        if let Ok(val) = std::env::var("SHORTFALL_POSTGRES_CONNECTION_STRING") {
            pg_config.connection_string = crate::config::secret_string(val);
        }
        if let Ok(val) = std::env::var("SHORTFALL_POSTGRES_MAX_CONNECTIONS") {
            if let Ok(max) = val.parse() {
                pg_config.max_connections = max;
            }
        }
    }

    // ETL overrides
    if let Ok(val) = std::env::var("SHORTFALL_ETL_RUN_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.etl.run_timeout_seconds = timeout;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SHORTFALL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SHORTFALL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
