//! Result type alias for Shortfall
//!
//! This module provides a convenient Result type alias that uses
//! ShortfallError as the error type.

use super::errors::ShortfallError;

/// Result type alias for Shortfall operations
///
/// This is a convenience type alias that uses `ShortfallError` as the error
/// type. Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use shortfall::domain::result::Result;
/// use shortfall::domain::errors::ShortfallError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ShortfallError::Parse("malformed payload".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ShortfallError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ShortfallError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(ShortfallError::Etl("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
