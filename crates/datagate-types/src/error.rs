//! Unified error interface.
//!
//! Every error type in the gateway implements [`ErrorCode`] so the
//! transport and observability layers can classify failures without
//! matching on concrete enums:
//!
//! - **Machine-readable codes** in `UPPER_SNAKE_CASE`, stable across
//!   versions (changing one is an API break)
//! - **Recoverability**: whether a retry of the same request can succeed
//!
//! # Example
//!
//! ```
//! use datagate_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum PoolError {
//!     Exhausted,
//!     Misconfigured,
//! }
//!
//! impl ErrorCode for PoolError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Exhausted => "POOL_EXHAUSTED",
//!             Self::Misconfigured => "POOL_MISCONFIGURED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Exhausted)
//!     }
//! }
//!
//! assert_eq!(PoolError::Exhausted.code(), "POOL_EXHAUSTED");
//! ```

/// Machine-readable error classification.
///
/// # Recoverability
///
/// An error is recoverable when retrying the identical request may
/// succeed (transient backend failure, timeout). Errors caused by the
/// request itself (malformed command, unknown dataset, missing
/// permission) are not: the client must change something first.
pub trait ErrorCode {
    /// Returns the stable `UPPER_SNAKE_CASE` code, optionally prefixed
    /// with a domain (e.g. `GATEWAY_`, `ACCESS_`).
    fn code(&self) -> &'static str;

    /// Returns whether retrying the same request can succeed.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows the gateway conventions:
/// non-empty, carries the expected prefix, and is `UPPER_SNAKE_CASE`.
///
/// # Panics
///
/// Panics with a descriptive message if validation fails; intended for
/// use in tests covering all variants of an error enum.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();
    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Validates every error in the slice; use with all variants of an enum.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
