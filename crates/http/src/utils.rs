//! Crate internal helper macros.

/// Returns early with `$error` unless `$predicate` holds.
///
/// Like `assert!`, but for validation of untrusted input where a failure is
/// an error value rather than a bug.
///
/// ```ignore
/// ensure!(is_token(name), ParseError::malformed_field_name(name));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
