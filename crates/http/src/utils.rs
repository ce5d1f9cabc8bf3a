//! Crate internal helper macros.

/// Returns early with `$error` unless `$predicate` holds.
///
/// Reads like `assert!`, but for conditions that depend on peer input and therefore must
/// surface as an error instead of a panic.
///
/// ```ignore
/// ensure!(header_count <= MAX_HEADER_NUM, ParseError::too_many_headers(header_count));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
