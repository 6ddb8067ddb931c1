//! Internal helpers.

/// Returns early with `$error` when `$predicate` does not hold.
///
/// ```ignore
/// ensure!(!self.method.is_empty(), ParseError::malformed("missing method"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
