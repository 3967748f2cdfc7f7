use thiserror::Error;

use crate::store::{DecodeError, StoreError};

/// Unified error type covering option decoding, storage, fixtures and I/O.
///
/// Returned by convenience loaders like
/// [`Snapshot::from_options_json()`](crate::Snapshot::from_options_json) and
/// [`Snapshot::from_file()`](crate::Snapshot::from_file).
#[derive(Debug, Error)]
pub enum ShopRulesError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OptionValue;

    #[test]
    fn wraps_underlying_errors() {
        let decode = OptionValue::from_php_serialized("q").unwrap_err();
        let err = ShopRulesError::from(decode.clone());
        assert_eq!(err.to_string(), decode.to_string());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "options.json");
        assert_eq!(ShopRulesError::from(io).to_string(), "options.json");
    }
}
