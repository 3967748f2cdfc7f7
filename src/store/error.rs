use thiserror::Error;

/// Error produced when a stored option value cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode error at byte {offset}: {message}")]
pub struct DecodeError {
    offset: usize,
    message: String,
}

impl DecodeError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    /// Byte offset into the input where decoding stopped.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised by an [`OptionStore`](super::OptionStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to write option `{name}`: {message}")]
    Write { name: String, message: String },

    #[error("failed to delete option `{name}`: {message}")]
    Delete { name: String, message: String },

    #[error("option fixture is not a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        let err = DecodeError::new(7, "expected `;`");
        assert_eq!(err.to_string(), "decode error at byte 7: expected `;`");
        assert_eq!(err.offset(), 7);
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::Write {
            name: "woo_shop_manager_conditions".into(),
            message: "read-only".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write option `woo_shop_manager_conditions`: read-only"
        );

        let err: StoreError = DecodeError::new(0, "empty input").into();
        assert_eq!(err.to_string(), "decode error at byte 0: empty input");
        assert_eq!(
            StoreError::NotAnObject.to_string(),
            "option fixture is not a JSON object"
        );
    }
}
