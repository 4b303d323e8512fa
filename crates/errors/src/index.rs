//! Package index error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum IndexError {
    #[error("failed to decompress metadata from {url}: {message}")]
    Decompress { url: String, message: String },
}

impl UserFacingError for IndexError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Decompress { .. } => {
                Some("The mirror served a truncated or corrupt index; other mirrors are unaffected.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::Decompress { .. } => Some("index.decompress"),
        }
    }
}
