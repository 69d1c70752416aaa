use thiserror::Error;

use super::tree::TreeError;

/// Why a document could not be mapped onto the model.
///
/// Only [`MissingRequiredField`](ParseError::MissingRequiredField) at
/// document scope, [`TreeStructure`](ParseError::TreeStructure) and
/// [`UnsupportedFormat`](ParseError::UnsupportedFormat) ever reach callers of
/// [`parse`](crate::feed::parse). The other variants describe field-level
/// defects that the mappers degrade to "absent" and log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A structurally required element or attribute is absent.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// A value is present but does not have the expected shape.
    #[error("malformed value at {path}: expected {expected}")]
    MalformedValue { path: String, expected: &'static str },

    /// A value lies outside a closed vocabulary (relations, weekdays, ...).
    #[error("unknown value {raw:?} at {path}")]
    UnknownEnumValue { path: String, raw: String },

    /// The markup itself could not be turned into a tree.
    #[error(transparent)]
    TreeStructure(#[from] TreeError),

    /// The root element is neither `<rss>` nor `<feed>`.
    #[error("unsupported document root <{0}>")]
    UnsupportedFormat(String),
}

impl ParseError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        ParseError::MissingRequiredField(path.into())
    }

    pub(crate) fn malformed(path: impl Into<String>, expected: &'static str) -> Self {
        ParseError::MalformedValue {
            path: path.into(),
            expected,
        }
    }

    pub(crate) fn unknown(path: impl Into<String>, raw: impl Into<String>) -> Self {
        ParseError::UnknownEnumValue {
            path: path.into(),
            raw: raw.into(),
        }
    }
}
