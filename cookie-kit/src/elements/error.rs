//! Element error types

use thiserror::Error;

use crate::map::MapError;

/// Errors raised while defining, constructing or mounting custom elements.
#[derive(Error, Debug)]
pub enum ElementError {
    /// A `{` or `[` prefixed attribute value that is not valid JSON.
    ///
    /// Fatal to the construction of the element carrying the attribute.
    #[error("attribute `{name}` holds malformed JSON: {source}")]
    MalformedAttribute {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The tag name is not a valid custom element name
    #[error("`{0}` is not a valid custom element name")]
    InvalidTagName(String),

    /// The tag name already has a definition
    #[error("`{0}` has already been defined")]
    AlreadyDefined(String),

    /// A prop is present but has the wrong shape for the widget reading it
    #[error("prop `{name}` must be {expected}")]
    InvalidProp { name: String, expected: &'static str },

    /// Map library failure, propagated as is
    #[error(transparent)]
    Map(#[from] MapError),
}

impl ElementError {
    pub(crate) fn invalid_prop(name: impl Into<String>, expected: &'static str) -> Self {
        ElementError::InvalidProp {
            name: name.into(),
            expected,
        }
    }
}

/// Result type for element operations
pub type Result<T> = std::result::Result<T, ElementError>;
