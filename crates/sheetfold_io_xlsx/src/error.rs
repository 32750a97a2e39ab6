//! Error taxonomy shared by the encode/decode pipeline.

use thiserror::Error;

/// Boxed collaborator error kept as `source()`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SheetfoldError>;

#[derive(Debug, Error)]
pub enum SheetfoldError {
    /// Top-level data, a sheet or a row is not record-shaped.
    #[error("{message}")]
    InputShape { message: String },

    /// A leaf value is neither scalar, structure nor field-exposing object.
    #[error("Expected key {key:?} of type object, array or scalar, {kind} given")]
    NonScalarLeaf { key: String, kind: String },

    /// An option value could not be resolved.
    #[error("The value {value:?} of option {option:?} is not valid (possible values: {allowed})")]
    InvalidOption {
        option: String,
        value: String,
        allowed: String,
    },

    /// Container format not handled by the collaborator in charge.
    #[error("The format {format:?} is not supported")]
    UnsupportedFormat { format: String },

    /// Writer-side failure; the temporary artifact is already released.
    #[error("Excel encoding failed - {message}")]
    SheetWrite {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Reader-side failure; the temporary artifact is already released.
    #[error("Excel decoding failed - {message}")]
    SheetRead {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl SheetfoldError {
    pub(crate) fn input_shape(message: impl Into<String>) -> Self {
        Self::InputShape {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_option(
        option: impl Into<String>,
        value: impl Into<String>,
        allowed: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            option: option.into(),
            value: value.into(),
            allowed: allowed.into(),
        }
    }

    pub(crate) fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub(crate) fn sheet_write<E>(message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SheetWrite {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn sheet_write_msg(message: impl Into<String>) -> Self {
        Self::SheetWrite {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn sheet_read<E>(message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SheetRead {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn sheet_read_msg(message: impl Into<String>) -> Self {
        Self::SheetRead {
            message: message.into(),
            source: None,
        }
    }
}
