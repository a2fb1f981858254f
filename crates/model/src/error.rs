//! Metadata validation errors.

/// Errors produced while constructing metadata.
///
/// Construction fails fast: every value object is validated exactly once,
/// when it is created.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetaDataError {
    #[error("field {field} had an invalid length of {length}")]
    InvalidLength { field: &'static str, length: usize },

    #[error("field {field} had an invalid value: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("deprecated formatVersion: {0}")]
    DeprecatedFormatVersion(i32),

    #[error("unknown formatVersion: {0}")]
    UnknownFormatVersion(i32),

    #[error("data incomplete, {0} was missing")]
    Incomplete(&'static str),

    #[error("field {field} was not parsable: {value}")]
    Unparsable { field: &'static str, value: String },
}

impl MetaDataError {
    /// Whether the error marks data from an outdated client generation.
    ///
    /// Such data is never accepted again, so callers usually skip it
    /// instead of reporting a defect.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Self::DeprecatedFormatVersion(_))
    }
}
