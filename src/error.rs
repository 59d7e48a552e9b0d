/// Error types for slide synthesis.
use thiserror::Error;

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Terminal errors of a synthesis run.
///
/// Every variant aborts the whole run; no partial output is produced.
/// Recoverable conditions are repaired in place and reported as
/// [`Warning`](crate::Warning)s instead.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The template is not a valid presentation package
    #[error("Template unreadable: {0}")]
    TemplateUnreadable(String),

    /// The template exposes zero usable slide layouts
    #[error("Template exposes no usable slide layouts")]
    NoLayoutsFound,

    /// The outline JSON violates the outline contract
    #[error("Outline parse failed: {0}")]
    OutlineParse(String),

    /// Writing the output package failed
    #[error("Could not produce output package: {0}")]
    Assembly(String),
}

impl From<crate::opc::OpcError> for SynthesisError {
    fn from(err: crate::opc::OpcError) -> Self {
        SynthesisError::TemplateUnreadable(err.to_string())
    }
}

impl From<quick_xml::Error> for SynthesisError {
    fn from(err: quick_xml::Error) -> Self {
        SynthesisError::TemplateUnreadable(format!("corrupt XML: {}", err))
    }
}
