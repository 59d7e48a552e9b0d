//! Non-fatal conditions repaired during synthesis.

use thiserror::Error;

/// A soft defect noticed during synthesis.
///
/// Warnings never abort a run. They are collected in order of occurrence and
/// returned alongside the successful result. `slide` is the 1-based position
/// of the originating outline slide.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Outline slide had an empty title; a placeholder title was substituted
    #[error("slide {slide}: empty title replaced with \"{replacement}\"")]
    EmptyTitle { slide: usize, replacement: String },

    /// Title exceeded the length ceiling and was truncated with an ellipsis
    #[error("slide {slide}: title truncated to {limit} characters")]
    TitleTruncated { slide: usize, limit: usize },

    /// No content-capable layout existed; the first layout was used instead
    #[error("slide {slide}: no content-capable layout, fell back to \"{layout}\"")]
    LayoutFallback { slide: usize, layout: String },

    /// Chosen layout has no body slot for the slide's content points
    #[error("slide {slide}: layout \"{layout}\" has no body slot, content placed in {target}")]
    MissingBodySlot {
        slide: usize,
        layout: String,
        target: String,
    },

    /// Layout has picture slots the outline cannot fill; they were left empty
    #[error("slide {slide}: picture slot(s) in layout \"{layout}\" left empty")]
    EmptyPictureSlot { slide: usize, layout: String },
}

/// Record a warning: log it and append it to the run's collection.
pub(crate) fn record(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}
