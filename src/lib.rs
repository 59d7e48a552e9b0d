//! Slidesmith - template-driven slide synthesis for PowerPoint presentations
//!
//! This library takes a structured slide outline (as produced by a language
//! model) and a `.pptx`/`.potx` template, and deterministically produces a new
//! presentation whose slides are bound into the template's own layouts. The
//! template's masters, theme, and fonts are carried over untouched, so the
//! generated slides inherit the template's look without any style inference.
//!
//! # Pipeline
//!
//! 1. **Outline model** - parse and normalize the outline JSON
//! 2. **Template introspection** - enumerate the template's layouts and their
//!    placeholder slots
//! 3. **Layout selection** - pick the best-matching layout per outline slide
//! 4. **Materialization** - bind titles and content points into slots,
//!    spilling overflow onto continuation slides
//! 5. **Assembly** - write the output package, copying template parts verbatim
//!
//! # Example
//!
//! ```no_run
//! let outline = r#"{"slides": [
//!     {"title": "Intro", "content": ["First point", "Second point"]}
//! ]}"#;
//!
//! let template = std::fs::read("corporate.pptx")?;
//! let result = slidesmith::synthesize(outline, &template)?;
//!
//! for warning in &result.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! std::fs::write("deck.pptx", &result.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Errors are terminal for the whole run ([`SynthesisError`]); soft defects
//! like over-long titles are repaired and reported as [`Warning`]s alongside
//! the successful result.

pub mod assemble;
pub mod common;
pub mod error;
pub mod materialize;
pub mod opc;
pub mod outline;
pub mod select;
pub mod template;
pub mod warning;

pub use error::{Result, SynthesisError};
pub use materialize::MaterializedSlide;
pub use outline::{Outline, SlideSpec};
pub use template::{LayoutDescriptor, TemplatePackage};
pub use warning::Warning;

use std::path::Path;

/// The result of a successful synthesis run.
#[derive(Debug)]
pub struct Synthesis {
    /// The output presentation package
    pub bytes: Vec<u8>,
    /// Soft defects repaired along the way, in order of occurrence
    pub warnings: Vec<Warning>,
}

/// Synthesize a presentation from outline JSON and template bytes.
///
/// The outline is parsed before the template is touched, so a malformed
/// outline fails fast regardless of the template's state.
///
/// # Errors
///
/// * [`SynthesisError::OutlineParse`] - outline JSON violates the contract
/// * [`SynthesisError::TemplateUnreadable`] - not a valid presentation package
/// * [`SynthesisError::NoLayoutsFound`] - template exposes zero usable layouts
/// * [`SynthesisError::Assembly`] - writing the output archive failed
pub fn synthesize(outline_json: &str, template: &[u8]) -> Result<Synthesis> {
    let mut warnings = Vec::new();
    let outline = Outline::from_json(outline_json, &mut warnings)?;
    let template = TemplatePackage::from_bytes(template)?;
    synthesize_outline(&outline, &template, warnings)
}

/// Synthesize from already-staged inputs.
///
/// For callers that parse the outline or open the template separately
/// (e.g. to report upload errors before the model call completes).
pub fn synthesize_outline(
    outline: &Outline,
    template: &TemplatePackage,
    mut warnings: Vec<Warning>,
) -> Result<Synthesis> {
    let layouts = template.introspect()?;

    let mut slides = Vec::with_capacity(outline.len());
    for (i, spec) in outline.slides().iter().enumerate() {
        let layout = select::select_layout(i + 1, spec, &layouts, &mut warnings);
        slides.extend(materialize::materialize(i + 1, spec, layout, &mut warnings));
    }

    tracing::debug!(
        outline_slides = outline.len(),
        materialized = slides.len(),
        "materialization complete"
    );

    let bytes = assemble::assemble(template, &layouts, &slides)?;
    Ok(Synthesis { bytes, warnings })
}

/// Synthesize and write the output file atomically.
///
/// The package is written to a temporary file in the destination directory
/// and renamed into place; a failed run leaves no partial file behind.
pub fn synthesize_to_file<P, Q>(
    outline_json: &str,
    template_path: P,
    output_path: Q,
) -> Result<Vec<Warning>>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut warnings = Vec::new();
    let outline = Outline::from_json(outline_json, &mut warnings)?;
    let template = TemplatePackage::open(template_path)?;
    let result = synthesize_outline(&outline, &template, warnings)?;
    assemble::write_atomic(output_path.as_ref(), &result.bytes)?;
    Ok(result.warnings)
}
