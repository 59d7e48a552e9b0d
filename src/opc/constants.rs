//! Constant values used throughout OPC packages.
//!
//! Only the PresentationML vocabulary this crate actually touches is listed.

/// Content type strings for package parts
pub mod content_type {
    // PresentationML main-part content types. Templates (.potx) and
    // slideshows (.ppsx) share the same part structure as presentations.
    pub const PML_PRESENTATION_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const PML_PRES_MACRO_MAIN: &str =
        "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
    pub const PML_TEMPLATE_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
    pub const PML_SLIDESHOW_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";

    pub const PML_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const PML_SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const PML_SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";

    /// All content types accepted for the main presentation part.
    pub const PML_MAIN_TYPES: [&str; 4] = [
        PML_PRESENTATION_MAIN,
        PML_PRES_MACRO_MAIN,
        PML_TEMPLATE_MAIN,
        PML_SLIDESHOW_MAIN,
    ];
}

/// Relationship type URIs
pub mod reltype {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
}

/// XML namespace URIs
pub mod namespace {
    pub const PML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const DML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const OFFICE_RELS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
}
