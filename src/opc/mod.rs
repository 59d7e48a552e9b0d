//! Open Packaging Conventions (OPC) physical package layer.
//!
//! A `.pptx`/`.potx` file is an OPC package: a ZIP archive of XML parts plus
//! relationship files that wire the parts together. This module provides the
//! part-name value type, the reltype/content-type vocabulary, relationship
//! parsing, and ZIP-level read/write access.

pub mod constants;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

pub use error::{OpcError, Result};
pub use packuri::PackURI;
pub use phys_pkg::{PhysPkgReader, PhysPkgWriter};
pub use rel::{Relationship, Relationships};
