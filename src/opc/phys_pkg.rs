//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! Reading decompresses every member up front: templates are small, each
//! synthesis run owns its own copy, and eager decoding keeps the rest of the
//! pipeline free of archive state. Writing produces deterministic archives:
//! fixed timestamps, fixed compression, members in insertion order.

use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

/// Physical package reader that provides access to parts in a ZIP-based OPC package.
///
/// Member order follows the archive's central directory, which is what makes
/// verbatim re-assembly of untouched parts reproducible.
pub struct PhysPkgReader {
    /// Members in central-directory order: (membername, decompressed bytes)
    members: Vec<(String, Vec<u8>)>,
    /// Membername to index for O(1) lookup
    index: HashMap<String, usize>,
}

impl PhysPkgReader {
    /// Open an OPC package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Create a reader from package bytes.
    ///
    /// Fails with a ZIP error if the bytes are not a valid archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

        let mut members = Vec::with_capacity(archive.len());
        let mut index = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            index.insert(name.clone(), members.len());
            members.push((name, blob));
        }
        Ok(Self { members, index })
    }

    /// Get the binary content for a part by its PackURI.
    pub fn blob_for(&self, pack_uri: &PackURI) -> Result<&[u8]> {
        self.index
            .get(pack_uri.membername())
            .map(|&i| self.members[i].1.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    /// Get the [Content_Types].xml content.
    ///
    /// This is a required part of every OPC package that maps parts to content types.
    pub fn content_types_xml(&self) -> Result<&[u8]> {
        let uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        self.blob_for(&uri)
    }

    /// Get the relationships XML for a specific source URI.
    ///
    /// Returns None if the source has no relationships part.
    pub fn rels_xml_for(&self, source_uri: &PackURI) -> Result<Option<&[u8]>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        match self.blob_for(&rels_uri) {
            Ok(blob) => Ok(Some(blob)),
            Err(OpcError::PartNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if a specific member exists in the package.
    pub fn contains(&self, pack_uri: &PackURI) -> bool {
        self.index.contains_key(pack_uri.membername())
    }

    /// Iterate over members in central-directory order.
    pub fn iter_members(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.members
            .iter()
            .map(|(name, blob)| (name.as_str(), blob.as_slice()))
    }

    /// Get the number of parts in the package.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the package is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Physical package writer for creating OPC packages.
///
/// Timestamps are pinned so that identical inputs produce byte-identical
/// archives.
pub struct PhysPkgWriter {
    archive: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    /// Create a new package writer that writes to memory.
    pub fn new() -> Self {
        Self {
            archive: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options() -> zip::write::SimpleFileOptions {
        zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
    }

    /// Write a part to the package with Deflate compression.
    pub fn write(&mut self, membername: &str, blob: &[u8]) -> Result<()> {
        self.archive.start_file(membername, Self::options())?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Finish writing and return the package bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.archive.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
