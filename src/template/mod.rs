//! Template introspection.
//!
//! Opens a presentation package, verifies it is one, and extracts the ordered
//! set of slide layouts: presentation part → `p:sldMasterIdLst` order → each
//! master's `p:sldLayoutIdLst` order, resolving every step through the OPC
//! relationship graph.

pub mod layout;

pub use layout::{DEFAULT_BODY_CAPACITY, LayoutDescriptor, LayoutKind, PlaceholderSlot, SlotRole};

use crate::error::{Result, SynthesisError};
use crate::opc::constants::{content_type as ct, reltype};
use crate::opc::packuri::PACKAGE_URI;
use crate::opc::{PackURI, PhysPkgReader, Relationships};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::Path;

/// A parsed presentation template.
///
/// Read-only for the whole run. The assembler copies its parts verbatim, so
/// generated slides share the template's masters, theme, and fonts by
/// reference instead of carrying copies.
pub struct TemplatePackage {
    phys: PhysPkgReader,
    pres_uri: PackURI,
}

impl TemplatePackage {
    /// Open a template from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_phys(PhysPkgReader::open(path)?)
    }

    /// Open a template from in-memory bytes (e.g. an uploaded file).
    ///
    /// # Errors
    ///
    /// [`SynthesisError::TemplateUnreadable`] if the bytes are not a ZIP
    /// archive, required parts are missing, or the main part is not a
    /// PresentationML document.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_phys(PhysPkgReader::from_bytes(data)?)
    }

    fn from_phys(phys: PhysPkgReader) -> Result<Self> {
        let pkg_uri = PackURI::new(PACKAGE_URI)
            .map_err(SynthesisError::TemplateUnreadable)?;
        let pkg_rels_xml = phys.rels_xml_for(&pkg_uri)?.ok_or_else(|| {
            SynthesisError::TemplateUnreadable("missing package relationships (_rels/.rels)".into())
        })?;
        let pkg_rels = Relationships::from_xml(pkg_rels_xml, PACKAGE_URI)?;

        let pres_uri = pkg_rels
            .find_by_reltype(reltype::OFFICE_DOCUMENT)
            .ok_or_else(|| {
                SynthesisError::TemplateUnreadable("no officeDocument relationship".into())
            })?
            .target_partname()?;

        if !phys.contains(&pres_uri) {
            return Err(SynthesisError::TemplateUnreadable(format!(
                "main presentation part missing: {pres_uri}"
            )));
        }

        // Verify it's a PresentationML package by the main part's content type
        let ct_xml = phys.content_types_xml().map_err(|_| {
            SynthesisError::TemplateUnreadable("missing [Content_Types].xml".into())
        })?;
        if let Some(declared) = override_content_type(ct_xml, &pres_uri)? {
            if !ct::PML_MAIN_TYPES.contains(&declared.as_str()) {
                return Err(SynthesisError::TemplateUnreadable(format!(
                    "not a presentation package: main part content type is {declared}"
                )));
            }
        }

        Ok(Self { phys, pres_uri })
    }

    /// Partname of the main presentation part.
    #[inline]
    pub fn presentation_uri(&self) -> &PackURI {
        &self.pres_uri
    }

    /// The underlying physical package.
    #[inline]
    pub fn phys(&self) -> &PhysPkgReader {
        &self.phys
    }

    /// Raw presentation.xml bytes.
    pub fn presentation_xml(&self) -> Result<&[u8]> {
        Ok(self.phys.blob_for(&self.pres_uri)?)
    }

    /// Extract the ordered set of layout descriptors.
    ///
    /// Order is `p:sldMasterIdLst` order, then each master's
    /// `p:sldLayoutIdLst` order; the layout's position in this sequence is its
    /// stable identifier for the run. Dangling references (a listed master or
    /// layout whose part is absent) are skipped.
    ///
    /// # Errors
    ///
    /// [`SynthesisError::NoLayoutsFound`] if no usable layout remains;
    /// [`SynthesisError::TemplateUnreadable`] on corrupt XML.
    pub fn introspect(&self) -> Result<Vec<LayoutDescriptor>> {
        let pres_xml = self.presentation_xml()?;
        let master_rids = scan_id_list(pres_xml, b"sldMasterId")?;

        let pres_rels_xml = self.phys.rels_xml_for(&self.pres_uri)?.ok_or_else(|| {
            SynthesisError::TemplateUnreadable("presentation part has no relationships".into())
        })?;
        let pres_rels = Relationships::from_xml(pres_rels_xml, self.pres_uri.base_uri())?;

        let mut layouts = Vec::new();
        for master_rid in &master_rids {
            let Some(rel) = pres_rels.get(master_rid) else {
                tracing::debug!(%master_rid, "dangling slide master reference, skipping");
                continue;
            };
            let master_uri = rel.target_partname()?;
            let Ok(master_xml) = self.phys.blob_for(&master_uri) else {
                tracing::debug!(%master_uri, "slide master part missing, skipping");
                continue;
            };
            let Some(master_rels_xml) = self.phys.rels_xml_for(&master_uri)? else {
                tracing::debug!(%master_uri, "slide master has no relationships, skipping");
                continue;
            };
            let master_rels = Relationships::from_xml(master_rels_xml, master_uri.base_uri())?;

            for layout_rid in scan_id_list(master_xml, b"sldLayoutId")? {
                let Some(rel) = master_rels.get(&layout_rid) else {
                    continue;
                };
                let layout_uri = rel.target_partname()?;
                let Ok(layout_xml) = self.phys.blob_for(&layout_uri) else {
                    tracing::debug!(%layout_uri, "slide layout part missing, skipping");
                    continue;
                };
                layouts.push(LayoutDescriptor::parse(layouts.len(), layout_uri, layout_xml)?);
            }
        }

        if layouts.is_empty() {
            return Err(SynthesisError::NoLayoutsFound);
        }
        tracing::debug!(
            masters = master_rids.len(),
            layouts = layouts.len(),
            "template introspected"
        );
        Ok(layouts)
    }
}

/// Collect relationship-id attributes of every `<p:{element}>` in document
/// order.
///
/// The relationship id is the prefixed `id` attribute (`r:id` under the usual
/// binding, but any prefix a template binds the relationships namespace to).
/// The unprefixed `id` attribute on the same element is the slide-master or
/// layout id number, not a relationship, and is skipped.
fn scan_id_list(xml: &[u8], element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rids = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != element {
                    continue;
                }
                for attr in e.attributes().flatten() {
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        rids.push(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rids)
}

/// Look up the Override content type declared for a part, if any.
fn override_content_type(ct_xml: &[u8], part: &PackURI) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(ct_xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != b"Override" {
                    continue;
                }
                let mut part_name = None;
                let mut content_type = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"PartName" => {
                            part_name = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                        b"ContentType" => {
                            content_type = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                        _ => {}
                    }
                }
                if part_name.as_deref() == Some(part.as_str()) {
                    return Ok(content_type);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_id_list_keeps_document_order() {
        let xml = br#"<p:presentation xmlns:p="x" xmlns:r="y">
<p:sldMasterIdLst>
<p:sldMasterId id="2147483648" r:id="rId2"/>
<p:sldMasterId id="2147483649" r:id="rId1"/>
</p:sldMasterIdLst></p:presentation>"#;
        assert_eq!(scan_id_list(xml, b"sldMasterId").unwrap(), ["rId2", "rId1"]);
    }

    #[test]
    fn scan_id_list_accepts_any_relationship_prefix() {
        let xml = br#"<p:presentation xmlns:p="x" xmlns:rel="y">
<p:sldMasterIdLst>
<p:sldMasterId id="2147483648" rel:id="rId5"/>
</p:sldMasterIdLst></p:presentation>"#;
        assert_eq!(scan_id_list(xml, b"sldMasterId").unwrap(), ["rId5"]);
    }

    #[test]
    fn scan_id_list_skips_unprefixed_id() {
        let xml = br#"<p:presentation xmlns:p="x">
<p:sldMasterIdLst><p:sldMasterId id="2147483648"/></p:sldMasterIdLst></p:presentation>"#;
        assert!(scan_id_list(xml, b"sldMasterId").unwrap().is_empty());
    }

    #[test]
    fn scan_id_list_empty_when_absent() {
        let xml = br#"<p:presentation xmlns:p="x"/>"#;
        assert!(scan_id_list(xml, b"sldMasterId").unwrap().is_empty());
    }

    #[test]
    fn override_lookup_matches_partname() {
        let xml = br#"<Types xmlns="t">
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#;
        let part = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(
            override_content_type(xml, &part).unwrap().unwrap(),
            ct::PML_PRESENTATION_MAIN
        );
        let other = PackURI::new("/ppt/other.xml").unwrap();
        assert!(override_content_type(xml, &other).unwrap().is_none());
    }
}
