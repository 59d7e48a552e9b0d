//! Package assembly: produce the output presentation archive.
//!
//! Every template member is copied byte-for-byte except the three parts that
//! must register the new slides: presentation.xml, its relationships, and
//! `[Content_Types].xml`. Those are rewritten as an event stream so whatever
//! attributes the template carries survive untouched. Generated slides
//! reference the template's layout parts, so fonts and colors inherit from the
//! shared masters and theme instead of being copied per slide.

use crate::common::xml::escape_xml;
use crate::error::{Result, SynthesisError};
use crate::materialize::{BindTarget, BindText, Binding, MaterializedSlide};
use crate::opc::constants::{content_type as ct, namespace as ns, reltype};
use crate::opc::{PackURI, PhysPkgWriter, Relationships};
use crate::template::{LayoutDescriptor, SlotRole, TemplatePackage};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Slide IDs live above 255 per PresentationML convention.
const FIRST_SLIDE_ID: u32 = 256;

// Default rectangles (EMU) for the text-box fallback, matching the usual
// title/body placeholder footprint.
const TITLE_BOX: (i64, i64, i64, i64) = (838_200, 365_125, 7_772_400, 1_325_563);
const BODY_BOX: (i64, i64, i64, i64) = (838_200, 1_825_625, 7_772_400, 4_351_338);

fn asm(e: impl std::fmt::Display) -> SynthesisError {
    SynthesisError::Assembly(e.to_string())
}

/// One new slide part queued for registration.
struct SlideEntry {
    partname: PackURI,
    r_id: String,
    slide_id: u32,
}

/// Assemble the output package.
///
/// `slides` are already expanded for overflow; output slide order equals their
/// order, appended after any slides the template itself carries.
pub fn assemble(
    template: &TemplatePackage,
    layouts: &[LayoutDescriptor],
    slides: &[MaterializedSlide],
) -> Result<Vec<u8>> {
    let phys = template.phys();
    let pres_uri = template.presentation_uri();
    let pres_rels_uri = pres_uri.rels_uri().map_err(asm)?;

    let pres_xml = phys.blob_for(pres_uri).map_err(asm)?;
    let pres_rels_xml = phys.blob_for(&pres_rels_uri).map_err(asm)?;
    let ct_xml = phys.content_types_xml().map_err(asm)?;

    let pres_rels = Relationships::from_xml(pres_rels_xml, pres_uri.base_uri()).map_err(asm)?;
    let mut next_rid = pres_rels.max_numeric_rid() + 1;
    let mut next_slide_num = max_slide_part_number(phys.iter_members().map(|(n, _)| n)) + 1;
    let mut next_slide_id = max_slide_id(pres_xml)?.max(FIRST_SLIDE_ID - 1) + 1;

    let mut entries = Vec::with_capacity(slides.len());
    for _ in slides {
        let partname = PackURI::new(format!("/ppt/slides/slide{next_slide_num}.xml"))
            .map_err(SynthesisError::Assembly)?;
        entries.push(SlideEntry {
            partname,
            r_id: format!("rId{next_rid}"),
            slide_id: next_slide_id,
        });
        next_rid += 1;
        next_slide_num += 1;
        next_slide_id += 1;
    }

    let new_pres_xml = register_slide_ids(pres_xml, &entries)?;
    let new_rels_xml = append_relationships(
        pres_rels_xml,
        &entries
            .iter()
            .map(|e| {
                (
                    e.r_id.clone(),
                    reltype::SLIDE,
                    e.partname.relative_ref(pres_uri.base_uri()),
                )
            })
            .collect::<Vec<_>>(),
    )?;
    let new_ct_xml = append_overrides(
        ct_xml,
        &entries
            .iter()
            .map(|e| (e.partname.as_str().to_string(), ct::PML_SLIDE))
            .collect::<Vec<_>>(),
    )?;

    let mut writer = PhysPkgWriter::new();
    let pres_member = pres_uri.membername();
    let pres_rels_member = pres_rels_uri.membername();
    for (name, blob) in phys.iter_members() {
        let blob: &[u8] = if name == pres_member {
            &new_pres_xml
        } else if name == pres_rels_member {
            &new_rels_xml
        } else if name == "[Content_Types].xml" {
            &new_ct_xml
        } else {
            blob
        };
        writer.write(name, blob).map_err(asm)?;
    }

    for (slide, entry) in slides.iter().zip(&entries) {
        let layout = &layouts[slide.layout_index()];
        let slide_xml = slide_part_xml(slide);
        writer
            .write(entry.partname.membername(), slide_xml.as_bytes())
            .map_err(asm)?;

        let rels_uri = entry.partname.rels_uri().map_err(SynthesisError::Assembly)?;
        let rels_xml = slide_rels_xml(layout, entry.partname.base_uri());
        writer
            .write(rels_uri.membername(), rels_xml.as_bytes())
            .map_err(asm)?;
    }

    let bytes = writer.finish().map_err(asm)?;
    tracing::debug!(
        slides = slides.len(),
        members = phys.len() + 2 * slides.len(),
        "package assembled"
    );
    Ok(bytes)
}

/// Write package bytes to `path` atomically: temp file in the destination
/// directory, then persist. A failed run leaves nothing behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new(),
    }
    .map_err(asm)?;
    tmp.write_all(bytes).map_err(asm)?;
    tmp.persist(path).map_err(asm)?;
    Ok(())
}

/// Largest N among existing `ppt/slides/slideN.xml` members, 0 if none.
fn max_slide_part_number<'a>(members: impl Iterator<Item = &'a str>) -> u32 {
    members
        .filter_map(|name| {
            name.strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()
        })
        .max()
        .unwrap_or(0)
}

/// Largest `id` among existing `p:sldId` elements, 0 if none.
fn max_slide_id(pres_xml: &[u8]) -> Result<u32> {
    let mut reader = Reader::from_reader(pres_xml);
    let mut max = 0;
    loop {
        match reader.read_event().map_err(asm)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != b"sldId" {
                    continue;
                }
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"id" {
                        if let Ok(id) = std::str::from_utf8(&attr.value)
                            .unwrap_or("")
                            .parse::<u32>()
                        {
                            max = max.max(id);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(max)
}

/// Extract the namespace prefix (with colon) from a qualified tag name.
fn prefix_of(name: &[u8]) -> String {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => String::from_utf8_lossy(&name[..=pos]).into_owned(),
        None => String::new(),
    }
}

fn write_sld_id_entries<W: std::io::Write>(
    writer: &mut Writer<W>,
    prefix: &str,
    entries: &[SlideEntry],
) -> Result<()> {
    for entry in entries {
        let mut elem = BytesStart::new(format!("{prefix}sldId"));
        elem.push_attribute(("id", entry.slide_id.to_string().as_str()));
        elem.push_attribute(("r:id", entry.r_id.as_str()));
        writer.write_event(Event::Empty(elem)).map_err(asm)?;
    }
    Ok(())
}

/// Rewrite presentation.xml with the new slides appended to `p:sldIdLst`.
///
/// Handles the three template shapes: a populated list (append before its end
/// tag), a self-closing empty list (expand it), and no list at all (create
/// one right after `p:sldMasterIdLst`, where the schema puts it).
fn register_slide_ids(pres_xml: &[u8], entries: &[SlideEntry]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(pres_xml);
    let mut writer = Writer::new(Vec::new());
    let mut injected = false;

    loop {
        let event = reader.read_event().map_err(asm)?;
        match event {
            Event::Eof => break,
            Event::End(ref e) if !injected && e.local_name().as_ref() == b"sldIdLst" => {
                let prefix = prefix_of(e.name().as_ref());
                write_sld_id_entries(&mut writer, &prefix, entries)?;
                writer.write_event(event).map_err(asm)?;
                injected = true;
            }
            Event::Empty(ref e) if !injected && e.local_name().as_ref() == b"sldIdLst" => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let prefix = prefix_of(e.name().as_ref());
                writer
                    .write_event(Event::Start(e.to_owned()))
                    .map_err(asm)?;
                write_sld_id_entries(&mut writer, &prefix, entries)?;
                writer
                    .write_event(Event::End(BytesEnd::new(name)))
                    .map_err(asm)?;
                injected = true;
            }
            // No sldIdLst in this template: create one after the master list
            Event::End(ref e) if !injected && e.local_name().as_ref() == b"sldMasterIdLst" => {
                let prefix = prefix_of(e.name().as_ref());
                writer.write_event(event).map_err(asm)?;
                let list_name = format!("{prefix}sldIdLst");
                writer
                    .write_event(Event::Start(BytesStart::new(list_name.as_str())))
                    .map_err(asm)?;
                write_sld_id_entries(&mut writer, &prefix, entries)?;
                writer
                    .write_event(Event::End(BytesEnd::new(list_name)))
                    .map_err(asm)?;
                injected = true;
            }
            other => writer.write_event(other).map_err(asm)?,
        }
    }

    if !injected {
        return Err(SynthesisError::Assembly(
            "presentation.xml has no sldIdLst or sldMasterIdLst to register slides in".into(),
        ));
    }
    Ok(writer.into_inner())
}

/// Append `(Id, Type, Target)` relationships before `</Relationships>`.
fn append_relationships(
    rels_xml: &[u8],
    new: &[(String, &str, String)],
) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(rels_xml);
    let mut writer = Writer::new(Vec::new());
    let mut injected = false;

    loop {
        let event = reader.read_event().map_err(asm)?;
        match event {
            Event::Eof => break,
            Event::End(ref e) if !injected && e.local_name().as_ref() == b"Relationships" => {
                for (r_id, reltype, target) in new {
                    let mut elem = BytesStart::new("Relationship");
                    elem.push_attribute(("Id", r_id.as_str()));
                    elem.push_attribute(("Type", *reltype));
                    elem.push_attribute(("Target", target.as_str()));
                    writer.write_event(Event::Empty(elem)).map_err(asm)?;
                }
                writer.write_event(event).map_err(asm)?;
                injected = true;
            }
            other => writer.write_event(other).map_err(asm)?,
        }
    }

    if !injected {
        return Err(SynthesisError::Assembly(
            "malformed relationships part".into(),
        ));
    }
    Ok(writer.into_inner())
}

/// Append `(PartName, ContentType)` overrides before `</Types>`.
fn append_overrides(ct_xml: &[u8], new: &[(String, &str)]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(ct_xml);
    let mut writer = Writer::new(Vec::new());
    let mut injected = false;

    loop {
        let event = reader.read_event().map_err(asm)?;
        match event {
            Event::Eof => break,
            Event::End(ref e) if !injected && e.local_name().as_ref() == b"Types" => {
                for (partname, content_type) in new {
                    let mut elem = BytesStart::new("Override");
                    elem.push_attribute(("PartName", partname.as_str()));
                    elem.push_attribute(("ContentType", *content_type));
                    writer.write_event(Event::Empty(elem)).map_err(asm)?;
                }
                writer.write_event(event).map_err(asm)?;
                injected = true;
            }
            other => writer.write_event(other).map_err(asm)?,
        }
    }

    if !injected {
        return Err(SynthesisError::Assembly("malformed [Content_Types].xml".into()));
    }
    Ok(writer.into_inner())
}

/// Generate the XML for one slide part. The layout itself is reached through
/// the slide's relationships part, not referenced here.
fn slide_part_xml(slide: &MaterializedSlide) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        ns::DML,
        ns::OFFICE_RELS,
        ns::PML
    ));
    xml.push_str("<p:cSld><p:spTree>");

    // Group shape properties (required)
    xml.push_str("<p:nvGrpSpPr>");
    xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
    xml.push_str("<p:cNvGrpSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr>");
    xml.push_str("<a:xfrm>");
    xml.push_str(r#"<a:off x="0" y="0"/>"#);
    xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
    xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
    xml.push_str("</a:xfrm>");
    xml.push_str("</p:grpSpPr>");

    // IDs: 1 is the group shape, content shapes follow
    let mut shape_id = 2u32;
    for binding in slide.bindings() {
        write_shape(&mut xml, shape_id, binding);
        shape_id += 1;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

fn shape_name(role: SlotRole, shape_id: u32) -> String {
    match role {
        SlotRole::Title => format!("Title {shape_id}"),
        SlotRole::Subtitle => format!("Subtitle {shape_id}"),
        SlotRole::Picture => format!("Picture Placeholder {shape_id}"),
        _ => format!("Content Placeholder {shape_id}"),
    }
}

fn write_shape(xml: &mut String, shape_id: u32, binding: &Binding) {
    match &binding.target {
        BindTarget::Slot(slot) => {
            xml.push_str("<p:sp><p:nvSpPr>");
            xml.push_str(&format!(
                r#"<p:cNvPr id="{}" name="{}"/>"#,
                shape_id,
                escape_xml(&shape_name(binding.role, shape_id))
            ));
            xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
            // Echo the layout's ph attributes so inheritance resolves
            xml.push_str("<p:nvPr><p:ph");
            if let Some(ph_type) = slot.ph_type() {
                xml.push_str(&format!(r#" type="{}""#, escape_xml(ph_type)));
            }
            if let Some(idx) = slot.idx() {
                xml.push_str(&format!(r#" idx="{idx}""#));
            }
            xml.push_str("/></p:nvPr></p:nvSpPr><p:spPr/>");
            write_tx_body(xml, &binding.text);
            xml.push_str("</p:sp>");
        }
        BindTarget::TextBox => {
            let (x, y, cx, cy) = if binding.role == SlotRole::Title {
                TITLE_BOX
            } else {
                BODY_BOX
            };
            xml.push_str("<p:sp><p:nvSpPr>");
            xml.push_str(&format!(
                r#"<p:cNvPr id="{shape_id}" name="TextBox {shape_id}"/>"#
            ));
            xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);
            xml.push_str("<p:spPr><a:xfrm>");
            xml.push_str(&format!(r#"<a:off x="{x}" y="{y}"/>"#));
            xml.push_str(&format!(r#"<a:ext cx="{cx}" cy="{cy}"/>"#));
            xml.push_str("</a:xfrm>");
            xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
            xml.push_str("</p:spPr>");
            write_tx_body(xml, &binding.text);
            xml.push_str("</p:sp>");
        }
    }
}

fn write_tx_body(xml: &mut String, text: &BindText) {
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    match text {
        BindText::Line(line) => {
            xml.push_str(&format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape_xml(line)));
        }
        BindText::Points(points) => {
            for point in points {
                xml.push_str(&format!(
                    "<a:p><a:r><a:t>{}</a:t></a:r></a:p>",
                    escape_xml(point)
                ));
            }
        }
        BindText::Empty => xml.push_str("<a:p/>"),
    }
    xml.push_str("</p:txBody>");
}

/// Generate the relationships part for one slide: a single relationship to
/// its layout.
fn slide_rels_xml(layout: &LayoutDescriptor, slide_base_uri: &str) -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}" Target="{}"/></Relationships>"#,
        XML_DECL,
        ns::PKG_RELS,
        reltype::SLIDE_LAYOUT,
        layout.part_uri().relative_ref(slide_base_uri)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<SlideEntry> {
        (0..n)
            .map(|i| SlideEntry {
                partname: PackURI::new(format!("/ppt/slides/slide{}.xml", i + 1)).unwrap(),
                r_id: format!("rId{}", i + 10),
                slide_id: 300 + i as u32,
            })
            .collect()
    }

    #[test]
    fn appends_to_populated_sld_id_lst() {
        let pres = br#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;
        let out = register_slide_ids(pres, &entries(1)).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(r#"<p:sldId id="256" r:id="rId2"/><p:sldId id="300" r:id="rId10"/></p:sldIdLst>"#));
    }

    #[test]
    fn expands_self_closing_sld_id_lst() {
        let pres = br#"<p:presentation xmlns:p="p"><p:sldMasterIdLst/><p:sldIdLst/></p:presentation>"#;
        let out = String::from_utf8(register_slide_ids(pres, &entries(2)).unwrap()).unwrap();
        assert!(out.contains(
            r#"<p:sldIdLst><p:sldId id="300" r:id="rId10"/><p:sldId id="301" r:id="rId11"/></p:sldIdLst>"#
        ));
    }

    #[test]
    fn creates_sld_id_lst_after_master_list() {
        let pres = br#"<p:presentation xmlns:p="p"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#;
        let out = String::from_utf8(register_slide_ids(pres, &entries(1)).unwrap()).unwrap();
        assert!(out.contains(
            r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="300" r:id="rId10"/></p:sldIdLst><p:sldSz"#
        ));
    }

    #[test]
    fn no_insertion_point_is_assembly_error() {
        let pres = br#"<p:presentation xmlns:p="p"/>"#;
        assert!(matches!(
            register_slide_ids(pres, &entries(1)),
            Err(SynthesisError::Assembly(_))
        ));
    }

    #[test]
    fn relationship_appending() {
        let rels = br#"<Relationships xmlns="x"><Relationship Id="rId1" Type="t" Target="a.xml"/></Relationships>"#;
        let new = vec![(
            "rId2".to_string(),
            reltype::SLIDE,
            "slides/slide1.xml".to_string(),
        )];
        let out = String::from_utf8(append_relationships(rels, &new).unwrap()).unwrap();
        assert!(out.contains(r#"<Relationship Id="rId2""#));
        assert!(out.ends_with("</Relationships>"));
    }

    #[test]
    fn override_appending() {
        let ct = br#"<Types xmlns="x"><Default Extension="xml" ContentType="application/xml"/></Types>"#;
        let new = vec![("/ppt/slides/slide1.xml".to_string(), ct::PML_SLIDE)];
        let out = String::from_utf8(append_overrides(ct, &new).unwrap()).unwrap();
        assert!(out.contains(r#"<Override PartName="/ppt/slides/slide1.xml""#));
    }

    #[test]
    fn slide_numbering_continues_past_existing() {
        let names = [
            "ppt/slides/slide1.xml",
            "ppt/slides/slide7.xml",
            "ppt/slideLayouts/slideLayout9.xml",
        ];
        assert_eq!(max_slide_part_number(names.into_iter()), 7);
        assert_eq!(max_slide_part_number([].into_iter()), 0);
    }

    #[test]
    fn slide_id_scanning() {
        let pres = br#"<p:presentation xmlns:p="p"><p:sldIdLst><p:sldId id="256" r:id="a"/><p:sldId id="300" r:id="b"/></p:sldIdLst></p:presentation>"#;
        assert_eq!(max_slide_id(pres).unwrap(), 300);
        assert_eq!(max_slide_id(br#"<p:presentation xmlns:p="p"/>"#).unwrap(), 0);
    }

    #[test]
    fn slide_xml_escapes_text() {
        use crate::outline::SlideSpec;
        use crate::warning::Warning;

        let xml = format!(
            r#"<p:sldLayout xmlns:a="a" xmlns:p="p"><p:cSld name="L"><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name=""/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name=""/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp></p:spTree></p:cSld></p:sldLayout>"#
        );
        let layout = LayoutDescriptor::parse(
            0,
            PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap(),
            xml.as_bytes(),
        )
        .unwrap();

        let spec = SlideSpec::new("Q&A <final>", vec!["a < b".into()]);
        let mut warnings: Vec<Warning> = Vec::new();
        let slides = crate::materialize::materialize(1, &spec, &layout, &mut warnings);
        let out = slide_part_xml(&slides[0]);
        assert!(out.contains("Q&amp;A &lt;final&gt;"));
        assert!(out.contains("a &lt; b"));
        assert!(out.contains(r#"<p:ph type="title"/>"#));
        assert!(out.contains(r#"<p:ph type="body" idx="1"/>"#));
    }

    #[test]
    fn slide_rels_point_at_layout() {
        let layout = LayoutDescriptor::parse(
            3,
            PackURI::new("/ppt/slideLayouts/slideLayout4.xml").unwrap(),
            br#"<p:sldLayout xmlns:p="p"><p:cSld name="L"><p:spTree/></p:cSld></p:sldLayout>"#,
        )
        .unwrap();
        let rels = slide_rels_xml(&layout, "/ppt/slides");
        assert!(rels.contains(r#"Target="../slideLayouts/slideLayout4.xml""#));
        assert!(rels.contains(reltype::SLIDE_LAYOUT));
    }
}
