//! Layout descriptors: the introspected shape of one slide layout.
//!
//! A layout part's `p:spTree` holds placeholder shapes (`p:sp` with a `p:ph`
//! child). Each becomes a [`PlaceholderSlot`] with a role, the layout-declared
//! index, and a capacity hint derived from the placeholder geometry.

use crate::error::Result;
use crate::opc::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// EMUs of placeholder height assumed per bulleted line of body text.
///
/// 457 200 EMU is half an inch, roughly one line at default body sizes.
/// This is a line-count heuristic, not glyph-level text measurement.
const EMU_PER_LINE: i64 = 457_200;

/// Capacity hint used when a placeholder carries no geometry of its own
/// (it then inherits position and size from the master).
pub const DEFAULT_BODY_CAPACITY: u32 = 6;

/// Role of a placeholder slot, classified from the `p:ph type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    /// Title placeholder (`title` or `ctrTitle`)
    Title,
    /// Body/content placeholder (`body`, or no type attribute)
    Body,
    /// Subtitle placeholder (`subTitle`)
    Subtitle,
    /// Picture placeholder (`pic` or `clipArt`)
    Picture,
    /// Any other placeholder type; ignored by later stages
    Other,
}

impl SlotRole {
    /// Classify a raw `p:ph type` attribute value.
    ///
    /// A `p:ph` element without a type attribute is a body placeholder.
    fn classify(ph_type: Option<&str>) -> Self {
        match ph_type {
            None | Some("body") => SlotRole::Body,
            Some("title") | Some("ctrTitle") => SlotRole::Title,
            Some("subTitle") => SlotRole::Subtitle,
            Some("pic") | Some("clipArt") => SlotRole::Picture,
            Some(_) => SlotRole::Other,
        }
    }
}

/// How a layout can be used, derived from its slot roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Title slot plus at least one body slot
    Content,
    /// Subtitle slot and no body slot; used for section breaks
    Section,
    /// No body slot and no subtitle slot
    TitleOnly,
    /// Body slot(s) but no title slot; selectable only as a fallback
    Plain,
}

/// One typed content region declared by a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSlot {
    role: SlotRole,
    /// Raw `type` attribute from the layout, echoed onto generated slides so
    /// placeholder inheritance resolves identically
    ph_type: Option<String>,
    /// Raw `idx` attribute; absent means 0 (the attribute is also omitted
    /// when echoing)
    idx: Option<u32>,
    /// Max recommended content lines for this slot
    capacity: u32,
}

impl PlaceholderSlot {
    /// The slot's role.
    #[inline]
    pub fn role(&self) -> SlotRole {
        self.role
    }

    /// Raw placeholder type attribute, if the layout declared one.
    #[inline]
    pub fn ph_type(&self) -> Option<&str> {
        self.ph_type.as_deref()
    }

    /// Raw idx attribute, if the layout declared one.
    #[inline]
    pub fn idx(&self) -> Option<u32> {
        self.idx
    }

    /// Effective slot index within the layout (absent idx means 0).
    #[inline]
    pub fn slot_index(&self) -> u32 {
        self.idx.unwrap_or(0)
    }

    /// Capacity hint: max recommended lines of content.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// The introspected description of one slide layout.
///
/// Built once per synthesis run, read-only afterward. The selector borrows
/// descriptors, never copies them.
#[derive(Debug, Clone)]
pub struct LayoutDescriptor {
    index: usize,
    name: String,
    part_uri: PackURI,
    kind: LayoutKind,
    slots: Vec<PlaceholderSlot>,
}

impl LayoutDescriptor {
    /// Parse a layout part into a descriptor.
    ///
    /// # Arguments
    /// * `index` - Position within the template's layout collection
    /// * `part_uri` - Partname of the layout part
    /// * `xml` - Raw layout XML
    pub fn parse(index: usize, part_uri: PackURI, xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut name = String::new();
        let mut slots: Vec<PlaceholderSlot> = Vec::new();

        // Per-shape parse state while inside a p:sp element
        let mut in_sp = false;
        let mut sp_depth = 0usize;
        let mut ph: Option<(Option<String>, Option<u32>)> = None;
        let mut cy: Option<i64> = None;

        loop {
            let event = reader.read_event()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let local = e.local_name();
                    let is_empty = matches!(event, Event::Empty(_));

                    if !in_sp {
                        match local.as_ref() {
                            b"cSld" => {
                                for attr in e.attributes().flatten() {
                                    if attr.key.as_ref() == b"name" {
                                        name = String::from_utf8_lossy(&attr.value).into_owned();
                                    }
                                }
                            }
                            b"sp" if !is_empty => {
                                in_sp = true;
                                sp_depth = 0;
                                ph = None;
                                cy = None;
                            }
                            _ => {}
                        }
                        continue;
                    }

                    match local.as_ref() {
                        // First ph element names this shape's placeholder
                        b"ph" if ph.is_none() => {
                            let mut ph_type = None;
                            let mut idx = None;
                            for attr in e.attributes().flatten() {
                                match attr.key.as_ref() {
                                    b"type" => {
                                        ph_type =
                                            Some(String::from_utf8_lossy(&attr.value).into_owned());
                                    }
                                    b"idx" => {
                                        idx = std::str::from_utf8(&attr.value)
                                            .ok()
                                            .and_then(|s| s.parse::<u32>().ok());
                                    }
                                    _ => {}
                                }
                            }
                            ph = Some((ph_type, idx));
                        }
                        // First ext is the shape-level a:xfrm extent
                        b"ext" if cy.is_none() => {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"cy" {
                                    cy = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(|s| s.parse::<i64>().ok());
                                }
                            }
                        }
                        _ => {}
                    }
                    if !is_empty {
                        sp_depth += 1;
                    }
                }
                Event::End(ref e) => {
                    if !in_sp {
                        continue;
                    }
                    if sp_depth == 0 {
                        debug_assert_eq!(e.local_name().as_ref(), b"sp");
                        if let Some((ph_type, idx)) = ph.take() {
                            let role = SlotRole::classify(ph_type.as_deref());
                            slots.push(PlaceholderSlot {
                                role,
                                ph_type,
                                idx,
                                capacity: capacity_from_geometry(cy),
                            });
                        }
                        in_sp = false;
                    } else {
                        sp_depth -= 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let kind = derive_kind(&slots);
        tracing::debug!(index, %part_uri, ?kind, slots = slots.len(), "layout introspected");
        Ok(Self {
            index,
            name,
            part_uri,
            kind,
            slots,
        })
    }

    /// Stable identifier: position within the template's layout collection.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable layout name from `p:cSld`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Partname of the layout part within the template.
    #[inline]
    pub fn part_uri(&self) -> &PackURI {
        &self.part_uri
    }

    /// How this layout can be used.
    #[inline]
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// All slots, in layout document order.
    #[inline]
    pub fn slots(&self) -> &[PlaceholderSlot] {
        &self.slots
    }

    /// The title slot. Layouts have at most one.
    pub fn title_slot(&self) -> Option<&PlaceholderSlot> {
        self.slots.iter().find(|s| s.role == SlotRole::Title)
    }

    /// The primary body slot: the body slot with the lowest index.
    pub fn primary_body_slot(&self) -> Option<&PlaceholderSlot> {
        self.slots
            .iter()
            .filter(|s| s.role == SlotRole::Body)
            .min_by_key(|s| s.slot_index())
    }

    /// The first subtitle slot, if any.
    pub fn subtitle_slot(&self) -> Option<&PlaceholderSlot> {
        self.slots.iter().find(|s| s.role == SlotRole::Subtitle)
    }

    /// Picture slots, in layout order.
    pub fn picture_slots(&self) -> impl Iterator<Item = &PlaceholderSlot> {
        self.slots.iter().filter(|s| s.role == SlotRole::Picture)
    }

    /// Capacity hint of the primary body slot.
    pub fn body_capacity(&self) -> Option<u32> {
        self.primary_body_slot().map(|s| s.capacity)
    }
}

/// Derive the layout tag from its slot roles.
fn derive_kind(slots: &[PlaceholderSlot]) -> LayoutKind {
    let has = |role| slots.iter().any(|s| s.role == role);
    if !has(SlotRole::Body) {
        if has(SlotRole::Subtitle) {
            LayoutKind::Section
        } else {
            LayoutKind::TitleOnly
        }
    } else if has(SlotRole::Title) {
        LayoutKind::Content
    } else {
        LayoutKind::Plain
    }
}

/// Capacity hint from placeholder extent, line-count heuristic.
fn capacity_from_geometry(cy: Option<i64>) -> u32 {
    match cy {
        Some(cy) if cy > 0 => ((cy / EMU_PER_LINE).max(1)) as u32,
        _ => DEFAULT_BODY_CAPACITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_xml(shapes: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld name="Test Layout"><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>
{shapes}
</p:spTree></p:cSld></p:sldLayout>"#
        )
        .into_bytes()
    }

    fn ph_shape(ph_attrs: &str, cy: Option<i64>) -> String {
        let sp_pr = match cy {
            Some(cy) => format!(
                r#"<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="7772400" cy="{cy}"/></a:xfrm></p:spPr>"#
            ),
            None => "<p:spPr/>".to_string(),
        };
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="ph"/><p:cNvSpPr/><p:nvPr><p:ph {ph_attrs}/></p:nvPr></p:nvSpPr>{sp_pr}<p:txBody><a:bodyPr/><a:p/></p:txBody></p:sp>"#
        )
    }

    fn parse(shapes: &str) -> LayoutDescriptor {
        let uri = PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap();
        LayoutDescriptor::parse(0, uri, &layout_xml(shapes)).unwrap()
    }

    #[test]
    fn classifies_roles_and_tags_content() {
        let shapes = format!(
            "{}{}",
            ph_shape(r#"type="title""#, None),
            ph_shape(r#"type="body" idx="1""#, Some(5 * EMU_PER_LINE))
        );
        let layout = parse(&shapes);
        assert_eq!(layout.name(), "Test Layout");
        assert_eq!(layout.kind(), LayoutKind::Content);
        assert_eq!(layout.title_slot().unwrap().role(), SlotRole::Title);
        let body = layout.primary_body_slot().unwrap();
        assert_eq!(body.slot_index(), 1);
        assert_eq!(body.capacity(), 5);
    }

    #[test]
    fn ph_without_type_is_body() {
        let layout = parse(&ph_shape(r#"idx="1""#, None));
        assert_eq!(layout.primary_body_slot().unwrap().role(), SlotRole::Body);
        assert_eq!(layout.kind(), LayoutKind::Plain);
    }

    #[test]
    fn missing_geometry_uses_default_capacity() {
        let layout = parse(&ph_shape(r#"type="body" idx="1""#, None));
        assert_eq!(layout.body_capacity(), Some(DEFAULT_BODY_CAPACITY));
    }

    #[test]
    fn subtitle_without_body_is_section() {
        let shapes = format!(
            "{}{}",
            ph_shape(r#"type="ctrTitle""#, None),
            ph_shape(r#"type="subTitle" idx="1""#, None)
        );
        assert_eq!(parse(&shapes).kind(), LayoutKind::Section);
    }

    #[test]
    fn no_body_no_subtitle_is_title_only() {
        let layout = parse(&ph_shape(r#"type="title""#, None));
        assert_eq!(layout.kind(), LayoutKind::TitleOnly);
    }

    #[test]
    fn unknown_types_are_other() {
        let shapes = format!(
            "{}{}",
            ph_shape(r#"type="ftr" idx="10""#, None),
            ph_shape(r#"type="sldNum" idx="11""#, None)
        );
        let layout = parse(&shapes);
        assert!(layout.slots().iter().all(|s| s.role() == SlotRole::Other));
        assert_eq!(layout.kind(), LayoutKind::TitleOnly);
    }

    #[test]
    fn picture_slots_enumerated() {
        let shapes = format!(
            "{}{}{}",
            ph_shape(r#"type="title""#, None),
            ph_shape(r#"type="body" idx="1""#, None),
            ph_shape(r#"type="pic" idx="2""#, None)
        );
        let layout = parse(&shapes);
        assert_eq!(layout.picture_slots().count(), 1);
        assert_eq!(layout.kind(), LayoutKind::Content);
    }

    #[test]
    fn non_placeholder_shapes_ignored() {
        let shapes = r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="decoration"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#;
        let layout = parse(shapes);
        assert!(layout.slots().is_empty());
    }

    #[test]
    fn tiny_geometry_clamped_to_one_line() {
        let layout = parse(&ph_shape(r#"type="body" idx="1""#, Some(1000)));
        assert_eq!(layout.body_capacity(), Some(1));
    }
}
