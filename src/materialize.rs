//! Slide materialization: bind outline text into a chosen layout's slots.
//!
//! One outline slide becomes one or more [`MaterializedSlide`]s. Content
//! points beyond the body slot's capacity hint spill greedily onto
//! continuation slides that reuse the same layout, titled
//! `"<title> (cont.)"`. Points are never reordered, merged, dropped, or
//! duplicated.

use crate::outline::SlideSpec;
use crate::template::{DEFAULT_BODY_CAPACITY, LayoutDescriptor, PlaceholderSlot, SlotRole};
use crate::warning::{Warning, record};

/// Hard ceiling on title length, in characters, ellipsis included.
pub const TITLE_MAX_CHARS: usize = 120;

/// Suffix appended to the titles of overflow continuation slides.
pub const CONTINUATION_SUFFIX: &str = " (cont.)";

/// Where a binding lands on the generated slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindTarget {
    /// A placeholder slot declared by the layout; the slide echoes the
    /// layout's `p:ph` attributes so style inheritance resolves identically
    Slot(PlaceholderSlot),
    /// A plain text box at a default body rectangle; used only when the
    /// chosen layout offers no slot that can carry the text
    TextBox,
}

/// Text bound to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindText {
    /// A single run (titles)
    Line(String),
    /// One paragraph per content point, in outline order
    Points(Vec<String>),
    /// Deliberately empty (unfilled picture slots keep their frame)
    Empty,
}

/// One slot-to-content binding on a materialized slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub target: BindTarget,
    pub role: SlotRole,
    pub text: BindText,
}

/// A concrete output slide: a layout identifier plus bound content.
///
/// Created here, consumed immediately by the assembler, not retained after
/// assembly.
#[derive(Debug, Clone)]
pub struct MaterializedSlide {
    layout_index: usize,
    bindings: Vec<Binding>,
}

impl MaterializedSlide {
    /// Identifier of the chosen layout.
    #[inline]
    pub fn layout_index(&self) -> usize {
        self.layout_index
    }

    /// All bindings, title first.
    #[inline]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The bound title text.
    pub fn title(&self) -> Option<&str> {
        self.bindings.iter().find_map(|b| match (&b.role, &b.text) {
            (SlotRole::Title, BindText::Line(t)) => Some(t.as_str()),
            _ => None,
        })
    }

    /// The content points bound to this slide, in order.
    pub fn content_points(&self) -> impl Iterator<Item = &str> {
        self.bindings
            .iter()
            .filter_map(|b| match &b.text {
                BindText::Points(points) if b.role != SlotRole::Title => Some(points),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }
}

/// Materialize one outline slide against its chosen layout.
///
/// Returns at least one slide. With `n` content points and body capacity `C`,
/// returns `ceil(n / C)` slides, the last carrying the remainder.
pub fn materialize(
    slide_pos: usize,
    spec: &SlideSpec,
    layout: &LayoutDescriptor,
    warnings: &mut Vec<Warning>,
) -> Vec<MaterializedSlide> {
    let title = bounded_title(slide_pos, spec.title(), warnings);

    // Resolve where content points go and how many fit per slide.
    let body_target = if spec.content().is_empty() {
        None
    } else if let Some(slot) = layout.primary_body_slot() {
        Some((BindTarget::Slot(slot.clone()), SlotRole::Body, slot.capacity()))
    } else if let Some(slot) = layout.subtitle_slot() {
        record(
            warnings,
            Warning::MissingBodySlot {
                slide: slide_pos,
                layout: layout.name().to_string(),
                target: "the subtitle slot".to_string(),
            },
        );
        Some((BindTarget::Slot(slot.clone()), SlotRole::Subtitle, slot.capacity()))
    } else {
        record(
            warnings,
            Warning::MissingBodySlot {
                slide: slide_pos,
                layout: layout.name().to_string(),
                target: "a text box".to_string(),
            },
        );
        Some((BindTarget::TextBox, SlotRole::Body, DEFAULT_BODY_CAPACITY))
    };

    let picture_slots: Vec<&PlaceholderSlot> = layout.picture_slots().collect();
    if !picture_slots.is_empty() {
        record(
            warnings,
            Warning::EmptyPictureSlot {
                slide: slide_pos,
                layout: layout.name().to_string(),
            },
        );
    }

    let chunks: Vec<&[String]> = match &body_target {
        Some((_, _, capacity)) => spec.content().chunks(*capacity as usize).collect(),
        None => vec![&spec.content()[..]],
    };
    if chunks.len() > 1 {
        tracing::debug!(
            slide = slide_pos,
            points = spec.content().len(),
            slides = chunks.len(),
            "content overflows onto continuation slides"
        );
    }

    let mut slides = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let slide_title = if i == 0 {
            title.clone()
        } else {
            format!("{title}{CONTINUATION_SUFFIX}")
        };

        let mut bindings = Vec::new();
        bindings.push(match layout.title_slot() {
            Some(slot) => Binding {
                target: BindTarget::Slot(slot.clone()),
                role: SlotRole::Title,
                text: BindText::Line(slide_title),
            },
            None => Binding {
                target: BindTarget::TextBox,
                role: SlotRole::Title,
                text: BindText::Line(slide_title),
            },
        });

        if let Some((target, role, _)) = &body_target {
            if !chunk.is_empty() {
                bindings.push(Binding {
                    target: target.clone(),
                    role: *role,
                    text: BindText::Points(chunk.to_vec()),
                });
            }
        }

        for slot in &picture_slots {
            bindings.push(Binding {
                target: BindTarget::Slot((*slot).clone()),
                role: SlotRole::Picture,
                text: BindText::Empty,
            });
        }

        slides.push(MaterializedSlide {
            layout_index: layout.index(),
            bindings,
        });
    }
    slides
}

/// Apply the title-length ceiling, recording a warning when it bites.
fn bounded_title(slide_pos: usize, title: &str, warnings: &mut Vec<Warning>) -> String {
    if title.chars().count() <= TITLE_MAX_CHARS {
        return title.to_string();
    }
    let mut truncated: String = title.chars().take(TITLE_MAX_CHARS - 1).collect();
    truncated.push('…');
    record(
        warnings,
        Warning::TitleTruncated {
            slide: slide_pos,
            limit: TITLE_MAX_CHARS,
        },
    );
    truncated
}
