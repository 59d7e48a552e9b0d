//! Layout selection: pick one layout per outline slide.
//!
//! Deterministic by construction: identical outline and template inputs make
//! identical choices, which is what makes whole-run output reproducible.

use crate::outline::SlideSpec;
use crate::template::{LayoutDescriptor, LayoutKind};
use crate::warning::{Warning, record};

/// Choose the best-matching layout for one outline slide.
///
/// Policy, in priority order:
/// 1. a slide with zero content points takes the template's first
///    section-tagged layout when one exists (title-only slides are treated as
///    section breaks);
/// 2. otherwise, the content-capable layout whose body capacity hint is
///    closest to the content-point count without being below it, or, when
///    every capacity is below the count, the largest one. Ties go to the
///    first-declared layout.
/// 3. if the template has no content-capable layout at all, the first layout
///    is used and a [`Warning::LayoutFallback`] is recorded.
///
/// Never fails: `layouts` is non-empty by the introspection contract.
pub fn select_layout<'a>(
    slide_pos: usize,
    spec: &SlideSpec,
    layouts: &'a [LayoutDescriptor],
    warnings: &mut Vec<Warning>,
) -> &'a LayoutDescriptor {
    if spec.content().is_empty() {
        if let Some(section) = layouts.iter().find(|l| l.kind() == LayoutKind::Section) {
            tracing::debug!(slide = slide_pos, layout = section.index(), "section layout");
            return section;
        }
    }

    let count = spec.content().len() as u32;
    let mut best: Option<(&LayoutDescriptor, u32)> = None;
    for layout in layouts.iter().filter(|l| l.kind() == LayoutKind::Content) {
        // Content layouts always have a primary body slot
        let Some(capacity) = layout.body_capacity() else {
            continue;
        };
        best = match best {
            None => Some((layout, capacity)),
            Some((_, held)) if prefer(capacity, held, count) => Some((layout, capacity)),
            keep => keep,
        };
    }

    if let Some((layout, capacity)) = best {
        tracing::debug!(
            slide = slide_pos,
            layout = layout.index(),
            capacity,
            points = count,
            "layout selected"
        );
        return layout;
    }

    let fallback = &layouts[0];
    record(
        warnings,
        Warning::LayoutFallback {
            slide: slide_pos,
            layout: fallback.name().to_string(),
        },
    );
    fallback
}

/// Is `candidate` capacity a better fit than the `held` one for `count`
/// points? Strict preference only: equal capacities keep the earlier layout.
fn prefer(candidate: u32, held: u32, count: u32) -> bool {
    let cand_fits = candidate >= count;
    let held_fits = held >= count;
    if cand_fits != held_fits {
        return cand_fits;
    }
    if cand_fits {
        candidate < held
    } else {
        candidate > held
    }
}
