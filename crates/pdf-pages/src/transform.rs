//! Named page-order transforms
//!
//! Each transform maps a page count to an [`IndexSequence`]. Handlers are
//! plain functions selected by a `match` on [`TransformMode`]; there is no
//! runtime registration.
//!
//! ## Booklet orders (8 pages, 0-based)
//!
//! - Booklet sort: `[0, 7, 1, 6, 2, 5, 3, 4]`
//! - Side-stitch booklet sort, per 4-page signature: `[3, 0, 1, 2, 7, 4, 5, 6]`

use crate::selection;
use crate::types::*;
use std::fmt;
use std::str::FromStr;

/// Repeat count used by [`TransformMode::Duplicate`] when none is given
pub const DEFAULT_DUPLICATE_COUNT: usize = 2;

/// Largest sequence a transform may produce
pub const MAX_OUTPUT_PAGES: usize = 1_000_000;

/// Page reordering modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformMode {
    /// Use a selection expression instead of a named transform
    #[default]
    Custom,
    /// Last page first
    ReverseOrder,
    /// Interleave front and back halves of a simplex scan
    DuplexSort,
    /// Outer pages paired inward for 2-up booklet printing
    BookletSort,
    /// 4-page signatures for side-stitched booklets
    SideStitchBookletSort,
    /// Even positions first, then odd positions
    OddEvenSplit,
    /// Inverse of [`TransformMode::OddEvenSplit`]
    OddEvenMerge,
    RemoveFirst,
    RemoveLast,
    RemoveFirstAndLast,
    /// Repeat each page; the parameter is the repeat count
    Duplicate,
}

type TransformFn = fn(usize, &str) -> IndexSequence;

impl TransformMode {
    pub const ALL: [TransformMode; 11] = [
        TransformMode::Custom,
        TransformMode::ReverseOrder,
        TransformMode::DuplexSort,
        TransformMode::BookletSort,
        TransformMode::SideStitchBookletSort,
        TransformMode::OddEvenSplit,
        TransformMode::OddEvenMerge,
        TransformMode::RemoveFirst,
        TransformMode::RemoveLast,
        TransformMode::RemoveFirstAndLast,
        TransformMode::Duplicate,
    ];

    /// Wire name used in saved configurations
    pub fn tag(self) -> &'static str {
        match self {
            TransformMode::Custom => "CUSTOM",
            TransformMode::ReverseOrder => "REVERSE_ORDER",
            TransformMode::DuplexSort => "DUPLEX_SORT",
            TransformMode::BookletSort => "BOOKLET_SORT",
            TransformMode::SideStitchBookletSort => "SIDE_STITCH_BOOKLET_SORT",
            TransformMode::OddEvenSplit => "ODD_EVEN_SPLIT",
            TransformMode::OddEvenMerge => "ODD_EVEN_MERGE",
            TransformMode::RemoveFirst => "REMOVE_FIRST",
            TransformMode::RemoveLast => "REMOVE_LAST",
            TransformMode::RemoveFirstAndLast => "REMOVE_FIRST_AND_LAST",
            TransformMode::Duplicate => "DUPLICATE",
        }
    }

    /// Handler for a named transform. `Custom` has none.
    fn handler(self) -> Option<TransformFn> {
        let handler: TransformFn = match self {
            TransformMode::Custom => return None,
            TransformMode::ReverseOrder => |total, _| reverse_order(total),
            TransformMode::DuplexSort => |total, _| duplex_sort(total),
            TransformMode::BookletSort => |total, _| booklet_sort(total),
            TransformMode::SideStitchBookletSort => |total, _| side_stitch_booklet_sort(total),
            TransformMode::OddEvenSplit => |total, _| odd_even_split(total),
            TransformMode::OddEvenMerge => |total, _| odd_even_merge(total),
            TransformMode::RemoveFirst => |total, _| remove_first(total),
            TransformMode::RemoveLast => |total, _| remove_last(total),
            TransformMode::RemoveFirstAndLast => |total, _| remove_first_and_last(total),
            TransformMode::Duplicate => {
                |total, parameter| duplicate(total, parse_duplicate_count(parameter))
            }
        };
        Some(handler)
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TransformMode {
    type Err = PageError;

    /// Case-insensitive; `-` is accepted in place of `_`
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        TransformMode::ALL
            .into_iter()
            .find(|mode| mode.tag() == normalized)
            .ok_or_else(|| PageError::UnknownTransformMode(s.to_string()))
    }
}

/// Run a named transform.
///
/// `Custom` is rejected: it has no handler, use [`rearrange`] to resolve it.
pub fn transform(mode: TransformMode, total_pages: usize, parameter: &str) -> Result<IndexSequence> {
    let handler = mode
        .handler()
        .ok_or_else(|| PageError::UnknownTransformMode(mode.tag().to_string()))?;
    if mode == TransformMode::Duplicate {
        check_duplicate_size(total_pages, parse_duplicate_count(parameter))?;
    }
    Ok(clamp_indices(handler(total_pages, parameter), total_pages))
}

/// Compute the page order for a mode.
///
/// For `Custom`, `parameter` is a selection expression; otherwise it is the
/// transform parameter (only `Duplicate` reads it).
pub fn rearrange(mode: TransformMode, parameter: &str, total_pages: usize) -> Result<IndexSequence> {
    match mode {
        TransformMode::Custom => Ok(selection::resolve(parameter, total_pages)?),
        _ => transform(mode, total_pages, parameter),
    }
}

/// Repeat count from a parameter string; anything below 1 falls back to the default
pub fn parse_duplicate_count(parameter: &str) -> usize {
    match parameter.trim().parse::<i64>() {
        Ok(count) if count >= 1 => usize::try_from(count).unwrap_or(usize::MAX),
        _ => DEFAULT_DUPLICATE_COUNT,
    }
}

fn check_duplicate_size(total_pages: usize, count: usize) -> Result<()> {
    match total_pages.checked_mul(count) {
        Some(size) if size <= MAX_OUTPUT_PAGES => Ok(()),
        _ => Err(PageError::Config(format!(
            "Duplicating {total_pages} page(s) {count} times exceeds {MAX_OUTPUT_PAGES} output pages"
        ))),
    }
}

/// Clamp into `0..total`; an empty document yields an empty sequence
fn clamp_indices(indices: IndexSequence, total_pages: usize) -> IndexSequence {
    if total_pages == 0 {
        return Vec::new();
    }
    indices
        .into_iter()
        .map(|idx| idx.min(total_pages - 1))
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

fn reverse_order(total: usize) -> IndexSequence {
    (0..total).rev().collect()
}

fn duplex_sort(total: usize) -> IndexSequence {
    let half = total.div_ceil(2);
    let mut order = Vec::with_capacity(total);
    for i in 0..half {
        order.push(i);
        let mirror = total - i - 1;
        if mirror >= half {
            order.push(mirror);
        }
    }
    order
}

fn booklet_sort(total: usize) -> IndexSequence {
    let mut order = Vec::with_capacity(total);
    for i in 0..total / 2 {
        order.push(i);
        order.push(total - i - 1);
    }
    if total % 2 == 1 {
        order.push(total / 2);
    }
    order
}

fn side_stitch_booklet_sort(total: usize) -> IndexSequence {
    let mut order = Vec::with_capacity(total.div_ceil(4) * 4);
    for signature in 0..total.div_ceil(4) {
        let base = signature * 4;
        order.extend([base + 3, base, base + 1, base + 2]);
    }
    order
}

fn odd_even_split(total: usize) -> IndexSequence {
    (0..total).step_by(2).chain((1..total).step_by(2)).collect()
}

fn odd_even_merge(total: usize) -> IndexSequence {
    let odd_count = total.div_ceil(2);
    let mut order = Vec::with_capacity(total);
    for i in 0..odd_count {
        order.push(i);
        if odd_count + i < total {
            order.push(odd_count + i);
        }
    }
    order
}

fn remove_first(total: usize) -> IndexSequence {
    (1..total).collect()
}

fn remove_last(total: usize) -> IndexSequence {
    (0..total.saturating_sub(1)).collect()
}

fn remove_first_and_last(total: usize) -> IndexSequence {
    (1..total.saturating_sub(1)).collect()
}

fn duplicate(total: usize, count: usize) -> IndexSequence {
    let count = count.max(1);
    (0..total)
        .flat_map(|idx| std::iter::repeat_n(idx, count))
        .collect()
}
