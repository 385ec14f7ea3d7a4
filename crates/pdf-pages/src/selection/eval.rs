//! Evaluation of a [`Selection`] against a page count

use super::parser::{Parity, Selection};
use crate::types::PageIndex;
use indexmap::IndexSet;

impl Selection {
    /// Evaluate into zero-based page indices.
    ///
    /// Pages outside `1..=total_pages` are dropped. `or` keeps first-occurrence
    /// order, `and` keeps the order of its left operand, `not` is ascending.
    pub fn evaluate(&self, total_pages: usize) -> IndexSet<PageIndex> {
        match self {
            Selection::Page(page) => single(*page, total_pages),
            Selection::Range { start, end } => range(*start, *end, total_pages),
            Selection::Step { every, offset } => progression(*every, *offset, total_pages),
            Selection::Parity(Parity::Even) => progression(2, 0, total_pages),
            Selection::Parity(Parity::Odd) => progression(2, -1, total_pages),
            Selection::Not(inner) => {
                let excluded = inner.evaluate(total_pages);
                (0..total_pages)
                    .filter(|idx| !excluded.contains(idx))
                    .collect()
            }
            Selection::And(left, right) => {
                let left = left.evaluate(total_pages);
                if left.is_empty() {
                    return left;
                }
                let right = right.evaluate(total_pages);
                left.into_iter().filter(|idx| right.contains(idx)).collect()
            }
            Selection::Or(left, right) => {
                let mut pages = left.evaluate(total_pages);
                pages.extend(right.evaluate(total_pages));
                pages
            }
        }
    }
}

fn single(page: u64, total_pages: usize) -> IndexSet<PageIndex> {
    let mut pages = IndexSet::new();
    if let Some(idx) = to_index(page, total_pages) {
        pages.insert(idx);
    }
    pages
}

fn range(start: u64, end: u64, total_pages: usize) -> IndexSet<PageIndex> {
    let start = start.max(1);
    let end = end.min(total_pages as u64);
    if start > end {
        return IndexSet::new();
    }
    (start..=end).map(|page| (page - 1) as PageIndex).collect()
}

/// Pages `every * n + offset` for `n >= 0`, restricted to `1..=total_pages`
fn progression(every: u64, offset: i64, total_pages: usize) -> IndexSet<PageIndex> {
    if every == 0 || total_pages == 0 {
        return IndexSet::new();
    }

    let every = i128::from(every);
    let offset = i128::from(offset);
    let last = total_pages as i128;

    // Smallest n with every * n + offset >= 1
    let first_n = if offset >= 1 {
        0
    } else {
        (1 - offset + every - 1) / every
    };

    let mut pages = IndexSet::new();
    let mut value = every * first_n + offset;
    while value <= last {
        pages.insert((value - 1) as PageIndex);
        value += every;
    }
    pages
}

fn to_index(page: u64, total_pages: usize) -> Option<PageIndex> {
    if page >= 1 && page <= total_pages as u64 {
        Some((page - 1) as PageIndex)
    } else {
        None
    }
}
