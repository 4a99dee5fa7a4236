//! Slicing the laid out column into pages
//!
//! The column is cut every `page_height` CSS pixels. Under
//! [`PageBreakMode::AvoidAll`] a fragment that would straddle a cut is pushed
//! to the next page when it fits there whole; otherwise, and under
//! [`PageBreakMode::Auto`], it is split at the deepest breakpoint that fits.
//! A fragment with no breakpoint above the cut is moved rather than cut
//! through; only a fragment already starting a page is cut mid-line.

use crate::export::layout::{Fragment, Item, Layout};
use crate::export::options::PageBreakMode;
use tracing::debug;

/// Tolerance for float comparisons against page edges
const EPSILON: f32 = 0.01;

/// Items on one page, in CSS pixels relative to the page's content box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
}

/// Distribute the column over pages of `page_height` CSS pixels
///
/// Always yields at least one page.
pub fn paginate(layout: &Layout, page_height: f32, mode: PageBreakMode) -> Vec<Page> {
    let page_height = page_height.max(1.0);
    let mut pages = vec![Page::default()];
    // Blank space inserted so far by moved or split fragments
    let mut shift = 0.0;

    for fragment in &layout.fragments {
        let mut top = fragment.top + shift;
        let mut offset = 0.0;

        loop {
            let page = page_index(top, page_height);
            let page_top = page as f32 * page_height;
            let page_bottom = page_top + page_height;
            let remaining = fragment.height - offset;

            if top + remaining <= page_bottom + EPSILON {
                let room = page_bottom - top;
                place(&mut pages, page, fragment, offset, fragment.height, top - page_top, room);
                break;
            }

            let room = page_bottom - top;
            let cut = deepest_breakpoint(fragment, offset, offset + room);
            let at_page_top = top - page_top <= EPSILON;
            let fits_fresh_page = remaining <= page_height + EPSILON;
            // Without a breakpoint in reach, only a page top may cut through a line
            let stranded = cut.is_none() || (fits_fresh_page && mode == PageBreakMode::AvoidAll);
            if stranded && !at_page_top {
                debug!(page = page + 1, "moving block to the next page");
                shift += room;
                top = page_bottom;
                continue;
            }

            let cut = cut.unwrap_or(offset + room);
            place(&mut pages, page, fragment, offset, cut, top - page_top, room);
            shift += offset + room - cut;
            top = page_bottom;
            offset = cut;
        }
    }

    pages
}

fn page_index(top: f32, page_height: f32) -> usize {
    // A fragment starting a hair above a cut belongs to the next page
    ((top + EPSILON) / page_height).floor().max(0.0) as usize
}

/// Deepest breakpoint strictly after `from` and no deeper than `limit`
fn deepest_breakpoint(fragment: &Fragment, from: f32, limit: f32) -> Option<f32> {
    fragment
        .breakpoints
        .iter()
        .copied()
        .rev()
        .find(|&b| b > from + EPSILON && b <= limit + EPSILON)
}

/// Copy the slice `start..end` of a fragment onto a page at `page_y`
///
/// Text lands on the slice holding its baseline and images on the slice
/// holding their top edge. Rects and links are clipped to the slice, except
/// that on the final slice they may run on to the page bottom, `room` below
/// `page_y`.
fn place(
    pages: &mut Vec<Page>,
    page: usize,
    fragment: &Fragment,
    start: f32,
    end: f32,
    page_y: f32,
    room: f32,
) {
    while pages.len() <= page {
        pages.push(Page::default());
    }
    let clip_end = if end >= fragment.height - EPSILON {
        start + room
    } else {
        end
    };
    let first = start <= EPSILON;
    let target = &mut pages[page].items;

    for item in &fragment.items {
        let kept = match item {
            Item::Text { y, .. } => {
                let inside = (first || *y > start) && *y <= end + EPSILON;
                inside.then(|| item.clone())
            }
            Item::Image { y, .. } => {
                let last = end >= fragment.height - EPSILON;
                let inside = (first || *y >= start) && (*y < end || last);
                inside.then(|| item.clone())
            }
            Item::Rect {
                x,
                y,
                width,
                height,
                color,
            } => clip(*y, *height, start, clip_end).map(|(y, height)| Item::Rect {
                x: *x,
                y,
                width: *width,
                height,
                color: *color,
            }),
            Item::Link {
                x,
                y,
                width,
                height,
                url,
            } => clip(*y, *height, start, clip_end).map(|(y, height)| Item::Link {
                x: *x,
                y,
                width: *width,
                height,
                url: url.clone(),
            }),
        };
        if let Some(mut item) = kept {
            item.shift(page_y - start);
            target.push(item);
        }
    }
}

/// Intersect the span `y..y + height` with `start..end`
fn clip(y: f32, height: f32, start: f32, end: f32) -> Option<(f32, f32)> {
    let top = y.max(start);
    let bottom = (y + height).min(end);
    (bottom - top > EPSILON).then_some((top, bottom - top))
}
