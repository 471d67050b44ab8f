//! Splitters between the children of rows and columns.
//!
//! Splitters are not stored; a row or column recomputes their rects on every
//! layout pass. A drag moves a ghost of the splitter within the range the
//! neighbours' minimum sizes allow and commits on release.

use ratatui::prelude::{Direction, Rect};

use crate::error::LayoutResult;
use crate::items::{ItemKey, ItemTree};
use crate::layout::{Point, rect_contains};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterHit {
    pub container: ItemKey,
    /// The splitter sits after child `index`.
    pub index: usize,
    pub rect: Rect,
    pub direction: Direction,
}

/// Grow a splitter's rect across its axis to the grab width.
fn grab_rect(rect: Rect, direction: Direction, grab: u16) -> Rect {
    let extra = grab.saturating_sub(match direction {
        Direction::Horizontal => rect.width,
        Direction::Vertical => rect.height,
    }) / 2;
    match direction {
        Direction::Horizontal => Rect::new(
            rect.x.saturating_sub(extra),
            rect.y,
            rect.width + extra * 2,
            rect.height,
        ),
        Direction::Vertical => Rect::new(
            rect.x,
            rect.y.saturating_sub(extra),
            rect.width,
            rect.height + extra * 2,
        ),
    }
}

/// Innermost splitter whose grab area covers the cell.
pub fn splitter_at(tree: &ItemTree, column: u16, row: u16) -> Option<SplitterHit> {
    let grab = tree.dimensions.border_grab_width;
    let mut found = None;
    for key in tree.all_items() {
        let Some(item) = tree.get(key) else {
            continue;
        };
        let Some(direction) = item.direction() else {
            continue;
        };
        for (index, rect) in item.splitters().iter().enumerate() {
            if rect_contains(grab_rect(*rect, direction, grab), column, row) {
                // later (deeper) containers override earlier ones
                found = Some(SplitterHit {
                    container: key,
                    index,
                    rect: *rect,
                    direction,
                });
            }
        }
    }
    found
}

#[derive(Debug, Clone, Copy)]
pub struct SplitterDrag {
    hit: SplitterHit,
    origin: Point,
    range: (i32, i32),
    offset: i32,
}

impl SplitterDrag {
    pub fn start(tree: &ItemTree, hit: SplitterHit, origin: Point) -> LayoutResult<Self> {
        let range = tree.splitter_range(hit.container, hit.index)?;
        Ok(Self {
            hit,
            origin,
            range,
            offset: 0,
        })
    }

    pub fn hit(&self) -> SplitterHit {
        self.hit
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn update(&mut self, point: Point) {
        let delta = match self.hit.direction {
            Direction::Horizontal => point.x - self.origin.x,
            Direction::Vertical => point.y - self.origin.y,
        };
        self.offset = (delta.round() as i32).clamp(self.range.0, self.range.1);
    }

    /// The splitter as drawn at the current offset.
    pub fn ghost(&self) -> Rect {
        let rect = self.hit.rect;
        let shift = |v: u16| (i32::from(v) + self.offset).max(0) as u16;
        match self.hit.direction {
            Direction::Horizontal => Rect { x: shift(rect.x), ..rect },
            Direction::Vertical => Rect { y: shift(rect.y), ..rect },
        }
    }

    pub fn commit(self, tree: &mut ItemTree) -> LayoutResult<()> {
        tree.apply_splitter_offset(self.hit.container, self.hit.index, self.offset)
    }
}
