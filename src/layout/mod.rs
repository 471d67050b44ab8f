//! Geometry shared by the layout tree: pointer points, floating-point drop
//! areas, and the pixel helpers used when laying out rows and columns.

pub mod area;
pub mod sizing;

pub use area::{Area, AreaKind, AreaRect, GroundSide, Segment};

use ratatui::prelude::{Direction, Rect};

/// A pointer position.
///
/// Terminal hosts report whole cells; `Point::cell` maps a cell to its centre
/// so that strict containment tests behave like half-open cell ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn cell(column: u16, row: u16) -> Self {
        Self {
            x: f64::from(column) + 0.5,
            y: f64::from(row) + 0.5,
        }
    }

    /// The cell this point falls in, clamped at zero.
    pub fn to_cell(self) -> (u16, u16) {
        let clamp = |v: f64| v.floor().clamp(0.0, f64::from(u16::MAX)) as u16;
        (clamp(self.x), clamp(self.y))
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

/// Extent of `rect` along `direction`.
pub fn axis_len(direction: Direction, rect: Rect) -> u16 {
    match direction {
        Direction::Horizontal => rect.width,
        Direction::Vertical => rect.height,
    }
}

/// Lay `sizes` out one after another along `direction`, leaving `gap`
/// pixels between neighbours. Returns the child rects and the gap rects.
pub fn build_rects_with_gaps(
    direction: Direction,
    area: Rect,
    sizes: &[u16],
    gap: u16,
) -> (Vec<Rect>, Vec<Rect>) {
    let mut rects = Vec::with_capacity(sizes.len());
    let mut gaps = Vec::with_capacity(sizes.len().saturating_sub(1));
    let mut cursor_x = area.x;
    let mut cursor_y = area.y;
    for (idx, size) in sizes.iter().enumerate() {
        if idx > 0 {
            let gap_rect = match direction {
                Direction::Horizontal => Rect {
                    x: cursor_x,
                    y: area.y,
                    width: gap,
                    height: area.height,
                },
                Direction::Vertical => Rect {
                    x: area.x,
                    y: cursor_y,
                    width: area.width,
                    height: gap,
                },
            };
            gaps.push(gap_rect);
            match direction {
                Direction::Horizontal => cursor_x = cursor_x.saturating_add(gap),
                Direction::Vertical => cursor_y = cursor_y.saturating_add(gap),
            }
        }
        let rect = match direction {
            Direction::Horizontal => {
                let rect = Rect {
                    x: cursor_x,
                    y: area.y,
                    width: *size,
                    height: area.height,
                };
                cursor_x = cursor_x.saturating_add(*size);
                rect
            }
            Direction::Vertical => {
                let rect = Rect {
                    x: area.x,
                    y: cursor_y,
                    width: area.width,
                    height: *size,
                };
                cursor_y = cursor_y.saturating_add(*size);
                rect
            }
        };
        rects.push(rect);
    }
    (rects, gaps)
}
