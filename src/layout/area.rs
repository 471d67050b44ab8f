//! Drop areas and pointer hit-testing.
//!
//! Areas are recomputed from item rects before every drag; they are never
//! stored in the tree. Coordinates are floating point so stack quadrants can
//! be split at quarter and half widths without losing precision.

use ratatui::prelude::{Direction, Rect};

use super::Point;
use crate::items::ItemKey;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl AreaRect {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x1: f64::from(rect.x),
            y1: f64::from(rect.y),
            x2: f64::from(rect.x) + f64::from(rect.width),
            y2: f64::from(rect.y) + f64::from(rect.height),
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn surface(&self) -> f64 {
        self.width() * self.height()
    }

    /// Strict containment on every edge.
    pub fn contains(&self, point: Point) -> bool {
        self.x1 < point.x && self.x2 > point.x && self.y1 < point.y && self.y2 > point.y
    }

    /// Smallest whole-pixel rect covering this area.
    pub fn to_rect(&self) -> Rect {
        let x1 = self.x1.floor().max(0.0);
        let y1 = self.y1.floor().max(0.0);
        let x2 = self.x2.ceil().max(x1);
        let y2 = self.y2.ceil().max(y1);
        let clamp = |v: f64| v.min(f64::from(u16::MAX)) as u16;
        Rect {
            x: clamp(x1),
            y: clamp(y1),
            width: clamp(x2 - x1),
            height: clamp(y2 - y1),
        }
    }
}

/// One of the four layout-edge strips a dragged item can dock against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundSide {
    Top,
    Left,
    Bottom,
    Right,
}

impl GroundSide {
    /// Strips are emitted in this order.
    pub const ALL: [GroundSide; 4] = [
        GroundSide::Top,
        GroundSide::Left,
        GroundSide::Bottom,
        GroundSide::Right,
    ];

    /// Axis the dropped item is laid out along.
    pub fn direction(self) -> Direction {
        match self {
            GroundSide::Left | GroundSide::Right => Direction::Horizontal,
            GroundSide::Top | GroundSide::Bottom => Direction::Vertical,
        }
    }

    pub fn insert_before(self) -> bool {
        matches!(self, GroundSide::Top | GroundSide::Left)
    }

    fn strip(self, bounds: AreaRect, size: f64) -> AreaRect {
        let mut strip = bounds;
        match self {
            GroundSide::Top => strip.y2 = bounds.y1 + size,
            GroundSide::Left => strip.x2 = bounds.x1 + size,
            GroundSide::Bottom => strip.y1 = bounds.y2 - size,
            GroundSide::Right => strip.x1 = bounds.x2 - size,
        }
        strip
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    /// The whole ground when the layout is empty, or one of its edge strips.
    Ground { side: Option<GroundSide> },
    /// A stack's full element.
    Stack,
    /// A stack's header strip.
    StackHeader,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub owner: ItemKey,
    pub kind: AreaKind,
    pub rect: AreaRect,
    pub surface: f64,
}

impl Area {
    pub fn new(owner: ItemKey, kind: AreaKind, rect: AreaRect) -> Self {
        Self {
            owner,
            kind,
            rect,
            surface: rect.surface(),
        }
    }
}

/// Return the innermost area under `point`: the containing area with the
/// smallest surface, first one listed on ties.
pub fn hit_test(areas: &[Area], point: Point) -> Option<&Area> {
    let mut matching = None;
    let mut smallest = f64::INFINITY;
    for area in areas {
        if area.rect.contains(point) && smallest > area.surface {
            smallest = area.surface;
            matching = Some(area);
        }
    }
    matching
}

/// Build the four edge strips of the ground, each `size` pixels thick.
pub fn ground_side_areas(owner: ItemKey, bounds: AreaRect, size: f64) -> Vec<Area> {
    GroundSide::ALL
        .iter()
        .map(|side| {
            Area::new(
                owner,
                AreaKind::Ground { side: Some(*side) },
                side.strip(bounds, size),
            )
        })
        .collect()
}

/// Part of a stack the pointer is over while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Body,
    Left,
    Top,
    Right,
    Bottom,
}

impl Segment {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Segment::Left | Segment::Right => Some(Direction::Horizontal),
            Segment::Top | Segment::Bottom => Some(Direction::Vertical),
            Segment::Header | Segment::Body => None,
        }
    }

    pub fn insert_before(self) -> bool {
        matches!(self, Segment::Top | Segment::Left)
    }
}

/// Hover region of a stack segment and the region highlighted when hovering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentArea {
    pub segment: Segment,
    pub hover: AreaRect,
    pub highlight: AreaRect,
}

/// Segments of a stack, in the order they are tested.
///
/// An empty stack exposes its whole content rect as `Body`. A populated one
/// exposes four quadrants: left and right hover over the outer quarters,
/// top and bottom over the middle half split horizontally, and each
/// highlights the matching half of the content.
pub fn stack_segments(header: Option<AreaRect>, content: AreaRect, empty: bool) -> Vec<SegmentArea> {
    let mut segments = Vec::with_capacity(5);
    if let Some(header) = header {
        segments.push(SegmentArea {
            segment: Segment::Header,
            hover: header,
            highlight: header,
        });
    }

    if empty {
        segments.push(SegmentArea {
            segment: Segment::Body,
            hover: content,
            highlight: content,
        });
        return segments;
    }

    let w = content.width();
    let h = content.height();
    let AreaRect { x1, y1, x2, y2 } = content;
    segments.push(SegmentArea {
        segment: Segment::Left,
        hover: AreaRect::new(x1, y1, x1 + w * 0.25, y2),
        highlight: AreaRect::new(x1, y1, x1 + w * 0.5, y2),
    });
    segments.push(SegmentArea {
        segment: Segment::Top,
        hover: AreaRect::new(x1 + w * 0.25, y1, x1 + w * 0.75, y1 + h * 0.5),
        highlight: AreaRect::new(x1, y1, x2, y1 + h * 0.5),
    });
    segments.push(SegmentArea {
        segment: Segment::Right,
        hover: AreaRect::new(x1 + w * 0.75, y1, x2, y2),
        highlight: AreaRect::new(x1 + w * 0.5, y1, x2, y2),
    });
    segments.push(SegmentArea {
        segment: Segment::Bottom,
        hover: AreaRect::new(x1 + w * 0.25, y1 + h * 0.5, x1 + w * 0.75, y2),
        highlight: AreaRect::new(x1, y1 + h * 0.5, x2, y2),
    });
    segments
}

pub fn segment_at(segments: &[SegmentArea], point: Point) -> Option<&SegmentArea> {
    segments.iter().find(|s| s.hover.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys() -> (ItemKey, ItemKey) {
        let mut map: SlotMap<ItemKey, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()))
    }

    #[test]
    fn smallest_surface_wins() {
        let (outer, inner) = keys();
        let areas = vec![
            Area::new(outer, AreaKind::Stack, AreaRect::new(0.0, 0.0, 100.0, 100.0)),
            Area::new(inner, AreaKind::StackHeader, AreaRect::new(0.0, 0.0, 100.0, 20.0)),
        ];
        let hit = hit_test(&areas, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(hit.owner, inner);
        let hit = hit_test(&areas, Point::new(10.0, 50.0)).unwrap();
        assert_eq!(hit.owner, outer);
        assert!(hit_test(&areas, Point::new(100.0, 50.0)).is_none());
    }

    #[test]
    fn first_area_wins_on_equal_surface() {
        let (a, b) = keys();
        let rect = AreaRect::new(0.0, 0.0, 10.0, 10.0);
        let areas = vec![
            Area::new(a, AreaKind::Stack, rect),
            Area::new(b, AreaKind::Stack, rect),
        ];
        assert_eq!(hit_test(&areas, Point::new(5.0, 5.0)).unwrap().owner, a);
    }

    #[test]
    fn cell_centres_make_containment_half_open() {
        let rect = AreaRect::from_rect(Rect::new(0, 0, 4, 4));
        assert!(rect.contains(Point::cell(0, 0)));
        assert!(rect.contains(Point::cell(3, 3)));
        assert!(!rect.contains(Point::cell(4, 0)));
    }

    #[test]
    fn ground_strips_hug_each_edge() {
        let (ground, _) = keys();
        let areas = ground_side_areas(ground, AreaRect::new(0.0, 0.0, 400.0, 300.0), 50.0);
        let by_side = |side| {
            areas
                .iter()
                .find(|a| a.kind == AreaKind::Ground { side: Some(side) })
                .unwrap()
                .rect
        };
        assert_eq!(by_side(GroundSide::Top), AreaRect::new(0.0, 0.0, 400.0, 50.0));
        assert_eq!(by_side(GroundSide::Left), AreaRect::new(0.0, 0.0, 50.0, 300.0));
        assert_eq!(
            by_side(GroundSide::Bottom),
            AreaRect::new(0.0, 250.0, 400.0, 300.0)
        );
        assert_eq!(
            by_side(GroundSide::Right),
            AreaRect::new(350.0, 0.0, 400.0, 300.0)
        );
        assert!(GroundSide::Top.insert_before());
        assert!(!GroundSide::Right.insert_before());
        assert_eq!(GroundSide::Left.direction(), Direction::Horizontal);
    }

    #[test]
    fn populated_stack_exposes_four_quadrants() {
        let header = AreaRect::new(0.0, 0.0, 200.0, 20.0);
        let content = AreaRect::new(0.0, 20.0, 200.0, 120.0);
        let segments = stack_segments(Some(header), content, false);
        let at = |x, y| segment_at(&segments, Point::new(x, y)).map(|s| s.segment);
        assert_eq!(at(100.0, 10.0), Some(Segment::Header));
        assert_eq!(at(20.0, 70.0), Some(Segment::Left));
        assert_eq!(at(180.0, 70.0), Some(Segment::Right));
        assert_eq!(at(100.0, 40.0), Some(Segment::Top));
        assert_eq!(at(100.0, 100.0), Some(Segment::Bottom));

        let right = segments.iter().find(|s| s.segment == Segment::Right).unwrap();
        assert_eq!(right.highlight, AreaRect::new(100.0, 20.0, 200.0, 120.0));
    }

    #[test]
    fn empty_stack_exposes_its_body() {
        let content = AreaRect::new(0.0, 20.0, 200.0, 120.0);
        let segments = stack_segments(None, content, true);
        assert_eq!(segments.len(), 1);
        assert_eq!(
            segment_at(&segments, Point::new(5.0, 25.0)).map(|s| s.segment),
            Some(Segment::Body)
        );
    }

    #[test]
    fn to_rect_covers_fractional_edges() {
        let rect = AreaRect::new(1.5, 2.0, 10.25, 4.0).to_rect();
        assert_eq!(rect, Rect::new(1, 2, 10, 2));
    }
}
