//! The floating stand-in for an item being dragged, and drop resolution.

use ratatui::prelude::Rect;

use crate::items::{ItemKey, ItemTree};
use crate::layout::area::{SegmentArea, ground_side_areas, hit_test, segment_at, stack_segments};
use crate::layout::{Area, AreaKind, AreaRect, GroundSide, Point, Segment};

/// Where an item will land if released now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropTarget {
    Ground {
        side: Option<GroundSide>,
    },
    Stack {
        stack: ItemKey,
        segment: Segment,
        /// Tab insertion index for header drops.
        index: Option<usize>,
    },
}

/// Candidate drop areas for the current tree.
///
/// An empty layout offers the whole ground. Otherwise every stack offers its
/// element and its header strip, and unless the root itself is a stack the
/// ground offers four edge strips.
pub fn drop_areas(tree: &ItemTree) -> Vec<Area> {
    let ground = tree.ground();
    let Some(ground_item) = tree.get(ground) else {
        return Vec::new();
    };
    let bounds = AreaRect::from_rect(ground_item.rect());
    let Some(root) = tree.root() else {
        return vec![Area::new(ground, AreaKind::Ground { side: None }, bounds)];
    };

    let mut areas = Vec::new();
    if !tree.get(root).is_some_and(|r| r.is_stack()) {
        let size = f64::from(tree.dimensions.dock_edge_size);
        areas.extend(ground_side_areas(ground, bounds, size));
    }
    for stack in tree.stacks() {
        let Some(item) = tree.get(stack) else {
            continue;
        };
        let rect = item.rect();
        if rect.width == 0 || rect.height == 0 {
            continue;
        }
        areas.push(Area::new(stack, AreaKind::Stack, AreaRect::from_rect(rect)));
        if let Some(state) = item.stack() {
            let header = state.header().rect();
            if state.header().side().is_some() && header.width > 0 && header.height > 0 {
                areas.push(Area::new(
                    stack,
                    AreaKind::StackHeader,
                    AreaRect::from_rect(header),
                ));
            }
        }
    }
    areas
}

fn segments_for(tree: &ItemTree, stack: ItemKey) -> Vec<SegmentArea> {
    let Some(item) = tree.get(stack) else {
        return Vec::new();
    };
    let Some(state) = item.stack() else {
        return Vec::new();
    };
    let header = state.header();
    let header_area = (header.side().is_some() && header.rect().area() > 0)
        .then(|| AreaRect::from_rect(header.rect()));
    stack_segments(
        header_area,
        AreaRect::from_rect(state.content_rect()),
        item.children().is_empty(),
    )
}

#[derive(Debug, Clone)]
pub struct DragProxy {
    item: ItemKey,
    title: String,
    origin_parent: Option<ItemKey>,
    origin_index: Option<usize>,
    areas: Vec<Area>,
    bounds: AreaRect,
    constrain: bool,
    size: (u16, u16),
    point: Point,
    target: Option<DropTarget>,
    last_valid: Option<DropTarget>,
    indicator: Option<Rect>,
}

impl DragProxy {
    /// `areas` must be computed after `item` has been detached.
    pub fn new(
        item: ItemKey,
        title: String,
        origin: Option<(ItemKey, usize)>,
        areas: Vec<Area>,
        bounds: Rect,
        constrain: bool,
        size: (u16, u16),
    ) -> Self {
        Self {
            item,
            title,
            origin_parent: origin.map(|(p, _)| p),
            origin_index: origin.map(|(_, i)| i),
            areas,
            bounds: AreaRect::from_rect(bounds),
            constrain,
            size,
            point: Point::new(0.0, 0.0),
            target: None,
            last_valid: None,
            indicator: None,
        }
    }

    pub fn item(&self) -> ItemKey {
        self.item
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn origin(&self) -> Option<(ItemKey, usize)> {
        self.origin_parent.zip(self.origin_index)
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn target(&self) -> Option<DropTarget> {
        self.target
    }

    /// Highlight for the current target.
    pub fn indicator(&self) -> Option<Rect> {
        self.indicator
    }

    /// Where the proxy is drawn: anchored at the pointer, kept inside the
    /// layout bounds.
    pub fn rect(&self) -> Rect {
        let bounds = self.bounds.to_rect();
        let width = self.size.0.min(bounds.width);
        let height = self.size.1.min(bounds.height);
        let (x, y) = self.point.to_cell();
        let max_x = (bounds.x + bounds.width).saturating_sub(width);
        let max_y = (bounds.y + bounds.height).saturating_sub(height);
        Rect::new(x.clamp(bounds.x, max_x.max(bounds.x)), y.clamp(bounds.y, max_y.max(bounds.y)), width, height)
    }

    /// Follow the pointer to `point`, re-resolving the drop target.
    pub fn update(&mut self, tree: &ItemTree, point: Point) {
        let point = if self.constrain {
            Point::new(
                point.x.clamp(self.bounds.x1, (self.bounds.x2 - 1.0).max(self.bounds.x1)),
                point.y.clamp(self.bounds.y1, (self.bounds.y2 - 1.0).max(self.bounds.y1)),
            )
        } else {
            point
        };
        self.point = point;

        let resolved = hit_test(&self.areas, point).and_then(|area| self.resolve(tree, area, point));
        match resolved {
            Some((target, indicator)) => {
                self.target = Some(target);
                self.last_valid = Some(target);
                self.indicator = Some(indicator);
            }
            None => {
                self.target = None;
                self.indicator = None;
            }
        }
    }

    fn resolve(&self, tree: &ItemTree, area: &Area, point: Point) -> Option<(DropTarget, Rect)> {
        match area.kind {
            AreaKind::Ground { side } => Some((DropTarget::Ground { side }, area.rect.to_rect())),
            AreaKind::Stack | AreaKind::StackHeader => {
                let stack = area.owner;
                let segments = segments_for(tree, stack);
                let hit = if area.kind == AreaKind::StackHeader {
                    segments.iter().find(|s| s.segment == Segment::Header)
                } else {
                    segment_at(&segments, point)
                }?;
                if hit.segment == Segment::Header {
                    let header = tree.get(stack)?.stack()?.header();
                    let pos = if header.is_left_right() { point.y } else { point.x };
                    let index = header.drop_index(pos).unwrap_or(0);
                    let target = DropTarget::Stack {
                        stack,
                        segment: Segment::Header,
                        index: Some(index),
                    };
                    Some((target, header.drop_indicator(index)))
                } else {
                    let target = DropTarget::Stack {
                        stack,
                        segment: hit.segment,
                        index: None,
                    };
                    Some((target, hit.highlight.to_rect()))
                }
            }
        }
    }

    /// The target to drop onto: the current one, else the last valid one.
    pub fn drop_target(&self) -> Option<DropTarget> {
        self.target.or(self.last_valid)
    }
}
