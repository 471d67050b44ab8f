//! Rows and columns: proportional containers split by splitters.

use ratatui::prelude::Direction;

use super::{ItemKey, ItemTree};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::sizing::{absolute_sizes, content_extent, distribute, respect_min_item_size};
use crate::layout::{axis_len, build_rects_with_gaps};

impl ItemTree {
    fn direction_of(&self, key: ItemKey) -> LayoutResult<Direction> {
        self.item(key)?
            .direction()
            .ok_or(LayoutError::Invariant("item is not a row or column"))
    }

    /// Add `child` to a row or column. Unless `suspend_resize`, the new child
    /// gets `100 / n` percent and its siblings shrink proportionally.
    pub(crate) fn row_or_column_add_child(
        &mut self,
        key: ItemKey,
        child: ItemKey,
        index: Option<usize>,
        suspend_resize: bool,
    ) -> LayoutResult<usize> {
        let direction = self.direction_of(key)?;
        if self.item(child)?.is_component() {
            return Err(LayoutError::Invariant(
                "components must be wrapped in a stack to join a row or column",
            ));
        }
        let index = self.base_add_child(key, child, index)?;
        if suspend_resize {
            self.state_changed(key);
            return Ok(index);
        }

        let siblings = self.items[key].children.clone();
        let new_share = 100.0 / siblings.len() as f64;
        let shrink = (100.0 - new_share) / 100.0;
        for sibling in siblings {
            let item = &mut self.items[sibling];
            if sibling == child {
                item.set_size_along(direction, Some(new_share));
            } else {
                let scaled = item.size_along(direction).map(|s| s * shrink);
                item.set_size_along(direction, scaled);
            }
        }
        self.update_size(key);
        self.state_changed(key);
        Ok(index)
    }

    pub(super) fn row_or_column_remove_child(
        &mut self,
        key: ItemKey,
        child: ItemKey,
        keep_alive: bool,
    ) -> LayoutResult<()> {
        self.base_remove_child(key, child, keep_alive)?;
        let Some(item) = self.items.get(key) else {
            // pruned after its last child left
            return Ok(());
        };

        if item.children.len() == 1 && item.is_closable {
            let only = item.children[0];
            let parent = item
                .parent
                .ok_or(LayoutError::Invariant("row or column has no parent"))?;
            tracing::debug!(item = ?key, child = ?only, "flattening single-child container");
            self.items[key].children.clear();
            self.items[only].parent = None;
            self.replace_child(parent, key, only, true)?;
            self.state_changed(only);
        } else {
            self.update_size(key);
            self.state_changed(key);
        }
        Ok(())
    }

    pub(super) fn layout_row_or_column(&mut self, key: ItemKey) {
        let item = &self.items[key];
        let Some(direction) = item.direction() else {
            return;
        };
        let rect = item.rect;
        let children = item.children.clone();
        if children.is_empty() {
            self.items[key].splitters.clear();
            return;
        }

        let splitter = self.dimensions.border_width;
        let total = content_extent(axis_len(direction, rect), children.len(), splitter);
        let sizes: Vec<Option<f64>> = children
            .iter()
            .map(|c| self.items[*c].size_along(direction))
            .collect();
        let mut relative = distribute(&sizes);
        // Only rows correct for minimum sizes.
        if direction == Direction::Horizontal {
            let mins: Vec<u16> = children
                .iter()
                .map(|c| {
                    self.items[*c]
                        .min_width
                        .unwrap_or(self.dimensions.min_item_width)
                })
                .collect();
            respect_min_item_size(&mut relative, total, &mins);
        }
        for (child, size) in children.iter().zip(&relative) {
            self.items[*child].set_size_along(direction, Some(*size));
        }

        let pixels = absolute_sizes(&relative, total);
        let (rects, gaps) = build_rects_with_gaps(direction, rect, &pixels, splitter);
        self.items[key].splitters = gaps;
        for (child, rect) in children.into_iter().zip(rects) {
            self.set_rect(child, rect);
        }
    }

    fn min_size_along(&self, key: ItemKey, direction: Direction) -> u16 {
        let item = &self.items[key];
        match direction {
            Direction::Horizontal => item.min_width.unwrap_or(self.dimensions.min_item_width),
            Direction::Vertical => item.min_height.unwrap_or(self.dimensions.min_item_height),
        }
    }

    /// The offsets (in pixels, negative towards the leading child) the
    /// splitter after child `index` may move without squeezing either
    /// neighbour below its minimum size.
    pub fn splitter_range(&self, key: ItemKey, index: usize) -> LayoutResult<(i32, i32)> {
        let direction = self.direction_of(key)?;
        let children = self.children(key);
        let (Some(before), Some(after)) = (children.get(index), children.get(index + 1)) else {
            return Err(LayoutError::Invariant("splitter index out of range"));
        };
        let before_len = i32::from(axis_len(direction, self.items[*before].rect));
        let after_len = i32::from(axis_len(direction, self.items[*after].rect));
        let before_min = i32::from(self.min_size_along(*before, direction));
        let after_min = i32::from(self.min_size_along(*after, direction));
        let min = -(before_len - before_min).max(0);
        let max = (after_len - after_min).max(0);
        Ok((min, max))
    }

    /// Move the splitter after child `index` by `offset` pixels (clamped to
    /// `splitter_range`) and re-split the two neighbours' relative sizes at
    /// the new position.
    pub(crate) fn apply_splitter_offset(
        &mut self,
        key: ItemKey,
        index: usize,
        offset: i32,
    ) -> LayoutResult<()> {
        let direction = self.direction_of(key)?;
        let (min, max) = self.splitter_range(key, index)?;
        let offset = offset.clamp(min, max);
        let before = self.items[key].children[index];
        let after = self.items[key].children[index + 1];

        let before_len = f64::from(axis_len(direction, self.items[before].rect)) + f64::from(offset);
        let after_len = f64::from(axis_len(direction, self.items[after].rect)) - f64::from(offset);
        let pixels = before_len + after_len;
        if pixels <= 0.0 {
            return Ok(());
        }
        let shared = self.items[before].size_along(direction).unwrap_or_default()
            + self.items[after].size_along(direction).unwrap_or_default();
        self.items[before].set_size_along(direction, Some(shared * before_len / pixels));
        self.items[after].set_size_along(direction, Some(shared * after_len / pixels));
        tracing::debug!(item = ?key, index, offset, "splitter moved");
        self.update_size(key);
        self.state_changed(key);
        Ok(())
    }
}
