//! The synthetic root item.

use ratatui::prelude::Direction;

use super::{ItemKey, ItemTree};
use crate::config::{HeaderOverrides, ResolvedItemConfig};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::GroundSide;

impl ItemTree {
    pub(super) fn ground_add_child(
        &mut self,
        child: ItemKey,
        index: Option<usize>,
    ) -> LayoutResult<usize> {
        if self.root().is_some() {
            return Err(LayoutError::Invariant("ground can only hold a single root item"));
        }
        if self.item(child)?.is_component() {
            return Err(LayoutError::Invariant(
                "components must be wrapped in a stack to become the root",
            ));
        }
        let index = self.base_add_child(self.ground, child, index)?;
        self.update_size(self.ground);
        Ok(index)
    }

    /// Dock a detached `item` at the outer edge of the layout, or make it
    /// the root when the layout is empty.
    pub(crate) fn ground_drop(
        &mut self,
        item: ItemKey,
        side: Option<GroundSide>,
    ) -> LayoutResult<ItemKey> {
        tracing::debug!(item = ?item, ?side, "drop onto ground");
        let header = self
            .item(item)?
            .component()
            .map(|c| c.header_overrides().clone())
            .unwrap_or_else(HeaderOverrides::default);
        let item = self.into_stack(item, header)?;

        let Some(root) = self.root() else {
            self.ground_add_child(item, None)?;
            return Ok(item);
        };
        let Some(side) = side else {
            return Err(LayoutError::Invariant("edge drop onto a non-empty layout needs a side"));
        };
        let direction = side.direction();
        let insert_before = side.insert_before();

        if self.items[root].direction() != Some(direction) {
            let config = if direction == Direction::Horizontal {
                ResolvedItemConfig::row()
            } else {
                ResolvedItemConfig::column()
            };
            let container = self.create_item(&config, false)?;
            self.replace_child(self.ground, root, container, false)?;
            let (first, second) = if insert_before { (item, root) } else { (root, item) };
            self.row_or_column_add_child(container, first, None, true)?;
            self.row_or_column_add_child(container, second, None, true)?;
            self.items[root].set_size_along(direction, Some(50.0));
            self.items[item].set_size_along(direction, Some(50.0));
            self.update_size(container);
        } else {
            let siblings = self.children(root);
            let sibling = if insert_before {
                siblings.first().copied()
            } else {
                siblings.last().copied()
            };
            let at = if insert_before { Some(0) } else { None };
            self.row_or_column_add_child(root, item, at, true)?;
            if let Some(sibling) = sibling {
                let halved = self.items[sibling].size_along(direction).map(|s| s * 0.5);
                self.items[sibling].set_size_along(direction, halved);
                self.items[item].set_size_along(direction, halved);
            }
            self.update_size(root);
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{stack_of, tree_with};
    use super::*;
    use crate::config::{ItemType, ResolvedItemConfig as C};

    #[test]
    fn dropping_onto_an_empty_layout_makes_the_root() {
        let mut tree = ItemTree::default();
        let component = tree.create_item(&C::component("a"), true).unwrap();
        let stack = tree.ground_drop(component, None).unwrap();
        assert_eq!(tree.root(), Some(stack));
        assert_eq!(tree.children(stack), &[component]);
        assert_eq!(tree.active_component(stack), Some(component));
    }

    #[test]
    fn edge_drop_wraps_a_mismatched_root() {
        let (mut tree, root) = tree_with(stack_of(&["a"]), 40, 20);
        let component = tree.create_item(&C::component("b"), true).unwrap();
        let stack = tree.ground_drop(component, Some(GroundSide::Left)).unwrap();
        let new_root = tree.root().unwrap();
        assert_eq!(tree.get(new_root).unwrap().item_type(), Some(ItemType::Row));
        assert_eq!(tree.children(new_root), &[stack, root]);
        assert_eq!(tree.get(stack).unwrap().width, Some(50.0));
    }

    #[test]
    fn edge_drop_into_a_matching_root_halves_the_edge_sibling() {
        let config = C::column().with_content(vec![
            stack_of(&["a"]).with_height(40.0),
            stack_of(&["b"]).with_height(60.0),
        ]);
        let (mut tree, column) = tree_with(config, 40, 41);
        let last = tree.children(column)[1];
        let component = tree.create_item(&C::component("c"), true).unwrap();
        let stack = tree.ground_drop(component, Some(GroundSide::Bottom)).unwrap();
        assert_eq!(tree.root(), Some(column));
        assert_eq!(tree.children(column)[2], stack);
        assert_eq!(tree.get(last).unwrap().height, Some(30.0));
        assert_eq!(tree.get(stack).unwrap().height, Some(30.0));
    }

    #[test]
    fn dropped_rows_are_flattened_into_one_stack() {
        let (mut tree, _) = tree_with(stack_of(&["a"]), 40, 20);
        let row = tree
            .create_item(
                &C::row().with_content(vec![stack_of(&["b"]), stack_of(&["c", "d"])]),
                false,
            )
            .unwrap();
        let stack = tree.ground_drop(row, Some(GroundSide::Top)).unwrap();
        assert!(!tree.contains(row));
        assert_eq!(tree.children(stack).len(), 3);
        assert!(tree.get(stack).unwrap().is_stack());
    }
}
