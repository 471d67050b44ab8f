//! Maximising a stack over the whole layout.

use super::LayoutManager;
use crate::components::ComponentBinder;
use crate::constants::z_index;
use crate::error::{LayoutError, LayoutResult};
use crate::events::LayoutEvent;
use crate::items::ItemKey;

impl<B: ComponentBinder> LayoutManager<B> {
    /// Maximise the stack holding `item` (or `item` itself if it is a
    /// stack), or restore it if it already is maximised.
    pub fn toggle_maximise(&mut self, item: ItemKey) -> LayoutResult<()> {
        let stack = self.stack_of(item)?;
        if self.maximised == Some(stack) {
            self.minimise_maximised()
        } else {
            self.maximise_stack(stack)
        }
    }

    fn stack_of(&self, item: ItemKey) -> LayoutResult<ItemKey> {
        let content = self.tree.item(item)?;
        if content.is_stack() {
            return Ok(item);
        }
        if content.is_component() {
            return content.parent().ok_or(LayoutError::UnknownItem);
        }
        Err(LayoutError::Invariant("only stacks can be maximised"))
    }

    pub fn maximise_stack(&mut self, stack: ItemKey) -> LayoutResult<()> {
        if !self.tree.item(stack)?.is_stack() {
            return Err(LayoutError::Invariant("only stacks can be maximised"));
        }
        if self.maximised == Some(stack) {
            return Ok(());
        }
        self.bracket(|m| {
            m.minimise_maximised()?;
            m.maximised = Some(stack);
            m.apply_maximised();
            m.tree.bubble(stack, LayoutEvent::Maximised(stack));
            m.tree.state_changed(stack);
            tracing::debug!(stack = ?stack, "stack maximised");
            Ok(())
        })
    }

    /// Restore the maximised stack, if there is one.
    pub fn minimise_maximised(&mut self) -> LayoutResult<()> {
        let Some(stack) = self.maximised.take() else {
            return Ok(());
        };
        self.bracket(|m| {
            if !m.tree.contains(stack) {
                return Ok(());
            }
            for component in m.tree.children(stack).to_vec() {
                m.tree.set_z_index(component, z_index::BASE)?;
            }
            m.tree.set_rect(m.tree.ground(), m.area);
            m.tree.bubble(stack, LayoutEvent::Minimised(stack));
            m.tree.state_changed(stack);
            tracing::debug!(stack = ?stack, "stack minimised");
            Ok(())
        })
    }

    /// Structural changes and drags always work on the normal layout.
    pub(crate) fn check_minimise_maximised_stack(&mut self) -> LayoutResult<()> {
        self.minimise_maximised()
    }

    /// Keep the maximised stack covering the layout area after a relayout.
    pub(crate) fn apply_maximised(&mut self) {
        let Some(stack) = self.maximised else {
            return;
        };
        let Some(item) = self.tree.get(stack) else {
            self.maximised = None;
            return;
        };
        if item.rect() != self.area {
            self.tree.set_rect(stack, self.area);
        }
        for component in self.tree.children(stack).to_vec() {
            let raised = self
                .tree
                .get(component)
                .and_then(|i| i.component())
                .is_some_and(|c| c.z_index() == z_index::STACK_MAXIMISED);
            if !raised && let Err(err) = self.tree.set_z_index(component, z_index::STACK_MAXIMISED) {
                tracing::warn!(item = ?component, %err, "cannot raise maximised component");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{manager_with, stack_of};
    use super::*;
    use crate::config::ResolvedItemConfig as C;
    use ratatui::prelude::Rect;

    fn two_stacks() -> C {
        C::row().with_content(vec![stack_of(&["a", "b"]), stack_of(&["c"])])
    }

    #[test]
    fn maximised_stack_covers_the_layout_and_raises_its_components() {
        let mut manager = manager_with(two_stacks(), 40, 10);
        let root = manager.tree().root().unwrap();
        let stack = manager.tree().children(root)[0];
        manager.toggle_maximise(stack).unwrap();
        assert_eq!(manager.maximised_stack(), Some(stack));
        assert_eq!(manager.tree().get(stack).unwrap().rect(), Rect::new(0, 0, 40, 10));
        for component in manager.tree().children(stack) {
            let placement = manager.tree().placement(*component).unwrap();
            assert_eq!(placement.z_index, z_index::STACK_MAXIMISED);
        }
    }

    #[test]
    fn toggling_again_restores_the_layout() {
        let mut manager = manager_with(two_stacks(), 40, 10);
        let root = manager.tree().root().unwrap();
        let stack = manager.tree().children(root)[0];
        let before = manager.tree().get(stack).unwrap().rect();
        manager.toggle_maximise(stack).unwrap();
        manager.toggle_maximise(stack).unwrap();
        assert_eq!(manager.maximised_stack(), None);
        assert_eq!(manager.tree().get(stack).unwrap().rect(), before);
        let active = manager.tree().active_component(stack).unwrap();
        assert_eq!(manager.tree().placement(active).unwrap().z_index, z_index::BASE);
    }

    #[test]
    fn adding_an_item_minimises_first() {
        let mut manager = manager_with(two_stacks(), 40, 10);
        let root = manager.tree().root().unwrap();
        let stack = manager.tree().children(root)[1];
        manager.maximise_stack(stack).unwrap();
        manager.add_component("d", None, None).unwrap();
        assert_eq!(manager.maximised_stack(), None);
    }

    #[test]
    fn maximised_flag_survives_save_and_load() {
        let mut manager = manager_with(two_stacks(), 40, 10);
        let root = manager.tree().root().unwrap();
        let stack = manager.tree().children(root)[1];
        manager.maximise_stack(stack).unwrap();
        let saved = manager.save_layout().unwrap();
        assert!(saved.root.as_ref().unwrap().content[1].maximised);

        let mut other = manager_with(stack_of(&["e"]), 40, 10);
        other.load_resolved(saved).unwrap();
        let reloaded = other.maximised_stack().unwrap();
        assert_eq!(other.tree().get(reloaded).unwrap().rect(), Rect::new(0, 0, 40, 10));
    }

    #[test]
    fn components_can_toggle_their_stack() {
        let mut manager = manager_with(two_stacks(), 40, 10);
        let component = manager.tree().components()[2];
        manager.toggle_maximise(component).unwrap();
        assert_eq!(manager.maximised_stack(), manager.tree().parent(component));
    }
}
