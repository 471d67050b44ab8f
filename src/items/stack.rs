//! Tabbed containers.
//!
//! Every child of a stack is a component and exactly one of them is active
//! (shown in the content area) while the stack is non-empty. The header's tab
//! list tracks the children one-to-one but keeps its own order.

use ratatui::prelude::{Direction, Rect};

use super::{ItemKey, ItemKind, ItemTree};
use crate::config::{HeaderConfig, HeaderOverrides, HeaderSide, ItemType, ResolvedItemConfig};
use crate::constants::z_index;
use crate::error::{ConfigError, LayoutError, LayoutResult};
use crate::events::LayoutEvent;
use crate::header::{Header, HeaderControl, HeaderParams, TabInfo};
use crate::layout::Segment;

#[derive(Debug, Clone)]
pub struct StackState {
    pub(crate) header: Header,
    pub(crate) active: Option<ItemKey>,
    pub(crate) header_overrides: HeaderOverrides,
    pub(crate) header_config: HeaderConfig,
    pub(crate) initial_active_index: usize,
    pub(crate) maximise_on_load: bool,
    pub(crate) content_rect: Rect,
}

impl StackState {
    pub(crate) fn from_config(config: &ResolvedItemConfig) -> Self {
        Self {
            header: Header::new(),
            active: None,
            header_overrides: config.header.clone(),
            header_config: HeaderConfig::default(),
            initial_active_index: config.active_item_index.unwrap_or(0),
            maximise_on_load: config.maximised,
            content_rect: Rect::default(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn active(&self) -> Option<ItemKey> {
        self.active
    }

    pub fn header_overrides(&self) -> &HeaderOverrides {
        &self.header_overrides
    }

    /// Layout-wide header merged with this stack's overrides, as of the last
    /// layout pass.
    pub fn header_config(&self) -> &HeaderConfig {
        &self.header_config
    }

    /// Area below (or beside) the header where the active component sits.
    pub fn content_rect(&self) -> Rect {
        self.content_rect
    }
}

/// Stack config that wraps a bare component, taking over its placement.
pub(crate) fn wrapping_config(component: &ResolvedItemConfig) -> ResolvedItemConfig {
    let mut inner = component.clone();
    inner.width = None;
    inner.height = None;
    inner.min_width = None;
    inner.min_height = None;
    inner.maximised = false;

    let mut stack = ResolvedItemConfig::stack();
    stack.width = component.width;
    stack.height = component.height;
    stack.min_width = component.min_width;
    stack.min_height = component.min_height;
    stack.id = component.id.clone();
    stack.is_closable = component.is_closable;
    stack.maximised = component.maximised;
    stack.header = component.header.clone();
    stack.content = vec![inner];
    stack
}

/// Split a stack's rect into its header strip and content area.
fn split_header(rect: Rect, side: Option<HeaderSide>, size: u16) -> (Rect, Rect) {
    let Some(side) = side else {
        return (Rect::default(), rect);
    };
    match side {
        HeaderSide::Top => {
            let h = size.min(rect.height);
            (
                Rect::new(rect.x, rect.y, rect.width, h),
                Rect::new(rect.x, rect.y + h, rect.width, rect.height - h),
            )
        }
        HeaderSide::Bottom => {
            let h = size.min(rect.height);
            (
                Rect::new(rect.x, rect.y + rect.height - h, rect.width, h),
                Rect::new(rect.x, rect.y, rect.width, rect.height - h),
            )
        }
        HeaderSide::Left => {
            let w = size.min(rect.width);
            (
                Rect::new(rect.x, rect.y, w, rect.height),
                Rect::new(rect.x + w, rect.y, rect.width - w, rect.height),
            )
        }
        HeaderSide::Right => {
            let w = size.min(rect.width);
            (
                Rect::new(rect.x + rect.width - w, rect.y, w, rect.height),
                Rect::new(rect.x, rect.y, rect.width - w, rect.height),
            )
        }
    }
}

impl ItemTree {
    fn stack_state(&self, key: ItemKey) -> LayoutResult<&StackState> {
        self.item(key)?
            .stack()
            .ok_or(LayoutError::Invariant("item is not a stack"))
    }

    fn stack_state_mut(&mut self, key: ItemKey) -> LayoutResult<&mut StackState> {
        self.item_mut(key)?
            .stack_mut()
            .ok_or(LayoutError::Invariant("item is not a stack"))
    }

    pub(super) fn init_stack(&mut self, key: ItemKey) -> LayoutResult<()> {
        let children = self.children(key).to_vec();
        let stack = self.stack_state_mut(key)?;
        let mut created = Vec::new();
        for (index, child) in children.iter().enumerate() {
            if !stack.header.has_tab(*child) {
                stack.header.create_tab(*child, index);
                created.push(*child);
            }
        }
        let index = stack.initial_active_index;
        let needs_active = stack.active.is_none();
        for component in created {
            self.bubble(key, LayoutEvent::TabCreated { stack: key, component });
        }
        if needs_active && !children.is_empty() {
            let active = *children
                .get(index)
                .ok_or(ConfigError::ActiveItemIndexOutOfRange {
                    index,
                    len: children.len(),
                })?;
            self.set_active_component(key, active)?;
        }
        Ok(())
    }

    pub(super) fn stack_add_child(
        &mut self,
        key: ItemKey,
        child: ItemKey,
        index: Option<usize>,
    ) -> LayoutResult<usize> {
        if !self.item(child)?.is_component() {
            return Err(LayoutError::Invariant("stack children must be components"));
        }
        let len = self.children(key).len();
        let index = index.unwrap_or(len);
        if index > len {
            return Err(LayoutError::Invariant("stack insertion index out of range"));
        }
        let index = self.base_add_child(key, child, Some(index))?;
        self.stack_state_mut(key)?.header.create_tab(child, index);
        self.bubble(key, LayoutEvent::TabCreated { stack: key, component: child });
        if let Some(container) = self.items[child].component_mut() {
            container.visible = false;
        }
        self.set_active_component(key, child)?;
        self.update_size(key);
        self.state_changed(key);
        Ok(index)
    }

    pub(super) fn stack_remove_child(
        &mut self,
        key: ItemKey,
        child: ItemKey,
        keep_alive: bool,
    ) -> LayoutResult<()> {
        let index = self
            .child_index(key, child)
            .ok_or(LayoutError::Invariant("cannot remove an unknown child item"))?;
        let children = self.children(key).to_vec();
        let being_emptied = children.len() == 1;
        if self.stack_state(key)?.active == Some(child) && !being_emptied {
            let next = if index == 0 { 1 } else { index - 1 };
            self.set_active_component(key, children[next])?;
        }
        self.stack_state_mut(key)?.header.remove_tab(child);
        if keep_alive && let Some(container) = self.items[child].component_mut() {
            container.visible = false;
            container.z_index = z_index::BASE;
        }

        self.base_remove_child(key, child, keep_alive)?;
        if let Some(stack) = self.items.get_mut(key).and_then(|i| i.stack_mut()) {
            if being_emptied {
                stack.active = None;
            }
            self.update_size(key);
            self.state_changed(key);
        }
        Ok(())
    }

    /// Make `component` the visible child of `stack`. Returns whether the
    /// active child changed.
    pub(crate) fn set_active_component(
        &mut self,
        stack: ItemKey,
        component: ItemKey,
    ) -> LayoutResult<bool> {
        if self.child_index(stack, component).is_none() {
            return Err(LayoutError::Invariant(
                "active component must be a child of the stack",
            ));
        }
        let state = self.stack_state_mut(stack)?;
        if state.active == Some(component) {
            return Ok(false);
        }
        let previous = state.active.replace(component);
        if let Some(previous) = previous
            && let Some(container) = self.items.get_mut(previous).and_then(|i| i.component_mut())
        {
            container.visible = false;
        }
        if let Some(container) = self.items[component].component_mut() {
            container.visible = true;
        }
        tracing::trace!(stack = ?stack, component = ?component, "active component changed");
        self.bubble(stack, LayoutEvent::ActiveContentItemChanged { stack, component });
        self.state_changed(stack);
        self.update_size(stack);
        Ok(true)
    }

    pub fn active_component(&self, stack: ItemKey) -> Option<ItemKey> {
        self.get(stack)?.stack()?.active
    }

    /// Open or close the overflow dropdown of `stack`.
    pub(crate) fn set_dropdown_open(&mut self, stack: ItemKey, open: bool) -> LayoutResult<()> {
        self.stack_state_mut(stack)?.header.set_dropdown_open(open);
        Ok(())
    }

    /// Activate a tab picked from the dropdown, promoting it to the front of
    /// the tab order when configured to.
    pub(crate) fn select_dropdown_tab(&mut self, stack: ItemKey, component: ItemKey) -> LayoutResult<()> {
        let reorder = self.settings.reorder_on_tab_menu_click;
        let state = self.stack_state_mut(stack)?;
        state.header.set_dropdown_open(false);
        if reorder {
            state.header.move_tab_to_front(component);
        }
        if !self.set_active_component(stack, component)? {
            self.update_size(stack);
        }
        Ok(())
    }

    /// The header controls `stack` shows with `header` in effect.
    fn header_controls(&self, key: ItemKey, header: &HeaderConfig) -> Vec<HeaderControl> {
        let item = &self.items[key];
        let all_closable = item.is_closable
            && item
                .children
                .iter()
                .all(|c| self.items.get(*c).is_some_and(|i| i.is_closable));
        let mut controls = Vec::with_capacity(3);
        if !header.popout.is_hidden() && !self.is_sub_window {
            controls.push(HeaderControl::Popout);
        }
        if !header.maximise.is_hidden() {
            controls.push(HeaderControl::Maximise);
        }
        if !header.close.is_hidden() && all_closable {
            controls.push(HeaderControl::Close);
        }
        controls
    }

    pub(super) fn layout_stack(&mut self, key: ItemKey) {
        let item = &self.items[key];
        let Some(stack) = item.stack() else {
            return;
        };
        let header = self.header.merged(&stack.header_overrides);
        let side = header.side();
        let (header_rect, content_rect) =
            split_header(item.rect, side, self.dimensions.header_height);

        let tabs: Vec<TabInfo> = item
            .children
            .iter()
            .filter_map(|c| {
                let child = self.items.get(*c)?;
                let title = child.component().map(|cc| cc.title()).unwrap_or_default();
                Some(TabInfo {
                    component: *c,
                    width: (self.tab_measure)(title, child.is_closable),
                    closable: child.is_closable,
                })
            })
            .collect();
        let params = HeaderParams {
            rect: header_rect,
            side,
            active: stack.active,
            controls: self.header_controls(key, &header),
            show_dropdown_button: !header.tab_dropdown.is_hidden(),
            control_width: self.dimensions.control_button_width,
            tab_control_offset: self.settings.tab_control_offset,
            tab_overlap_allowance: self.settings.tab_overlap_allowance,
        };
        let children = item.children.clone();

        let Some(stack) = self.items[key].stack_mut() else {
            return;
        };
        stack.header.layout(&params, &tabs);
        stack.header_config = header;
        stack.content_rect = content_rect;
        let active = stack.active;

        for child in children {
            if let Some(container) = self.items.get_mut(child).and_then(|i| i.component_mut()) {
                container.visible = active == Some(child);
            }
            self.set_rect(child, content_rect);
        }
    }

    /// Wrap a detached item in a new stack unless it already is one. Rows and
    /// columns are flattened: their components move into the new stack and
    /// the rest of the subtree is destroyed.
    pub(crate) fn into_stack(
        &mut self,
        item: ItemKey,
        header: HeaderOverrides,
    ) -> LayoutResult<ItemKey> {
        let components = match self.item(item)?.kind {
            ItemKind::Stack(_) => return Ok(item),
            ItemKind::Ground => {
                return Err(LayoutError::Invariant("the ground item cannot be docked"));
            }
            ItemKind::Component(_) => vec![item],
            ItemKind::Row | ItemKind::Column => self.detach_components(item)?,
        };
        let mut config = ResolvedItemConfig::stack();
        config.header = header;
        let stack = self.create_item(&config, false)?;
        for component in &components {
            self.stack_add_child(stack, *component, None)?;
        }
        if let Some(first) = components.first() {
            self.set_active_component(stack, *first)?;
        }
        Ok(stack)
    }

    /// Pull every component out of the detached subtree under `item`.
    fn detach_components(&mut self, item: ItemKey) -> LayoutResult<Vec<ItemKey>> {
        let components: Vec<ItemKey> = self
            .descendants(item)
            .into_iter()
            .filter(|k| self.items[*k].is_component())
            .collect();
        for component in &components {
            if let Some(parent) = self.items[*component].parent.take() {
                self.items[parent].children.retain(|c| c != component);
                if let Some(stack) = self.items[parent].stack_mut() {
                    stack.header.remove_tab(*component);
                    if stack.active == Some(*component) {
                        stack.active = None;
                    }
                }
            }
        }
        self.destroy(item);
        Ok(components)
    }

    /// Move the components of a detached `item` into `stack`, starting at
    /// `index`.
    fn add_components_to_stack(
        &mut self,
        stack: ItemKey,
        item: ItemKey,
        index: usize,
    ) -> LayoutResult<ItemKey> {
        let components = if self.item(item)?.is_component() {
            vec![item]
        } else {
            self.detach_components(item)?
        };
        let first = *components
            .first()
            .ok_or(LayoutError::Invariant("dropped item holds no components"))?;
        for (offset, component) in components.into_iter().enumerate() {
            self.stack_add_child(stack, component, Some(index + offset))?;
        }
        self.set_active_component(stack, first)?;
        Ok(first)
    }

    /// Dock a detached `item` onto `stack` at `segment`. `index` is the tab
    /// insertion index for header drops.
    pub(crate) fn stack_drop(
        &mut self,
        stack: ItemKey,
        item: ItemKey,
        segment: Segment,
        index: Option<usize>,
    ) -> LayoutResult<ItemKey> {
        tracing::debug!(stack = ?stack, item = ?item, ?segment, ?index, "drop onto stack");
        match segment {
            Segment::Header => {
                let len = self.children(stack).len();
                let index = index.unwrap_or(len).min(len);
                return self.add_components_to_stack(stack, item, index);
            }
            Segment::Body => return self.add_components_to_stack(stack, item, 0),
            Segment::Left | Segment::Top | Segment::Right | Segment::Bottom => {}
        }

        let direction = segment
            .direction()
            .ok_or(LayoutError::Invariant("side segment without a direction"))?;
        let insert_before = segment.insert_before();
        let parent = self
            .parent(stack)
            .ok_or(LayoutError::Invariant("drop target stack is detached"))?;
        let has_correct_parent = self.items[parent].direction() == Some(direction);

        let header = self.stack_state(stack)?.header_overrides.clone();
        let new_stack = self.into_stack(item, header)?;

        if has_correct_parent {
            let index = self
                .child_index(parent, stack)
                .ok_or(LayoutError::Invariant("stack is not a child of its parent"))?;
            let at = if insert_before { index } else { index + 1 };
            self.row_or_column_add_child(parent, new_stack, Some(at), true)?;
            let halved = self.items[stack].size_along(direction).map(|s| s * 0.5);
            self.items[stack].set_size_along(direction, halved);
            self.items[new_stack].set_size_along(direction, halved);
            self.update_size(parent);
        } else {
            let config = if direction == Direction::Horizontal {
                ResolvedItemConfig::row()
            } else {
                ResolvedItemConfig::column()
            };
            let container = self.create_item(&config, false)?;
            self.replace_child(parent, stack, container, false)?;
            let (first, second) = if insert_before {
                (new_stack, stack)
            } else {
                (stack, new_stack)
            };
            self.row_or_column_add_child(container, first, None, true)?;
            self.row_or_column_add_child(container, second, None, true)?;
            self.items[stack].set_size_along(direction, Some(50.0));
            self.items[new_stack].set_size_along(direction, Some(50.0));
            self.update_size(container);
        }
        Ok(new_stack)
    }
}
