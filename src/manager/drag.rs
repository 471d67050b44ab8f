//! Pointer input: header controls, tab activation, splitter drags and
//! drag-and-drop docking.

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use ratatui::prelude::Rect;

use super::{LayoutManager, Press};
use crate::components::ComponentBinder;
use crate::config::ResolvedItemConfig;
use crate::constants::z_index;
use crate::drag::{DragProxy, DragSourceId, DropTarget, Gesture, drop_areas};
use crate::error::{LayoutError, LayoutResult};
use crate::events::{EventEnvelope, LayoutEvent};
use crate::header::HeaderControl;
use crate::items::ItemKey;
use crate::layout::{Point, rect_contains};
use crate::splitter::{SplitterDrag, splitter_at};

/// What a pointer press landed on inside a stack header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderHit {
    Control(ItemKey, HeaderControl),
    TabClose(ItemKey),
    Tab { stack: ItemKey, component: ItemKey },
}

impl<B: ComponentBinder> LayoutManager<B> {
    /// Register a host region that creates an item from `config` when a drag
    /// starts on it.
    pub fn add_drag_source(&mut self, rect: Rect, config: ResolvedItemConfig) -> LayoutResult<DragSourceId> {
        config.validate()?;
        Ok(self.drag_sources.add(rect, config))
    }

    pub fn remove_drag_source(&mut self, id: DragSourceId) -> bool {
        self.drag_sources.remove(id)
    }

    pub fn drag_sources(&self) -> &crate::drag::DragSources {
        &self.drag_sources
    }

    /// Feed a terminal event to the layout. Returns whether it was consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let result = match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(_) => self.pointer_down(mouse.column, mouse.row),
                MouseEventKind::Drag(_) => self.pointer_move(mouse.column, mouse.row),
                MouseEventKind::Up(_) => self.pointer_up(mouse.column, mouse.row),
                _ => Ok(false),
            },
            Event::Key(key) if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc => {
                if self.drag.is_some() {
                    self.cancel_drag().map(|_| true)
                } else {
                    self.close_dropdowns()
                }
            }
            Event::Resize(width, height) => {
                self.notify_resize(*width, *height);
                Ok(true)
            }
            _ => Ok(false),
        };
        match result {
            Ok(consumed) => consumed,
            Err(err) => {
                tracing::warn!(%err, "pointer input failed");
                true
            }
        }
    }

    pub fn pointer_down(&mut self, column: u16, row: u16) -> LayoutResult<bool> {
        if !self.initialised {
            return Ok(false);
        }
        let point = Point::cell(column, row);
        if self.handle_dropdown_press(column, row)? {
            return Ok(true);
        }
        let closed_dropdown = self.close_dropdowns()?;
        if self.maximised.is_none()
            && let Some(hit) = splitter_at(&self.tree, column, row)
        {
            self.splitter_drag = Some(SplitterDrag::start(&self.tree, hit, point)?);
            return Ok(true);
        }
        if let Some(hit) = self.header_hit(column, row) {
            self.handle_header_press(hit, point)?;
            return Ok(true);
        }
        if let Some(source) = self.drag_sources.at(column, row) {
            self.press = Some(Press::Source(source.id));
            self.drag_listener.pointer_down(point, &mut self.scheduler);
            return Ok(true);
        }
        if let Some(component) = self.component_at(column, row) {
            self.focus_component(component)?;
            return Ok(true);
        }
        Ok(closed_dropdown)
    }

    pub fn pointer_move(&mut self, column: u16, row: u16) -> LayoutResult<bool> {
        let point = Point::cell(column, row);
        if let Some(drag) = self.splitter_drag.as_mut() {
            drag.update(point);
            return Ok(true);
        }
        if !self.drag_listener.is_pressed() {
            return Ok(false);
        }
        if let Some(gesture) = self.drag_listener.pointer_move(point, &mut self.scheduler) {
            self.on_gesture(gesture)?;
        }
        Ok(true)
    }

    pub fn pointer_up(&mut self, column: u16, row: u16) -> LayoutResult<bool> {
        let point = Point::cell(column, row);
        if let Some(drag) = self.splitter_drag.take() {
            self.bracket(|m| drag.commit(&mut m.tree))?;
            return Ok(true);
        }
        if !self.drag_listener.is_pressed() {
            return Ok(false);
        }
        let gesture = self.drag_listener.pointer_up(point, &mut self.scheduler);
        if let Some(gesture) = gesture {
            self.on_gesture(gesture)?;
        }
        self.press = None;
        Ok(true)
    }

    pub(crate) fn on_gesture(&mut self, gesture: Gesture) -> LayoutResult<()> {
        match gesture {
            Gesture::Click(_) => {
                self.press = None;
            }
            Gesture::DragStart { point, .. } => match self.press.take() {
                Some(Press::Tab { stack, component }) => {
                    self.start_component_drag(stack, component, point)?;
                }
                Some(Press::Source(id)) => self.start_source_drag(id, point)?,
                None => {}
            },
            Gesture::Drag(point) => {
                if let Some(proxy) = self.drag.as_mut() {
                    proxy.update(&self.tree, point);
                    self.hub.emit(EventEnvelope::global(LayoutEvent::Drag(point)));
                }
            }
            Gesture::DragStop(point) => {
                if let Some(proxy) = self.drag.as_mut() {
                    proxy.update(&self.tree, point);
                }
                self.finish_drag()?;
            }
        }
        Ok(())
    }

    fn header_hit(&self, column: u16, row: u16) -> Option<HeaderHit> {
        let stacks = match self.maximised {
            Some(stack) => vec![stack],
            None => self.tree.stacks(),
        };
        for stack in stacks {
            let Some(header) = self.tree.get(stack).and_then(|i| i.stack()).map(|s| s.header()) else {
                continue;
            };
            if !rect_contains(header.rect(), column, row) {
                continue;
            }
            if let Some((control, _)) = header
                .controls()
                .iter()
                .find(|(_, rect)| rect_contains(*rect, column, row))
            {
                return Some(HeaderHit::Control(stack, *control));
            }
            for tab in header.tabs().iter().filter(|t| !t.in_dropdown) {
                if tab.close_rect.is_some_and(|r| rect_contains(r, column, row)) {
                    return Some(HeaderHit::TabClose(tab.component));
                }
                if rect_contains(tab.rect, column, row) {
                    return Some(HeaderHit::Tab {
                        stack,
                        component: tab.component,
                    });
                }
            }
        }
        None
    }

    fn handle_header_press(&mut self, hit: HeaderHit, point: Point) -> LayoutResult<()> {
        match hit {
            HeaderHit::Control(stack, HeaderControl::TabDropdown) => {
                let open = self
                    .tree
                    .get(stack)
                    .and_then(|i| i.stack())
                    .is_some_and(|s| s.header().dropdown_open());
                self.tree.set_dropdown_open(stack, !open)?;
            }
            HeaderHit::Control(stack, HeaderControl::Maximise) => self.toggle_maximise(stack)?,
            HeaderHit::Control(stack, HeaderControl::Close) => {
                self.close_item(stack)?;
            }
            HeaderHit::Control(stack, HeaderControl::Popout) => {
                let target = if self.tree.settings.popout_whole_stack {
                    stack
                } else {
                    self.tree.active_component(stack).unwrap_or(stack)
                };
                self.create_popout_from_item(target)?;
            }
            HeaderHit::TabClose(component) => {
                self.close_item(component)?;
            }
            HeaderHit::Tab { stack, component } => {
                self.set_active_component(component, true)?;
                let reorder = self.tree.settings.reorder_enabled
                    && self
                        .tree
                        .get(component)
                        .and_then(|i| i.component())
                        .is_some_and(|c| c.reorder_enabled());
                if reorder {
                    self.press = Some(Press::Tab { stack, component });
                    self.drag_listener.pointer_down(point, &mut self.scheduler);
                }
            }
        }
        Ok(())
    }

    /// Rects of the dropdown entries of `stack`, when its dropdown is open.
    pub fn dropdown_entries(&self, stack: ItemKey) -> Vec<(ItemKey, Rect)> {
        let Some(header) = self.tree.get(stack).and_then(|i| i.stack()).map(|s| s.header()) else {
            return Vec::new();
        };
        if !header.dropdown_open() {
            return Vec::new();
        }
        let measure = self.tree.tab_measure;
        header.dropdown_entries(|key| {
            self.tree
                .get(key)
                .and_then(|i| i.component())
                .map(|c| measure(c.title(), false))
                .unwrap_or(0)
        })
    }

    fn handle_dropdown_press(&mut self, column: u16, row: u16) -> LayoutResult<bool> {
        let hit = self.tree.stacks().into_iter().find_map(|stack| {
            self.dropdown_entries(stack)
                .into_iter()
                .find(|(_, rect)| rect_contains(*rect, column, row))
                .map(|(component, _)| (stack, component))
        });
        let Some((stack, component)) = hit else {
            return Ok(false);
        };
        self.bracket(|m| {
            m.tree.select_dropdown_tab(stack, component)?;
            m.focus_component(component)
        })?;
        Ok(true)
    }

    /// Close every open tab dropdown. Returns whether one was open.
    pub fn close_dropdowns(&mut self) -> LayoutResult<bool> {
        let open: Vec<ItemKey> = self
            .tree
            .stacks()
            .into_iter()
            .filter(|s| {
                self.tree
                    .get(*s)
                    .and_then(|i| i.stack())
                    .is_some_and(|st| st.header().dropdown_open())
            })
            .collect();
        for stack in &open {
            self.tree.set_dropdown_open(*stack, false)?;
        }
        Ok(!open.is_empty())
    }

    /// Topmost visible component under the cell.
    pub fn component_at(&self, column: u16, row: u16) -> Option<ItemKey> {
        self.tree
            .components()
            .into_iter()
            .filter_map(|k| self.tree.placement(k).map(|p| (k, p)))
            .filter(|(_, p)| p.visible && rect_contains(p.rect, column, row))
            .max_by_key(|(_, p)| p.z_index)
            .map(|(k, _)| k)
    }

    fn start_component_drag(&mut self, stack: ItemKey, component: ItemKey, point: Point) -> LayoutResult<()> {
        if self.tree.parent(component) != Some(stack) {
            return Ok(());
        }
        self.bracket(|m| {
            m.check_minimise_maximised_stack()?;
            let index = m
                .tree
                .index_in_parent(component)
                .ok_or(LayoutError::UnknownItem)?;
            let title = m
                .tree
                .item(component)?
                .component()
                .map(|c| c.title().to_string())
                .unwrap_or_default();
            m.tree.remove_child(stack, component, true)?;
            m.tree.set_z_index(component, z_index::DRAG)?;
            m.begin_drag(component, title, Some((stack, index)), point);
            Ok(())
        })
    }

    fn start_source_drag(&mut self, id: DragSourceId, point: Point) -> LayoutResult<()> {
        let Some(config) = self.drag_sources.get(id).map(|s| s.config.clone()) else {
            return Ok(());
        };
        self.bracket(|m| {
            m.check_minimise_maximised_stack()?;
            let item = m.tree.create_item(&config, true)?;
            if m.tree.item(item)?.is_component() {
                m.tree.set_z_index(item, z_index::DRAG)?;
            }
            m.begin_drag(item, config.title.clone(), None, point);
            Ok(())
        })
    }

    fn begin_drag(&mut self, item: ItemKey, title: String, origin: Option<(ItemKey, usize)>, point: Point) {
        let dimensions = self.tree.dimensions;
        let mut proxy = DragProxy::new(
            item,
            title,
            origin,
            drop_areas(&self.tree),
            self.area,
            self.tree.settings.constrain_drag_to_container,
            (dimensions.drag_proxy_width, dimensions.drag_proxy_height),
        );
        proxy.update(&self.tree, point);
        self.drag = Some(proxy);
        tracing::debug!(item = ?item, "drag started");
        self.hub.emit(EventEnvelope::global(LayoutEvent::DragStart(item)));
    }

    fn finish_drag(&mut self) -> LayoutResult<()> {
        let Some(proxy) = self.drag.take() else {
            return Ok(());
        };
        let item = proxy.item();
        self.bracket(|m| {
            let result = m.drop_item(&proxy);
            if result.is_err() && m.tree.contains(item) && m.tree.parent(item).is_none() {
                m.tree.destroy(item);
            }
            if let Some(placed) = result?
                && m.tree.contains(placed)
            {
                m.tree.bubble(placed, LayoutEvent::ItemDropped(placed));
            }
            Ok(())
        })?;
        tracing::debug!(item = ?item, "drag stopped");
        self.hub.emit(EventEnvelope::global(LayoutEvent::DragStop(item)));
        Ok(())
    }

    /// Dock the dragged item on its target. Returns the placed item, or `None`
    /// when it had nowhere to go and was destroyed.
    fn drop_item(&mut self, proxy: &DragProxy) -> LayoutResult<Option<ItemKey>> {
        let item = proxy.item();
        if self.tree.item(item)?.is_component() {
            self.tree.set_z_index(item, z_index::BASE)?;
        }
        match proxy.drop_target() {
            Some(DropTarget::Ground { side }) => self.tree.ground_drop(item, side).map(Some),
            Some(DropTarget::Stack {
                stack,
                segment,
                index,
            }) if self.tree.is_attached(stack) => {
                self.tree.stack_drop(stack, item, segment, index).map(Some)
            }
            _ => {
                self.return_to_origin(proxy)?;
                Ok(self.tree.contains(item).then_some(item))
            }
        }
    }

    /// Put the dragged item back where it came from, or destroy it when that
    /// parent is gone.
    pub(crate) fn return_to_origin(&mut self, proxy: &DragProxy) -> LayoutResult<()> {
        let item = proxy.item();
        if !self.tree.contains(item) {
            return Ok(());
        }
        if self.tree.item(item)?.is_component() {
            self.tree.set_z_index(item, z_index::BASE)?;
        }
        match proxy.origin() {
            Some((parent, index)) if self.tree.is_attached(parent) => {
                let len = self.tree.children(parent).len();
                self.tree.add_child(parent, item, Some(index.min(len)))?;
                if self.tree.item(parent)?.is_stack() {
                    self.tree.set_active_component(parent, item)?;
                }
            }
            _ => {
                tracing::debug!(item = ?item, "dragged item has no home, destroying");
                self.tree.destroy(item);
            }
        }
        Ok(())
    }

    /// Abandon the current drag, returning the item to where it came from.
    pub fn cancel_drag(&mut self) -> LayoutResult<()> {
        self.drag_listener.cancel(&mut self.scheduler);
        self.press = None;
        let Some(proxy) = self.drag.take() else {
            return Ok(());
        };
        let item = proxy.item();
        self.bracket(|m| m.return_to_origin(&proxy))?;
        self.hub.emit(EventEnvelope::global(LayoutEvent::DragStop(item)));
        Ok(())
    }
}
