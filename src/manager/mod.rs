//! The layout manager: owns the item tree and drives everything around it.
//!
//! Structural operations run inside a sizing bracket. Effects the tree queues
//! while the bracket is open (binds, releases, notifications, placement
//! changes) are drained as the outermost bracket closes, so hosts see one
//! consistent batch per operation.

mod drag;
mod location;
mod maximise;
mod popout;
mod render;

pub use location::{DEFAULT_LOCATION_SELECTORS, Location, LocationSelector};

use std::collections::HashMap;
use std::time::Duration;

use ratatui::prelude::Rect;
use serde_json::Value;

use crate::components::{BindingKind, ComponentBinder, ComponentRegistry};
use crate::config::minify::minify;
use crate::config::{
    ItemType, LayoutConfig, PopoutWindow, ResolvedLayoutConfig, ResponsiveMode,
};
use crate::constants::{ANIMATION_FRAME, RESIZE_DEBOUNCE};
use crate::drag::{DragListener, DragProxy, DragSources};
use crate::error::{LayoutError, LayoutResult, PopoutError};
use crate::events::{EventEnvelope, EventHub, LayoutEvent, Listener, SubscriptionId};
use crate::items::{ItemKey, ItemTree, TreeEffect};
use crate::layout::Segment;
use crate::popout::{
    BlockingHost, MemoryStore, Popout, PopoutChannel, PopoutHost, PopoutStore, take_config,
    window_key_from_query,
};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::splitter::SplitterDrag;

/// What the pointer went down on, kept until the gesture resolves.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Press {
    Tab { stack: ItemKey, component: ItemKey },
    Source(crate::drag::DragSourceId),
}

/// State of a layout that lives in a pop-out window.
struct SubWindow {
    window_key: String,
    parent_id: Option<String>,
    index_in_parent: Option<usize>,
    window: PopoutWindow,
    channel: Box<dyn PopoutChannel>,
    snapshot_dirty: bool,
}

pub struct LayoutManager<B: ComponentBinder = ComponentRegistry> {
    tree: ItemTree,
    hub: EventHub,
    scheduler: Scheduler,
    binder: B,
    bindings: HashMap<ItemKey, BindingKind>,
    store: Box<dyn PopoutStore>,
    host: Box<dyn PopoutHost>,
    popouts: Vec<Popout>,
    sub_window: Option<SubWindow>,
    pending_config: Option<ResolvedLayoutConfig>,
    initialised: bool,
    area: Rect,
    focused: Option<ItemKey>,
    maximised: Option<ItemKey>,
    drag_listener: DragListener,
    press: Option<Press>,
    drag: Option<DragProxy>,
    drag_sources: DragSources,
    splitter_drag: Option<SplitterDrag>,
    resize_task: Option<TaskHandle>,
    pending_size: Option<(u16, u16)>,
    frame_task: Option<TaskHandle>,
    sizing_depth: usize,
    pending_virtual: Vec<ItemKey>,
    bind_error: Option<LayoutError>,
    first_load: bool,
    id_counter: u64,
}

impl<B: ComponentBinder> std::fmt::Debug for LayoutManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutManager")
            .field("initialised", &self.initialised)
            .field("area", &self.area)
            .field("items", &self.tree.len())
            .field("popouts", &self.popouts)
            .field("sub_window", &self.sub_window.as_ref().map(|s| &s.window_key))
            .finish()
    }
}

impl<B: ComponentBinder> LayoutManager<B> {
    /// A manager whose pop-outs are always blocked. Use
    /// `with_popout_support` to give it somewhere to open windows.
    pub fn new(binder: B) -> Self {
        Self {
            tree: ItemTree::default(),
            hub: EventHub::new(),
            scheduler: Scheduler::new(),
            binder,
            bindings: HashMap::new(),
            store: Box::new(MemoryStore::new()),
            host: Box::new(BlockingHost),
            popouts: Vec::new(),
            sub_window: None,
            pending_config: None,
            initialised: false,
            area: Rect::default(),
            focused: None,
            maximised: None,
            drag_listener: DragListener::default(),
            press: None,
            drag: None,
            drag_sources: DragSources::default(),
            splitter_drag: None,
            resize_task: None,
            pending_size: None,
            frame_task: None,
            sizing_depth: 0,
            pending_virtual: Vec::new(),
            bind_error: None,
            first_load: false,
            id_counter: 0,
        }
    }

    pub fn with_popout_support(
        mut self,
        store: impl PopoutStore + 'static,
        host: impl PopoutHost + 'static,
    ) -> Self {
        self.store = Box::new(store);
        self.host = Box::new(host);
        self
    }

    pub fn with_drag_listener(mut self, listener: DragListener) -> Self {
        self.drag_listener = listener;
        self
    }

    /// Build the layout of a pop-out window. `query` must carry the window
    /// key the parent opened it with; the stored config is consumed.
    pub fn sub_window(
        binder: B,
        query: &str,
        mut store: impl PopoutStore + 'static,
        channel: impl PopoutChannel + 'static,
    ) -> LayoutResult<Self> {
        let window_key = window_key_from_query(query)
            .ok_or(PopoutError::MissingWindowKey)?
            .to_string();
        let config = take_config(&mut store, &window_key)?;
        tracing::debug!(window = %window_key, "pop-out config loaded");

        let mut manager = Self::new(binder);
        manager.store = Box::new(store);
        manager.tree.is_sub_window = true;
        manager.pending_config = Some(config.layout());
        manager.sub_window = Some(SubWindow {
            window_key,
            parent_id: config.parent_id,
            index_in_parent: config.index_in_parent,
            window: config.window,
            channel: Box::new(channel),
            snapshot_dirty: false,
        });
        Ok(manager)
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn is_sub_window(&self) -> bool {
        self.sub_window.is_some()
    }

    /// Key of this pop-out window, when running as one.
    pub fn window_key(&self) -> Option<&str> {
        self.sub_window.as_ref().map(|s| s.window_key.as_str())
    }

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn binder(&self) -> &B {
        &self.binder
    }

    pub fn binder_mut(&mut self) -> &mut B {
        &mut self.binder
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// When the next timer is due, for hosts that sleep between frames.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn focused_component(&self) -> Option<ItemKey> {
        self.focused
    }

    pub fn maximised_stack(&self) -> Option<ItemKey> {
        self.maximised
    }

    pub fn popouts(&self) -> &[Popout] {
        &self.popouts
    }

    pub fn drag_proxy(&self) -> Option<&DragProxy> {
        self.drag.as_ref()
    }

    pub fn splitter_drag(&self) -> Option<&SplitterDrag> {
        self.splitter_drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some() || self.splitter_drag.is_some()
    }

    pub fn binding(&self, component: ItemKey) -> Option<BindingKind> {
        self.bindings.get(&component).copied()
    }

    pub fn on(&mut self, filter: impl Into<String>, callback: Listener) -> SubscriptionId {
        self.hub.subscribe(filter, callback)
    }

    pub fn on_item(
        &mut self,
        item: ItemKey,
        filter: impl Into<String>,
        callback: Listener,
    ) -> SubscriptionId {
        self.hub.subscribe_item(item, filter, callback)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id)
    }

    /// Deliver a host-defined notification to every window of the layout.
    pub fn broadcast(&mut self, name: &str, data: Value) -> LayoutResult<()> {
        let payload = crate::popout::Payload::Broadcast {
            name: name.to_string(),
            data: data.clone(),
        };
        for popout in &mut self.popouts {
            popout.send(payload.clone())?;
        }
        if let Some(sub) = self.sub_window.as_mut() {
            sub.channel.send(crate::popout::ChannelMessage {
                origin: sub.window_key.clone(),
                direction: crate::popout::MessageDirection::ToParent,
                payload,
            })?;
        }
        self.hub.emit(EventEnvelope::global(LayoutEvent::UserBroadcast {
            name: name.to_string(),
            data,
        }));
        Ok(())
    }

    /// Lay the layout out in `area` and build any config loaded so far.
    pub fn init(&mut self, area: Rect) -> LayoutResult<()> {
        if self.initialised {
            return Ok(());
        }
        self.initialised = true;
        self.area = area;
        self.tree.set_rect(self.tree.ground(), area);
        if let Some(config) = self.pending_config.take() {
            self.load_resolved(config)?;
        }
        tracing::debug!(?area, "layout initialised");
        self.hub.emit(EventEnvelope::global(LayoutEvent::Initialised));
        Ok(())
    }

    /// Resolve and load `config`. Nothing changes when resolution fails.
    pub fn load_layout(&mut self, config: &LayoutConfig) -> LayoutResult<()> {
        let resolved = config.resolve()?;
        self.load_resolved(resolved)
    }

    /// Replace the current layout with `config`. Before `init` the config is
    /// held and built once the layout has an area.
    pub fn load_resolved(&mut self, config: ResolvedLayoutConfig) -> LayoutResult<()> {
        config.validate()?;
        if self.sub_window.is_some() && !config.open_popouts.is_empty() {
            return Err(LayoutError::Invariant("pop-outs cannot be nested"));
        }
        if !self.initialised {
            self.pending_config = Some(config);
            return Ok(());
        }
        self.cancel_interaction();
        let ResolvedLayoutConfig {
            root,
            open_popouts,
            dimensions,
            settings,
            header,
            ..
        } = config;

        self.bracket(|m| {
            m.minimise_maximised()?;
            m.clear_focus()?;
            m.tree.dimensions = dimensions;
            m.tree.header = header;
            m.tree.settings = settings;
            m.tree.load_root(root.as_ref())?;
            m.tree.set_rect(m.tree.ground(), m.area);
            m.first_load = true;
            m.apply_responsive_mode()?;
            let flagged = m
                .tree
                .stacks()
                .into_iter()
                .find(|s| m.tree.get(*s).and_then(|i| i.stack()).is_some_and(|s| s.maximise_on_load));
            if let Some(stack) = flagged {
                m.maximise_stack(stack)?;
            }
            Ok(())
        })?;
        tracing::debug!(items = self.tree.len(), "layout loaded");

        for popout in open_popouts {
            match self.open_popout(popout) {
                Ok(_) => {}
                Err(LayoutError::Popout(PopoutError::Blocked)) => {
                    tracing::warn!("stored pop-out was blocked by the host");
                }
                Err(err) => return Err(err),
            }
        }
        self.flush_pending_frame()
    }

    /// Current layout, with bound components' latest state and the configs of
    /// open pop-outs.
    pub fn save_layout(&mut self) -> LayoutResult<ResolvedLayoutConfig> {
        if !self.initialised {
            return Err(LayoutError::NotInitialised);
        }
        self.process_popout_messages()?;
        self.sync_component_states();
        let root = match self.tree.root() {
            Some(root) => Some(self.tree.to_config(root, self.maximised)?),
            None => None,
        };
        Ok(ResolvedLayoutConfig {
            root,
            open_popouts: self.popouts.iter().map(|p| p.config().clone()).collect(),
            dimensions: self.tree.dimensions,
            settings: self.tree.settings.clone(),
            header: self.tree.header.clone(),
            resolved: true,
        })
    }

    /// `save_layout` in the compact wire form.
    pub fn save_layout_minified(&mut self) -> LayoutResult<Value> {
        let config = self.save_layout()?;
        Ok(minify(&serde_json::to_value(&config)?))
    }

    /// Tear the layout down, releasing every bound component.
    pub fn destroy(&mut self) -> LayoutResult<()> {
        if !self.initialised {
            return Ok(());
        }
        if self.tree.settings.close_popouts_on_unload {
            for mut popout in std::mem::take(&mut self.popouts) {
                if let Err(err) = popout.send(crate::popout::Payload::Close) {
                    tracing::debug!(window = popout.window_key(), %err, "pop-out already gone");
                }
                popout.close();
            }
        }
        self.cancel_interaction();
        self.bracket(|m| {
            m.maximised = None;
            m.focused = None;
            m.tree.load_root(None)?;
            Ok(())
        })?;
        self.drag_sources.clear();
        self.initialised = false;
        tracing::debug!("layout destroyed");
        Ok(())
    }

    /// Resize immediately.
    pub fn set_size(&mut self, width: u16, height: u16) -> LayoutResult<()> {
        self.area = Rect::new(self.area.x, self.area.y, width, height);
        if !self.initialised {
            return Ok(());
        }
        self.update_layout()
    }

    /// Report a new host size. Bursts of reports are coalesced; the last size
    /// is applied once the debounce interval passes without another report.
    pub fn notify_resize(&mut self, width: u16, height: u16) {
        self.pending_size = Some((width, height));
        self.resize_task = Some(self.scheduler.reschedule(
            self.resize_task,
            RESIZE_DEBOUNCE,
            Task::ResizeDebounce,
        ));
    }

    /// Re-lay out the whole tree within the current area.
    pub fn update_layout(&mut self) -> LayoutResult<()> {
        self.bracket(|m| {
            m.tree.set_rect(m.tree.ground(), m.area);
            m.apply_responsive_mode()
        })
    }

    /// Move the virtual clock to `now` and run whatever fell due.
    pub fn advance_time(&mut self, now: Duration) -> LayoutResult<()> {
        for (handle, task) in self.scheduler.advance_to(now) {
            match task {
                Task::HoldTimeout => {
                    if let Some(gesture) = self.drag_listener.hold_elapsed(handle) {
                        self.on_gesture(gesture)?;
                    }
                }
                Task::ResizeDebounce => {
                    if self.resize_task != Some(handle) {
                        continue;
                    }
                    self.resize_task = None;
                    if let Some((width, height)) = self.pending_size.take() {
                        tracing::debug!(width, height, "applying debounced resize");
                        self.set_size(width, height)?;
                    }
                }
                Task::AnimationFrame => {
                    self.frame_task = None;
                    self.hub.flush_frame();
                    self.flush_snapshot()?;
                }
            }
        }
        Ok(())
    }

    /// Deliver notifications held for the next frame now. A load reports its
    /// state changes at once instead of on the first frame after it.
    fn flush_pending_frame(&mut self) -> LayoutResult<()> {
        if let Some(task) = self.frame_task.take() {
            self.scheduler.cancel(task);
        }
        self.hub.flush_frame();
        self.flush_snapshot()
    }

    pub fn advance_by(&mut self, delta: Duration) -> LayoutResult<()> {
        self.advance_time(self.scheduler.now() + delta)
    }

    pub fn begin_virtual_sizing(&mut self) {
        self.sizing_depth += 1;
    }

    /// Close a sizing bracket. The outermost close drains queued effects and
    /// reports the first bind failure they produced.
    pub fn end_virtual_sizing(&mut self) -> LayoutResult<()> {
        self.sizing_depth = self.sizing_depth.saturating_sub(1);
        self.process_effects();
        if self.sizing_depth > 0 {
            return Ok(());
        }
        self.apply_maximised();
        self.process_effects();
        self.flush_virtual();
        match self.bind_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub(crate) fn bracket<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> LayoutResult<T>,
    ) -> LayoutResult<T> {
        self.begin_virtual_sizing();
        let result = op(self);
        let closed = self.end_virtual_sizing();
        let value = result?;
        closed?;
        Ok(value)
    }

    fn process_effects(&mut self) {
        loop {
            let effects = self.tree.drain_effects();
            if effects.is_empty() {
                break;
            }
            for effect in effects {
                match effect {
                    TreeEffect::Bind(key) => self.bind_component(key),
                    TreeEffect::Release(key) => {
                        if self.bindings.remove(&key).is_some() {
                            self.binder.release(key);
                        }
                        self.pending_virtual.retain(|k| *k != key);
                    }
                    TreeEffect::Event { path, envelope } => self.dispatch(&path, envelope),
                    TreeEffect::PlacementChanged(key) => {
                        if self.bindings.get(&key) == Some(&BindingKind::Virtual)
                            && !self.pending_virtual.contains(&key)
                        {
                            self.pending_virtual.push(key);
                        }
                    }
                }
            }
        }
    }

    fn bind_component(&mut self, key: ItemKey) {
        let config = match self.tree.to_config(key, None) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(item = ?key, %err, "cannot bind a vanished component");
                return;
            }
        };
        match self.binder.bind(key, &config) {
            Ok(kind) => {
                tracing::trace!(item = ?key, ?kind, "component bound");
                self.bindings.insert(key, kind);
                if kind == BindingKind::Virtual && !self.pending_virtual.contains(&key) {
                    self.pending_virtual.push(key);
                }
            }
            Err(err) => {
                tracing::warn!(item = ?key, %err, "component bind failed");
                self.bind_error.get_or_insert(err.into());
            }
        }
    }

    fn dispatch(&mut self, path: &[ItemKey], envelope: EventEnvelope) {
        let destroyed = match envelope.event {
            LayoutEvent::ItemDestroyed(key) => Some(key),
            _ => None,
        };
        let state_changed = envelope.event == LayoutEvent::StateChanged;
        if self.hub.bubble(path, envelope) {
            self.request_frame();
        }
        if state_changed && let Some(sub) = self.sub_window.as_mut() {
            sub.snapshot_dirty = true;
            self.request_frame();
        }
        if let Some(key) = destroyed {
            self.hub.forget_item(key);
            if self.focused == Some(key) {
                self.focused = None;
            }
            if self.maximised == Some(key) {
                self.maximised = None;
            }
        }
    }

    fn request_frame(&mut self) {
        let pending = self
            .frame_task
            .is_some_and(|task| self.scheduler.is_pending(task));
        if !pending {
            self.frame_task = Some(self.scheduler.schedule(ANIMATION_FRAME, Task::AnimationFrame));
        }
    }

    /// Push placements of virtually bound components to the binder.
    fn flush_virtual(&mut self) {
        let pending: Vec<ItemKey> = std::mem::take(&mut self.pending_virtual)
            .into_iter()
            .filter(|k| self.tree.contains(*k))
            .collect();
        if pending.is_empty() {
            return;
        }
        self.hub.emit(EventEnvelope::global(LayoutEvent::BeforeVirtualRecting {
            count: pending.len(),
        }));
        for key in pending {
            if let Some(placement) = self.tree.placement(key) {
                self.binder.virtual_rect(key, placement);
            }
        }
        self.hub.emit(EventEnvelope::global(LayoutEvent::AfterVirtualRecting));
    }

    /// Pull the latest state of every bound component into the tree.
    fn sync_component_states(&mut self) {
        for key in self.tree.components() {
            if let Some(state) = self.binder.state(key)
                && let Err(err) = self.tree.sync_component_state(key, state)
            {
                tracing::debug!(item = ?key, %err, "state sync skipped");
            }
        }
    }

    /// Drop any half-finished pointer interaction.
    fn cancel_interaction(&mut self) {
        self.drag_listener.cancel(&mut self.scheduler);
        self.press = None;
        self.splitter_drag = None;
        if let Some(proxy) = self.drag.take()
            && let Err(err) = self.bracket(|m| m.return_to_origin(&proxy))
        {
            tracing::warn!(%err, "dragged item could not be returned");
        }
    }

    fn next_unique_id(&mut self) -> String {
        self.id_counter += 1;
        format!("{:x}{:04x}", std::process::id(), self.id_counter)
    }

    /// Collapse trailing columns of a row root into its first stack when the
    /// area is too narrow to give each its minimum width.
    fn apply_responsive_mode(&mut self) -> LayoutResult<()> {
        match self.tree.settings.responsive_mode {
            ResponsiveMode::None => return Ok(()),
            ResponsiveMode::Onload if !self.first_load => return Ok(()),
            _ => {}
        }
        self.first_load = false;
        let Some(root) = self.tree.root() else {
            return Ok(());
        };
        if self.tree.item(root)?.item_type() != Some(ItemType::Row) {
            return Ok(());
        }
        let min_width = self.tree.dimensions.min_item_width.max(1);
        let fit = usize::from(self.area.width / min_width).max(1);
        let columns = self.tree.children(root).to_vec();
        if columns.len() <= fit {
            return Ok(());
        }
        let Some(first_stack) = self
            .tree
            .descendants(columns[0])
            .into_iter()
            .find(|k| self.tree.get(*k).is_some_and(|i| i.is_stack()))
        else {
            return Ok(());
        };
        tracing::debug!(columns = columns.len(), fit, "folding columns into the first stack");
        for column in &columns[fit..] {
            self.tree.remove_item(*column, true)?;
            self.tree.stack_drop(first_stack, *column, Segment::Header, None)?;
        }
        Ok(())
    }

    /// Give keyboard focus to `component`, blurring whatever had it.
    pub fn focus_component(&mut self, component: ItemKey) -> LayoutResult<()> {
        if !self.tree.item(component)?.is_component() {
            return Err(LayoutError::Invariant("only components take focus"));
        }
        if self.focused == Some(component) {
            return Ok(());
        }
        self.bracket(|m| {
            m.blur_focused()?;
            m.focused = Some(component);
            m.tree.set_component_focused(component, true)?;
            m.tree.bubble(component, LayoutEvent::Focus(component));
            Ok(())
        })
    }

    pub fn clear_focus(&mut self) -> LayoutResult<()> {
        self.bracket(|m| m.blur_focused())
    }

    fn blur_focused(&mut self) -> LayoutResult<()> {
        let Some(previous) = self.focused.take() else {
            return Ok(());
        };
        if self.tree.contains(previous) {
            self.tree.set_component_focused(previous, false)?;
            self.tree.bubble(previous, LayoutEvent::Blur(previous));
        }
        Ok(())
    }

    /// Remove `item` and its subtree. Returns `false` for items marked
    /// non-closable.
    pub fn close_item(&mut self, item: ItemKey) -> LayoutResult<bool> {
        let content = self.tree.item(item)?;
        if content.is_ground() {
            return Err(LayoutError::Invariant("the ground item cannot be closed"));
        }
        if !content.is_closable {
            return Ok(false);
        }
        self.bracket(|m| {
            if m.maximised == Some(item) {
                m.minimise_maximised()?;
            }
            m.tree.remove_item(item, false)
        })?;
        Ok(true)
    }

    /// Activate `component` in its stack, optionally focusing it.
    pub fn set_active_component(&mut self, component: ItemKey, focus: bool) -> LayoutResult<()> {
        let stack = self.tree.parent(component).ok_or(LayoutError::UnknownItem)?;
        self.bracket(|m| {
            m.tree.set_active_component(stack, component)?;
            if focus {
                m.focus_component(component)?;
            }
            Ok(())
        })
    }

    pub fn set_title(&mut self, component: ItemKey, title: &str) -> LayoutResult<()> {
        self.bracket(|m| m.tree.set_title(component, title))
    }

    pub fn set_component_state(&mut self, component: ItemKey, state: Value) -> LayoutResult<()> {
        self.bracket(|m| m.tree.set_component_state(component, state))
    }

    pub fn find_by_id(&self, id: &str) -> Vec<ItemKey> {
        self.tree.find_by_id(id)
    }

    pub fn get_all_content_items(&self) -> Vec<ItemKey> {
        self.tree.all_items()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::components::{Component, NoteComponent};
    use crate::config::{Dimensions, ItemConfig, ResolvedItemConfig as C};
    use crate::ui::UiFrame;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub(crate) struct Blank;

    impl Component for Blank {
        fn render(&mut self, _: &mut UiFrame<'_>, _: Rect, _: &crate::components::ComponentContext) {}
    }

    pub(crate) fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for name in ["a", "b", "c", "d", "e"] {
            registry
                .register(name, Box::new(|_| Box::new(Blank)))
                .unwrap();
        }
        registry
            .register("note", Box::new(|c| Box::new(NoteComponent::from_state(c.component_state.as_ref()))))
            .unwrap();
        registry
    }

    pub(crate) fn dimensions() -> Dimensions {
        Dimensions {
            border_width: 1,
            border_grab_width: 1,
            min_item_height: 1,
            min_item_width: 1,
            header_height: 1,
            control_button_width: 2,
            drag_proxy_width: 10,
            drag_proxy_height: 4,
            dock_edge_size: 2,
        }
    }

    pub(crate) fn stack_of(types: &[&str]) -> C {
        C::stack().with_content(types.iter().map(|t| C::component(*t)).collect())
    }

    pub(crate) fn manager_with(root: C, width: u16, height: u16) -> LayoutManager {
        let mut manager = LayoutManager::new(registry())
            .with_drag_listener(DragListener::new(1.0, None));
        let mut config = ResolvedLayoutConfig {
            root: Some(root),
            dimensions: dimensions(),
            ..ResolvedLayoutConfig::default()
        };
        config.settings.tab_control_offset = 0;
        manager.load_resolved(config).unwrap();
        manager.init(Rect::new(0, 0, width, height)).unwrap();
        manager
    }

    fn record(manager: &mut LayoutManager, filter: &str) -> Rc<RefCell<Vec<LayoutEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        manager.on(filter, Box::new(move |e| sink.borrow_mut().push(e.event.clone())));
        seen
    }

    #[test]
    fn config_loaded_before_init_is_built_on_init() {
        let manager = manager_with(stack_of(&["a", "b"]), 40, 10);
        assert!(manager.is_initialised());
        assert_eq!(manager.tree().components().len(), 2);
        assert_eq!(manager.binder().bound_count(), 2);
    }

    #[test]
    fn unregistered_components_fail_the_load_with_a_bind_error() {
        let mut manager = LayoutManager::new(registry());
        manager.init(Rect::new(0, 0, 40, 10)).unwrap();
        let err = manager
            .load_resolved(ResolvedLayoutConfig {
                root: Some(stack_of(&["missing"])),
                ..ResolvedLayoutConfig::default()
            })
            .unwrap_err();
        assert!(matches!(err, LayoutError::Bind(_)));
    }

    #[test]
    fn invalid_configs_leave_the_current_layout_alone() {
        let mut manager = manager_with(stack_of(&["a"]), 40, 10);
        let before = manager.save_layout().unwrap();
        let bad = LayoutConfig::with_root(ItemConfig::of_type(
            crate::config::ItemType::Stack,
            vec![ItemConfig::of_type(crate::config::ItemType::Row, Vec::new())],
        ));
        assert!(manager.load_layout(&bad).is_err());
        assert_eq!(manager.save_layout().unwrap(), before);
    }

    #[test]
    fn a_bad_stored_popout_leaves_the_current_layout_alone() {
        let mut manager = manager_with(stack_of(&["a"]), 40, 10);
        let before = manager.save_layout().unwrap();
        let config = ResolvedLayoutConfig {
            root: Some(stack_of(&["b", "c"])),
            open_popouts: vec![crate::config::ResolvedPopoutConfig {
                root: Some(C::stack().with_content(vec![C::row()])),
                dimensions: dimensions(),
                settings: before.settings.clone(),
                header: before.header.clone(),
                parent_id: None,
                index_in_parent: None,
                window: PopoutWindow::default(),
            }],
            dimensions: dimensions(),
            ..ResolvedLayoutConfig::default()
        };
        let err = manager.load_resolved(config).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Config(crate::error::ConfigError::StackChildNotComponent(_))
        ));
        assert_eq!(manager.save_layout().unwrap(), before);
        assert_eq!(manager.binder().bound_count(), 1);
    }

    #[test]
    fn focus_moves_with_blur_and_focus_events() {
        let mut manager = manager_with(C::row().with_content(vec![stack_of(&["a"]), stack_of(&["b"])]), 40, 10);
        let seen = record(&mut manager, "*");
        let components = manager.tree().components();
        manager.focus_component(components[0]).unwrap();
        manager.focus_component(components[1]).unwrap();
        let events: Vec<_> = seen
            .borrow()
            .iter()
            .filter(|e| matches!(e, LayoutEvent::Focus(_) | LayoutEvent::Blur(_)))
            .cloned()
            .collect();
        assert_eq!(
            events,
            vec![
                LayoutEvent::Focus(components[0]),
                LayoutEvent::Blur(components[0]),
                LayoutEvent::Focus(components[1]),
            ]
        );
        assert_eq!(manager.focused_component(), Some(components[1]));
    }

    #[test]
    fn closing_the_focused_component_clears_focus() {
        let mut manager = manager_with(stack_of(&["a", "b"]), 40, 10);
        let first = manager.tree().components()[0];
        manager.focus_component(first).unwrap();
        assert!(manager.close_item(first).unwrap());
        assert_eq!(manager.focused_component(), None);
        assert_eq!(manager.binder().bound_count(), 1);
    }

    #[test]
    fn non_closable_items_stay() {
        let mut stack = stack_of(&["a"]);
        stack.content[0].is_closable = false;
        let mut manager = manager_with(stack, 40, 10);
        let component = manager.tree().components()[0];
        assert!(!manager.close_item(component).unwrap());
        assert!(manager.tree().contains(component));
    }

    #[test]
    fn resize_reports_are_debounced() {
        let mut manager = manager_with(stack_of(&["a"]), 40, 10);
        manager.notify_resize(50, 10);
        manager.advance_by(Duration::from_millis(60)).unwrap();
        manager.notify_resize(60, 12);
        manager.advance_by(Duration::from_millis(60)).unwrap();
        assert_eq!(manager.area().width, 40);
        manager.advance_by(Duration::from_millis(50)).unwrap();
        assert_eq!(manager.area(), Rect::new(0, 0, 60, 12));
        let root = manager.tree().root().unwrap();
        assert_eq!(manager.tree().get(root).unwrap().rect().width, 60);
    }

    #[test]
    fn state_changes_reach_layout_listeners_once_per_frame() {
        let mut manager = manager_with(stack_of(&["a"]), 40, 10);
        let seen = record(&mut manager, "stateChanged");
        let component = manager.tree().components()[0];
        manager.set_title(component, "one").unwrap();
        manager.set_title(component, "two").unwrap();
        assert!(seen.borrow().is_empty());
        manager.advance_by(ANIMATION_FRAME).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn loading_flushes_its_own_state_changes() {
        let mut manager = manager_with(stack_of(&["a"]), 40, 10);
        let seen = record(&mut manager, "stateChanged");
        manager
            .load_resolved(ResolvedLayoutConfig {
                root: Some(stack_of(&["b", "c"])),
                dimensions: dimensions(),
                ..ResolvedLayoutConfig::default()
            })
            .unwrap();
        let after_load = seen.borrow().len();
        assert!(after_load > 0);
        manager.advance_by(ANIMATION_FRAME).unwrap();
        assert_eq!(seen.borrow().len(), after_load);
    }

    #[test]
    fn save_pulls_component_state_from_the_binder() {
        let note = C::component("note").with_state(serde_json::json!({ "text": "hi" }));
        let mut manager = manager_with(C::stack().with_content(vec![note]), 40, 10);
        let component = manager.tree().components()[0];
        manager.focus_component(component).unwrap();
        let key = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('!'),
            crossterm::event::KeyModifiers::NONE,
        );
        assert!(manager.forward_event(&crossterm::event::Event::Key(key)));
        let saved = manager.save_layout().unwrap();
        let root = saved.root.unwrap();
        assert_eq!(root.content[0].component_state, Some(serde_json::json!({ "text": "hi!" })));
    }

    #[test]
    fn responsive_mode_folds_columns_that_do_not_fit() {
        let mut manager = LayoutManager::new(registry());
        let mut config = ResolvedLayoutConfig {
            root: Some(C::row().with_content(vec![
                stack_of(&["a"]),
                stack_of(&["b"]),
                stack_of(&["c"]),
            ])),
            dimensions: Dimensions {
                min_item_width: 15,
                ..dimensions()
            },
            ..ResolvedLayoutConfig::default()
        };
        config.settings.responsive_mode = ResponsiveMode::Always;
        manager.load_resolved(config).unwrap();
        manager.init(Rect::new(0, 0, 40, 10)).unwrap();
        let root = manager.tree().root().unwrap();
        assert_eq!(manager.tree().children(root).len(), 2);
        let first = manager.tree().children(root)[0];
        assert_eq!(manager.tree().children(first).len(), 2);
        assert_eq!(manager.tree().components().len(), 3);
    }

    #[test]
    fn destroy_releases_everything() {
        let mut manager = manager_with(stack_of(&["a", "b"]), 40, 10);
        let seen = record(&mut manager, "itemDestroyed");
        manager.destroy().unwrap();
        assert_eq!(manager.binder().bound_count(), 0);
        assert!(manager.tree().is_empty());
        assert_eq!(seen.borrow().len(), 3);
        assert!(!manager.is_initialised());
    }
}
