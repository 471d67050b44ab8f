//! Pop-out windows seen from both ends: the parent that hands a subtree off
//! and takes it back, and the sub-window that hosts it meanwhile.

use super::LayoutManager;
use crate::components::ComponentBinder;
use crate::config::{PopoutWindow, ResolvedItemConfig, ResolvedPopoutConfig};
use crate::error::{LayoutError, LayoutResult, PopoutError};
use crate::events::{EventEnvelope, LayoutEvent};
use crate::items::ItemKey;
use crate::popout::{
    ChannelMessage, MessageDirection, OpenRequest, Payload, Popout, storage_key, window_query,
    write_config,
};

impl<B: ComponentBinder> LayoutManager<B> {
    /// Move `item` and its subtree into a new window.
    ///
    /// Returns the new window's key, or `None` when the host blocked the
    /// window and `blockedPopoutsThrowError` is off. A blocked pop-out leaves
    /// the tree as it was.
    pub fn create_popout_from_item(&mut self, item: ItemKey) -> LayoutResult<Option<String>> {
        if self.sub_window.is_some() {
            return Err(LayoutError::Invariant("pop-outs cannot be nested"));
        }
        let content = self.tree.item(item)?;
        if content.is_ground() {
            return Err(LayoutError::Invariant("the ground item cannot be popped out"));
        }
        let rect = content.rect();
        self.sync_component_states();

        // Ancestors left empty by the removal disappear with it; record the
        // first one that survives.
        let mut child = item;
        let mut parent = self.tree.parent(item).ok_or(LayoutError::UnknownItem)?;
        while self.tree.children(parent).len() == 1 && !self.tree.item(parent)?.is_ground() {
            child = parent;
            parent = self.tree.parent(parent).ok_or(LayoutError::UnknownItem)?;
        }
        let index_in_parent = self.tree.child_index(parent, child);

        let window_key = self.next_unique_id();
        let parent_id = self.next_unique_id();
        self.tree.add_popin_parent_id(parent, parent_id.clone())?;

        let config = ResolvedPopoutConfig {
            root: Some(self.tree.to_config(item, None)?),
            dimensions: self.tree.dimensions,
            settings: self.tree.settings.clone(),
            header: self.tree.header.clone(),
            parent_id: Some(parent_id.clone()),
            index_in_parent,
            window: PopoutWindow {
                left: Some(i32::from(rect.x)),
                top: Some(i32::from(rect.y)),
                width: Some(rect.width),
                height: Some(rect.height),
            },
        };

        match self.open_popout_window(window_key.clone(), config) {
            Ok(()) => {
                self.bracket(|m| {
                    m.check_minimise_maximised_stack()?;
                    m.tree.remove_item(item, false)
                })?;
                tracing::debug!(window = %window_key, item = ?item, "item popped out");
                self.hub
                    .emit(EventEnvelope::global(LayoutEvent::WindowOpened(window_key.clone())));
                Ok(Some(window_key))
            }
            Err(err) => {
                self.tree.remove_popin_parent_id(&parent_id);
                self.blocked_or(err)
            }
        }
    }

    /// Open a window for `config` without touching the tree. `parent_id` and
    /// `index_in_parent` say where the content should go when it pops in.
    pub fn create_popout_from_config(
        &mut self,
        config: &ResolvedItemConfig,
        window: PopoutWindow,
        parent_id: Option<String>,
        index_in_parent: Option<usize>,
    ) -> LayoutResult<Option<String>> {
        config.validate()?;
        self.open_popout(ResolvedPopoutConfig {
            root: Some(config.clone()),
            dimensions: self.tree.dimensions,
            settings: self.tree.settings.clone(),
            header: self.tree.header.clone(),
            parent_id,
            index_in_parent,
            window,
        })
    }

    /// Open a window for a full pop-out config, as stored in `openPopouts`.
    pub(crate) fn open_popout(&mut self, config: ResolvedPopoutConfig) -> LayoutResult<Option<String>> {
        if self.sub_window.is_some() {
            return Err(LayoutError::Invariant("pop-outs cannot be nested"));
        }
        if let Some(root) = &config.root {
            root.validate()?;
        }
        let window_key = self.next_unique_id();
        match self.open_popout_window(window_key.clone(), config) {
            Ok(()) => {
                self.hub
                    .emit(EventEnvelope::global(LayoutEvent::WindowOpened(window_key.clone())));
                Ok(Some(window_key))
            }
            Err(err) => self.blocked_or(err),
        }
    }

    fn open_popout_window(&mut self, window_key: String, config: ResolvedPopoutConfig) -> Result<(), PopoutError> {
        write_config(self.store.as_mut(), &window_key, &config)?;
        let request = OpenRequest {
            window_key: window_key.clone(),
            query: window_query(&window_key),
            geometry: config.window.geometry(),
        };
        match self.host.open(&request) {
            Ok(channel) => {
                self.popouts.push(Popout::new(window_key, config, channel));
                Ok(())
            }
            Err(err) => {
                if let Err(store_err) = self.store.remove(&storage_key(&window_key)) {
                    tracing::debug!(window = %window_key, %store_err, "stale pop-out config left behind");
                }
                Err(err)
            }
        }
    }

    fn blocked_or(&self, err: PopoutError) -> LayoutResult<Option<String>> {
        match err {
            PopoutError::Blocked if !self.tree.settings.blocked_popouts_throw_error => {
                tracing::warn!("pop-out blocked by the host");
                Ok(None)
            }
            err => Err(err.into()),
        }
    }

    /// Close pop-out `window_key`. With `pop_in` its last known layout is
    /// put back into this one first.
    pub fn close_popout(&mut self, window_key: &str, pop_in: bool) -> LayoutResult<Option<ItemKey>> {
        let position = self
            .popouts
            .iter()
            .position(|p| p.window_key() == window_key)
            .ok_or(PopoutError::UnknownPopout)?;
        let mut popout = self.popouts.remove(position);
        if let Err(err) = popout.send(Payload::Close) {
            tracing::debug!(window = %window_key, %err, "pop-out already gone");
        }
        popout.close();
        if pop_in {
            return self.pop_in_config(window_key, popout.config().clone());
        }
        self.window_closed(&popout);
        Ok(None)
    }

    /// Drain every pop-out channel. Parents pick up snapshots, pop-ins and
    /// closed windows; sub-windows react to close requests.
    pub fn process_popout_messages(&mut self) -> LayoutResult<()> {
        if self.sub_window.is_some() {
            return self.process_parent_messages();
        }
        let mut index = 0;
        while index < self.popouts.len() {
            let mut popped_in = None;
            let mut closed = false;
            while let Some(message) = self.popouts[index].try_recv() {
                match message.payload {
                    Payload::PopIn(config) => popped_in = Some(config),
                    Payload::Snapshot(config) => self.popouts[index].set_config(config),
                    Payload::Close => closed = true,
                    Payload::Broadcast { name, data } => {
                        self.hub
                            .emit(EventEnvelope::global(LayoutEvent::UserBroadcast { name, data }));
                    }
                }
            }
            if let Some(config) = popped_in {
                let popout = self.popouts.remove(index);
                self.pop_in_config(popout.window_key(), config)?;
                continue;
            }
            if closed || self.popouts[index].is_closed() {
                let popout = self.popouts.remove(index);
                tracing::debug!(window = popout.window_key(), "pop-out closed");
                if self.tree.settings.pop_in_on_close {
                    self.pop_in_config(popout.window_key(), popout.config().clone())?;
                } else {
                    self.window_closed(&popout);
                }
                continue;
            }
            index += 1;
        }
        Ok(())
    }

    fn process_parent_messages(&mut self) -> LayoutResult<()> {
        let mut messages = Vec::new();
        if let Some(sub) = self.sub_window.as_mut() {
            while let Some(message) = sub.channel.try_recv() {
                messages.push(message);
            }
        }
        for message in messages {
            match message.payload {
                Payload::Close => {
                    tracing::debug!("parent closed this window");
                    self.destroy()?;
                    if let Some(sub) = self.sub_window.as_mut() {
                        sub.channel.close();
                    }
                }
                Payload::Broadcast { name, data } => {
                    self.hub
                        .emit(EventEnvelope::global(LayoutEvent::UserBroadcast { name, data }));
                }
                Payload::PopIn(_) | Payload::Snapshot(_) => {
                    tracing::debug!(origin = %message.origin, "ignoring parent-bound message");
                }
            }
        }
        Ok(())
    }

    fn window_closed(&mut self, popout: &Popout) {
        if let Some(parent_id) = popout.parent_id() {
            self.tree.remove_popin_parent_id(parent_id);
        }
        self.hub
            .emit(EventEnvelope::global(LayoutEvent::WindowClosed(popout.window_key().to_string())));
    }

    /// Re-insert the content of a closed pop-out. It goes back under the
    /// parent tagged at pop-out time, else at the front of the root, else
    /// it becomes the root.
    fn pop_in_config(&mut self, window_key: &str, config: ResolvedPopoutConfig) -> LayoutResult<Option<ItemKey>> {
        let parent_id = config.parent_id.clone();
        let Some(root) = config.root else {
            if let Some(id) = &parent_id {
                self.tree.remove_popin_parent_id(id);
            }
            self.hub
                .emit(EventEnvelope::global(LayoutEvent::WindowClosed(window_key.to_string())));
            return Ok(None);
        };
        let tagged = parent_id
            .as_deref()
            .and_then(|id| self.tree.find_by_popin_parent_id(id));
        let (parent, index) = match (tagged, self.tree.root()) {
            (Some(parent), _) => (parent, config.index_in_parent),
            (None, Some(root)) => (root, Some(0)),
            (None, None) => (self.tree.ground(), None),
        };
        let added = self.bracket(|m| {
            m.check_minimise_maximised_stack()?;
            let added = m.insert_at(parent, &root, index)?;
            m.tree.bubble(added, LayoutEvent::PopIn(added));
            Ok(added)
        })?;
        if let Some(id) = &parent_id {
            self.tree.remove_popin_parent_id(id);
        }
        tracing::debug!(window = %window_key, item = ?added, "pop-out content returned");
        self.hub
            .emit(EventEnvelope::global(LayoutEvent::WindowClosed(window_key.to_string())));
        Ok(Some(added))
    }

    /// The config this sub-window would hand back to its parent.
    pub fn popout_config(&mut self) -> LayoutResult<ResolvedPopoutConfig> {
        let layout = self.save_layout()?;
        let sub = self
            .sub_window
            .as_ref()
            .ok_or(LayoutError::Invariant("not a pop-out window"))?;
        Ok(ResolvedPopoutConfig {
            root: layout.root,
            dimensions: layout.dimensions,
            settings: layout.settings,
            header: layout.header,
            parent_id: sub.parent_id.clone(),
            index_in_parent: sub.index_in_parent,
            window: sub.window,
        })
    }

    /// Hand this sub-window's layout back to the parent and shut it down.
    pub fn pop_in(&mut self) -> LayoutResult<()> {
        let config = self.popout_config()?;
        self.send_to_parent(Payload::PopIn(config))?;
        self.destroy()?;
        if let Some(sub) = self.sub_window.as_mut() {
            sub.channel.close();
        }
        Ok(())
    }

    /// Send the parent this sub-window's current layout.
    pub fn send_snapshot(&mut self) -> LayoutResult<()> {
        let config = self.popout_config()?;
        self.send_to_parent(Payload::Snapshot(config))?;
        if let Some(sub) = self.sub_window.as_mut() {
            sub.snapshot_dirty = false;
        }
        Ok(())
    }

    /// Send a snapshot if the layout changed since the last one.
    pub(crate) fn flush_snapshot(&mut self) -> LayoutResult<()> {
        let dirty = self
            .sub_window
            .as_ref()
            .is_some_and(|s| s.snapshot_dirty && !s.channel.is_closed());
        if dirty && self.initialised {
            self.send_snapshot()?;
        }
        Ok(())
    }

    fn send_to_parent(&mut self, payload: Payload) -> LayoutResult<()> {
        let sub = self
            .sub_window
            .as_mut()
            .ok_or(LayoutError::Invariant("not a pop-out window"))?;
        sub.channel.send(ChannelMessage {
            origin: sub.window_key.clone(),
            direction: MessageDirection::ToParent,
            payload,
        })?;
        Ok(())
    }
}
