//! Layout notifications and the hub that delivers them.
//!
//! Most notifications originate at an item and bubble: every ancestor's
//! listeners see the event on the way up, then the global listeners do.
//! `StateChanged` is high-frequency, so its global delivery is throttled to
//! one per originating item per animation frame.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::items::ItemKey;
use crate::layout::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    Initialised,
    ItemCreated(ItemKey),
    StackCreated(ItemKey),
    RowCreated(ItemKey),
    ColumnCreated(ItemKey),
    ComponentCreated(ItemKey),
    BeforeItemDestroyed(ItemKey),
    ItemDestroyed(ItemKey),
    StateChanged,
    ActiveContentItemChanged { stack: ItemKey, component: ItemKey },
    TabCreated { stack: ItemKey, component: ItemKey },
    TitleChanged { component: ItemKey, title: String },
    Focus(ItemKey),
    Blur(ItemKey),
    Maximised(ItemKey),
    Minimised(ItemKey),
    DragStart(ItemKey),
    Drag(Point),
    DragStop(ItemKey),
    ItemDropped(ItemKey),
    WindowOpened(String),
    WindowClosed(String),
    PopIn(ItemKey),
    BeforeVirtualRecting { count: usize },
    AfterVirtualRecting,
    UserBroadcast { name: String, data: Value },
}

impl LayoutEvent {
    /// The name listeners filter on.
    pub fn name(&self) -> &'static str {
        match self {
            LayoutEvent::Initialised => "initialised",
            LayoutEvent::ItemCreated(_) => "itemCreated",
            LayoutEvent::StackCreated(_) => "stackCreated",
            LayoutEvent::RowCreated(_) => "rowCreated",
            LayoutEvent::ColumnCreated(_) => "columnCreated",
            LayoutEvent::ComponentCreated(_) => "componentCreated",
            LayoutEvent::BeforeItemDestroyed(_) => "beforeItemDestroyed",
            LayoutEvent::ItemDestroyed(_) => "itemDestroyed",
            LayoutEvent::StateChanged => "stateChanged",
            LayoutEvent::ActiveContentItemChanged { .. } => "activeContentItemChanged",
            LayoutEvent::TabCreated { .. } => "tabCreated",
            LayoutEvent::TitleChanged { .. } => "titleChanged",
            LayoutEvent::Focus(_) => "focus",
            LayoutEvent::Blur(_) => "blur",
            LayoutEvent::Maximised(_) => "maximised",
            LayoutEvent::Minimised(_) => "minimised",
            LayoutEvent::DragStart(_) => "dragStart",
            LayoutEvent::Drag(_) => "drag",
            LayoutEvent::DragStop(_) => "dragStop",
            LayoutEvent::ItemDropped(_) => "itemDropped",
            LayoutEvent::WindowOpened(_) => "windowOpened",
            LayoutEvent::WindowClosed(_) => "windowClosed",
            LayoutEvent::PopIn(_) => "popIn",
            LayoutEvent::BeforeVirtualRecting { .. } => "beforeVirtualRecting",
            LayoutEvent::AfterVirtualRecting => "afterVirtualRecting",
            LayoutEvent::UserBroadcast { .. } => "userBroadcast",
        }
    }

    fn is_throttled(&self) -> bool {
        matches!(self, LayoutEvent::StateChanged)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    /// The item the notification started at; `None` for layout-wide events.
    pub origin: Option<ItemKey>,
    pub event: LayoutEvent,
}

impl EventEnvelope {
    pub fn global(event: LayoutEvent) -> Self {
        Self {
            origin: None,
            event,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&EventEnvelope)>;

struct Subscription {
    id: SubscriptionId,
    /// `None` for layout-wide listeners.
    item: Option<ItemKey>,
    /// Event name, or `*` for everything.
    filter: String,
    callback: Listener,
}

impl Subscription {
    fn wants(&self, item: Option<ItemKey>, event: &LayoutEvent) -> bool {
        self.item == item && (self.filter == "*" || self.filter == event.name())
    }
}

#[derive(Default)]
pub struct EventHub {
    next_id: u64,
    subscriptions: Vec<Subscription>,
    pending_origins: HashSet<Option<ItemKey>>,
    deferred: Vec<EventEnvelope>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscriptions", &self.subscriptions.len())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for `filter` (an event name or `*`) at layout level.
    pub fn subscribe(&mut self, filter: impl Into<String>, callback: Listener) -> SubscriptionId {
        self.add(None, filter.into(), callback)
    }

    /// Listen for `filter` as it bubbles through `item`.
    pub fn subscribe_item(
        &mut self,
        item: ItemKey,
        filter: impl Into<String>,
        callback: Listener,
    ) -> SubscriptionId {
        self.add(Some(item), filter.into(), callback)
    }

    fn add(&mut self, item: Option<ItemKey>, filter: String, callback: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription {
            id,
            item,
            filter,
            callback,
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Drop every listener attached to `item`.
    pub(crate) fn forget_item(&mut self, item: ItemKey) {
        self.subscriptions.retain(|s| s.item != Some(item));
    }

    fn deliver(&mut self, item: Option<ItemKey>, envelope: &EventEnvelope) {
        for sub in self.subscriptions.iter_mut() {
            if sub.wants(item, &envelope.event) {
                (sub.callback)(envelope);
            }
        }
    }

    /// Deliver to layout-level listeners only.
    pub fn emit(&mut self, envelope: EventEnvelope) {
        tracing::trace!(event = envelope.event.name(), "emit");
        self.deliver(None, &envelope);
    }

    /// Deliver along `path` (origin first), then at layout level. Returns
    /// `true` when layout-level delivery was deferred to the next animation
    /// frame.
    pub(crate) fn bubble(&mut self, path: &[ItemKey], envelope: EventEnvelope) -> bool {
        for item in path {
            self.deliver(Some(*item), &envelope);
        }
        if !envelope.event.is_throttled() {
            self.emit(envelope);
            return false;
        }
        if self.pending_origins.insert(envelope.origin) {
            self.deferred.push(envelope);
        }
        true
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Deliver throttled notifications held back for this frame.
    pub(crate) fn flush_frame(&mut self) {
        self.pending_origins.clear();
        for envelope in std::mem::take(&mut self.deferred) {
            self.emit(envelope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn keys(n: usize) -> Vec<ItemKey> {
        let mut map: SlotMap<ItemKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn recorder(hub: &mut EventHub, item: Option<ItemKey>, filter: &str) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let callback: Listener = Box::new(move |e: &EventEnvelope| {
            sink.borrow_mut().push(e.event.name().to_string());
        });
        match item {
            Some(item) => hub.subscribe_item(item, filter, callback),
            None => hub.subscribe(filter, callback),
        };
        seen
    }

    #[test]
    fn bubbling_reaches_ancestors_then_the_layout() {
        let k = keys(3);
        let mut hub = EventHub::new();
        let parent = recorder(&mut hub, Some(k[1]), "*");
        let unrelated = recorder(&mut hub, Some(k[2]), "*");
        let global = recorder(&mut hub, None, "itemCreated");
        hub.bubble(
            &[k[0], k[1]],
            EventEnvelope {
                origin: Some(k[0]),
                event: LayoutEvent::ItemCreated(k[0]),
            },
        );
        assert_eq!(*parent.borrow(), vec!["itemCreated"]);
        assert!(unrelated.borrow().is_empty());
        assert_eq!(*global.borrow(), vec!["itemCreated"]);
    }

    #[test]
    fn state_changes_are_throttled_per_origin() {
        let k = keys(2);
        let mut hub = EventHub::new();
        let global = recorder(&mut hub, None, "stateChanged");
        let changed = |origin| EventEnvelope {
            origin: Some(origin),
            event: LayoutEvent::StateChanged,
        };
        assert!(hub.bubble(&[k[0]], changed(k[0])));
        hub.bubble(&[k[0]], changed(k[0]));
        hub.bubble(&[k[1]], changed(k[1]));
        assert!(global.borrow().is_empty());
        hub.flush_frame();
        assert_eq!(global.borrow().len(), 2);
        hub.bubble(&[k[0]], changed(k[0]));
        hub.flush_frame();
        assert_eq!(global.borrow().len(), 3);
    }

    #[test]
    fn unsubscribed_listeners_stay_quiet() {
        let mut hub = EventHub::new();
        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        let id = hub.subscribe("*", Box::new(move |_| *sink.borrow_mut() += 1));
        hub.emit(EventEnvelope::global(LayoutEvent::Initialised));
        assert!(hub.unsubscribe(id));
        hub.emit(EventEnvelope::global(LayoutEvent::Initialised));
        assert_eq!(*seen.borrow(), 1);
        assert!(!hub.unsubscribe(id));
    }
}
