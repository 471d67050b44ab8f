//! Message passing between a layout and its pop-out windows.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ResolvedPopoutConfig;
use crate::error::PopoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageDirection {
    ToParent,
    ToChild,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Payload {
    /// The child is closing and hands its layout back.
    PopIn(ResolvedPopoutConfig),
    /// The child's current layout, kept by the parent for saving.
    Snapshot(ResolvedPopoutConfig),
    /// Close the receiving window.
    Close,
    Broadcast { name: String, data: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMessage {
    /// Window key of the pop-out the message concerns.
    pub origin: String,
    pub direction: MessageDirection,
    pub payload: Payload,
}

/// One end of a fire-and-forget channel. There are no acknowledgements;
/// a closed peer is noticed the next time the channel is polled.
pub trait PopoutChannel {
    fn send(&mut self, message: ChannelMessage) -> Result<(), PopoutError>;
    fn try_recv(&mut self) -> Option<ChannelMessage>;
    /// Whether either end has closed.
    fn is_closed(&self) -> bool;
    fn close(&mut self);
}

type Queue = Rc<RefCell<VecDeque<ChannelMessage>>>;

/// In-process channel for hosts (and tests) that keep every window in one
/// thread.
#[derive(Debug, Clone)]
pub struct LocalChannel {
    inbox: Queue,
    outbox: Queue,
    closed: Rc<Cell<bool>>,
}

impl LocalChannel {
    pub fn pair() -> (LocalChannel, LocalChannel) {
        let a: Queue = Rc::default();
        let b: Queue = Rc::default();
        let closed = Rc::new(Cell::new(false));
        (
            LocalChannel {
                inbox: a.clone(),
                outbox: b.clone(),
                closed: closed.clone(),
            },
            LocalChannel {
                inbox: b,
                outbox: a,
                closed,
            },
        )
    }
}

impl PopoutChannel for LocalChannel {
    fn send(&mut self, message: ChannelMessage) -> Result<(), PopoutError> {
        if self.closed.get() {
            tracing::debug!(origin = %message.origin, "dropping message on closed channel");
            return Ok(());
        }
        self.outbox.borrow_mut().push_back(message);
        Ok(())
    }

    fn try_recv(&mut self) -> Option<ChannelMessage> {
        self.inbox.borrow_mut().pop_front()
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn close(&mut self) {
        self.closed.set(true);
    }
}
