//! Pop-out windows: the hand-off of a subtree to a separate window and its
//! return.
//!
//! The parent serializes the subtree, minifies it and writes it to a
//! `PopoutStore` under `gl-window-config-<key>`. It then asks the
//! `PopoutHost` to open a window whose query carries `gl-window=<key>`. The
//! child reads and deletes the entry, builds its own engine in sub-window
//! mode and talks back over a `PopoutChannel`.

mod channel;
mod store;

pub use channel::{ChannelMessage, LocalChannel, MessageDirection, Payload, PopoutChannel};
pub use store::{FileStore, MemoryStore, PopoutStore};

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::config::minify::{maxify, minify};
use crate::config::{ResolvedPopoutConfig, WindowGeometry};
use crate::constants::{POPOUT_QUERY_KEY, POPOUT_STORAGE_PREFIX};
use crate::error::PopoutError;

/// Store key for the config of pop-out `window_key`.
pub fn storage_key(window_key: &str) -> String {
    format!("{POPOUT_STORAGE_PREFIX}{window_key}")
}

/// Query string handed to a new pop-out window.
pub fn window_query(window_key: &str) -> String {
    format!("{POPOUT_QUERY_KEY}={window_key}")
}

/// Extract the pop-out key from a query like `a=1&gl-window=abc`.
pub fn window_key_from_query(query: &str) -> Option<&str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == POPOUT_QUERY_KEY)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Minify `config` and write it under the key for `window_key`.
pub fn write_config(
    store: &mut dyn PopoutStore,
    window_key: &str,
    config: &ResolvedPopoutConfig,
) -> Result<(), PopoutError> {
    let value = serde_json::to_value(config).map_err(crate::error::ConfigError::from)?;
    let text = serde_json::to_string(&minify(&value)).map_err(crate::error::ConfigError::from)?;
    store.put(&storage_key(window_key), &text)?;
    Ok(())
}

/// Read and delete the config for `window_key`.
pub fn take_config(
    store: &mut dyn PopoutStore,
    window_key: &str,
) -> Result<ResolvedPopoutConfig, PopoutError> {
    let key = storage_key(window_key);
    let text = store
        .take(&key)?
        .ok_or_else(|| PopoutError::SubWindowConfigMissing(key.clone()))?;
    let minified: Value = serde_json::from_str(&text).map_err(crate::error::ConfigError::from)?;
    let value = maxify(&minified)?;
    let config = serde_json::from_value(value).map_err(crate::error::ConfigError::from)?;
    Ok(config)
}

/// What the host needs to open a pop-out window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub window_key: String,
    pub query: String,
    pub geometry: WindowGeometry,
}

/// Opens top-level windows on behalf of the layout.
pub trait PopoutHost {
    /// Open a window for `request`, returning the parent end of its
    /// channel, or `PopoutError::Blocked`.
    fn open(&mut self, request: &OpenRequest) -> Result<Box<dyn PopoutChannel>, PopoutError>;
}

/// Host for environments with a single window.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingHost;

impl PopoutHost for BlockingHost {
    fn open(&mut self, request: &OpenRequest) -> Result<Box<dyn PopoutChannel>, PopoutError> {
        tracing::debug!(window = %request.window_key, "pop-out blocked");
        Err(PopoutError::Blocked)
    }
}

/// A window opened by `LocalHost`, waiting for its engine to be built.
#[derive(Debug, Clone)]
pub struct PendingWindow {
    pub request: OpenRequest,
    /// Child end of the channel.
    pub channel: LocalChannel,
}

/// Host that keeps every window in-process. Opened windows are queued until
/// the caller takes them and builds their engines. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    pending: Rc<RefCell<Vec<PendingWindow>>>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_pending(&self) -> Vec<PendingWindow> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl PopoutHost for LocalHost {
    fn open(&mut self, request: &OpenRequest) -> Result<Box<dyn PopoutChannel>, PopoutError> {
        let (parent, child) = LocalChannel::pair();
        tracing::debug!(window = %request.window_key, query = %request.query, "pop-out window opened");
        self.pending.borrow_mut().push(PendingWindow {
            request: request.clone(),
            channel: child,
        });
        Ok(Box::new(parent))
    }
}

/// Parent-side record of an open pop-out.
pub struct Popout {
    window_key: String,
    config: ResolvedPopoutConfig,
    channel: Box<dyn PopoutChannel>,
}

impl std::fmt::Debug for Popout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Popout")
            .field("window_key", &self.window_key)
            .field("parent_id", &self.config.parent_id)
            .field("closed", &self.channel.is_closed())
            .finish()
    }
}

impl Popout {
    pub(crate) fn new(
        window_key: String,
        config: ResolvedPopoutConfig,
        channel: Box<dyn PopoutChannel>,
    ) -> Self {
        Self {
            window_key,
            config,
            channel,
        }
    }

    pub fn window_key(&self) -> &str {
        &self.window_key
    }

    /// The child's config as last reported, or as opened.
    pub fn config(&self) -> &ResolvedPopoutConfig {
        &self.config
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.config.parent_id.as_deref()
    }

    pub(crate) fn set_config(&mut self, config: ResolvedPopoutConfig) {
        self.config = config;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub(crate) fn try_recv(&mut self) -> Option<ChannelMessage> {
        self.channel.try_recv()
    }

    pub(crate) fn send(&mut self, payload: Payload) -> Result<(), PopoutError> {
        self.channel.send(ChannelMessage {
            origin: self.window_key.clone(),
            direction: MessageDirection::ToChild,
            payload,
        })
    }

    pub(crate) fn close(&mut self) {
        self.channel.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedItemConfig;

    #[test]
    fn window_key_is_read_from_the_query() {
        assert_eq!(window_key_from_query("?gl-window=abc"), Some("abc"));
        assert_eq!(window_key_from_query("x=1&gl-window=k2&y=2"), Some("k2"));
        assert_eq!(window_key_from_query("gl-window="), None);
        assert_eq!(window_key_from_query("x=1"), None);
        assert_eq!(window_query("k"), "gl-window=k");
    }

    #[test]
    fn configs_survive_the_store_minified() {
        let mut store = MemoryStore::new();
        let config = ResolvedPopoutConfig {
            root: Some(ResolvedItemConfig::component("chart").with_title("a")),
            dimensions: Default::default(),
            settings: Default::default(),
            header: Default::default(),
            parent_id: Some("p1".into()),
            index_in_parent: Some(2),
            window: Default::default(),
        };
        write_config(&mut store, "w1", &config).unwrap();
        let raw = store.get("gl-window-config-w1").unwrap().unwrap();
        assert!(!raw.contains("componentType"));
        assert_eq!(take_config(&mut store, "w1").unwrap(), config);
        assert!(matches!(
            take_config(&mut store, "w1"),
            Err(PopoutError::SubWindowConfigMissing(_))
        ));
    }

    #[test]
    fn blocking_host_refuses_and_local_host_queues() {
        let request = OpenRequest {
            window_key: "w".into(),
            query: window_query("w"),
            geometry: crate::config::PopoutWindow::default().geometry(),
        };
        assert!(matches!(BlockingHost.open(&request), Err(PopoutError::Blocked)));

        let host = LocalHost::new();
        let mut opener = host.clone();
        let mut parent = opener.open(&request).unwrap();
        let mut pending = host.take_pending();
        assert_eq!(pending.len(), 1);
        pending[0]
            .channel
            .send(ChannelMessage {
                origin: "w".into(),
                direction: MessageDirection::ToParent,
                payload: Payload::Close,
            })
            .unwrap();
        assert_eq!(parent.try_recv().map(|m| m.payload), Some(Payload::Close));
    }
}
