//! Error types surfaced by the layout engine.
//!
//! Three families exist: configuration errors raised while resolving input,
//! boundary errors raised by collaborators the host supplies (component
//! binders, pop-out windows), and invariant failures that indicate a bug in
//! the tree logic itself. `LayoutError` wraps all of them for operations on
//! the orchestrator.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse layout config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{0}` is not a valid item type")]
    InvalidItemType(String),
    #[error("stack children must be components, found `{0}`")]
    StackChildNotComponent(String),
    #[error("component items cannot have content")]
    ComponentHasContent,
    #[error("component item is missing `componentType`")]
    MissingComponentType,
    #[error("activeItemIndex {index} is out of range for a stack with {len} items")]
    ActiveItemIndexOutOfRange { index: usize, len: usize },
    #[error("layout config cannot specify both `root` and `content`")]
    RootAndContent,
    #[error("legacy `content` can hold at most one root item, found {0}")]
    TooManyRootItems(usize),
    #[error("expected a component item config, found `{0}`")]
    NotComponent(String),
    #[error("minified config is malformed: {0}")]
    Minified(&'static str),
}

#[derive(Debug, Error)]
pub enum BindError {
    #[error("component type `{0}` is not registered")]
    Unregistered(String),
    #[error("component type `{0}` is already registered")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum PopoutError {
    #[error("pop-out window was blocked by the host")]
    Blocked,
    #[error("no pop-out config found under key `{0}`")]
    SubWindowConfigMissing(String),
    #[error("query does not carry a pop-out key")]
    MissingWindowKey,
    #[error("unknown pop-out window")]
    UnknownPopout,
    #[error("pop-out store failure: {0}")]
    Store(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Popout(#[from] PopoutError),
    #[error("layout manager is not initialised")]
    NotInitialised,
    #[error("content item no longer exists")]
    UnknownItem,
    #[error("no location available for the new item")]
    NoLocation,
    #[error("layout invariant violated: {0}")]
    Invariant(&'static str),
}

impl From<serde_json::Error> for LayoutError {
    fn from(err: serde_json::Error) -> Self {
        LayoutError::Config(ConfigError::Parse(err))
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;
