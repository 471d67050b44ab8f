//! term-dock: a docking-panel layout engine.
//!
//! Content lives in a tree of rows, columns and tabbed stacks whose leaves
//! are host components. The engine sizes the tree, lets the user drag tabs
//! onto new docking positions, maximises stacks, hands subtrees off to
//! pop-out windows and round-trips the whole arrangement through a JSON
//! config. `LayoutManager` is the entry point; the terminal host in
//! `main.rs` shows it driven by crossterm input and drawn with ratatui.

pub mod component_context;
pub mod components;
pub mod config;
pub mod constants;
pub mod drag;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod header;
pub mod items;
pub mod layout;
pub mod manager;
pub mod popout;
pub mod scheduler;
pub mod splitter;
pub mod theme;
pub mod tracing_sub;
pub mod ui;

pub use manager::LayoutManager;
