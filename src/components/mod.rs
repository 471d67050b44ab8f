//! Host content bound into component items.
//!
//! The engine never looks inside a component. When a component item is
//! created it asks a `ComponentBinder` to bind host content for it, and when
//! the item is destroyed it asks for the binding to be released. A rendered
//! binding is drawn by the layout's own render pass inside the item's rect;
//! a virtual binding positions itself from the placements the engine pushes.

mod note;
mod registry;

pub use note::NoteComponent;
pub use registry::{BoundComponent, ComponentFactory, ComponentRegistry, FallbackFactory};

use crossterm::event::Event;
use ratatui::layout::Rect;
use serde_json::Value;

pub use crate::component_context::ComponentContext;
use crate::config::ResolvedItemConfig;
use crate::error::BindError;
use crate::items::{ItemKey, Placement};
use crate::ui::UiFrame;

pub trait Component {
    fn resize(&mut self, _area: Rect, _ctx: &ComponentContext) {}

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext);

    fn handle_event(&mut self, _event: &Event, _ctx: &ComponentContext) -> bool {
        false
    }

    /// Serializable state to persist with the layout.
    fn state(&self) -> Option<Value> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Drawn by the layout inside the container's rect.
    Rendered,
    /// Outside normal flow; told its placement explicitly.
    Virtual,
}

/// Resolves component configs to host content.
pub trait ComponentBinder {
    fn bind(
        &mut self,
        container: ItemKey,
        config: &ResolvedItemConfig,
    ) -> Result<BindingKind, BindError>;

    fn release(&mut self, container: ItemKey);

    /// Apply a new placement to a virtual binding.
    fn virtual_rect(&mut self, _container: ItemKey, _placement: Placement) {}

    /// Current state of the bound content, if it keeps any.
    fn state(&self, _container: ItemKey) -> Option<Value> {
        None
    }
}
