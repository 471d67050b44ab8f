//! Shared component rendering context
//!
//! `ComponentContext` carries what a bound component may need while
//! rendering, resizing or handling events: whether its item holds focus and
//! which logical layer its container sits on.

use crate::constants::z_index;

/// Context passed to `Component` trait methods describing layout state.
///
/// - `focused`: whether the component's item is the focused one.
/// - `z_index`: logical layer of the container (base, drag or maximised).
#[derive(Debug, Clone, Copy)]
pub struct ComponentContext {
    focused: bool,
    z_index: u16,
}

impl ComponentContext {
    pub const fn new(focused: bool) -> Self {
        Self {
            focused,
            z_index: z_index::BASE,
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn z_index(&self) -> u16 {
        self.z_index
    }

    /// Whether the container belongs to the maximised stack.
    pub const fn maximised(&self) -> bool {
        self.z_index == z_index::STACK_MAXIMISED
    }

    /// Whether the container is being dragged.
    pub const fn dragging(&self) -> bool {
        self.z_index == z_index::DRAG
    }

    pub const fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub const fn with_z_index(mut self, z_index: u16) -> Self {
        self.z_index = z_index;
        self
    }
}

impl Default for ComponentContext {
    fn default() -> Self {
        Self::new(false)
    }
}
