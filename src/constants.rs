//! Shared crate-wide constants.

use std::time::Duration;

/// Distance (in pixels) the pointer has to travel after a press before the
/// gesture is treated as a drag.
pub const DRAG_DISTANCE_THRESHOLD: f64 = 10.0;

/// How long a press must be held without moving before it turns into a drag.
pub const DRAG_HOLD_DELAY: Duration = Duration::from_millis(1800);

/// Window resize notifications arriving closer together than this are
/// coalesced into a single layout pass.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Length of one animation frame. Throttled notifications are flushed at most
/// once per frame.
pub const ANIMATION_FRAME: Duration = Duration::from_millis(16);

/// Thickness of the four layout-edge drop strips when no dimension override
/// is configured.
pub const DEFAULT_DOCK_EDGE_SIZE: u16 = 50;

/// Query parameter a pop-out window receives its storage key under.
pub const POPOUT_QUERY_KEY: &str = "gl-window";

/// Prefix of the storage keys pop-out configs are written under.
pub const POPOUT_STORAGE_PREFIX: &str = "gl-window-config-";

/// Fallback pop-out window size when neither config nor source item supply one.
pub const DEFAULT_POPOUT_WIDTH: u16 = 500;
pub const DEFAULT_POPOUT_HEIGHT: u16 = 309;

/// Logical z-index layers for virtually positioned components.
pub mod z_index {
    pub const BASE: u16 = 0;
    pub const DRAG: u16 = 32;
    pub const STACK_MAXIMISED: u16 = 41;
}
