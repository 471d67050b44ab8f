//! Pointer gestures and drag-and-drop docking.
//!
//! `DragListener` turns raw pointer input into click and drag gestures.
//! A drag starts once the pointer travels past the distance threshold or is
//! held down past the hold delay, whichever comes first.

mod proxy;
mod source;

pub use proxy::{DragProxy, DropTarget, drop_areas};
pub use source::{DragSource, DragSourceId, DragSources};

use std::time::Duration;

use crate::constants::{DRAG_DISTANCE_THRESHOLD, DRAG_HOLD_DELAY};
use crate::layout::Point;
use crate::scheduler::{Scheduler, Task, TaskHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pressed and released without starting a drag.
    Click(Point),
    /// The drag began; `origin` is where the pointer went down.
    DragStart { origin: Point, point: Point },
    Drag(Point),
    DragStop(Point),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListenerState {
    Idle,
    Pressed {
        origin: Point,
        last: Point,
        hold: Option<TaskHandle>,
    },
    Dragging {
        last: Point,
    },
}

#[derive(Debug, Clone)]
pub struct DragListener {
    distance: f64,
    delay: Option<Duration>,
    state: ListenerState,
}

impl Default for DragListener {
    fn default() -> Self {
        Self::new(DRAG_DISTANCE_THRESHOLD, Some(DRAG_HOLD_DELAY))
    }
}

impl DragListener {
    /// `distance` must be exceeded on either axis; `delay` of `None`
    /// disables hold-to-drag.
    pub fn new(distance: f64, delay: Option<Duration>) -> Self {
        Self {
            distance,
            delay,
            state: ListenerState::Idle,
        }
    }

    pub fn is_pressed(&self) -> bool {
        !matches!(self.state, ListenerState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ListenerState::Dragging { .. })
    }

    pub fn hold_handle(&self) -> Option<TaskHandle> {
        match self.state {
            ListenerState::Pressed { hold, .. } => hold,
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, point: Point, scheduler: &mut Scheduler) {
        self.cancel(scheduler);
        let hold = self
            .delay
            .map(|delay| scheduler.schedule(delay, Task::HoldTimeout));
        self.state = ListenerState::Pressed {
            origin: point,
            last: point,
            hold,
        };
    }

    pub fn pointer_move(&mut self, point: Point, scheduler: &mut Scheduler) -> Option<Gesture> {
        match self.state {
            ListenerState::Idle => None,
            ListenerState::Pressed { origin, hold, .. } => {
                let dx = (point.x - origin.x).abs();
                let dy = (point.y - origin.y).abs();
                if dx > self.distance || dy > self.distance {
                    if let Some(hold) = hold {
                        scheduler.cancel(hold);
                    }
                    self.state = ListenerState::Dragging { last: point };
                    Some(Gesture::DragStart { origin, point })
                } else {
                    self.state = ListenerState::Pressed {
                        origin,
                        last: point,
                        hold,
                    };
                    None
                }
            }
            ListenerState::Dragging { .. } => {
                self.state = ListenerState::Dragging { last: point };
                Some(Gesture::Drag(point))
            }
        }
    }

    /// The hold timer `handle` fired.
    pub fn hold_elapsed(&mut self, handle: TaskHandle) -> Option<Gesture> {
        match self.state {
            ListenerState::Pressed {
                origin,
                last,
                hold: Some(hold),
            } if hold == handle => {
                self.state = ListenerState::Dragging { last };
                Some(Gesture::DragStart {
                    origin,
                    point: last,
                })
            }
            _ => None,
        }
    }

    pub fn pointer_up(&mut self, point: Point, scheduler: &mut Scheduler) -> Option<Gesture> {
        let state = std::mem::replace(&mut self.state, ListenerState::Idle);
        match state {
            ListenerState::Idle => None,
            ListenerState::Pressed { hold, .. } => {
                if let Some(hold) = hold {
                    scheduler.cancel(hold);
                }
                Some(Gesture::Click(point))
            }
            ListenerState::Dragging { .. } => Some(Gesture::DragStop(point)),
        }
    }

    pub fn cancel(&mut self, scheduler: &mut Scheduler) {
        if let ListenerState::Pressed {
            hold: Some(hold), ..
        } = self.state
        {
            scheduler.cancel(hold);
        }
        self.state = ListenerState::Idle;
    }
}
