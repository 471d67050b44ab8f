use crate::ui::UiFrame;
use ratatui::prelude::Rect;
use std::io;

/// Where a host draws frames.
pub trait OutputDriver {
    /// Switch the terminal into layout mode (alternate screen, raw input).
    fn enter(&mut self) -> io::Result<()>;
    fn exit(&mut self) -> io::Result<()>;

    /// Area the next frame will cover.
    fn size(&self) -> io::Result<Rect>;

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>);
}
