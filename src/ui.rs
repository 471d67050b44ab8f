//! UiFrame: a thin wrapper around `ratatui::Frame` that clips drawing to the
//! visible area.
//!
//! Stack rects, dropdown panels and the drag proxy are all computed from
//! layout geometry and can run past the terminal edge, especially while the
//! terminal is shrinking and a debounced resize has not landed yet. Writing
//! outside the `Buffer` panics, so every draw call goes through `UiFrame`,
//! which intersects the target rect with its area first.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Draw into a plain buffer, outside a terminal draw. Snapshot tests and
    /// the bench render this way.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    /// Render `widget` into the part of `area` that is on screen.
    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        let clipped = area.intersection(self.area);
        if !clipped.is_empty() {
            widget.render(clipped, self.buffer);
        }
    }
}

/// Write `text` at `(x, y)`, cut at the right edge of `bounds`. Positions
/// outside `bounds` are dropped.
pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    let bounds = bounds.intersection(buffer.area);
    if bounds.is_empty() {
        return;
    }
    if x < bounds.left() || x >= bounds.right() || y < bounds.top() || y >= bounds.bottom() {
        return;
    }
    let available = usize::from(bounds.right() - x);
    buffer.set_string(x, y, truncate_to_width(text, available), style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Clear;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn tab_titles_are_cut_at_the_header_edge() {
        let area = Rect::new(0, 0, 8, 1);
        let mut buf = Buffer::empty(area);
        safe_set_string(&mut buf, Rect::new(2, 0, 4, 1), 3, 0, "readme", Style::default());
        assert_eq!(row(&buf, 0), "   rea  ");
    }

    #[test]
    fn writes_outside_bounds_are_dropped() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        safe_set_string(&mut buf, area, 9, 0, "x", Style::default());
        safe_set_string(&mut buf, Rect::new(0, 0, 40, 40), 1, 30, "x", Style::default());
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn widgets_are_clipped_to_the_frame() {
        let area = Rect::new(0, 0, 5, 3);
        let mut buf = Buffer::with_lines(["#####", "#####", "#####"]);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        // A dropdown panel hanging off the bottom-right corner.
        ui.render_widget(Clear, Rect::new(3, 1, 6, 6));
        assert_eq!(buf, Buffer::with_lines(["#####", "###  ", "###  "]));
    }
}
