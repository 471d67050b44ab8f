use ratatui::style::Color;

// Centralized theme colors for headers, splitters and drag feedback.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);
pub const ACCENT_ALT_RGB: (u8, u8, u8) = (255, 165, 0);

pub fn rgb_to_color(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn accent() -> Color {
    rgb_to_color(ACCENT_RGB)
}

pub fn accent_alt() -> Color {
    rgb_to_color(ACCENT_ALT_RGB)
}

// Header strip
pub fn header_bg() -> Color {
    Color::DarkGray
}
pub fn header_fg() -> Color {
    Color::Gray
}
pub fn tab_active_bg() -> Color {
    Color::Blue
}
pub fn tab_active_fg() -> Color {
    Color::White
}
pub fn tab_focused_bg() -> Color {
    accent()
}
pub fn control_fg() -> Color {
    Color::White
}

// Dropdown
pub fn dropdown_bg() -> Color {
    Color::Black
}
pub fn dropdown_fg() -> Color {
    Color::White
}

// Splitters
pub fn splitter() -> Color {
    Color::DarkGray
}
pub fn splitter_dragging() -> Color {
    accent_alt()
}

// Drag feedback
pub fn drop_indicator() -> Color {
    accent()
}
pub fn drag_proxy_bg() -> Color {
    Color::Gray
}
pub fn drag_proxy_fg() -> Color {
    Color::Black
}

// Content
pub fn content_fg() -> Color {
    Color::Gray
}
pub fn content_focused_fg() -> Color {
    Color::White
}
pub fn empty_fg() -> Color {
    Color::DarkGray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_colors_are_rgb() {
        assert_eq!(accent(), Color::Rgb(200, 100, 0));
        assert!(matches!(accent_alt(), Color::Rgb(_, _, _)));
    }
}
