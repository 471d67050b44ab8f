use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Wrap};
use serde_json::{Value, json};

use crate::components::{Component, ComponentContext};
use crate::theme;
use crate::ui::UiFrame;

/// Editable scratch text, persisted as `{ "text": ... }`.
#[derive(Debug, Default)]
pub struct NoteComponent {
    text: String,
    scroll: u16,
    view_height: u16,
}

impl NoteComponent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Build from a component state blob, tolerating anything malformed.
    pub fn from_state(state: Option<&Value>) -> Self {
        let text = state
            .and_then(|s| s.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        Self::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn line_count(&self) -> u16 {
        self.text.lines().count().max(1).min(usize::from(u16::MAX)) as u16
    }

    fn scroll_to_end(&mut self) {
        self.scroll = self.line_count().saturating_sub(self.view_height.max(1));
    }
}

impl Component for NoteComponent {
    fn resize(&mut self, area: Rect, _ctx: &ComponentContext) {
        self.view_height = area.height;
        self.scroll = self
            .scroll
            .min(self.line_count().saturating_sub(area.height.max(1)));
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.view_height = area.height;
        let style = if ctx.focused() {
            Style::default().fg(theme::content_focused_fg())
        } else {
            Style::default().fg(theme::content_fg())
        };
        let paragraph = Paragraph::new(Text::raw(self.text.clone()))
            .style(style)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        if !ctx.focused() {
            return false;
        }
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind != KeyEventKind::Press || key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Char(ch) => self.text.push(ch),
            KeyCode::Enter => self.text.push('\n'),
            KeyCode::Backspace => {
                self.text.pop();
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                return true;
            }
            KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(self.line_count().saturating_sub(1));
                return true;
            }
            _ => return false,
        }
        self.scroll_to_end();
        true
    }

    fn state(&self) -> Option<Value> {
        Some(json!({ "text": self.text }))
    }
}
