//! Drawing the layout into a terminal buffer.

use crossterm::event::Event;
use ratatui::prelude::{Direction, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};

use super::LayoutManager;
use crate::components::{BindingKind, ComponentContext, ComponentRegistry};
use crate::config::ItemType;
use crate::header::{Header, HeaderControl};
use crate::items::{ItemKey, ItemTree};
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

const EMPTY_TEXT: &str = "empty layout";

fn control_glyph(control: HeaderControl, maximised: bool) -> &'static str {
    match control {
        HeaderControl::TabDropdown => "▾",
        HeaderControl::Popout => "⧉",
        HeaderControl::Maximise if maximised => "▭",
        HeaderControl::Maximise => "▣",
        HeaderControl::Close => "✕",
    }
}

fn fill(frame: &mut UiFrame<'_>, rect: Rect, style: Style) {
    frame.render_widget(Block::default().style(style), rect);
}

impl LayoutManager<ComponentRegistry> {
    /// Draw every visible item, then whatever interaction is in progress.
    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        if !self.initialised {
            return;
        }
        let area = self.area.intersection(frame.area());
        if self.tree.is_empty() {
            let x = area.x + area.width.saturating_sub(EMPTY_TEXT.len() as u16) / 2;
            let y = area.y + area.height / 2;
            let style = Style::default().fg(theme::empty_fg());
            safe_set_string(frame.buffer_mut(), area, x, y, EMPTY_TEXT, style);
        }

        for stack in self.tree.stacks() {
            if Some(stack) != self.maximised {
                self.render_stack(frame, stack);
            }
        }
        if self.maximised.is_none() {
            self.render_splitters(frame);
        }
        if let Some(stack) = self.maximised {
            frame.render_widget(Clear, area);
            self.render_stack(frame, stack);
        }
        self.render_dropdowns(frame);
        self.render_drag(frame);
    }

    fn render_stack(&mut self, frame: &mut UiFrame<'_>, stack: ItemKey) {
        let Some(state) = self.tree.get(stack).and_then(|i| i.stack()) else {
            return;
        };
        let header = state.header().clone();
        let maximised = self.maximised == Some(stack);
        render_header(frame, &self.tree, &header, maximised);

        let Some(active) = state.active() else {
            return;
        };
        let Some(item) = self.tree.get(active) else {
            return;
        };
        let Some(container) = item.component() else {
            return;
        };
        if !container.is_visible() {
            return;
        }
        let rect = item.rect();
        let ctx = ComponentContext::new(container.is_focused()).with_z_index(container.z_index());
        let Some(bound) = self.binder.get_mut(active) else {
            return;
        };
        if bound.kind == BindingKind::Virtual {
            return;
        }
        if bound.placement.is_none_or(|p| p.rect != rect) {
            bound.component.resize(rect, &ctx);
            bound.placement = Some(crate::items::Placement {
                rect,
                visible: true,
                z_index: ctx.z_index(),
            });
        }
        bound.component.render(frame, rect, &ctx);
    }

    fn render_splitters(&self, frame: &mut UiFrame<'_>) {
        let dragging = self.splitter_drag.as_ref().map(|d| d.hit());
        for key in self.tree.all_items() {
            let Some(item) = self.tree.get(key) else {
                continue;
            };
            let glyph = match item.item_type() {
                Some(ItemType::Row) => "│",
                Some(ItemType::Column) => "─",
                _ => continue,
            };
            for (index, rect) in item.splitters().iter().enumerate() {
                let active = dragging.as_ref().is_some_and(|hit| hit.container == key && hit.index == index);
                let color = if active {
                    theme::splitter_dragging()
                } else {
                    theme::splitter()
                };
                draw_glyphs(frame, *rect, glyph, Style::default().fg(color));
            }
        }
        if let Some(drag) = &self.splitter_drag {
            let glyph = match drag.hit().direction {
                Direction::Horizontal => "┃",
                Direction::Vertical => "━",
            };
            draw_glyphs(frame, drag.ghost(), glyph, Style::default().fg(theme::splitter_dragging()));
        }
    }

    fn render_dropdowns(&self, frame: &mut UiFrame<'_>) {
        let style = Style::default().bg(theme::dropdown_bg()).fg(theme::dropdown_fg());
        for stack in self.tree.stacks() {
            for (component, rect) in self.dropdown_entries(stack) {
                frame.render_widget(Clear, rect);
                fill(frame, rect, style);
                let title = self
                    .tree
                    .get(component)
                    .and_then(|i| i.component())
                    .map(|c| c.title().to_string())
                    .unwrap_or_default();
                let bounds = rect.intersection(frame.area());
                safe_set_string(frame.buffer_mut(), bounds, rect.x + 1, rect.y, &title, style);
            }
        }
    }

    fn render_drag(&self, frame: &mut UiFrame<'_>) {
        let Some(proxy) = &self.drag else {
            return;
        };
        if let Some(indicator) = proxy.indicator() {
            fill(frame, indicator, Style::default().bg(theme::drop_indicator()));
        }
        let rect = proxy.rect();
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(proxy.title().to_string())
            .style(Style::default().bg(theme::drag_proxy_bg()).fg(theme::drag_proxy_fg()));
        frame.render_widget(block, rect);
    }

    /// Hand a key event to the focused component. Returns whether it was used.
    pub fn forward_event(&mut self, event: &Event) -> bool {
        if !self.initialised || self.is_dragging() {
            return false;
        }
        let Some(focused) = self.focused else {
            return false;
        };
        let Some(container) = self.tree.get(focused).and_then(|i| i.component()) else {
            return false;
        };
        let ctx = ComponentContext::new(true).with_z_index(container.z_index());
        let Some(bound) = self.binder.get_mut(focused) else {
            return false;
        };
        let consumed = bound.component.handle_event(event, &ctx);
        if consumed
            && let Err(err) = self.bracket(|m| {
                m.tree.state_changed(focused);
                Ok(())
            })
        {
            tracing::warn!(item = ?focused, %err, "state change not delivered");
        }
        consumed
    }
}

fn render_header(frame: &mut UiFrame<'_>, tree: &ItemTree, header: &Header, maximised: bool) {
    let rect = header.rect();
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let base = Style::default().bg(theme::header_bg()).fg(theme::header_fg());
    fill(frame, rect, base);
    let bounds = rect.intersection(frame.area());
    let vertical = header.is_left_right();

    for tab in header.tabs().iter().filter(|t| !t.in_dropdown) {
        let Some(container) = tree.get(tab.component).and_then(|i| i.component()) else {
            continue;
        };
        let active = tree
            .parent(tab.component)
            .and_then(|stack| tree.active_component(stack))
            == Some(tab.component);
        let style = if active && container.is_focused() {
            Style::default()
                .bg(theme::tab_focused_bg())
                .fg(theme::tab_active_fg())
                .add_modifier(Modifier::BOLD)
        } else if active {
            Style::default().bg(theme::tab_active_bg()).fg(theme::tab_active_fg())
        } else {
            base
        };
        fill(frame, tab.rect.intersection(bounds), style);
        if vertical {
            for (offset, ch) in container.title().chars().enumerate() {
                let y = tab.rect.y + 1 + offset as u16;
                if y >= tab.rect.y + tab.rect.height {
                    break;
                }
                safe_set_string(frame.buffer_mut(), bounds, tab.rect.x, y, &ch.to_string(), style);
            }
        } else {
            let text_width = tab
                .rect
                .width
                .saturating_sub(tab.close_rect.map_or(0, |r| r.width))
                .saturating_sub(1);
            let title: String = container.title().chars().take(usize::from(text_width)).collect();
            safe_set_string(frame.buffer_mut(), bounds, tab.rect.x + 1, tab.rect.y, &title, style);
        }
        if let Some(close) = tab.close_rect {
            safe_set_string(frame.buffer_mut(), bounds, close.x, close.y, "×", style);
        }
    }

    let control_style = Style::default().bg(theme::header_bg()).fg(theme::control_fg());
    for (control, rect) in header.controls() {
        let glyph = control_glyph(*control, maximised);
        safe_set_string(frame.buffer_mut(), bounds, rect.x, rect.y, glyph, control_style);
    }
}

fn draw_glyphs(frame: &mut UiFrame<'_>, rect: Rect, glyph: &str, style: Style) {
    let bounds = frame.area();
    for y in rect.y..rect.y.saturating_add(rect.height) {
        for x in rect.x..rect.x.saturating_add(rect.width) {
            safe_set_string(frame.buffer_mut(), bounds, x, y, glyph, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{manager_with, registry, stack_of};
    use super::*;
    use crate::config::ResolvedItemConfig as C;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::buffer::Buffer;
    use serde_json::json;

    fn draw(manager: &mut LayoutManager) -> Buffer {
        let area = manager.area();
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        manager.render(&mut frame);
        buffer
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer.cell((x, y)).map_or(" ", |c| c.symbol()).to_string())
            .collect()
    }

    #[test]
    fn empty_layouts_say_so() {
        let mut manager = LayoutManager::new(registry());
        manager.init(Rect::new(0, 0, 30, 5)).unwrap();
        let buffer = draw(&mut manager);
        assert!(row_text(&buffer, 2).contains(EMPTY_TEXT));
    }

    #[test]
    fn headers_show_titles_and_controls() {
        let root = C::row().with_content(vec![
            C::stack().with_content(vec![C::component("a").with_title("alpha")]),
            stack_of(&["b"]),
        ]);
        let mut manager = manager_with(root, 41, 6);
        let buffer = draw(&mut manager);
        let header = row_text(&buffer, 0);
        assert!(header.contains("alpha"));
        assert!(header.contains("✕"));
        assert!(header.contains("▣"));
        assert!(row_text(&buffer, 3).contains("│"));
    }

    #[test]
    fn notes_render_their_text_inside_the_stack() {
        let note = C::component("note")
            .with_title("n")
            .with_state(json!({ "text": "hello there" }));
        let mut manager = manager_with(C::stack().with_content(vec![note]), 30, 5);
        let buffer = draw(&mut manager);
        assert!(row_text(&buffer, 1).contains("hello there"));
    }

    #[test]
    fn keys_reach_only_the_focused_component() {
        let note = C::component("note").with_state(json!({ "text": "" }));
        let mut manager = manager_with(C::stack().with_content(vec![note]), 30, 5);
        let key = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(!manager.forward_event(&key));
        let component = manager.tree().components()[0];
        manager.focus_component(component).unwrap();
        assert!(manager.forward_event(&key));
        let buffer = draw(&mut manager);
        assert!(row_text(&buffer, 1).starts_with('x'));
    }

    #[test]
    fn maximised_stacks_are_drawn_over_the_layout() {
        let root = C::row().with_content(vec![
            stack_of(&["a"]),
            C::stack().with_content(vec![C::component("b").with_title("wide")]),
        ]);
        let mut manager = manager_with(root, 41, 6);
        let stack = manager.tree().children(manager.tree().root().unwrap())[1];
        manager.maximise_stack(stack).unwrap();
        let buffer = draw(&mut manager);
        let header = row_text(&buffer, 0);
        assert!(header.starts_with(" wide"));
        assert!(header.contains("▭"));
        assert!(!row_text(&buffer, 3).contains("│"));
    }

    #[test]
    fn dragging_draws_the_proxy() {
        let mut manager = manager_with(C::row().with_content(vec![stack_of(&["a", "b"]), stack_of(&["c"])]), 40, 10);
        let b = manager.tree().components()[1];
        let stack = manager.tree().parent(b).unwrap();
        let rect = manager
            .tree()
            .get(stack)
            .unwrap()
            .stack()
            .unwrap()
            .header()
            .tab_rect(b)
            .unwrap();
        manager.pointer_down(rect.x, rect.y).unwrap();
        manager.pointer_move(30, 6).unwrap();
        let proxy = manager.drag_proxy().unwrap().rect();
        let buffer = draw(&mut manager);
        assert_eq!(buffer.cell((proxy.x, proxy.y)).unwrap().symbol(), "┌");
    }
}
