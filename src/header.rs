//! Stack headers: tabs, control buttons and the overflow dropdown.
//!
//! A header keeps its own tab order, which starts out matching the stack's
//! content order but can diverge when dropdown entries are promoted to the
//! front. Packing decides which tabs fit in the strip (overlapping them when
//! the allowance permits) and which spill into the dropdown; the active tab
//! always stays in the strip.

use ratatui::prelude::Rect;
use ratatui::text::Line;

use crate::config::HeaderSide;
use crate::items::ItemKey;

/// Columns of padding around a tab title.
const TAB_PADDING: u16 = 2;
/// Columns taken by a tab's close button.
const TAB_CLOSE_WIDTH: u16 = 2;

/// Measure a tab with the given title; terminal hosts measure display width.
pub type TabMeasure = fn(&str, bool) -> u16;

pub fn measure_tab(title: &str, closable: bool) -> u16 {
    let text = Line::from(title).width().min(usize::from(u16::MAX)) as u16;
    let close = if closable { TAB_CLOSE_WIDTH } else { 0 };
    text.saturating_add(TAB_PADDING).saturating_add(close)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderControl {
    TabDropdown,
    Popout,
    Maximise,
    Close,
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub component: ItemKey,
    pub rect: Rect,
    pub close_rect: Option<Rect>,
    pub in_dropdown: bool,
    /// Pixels this tab slides under its left neighbour.
    pub overlap: f64,
}

impl Tab {
    fn new(component: ItemKey) -> Self {
        Self {
            component,
            rect: Rect::default(),
            close_rect: None,
            in_dropdown: false,
            overlap: 0.0,
        }
    }
}

/// What a header needs to know about one of its tabs to lay it out.
#[derive(Debug, Clone)]
pub struct TabInfo {
    pub component: ItemKey,
    pub width: u16,
    pub closable: bool,
}

/// Inputs to `Header::layout` that come from the stack and layout config.
#[derive(Debug, Clone)]
pub struct HeaderParams {
    pub rect: Rect,
    pub side: Option<HeaderSide>,
    pub active: Option<ItemKey>,
    /// Controls that are enabled, in display order, excluding the dropdown.
    pub controls: Vec<HeaderControl>,
    pub show_dropdown_button: bool,
    pub control_width: u16,
    pub tab_control_offset: u16,
    pub tab_overlap_allowance: f64,
}

/// Result of packing tabs into a strip.
#[derive(Debug, Clone, PartialEq)]
pub struct TabPacking {
    pub in_dropdown: Vec<bool>,
    pub overlaps: Vec<f64>,
    pub dropdown_active: bool,
    pub last_visible: Option<usize>,
}

/// Pack tabs of `widths` into `available` pixels.
///
/// Tabs are accumulated left to right. While the running width (plus the
/// active tab when it lies further right) fits, tabs sit flush. Past that
/// point the excess is spread as overlap over the non-first, non-active
/// tabs as long as it stays under `allowance`; once it doesn't, every later
/// non-active tab moves to the dropdown. If the dropdown turns out to be
/// needed the packing is redone with `available_with_dropdown`, the room left
/// once the dropdown button is shown.
pub fn pack_tabs(
    widths: &[f64],
    active: usize,
    available: f64,
    available_with_dropdown: f64,
    allowance: f64,
) -> TabPacking {
    try_pack(widths, active, available, allowance, false).unwrap_or_else(|| {
        try_pack(widths, active, available_with_dropdown, allowance, true).unwrap_or(
            TabPacking {
                in_dropdown: vec![false; widths.len()],
                overlaps: vec![0.0; widths.len()],
                dropdown_active: true,
                last_visible: None,
            },
        )
    })
}

fn try_pack(
    widths: &[f64],
    active: usize,
    available: f64,
    allowance: f64,
    dropdown_active: bool,
) -> Option<TabPacking> {
    let count = widths.len();
    let mut packing = TabPacking {
        in_dropdown: vec![false; count],
        overlaps: vec![0.0; count],
        dropdown_active,
        last_visible: None,
    };
    let active_width = widths.get(active).copied().unwrap_or_default();
    let mut cumulative = 0.0;
    let mut allowance_exceeded = false;

    for i in 0..count {
        cumulative += widths[i];
        let visible_width = if active <= i {
            cumulative
        } else {
            cumulative + active_width
        };

        if visible_width > available {
            if !allowance_exceeded {
                let overlap = if active > 0 && active <= i {
                    (visible_width - available) / (i as f64 - 1.0)
                } else {
                    (visible_width - available) / i as f64
                };
                if overlap < allowance {
                    for j in 0..=i {
                        packing.overlaps[j] = if j != active && j != 0 { overlap } else { 0.0 };
                    }
                    packing.last_visible = Some(i);
                } else {
                    allowance_exceeded = true;
                }
            } else if i == active {
                packing.overlaps[i] = 0.0;
            }

            if allowance_exceeded && i != active {
                if !dropdown_active {
                    return None;
                }
                packing.in_dropdown[i] = true;
                packing.overlaps[i] = 0.0;
            }
        } else {
            packing.last_visible = Some(i);
            packing.overlaps[i] = 0.0;
        }
    }
    Some(packing)
}

#[derive(Debug, Clone, Default)]
pub struct Header {
    tabs: Vec<Tab>,
    dropdown_active: bool,
    dropdown_open: bool,
    last_visible: Option<usize>,
    rect: Rect,
    side: Option<HeaderSide>,
    controls: Vec<(HeaderControl, Rect)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_order(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.tabs.iter().map(|t| t.component)
    }

    pub fn has_tab(&self, component: ItemKey) -> bool {
        self.tabs.iter().any(|t| t.component == component)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn side(&self) -> Option<HeaderSide> {
        self.side
    }

    pub fn is_left_right(&self) -> bool {
        self.side.is_some_and(HeaderSide::is_left_right)
    }

    pub fn controls(&self) -> &[(HeaderControl, Rect)] {
        &self.controls
    }

    pub fn dropdown_active(&self) -> bool {
        self.dropdown_active
    }

    pub fn dropdown_open(&self) -> bool {
        self.dropdown_open && self.dropdown_active
    }

    pub fn last_visible_tab_index(&self) -> Option<usize> {
        self.last_visible
    }

    pub(crate) fn create_tab(&mut self, component: ItemKey, index: usize) {
        if self.has_tab(component) {
            return;
        }
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, Tab::new(component));
    }

    pub(crate) fn remove_tab(&mut self, component: ItemKey) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|t| t.component != component);
        if self.tabs.is_empty() {
            self.dropdown_open = false;
        }
        self.tabs.len() != before
    }

    /// Move a tab to the front of the strip so it stays visible.
    pub(crate) fn move_tab_to_front(&mut self, component: ItemKey) {
        if let Some(index) = self.tabs.iter().position(|t| t.component == component) {
            let tab = self.tabs.remove(index);
            self.tabs.insert(0, tab);
        }
    }

    pub(crate) fn set_dropdown_open(&mut self, open: bool) {
        self.dropdown_open = open && self.dropdown_active;
    }

    /// Tabs currently shown in the dropdown, in tab order.
    pub fn dropdown_tabs(&self) -> Vec<ItemKey> {
        self.tabs
            .iter()
            .filter(|t| t.in_dropdown)
            .map(|t| t.component)
            .collect()
    }

    /// Rects of the dropdown entries, one row each, hanging below the
    /// dropdown button.
    pub fn dropdown_entries(&self, widths: impl Fn(ItemKey) -> u16) -> Vec<(ItemKey, Rect)> {
        let Some(button) = self.control_rect(HeaderControl::TabDropdown) else {
            return Vec::new();
        };
        let entries = self.dropdown_tabs();
        let width = entries.iter().map(|k| widths(*k)).max().unwrap_or(0);
        let right = button.x.saturating_add(button.width);
        let x = right.saturating_sub(width);
        entries
            .into_iter()
            .enumerate()
            .map(|(row, key)| {
                let y = button
                    .y
                    .saturating_add(button.height)
                    .saturating_add(row as u16);
                (key, Rect::new(x, y, width, 1))
            })
            .collect()
    }

    pub fn control_rect(&self, control: HeaderControl) -> Option<Rect> {
        self.controls
            .iter()
            .find(|(c, _)| *c == control)
            .map(|(_, r)| *r)
    }

    pub fn tab_rect(&self, component: ItemKey) -> Option<Rect> {
        self.tabs
            .iter()
            .find(|t| t.component == component && !t.in_dropdown)
            .map(|t| t.rect)
    }

    /// Extent of the header along its strip axis.
    fn strip_len(&self, rect: Rect) -> u16 {
        if self.is_left_right() {
            rect.height
        } else {
            rect.width
        }
    }

    /// Lay out controls and tabs inside `params.rect`.
    ///
    /// `tabs` lists the stack's components with their measured widths; the
    /// header's own tab order decides placement.
    pub(crate) fn layout(&mut self, params: &HeaderParams, tabs: &[TabInfo]) {
        self.rect = params.rect;
        self.side = params.side;
        self.controls.clear();
        for tab in self.tabs.iter_mut() {
            tab.rect = Rect::default();
            tab.close_rect = None;
        }
        if params.side.is_none() || params.rect.width == 0 || params.rect.height == 0 {
            self.dropdown_active = false;
            self.last_visible = None;
            return;
        }

        let strip = f64::from(self.strip_len(params.rect));
        let controls_len = f64::from(params.control_width) * params.controls.len() as f64;
        let offset = f64::from(params.tab_control_offset);
        let available = (strip - controls_len - offset).max(0.0);
        let with_dropdown = if params.show_dropdown_button {
            (available - f64::from(params.control_width)).max(0.0)
        } else {
            available
        };

        let widths: Vec<f64> = self
            .tabs
            .iter()
            .map(|tab| {
                tabs.iter()
                    .find(|info| info.component == tab.component)
                    .map(|info| f64::from(info.width))
                    .unwrap_or_default()
            })
            .collect();
        let active = params
            .active
            .and_then(|a| self.tabs.iter().position(|t| t.component == a))
            .unwrap_or(0);

        let packing = if self.tabs.is_empty() {
            TabPacking {
                in_dropdown: Vec::new(),
                overlaps: Vec::new(),
                dropdown_active: false,
                last_visible: None,
            }
        } else {
            pack_tabs(
                &widths,
                active,
                available,
                with_dropdown,
                params.tab_overlap_allowance,
            )
        };
        self.dropdown_active = packing.dropdown_active;
        if !self.dropdown_active {
            self.dropdown_open = false;
        }
        self.last_visible = packing.last_visible;

        let mut buttons = Vec::with_capacity(params.controls.len() + 1);
        if self.dropdown_active && params.show_dropdown_button {
            buttons.push(HeaderControl::TabDropdown);
        }
        buttons.extend(params.controls.iter().copied());
        self.place_controls(params, &buttons);

        let mut cursor = 0.0f64;
        for (idx, tab) in self.tabs.iter_mut().enumerate() {
            tab.in_dropdown = packing.in_dropdown[idx];
            tab.overlap = packing.overlaps[idx];
            if tab.in_dropdown {
                continue;
            }
            cursor = (cursor - tab.overlap).max(0.0);
            let start = cursor.round().clamp(0.0, strip) as u16;
            let len = (widths[idx].round() as u16).min(strip as u16 - start);
            cursor += widths[idx];
            let closable = tabs
                .iter()
                .any(|info| info.component == tab.component && info.closable);
            let (rect, close) = strip_rect(params.rect, self.side, start, len, closable);
            tab.rect = rect;
            tab.close_rect = close;
        }
    }

    fn place_controls(&mut self, params: &HeaderParams, buttons: &[HeaderControl]) {
        let strip = self.strip_len(params.rect);
        let total = (params.control_width as usize * buttons.len()).min(usize::from(strip)) as u16;
        let mut start = strip - total;
        for control in buttons {
            let len = params.control_width.min(strip - start);
            let (rect, _) = strip_rect(params.rect, self.side, start, len, false);
            self.controls.push((*control, rect));
            start = start.saturating_add(len);
        }
    }

    /// Where a tab dragged over the header at strip coordinate `pos` would be
    /// inserted. `None` when the pointer is before the first tab.
    pub fn drop_index(&self, pos: f64) -> Option<usize> {
        let visible: Vec<&Tab> = self.tabs.iter().filter(|t| !t.in_dropdown).collect();
        if visible.is_empty() {
            return Some(0);
        }
        let left_right = self.is_left_right();
        let span = |tab: &Tab| {
            if left_right {
                (f64::from(tab.rect.y), f64::from(tab.rect.height))
            } else {
                (f64::from(tab.rect.x), f64::from(tab.rect.width))
            }
        };

        let mut index = 0;
        let mut above_tab = false;
        let (mut tab_start, mut tab_len) = span(visible[0]);
        while index < visible.len() {
            (tab_start, tab_len) = span(visible[index]);
            if pos >= tab_start && pos < tab_start + tab_len {
                above_tab = true;
                break;
            }
            index += 1;
        }
        if !above_tab && pos < tab_start {
            return None;
        }
        let half = tab_start + tab_len / 2.0;
        if pos < half {
            Some(index)
        } else {
            Some((index + 1).min(visible.len()))
        }
    }

    /// Rect of the insertion marker shown for a header drop at `index`.
    pub fn drop_indicator(&self, index: usize) -> Rect {
        let visible: Vec<&Tab> = self.tabs.iter().filter(|t| !t.in_dropdown).collect();
        let start = match visible.get(index) {
            Some(tab) if self.is_left_right() => tab.rect.y.saturating_sub(self.rect.y),
            Some(tab) => tab.rect.x.saturating_sub(self.rect.x),
            None => match visible.last() {
                Some(tab) if self.is_left_right() => {
                    (tab.rect.y + tab.rect.height).saturating_sub(self.rect.y)
                }
                Some(tab) => (tab.rect.x + tab.rect.width).saturating_sub(self.rect.x),
                None => 0,
            },
        };
        let start = start.min(self.strip_len(self.rect).saturating_sub(1));
        strip_rect(self.rect, self.side, start, 1, false).0
    }
}

/// Rect covering `[start, start + len)` along the header strip, plus the
/// close-button rect at its far end when `closable`.
fn strip_rect(
    header: Rect,
    side: Option<HeaderSide>,
    start: u16,
    len: u16,
    closable: bool,
) -> (Rect, Option<Rect>) {
    let left_right = side.is_some_and(HeaderSide::is_left_right);
    let close_len = if closable && len > TAB_CLOSE_WIDTH {
        TAB_CLOSE_WIDTH
    } else {
        0
    };
    if left_right {
        let rect = Rect::new(header.x, header.y.saturating_add(start), header.width, len);
        let close = (close_len > 0).then(|| {
            Rect::new(
                header.x,
                rect.y + len - close_len,
                header.width,
                close_len,
            )
        });
        (rect, close)
    } else {
        let rect = Rect::new(header.x.saturating_add(start), header.y, len, header.height);
        let close = (close_len > 0).then(|| {
            Rect::new(
                rect.x + len - close_len,
                header.y,
                close_len,
                header.height,
            )
        });
        (rect, close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<ItemKey> {
        let mut map: SlotMap<ItemKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn params(width: u16, active: ItemKey) -> HeaderParams {
        HeaderParams {
            rect: Rect::new(0, 0, width, 1),
            side: Some(HeaderSide::Top),
            active: Some(active),
            controls: vec![HeaderControl::Close],
            show_dropdown_button: true,
            control_width: 2,
            tab_control_offset: 0,
            tab_overlap_allowance: 0.0,
        }
    }

    #[test]
    fn measures_display_width_with_padding() {
        assert_eq!(measure_tab("abc", false), 5);
        assert_eq!(measure_tab("abc", true), 7);
        assert_eq!(measure_tab("日本", false), 6);
    }

    #[test]
    fn tabs_that_fit_sit_flush() {
        let packing = pack_tabs(&[10.0, 10.0, 10.0], 0, 40.0, 38.0, 0.0);
        assert!(!packing.dropdown_active);
        assert_eq!(packing.in_dropdown, vec![false; 3]);
        assert_eq!(packing.last_visible, Some(2));
    }

    #[test]
    fn overflow_spills_into_the_dropdown_but_keeps_the_active_tab() {
        let widths = [10.0; 6];
        let packing = pack_tabs(&widths, 5, 35.0, 30.0, 0.0);
        assert!(packing.dropdown_active);
        assert!(!packing.in_dropdown[5], "active tab must stay visible");
        assert!(!packing.in_dropdown[0]);
        assert!(packing.in_dropdown[4]);
        let visible = packing.in_dropdown.iter().filter(|d| !**d).count();
        assert!(visible < 6);
    }

    #[test]
    fn small_overflow_is_absorbed_by_overlap() {
        // three tabs of 10 in 27 pixels: 3 pixels spread over two tabs
        let packing = pack_tabs(&[10.0, 10.0, 10.0], 0, 27.0, 25.0, 5.0);
        assert!(!packing.dropdown_active);
        assert_eq!(packing.overlaps, vec![0.0, 1.5, 1.5]);
        assert_eq!(packing.last_visible, Some(2));
    }

    #[test]
    fn overlap_skips_the_active_tab() {
        let packing = pack_tabs(&[10.0, 10.0, 10.0], 1, 27.0, 25.0, 5.0);
        assert!(!packing.dropdown_active);
        assert_eq!(packing.overlaps[0], 0.0);
        assert_eq!(packing.overlaps[1], 0.0);
        assert_eq!(packing.overlaps[2], 3.0);
    }

    #[test]
    fn header_layout_places_tabs_and_controls() {
        let k = keys(2);
        let mut header = Header::new();
        header.create_tab(k[0], 0);
        header.create_tab(k[1], 1);
        let infos = vec![
            TabInfo { component: k[0], width: 5, closable: false },
            TabInfo { component: k[1], width: 5, closable: true },
        ];
        header.layout(&params(20, k[0]), &infos);
        assert_eq!(header.tab_rect(k[0]), Some(Rect::new(0, 0, 5, 1)));
        assert_eq!(header.tab_rect(k[1]), Some(Rect::new(5, 0, 5, 1)));
        assert_eq!(header.tabs()[1].close_rect, Some(Rect::new(8, 0, 2, 1)));
        assert_eq!(
            header.control_rect(HeaderControl::Close),
            Some(Rect::new(18, 0, 2, 1))
        );
        assert!(header.control_rect(HeaderControl::TabDropdown).is_none());
    }

    #[test]
    fn narrow_header_shows_the_dropdown_button() {
        let k = keys(6);
        let mut header = Header::new();
        let mut infos = Vec::new();
        for (i, key) in k.iter().enumerate() {
            header.create_tab(*key, i);
            infos.push(TabInfo { component: *key, width: 6, closable: false });
        }
        header.layout(&params(20, k[3]), &infos);
        assert!(header.dropdown_active());
        assert!(header.control_rect(HeaderControl::TabDropdown).is_some());
        assert!(header.tab_rect(k[3]).is_some());
        assert!(!header.dropdown_tabs().contains(&k[3]));
        assert!(header.dropdown_tabs().contains(&k[5]));

        header.move_tab_to_front(k[5]);
        assert_eq!(header.tab_order().next(), Some(k[5]));
    }

    #[test]
    fn drop_index_follows_tab_midpoints() {
        let k = keys(2);
        let mut header = Header::new();
        header.create_tab(k[0], 0);
        header.create_tab(k[1], 1);
        let infos = vec![
            TabInfo { component: k[0], width: 10, closable: false },
            TabInfo { component: k[1], width: 10, closable: false },
        ];
        let mut p = params(40, k[0]);
        p.rect = Rect::new(5, 0, 40, 1);
        header.layout(&p, &infos);
        assert_eq!(header.drop_index(4.0), None);
        assert_eq!(header.drop_index(6.0), Some(0));
        assert_eq!(header.drop_index(12.0), Some(1));
        assert_eq!(header.drop_index(16.0), Some(1));
        assert_eq!(header.drop_index(23.0), Some(2));
        assert_eq!(header.drop_index(35.0), Some(2));
    }

    #[test]
    fn empty_header_accepts_drops_at_zero() {
        let header = Header::new();
        assert_eq!(header.drop_index(3.0), Some(0));
    }
}
