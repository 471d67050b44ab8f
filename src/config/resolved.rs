//! Fully defaulted configuration the engine operates on.
//!
//! Everything here serializes to the same camelCase shape the input format
//! uses, so a saved layout can be fed straight back into `LayoutConfig`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_DOCK_EDGE_SIZE, DEFAULT_POPOUT_HEIGHT, DEFAULT_POPOUT_WIDTH};
use crate::error::ConfigError;

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}

fn yes() -> bool {
    true
}

/// Which edge of a stack its header sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderSide {
    Top,
    Left,
    Right,
    Bottom,
}

impl HeaderSide {
    pub fn is_left_right(self) -> bool {
        matches!(self, HeaderSide::Left | HeaderSide::Right)
    }
}

/// `header.show`: `false` hides the header, `true` or a side shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderShow {
    Flag(bool),
    Side(HeaderSide),
}

impl HeaderShow {
    pub fn side(self) -> Option<HeaderSide> {
        match self {
            HeaderShow::Flag(true) => Some(HeaderSide::Top),
            HeaderShow::Flag(false) => None,
            HeaderShow::Side(side) => Some(side),
        }
    }
}

/// A header button label; `false` hides the button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Shown(bool),
}

impl Label {
    pub fn text(&self) -> Option<&str> {
        match self {
            Label::Text(text) => Some(text),
            Label::Shown(_) => None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Label::Shown(false))
    }

    /// Replace a bare `true` with the default text.
    fn or_default_text(self, default: &str) -> Label {
        match self {
            Label::Shown(true) => Label::Text(default.to_string()),
            other => other,
        }
    }
}

/// Per-stack or per-component header settings. Unset fields fall back to the
/// layout-wide header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<HeaderShow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popout: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dock: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximise: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimise: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_dropdown: Option<Label>,
}

impl HeaderOverrides {
    pub fn is_empty(&self) -> bool {
        *self == HeaderOverrides::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderConfig {
    pub show: HeaderShow,
    pub popout: Label,
    pub dock: Label,
    pub maximise: Label,
    pub minimise: Label,
    pub close: Label,
    pub tab_dropdown: Label,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            show: HeaderShow::Side(HeaderSide::Top),
            popout: Label::Text("open in new window".into()),
            dock: Label::Text("dock".into()),
            maximise: Label::Text("maximise".into()),
            minimise: Label::Text("minimise".into()),
            close: Label::Text("close".into()),
            tab_dropdown: Label::Text("additional tabs".into()),
        }
    }
}

impl HeaderConfig {
    /// Layer `overrides` over this config.
    pub fn merged(&self, overrides: &HeaderOverrides) -> HeaderConfig {
        let defaults = HeaderConfig::default();
        let pick = |own: &Option<Label>, base: &Label, default: &Label| {
            own.clone()
                .unwrap_or_else(|| base.clone())
                .or_default_text(default.text().unwrap_or_default())
        };
        HeaderConfig {
            show: overrides.show.unwrap_or(self.show),
            popout: pick(&overrides.popout, &self.popout, &defaults.popout),
            dock: pick(&overrides.dock, &self.dock, &defaults.dock),
            maximise: pick(&overrides.maximise, &self.maximise, &defaults.maximise),
            minimise: pick(&overrides.minimise, &self.minimise, &defaults.minimise),
            close: pick(&overrides.close, &self.close, &defaults.close),
            tab_dropdown: pick(
                &overrides.tab_dropdown,
                &self.tab_dropdown,
                &defaults.tab_dropdown,
            ),
        }
    }

    pub fn side(&self) -> Option<HeaderSide> {
        self.show.side()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsiveMode {
    #[default]
    None,
    Always,
    Onload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub constrain_drag_to_container: bool,
    pub reorder_enabled: bool,
    pub popout_whole_stack: bool,
    pub blocked_popouts_throw_error: bool,
    pub close_popouts_on_unload: bool,
    pub responsive_mode: ResponsiveMode,
    pub tab_overlap_allowance: f64,
    pub reorder_on_tab_menu_click: bool,
    pub tab_control_offset: u16,
    pub pop_in_on_close: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            constrain_drag_to_container: true,
            reorder_enabled: true,
            popout_whole_stack: false,
            blocked_popouts_throw_error: true,
            close_popouts_on_unload: true,
            responsive_mode: ResponsiveMode::None,
            tab_overlap_allowance: 0.0,
            reorder_on_tab_menu_click: true,
            tab_control_offset: 10,
            pop_in_on_close: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub border_width: u16,
    pub border_grab_width: u16,
    pub min_item_height: u16,
    pub min_item_width: u16,
    pub header_height: u16,
    pub drag_proxy_width: u16,
    pub drag_proxy_height: u16,
    pub dock_edge_size: u16,
    pub control_button_width: u16,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            border_width: 5,
            border_grab_width: 5,
            min_item_height: 10,
            min_item_width: 10,
            header_height: 20,
            drag_proxy_width: 300,
            drag_proxy_height: 200,
            dock_edge_size: DEFAULT_DOCK_EDGE_SIZE,
            control_button_width: 18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Row,
    Column,
    Stack,
    Component,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Row => "row",
            ItemType::Column => "column",
            ItemType::Stack => "stack",
            ItemType::Component => "component",
        }
    }

    pub fn is_row_or_column(self) -> bool {
        matches!(self, ItemType::Row | ItemType::Column)
    }
}

/// A resolved content item.
///
/// Sizes stay optional: an unset width or height is an input to size
/// distribution, not an error. Stack- and component-only fields are `None`
/// or default on other item types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItemConfig {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ResolvedItemConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u16>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default = "yes")]
    pub is_closable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_item_index: Option<usize>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub maximised: bool,
    #[serde(default, skip_serializing_if = "HeaderOverrides::is_empty")]
    pub header: HeaderOverrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_state: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub reorder_enabled: bool,
}

impl ResolvedItemConfig {
    fn bare(item_type: ItemType) -> Self {
        Self {
            item_type,
            content: Vec::new(),
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            id: String::new(),
            is_closable: true,
            active_item_index: None,
            maximised: false,
            header: HeaderOverrides::default(),
            component_type: None,
            component_state: None,
            title: String::new(),
            reorder_enabled: true,
        }
    }

    pub fn row() -> Self {
        Self::bare(ItemType::Row)
    }

    pub fn column() -> Self {
        Self::bare(ItemType::Column)
    }

    pub fn stack() -> Self {
        let mut config = Self::bare(ItemType::Stack);
        config.active_item_index = Some(0);
        config
    }

    pub fn component(component_type: impl Into<String>) -> Self {
        let component_type = component_type.into();
        let mut config = Self::bare(ItemType::Component);
        config.title = component_type.clone();
        config.component_type = Some(component_type);
        config
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.component_state = Some(state);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_content(mut self, content: Vec<ResolvedItemConfig>) -> Self {
        self.content = content;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Check the guarantees `ItemConfig::resolve` gives, for configs built in
    /// code or received from another window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.item_type {
            ItemType::Stack => {
                if let Some(child) = self
                    .content
                    .iter()
                    .find(|c| c.item_type != ItemType::Component)
                {
                    return Err(ConfigError::StackChildNotComponent(
                        child.item_type.as_str().to_string(),
                    ));
                }
                if let Some(index) = self.active_item_index
                    && index > 0
                    && index >= self.content.len()
                {
                    return Err(ConfigError::ActiveItemIndexOutOfRange {
                        index,
                        len: self.content.len(),
                    });
                }
            }
            ItemType::Component => {
                if !self.content.is_empty() {
                    return Err(ConfigError::ComponentHasContent);
                }
                if self.component_type.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::MissingComponentType);
                }
            }
            ItemType::Row | ItemType::Column => {}
        }
        self.content.iter().try_for_each(ResolvedItemConfig::validate)
    }

    /// Every component config in this subtree, in document order.
    pub fn components(&self) -> Vec<&ResolvedItemConfig> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(config) = pending.pop() {
            if config.item_type == ItemType::Component {
                out.push(config);
            }
            pending.extend(config.content.iter().rev());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopoutWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u16>,
}

/// Window geometry with every field filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub left: i32,
    pub top: i32,
    pub width: u16,
    pub height: u16,
}

impl PopoutWindow {
    pub fn geometry(&self) -> WindowGeometry {
        WindowGeometry {
            left: self.left.unwrap_or(20),
            top: self.top.unwrap_or(20),
            width: self.width.unwrap_or(DEFAULT_POPOUT_WIDTH),
            height: self.height.unwrap_or(DEFAULT_POPOUT_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPopoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ResolvedItemConfig>,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_in_parent: Option<usize>,
    #[serde(default)]
    pub window: PopoutWindow,
}

impl ResolvedPopoutConfig {
    pub fn layout(&self) -> ResolvedLayoutConfig {
        ResolvedLayoutConfig {
            root: self.root.clone(),
            open_popouts: Vec::new(),
            dimensions: self.dimensions,
            settings: self.settings.clone(),
            header: self.header.clone(),
            resolved: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLayoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ResolvedItemConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub open_popouts: Vec<ResolvedPopoutConfig>,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default = "yes")]
    pub resolved: bool,
}

impl Default for ResolvedLayoutConfig {
    fn default() -> Self {
        Self {
            root: None,
            open_popouts: Vec::new(),
            dimensions: Dimensions::default(),
            settings: Settings::default(),
            header: HeaderConfig::default(),
            resolved: true,
        }
    }
}

impl ResolvedLayoutConfig {
    /// Check the root and the root of every stored pop-out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.root
            .iter()
            .chain(self.open_popouts.iter().filter_map(|p| p.root.as_ref()))
            .try_for_each(ResolvedItemConfig::validate)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_overrides_fall_back_to_the_layout_header() {
        let base = HeaderConfig {
            close: Label::Shown(false),
            ..HeaderConfig::default()
        };
        let overrides = HeaderOverrides {
            show: Some(HeaderShow::Side(HeaderSide::Left)),
            maximise: Some(Label::Shown(true)),
            ..HeaderOverrides::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.side(), Some(HeaderSide::Left));
        assert!(merged.close.is_hidden());
        assert_eq!(merged.maximise.text(), Some("maximise"));
        assert_eq!(merged.popout.text(), Some("open in new window"));
    }

    #[test]
    fn header_show_flag_maps_to_top() {
        assert_eq!(HeaderShow::Flag(true).side(), Some(HeaderSide::Top));
        assert_eq!(HeaderShow::Flag(false).side(), None);
    }

    #[test]
    fn component_config_skips_defaults_when_serialized() {
        let config = ResolvedItemConfig::component("note").with_width(40.0);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "component");
        assert_eq!(json["componentType"], "note");
        assert_eq!(json["title"], "note");
        assert_eq!(json["width"], 40.0);
        assert!(json.get("reorderEnabled").is_none());
        assert!(json.get("content").is_none());
    }

    #[test]
    fn components_are_listed_in_document_order() {
        let tree = ResolvedItemConfig::row().with_content(vec![
            ResolvedItemConfig::stack().with_content(vec![
                ResolvedItemConfig::component("a"),
                ResolvedItemConfig::component("b"),
            ]),
            ResolvedItemConfig::component("c"),
        ]);
        let types: Vec<_> = tree
            .components()
            .iter()
            .filter_map(|c| c.component_type.clone())
            .collect();
        assert_eq!(types, vec!["a", "b", "c"]);
    }

    #[test]
    fn validation_catches_configs_built_in_code() {
        let nested = ResolvedItemConfig::stack().with_content(vec![ResolvedItemConfig::row()]);
        assert!(matches!(
            nested.validate(),
            Err(ConfigError::StackChildNotComponent(_))
        ));
        let mut untyped = ResolvedItemConfig::component("x");
        untyped.component_type = None;
        let row = ResolvedItemConfig::row().with_content(vec![untyped]);
        assert!(matches!(row.validate(), Err(ConfigError::MissingComponentType)));
        let mut stack = ResolvedItemConfig::stack()
            .with_content(vec![ResolvedItemConfig::component("a")]);
        assert!(stack.validate().is_ok());
        stack.active_item_index = Some(1);
        assert!(stack.validate().is_err());
    }
}
