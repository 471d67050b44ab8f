//! Layout configuration: the loosely typed input format and its resolution
//! into `ResolvedLayoutConfig`.
//!
//! Input is accepted in the current shape (`root`) and the legacy shape
//! (`content` array, `labels`, `settings.hasHeaders`, `show*Icon` flags).
//! Resolution never touches a live tree; callers swap the result in only
//! once it succeeded.

pub mod minify;
pub mod resolved;

pub use resolved::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemConfig {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<ItemConfig>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub min_width: Option<u16>,
    #[serde(default)]
    pub min_height: Option<u16>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub is_closable: Option<bool>,
    #[serde(default)]
    pub active_item_index: Option<usize>,
    #[serde(default)]
    pub maximised: Option<bool>,
    #[serde(default)]
    pub header: Option<HeaderOverrides>,
    #[serde(default, alias = "componentName")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub component_state: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub reorder_enabled: Option<bool>,
}

impl ItemConfig {
    pub fn component(component_type: impl Into<String>) -> Self {
        Self {
            item_type: "component".into(),
            component_type: Some(component_type.into()),
            ..Self::default()
        }
    }

    pub fn of_type(item_type: ItemType, content: Vec<ItemConfig>) -> Self {
        Self {
            item_type: item_type.as_str().into(),
            content,
            ..Self::default()
        }
    }

    fn parse_type(&self) -> Result<ItemType, ConfigError> {
        match self.item_type.as_str() {
            "row" => Ok(ItemType::Row),
            "column" => Ok(ItemType::Column),
            "stack" => Ok(ItemType::Stack),
            "component" | "react-component" => Ok(ItemType::Component),
            other => Err(ConfigError::InvalidItemType(other.to_string())),
        }
    }

    pub fn resolve(&self) -> Result<ResolvedItemConfig, ConfigError> {
        let item_type = self.parse_type()?;
        let content = self
            .content
            .iter()
            .map(ItemConfig::resolve)
            .collect::<Result<Vec<_>, _>>()?;

        let mut resolved = match item_type {
            ItemType::Row => ResolvedItemConfig::row(),
            ItemType::Column => ResolvedItemConfig::column(),
            ItemType::Stack => {
                if let Some(child) = content.iter().find(|c| c.item_type != ItemType::Component) {
                    return Err(ConfigError::StackChildNotComponent(
                        child.item_type.as_str().to_string(),
                    ));
                }
                let index = self.active_item_index.unwrap_or(0);
                if index > 0 && index >= content.len() {
                    return Err(ConfigError::ActiveItemIndexOutOfRange {
                        index,
                        len: content.len(),
                    });
                }
                let mut stack = ResolvedItemConfig::stack();
                stack.active_item_index = Some(index);
                stack.maximised = self.maximised.unwrap_or(false);
                stack
            }
            ItemType::Component => {
                if !content.is_empty() {
                    return Err(ConfigError::ComponentHasContent);
                }
                let component_type = self
                    .component_type
                    .clone()
                    .filter(|t| !t.is_empty())
                    .ok_or(ConfigError::MissingComponentType)?;
                let mut component = ResolvedItemConfig::component(component_type);
                if let Some(title) = &self.title {
                    component.title = title.clone();
                }
                component.component_state = self.component_state.clone();
                component.reorder_enabled = self.reorder_enabled.unwrap_or(true);
                // components dropped straight into a row carry the maximise flag to their stack
                component.maximised = self.maximised.unwrap_or(false);
                component
            }
        };

        resolved.content = content;
        resolved.width = self.width;
        resolved.height = self.height;
        resolved.min_width = self.min_width;
        resolved.min_height = self.min_height;
        resolved.id = self.id.clone().unwrap_or_default();
        resolved.is_closable = self.is_closable.unwrap_or(true);
        if matches!(item_type, ItemType::Stack | ItemType::Component) {
            resolved.header = self.header.clone().unwrap_or_default();
        }
        Ok(resolved)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub constrain_drag_to_container: Option<bool>,
    pub reorder_enabled: Option<bool>,
    pub popout_whole_stack: Option<bool>,
    pub blocked_popouts_throw_error: Option<bool>,
    pub close_popouts_on_unload: Option<bool>,
    pub responsive_mode: Option<ResponsiveMode>,
    pub tab_overlap_allowance: Option<f64>,
    pub reorder_on_tab_menu_click: Option<bool>,
    pub tab_control_offset: Option<u16>,
    pub pop_in_on_close: Option<bool>,
    // legacy header switches
    pub has_headers: Option<bool>,
    pub show_popout_icon: Option<bool>,
    pub show_maximise_icon: Option<bool>,
    pub show_close_icon: Option<bool>,
}

impl SettingsInput {
    fn resolve(&self) -> Settings {
        let d = Settings::default();
        Settings {
            constrain_drag_to_container: self
                .constrain_drag_to_container
                .unwrap_or(d.constrain_drag_to_container),
            reorder_enabled: self.reorder_enabled.unwrap_or(d.reorder_enabled),
            popout_whole_stack: self.popout_whole_stack.unwrap_or(d.popout_whole_stack),
            blocked_popouts_throw_error: self
                .blocked_popouts_throw_error
                .unwrap_or(d.blocked_popouts_throw_error),
            close_popouts_on_unload: self
                .close_popouts_on_unload
                .unwrap_or(d.close_popouts_on_unload),
            responsive_mode: self.responsive_mode.unwrap_or(d.responsive_mode),
            tab_overlap_allowance: self.tab_overlap_allowance.unwrap_or(d.tab_overlap_allowance),
            reorder_on_tab_menu_click: self
                .reorder_on_tab_menu_click
                .unwrap_or(d.reorder_on_tab_menu_click),
            tab_control_offset: self.tab_control_offset.unwrap_or(d.tab_control_offset),
            pop_in_on_close: self.pop_in_on_close.unwrap_or(d.pop_in_on_close),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionsInput {
    pub border_width: Option<u16>,
    pub border_grab_width: Option<u16>,
    pub min_item_height: Option<u16>,
    pub min_item_width: Option<u16>,
    pub header_height: Option<u16>,
    pub drag_proxy_width: Option<u16>,
    pub drag_proxy_height: Option<u16>,
    pub dock_edge_size: Option<u16>,
    pub control_button_width: Option<u16>,
}

impl DimensionsInput {
    fn resolve(&self) -> Dimensions {
        let d = Dimensions::default();
        Dimensions {
            border_width: self.border_width.unwrap_or(d.border_width),
            border_grab_width: self.border_grab_width.unwrap_or(d.border_grab_width),
            min_item_height: self.min_item_height.unwrap_or(d.min_item_height),
            min_item_width: self.min_item_width.unwrap_or(d.min_item_width),
            header_height: self.header_height.unwrap_or(d.header_height),
            drag_proxy_width: self.drag_proxy_width.unwrap_or(d.drag_proxy_width),
            drag_proxy_height: self.drag_proxy_height.unwrap_or(d.drag_proxy_height),
            dock_edge_size: self.dock_edge_size.unwrap_or(d.dock_edge_size),
            control_button_width: self.control_button_width.unwrap_or(d.control_button_width),
        }
    }
}

/// Pre-`header` label block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLabels {
    pub close: Option<String>,
    pub maximise: Option<String>,
    pub minimise: Option<String>,
    pub popout: Option<String>,
    pub popin: Option<String>,
    pub tab_dropdown: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    #[serde(default)]
    pub root: Option<ItemConfig>,
    #[serde(default)]
    pub content: Option<Vec<ItemConfig>>,
    #[serde(default)]
    pub open_popouts: Vec<PopoutLayoutConfig>,
    #[serde(default)]
    pub dimensions: Option<DimensionsInput>,
    #[serde(default)]
    pub settings: Option<SettingsInput>,
    #[serde(default)]
    pub header: Option<HeaderOverrides>,
    #[serde(default)]
    pub labels: Option<LegacyLabels>,
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_root(root: ItemConfig) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    pub fn resolve(&self) -> Result<ResolvedLayoutConfig, ConfigError> {
        let root = resolve_root(self.root.as_ref(), self.content.as_deref())?;
        let settings_input = self.settings.clone().unwrap_or_default();
        let settings = settings_input.resolve();
        let dimensions = self.dimensions.unwrap_or_default().resolve();
        let header = resolve_header(
            self.header.as_ref(),
            self.labels.as_ref(),
            &settings_input,
        );
        let open_popouts = self
            .open_popouts
            .iter()
            .map(PopoutLayoutConfig::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResolvedLayoutConfig {
            root,
            open_popouts,
            dimensions,
            settings,
            header,
            resolved: true,
        })
    }
}

impl From<&ResolvedLayoutConfig> for LayoutConfig {
    fn from(resolved: &ResolvedLayoutConfig) -> Self {
        // the resolved shape is a superset of the input shape
        serde_json::to_value(resolved)
            .and_then(serde_json::from_value)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopoutLayoutConfig {
    #[serde(default)]
    pub root: Option<ItemConfig>,
    #[serde(default)]
    pub content: Option<Vec<ItemConfig>>,
    #[serde(default)]
    pub dimensions: Option<DimensionsInput>,
    #[serde(default)]
    pub settings: Option<SettingsInput>,
    #[serde(default)]
    pub header: Option<HeaderOverrides>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub index_in_parent: Option<usize>,
    #[serde(default)]
    pub window: PopoutWindow,
}

impl PopoutLayoutConfig {
    pub fn resolve(&self) -> Result<ResolvedPopoutConfig, ConfigError> {
        let settings_input = self.settings.clone().unwrap_or_default();
        Ok(ResolvedPopoutConfig {
            root: resolve_root(self.root.as_ref(), self.content.as_deref())?,
            dimensions: self.dimensions.unwrap_or_default().resolve(),
            settings: settings_input.resolve(),
            header: resolve_header(self.header.as_ref(), None, &settings_input),
            parent_id: self.parent_id.clone(),
            index_in_parent: self.index_in_parent,
            window: self.window,
        })
    }
}

fn resolve_root(
    root: Option<&ItemConfig>,
    legacy: Option<&[ItemConfig]>,
) -> Result<Option<ResolvedItemConfig>, ConfigError> {
    match (root, legacy) {
        (Some(_), Some(content)) if !content.is_empty() => Err(ConfigError::RootAndContent),
        (Some(root), _) => root.resolve().map(Some),
        (None, Some(content)) => match content {
            [] => Ok(None),
            [root] => root.resolve().map(Some),
            many => Err(ConfigError::TooManyRootItems(many.len())),
        },
        (None, None) => Ok(None),
    }
}

fn resolve_header(
    header: Option<&HeaderOverrides>,
    labels: Option<&LegacyLabels>,
    settings: &SettingsInput,
) -> HeaderConfig {
    let mut overrides = HeaderOverrides::default();
    if let Some(labels) = labels {
        let text = |l: &Option<String>| l.clone().map(Label::Text);
        overrides.close = text(&labels.close);
        overrides.maximise = text(&labels.maximise);
        overrides.minimise = text(&labels.minimise);
        overrides.popout = text(&labels.popout);
        overrides.tab_dropdown = text(&labels.tab_dropdown);
    }
    if settings.has_headers == Some(false) {
        overrides.show = Some(HeaderShow::Flag(false));
    }
    if settings.show_popout_icon == Some(false) {
        overrides.popout = Some(Label::Shown(false));
    }
    if settings.show_maximise_icon == Some(false) {
        overrides.maximise = Some(Label::Shown(false));
    }
    if settings.show_close_icon == Some(false) {
        overrides.close = Some(Label::Shown(false));
    }
    let legacy = HeaderConfig::default().merged(&overrides);
    match header {
        Some(header) => legacy.merged(header),
        None => legacy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn resolves_defaults_throughout_the_tree() {
        let config = LayoutConfig::from_json(indoc! {r#"
            {
              "root": {
                "type": "row",
                "content": [
                  { "type": "component", "componentType": "editor", "width": 70 },
                  {
                    "type": "stack",
                    "activeItemIndex": 1,
                    "content": [
                      { "type": "component", "componentType": "log", "title": "Log" },
                      { "type": "component", "componentName": "terminal" }
                    ]
                  }
                ]
              },
              "dimensions": { "headerHeight": 1 }
            }
        "#})
        .unwrap();
        let resolved = config.resolve().unwrap();
        let root = resolved.root.unwrap();
        assert_eq!(root.item_type, ItemType::Row);
        assert_eq!(root.content[0].title, "editor");
        assert_eq!(root.content[0].width, Some(70.0));
        assert_eq!(root.content[1].active_item_index, Some(1));
        assert_eq!(root.content[1].content[0].title, "Log");
        assert_eq!(
            root.content[1].content[1].component_type.as_deref(),
            Some("terminal")
        );
        assert!(root.is_closable);
        assert_eq!(resolved.dimensions.header_height, 1);
        assert_eq!(resolved.dimensions.border_width, 5);
        assert!(resolved.settings.reorder_enabled);
    }

    #[test]
    fn stack_children_must_be_components() {
        let config = LayoutConfig::with_root(ItemConfig::of_type(
            ItemType::Stack,
            vec![ItemConfig::of_type(ItemType::Row, vec![])],
        ));
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::StackChildNotComponent(t)) if t == "row"
        ));
    }

    #[test]
    fn rejects_contradictory_items() {
        let mut component = ItemConfig::component("a");
        component.content.push(ItemConfig::component("b"));
        assert!(matches!(
            component.resolve(),
            Err(ConfigError::ComponentHasContent)
        ));

        let missing = ItemConfig {
            item_type: "component".into(),
            ..ItemConfig::default()
        };
        assert!(matches!(
            missing.resolve(),
            Err(ConfigError::MissingComponentType)
        ));

        let ground = ItemConfig {
            item_type: "ground".into(),
            ..ItemConfig::default()
        };
        assert!(matches!(
            ground.resolve(),
            Err(ConfigError::InvalidItemType(t)) if t == "ground"
        ));

        let mut stack = ItemConfig::of_type(ItemType::Stack, vec![ItemConfig::component("a")]);
        stack.active_item_index = Some(1);
        assert!(matches!(
            stack.resolve(),
            Err(ConfigError::ActiveItemIndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn legacy_content_array_becomes_the_root() {
        let config = LayoutConfig::from_json(indoc! {r#"
            {
              "settings": { "hasHeaders": false, "showPopoutIcon": false },
              "labels": { "close": "x" },
              "content": [{ "type": "column", "content": [] }]
            }
        "#})
        .unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.root.unwrap().item_type, ItemType::Column);
        assert_eq!(resolved.header.side(), None);
        assert!(resolved.header.popout.is_hidden());
        assert_eq!(resolved.header.close.text(), Some("x"));

        let two = LayoutConfig {
            content: Some(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
            ..LayoutConfig::default()
        };
        assert!(matches!(two.resolve(), Err(ConfigError::TooManyRootItems(2))));
    }

    #[test]
    fn root_and_content_together_are_rejected() {
        let config = LayoutConfig {
            root: Some(ItemConfig::component("a")),
            content: Some(vec![ItemConfig::component("b")]),
            ..LayoutConfig::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::RootAndContent)));
    }

    #[test]
    fn resolved_output_can_be_fed_back_as_input() {
        let config = LayoutConfig::with_root(ItemConfig::of_type(
            ItemType::Column,
            vec![ItemConfig::component("a"), ItemConfig::component("b")],
        ));
        let resolved = config.resolve().unwrap();
        let again = LayoutConfig::from(&resolved).resolve().unwrap();
        assert_eq!(resolved, again);
    }
}
