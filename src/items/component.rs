use ratatui::prelude::Rect;
use serde_json::Value;

use super::{ItemKey, ItemTree};
use crate::config::{HeaderOverrides, ResolvedItemConfig};
use crate::constants::z_index;
use crate::error::{ConfigError, LayoutError, LayoutResult};
use crate::events::LayoutEvent;

/// Where a component is shown: what a virtual binding is told to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub rect: Rect,
    pub visible: bool,
    pub z_index: u16,
}

/// The engine side of a leaf: the bridge to a host-bound component and the
/// owner of its serializable state.
#[derive(Debug, Clone)]
pub struct ComponentContainer {
    component_type: String,
    title: String,
    state: Option<Value>,
    header_overrides: HeaderOverrides,
    reorder_enabled: bool,
    pub(crate) visible: bool,
    pub(crate) z_index: u16,
    pub(crate) focused: bool,
    last_placement: Option<Placement>,
}

impl ComponentContainer {
    pub(crate) fn from_config(config: &ResolvedItemConfig) -> Result<Self, ConfigError> {
        let component_type = config
            .component_type
            .clone()
            .ok_or(ConfigError::MissingComponentType)?;
        let title = if config.title.is_empty() {
            component_type.clone()
        } else {
            config.title.clone()
        };
        Ok(Self {
            component_type,
            title,
            state: config.component_state.clone(),
            header_overrides: config.header.clone(),
            reorder_enabled: config.reorder_enabled,
            visible: false,
            z_index: z_index::BASE,
            focused: false,
            last_placement: None,
        })
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    pub fn header_overrides(&self) -> &HeaderOverrides {
        &self.header_overrides
    }

    pub fn reorder_enabled(&self) -> bool {
        self.reorder_enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn z_index(&self) -> u16 {
        self.z_index
    }

    pub(crate) fn to_config(&self) -> ResolvedItemConfig {
        let mut config = ResolvedItemConfig::component(self.component_type.clone())
            .with_title(self.title.clone());
        config.component_state = self.state.clone();
        config.header = self.header_overrides.clone();
        config.reorder_enabled = self.reorder_enabled;
        config
    }
}

impl ItemTree {
    fn container_mut(&mut self, key: ItemKey) -> LayoutResult<&mut ComponentContainer> {
        self.item_mut(key)?
            .component_mut()
            .ok_or(LayoutError::Invariant("item is not a component"))
    }

    /// Placement of a component as of the last layout pass.
    pub fn placement(&self, key: ItemKey) -> Option<Placement> {
        let item = self.get(key)?;
        let container = item.component()?;
        Some(Placement {
            rect: item.rect,
            visible: container.visible,
            z_index: container.z_index,
        })
    }

    pub(super) fn layout_component(&mut self, key: ItemKey) {
        let Some(placement) = self.placement(key) else {
            return;
        };
        let Some(container) = self.items[key].component_mut() else {
            return;
        };
        if container.last_placement != Some(placement) {
            container.last_placement = Some(placement);
            self.push_effect(super::TreeEffect::PlacementChanged(key));
        }
    }

    pub(crate) fn set_component_state(&mut self, key: ItemKey, state: Value) -> LayoutResult<()> {
        self.container_mut(key)?.state = Some(state);
        self.state_changed(key);
        Ok(())
    }

    /// Record state reported by the bound host component, without notifying.
    pub(crate) fn sync_component_state(&mut self, key: ItemKey, state: Value) -> LayoutResult<()> {
        self.container_mut(key)?.state = Some(state);
        Ok(())
    }

    pub(crate) fn set_title(&mut self, key: ItemKey, title: &str) -> LayoutResult<()> {
        let container = self.container_mut(key)?;
        if container.title == title {
            return Ok(());
        }
        container.title = title.to_string();
        self.bubble(
            key,
            LayoutEvent::TitleChanged {
                component: key,
                title: title.to_string(),
            },
        );
        self.state_changed(key);
        if let Some(stack) = self.parent(key) {
            self.update_size(stack);
        }
        Ok(())
    }

    pub(crate) fn set_z_index(&mut self, key: ItemKey, z: u16) -> LayoutResult<()> {
        self.container_mut(key)?.z_index = z;
        self.layout_component(key);
        Ok(())
    }

    pub(crate) fn set_component_focused(&mut self, key: ItemKey, focused: bool) -> LayoutResult<()> {
        self.container_mut(key)?.focused = focused;
        Ok(())
    }
}
