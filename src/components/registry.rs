//! The default binder: component factories keyed on `componentType`.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::{BindingKind, Component, ComponentBinder};
use crate::config::ResolvedItemConfig;
use crate::error::BindError;
use crate::items::{ItemKey, Placement};

pub type ComponentFactory = Box<dyn FnMut(&ResolvedItemConfig) -> Box<dyn Component>>;

/// Consulted for types with no registered factory.
pub type FallbackFactory = Box<dyn FnMut(&ResolvedItemConfig) -> Option<Box<dyn Component>>>;

struct Registration {
    factory: ComponentFactory,
    kind: BindingKind,
}

pub struct BoundComponent {
    pub component: Box<dyn Component>,
    pub component_type: String,
    pub kind: BindingKind,
    /// Last placement pushed to a virtual binding.
    pub placement: Option<Placement>,
}

#[derive(Default)]
pub struct ComponentRegistry {
    registrations: HashMap<String, Registration>,
    fallback: Option<FallbackFactory>,
    bound: HashMap<ItemKey, BoundComponent>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.registrations.keys().collect();
        types.sort();
        f.debug_struct("ComponentRegistry")
            .field("types", &types)
            .field("bound", &self.bound.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory drawn by the layout's render pass.
    pub fn register(
        &mut self,
        component_type: impl Into<String>,
        factory: ComponentFactory,
    ) -> Result<(), BindError> {
        self.insert(component_type.into(), factory, BindingKind::Rendered)
    }

    /// Register a factory whose content places itself from pushed placements.
    pub fn register_virtual(
        &mut self,
        component_type: impl Into<String>,
        factory: ComponentFactory,
    ) -> Result<(), BindError> {
        self.insert(component_type.into(), factory, BindingKind::Virtual)
    }

    fn insert(
        &mut self,
        component_type: String,
        factory: ComponentFactory,
        kind: BindingKind,
    ) -> Result<(), BindError> {
        if self.registrations.contains_key(&component_type) {
            return Err(BindError::Duplicate(component_type));
        }
        tracing::debug!(component_type = %component_type, ?kind, "component type registered");
        self.registrations
            .insert(component_type, Registration { factory, kind });
        Ok(())
    }

    pub fn set_fallback(&mut self, fallback: FallbackFactory) {
        self.fallback = Some(fallback);
    }

    pub fn is_registered(&self, component_type: &str) -> bool {
        self.registrations.contains_key(component_type)
    }

    pub fn get(&self, container: ItemKey) -> Option<&BoundComponent> {
        self.bound.get(&container)
    }

    pub fn get_mut(&mut self, container: ItemKey) -> Option<&mut BoundComponent> {
        self.bound.get_mut(&container)
    }

    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }
}

impl ComponentBinder for ComponentRegistry {
    fn bind(
        &mut self,
        container: ItemKey,
        config: &ResolvedItemConfig,
    ) -> Result<BindingKind, BindError> {
        let component_type = config
            .component_type
            .clone()
            .unwrap_or_default();
        let (component, kind) = match self.registrations.get_mut(&component_type) {
            Some(registration) => ((registration.factory)(config), registration.kind),
            None => {
                let built = self.fallback.as_mut().and_then(|fallback| fallback(config));
                match built {
                    Some(component) => (component, BindingKind::Rendered),
                    None => return Err(BindError::Unregistered(component_type)),
                }
            }
        };
        if self.bound.contains_key(&container) {
            tracing::warn!(container = ?container, "rebinding a bound container");
        }
        self.bound.insert(
            container,
            BoundComponent {
                component,
                component_type,
                kind,
                placement: None,
            },
        );
        Ok(kind)
    }

    fn release(&mut self, container: ItemKey) {
        if self.bound.remove(&container).is_none() {
            tracing::debug!(container = ?container, "release of an unbound container");
        }
    }

    fn virtual_rect(&mut self, container: ItemKey, placement: Placement) {
        if let Some(bound) = self.bound.get_mut(&container) {
            bound.placement = Some(placement);
            if placement.visible {
                bound.component.resize(placement.rect, &Default::default());
            }
        }
    }

    fn state(&self, container: ItemKey) -> Option<Value> {
        self.bound.get(&container)?.component.state()
    }
}
