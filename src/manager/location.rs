//! Adding items at the first location that matches a list of selectors.

use serde_json::Value;

use super::LayoutManager;
use crate::components::ComponentBinder;
use crate::config::{ItemConfig, ItemType, ResolvedItemConfig};
use crate::error::{ConfigError, LayoutError, LayoutResult};
use crate::items::{ItemKey, ItemKind};
use crate::layout::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSelector {
    /// Next to the focused component, in its stack.
    FocusedItem,
    /// At the end of the focused component's stack.
    FocusedStack,
    FirstStack,
    FirstRowOrColumn,
    FirstRow,
    FirstColumn,
    /// The ground, only while the layout is empty.
    Empty,
    /// The root item, or the ground when there is none.
    Root,
}

/// Tried in order by `add_item` and `add_component`.
///
/// Order decides where non-component configs go: while any stack exists,
/// `FirstStack` wins over `FirstRowOrColumn` and a row, column or stack
/// config is rejected with `ConfigError::NotComponent`. Pass selectors
/// starting at `FirstRowOrColumn` or `Root` to place containers.
pub const DEFAULT_LOCATION_SELECTORS: [LocationSelector; 4] = [
    LocationSelector::FocusedStack,
    LocationSelector::FirstStack,
    LocationSelector::FirstRowOrColumn,
    LocationSelector::Root,
];

/// A parent to insert into and, optionally, the position among its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub parent: ItemKey,
    pub index: Option<usize>,
}

impl<B: ComponentBinder> LayoutManager<B> {
    /// The location `selectors` pick first, if any applies.
    pub fn find_first_location(&self, selectors: &[LocationSelector]) -> Option<Location> {
        selectors.iter().find_map(|s| self.find_location(*s))
    }

    fn find_location(&self, selector: LocationSelector) -> Option<Location> {
        let tree = &self.tree;
        let first = |pred: &dyn Fn(&ItemKind) -> bool| {
            tree.all_items()
                .into_iter()
                .find(|k| tree.get(*k).is_some_and(|i| pred(i.kind())))
                .map(|parent| Location {
                    parent,
                    index: None,
                })
        };
        match selector {
            LocationSelector::FocusedItem => {
                let focused = self.focused?;
                Some(Location {
                    parent: tree.parent(focused)?,
                    index: tree.index_in_parent(focused).map(|i| i + 1),
                })
            }
            LocationSelector::FocusedStack => Some(Location {
                parent: tree.parent(self.focused?)?,
                index: None,
            }),
            LocationSelector::FirstStack => first(&|k| matches!(k, ItemKind::Stack(_))),
            LocationSelector::FirstRowOrColumn => {
                first(&|k| matches!(k, ItemKind::Row | ItemKind::Column))
            }
            LocationSelector::FirstRow => first(&|k| matches!(k, ItemKind::Row)),
            LocationSelector::FirstColumn => first(&|k| matches!(k, ItemKind::Column)),
            LocationSelector::Empty => tree.is_empty().then(|| Location {
                parent: tree.ground(),
                index: None,
            }),
            LocationSelector::Root => Some(Location {
                parent: tree.root().unwrap_or(tree.ground()),
                index: None,
            }),
        }
    }

    /// Resolve `config` and add it at the default locations.
    pub fn add_item(&mut self, config: &ItemConfig) -> LayoutResult<ItemKey> {
        let resolved = config.resolve()?;
        self.add_item_at_location(&resolved, &DEFAULT_LOCATION_SELECTORS)
    }

    /// Add a new item built from `config` at the first matching location.
    ///
    /// For a component config the new component is returned; otherwise the
    /// created container.
    pub fn add_item_at_location(
        &mut self,
        config: &ResolvedItemConfig,
        selectors: &[LocationSelector],
    ) -> LayoutResult<ItemKey> {
        config.validate()?;
        if !self.initialised {
            return Err(LayoutError::NotInitialised);
        }
        let location = self
            .find_first_location(selectors)
            .ok_or(LayoutError::NoLocation)?;
        let target = match self.tree.root() {
            Some(root) if location.parent == self.tree.ground() => root,
            _ => location.parent,
        };
        if self.tree.item(target)?.is_stack() && config.item_type != ItemType::Component {
            return Err(ConfigError::NotComponent(config.item_type.as_str().to_string()).into());
        }
        self.bracket(|m| {
            m.check_minimise_maximised_stack()?;
            m.insert_at(location.parent, config, location.index)
        })
    }

    pub fn add_component(
        &mut self,
        component_type: &str,
        state: Option<Value>,
        title: Option<&str>,
    ) -> LayoutResult<ItemKey> {
        self.add_component_at_location(component_type, state, title, &DEFAULT_LOCATION_SELECTORS)
    }

    pub fn add_component_at_location(
        &mut self,
        component_type: &str,
        state: Option<Value>,
        title: Option<&str>,
        selectors: &[LocationSelector],
    ) -> LayoutResult<ItemKey> {
        let mut config = ResolvedItemConfig::component(component_type);
        config.component_state = state;
        if let Some(title) = title {
            config.title = title.to_string();
        }
        self.add_item_at_location(&config, selectors)
    }

    /// Build `config` and attach it under `parent`.
    pub(crate) fn insert_at(
        &mut self,
        parent: ItemKey,
        config: &ResolvedItemConfig,
        index: Option<usize>,
    ) -> LayoutResult<ItemKey> {
        match self.tree.item(parent)?.item_type() {
            Some(ItemType::Stack) => {
                let item = self.tree.create_item(config, false)?;
                self.tree.stack_drop(parent, item, Segment::Header, index)
            }
            Some(ItemType::Row | ItemType::Column) => {
                let item = self.tree.create_item(config, false)?;
                self.tree.add_child(parent, item, index)?;
                Ok(self.created_key(item, config))
            }
            None => match self.tree.root() {
                Some(root) => self.insert_at(root, config, index),
                None => {
                    let item = self.tree.create_item(config, false)?;
                    self.tree.add_child(parent, item, None)?;
                    Ok(self.created_key(item, config))
                }
            },
            Some(ItemType::Component) => Err(LayoutError::Invariant(
                "components cannot have children",
            )),
        }
    }

    /// Components arrive wrapped in a stack; report the component itself.
    fn created_key(&self, item: ItemKey, config: &ResolvedItemConfig) -> ItemKey {
        if config.item_type == ItemType::Component {
            self.tree.children(item).first().copied().unwrap_or(item)
        } else {
            item
        }
    }
}
