//! The content-item tree.
//!
//! Items live in a slot-map arena owned by `ItemTree`. Each item stores its
//! children as keys and its parent as a plain back-reference, so ownership
//! flows one way and bubbling walks the parent chain. The ground item is the
//! synthetic root: it always exists and holds at most one child.
//!
//! Structural operations never call out to the host. Instead they queue
//! `TreeEffect`s (bind or release a component, bubble an event, report a
//! changed placement) which the layout manager drains once the operation
//! is over.

mod component;
mod ground;
mod row_or_column;
mod stack;

pub use component::{ComponentContainer, Placement};
pub use stack::StackState;

use ratatui::prelude::{Direction, Rect};
use slotmap::{SlotMap, new_key_type};

use crate::config::{Dimensions, HeaderConfig, ItemType, ResolvedItemConfig, Settings};
use crate::error::{ConfigError, LayoutError, LayoutResult};
use crate::events::{EventEnvelope, LayoutEvent};
use crate::header::{TabMeasure, measure_tab};

new_key_type! {
    /// Handle to an item in an `ItemTree`.
    pub struct ItemKey;
}

#[derive(Debug)]
pub enum ItemKind {
    Ground,
    Row,
    Column,
    Stack(StackState),
    Component(ComponentContainer),
}

#[derive(Debug)]
pub struct ContentItem {
    pub(crate) kind: ItemKind,
    pub(crate) parent: Option<ItemKey>,
    pub(crate) children: Vec<ItemKey>,
    pub id: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: Option<u16>,
    pub min_height: Option<u16>,
    pub is_closable: bool,
    pub(crate) rect: Rect,
    pub(crate) splitters: Vec<Rect>,
    pub(crate) popin_parent_ids: Vec<String>,
    pub(crate) initialised: bool,
}

impl ContentItem {
    fn new(kind: ItemKind, config: Option<&ResolvedItemConfig>) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            id: config.map(|c| c.id.clone()).unwrap_or_default(),
            width: config.and_then(|c| c.width),
            height: config.and_then(|c| c.height),
            min_width: config.and_then(|c| c.min_width),
            min_height: config.and_then(|c| c.min_height),
            is_closable: config.is_none_or(|c| c.is_closable),
            rect: Rect::default(),
            splitters: Vec::new(),
            popin_parent_ids: Vec::new(),
            initialised: false,
        }
    }

    /// `None` for the ground item.
    pub fn item_type(&self) -> Option<ItemType> {
        match self.kind {
            ItemKind::Ground => None,
            ItemKind::Row => Some(ItemType::Row),
            ItemKind::Column => Some(ItemType::Column),
            ItemKind::Stack(_) => Some(ItemType::Stack),
            ItemKind::Component(_) => Some(ItemType::Component),
        }
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn is_ground(&self) -> bool {
        matches!(self.kind, ItemKind::Ground)
    }

    pub fn is_row_or_column(&self) -> bool {
        matches!(self.kind, ItemKind::Row | ItemKind::Column)
    }

    pub fn is_stack(&self) -> bool {
        matches!(self.kind, ItemKind::Stack(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, ItemKind::Component(_))
    }

    /// Primary axis of a row or column.
    pub fn direction(&self) -> Option<Direction> {
        match self.kind {
            ItemKind::Row => Some(Direction::Horizontal),
            ItemKind::Column => Some(Direction::Vertical),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<ItemKey> {
        self.parent
    }

    pub fn children(&self) -> &[ItemKey] {
        &self.children
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Splitter rects between adjacent children of a row or column.
    pub fn splitters(&self) -> &[Rect] {
        &self.splitters
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn popin_parent_ids(&self) -> &[String] {
        &self.popin_parent_ids
    }

    pub fn stack(&self) -> Option<&StackState> {
        match &self.kind {
            ItemKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub(crate) fn stack_mut(&mut self) -> Option<&mut StackState> {
        match &mut self.kind {
            ItemKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentContainer> {
        match &self.kind {
            ItemKind::Component(container) => Some(container),
            _ => None,
        }
    }

    pub(crate) fn component_mut(&mut self) -> Option<&mut ComponentContainer> {
        match &mut self.kind {
            ItemKind::Component(container) => Some(container),
            _ => None,
        }
    }

    pub fn size_along(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }

    pub(crate) fn set_size_along(&mut self, direction: Direction, size: Option<f64>) {
        match direction {
            Direction::Horizontal => self.width = size,
            Direction::Vertical => self.height = size,
        }
    }
}

/// Work the layout manager has to carry out after a structural operation.
#[derive(Debug, Clone)]
pub enum TreeEffect {
    /// A component container was constructed and needs its host component.
    Bind(ItemKey),
    /// A component container is gone; its host component must be released.
    Release(ItemKey),
    /// A notification to bubble along `path` (origin first, then ancestors).
    Event {
        path: Vec<ItemKey>,
        envelope: EventEnvelope,
    },
    /// A component's rect, visibility or layer changed.
    PlacementChanged(ItemKey),
}

#[derive(Debug)]
pub struct ItemTree {
    items: SlotMap<ItemKey, ContentItem>,
    ground: ItemKey,
    pub(crate) dimensions: Dimensions,
    pub(crate) header: HeaderConfig,
    pub(crate) settings: Settings,
    pub(crate) tab_measure: TabMeasure,
    pub(crate) is_sub_window: bool,
    effects: Vec<TreeEffect>,
}

impl Default for ItemTree {
    fn default() -> Self {
        Self::new(
            Dimensions::default(),
            HeaderConfig::default(),
            Settings::default(),
        )
    }
}

impl ItemTree {
    pub fn new(dimensions: Dimensions, header: HeaderConfig, settings: Settings) -> Self {
        let mut items = SlotMap::with_key();
        let mut ground_item = ContentItem::new(ItemKind::Ground, None);
        ground_item.is_closable = false;
        ground_item.initialised = true;
        let ground = items.insert(ground_item);
        Self {
            items,
            ground,
            dimensions,
            header,
            settings,
            tab_measure: measure_tab,
            is_sub_window: false,
            effects: Vec::new(),
        }
    }

    pub fn ground(&self) -> ItemKey {
        self.ground
    }

    /// The user-visible root item, if the layout is not empty.
    pub fn root(&self) -> Option<ItemKey> {
        self.items[self.ground].children.first().copied()
    }

    pub fn get(&self, key: ItemKey) -> Option<&ContentItem> {
        self.items.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: ItemKey) -> Option<&mut ContentItem> {
        self.items.get_mut(key)
    }

    pub(crate) fn item(&self, key: ItemKey) -> LayoutResult<&ContentItem> {
        self.items.get(key).ok_or(LayoutError::UnknownItem)
    }

    pub(crate) fn item_mut(&mut self, key: ItemKey) -> LayoutResult<&mut ContentItem> {
        self.items.get_mut(key).ok_or(LayoutError::UnknownItem)
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().is_none()
    }

    pub fn parent(&self, key: ItemKey) -> Option<ItemKey> {
        self.items.get(key).and_then(|item| item.parent)
    }

    pub fn children(&self, key: ItemKey) -> &[ItemKey] {
        self.items
            .get(key)
            .map(|item| item.children.as_slice())
            .unwrap_or_default()
    }

    pub fn index_in_parent(&self, key: ItemKey) -> Option<usize> {
        let parent = self.parent(key)?;
        self.children(parent).iter().position(|c| *c == key)
    }

    /// Parent chain, nearest first.
    pub fn ancestors(&self, key: ItemKey) -> Vec<ItemKey> {
        let mut out = Vec::new();
        let mut current = self.parent(key);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// Whether `key` is reachable from the ground.
    pub fn is_attached(&self, key: ItemKey) -> bool {
        key == self.ground || self.ancestors(key).last() == Some(&self.ground)
    }

    /// `key` and everything below it, in pre-order.
    pub fn descendants(&self, key: ItemKey) -> Vec<ItemKey> {
        let mut out = Vec::new();
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            pending.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Every item below the ground, in pre-order.
    pub fn all_items(&self) -> Vec<ItemKey> {
        self.root().map(|r| self.descendants(r)).unwrap_or_default()
    }

    pub fn stacks(&self) -> Vec<ItemKey> {
        self.all_items()
            .into_iter()
            .filter(|k| self.items[*k].is_stack())
            .collect()
    }

    pub fn components(&self) -> Vec<ItemKey> {
        self.all_items()
            .into_iter()
            .filter(|k| self.items[*k].is_component())
            .collect()
    }

    pub fn find_by_id(&self, id: &str) -> Vec<ItemKey> {
        self.all_items()
            .into_iter()
            .filter(|k| self.items[*k].id == id)
            .collect()
    }

    /// First attached item tagged to accept pop-ins for `id`.
    pub fn find_by_popin_parent_id(&self, id: &str) -> Option<ItemKey> {
        self.descendants(self.ground)
            .into_iter()
            .find(|k| self.items[*k].popin_parent_ids.iter().any(|p| p == id))
    }

    pub(crate) fn add_popin_parent_id(&mut self, key: ItemKey, id: String) -> LayoutResult<()> {
        let item = self.item_mut(key)?;
        if !item.popin_parent_ids.contains(&id) {
            item.popin_parent_ids.push(id);
        }
        Ok(())
    }

    pub(crate) fn remove_popin_parent_id(&mut self, id: &str) {
        for item in self.items.values_mut() {
            item.popin_parent_ids.retain(|p| p != id);
        }
    }

    pub(crate) fn drain_effects(&mut self) -> Vec<TreeEffect> {
        std::mem::take(&mut self.effects)
    }

    pub(crate) fn push_effect(&mut self, effect: TreeEffect) {
        self.effects.push(effect);
    }

    /// Queue `event` to bubble from `origin` up through its ancestors.
    pub(crate) fn bubble(&mut self, origin: ItemKey, event: LayoutEvent) {
        let mut path = vec![origin];
        path.extend(self.ancestors(origin));
        self.effects.push(TreeEffect::Event {
            path,
            envelope: EventEnvelope {
                origin: Some(origin),
                event,
            },
        });
    }

    pub(crate) fn state_changed(&mut self, origin: ItemKey) {
        self.bubble(origin, LayoutEvent::StateChanged);
    }

    pub(crate) fn child_index(&self, parent: ItemKey, child: ItemKey) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Build a detached, uninitialised subtree from `config`.
    ///
    /// Components that would not end up directly inside a stack are wrapped in
    /// a new stack first, so every component in the tree is a stack child.
    pub(crate) fn create_item(
        &mut self,
        config: &ResolvedItemConfig,
        inside_stack: bool,
    ) -> LayoutResult<ItemKey> {
        if config.item_type == ItemType::Component && !inside_stack {
            let wrapper = stack::wrapping_config(config);
            return self.create_item(&wrapper, false);
        }

        let kind = match config.item_type {
            ItemType::Row => ItemKind::Row,
            ItemType::Column => ItemKind::Column,
            ItemType::Stack => ItemKind::Stack(StackState::from_config(config)),
            ItemType::Component => {
                if !config.content.is_empty() {
                    return Err(ConfigError::ComponentHasContent.into());
                }
                ItemKind::Component(ComponentContainer::from_config(config)?)
            }
        };
        let is_component = matches!(kind, ItemKind::Component(_));
        let is_stack = matches!(kind, ItemKind::Stack(_));
        let key = self.items.insert(ContentItem::new(kind, Some(config)));
        if is_component {
            self.effects.push(TreeEffect::Bind(key));
        }

        for child_config in &config.content {
            if is_stack && child_config.item_type != ItemType::Component {
                return Err(ConfigError::StackChildNotComponent(
                    child_config.item_type.as_str().to_string(),
                )
                .into());
            }
            let child = self.create_item(child_config, is_stack)?;
            self.items[child].parent = Some(key);
            self.items[key].children.push(child);
        }
        tracing::trace!(item = ?key, kind = config.item_type.as_str(), "content item created");
        Ok(key)
    }

    /// Initialise `key` and its subtree, top-down.
    pub(crate) fn init(&mut self, key: ItemKey) -> LayoutResult<()> {
        let item = self.item_mut(key)?;
        if item.initialised {
            return Ok(());
        }
        item.initialised = true;
        let item_type = item.item_type();
        self.bubble(key, LayoutEvent::ItemCreated(key));
        match item_type {
            Some(ItemType::Row) => self.bubble(key, LayoutEvent::RowCreated(key)),
            Some(ItemType::Column) => self.bubble(key, LayoutEvent::ColumnCreated(key)),
            Some(ItemType::Stack) => {
                self.bubble(key, LayoutEvent::StackCreated(key));
                self.init_stack(key)?;
            }
            Some(ItemType::Component) => self.bubble(key, LayoutEvent::ComponentCreated(key)),
            None => {}
        }
        for child in self.children(key).to_vec() {
            self.init(child)?;
        }
        Ok(())
    }

    /// Destroy `key` and its subtree, bottom-up. The item must already be
    /// unlinked from, or about to be spliced out of, its parent's child list.
    pub(crate) fn destroy(&mut self, key: ItemKey) {
        for child in self.children(key).to_vec() {
            self.destroy(child);
        }
        if !self.contains(key) {
            return;
        }
        self.bubble(key, LayoutEvent::BeforeItemDestroyed(key));
        if self.items[key].is_component() {
            self.effects.push(TreeEffect::Release(key));
        }
        self.bubble(key, LayoutEvent::ItemDestroyed(key));
        self.items.remove(key);
        tracing::trace!(item = ?key, "content item destroyed");
    }

    /// Insert a detached `child` under `parent`.
    pub(crate) fn add_child(
        &mut self,
        parent: ItemKey,
        child: ItemKey,
        index: Option<usize>,
    ) -> LayoutResult<usize> {
        match self.item(parent)?.kind {
            ItemKind::Ground => self.ground_add_child(child, index),
            ItemKind::Row | ItemKind::Column => {
                self.row_or_column_add_child(parent, child, index, false)
            }
            ItemKind::Stack(_) => self.stack_add_child(parent, child, index),
            ItemKind::Component(_) => Err(LayoutError::Invariant(
                "components cannot have children",
            )),
        }
    }

    fn base_add_child(
        &mut self,
        parent: ItemKey,
        child: ItemKey,
        index: Option<usize>,
    ) -> LayoutResult<usize> {
        if self.item(child)?.parent.is_some() {
            return Err(LayoutError::Invariant("content item already has a parent"));
        }
        let parent_item = self.item_mut(parent)?;
        let len = parent_item.children.len();
        let index = index.unwrap_or(len).min(len);
        parent_item.children.insert(index, child);
        let parent_initialised = parent_item.initialised;
        self.items[child].parent = Some(parent);
        if parent_initialised && !self.items[child].initialised {
            self.init(child)?;
        }
        tracing::debug!(parent = ?parent, child = ?child, index, "child added");
        Ok(index)
    }

    /// Unlink `child` from `parent`, destroying it unless `keep_alive`.
    pub(crate) fn remove_child(
        &mut self,
        parent: ItemKey,
        child: ItemKey,
        keep_alive: bool,
    ) -> LayoutResult<()> {
        match self.item(parent)?.kind {
            ItemKind::Row | ItemKind::Column => {
                self.row_or_column_remove_child(parent, child, keep_alive)
            }
            ItemKind::Stack(_) => self.stack_remove_child(parent, child, keep_alive),
            ItemKind::Ground | ItemKind::Component(_) => {
                self.base_remove_child(parent, child, keep_alive)
            }
        }
    }

    fn base_remove_child(
        &mut self,
        parent: ItemKey,
        child: ItemKey,
        keep_alive: bool,
    ) -> LayoutResult<()> {
        let index = self
            .child_index(parent, child)
            .ok_or(LayoutError::Invariant("cannot remove an unknown child item"))?;
        if keep_alive {
            self.items[child].parent = None;
        } else {
            self.destroy(child);
        }
        self.items[parent].children.remove(index);
        tracing::debug!(parent = ?parent, child = ?child, index, keep_alive, "child removed");

        let item = &self.items[parent];
        if !item.children.is_empty() {
            self.update_size(parent);
        } else if !item.is_ground() && item.is_closable {
            let grandparent = item
                .parent
                .ok_or(LayoutError::Invariant("closable item has no parent"))?;
            self.remove_child(grandparent, parent, false)?;
        }
        Ok(())
    }

    /// Detach `key` from its parent.
    pub(crate) fn remove_item(&mut self, key: ItemKey, keep_alive: bool) -> LayoutResult<()> {
        match self.item(key)?.parent {
            Some(parent) => self.remove_child(parent, key, keep_alive),
            None if keep_alive => Ok(()),
            None => {
                self.destroy(key);
                Ok(())
            }
        }
    }

    /// Put `new` in place of `old` under `parent`, carrying over `old`'s
    /// relative size.
    pub(crate) fn replace_child(
        &mut self,
        parent: ItemKey,
        old: ItemKey,
        new: ItemKey,
        destroy_old: bool,
    ) -> LayoutResult<()> {
        if self.item(parent)?.is_stack() {
            return Err(LayoutError::Invariant("stack children cannot be replaced"));
        }
        let index = self
            .child_index(parent, old)
            .ok_or(LayoutError::Invariant("cannot replace an unknown child item"))?;
        if self.item(new)?.parent.is_some() {
            return Err(LayoutError::Invariant("replacement item already has a parent"));
        }

        let (width, height) = (self.items[old].width, self.items[old].height);
        self.items[old].parent = None;
        if destroy_old {
            self.destroy(old);
        }
        self.items[parent].children[index] = new;
        let new_item = &mut self.items[new];
        new_item.parent = Some(parent);
        new_item.width = width;
        new_item.height = height;
        tracing::debug!(parent = ?parent, old = ?old, new = ?new, "child replaced");

        if self.items[parent].initialised && !self.items[new].initialised {
            self.init(new)?;
        }
        self.update_size(parent);
        Ok(())
    }

    /// Assign `rect` to `key` and lay out its subtree.
    pub(crate) fn set_rect(&mut self, key: ItemKey, rect: Rect) {
        if let Some(item) = self.items.get_mut(key) {
            item.rect = rect;
            self.update_size(key);
        }
    }

    /// Re-lay out the subtree under `key` within its current rect.
    pub(crate) fn update_size(&mut self, key: ItemKey) {
        let Some(item) = self.items.get(key) else {
            return;
        };
        match item.kind {
            ItemKind::Ground => {
                let rect = item.rect;
                for child in item.children.clone() {
                    self.set_rect(child, rect);
                }
            }
            ItemKind::Row | ItemKind::Column => self.layout_row_or_column(key),
            ItemKind::Stack(_) => self.layout_stack(key),
            ItemKind::Component(_) => self.layout_component(key),
        }
    }

    /// Serialize the subtree under `key`. `maximised` names the stack the
    /// orchestrator currently holds maximised.
    pub fn to_config(&self, key: ItemKey, maximised: Option<ItemKey>) -> LayoutResult<ResolvedItemConfig> {
        let item = self.item(key)?;
        let mut config = match &item.kind {
            ItemKind::Ground => {
                return Err(LayoutError::Invariant("the ground item has no config"));
            }
            ItemKind::Row => ResolvedItemConfig::row(),
            ItemKind::Column => ResolvedItemConfig::column(),
            ItemKind::Stack(stack) => {
                let mut config = ResolvedItemConfig::stack();
                config.active_item_index = Some(
                    stack
                        .active
                        .and_then(|a| item.children.iter().position(|c| *c == a))
                        .unwrap_or(0),
                );
                config.maximised = maximised == Some(key);
                config.header = stack.header_overrides.clone();
                config
            }
            ItemKind::Component(container) => container.to_config(),
        };
        config.content = item
            .children
            .iter()
            .map(|child| self.to_config(*child, maximised))
            .collect::<LayoutResult<_>>()?;
        config.width = item.width;
        config.height = item.height;
        config.min_width = item.min_width;
        config.min_height = item.min_height;
        config.id = item.id.clone();
        config.is_closable = item.is_closable;
        Ok(config)
    }

    /// Replace whatever the ground holds with a subtree built from `config`.
    pub(crate) fn load_root(&mut self, config: Option<&ResolvedItemConfig>) -> LayoutResult<Option<ItemKey>> {
        if let Some(root) = self.root() {
            self.remove_child(self.ground, root, false)?;
        }
        let Some(config) = config else {
            return Ok(None);
        };
        let root = self.create_item(config, false)?;
        self.add_child(self.ground, root, None)?;
        Ok(Some(root))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ResolvedItemConfig as C;

    pub(crate) fn tree_with(config: C, width: u16, height: u16) -> (ItemTree, ItemKey) {
        let dimensions = Dimensions {
            border_width: 1,
            border_grab_width: 1,
            min_item_height: 1,
            min_item_width: 1,
            header_height: 1,
            control_button_width: 2,
            ..Dimensions::default()
        };
        let mut tree = ItemTree::new(dimensions, HeaderConfig::default(), Settings::default());
        tree.set_rect(tree.ground(), Rect::new(0, 0, width, height));
        let root = tree.load_root(Some(&config)).unwrap().unwrap();
        tree.drain_effects();
        (tree, root)
    }

    pub(crate) fn stack_of(types: &[&str]) -> C {
        C::stack().with_content(types.iter().map(|t| C::component(*t)).collect())
    }

    #[test]
    fn ground_holds_a_single_root() {
        let (mut tree, root) = tree_with(stack_of(&["a"]), 80, 24);
        assert_eq!(tree.root(), Some(root));
        let other = tree.create_item(&stack_of(&["b"]), false).unwrap();
        assert!(matches!(
            tree.add_child(tree.ground(), other, None),
            Err(LayoutError::Invariant(_))
        ));
    }

    #[test]
    fn bare_components_are_wrapped_in_stacks() {
        let config = C::row().with_content(vec![C::component("a"), C::component("b")]);
        let (tree, root) = tree_with(config, 80, 24);
        for child in tree.children(root) {
            let item = tree.get(*child).unwrap();
            assert!(item.is_stack());
            assert_eq!(tree.children(*child).len(), 1);
        }
    }

    #[test]
    fn creation_queues_binds_and_init_bubbles_created_events() {
        let mut tree = ItemTree::default();
        let key = tree.create_item(&stack_of(&["a", "b"]), false).unwrap();
        let effects = tree.drain_effects();
        let binds = effects
            .iter()
            .filter(|e| matches!(e, TreeEffect::Bind(_)))
            .count();
        assert_eq!(binds, 2);

        tree.add_child(tree.ground(), key, None).unwrap();
        let created: Vec<_> = tree
            .drain_effects()
            .into_iter()
            .filter_map(|e| match e {
                TreeEffect::Event { envelope, path } => match envelope.event {
                    LayoutEvent::ItemCreated(k) => Some((k, path)),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(created.len(), 3);
        assert_eq!(created[0].0, key);
        assert_eq!(created[0].1, vec![key, tree.ground()]);
    }

    #[test]
    fn destroying_releases_components_bottom_up() {
        let (mut tree, root) = tree_with(stack_of(&["a", "b"]), 80, 24);
        let components = tree.children(root).to_vec();
        tree.remove_child(tree.ground(), root, false).unwrap();
        let released: Vec<_> = tree
            .drain_effects()
            .into_iter()
            .filter_map(|e| match e {
                TreeEffect::Release(k) => Some(k),
                _ => None,
            })
            .collect();
        assert_eq!(released, components);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn replace_child_carries_size_over() {
        let config = C::row().with_content(vec![
            stack_of(&["a"]).with_width(30.0),
            stack_of(&["b"]).with_width(70.0),
        ]);
        let (mut tree, root) = tree_with(config, 101, 10);
        let old = tree.children(root)[1];
        let new = tree.create_item(&stack_of(&["c"]), false).unwrap();
        tree.replace_child(root, old, new, true).unwrap();
        assert!(!tree.contains(old));
        assert_eq!(tree.children(root)[1], new);
        assert_eq!(tree.get(new).unwrap().width, Some(70.0));
        assert!(tree.get(new).unwrap().is_initialised());
    }

    #[test]
    fn popin_parent_ids_are_found_anywhere_in_the_tree() {
        let config = C::row().with_content(vec![stack_of(&["a"]), stack_of(&["b"])]);
        let (mut tree, root) = tree_with(config, 80, 24);
        tree.add_popin_parent_id(root, "p1".into()).unwrap();
        assert_eq!(tree.find_by_popin_parent_id("p1"), Some(root));
        tree.remove_popin_parent_id("p1");
        assert_eq!(tree.find_by_popin_parent_id("p1"), None);
    }

    #[test]
    fn config_round_trips_through_the_tree() {
        let config = C::column().with_content(vec![
            C::row()
                .with_height(40.0)
                .with_id("top")
                .with_content(vec![stack_of(&["a", "b"]).with_width(25.0), stack_of(&["c"]).with_width(75.0)]),
            stack_of(&["d"]).with_height(60.0),
        ]);
        let (tree, root) = tree_with(config.clone(), 120, 60);
        let out = tree.to_config(root, None).unwrap();
        assert_eq!(out.item_type, ItemType::Column);
        assert_eq!(out.content[0].id, "top");
        assert_eq!(out.content[0].height, Some(40.0));
        assert_eq!(out.content[0].content[0].content.len(), 2);
        assert_eq!(out.content[1].content[0].component_type.as_deref(), Some("d"));
        assert_eq!(out, tree.to_config(tree.root().unwrap(), None).unwrap());
    }
}
