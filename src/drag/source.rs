//! Host regions that create new components when dragged from.

use ratatui::prelude::Rect;

use crate::config::ResolvedItemConfig;
use crate::layout::rect_contains;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragSourceId(u64);

#[derive(Debug, Clone)]
pub struct DragSource {
    pub id: DragSourceId,
    pub rect: Rect,
    /// Component config instantiated each time a drag starts here.
    pub config: ResolvedItemConfig,
}

#[derive(Debug, Default)]
pub struct DragSources {
    next_id: u64,
    sources: Vec<DragSource>,
}

impl DragSources {
    pub fn add(&mut self, rect: Rect, config: ResolvedItemConfig) -> DragSourceId {
        self.next_id += 1;
        let id = DragSourceId(self.next_id);
        self.sources.push(DragSource { id, rect, config });
        id
    }

    pub fn remove(&mut self, id: DragSourceId) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.id != id);
        self.sources.len() != before
    }

    pub fn get(&self, id: DragSourceId) -> Option<&DragSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Topmost source under the cell, latest registration first.
    pub fn at(&self, column: u16, row: u16) -> Option<&DragSource> {
        self.sources
            .iter()
            .rev()
            .find(|s| rect_contains(s.rect, column, row))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DragSource> {
        self.sources.iter()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}
