//! Editing the item tree of an [`Outline`]

use uuid::Uuid;

use crate::types::{Outline, OutlineItem, OutlineItemKind};

impl OutlineItem {
    /// Visible item with a fresh `itemId`
    pub fn new(kind: OutlineItemKind, ref_id: impl Into<String>) -> Self {
        Self {
            item_id: Uuid::new_v4().simple().to_string(),
            kind,
            ref_id: ref_id.into(),
            is_visible: true,
            children: Vec::new(),
        }
    }
}

impl Outline {
    /// Append a top-level item; returns its `itemId`
    pub fn add_item(&mut self, kind: OutlineItemKind, ref_id: impl Into<String>) -> String {
        let item = OutlineItem::new(kind, ref_id);
        let id = item.item_id.clone();
        self.items.push(item);
        id
    }

    /// Append under `parent_id`; `None` if no such item exists
    pub fn add_child(
        &mut self,
        parent_id: &str,
        kind: OutlineItemKind,
        ref_id: impl Into<String>,
    ) -> Option<String> {
        let parent = find_mut(&mut self.items, parent_id)?;
        let item = OutlineItem::new(kind, ref_id);
        let id = item.item_id.clone();
        parent.children.push(item);
        Some(id)
    }

    /// Remove an item (and its children) wherever it sits in the tree
    pub fn remove_item(&mut self, item_id: &str) -> Option<OutlineItem> {
        remove_from(&mut self.items, item_id)
    }

    /// Flip visibility; returns the new value
    pub fn toggle_visibility(&mut self, item_id: &str) -> Option<bool> {
        let item = find_mut(&mut self.items, item_id)?;
        item.is_visible = !item.is_visible;
        Some(item.is_visible)
    }

    pub fn find_item(&self, item_id: &str) -> Option<&OutlineItem> {
        find(&self.items, item_id)
    }

    /// References of visible items, depth first.
    ///
    /// A hidden item hides its whole subtree.
    pub fn visible_refs(&self) -> Vec<(OutlineItemKind, &str)> {
        let mut refs = Vec::new();
        collect_visible(&self.items, &mut refs);
        refs
    }

    /// Number of items at every depth
    pub fn item_count(&self) -> usize {
        fn count(items: &[OutlineItem]) -> usize {
            items.iter().map(|i| 1 + count(&i.children)).sum()
        }
        count(&self.items)
    }
}

fn find<'a>(items: &'a [OutlineItem], item_id: &str) -> Option<&'a OutlineItem> {
    for item in items {
        if item.item_id == item_id {
            return Some(item);
        }
        if let Some(found) = find(&item.children, item_id) {
            return Some(found);
        }
    }
    None
}

fn find_mut<'a>(items: &'a mut [OutlineItem], item_id: &str) -> Option<&'a mut OutlineItem> {
    for item in items.iter_mut() {
        if item.item_id == item_id {
            return Some(item);
        }
        if let Some(found) = find_mut(&mut item.children, item_id) {
            return Some(found);
        }
    }
    None
}

fn remove_from(items: &mut Vec<OutlineItem>, item_id: &str) -> Option<OutlineItem> {
    if let Some(pos) = items.iter().position(|i| i.item_id == item_id) {
        return Some(items.remove(pos));
    }
    items
        .iter_mut()
        .find_map(|item| remove_from(&mut item.children, item_id))
}

fn collect_visible<'a>(items: &'a [OutlineItem], out: &mut Vec<(OutlineItemKind, &'a str)>) {
    for item in items.iter().filter(|i| i.is_visible) {
        out.push((item.kind, item.ref_id.as_str()));
        collect_visible(&item.children, out);
    }
}
