//! Element store: the authoritative collection of canvas elements.

use crate::elements::{CanvasElement, ElementId, ElementKind, ElementPatch, GroupId, is_valid_size};
use crate::error::{CanvasError, CanvasResult};
use kurbo::{Point, Rect, Size};
use std::collections::HashMap;

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// A snapshot of store state for undo/redo.
#[derive(Debug, Clone)]
struct StoreSnapshot {
    elements: HashMap<ElementId, CanvasElement>,
    z_order: Vec<ElementId>,
}

/// All elements on a board, plus their stacking order.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    /// All elements, keyed by ID.
    elements: HashMap<ElementId, CanvasElement>,
    /// Z-order of elements (back to front).
    z_order: Vec<ElementId>,
    undo_stack: Vec<StoreSnapshot>,
    redo_stack: Vec<StoreSnapshot>,
}

impl ElementStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            elements: self.elements.clone(),
            z_order: self.z_order.clone(),
        }
    }

    fn restore(&mut self, snapshot: StoreSnapshot) {
        self.elements = snapshot.elements;
        self.z_order = snapshot.z_order;
    }

    /// Push current state to undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        let snapshot = self.snapshot();
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if let Some(snapshot) = self.undo_stack.pop() {
            let current = self.snapshot();
            self.redo_stack.push(current);
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        if let Some(snapshot) = self.redo_stack.pop() {
            let current = self.snapshot();
            self.undo_stack.push(current);
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Create a new element on top of the stack.
    pub fn create(
        &mut self,
        kind: ElementKind,
        position: Point,
        size: Size,
        content: Option<String>,
    ) -> CanvasResult<ElementId> {
        if !is_valid_size(size) {
            log::warn!("Rejected {} with size {}x{}", kind.name(), size.width, size.height);
            return Err(CanvasError::InvalidGeometry {
                width: size.width,
                height: size.height,
            });
        }
        let element = CanvasElement::new(kind, position, size, content);
        let id = element.id();
        self.insert(element);
        Ok(id)
    }

    /// Insert a fully formed element on top of the stack.
    pub(crate) fn insert(&mut self, element: CanvasElement) {
        let id = element.id();
        if self.elements.insert(id, element).is_none() {
            self.z_order.push(id);
        }
    }

    /// Merge `patch` into an element.
    ///
    /// The store is left unchanged when the patch would produce an invalid size.
    pub fn update(&mut self, id: ElementId, patch: ElementPatch) -> CanvasResult<()> {
        let element = self.elements.get_mut(&id).ok_or(CanvasError::NotFound(id))?;
        let size = patch.resulting_size(element);
        if !is_valid_size(size) {
            log::warn!("Rejected update of {} to size {}x{}", id, size.width, size.height);
            return Err(CanvasError::InvalidGeometry {
                width: size.width,
                height: size.height,
            });
        }
        let touches_groups = patch.group_id.is_some();
        patch.apply(element);
        if touches_groups {
            self.normalize_groups();
        }
        Ok(())
    }

    /// Remove an element, dissolving a group it leaves with a single member.
    pub fn delete(&mut self, id: ElementId) -> CanvasResult<CanvasElement> {
        let element = self.elements.remove(&id).ok_or(CanvasError::NotFound(id))?;
        self.z_order.retain(|&zid| zid != id);
        if element.group_id.is_some() {
            self.normalize_groups();
        }
        Ok(element)
    }

    /// Clear `group_id` on every element whose group has fewer than two members.
    pub(crate) fn normalize_groups(&mut self) {
        let mut counts: HashMap<GroupId, usize> = HashMap::new();
        for element in self.elements.values() {
            if let Some(group) = element.group_id {
                *counts.entry(group).or_default() += 1;
            }
        }
        for element in self.elements.values_mut() {
            if let Some(group) = element.group_id {
                if counts.get(&group).copied().unwrap_or(0) < 2 {
                    log::debug!("Dissolving group {} left with one member", group);
                    element.group_id = None;
                }
            }
        }
    }

    /// Get an element by ID.
    pub fn get(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut CanvasElement> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Elements matching `predicate`, in z-order (back to front).
    pub fn query<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a CanvasElement> + 'a
    where
        F: Fn(&CanvasElement) -> bool + 'a,
    {
        self.ordered().filter(move |e| predicate(*e))
    }

    /// All elements in z-order (back to front).
    pub fn ordered(&self) -> impl Iterator<Item = &CanvasElement> {
        self.z_order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Z-order of element IDs (back to front).
    pub fn z_order(&self) -> &[ElementId] {
        &self.z_order
    }

    /// Members of a group, in z-order.
    pub fn group_members(&self, group: GroupId) -> Vec<ElementId> {
        self.query(move |e| e.group_id == Some(group)).map(CanvasElement::id).collect()
    }

    /// Topmost unlocked element under a world point.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.elements.get(id))
            .find(|e| !e.locked && e.hit_test(point))
            .map(CanvasElement::id)
    }

    /// Unlocked elements whose bounding box intersects `rect`, in z-order.
    pub fn elements_in_rect(&self, rect: Rect) -> Vec<ElementId> {
        self.query(move |e| !e.locked && e.intersects(rect))
            .map(CanvasElement::id)
            .collect()
    }

    /// Union of the bounding boxes of matching elements.
    pub fn bounds<F>(&self, predicate: F) -> Option<Rect>
    where
        F: Fn(&CanvasElement) -> bool,
    {
        self.ordered()
            .filter(|e| predicate(*e))
            .map(CanvasElement::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Bring an element to the front (topmost).
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        if !self.elements.contains_key(&id) {
            return false;
        }
        self.z_order.retain(|&zid| zid != id);
        self.z_order.push(id);
        true
    }

    /// Send an element to the back (bottommost).
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        if !self.elements.contains_key(&id) {
            return false;
        }
        self.z_order.retain(|&zid| zid != id);
        self.z_order.insert(0, id);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Replace the contents with `elements` (given back to front).
    ///
    /// Clears undo history. Duplicate ids keep the last occurrence.
    pub(crate) fn replace_all(&mut self, elements: Vec<CanvasElement>) {
        self.elements.clear();
        self.z_order.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        for element in elements {
            let id = element.id();
            self.z_order.retain(|&zid| zid != id);
            self.z_order.push(id);
            self.elements.insert(id, element);
        }
        self.normalize_groups();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementStyle, Flip};
    use uuid::Uuid;

    fn square(store: &mut ElementStore, x: f64, y: f64, side: f64) -> ElementId {
        store
            .create(ElementKind::Shape, Point::new(x, y), Size::new(side, side), None)
            .unwrap()
    }

    #[test]
    fn test_store_creation() {
        let store = ElementStore::new();
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_assigns_unique_ids() {
        let mut store = ElementStore::new();
        let a = square(&mut store, 0.0, 0.0, 10.0);
        let b = square(&mut store, 0.0, 0.0, 10.0);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.z_order(), &[a, b]);
    }

    #[test]
    fn test_create_rejects_non_positive_size() {
        let mut store = ElementStore::new();
        let result = store.create(ElementKind::Text, Point::ZERO, Size::new(0.0, 10.0), None);
        assert_eq!(
            result,
            Err(CanvasError::InvalidGeometry {
                width: 0.0,
                height: 10.0
            })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = ElementStore::new();
        let id = store
            .create(ElementKind::Text, Point::ZERO, Size::new(10.0, 10.0), Some("hi".into()))
            .unwrap();

        let mut style = ElementStyle::new();
        style.set("color", "red");
        store
            .update(
                id,
                ElementPatch::new()
                    .position(Point::new(3.0, 4.0))
                    .style(style)
                    .flip(Flip {
                        horizontal: true,
                        vertical: false,
                    }),
            )
            .unwrap();

        let e = store.get(id).unwrap();
        assert_eq!(e.position, Point::new(3.0, 4.0));
        assert_eq!(e.content.as_deref(), Some("hi"));
        assert!(e.flip.horizontal);
        assert!(e.style.get("color").is_some());
    }

    #[test]
    fn test_update_missing_element() {
        let mut store = ElementStore::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            store.update(missing, ElementPatch::new()),
            Err(CanvasError::NotFound(missing))
        );
    }

    #[test]
    fn test_update_invalid_size_leaves_store_unchanged() {
        let mut store = ElementStore::new();
        let id = square(&mut store, 0.0, 0.0, 10.0);
        let before = store.get(id).unwrap().clone();

        let result = store.update(
            id,
            ElementPatch::new()
                .position(Point::new(99.0, 99.0))
                .size(Size::new(5.0, -1.0)),
        );

        assert!(matches!(result, Err(CanvasError::InvalidGeometry { .. })));
        assert_eq!(store.get(id), Some(&before));
    }

    #[test]
    fn test_delete_dissolves_pair_group() {
        let mut store = ElementStore::new();
        let a = square(&mut store, 0.0, 0.0, 10.0);
        let b = square(&mut store, 20.0, 0.0, 10.0);
        let group = Uuid::new_v4();
        store.update(a, ElementPatch::new().group_id(Some(group))).unwrap();
        store.update(b, ElementPatch::new().group_id(Some(group))).unwrap();
        assert_eq!(store.group_members(group), vec![a, b]);

        store.delete(a).unwrap();
        assert_eq!(store.get(b).unwrap().group_id, None);
        assert!(store.delete(a).is_err());
    }

    #[test]
    fn test_singleton_group_never_sticks() {
        let mut store = ElementStore::new();
        let a = square(&mut store, 0.0, 0.0, 10.0);
        store
            .update(a, ElementPatch::new().group_id(Some(Uuid::new_v4())))
            .unwrap();
        assert_eq!(store.get(a).unwrap().group_id, None);
    }

    #[test]
    fn test_query_in_z_order() {
        let mut store = ElementStore::new();
        let a = square(&mut store, 0.0, 0.0, 10.0);
        let _b = square(&mut store, 100.0, 0.0, 10.0);
        let c = square(&mut store, 0.0, 100.0, 10.0);

        let left: Vec<ElementId> = store.query(|e| e.position.x < 50.0).map(|e| e.id()).collect();
        assert_eq!(left, vec![a, c]);
    }

    #[test]
    fn test_element_at_prefers_topmost_and_skips_locked() {
        let mut store = ElementStore::new();
        let back = square(&mut store, 0.0, 0.0, 100.0);
        let front = square(&mut store, 50.0, 50.0, 100.0);

        assert_eq!(store.element_at(Point::new(75.0, 75.0)), Some(front));
        assert_eq!(store.element_at(Point::new(25.0, 25.0)), Some(back));
        assert_eq!(store.element_at(Point::new(500.0, 500.0)), None);

        store.update(front, ElementPatch::new().locked(true)).unwrap();
        assert_eq!(store.element_at(Point::new(75.0, 75.0)), Some(back));
    }

    #[test]
    fn test_elements_in_rect_intersects_not_contains() {
        let mut store = ElementStore::new();
        let a = square(&mut store, 0.0, 0.0, 10.0);
        let b = square(&mut store, 50.0, 0.0, 10.0);
        let locked = square(&mut store, 5.0, 5.0, 10.0);
        store.update(locked, ElementPatch::new().locked(true)).unwrap();

        // Only partially covers `a`, misses `b`.
        let hits = store.elements_in_rect(Rect::new(5.0, 5.0, 20.0, 20.0));
        assert_eq!(hits, vec![a]);

        let all = store.elements_in_rect(Rect::new(-100.0, -100.0, 100.0, 100.0));
        assert_eq!(all, vec![a, b]);
    }

    #[test]
    fn test_bounds_union() {
        let mut store = ElementStore::new();
        assert!(store.bounds(|_| true).is_none());
        square(&mut store, 0.0, 0.0, 10.0);
        square(&mut store, 90.0, 40.0, 10.0);
        assert_eq!(store.bounds(|_| true), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn test_z_order() {
        let mut store = ElementStore::new();
        let a = square(&mut store, 0.0, 0.0, 10.0);
        let b = square(&mut store, 0.0, 0.0, 10.0);

        assert!(store.bring_to_front(a));
        assert_eq!(store.z_order(), &[b, a]);

        assert!(store.send_to_back(a));
        assert_eq!(store.z_order(), &[a, b]);

        assert!(!store.bring_to_front(Uuid::new_v4()));
    }

    #[test]
    fn test_undo_create() {
        let mut store = ElementStore::new();

        store.push_undo();
        let id = square(&mut store, 0.0, 0.0, 10.0);
        assert!(store.can_undo());

        assert!(store.undo());
        assert!(store.is_empty());
        assert!(store.can_redo());

        assert!(store.redo());
        assert!(store.get(id).is_some());
    }

    #[test]
    fn test_undo_clears_redo() {
        let mut store = ElementStore::new();

        store.push_undo();
        square(&mut store, 0.0, 0.0, 10.0);
        assert!(store.undo());
        assert!(store.can_redo());

        store.push_undo();
        square(&mut store, 5.0, 5.0, 10.0);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut store = ElementStore::new();
        for _ in 0..(MAX_UNDO_HISTORY + 10) {
            store.push_undo();
            square(&mut store, 0.0, 0.0, 10.0);
        }
        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut store = ElementStore::new();
        assert!(!store.undo());
        assert!(!store.redo());
    }
}
