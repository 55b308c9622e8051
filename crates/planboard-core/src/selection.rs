//! Selection set, clipboard and multi-element operations.

use crate::config::SelectionConfig;
use crate::elements::{CanvasElement, ElementId, FlipAxis, GroupId, normalize_degrees};
use crate::store::ElementStore;
use kurbo::{Rect, Vec2};
use std::collections::HashMap;
use uuid::Uuid;

/// Target edge or center for align operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignDirection {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl AlignDirection {
    fn is_horizontal(self) -> bool {
        matches!(self, AlignDirection::Left | AlignDirection::Center | AlignDirection::Right)
    }

    /// The coordinate of `bounds` this direction aligns.
    fn coordinate(self, bounds: Rect) -> f64 {
        match self {
            AlignDirection::Left => bounds.x0,
            AlignDirection::Center => bounds.center().x,
            AlignDirection::Right => bounds.x1,
            AlignDirection::Top => bounds.y0,
            AlignDirection::Middle => bounds.center().y,
            AlignDirection::Bottom => bounds.y1,
        }
    }

    /// Min edge, mean center or max edge across `values`.
    fn target(self, values: &[f64]) -> f64 {
        match self {
            AlignDirection::Left | AlignDirection::Top => {
                values.iter().copied().fold(f64::INFINITY, f64::min)
            }
            AlignDirection::Right | AlignDirection::Bottom => {
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }
            AlignDirection::Center | AlignDirection::Middle => {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
    }
}

/// Direction of a nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl NudgeDirection {
    fn unit(self) -> Vec2 {
        match self {
            NudgeDirection::Up => Vec2::new(0.0, -1.0),
            NudgeDirection::Down => Vec2::new(0.0, 1.0),
            NudgeDirection::Left => Vec2::new(-1.0, 0.0),
            NudgeDirection::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// Nudge step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeStep {
    Fine,
    Fast,
}

/// Tracks the selected elements and applies bulk operations to them.
///
/// Every operation first drops ids that no longer resolve to an unlocked
/// element, so the selection stays valid whatever happened to the store.
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    /// Selected ids, in selection order, without duplicates.
    selected: Vec<ElementId>,
    /// Deep copies made by the last copy/cut.
    clipboard: Vec<CanvasElement>,
    config: SelectionConfig,
}

impl SelectionEngine {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            selected: Vec::new(),
            clipboard: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    pub fn clipboard(&self) -> &[CanvasElement] {
        &self.clipboard
    }

    /// Selected elements, resolved against the store.
    pub fn resolved<'a>(&self, store: &'a ElementStore) -> Vec<&'a CanvasElement> {
        self.selected.iter().filter_map(|&id| store.get(id)).collect()
    }

    /// Drop ids that are missing from the store or locked.
    pub fn prune(&mut self, store: &ElementStore) {
        self.selected.retain(|&id| match store.get(id) {
            Some(element) => !element.locked,
            None => {
                log::debug!("Dropping stale selection entry {}", id);
                false
            }
        });
    }

    fn is_selectable(store: &ElementStore, id: ElementId) -> bool {
        store.get(id).is_some_and(|e| !e.locked)
    }

    /// Replace the selection with a single element.
    pub fn select(&mut self, store: &ElementStore, id: ElementId) {
        self.selected.clear();
        if Self::is_selectable(store, id) {
            self.selected.push(id);
        }
    }

    /// Add an element to the selection, or remove it if already selected.
    pub fn toggle(&mut self, store: &ElementStore, id: ElementId) {
        if let Some(pos) = self.selected.iter().position(|&s| s == id) {
            self.selected.remove(pos);
        } else if Self::is_selectable(store, id) {
            self.selected.push(id);
        }
        self.prune(store);
    }

    /// Select every unlocked element intersecting `rect`.
    ///
    /// With `additive` the hits are appended to the current selection.
    pub fn select_in_rect(&mut self, store: &ElementStore, rect: Rect, additive: bool) {
        if !additive {
            self.selected.clear();
        }
        for id in store.elements_in_rect(rect) {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.prune(store);
    }

    /// Select every unlocked element.
    pub fn select_all(&mut self, store: &ElementStore) {
        self.selected = store.query(|e| !e.locked).map(CanvasElement::id).collect();
    }

    pub fn deselect(&mut self) {
        self.selected.clear();
    }

    /// Copy the selected elements into the clipboard.
    pub fn copy(&mut self, store: &ElementStore) {
        self.prune(store);
        if self.selected.is_empty() {
            return;
        }
        self.clipboard = self.resolved(store).into_iter().cloned().collect();
        log::debug!("Copied {} element(s)", self.clipboard.len());
    }

    /// Copy, then delete the selected elements.
    pub fn cut(&mut self, store: &mut ElementStore) {
        self.copy(store);
        self.delete(store);
    }

    /// Insert the clipboard contents as new elements and select them.
    ///
    /// Returns the new ids; empty when the clipboard is empty.
    pub fn paste(&mut self, store: &mut ElementStore) -> Vec<ElementId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let offset = self.config.paste_offset;

        // Copied groups become fresh groups; members that lost their
        // partners in the copy are dissolved by the store.
        let mut group_map: HashMap<GroupId, GroupId> = HashMap::new();
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for original in &mut self.clipboard {
            original.translate(offset);
            let mut element = original.duplicate();
            element.locked = false;
            element.group_id = element
                .group_id
                .map(|old| *group_map.entry(old).or_insert_with(Uuid::new_v4));
            pasted.push(element.id());
            store.insert(element);
        }
        store.normalize_groups();

        log::debug!("Pasted {} element(s)", pasted.len());
        self.selected = pasted.clone();
        pasted
    }

    /// Delete the selected elements from the store.
    pub fn delete(&mut self, store: &mut ElementStore) -> usize {
        let mut removed = 0;
        for id in self.selected.drain(..) {
            if store.delete(id).is_ok() {
                removed += 1;
            } else {
                log::debug!("Skipping delete of missing element {}", id);
            }
        }
        removed
    }

    /// Put all selected elements in a new group.
    ///
    /// Returns `None` when fewer than two elements are selected.
    pub fn group(&mut self, store: &mut ElementStore) -> Option<GroupId> {
        self.prune(store);
        if self.selected.len() < 2 {
            return None;
        }
        let group = Uuid::new_v4();
        for &id in &self.selected {
            if let Some(element) = store.get_mut(id) {
                element.group_id = Some(group);
            }
        }
        store.normalize_groups();
        Some(group)
    }

    /// Clear the group of every selected element. Returns how many changed.
    pub fn ungroup(&mut self, store: &mut ElementStore) -> usize {
        self.prune(store);
        let mut changed = 0;
        for &id in &self.selected {
            if let Some(element) = store.get_mut(id) {
                if element.group_id.take().is_some() {
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            store.normalize_groups();
        }
        changed
    }

    /// Lock the selected elements; they leave the selection immediately.
    ///
    /// Group membership is kept.
    pub fn lock(&mut self, store: &mut ElementStore) -> usize {
        self.prune(store);
        let mut locked = 0;
        for id in self.selected.drain(..) {
            if let Some(element) = store.get_mut(id) {
                element.locked = true;
                locked += 1;
            }
        }
        locked
    }

    /// Unlock the given elements. Returns how many were locked before.
    ///
    /// Locked elements cannot be selected, so unlock works on explicit ids.
    pub fn unlock(&mut self, store: &mut ElementStore, ids: &[ElementId]) -> usize {
        let mut unlocked = 0;
        for &id in ids {
            match store.get_mut(id) {
                Some(element) if element.locked => {
                    element.locked = false;
                    unlocked += 1;
                }
                Some(_) => {}
                None => log::debug!("Skipping unlock of missing element {}", id),
            }
        }
        unlocked
    }

    /// Rotate every selected element by `degrees`.
    pub fn rotate(&mut self, store: &mut ElementStore, degrees: f64) {
        self.for_each_selected(store, |element| {
            element.rotation = normalize_degrees(element.rotation + degrees);
        });
    }

    /// Rotate every selected element by the configured step.
    pub fn rotate_step(&mut self, store: &mut ElementStore) {
        self.rotate(store, self.config.rotation_step);
    }

    /// Toggle the flip flag on every selected element.
    pub fn flip(&mut self, store: &mut ElementStore, axis: FlipAxis) {
        self.for_each_selected(store, |element| match axis {
            FlipAxis::Horizontal => element.flip.horizontal = !element.flip.horizontal,
            FlipAxis::Vertical => element.flip.vertical = !element.flip.vertical,
        });
    }

    /// Align the selected elements' edges or centers.
    ///
    /// Only the axis implied by `direction` moves. Returns false when fewer
    /// than two elements are selected.
    pub fn align(&mut self, store: &mut ElementStore, direction: AlignDirection) -> bool {
        self.prune(store);
        if self.selected.len() < 2 {
            return false;
        }
        let current: Vec<(ElementId, f64)> = self
            .resolved(store)
            .into_iter()
            .map(|e| (e.id(), direction.coordinate(e.bounds())))
            .collect();
        let values: Vec<f64> = current.iter().map(|&(_, v)| v).collect();
        let target = direction.target(&values);

        for (id, value) in current {
            let shift = target - value;
            let delta = if direction.is_horizontal() {
                Vec2::new(shift, 0.0)
            } else {
                Vec2::new(0.0, shift)
            };
            if let Some(element) = store.get_mut(id) {
                element.translate(delta);
            }
        }
        true
    }

    /// Move every selected element by a fixed step.
    pub fn nudge(&mut self, store: &mut ElementStore, direction: NudgeDirection, step: NudgeStep) {
        let distance = match step {
            NudgeStep::Fine => self.config.nudge_fine,
            NudgeStep::Fast => self.config.nudge_fast,
        };
        self.translate(store, direction.unit() * distance);
    }

    /// Move every selected element by `delta` world units.
    pub fn translate(&mut self, store: &mut ElementStore, delta: Vec2) {
        self.for_each_selected(store, |element| element.translate(delta));
    }

    fn for_each_selected<F>(&mut self, store: &mut ElementStore, mut f: F)
    where
        F: FnMut(&mut CanvasElement),
    {
        self.prune(store);
        for &id in &self.selected {
            if let Some(element) = store.get_mut(id) {
                f(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementKind, ElementPatch};
    use kurbo::{Point, Size};

    fn setup() -> (ElementStore, SelectionEngine) {
        (ElementStore::new(), SelectionEngine::new(SelectionConfig::default()))
    }

    fn square(store: &mut ElementStore, x: f64, y: f64) -> ElementId {
        store
            .create(ElementKind::Shape, Point::new(x, y), Size::new(10.0, 10.0), None)
            .unwrap()
    }

    fn select_ids(engine: &mut SelectionEngine, store: &ElementStore, ids: &[ElementId]) {
        engine.deselect();
        for &id in ids {
            engine.toggle(store, id);
        }
    }

    fn assert_valid(engine: &SelectionEngine, store: &ElementStore) {
        for &id in engine.ids() {
            let element = store.get(id).expect("selected id must exist");
            assert!(!element.locked, "selected element must be unlocked");
        }
    }

    #[test]
    fn test_select_and_toggle() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);

        engine.select(&store, a);
        assert_eq!(engine.ids(), &[a]);
        engine.toggle(&store, b);
        assert_eq!(engine.ids(), &[a, b]);
        engine.toggle(&store, a);
        assert_eq!(engine.ids(), &[b]);
        engine.select(&store, a);
        assert_eq!(engine.ids(), &[a]);
    }

    #[test]
    fn test_locked_elements_cannot_be_selected() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);
        store.update(b, ElementPatch::new().locked(true)).unwrap();

        engine.select(&store, b);
        assert!(engine.is_empty());
        engine.select_all(&store);
        assert_eq!(engine.ids(), &[a]);
        engine.select_in_rect(&store, Rect::new(-5.0, -5.0, 50.0, 50.0), false);
        assert_eq!(engine.ids(), &[a]);
    }

    #[test]
    fn test_select_in_rect_additive() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 100.0, 0.0);

        engine.select(&store, a);
        engine.select_in_rect(&store, Rect::new(95.0, 0.0, 105.0, 5.0), true);
        assert_eq!(engine.ids(), &[a, b]);
        engine.select_in_rect(&store, Rect::new(95.0, 0.0, 105.0, 5.0), false);
        assert_eq!(engine.ids(), &[b]);
    }

    #[test]
    fn test_stale_ids_are_pruned() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);
        select_ids(&mut engine, &store, &[a, b]);

        // Deleted behind the engine's back.
        store.delete(a).unwrap();
        engine.nudge(&mut store, NudgeDirection::Right, NudgeStep::Fine);

        assert_eq!(engine.ids(), &[b]);
        assert_eq!(store.get(b).unwrap().position, Point::new(21.0, 0.0));
    }

    #[test]
    fn test_copy_paste_offset_and_fresh_ids() {
        let (mut store, mut engine) = setup();
        let e = store
            .create(
                ElementKind::StickyNote,
                Point::new(40.0, 60.0),
                Size::new(100.0, 100.0),
                Some("note".into()),
            )
            .unwrap();
        engine.select(&store, e);
        engine.copy(&store);
        assert_eq!(store.len(), 1);

        let pasted = engine.paste(&mut store);
        assert_eq!(pasted.len(), 1);
        let copy = store.get(pasted[0]).unwrap();
        let original = store.get(e).unwrap();
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.content, original.content);
        assert_eq!(copy.kind(), ElementKind::StickyNote);
        assert_eq!(copy.position, Point::new(60.0, 80.0));
        assert_eq!(engine.ids(), pasted.as_slice());
    }

    #[test]
    fn test_repeated_paste_cascades() {
        let (mut store, mut engine) = setup();
        let e = square(&mut store, 0.0, 0.0);
        engine.select(&store, e);
        engine.copy(&store);

        let first = engine.paste(&mut store);
        let second = engine.paste(&mut store);
        assert_eq!(store.get(first[0]).unwrap().position, Point::new(20.0, 20.0));
        assert_eq!(store.get(second[0]).unwrap().position, Point::new(40.0, 40.0));
    }

    #[test]
    fn test_paste_empty_clipboard_is_noop() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        engine.select(&store, a);
        assert!(engine.paste(&mut store).is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(engine.ids(), &[a]);
    }

    #[test]
    fn test_paste_regroups_copied_group() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);
        select_ids(&mut engine, &store, &[a, b]);
        let original_group = engine.group(&mut store).unwrap();
        engine.copy(&store);

        let pasted = engine.paste(&mut store);
        let g1 = store.get(pasted[0]).unwrap().group_id;
        let g2 = store.get(pasted[1]).unwrap().group_id;
        assert!(g1.is_some());
        assert_eq!(g1, g2);
        assert_ne!(g1, Some(original_group));
    }

    #[test]
    fn test_cut_removes_and_fills_clipboard() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        engine.select(&store, a);
        engine.cut(&mut store);

        assert!(store.is_empty());
        assert!(engine.is_empty());
        assert_eq!(engine.clipboard().len(), 1);

        let pasted = engine.paste(&mut store);
        assert_eq!(store.len(), 1);
        assert_ne!(pasted[0], a);
    }

    #[test]
    fn test_empty_selection_ops_are_noops() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let before = store.get(a).unwrap().clone();

        engine.copy(&store);
        engine.cut(&mut store);
        engine.rotate_step(&mut store);
        engine.flip(&mut store, FlipAxis::Vertical);
        engine.nudge(&mut store, NudgeDirection::Down, NudgeStep::Fast);
        assert_eq!(engine.delete(&mut store), 0);
        assert_eq!(engine.lock(&mut store), 0);

        assert!(engine.clipboard().is_empty());
        assert_eq!(store.get(a), Some(&before));
    }

    #[test]
    fn test_delete_clears_selection() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);
        let c = square(&mut store, 40.0, 0.0);
        select_ids(&mut engine, &store, &[a, b]);

        assert_eq!(engine.delete(&mut store), 2);
        assert!(engine.is_empty());
        assert_eq!(store.len(), 1);
        assert!(store.contains(c));
    }

    #[test]
    fn test_group_requires_two() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        engine.select(&store, a);
        assert!(engine.group(&mut store).is_none());
        assert_eq!(store.get(a).unwrap().group_id, None);
    }

    #[test]
    fn test_group_ungroup_round_trip() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);
        select_ids(&mut engine, &store, &[a, b]);

        let group = engine.group(&mut store).unwrap();
        assert_eq!(store.get(a).unwrap().group_id, Some(group));
        assert_eq!(store.get(b).unwrap().group_id, Some(group));

        assert_eq!(engine.ungroup(&mut store), 2);
        assert_eq!(store.get(a).unwrap().group_id, None);
        assert_eq!(store.get(b).unwrap().group_id, None);
    }

    #[test]
    fn test_regroup_moves_element_to_new_group() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);
        let c = square(&mut store, 40.0, 0.0);
        select_ids(&mut engine, &store, &[a, b]);
        let first = engine.group(&mut store).unwrap();

        select_ids(&mut engine, &store, &[b, c]);
        let second = engine.group(&mut store).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.get(b).unwrap().group_id, Some(second));
        assert_eq!(store.get(c).unwrap().group_id, Some(second));
        // `a` alone would be a one-member group.
        assert_eq!(store.get(a).unwrap().group_id, None);
    }

    #[test]
    fn test_lock_empties_selection() {
        let (mut store, mut engine) = setup();
        let ids: Vec<ElementId> = (0..3).map(|i| square(&mut store, i as f64 * 20.0, 0.0)).collect();
        select_ids(&mut engine, &store, &ids);

        assert_eq!(engine.lock(&mut store), 3);
        assert!(engine.is_empty());
        assert!(ids.iter().all(|&id| store.get(id).unwrap().locked));
        assert_valid(&engine, &store);

        // Locked elements ignore move operations.
        engine.select_all(&store);
        assert!(engine.is_empty());

        assert_eq!(engine.unlock(&mut store, &ids[..2]), 2);
        engine.select_all(&store);
        assert_eq!(engine.ids(), &ids[..2]);
    }

    #[test]
    fn test_lock_keeps_group() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 20.0, 0.0);
        select_ids(&mut engine, &store, &[a, b]);
        let group = engine.group(&mut store).unwrap();
        engine.select(&store, a);
        engine.lock(&mut store);
        assert_eq!(store.get(a).unwrap().group_id, Some(group));
    }

    #[test]
    fn test_rotate_normalizes() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        engine.select(&store, a);
        for _ in 0..5 {
            engine.rotate_step(&mut store);
        }
        assert!((store.get(a).unwrap().rotation - 90.0).abs() < f64::EPSILON);
        engine.rotate(&mut store, -180.0);
        assert!((store.get(a).unwrap().rotation - 270.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flip_toggles_without_moving() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 5.0, 5.0);
        engine.select(&store, a);

        engine.flip(&mut store, FlipAxis::Horizontal);
        let e = store.get(a).unwrap();
        assert!(e.flip.horizontal);
        assert!(!e.flip.vertical);
        assert_eq!(e.position, Point::new(5.0, 5.0));

        engine.flip(&mut store, FlipAxis::Horizontal);
        assert!(!store.get(a).unwrap().flip.horizontal);
    }

    #[test]
    fn test_align_left_scenario() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        let b = square(&mut store, 50.0, 0.0);
        select_ids(&mut engine, &store, &[a, b]);

        assert!(engine.align(&mut store, AlignDirection::Left));
        assert!(store.get(a).unwrap().position.x.abs() < f64::EPSILON);
        assert!(store.get(b).unwrap().position.x.abs() < f64::EPSILON);
    }

    #[test]
    fn test_align_is_idempotent() {
        let (mut store, mut engine) = setup();
        let a = store
            .create(ElementKind::Shape, Point::new(5.0, 3.0), Size::new(10.0, 40.0), None)
            .unwrap();
        let b = store
            .create(ElementKind::Shape, Point::new(55.0, 70.0), Size::new(30.0, 20.0), None)
            .unwrap();
        select_ids(&mut engine, &store, &[a, b]);

        for direction in [
            AlignDirection::Left,
            AlignDirection::Center,
            AlignDirection::Right,
            AlignDirection::Top,
            AlignDirection::Middle,
            AlignDirection::Bottom,
        ] {
            engine.align(&mut store, direction);
            let once = (store.get(a).unwrap().position, store.get(b).unwrap().position);
            engine.align(&mut store, direction);
            let twice = (store.get(a).unwrap().position, store.get(b).unwrap().position);
            assert!((once.0 - twice.0).hypot() < 1e-9, "{direction:?}");
            assert!((once.1 - twice.1).hypot() < 1e-9, "{direction:?}");
        }
    }

    #[test]
    fn test_align_moves_only_one_axis() {
        let (mut store, mut engine) = setup();
        let a = store
            .create(ElementKind::Shape, Point::new(0.0, 0.0), Size::new(10.0, 10.0), None)
            .unwrap();
        let b = store
            .create(ElementKind::Shape, Point::new(40.0, 30.0), Size::new(30.0, 10.0), None)
            .unwrap();
        select_ids(&mut engine, &store, &[a, b]);

        engine.align(&mut store, AlignDirection::Right);
        assert_eq!(store.get(a).unwrap().position, Point::new(60.0, 0.0));
        assert_eq!(store.get(b).unwrap().position, Point::new(40.0, 30.0));

        engine.align(&mut store, AlignDirection::Middle);
        // Centers 5 and 35 average to 20.
        assert_eq!(store.get(a).unwrap().position, Point::new(60.0, 15.0));
        assert_eq!(store.get(b).unwrap().position, Point::new(40.0, 15.0));
    }

    #[test]
    fn test_align_requires_two() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 7.0, 7.0);
        engine.select(&store, a);
        assert!(!engine.align(&mut store, AlignDirection::Left));
        assert_eq!(store.get(a).unwrap().position, Point::new(7.0, 7.0));
    }

    #[test]
    fn test_nudge_steps() {
        let (mut store, mut engine) = setup();
        let a = square(&mut store, 0.0, 0.0);
        engine.select(&store, a);

        engine.nudge(&mut store, NudgeDirection::Right, NudgeStep::Fast);
        engine.nudge(&mut store, NudgeDirection::Up, NudgeStep::Fine);
        assert_eq!(store.get(a).unwrap().position, Point::new(10.0, -1.0));
    }

    #[test]
    fn test_selection_stays_valid_through_sequence() {
        let (mut store, mut engine) = setup();
        let ids: Vec<ElementId> = (0..4).map(|i| square(&mut store, i as f64 * 15.0, 0.0)).collect();

        engine.select_all(&store);
        engine.copy(&store);
        engine.paste(&mut store);
        assert_valid(&engine, &store);
        engine.group(&mut store);
        engine.select(&store, ids[0]);
        engine.lock(&mut store);
        assert_valid(&engine, &store);
        engine.select_all(&store);
        engine.toggle(&store, ids[1]);
        store.delete(ids[2]).unwrap();
        engine.align(&mut store, AlignDirection::Top);
        assert_valid(&engine, &store);
        engine.cut(&mut store);
        assert_valid(&engine, &store);
        engine.paste(&mut store);
        assert_valid(&engine, &store);
    }
}
