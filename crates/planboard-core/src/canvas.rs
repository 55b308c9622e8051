//! The editing canvas: store, viewport, tools and selection wired together.

use crate::camera::Viewport;
use crate::config::EngineConfig;
use crate::elements::{CanvasElement, ElementId, ElementKind, ElementPatch, FlipAxis, GroupId, is_valid_size};
use crate::error::{CanvasError, CanvasResult};
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::selection::{AlignDirection, NudgeDirection, NudgeStep, SelectionEngine};
use crate::shortcuts::{ShortcutCommand, ShortcutTarget};
use crate::snap::snap_rect_to_grid;
use crate::store::ElementStore;
use crate::tools::{PanelDescriptor, Stroke, ToolKind, ToolManager, ToolParameters, ToolState, panel_config};
use kurbo::{Point, Rect, Size, Vec2};

/// Zoom change per screen pixel of vertical drag with the zoom tool.
const DRAG_ZOOM_PER_PIXEL: f64 = 0.5;
/// Zoom change per unit of Ctrl+scroll delta.
const SCROLL_ZOOM_PER_UNIT: f64 = 0.1;

/// Something the host or an external collaborator must react to.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// A content tool committed a new element.
    ElementCreated(ElementId),
    /// The tool switched on its own, e.g. back to select after a placement.
    ToolChanged(ToolKind),
    /// Upload tool click; answer with [`Canvas::place_upload`].
    UploadRequested { position: Point },
    /// Comment tool click at a world position.
    CommentRequested { position: Point },
    /// A smart-pen stroke for the ink collaborator.
    StrokeFinished(Stroke),
}

/// What a pressed pointer is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureKind {
    Pan,
    /// Select tool, pressed on an element.
    Move { hit: ElementId, toggled: bool, moved: bool },
    /// Select tool, pressed on empty canvas.
    BoxSelect { additive: bool },
    Place(ToolKind),
    Zoom { start_zoom: f64 },
    Stroke,
    /// Upload and comment: only the release position matters.
    Click(ToolKind),
}

/// Pointer gesture in progress (screen coordinates).
#[derive(Debug, Clone, Copy)]
struct Gesture {
    kind: GestureKind,
    button: MouseButton,
    modifiers: Modifiers,
    start: Point,
    last: Point,
    /// Set once the pointer has travelled past the drag threshold.
    dragging: bool,
}

/// Runtime canvas state.
#[derive(Debug, Clone)]
pub struct Canvas {
    store: ElementStore,
    viewport: Viewport,
    tools: ToolManager,
    selection: SelectionEngine,
    viewport_size: Size,
    config: EngineConfig,
    gesture: Option<Gesture>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create an empty canvas with default settings.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            store: ElementStore::new(),
            viewport: Viewport::from_config(&config.viewport),
            tools: ToolManager::new(),
            selection: SelectionEngine::new(config.selection.clone()),
            viewport_size: Size::new(800.0, 600.0),
            config,
            gesture: None,
        }
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        store: ElementStore,
        viewport: Viewport,
        tools: ToolState,
    ) -> Self {
        let mut canvas = Self::with_config(config);
        canvas.store = store;
        canvas.viewport = viewport;
        canvas.tools = ToolManager::with_state(tools);
        canvas
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Set the on-screen size of the canvas.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0)
    }

    // --- Tools ---

    pub fn active_tool(&self) -> ToolKind {
        self.tools.active()
    }

    pub fn tool_state(&self) -> &ToolState {
        self.tools.state()
    }

    /// Panel description for the active tool.
    pub fn panel(&self) -> PanelDescriptor {
        panel_config(self.tools.state())
    }

    pub fn toggle_panel(&mut self) {
        self.tools.toggle_panel();
    }

    pub fn set_tool_parameters(&mut self, tool: ToolKind, parameters: ToolParameters) {
        self.tools.set_parameters(tool, parameters);
    }

    /// Switch tools. Leaving select clears the selection; switching to the
    /// active tool does nothing. Returns whether the tool changed.
    pub fn set_active_tool(&mut self, tool: ToolKind) -> bool {
        let previous = self.tools.active();
        if !self.tools.set_tool(tool) {
            return false;
        }
        if previous == ToolKind::Select {
            self.selection.deselect();
        }
        self.gesture = None;
        true
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ElementId] {
        self.selection.ids()
    }

    /// The selected elements, for the inspector.
    pub fn selected_elements(&self) -> Vec<&CanvasElement> {
        self.selection.resolved(&self.store)
    }

    pub fn clipboard(&self) -> &[CanvasElement] {
        self.selection.clipboard()
    }

    pub fn select(&mut self, id: ElementId) {
        self.selection.select(&self.store, id);
    }

    pub fn toggle_selection(&mut self, id: ElementId) {
        self.selection.toggle(&self.store, id);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.store);
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
    }

    /// Prune the selection and report whether anything is left to act on.
    fn has_selection(&mut self, min: usize) -> bool {
        self.selection.prune(&self.store);
        self.selection.len() >= min
    }

    pub fn copy(&mut self) {
        self.selection.copy(&self.store);
    }

    pub fn cut(&mut self) {
        if self.has_selection(1) {
            self.store.push_undo();
            self.selection.cut(&mut self.store);
        }
    }

    pub fn paste(&mut self) -> Vec<ElementId> {
        if self.selection.clipboard().is_empty() {
            return Vec::new();
        }
        self.store.push_undo();
        self.selection.paste(&mut self.store)
    }

    pub fn delete_selected(&mut self) -> usize {
        if !self.has_selection(1) {
            return 0;
        }
        self.store.push_undo();
        self.selection.delete(&mut self.store)
    }

    pub fn group_selected(&mut self) -> Option<GroupId> {
        if !self.has_selection(2) {
            return None;
        }
        self.store.push_undo();
        self.selection.group(&mut self.store)
    }

    pub fn ungroup_selected(&mut self) -> usize {
        let grouped = self
            .selected_elements()
            .iter()
            .any(|e| e.group_id.is_some());
        if !grouped {
            return 0;
        }
        self.store.push_undo();
        self.selection.ungroup(&mut self.store)
    }

    pub fn lock_selected(&mut self) -> usize {
        if !self.has_selection(1) {
            return 0;
        }
        self.store.push_undo();
        self.selection.lock(&mut self.store)
    }

    /// Unlock specific elements.
    pub fn unlock(&mut self, ids: &[ElementId]) -> usize {
        let any_locked = ids
            .iter()
            .any(|&id| self.store.get(id).is_some_and(|e| e.locked));
        if !any_locked {
            return 0;
        }
        self.store.push_undo();
        self.selection.unlock(&mut self.store, ids)
    }

    /// Unlock every locked element on the board.
    pub fn unlock_all(&mut self) -> usize {
        let locked: Vec<ElementId> = self
            .store
            .query(|e| e.locked)
            .map(CanvasElement::id)
            .collect();
        self.unlock(&locked)
    }

    /// Rotate the selection by the configured step.
    pub fn rotate_selected(&mut self) {
        if self.has_selection(1) {
            self.store.push_undo();
            self.selection.rotate_step(&mut self.store);
        }
    }

    pub fn rotate_selected_by(&mut self, degrees: f64) {
        if self.has_selection(1) && degrees.is_finite() {
            self.store.push_undo();
            self.selection.rotate(&mut self.store, degrees);
        }
    }

    pub fn flip_selected(&mut self, axis: FlipAxis) {
        if self.has_selection(1) {
            self.store.push_undo();
            self.selection.flip(&mut self.store, axis);
        }
    }

    pub fn align_selected(&mut self, direction: AlignDirection) -> bool {
        if !self.has_selection(2) {
            return false;
        }
        self.store.push_undo();
        self.selection.align(&mut self.store, direction)
    }

    pub fn nudge_selected(&mut self, direction: NudgeDirection, step: NudgeStep) {
        if self.has_selection(1) {
            self.store.push_undo();
            self.selection.nudge(&mut self.store, direction, step);
        }
    }

    // --- Elements ---

    /// Create an element directly, outside of any tool.
    pub fn create_element(
        &mut self,
        kind: ElementKind,
        position: Point,
        size: Size,
        content: Option<String>,
    ) -> CanvasResult<ElementId> {
        if !is_valid_size(size) {
            // The store reports the rejection; no undo point for a no-op.
            return self.store.create(kind, position, size, content);
        }
        self.store.push_undo();
        self.store.create(kind, position, size, content)
    }

    /// Write back an edit from the inspector.
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> CanvasResult<()> {
        let element = self.store.get(id).ok_or(CanvasError::NotFound(id))?;
        let size = patch.resulting_size(element);
        if !is_valid_size(size) {
            return Err(CanvasError::InvalidGeometry {
                width: size.width,
                height: size.height,
            });
        }
        self.store.push_undo();
        self.store.update(id, patch)?;
        self.selection.prune(&self.store);
        Ok(())
    }

    pub fn delete_element(&mut self, id: ElementId) -> CanvasResult<CanvasElement> {
        if !self.store.contains(id) {
            return Err(CanvasError::NotFound(id));
        }
        self.store.push_undo();
        let removed = self.store.delete(id)?;
        self.selection.prune(&self.store);
        Ok(removed)
    }

    /// Place the result of an upload as a smart element at `position`.
    pub fn place_upload(
        &mut self,
        position: Point,
        size: Size,
        content: Option<String>,
    ) -> CanvasResult<ElementId> {
        let id = self.create_element(ElementKind::SmartElement, position, size, content)?;
        log::debug!("Placed upload {} at ({}, {})", id, position.x, position.y);
        Ok(id)
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.store.push_undo();
        self.store.bring_to_front(id)
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.store.push_undo();
        self.store.send_to_back(id)
    }

    pub fn undo(&mut self) -> bool {
        let done = self.store.undo();
        self.selection.prune(&self.store);
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.store.redo();
        self.selection.prune(&self.store);
        done
    }

    // --- Viewport ---

    /// Fit all unlocked elements into the viewport. No-op on an empty board.
    pub fn fit_to_screen(&mut self) {
        if let Some(bounds) = self.store.bounds(|e| !e.locked) {
            self.viewport
                .fit_to_bounds(bounds, self.viewport_size, self.config.viewport.fit_padding);
        }
    }

    /// Step the zoom in around the viewport center.
    pub fn zoom_in(&mut self) {
        let center = self.viewport_center();
        self.viewport.zoom_in(center);
    }

    pub fn zoom_out(&mut self) {
        let center = self.viewport_center();
        self.viewport.zoom_out(center);
    }

    pub fn set_zoom(&mut self, percent: f64) {
        let center = self.viewport_center();
        self.viewport.zoom_at(center, percent);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    // --- Pointer input ---

    /// The world rectangle of an in-progress box selection or placement drag.
    pub fn drag_rect(&self) -> Option<Rect> {
        let gesture = self.gesture.as_ref()?;
        match gesture.kind {
            GestureKind::BoxSelect { .. } | GestureKind::Place(_) if gesture.dragging => {
                Some(self.world_rect(gesture.start, gesture.last))
            }
            _ => None,
        }
    }

    fn world_rect(&self, a: Point, b: Point) -> Rect {
        Rect::from_points(self.viewport.screen_to_world(a), self.viewport.screen_to_world(b))
    }

    /// Drop any in-progress gesture.
    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
        self.tools.cancel_stroke();
    }

    /// Press and release at the same screen position.
    pub fn click(&mut self, position: Point, modifiers: Modifiers) -> Vec<CanvasAction> {
        let mut actions = self.handle_pointer(PointerEvent::Down {
            position,
            button: MouseButton::Left,
            modifiers,
        });
        actions.extend(self.handle_pointer(PointerEvent::Up {
            position,
            button: MouseButton::Left,
            modifiers,
        }));
        actions
    }

    /// Feed a pointer event in screen coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<CanvasAction> {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                self.pointer_down(position, button, modifiers);
                Vec::new()
            }
            PointerEvent::Move { position } => {
                self.pointer_move(position);
                Vec::new()
            }
            PointerEvent::Up {
                position, button, ..
            } => self.pointer_up(position, button),
            PointerEvent::Scroll {
                position,
                delta,
                modifiers,
            } => {
                self.scroll(position, delta, modifiers);
                Vec::new()
            }
        }
    }

    fn pointer_down(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        if self.gesture.is_some() {
            return;
        }
        let kind = match button {
            MouseButton::Middle => GestureKind::Pan,
            MouseButton::Right => return,
            MouseButton::Left => match self.left_press_kind(position, modifiers) {
                Some(kind) => kind,
                None => return,
            },
        };
        self.gesture = Some(Gesture {
            kind,
            button,
            modifiers,
            start: position,
            last: position,
            dragging: false,
        });
    }

    fn left_press_kind(&mut self, position: Point, modifiers: Modifiers) -> Option<GestureKind> {
        let world = self.viewport.screen_to_world(position);
        let tool = self.tools.active();
        let kind = match tool {
            ToolKind::Select => match self.store.element_at(world) {
                Some(hit) => {
                    let toggled = modifiers.shift || modifiers.command();
                    if toggled {
                        self.selection.toggle(&self.store, hit);
                    } else if !self.selection.contains(hit) {
                        self.selection.select(&self.store, hit);
                    }
                    GestureKind::Move {
                        hit,
                        toggled,
                        moved: false,
                    }
                }
                None => GestureKind::BoxSelect {
                    additive: modifiers.shift,
                },
            },
            ToolKind::Hand => GestureKind::Pan,
            ToolKind::Zoom => GestureKind::Zoom {
                start_zoom: self.viewport.zoom(),
            },
            ToolKind::SmartPen => {
                self.tools.begin_stroke(world);
                GestureKind::Stroke
            }
            ToolKind::Upload | ToolKind::Comment => GestureKind::Click(tool),
            _ if tool.creates().is_some() => GestureKind::Place(tool),
            _ => return None,
        };
        Some(kind)
    }

    fn pointer_move(&mut self, position: Point) {
        let Some(mut gesture) = self.gesture else {
            return;
        };
        if !gesture.dragging
            && gesture.start.distance(position) >= self.config.selection.drag_threshold
        {
            gesture.dragging = true;
        }

        if gesture.dragging {
            let delta = position - gesture.last;
            match &mut gesture.kind {
                GestureKind::Pan => self.viewport.pan_by_screen(delta),
                GestureKind::Move { toggled, moved, .. } => {
                    // A toggle-click only edits the selection.
                    if !*toggled {
                        if !*moved {
                            self.store.push_undo();
                            *moved = true;
                        }
                        let world_delta = delta / self.viewport.scale();
                        self.selection.translate(&mut self.store, world_delta);
                    }
                }
                GestureKind::Zoom { start_zoom } => {
                    // Dragging up zooms in.
                    let percent = *start_zoom - (position.y - gesture.start.y) * DRAG_ZOOM_PER_PIXEL;
                    self.viewport.zoom_at(gesture.start, percent);
                }
                GestureKind::Stroke => {
                    let world = self.viewport.screen_to_world(position);
                    self.tools.extend_stroke(world);
                }
                GestureKind::BoxSelect { .. } | GestureKind::Place(_) | GestureKind::Click(_) => {}
            }
        }

        gesture.last = position;
        self.gesture = Some(gesture);
    }

    fn pointer_up(&mut self, position: Point, button: MouseButton) -> Vec<CanvasAction> {
        let Some(gesture) = self.gesture else {
            return Vec::new();
        };
        if gesture.button != button {
            return Vec::new();
        }
        self.pointer_move(position);
        let Some(gesture) = self.gesture.take() else {
            return Vec::new();
        };
        let world = self.viewport.screen_to_world(position);

        match gesture.kind {
            GestureKind::Pan => Vec::new(),
            GestureKind::Move {
                hit,
                toggled,
                moved,
            } => {
                if !toggled && !moved {
                    self.selection.select(&self.store, hit);
                }
                Vec::new()
            }
            GestureKind::BoxSelect { additive } => {
                if gesture.dragging {
                    let rect = self.world_rect(gesture.start, position);
                    self.selection.select_in_rect(&self.store, rect, additive);
                } else if !additive {
                    self.selection.deselect();
                }
                Vec::new()
            }
            GestureKind::Place(tool) => self.commit_placement(tool, &gesture, position),
            GestureKind::Zoom { .. } => {
                if !gesture.dragging {
                    let step = match self.tools.parameters(ToolKind::Zoom) {
                        ToolParameters::Zoom { step_percent } => step_percent,
                        _ => self.config.viewport.zoom_step,
                    };
                    let target = if gesture.modifiers.alt {
                        self.viewport.zoom() - step
                    } else {
                        self.viewport.zoom() + step
                    };
                    self.viewport.zoom_at(position, target);
                }
                Vec::new()
            }
            GestureKind::Stroke => self
                .tools
                .finish_stroke()
                .map(CanvasAction::StrokeFinished)
                .into_iter()
                .collect(),
            GestureKind::Click(ToolKind::Upload) => {
                vec![CanvasAction::UploadRequested { position: world }]
            }
            GestureKind::Click(_) => vec![CanvasAction::CommentRequested { position: world }],
        }
    }

    /// Commit an element for a content tool at the end of a press.
    fn commit_placement(
        &mut self,
        tool: ToolKind,
        gesture: &Gesture,
        position: Point,
    ) -> Vec<CanvasAction> {
        let Some(kind) = tool.creates() else {
            return Vec::new();
        };
        let placement = self.tools.state().placement(tool).unwrap_or_default();

        let mut rect = if gesture.dragging {
            self.world_rect(gesture.start, position)
        } else {
            let origin = self.viewport.screen_to_world(gesture.start);
            Rect::from_origin_size(origin, kind.default_size())
        };
        if placement.snap_to_grid {
            rect = snap_rect_to_grid(rect, placement.grid_size);
        }
        if !is_valid_size(rect.size()) {
            // A drag can collapse to a line; fall back to the default size.
            rect = Rect::from_origin_size(rect.origin(), kind.default_size());
        }

        let id = match self.create_element(kind, rect.origin(), rect.size(), None) {
            Ok(id) => id,
            Err(err) => {
                log::warn!("Could not place {}: {}", kind.name(), err);
                return Vec::new();
            }
        };
        log::debug!("{} tool placed {}", tool.display_name(), id);

        let mut actions = vec![CanvasAction::ElementCreated(id)];
        if !placement.stay_active {
            self.set_active_tool(ToolKind::Select);
            self.selection.select(&self.store, id);
            actions.push(CanvasAction::ToolChanged(ToolKind::Select));
        }
        actions
    }

    fn scroll(&mut self, position: Point, delta: Vec2, modifiers: Modifiers) {
        if modifiers.command() {
            let percent = self.viewport.zoom() - delta.y * SCROLL_ZOOM_PER_UNIT;
            self.viewport.zoom_at(position, percent);
        } else {
            self.viewport.pan_by_screen(-delta);
        }
    }
}

impl ShortcutTarget for Canvas {
    fn active_tool(&self) -> ToolKind {
        self.tools.active()
    }

    fn selection_is_empty(&self) -> bool {
        self.selection.resolved(&self.store).is_empty()
    }

    fn apply_shortcut(&mut self, command: ShortcutCommand) {
        match command {
            ShortcutCommand::SwitchTool(tool) => {
                self.set_active_tool(tool);
            }
            ShortcutCommand::Copy => self.copy(),
            ShortcutCommand::Cut => self.cut(),
            ShortcutCommand::Paste => {
                self.paste();
            }
            ShortcutCommand::SelectAll => self.select_all(),
            ShortcutCommand::Group => {
                self.group_selected();
            }
            ShortcutCommand::Ungroup => {
                self.ungroup_selected();
            }
            ShortcutCommand::Undo => {
                self.undo();
            }
            ShortcutCommand::Redo => {
                self.redo();
            }
            ShortcutCommand::ZoomIn => self.zoom_in(),
            ShortcutCommand::ZoomOut => self.zoom_out(),
            ShortcutCommand::FitToScreen => self.fit_to_screen(),
            ShortcutCommand::Nudge(direction, step) => self.nudge_selected(direction, step),
            ShortcutCommand::Delete => {
                self.delete_selected();
            }
            ShortcutCommand::Deselect => {
                self.cancel_gesture();
                self.deselect();
            }
        }
    }
}
