//! Canvas element definitions.

mod style;

pub use style::ElementStyle;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Unique identifier for element groups.
pub type GroupId = Uuid;

/// The closed set of element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Text,
    Shape,
    StickyNote,
    Timeline,
    MindMap,
    /// Rich element produced by uploads and smart tools.
    SmartElement,
}

impl ElementKind {
    /// Size used when an element is placed with a single click.
    pub fn default_size(self) -> Size {
        match self {
            ElementKind::Text => Size::new(200.0, 40.0),
            ElementKind::Shape => Size::new(120.0, 120.0),
            ElementKind::StickyNote => Size::new(160.0, 160.0),
            ElementKind::Timeline => Size::new(480.0, 120.0),
            ElementKind::MindMap => Size::new(240.0, 160.0),
            ElementKind::SmartElement => Size::new(320.0, 200.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Shape => "shape",
            ElementKind::StickyNote => "sticky-note",
            ElementKind::Timeline => "timeline",
            ElementKind::MindMap => "mind-map",
            ElementKind::SmartElement => "smart-element",
        }
    }
}

/// Mirror state of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Axis selector for flip operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Whether a size is usable for an element.
pub fn is_valid_size(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

/// Normalize an angle in degrees into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// A single piece of editable content on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    /// Top-left corner in world coordinates.
    pub position: Point,
    /// Always strictly positive; enforced by the store.
    pub size: Size,
    /// Text payload, meaning depends on `kind`.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Rotation in degrees around the center, in [0, 360).
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub flip: Flip,
}

impl CanvasElement {
    pub(crate) fn new(kind: ElementKind, position: Point, size: Size, content: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            size,
            content,
            style: ElementStyle::default(),
            locked: false,
            group_id: None,
            rotation: 0.0,
            flip: Flip::default(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Copy of this element under a fresh id.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// The unrotated rectangle occupied by the element.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Axis-aligned bounding box in world coordinates, accounting for rotation.
    pub fn bounds(&self) -> Rect {
        let rect = self.rect();
        if self.rotation.abs() < f64::EPSILON {
            return rect;
        }

        let rot = Affine::rotate_about(self.rotation.to_radians(), rect.center());
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        let rotated: Vec<Point> = corners.iter().map(|&p| rot * p).collect();

        let min_x = rotated.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = rotated.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = rotated.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = rotated.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Rect::new(min_x, min_y, max_x, max_y)
    }

    /// Check if a world point lies on the element's rotated rectangle.
    pub fn hit_test(&self, point: Point) -> bool {
        let rect = self.rect();
        let local = if self.rotation.abs() < f64::EPSILON {
            point
        } else {
            Affine::rotate_about(-self.rotation.to_radians(), rect.center()) * point
        };
        local.x >= rect.x0 && local.x <= rect.x1 && local.y >= rect.y0 && local.y <= rect.y1
    }

    /// Check if the bounding box overlaps `rect` (touching counts).
    pub fn intersects(&self, rect: Rect) -> bool {
        let bounds = self.bounds();
        let rect = rect.abs();
        bounds.x0 <= rect.x1 && bounds.x1 >= rect.x0 && bounds.y0 <= rect.y1 && bounds.y1 >= rect.y0
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// Partial update for an element. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    /// `Some(None)` clears the content.
    pub content: Option<Option<String>>,
    /// Merged into the existing style bag.
    pub style: Option<ElementStyle>,
    pub locked: Option<bool>,
    pub group_id: Option<Option<GroupId>>,
    pub rotation: Option<f64>,
    pub flip: Option<Flip>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn content(mut self, content: Option<String>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn group_id(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn flip(mut self, flip: Flip) -> Self {
        self.flip = Some(flip);
        self
    }

    /// Size the element would have after applying this patch.
    pub(crate) fn resulting_size(&self, element: &CanvasElement) -> Size {
        self.size.unwrap_or(element.size)
    }

    pub(crate) fn apply(self, element: &mut CanvasElement) {
        if let Some(position) = self.position {
            element.position = position;
        }
        if let Some(size) = self.size {
            element.size = size;
        }
        if let Some(content) = self.content {
            element.content = content;
        }
        if let Some(style) = self.style {
            element.style.merge(&style);
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }
        if let Some(group_id) = self.group_id {
            element.group_id = group_id;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = normalize_degrees(rotation);
        }
        if let Some(flip) = self.flip {
            element.flip = flip;
        }
    }
}
