//! Tool system for the board.

mod panel;

pub use panel::{PanelControl, PanelDescriptor, panel_config};

use crate::elements::ElementKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Available tools.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    SmartPen,
    Zoom,
    Hand,
    Upload,
    Comment,
    Text,
    Shape,
    StickyNote,
    Timeline,
    MindMap,
    SmartElement,
}

impl ToolKind {
    pub const ALL: [ToolKind; 12] = [
        ToolKind::Select,
        ToolKind::SmartPen,
        ToolKind::Zoom,
        ToolKind::Hand,
        ToolKind::Upload,
        ToolKind::Comment,
        ToolKind::Text,
        ToolKind::Shape,
        ToolKind::StickyNote,
        ToolKind::Timeline,
        ToolKind::MindMap,
        ToolKind::SmartElement,
    ];

    /// Name shown in the toolbar and in tool-change notices.
    pub fn display_name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::SmartPen => "Smart Pen",
            ToolKind::Zoom => "Zoom",
            ToolKind::Hand => "Hand",
            ToolKind::Upload => "Upload",
            ToolKind::Comment => "Comment",
            ToolKind::Text => "Text",
            ToolKind::Shape => "Shape",
            ToolKind::StickyNote => "Sticky Note",
            ToolKind::Timeline => "Timeline",
            ToolKind::MindMap => "Mind Map",
            ToolKind::SmartElement => "Smart Element",
        }
    }

    /// Single-letter shortcut (lowercase).
    pub fn shortcut(self) -> char {
        match self {
            ToolKind::Select => 'v',
            ToolKind::SmartPen => 'p',
            ToolKind::Zoom => 'z',
            ToolKind::Hand => 'h',
            ToolKind::Upload => 'u',
            ToolKind::Comment => 'c',
            ToolKind::Text => 't',
            ToolKind::Shape => 's',
            ToolKind::StickyNote => 'n',
            ToolKind::Timeline => 'l',
            ToolKind::MindMap => 'm',
            ToolKind::SmartElement => 'e',
        }
    }

    /// Look up a tool by its shortcut letter, ignoring case.
    pub fn from_shortcut(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        Self::ALL.into_iter().find(|tool| tool.shortcut() == c)
    }

    /// The element kind a click with this tool commits, if any.
    pub fn creates(self) -> Option<ElementKind> {
        match self {
            ToolKind::Text => Some(ElementKind::Text),
            ToolKind::Shape => Some(ElementKind::Shape),
            ToolKind::StickyNote => Some(ElementKind::StickyNote),
            ToolKind::Timeline => Some(ElementKind::Timeline),
            ToolKind::MindMap => Some(ElementKind::MindMap),
            ToolKind::SmartElement => Some(ElementKind::SmartElement),
            ToolKind::Select
            | ToolKind::SmartPen
            | ToolKind::Zoom
            | ToolKind::Hand
            | ToolKind::Upload
            | ToolKind::Comment => None,
        }
    }

    /// Parameters a tool starts with the first time it is used.
    pub fn default_parameters(self) -> ToolParameters {
        match self {
            ToolKind::SmartPen => ToolParameters::Pen {
                mode: PenMode::default(),
                line_width: 2.0,
            },
            ToolKind::Zoom => ToolParameters::Zoom { step_percent: 10.0 },
            // Sticky notes are usually placed in batches.
            ToolKind::StickyNote => ToolParameters::Placement(PlacementParameters {
                stay_active: true,
                ..PlacementParameters::default()
            }),
            tool if tool.creates().is_some() => {
                ToolParameters::Placement(PlacementParameters::default())
            }
            _ => ToolParameters::None,
        }
    }
}

/// Drawing mode of the smart pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PenMode {
    #[default]
    Freehand,
    /// Strokes are recognized into shapes by the ink collaborator.
    Smart,
    Highlighter,
}

impl PenMode {
    pub const ALL: [PenMode; 3] = [PenMode::Freehand, PenMode::Smart, PenMode::Highlighter];
}

/// Settings for tools that place elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParameters {
    /// Keep the tool active after placing an element instead of
    /// switching back to select.
    pub stay_active: bool,
    pub snap_to_grid: bool,
    pub grid_size: f64,
}

impl Default for PlacementParameters {
    fn default() -> Self {
        Self {
            stay_active: false,
            snap_to_grid: false,
            grid_size: crate::snap::GRID_SIZE,
        }
    }
}

/// Per-tool settings, kept across tool switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ToolParameters {
    None,
    Pen { mode: PenMode, line_width: f64 },
    Zoom { step_percent: f64 },
    Placement(PlacementParameters),
}

/// Serializable tool state: the active tool and every tool's parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolState {
    /// Currently selected tool.
    pub active: ToolKind,
    /// Parameters customized during the session. Tools missing here use
    /// their defaults.
    #[serde(default)]
    parameters: BTreeMap<ToolKind, ToolParameters>,
    /// Whether the active tool's options panel is open.
    #[serde(default)]
    pub panel_open: bool,
}

impl ToolState {
    /// Parameters for `tool`, falling back to its defaults.
    pub fn parameters(&self, tool: ToolKind) -> ToolParameters {
        self.parameters
            .get(&tool)
            .cloned()
            .unwrap_or_else(|| tool.default_parameters())
    }

    pub fn parameters_mut(&mut self, tool: ToolKind) -> &mut ToolParameters {
        self.parameters
            .entry(tool)
            .or_insert_with(|| tool.default_parameters())
    }

    /// Placement settings for a content tool.
    pub fn placement(&self, tool: ToolKind) -> Option<PlacementParameters> {
        match self.parameters(tool) {
            ToolParameters::Placement(p) => Some(p),
            _ => None,
        }
    }
}

/// A finished smart-pen stroke handed to the ink collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Points in world coordinates.
    pub points: Vec<Point>,
    pub mode: PenMode,
    pub line_width: f64,
}

/// Minimum world distance between recorded stroke points.
const STROKE_MIN_DISTANCE: f64 = 1.0;

/// Manages the current tool, its parameters and in-progress strokes.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    state: ToolState,
    /// Accumulated points for the smart pen.
    stroke_points: Vec<Point>,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ToolState) -> Self {
        Self {
            state,
            stroke_points: Vec::new(),
        }
    }

    pub fn active(&self) -> ToolKind {
        self.state.active
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Switch tools. Returns false if `tool` was already active.
    ///
    /// Closes the tool panel and drops any unfinished stroke; parameters
    /// are left as the user last set them.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if self.state.active == tool {
            return false;
        }
        log::debug!("Tool {:?} -> {:?}", self.state.active, tool);
        self.state.active = tool;
        self.state.panel_open = false;
        self.stroke_points.clear();
        true
    }

    pub fn parameters(&self, tool: ToolKind) -> ToolParameters {
        self.state.parameters(tool)
    }

    /// Replace a tool's parameters.
    pub fn set_parameters(&mut self, tool: ToolKind, parameters: ToolParameters) {
        *self.state.parameters_mut(tool) = parameters;
    }

    pub fn set_panel_open(&mut self, open: bool) {
        self.state.panel_open = open;
    }

    pub fn toggle_panel(&mut self) {
        self.state.panel_open = !self.state.panel_open;
    }

    /// Start recording a pen stroke.
    pub fn begin_stroke(&mut self, point: Point) {
        self.stroke_points.clear();
        self.stroke_points.push(point);
    }

    /// Add a point to the current stroke.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(last) = self.stroke_points.last() else {
            return;
        };
        if last.distance(point) >= STROKE_MIN_DISTANCE {
            self.stroke_points.push(point);
        }
    }

    pub fn is_stroking(&self) -> bool {
        !self.stroke_points.is_empty()
    }

    /// End the current stroke. Strokes need at least two points.
    pub fn finish_stroke(&mut self) -> Option<Stroke> {
        let points = std::mem::take(&mut self.stroke_points);
        if points.len() < 2 {
            return None;
        }
        let (mode, line_width) = match self.state.parameters(ToolKind::SmartPen) {
            ToolParameters::Pen { mode, line_width } => (mode, line_width),
            _ => (PenMode::default(), 2.0),
        };
        Some(Stroke {
            points,
            mode,
            line_width,
        })
    }

    /// Cancel the current stroke.
    pub fn cancel_stroke(&mut self) {
        self.stroke_points.clear();
    }
}
