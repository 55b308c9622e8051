//! Panel descriptions for the active tool.
//!
//! The view layer renders whatever `panel_config` returns; nothing here
//! knows about widgets.

use super::{PenMode, ToolKind, ToolParameters, ToolState};
use serde::Serialize;

/// Line width range offered by the pen panel.
const LINE_WIDTH_RANGE: (f64, f64) = (1.0, 48.0);

/// One control in a tool panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "kebab-case")]
pub enum PanelControl {
    PenMode {
        selected: PenMode,
        options: Vec<PenMode>,
    },
    LineWidth {
        value: f64,
        min: f64,
        max: f64,
    },
    ZoomStep {
        percent: f64,
    },
    StayActive {
        enabled: bool,
    },
    SnapToGrid {
        enabled: bool,
        grid_size: f64,
    },
    FileDrop,
    CommentComposer,
    Hint {
        text: &'static str,
    },
}

/// What the panel for a tool should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDescriptor {
    pub tool: ToolKind,
    pub title: &'static str,
    pub shortcut: char,
    pub open: bool,
    pub controls: Vec<PanelControl>,
}

/// Describe the panel for the active tool.
pub fn panel_config(state: &ToolState) -> PanelDescriptor {
    let tool = state.active;
    let mut controls = match state.parameters(tool) {
        ToolParameters::Pen { mode, line_width } => vec![
            PanelControl::PenMode {
                selected: mode,
                options: PenMode::ALL.to_vec(),
            },
            PanelControl::LineWidth {
                value: line_width,
                min: LINE_WIDTH_RANGE.0,
                max: LINE_WIDTH_RANGE.1,
            },
        ],
        ToolParameters::Zoom { step_percent } => vec![PanelControl::ZoomStep {
            percent: step_percent,
        }],
        ToolParameters::Placement(p) => vec![
            PanelControl::StayActive {
                enabled: p.stay_active,
            },
            PanelControl::SnapToGrid {
                enabled: p.snap_to_grid,
                grid_size: p.grid_size,
            },
        ],
        ToolParameters::None => Vec::new(),
    };

    match tool {
        ToolKind::Select => controls.push(PanelControl::Hint {
            text: "Click to select, drag to box-select",
        }),
        ToolKind::Hand => controls.push(PanelControl::Hint {
            text: "Drag to pan the board",
        }),
        ToolKind::Upload => controls.push(PanelControl::FileDrop),
        ToolKind::Comment => controls.push(PanelControl::CommentComposer),
        _ => {}
    }

    PanelDescriptor {
        tool,
        title: tool.display_name(),
        shortcut: tool.shortcut(),
        open: state.panel_open,
        controls,
    }
}
