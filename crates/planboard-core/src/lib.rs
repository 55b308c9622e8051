//! Planboard Core Library
//!
//! Platform-agnostic editing engine for the planning board: elements,
//! viewport transform, selection operations, tool modes and keyboard
//! shortcut routing.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod elements;
pub mod error;
pub mod input;
pub mod selection;
pub mod shortcuts;
pub mod snap;
pub mod snapshot;
pub mod store;
pub mod tools;

pub use camera::Viewport;
pub use canvas::{Canvas, CanvasAction};
pub use config::{ConfigError, EngineConfig};
pub use elements::{CanvasElement, ElementId, ElementKind, ElementPatch, ElementStyle, Flip, FlipAxis, GroupId};
pub use error::{CanvasError, CanvasResult};
pub use input::{FocusTarget, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use selection::{AlignDirection, NudgeDirection, NudgeStep, SelectionEngine};
pub use shortcuts::{KeyOutcome, ShortcutCommand, ShortcutRegistry, ShortcutRouter, ShortcutTarget, ToolNotice};
pub use snap::{GRID_SIZE, snap_to_grid};
pub use snapshot::{BoardSnapshot, SnapshotError};
pub use store::ElementStore;
pub use tools::{PanelDescriptor, PenMode, ToolKind, ToolParameters, ToolState, panel_config};
