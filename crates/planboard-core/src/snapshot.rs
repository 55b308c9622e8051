//! Board snapshots for the persistence layer.

use crate::camera::Viewport;
use crate::canvas::Canvas;
use crate::config::EngineConfig;
use crate::elements::{CanvasElement, ElementId, is_valid_size};
use crate::error::CanvasError;
use crate::store::ElementStore;
use crate::tools::ToolState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid element: {0}")]
    Element(#[from] CanvasError),
    #[error("Duplicate element id {0}")]
    DuplicateId(ElementId),
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Everything needed to bring a board back: elements (back to front),
/// the view and the tool state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u32,
    pub elements: Vec<CanvasElement>,
    pub viewport: Viewport,
    pub tools: ToolState,
}

impl BoardSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check version, id uniqueness and element geometry.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(element.id()) {
                return Err(SnapshotError::DuplicateId(element.id()));
            }
            if !is_valid_size(element.size) {
                return Err(CanvasError::InvalidGeometry {
                    width: element.size.width,
                    height: element.size.height,
                }
                .into());
            }
        }
        Ok(())
    }
}

impl Canvas {
    /// Capture the board for saving.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            version: SNAPSHOT_VERSION,
            elements: self.store().ordered().cloned().collect(),
            viewport: self.viewport().clone(),
            tools: self.tool_state().clone(),
        }
    }

    /// Build a canvas from a saved snapshot.
    ///
    /// Zoom bounds come from `config`; the saved zoom is clamped to them.
    pub fn from_snapshot(config: EngineConfig, snapshot: BoardSnapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;

        let mut viewport = Viewport::from_config(&config.viewport);
        viewport.set_zoom(snapshot.viewport.zoom());
        viewport.pan = snapshot.viewport.pan;

        let mut store = ElementStore::new();
        let count = snapshot.elements.len();
        store.replace_all(snapshot.elements);

        let mut tools = snapshot.tools;
        tools.panel_open = false;

        log::info!("Restored board with {} element(s)", count);
        Ok(Self::from_parts(config, store, viewport, tools))
    }

    /// Replace this board's contents with a snapshot, keeping the config.
    ///
    /// Selection and undo history are cleared. On error the board is left
    /// untouched.
    pub fn restore(&mut self, snapshot: BoardSnapshot) -> Result<(), SnapshotError> {
        let restored = Self::from_snapshot(self.config().clone(), snapshot)?;
        let size = self.viewport_size();
        *self = restored;
        self.set_viewport_size(size);
        Ok(())
    }
}
