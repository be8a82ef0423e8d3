//! Scenario actions

use serde::{Deserialize, Serialize};

/// One step of a scripted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioAction {
    // === EDITING ===
    /// Stamp the current brush once
    Paint { x: i32, y: i32 },

    /// Drag the current brush between two points
    PaintLine { from: (i32, i32), to: (i32, i32) },

    /// Write a rectangle of cells directly (inclusive bounds). Skips the
    /// shop and earns nothing; meant for level setup.
    FillRect {
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
        particle: String,
    },

    SetBrushRadius { radius: u32 },

    /// Select the brush by particle name ("eraser" clears)
    SelectBrush { particle: String },

    /// Clear every particle, or only the named type
    ClearAll {
        #[serde(default)]
        particle: Option<String>,
    },

    // === ECONOMY ===
    Buy { particle: String },

    GiveMoney { amount: f64 },

    /// Wipe money and unlocks
    ClearMoney,

    StartEvent { name: String, duration: f32 },

    // === TIME ===
    /// Run exact ticks
    Tick { count: u32 },

    /// Feed real time through the fixed-timestep clock
    Advance { seconds: f32 },

    // === OUTPUT ===
    /// Log per-type particle counts
    PrintCounts,

    /// Write a PNG of the grid
    Snapshot { path: String },

    Log { message: String },
}
