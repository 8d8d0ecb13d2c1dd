//! Editor configuration.

use serde::Deserialize;

/// Tunables for tools and history. Every field has a default, so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo depth per history scope. Oldest entries are evicted.
    pub history_depth: usize,

    /// Scope key of the map-editing undo timeline.
    pub history_key: String,

    /// Extra pixels added to the style-derived hit tolerance.
    pub hit_tolerance_px: f64,

    /// Distance in pixels within which drawing and vertex edits snap onto
    /// existing vertices.
    pub snap_tolerance_px: f64,

    /// Segments used to approximate circles drawn with the circle tool.
    pub circle_segments: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 100,
            history_key: "map-editing".to_string(),
            hit_tolerance_px: 5.0,
            snap_tolerance_px: 10.0,
            circle_segments: 64,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns the serde error if the input is not valid JSON or a field
    /// has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
