//! Shared types for the Transformation Framework store
//!
//! This crate contains the data model shared between the state store,
//! the persistence layer and the wasm bridge. The serialized shapes mirror
//! the TypeScript interfaces consumed by the web frontend, so every
//! JS-facing struct uses camelCase field names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod errors;
pub mod state;

pub use errors::{TransformError, TransformResult};
pub use state::{PersistedState, StateChangeDetection, TransformationState, ValidationResult};

/// Minimum animation playback speed multiplier
pub const MIN_ANIMATION_SPEED: f32 = 0.5;

/// Maximum animation playback speed multiplier
pub const MAX_ANIMATION_SPEED: f32 = 2.0;

/// The three fixed transformation axes tracked by the store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Temporal,
    Depth,
    Relational,
}

impl Dimension {
    /// All dimensions, in declaration order
    pub const ALL: [Dimension; 3] = [Dimension::Temporal, Dimension::Depth, Dimension::Relational];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Temporal => "temporal",
            Dimension::Depth => "depth",
            Dimension::Relational => "relational",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Dimension {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temporal" => Ok(Dimension::Temporal),
            "depth" => Ok(Dimension::Depth),
            "relational" => Ok(Dimension::Relational),
            other => Err(TransformError::UnknownDimension {
                id: other.to_string(),
            }),
        }
    }
}

/// Animation playback state for the cube visualization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    Playing,
    #[default]
    Paused,
    Stopped,
}

impl AnimationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationState::Playing => "playing",
            AnimationState::Paused => "paused",
            AnimationState::Stopped => "stopped",
        }
    }
}

/// Whether the user is freely exploring or following the guided sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Explore,
    Guided,
}

impl std::str::FromStr for InteractionMode {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explore" => Ok(InteractionMode::Explore),
            "guided" => Ok(InteractionMode::Guided),
            other => Err(TransformError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// A named milestone within a dimension's progression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransformationPhase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    /// Opaque passthrough for visualization consumers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TransformationPhase {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            completed: false,
            started_at: None,
            completed_at: None,
            metadata: None,
        }
    }
}

/// Per-dimension progression state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionState {
    pub id: Dimension,
    pub active_phase_id: Option<String>,
    /// Fixed membership: only `completed` flags and timestamps mutate at runtime
    pub phases: Vec<TransformationPhase>,
    /// 0-100. Normally derived from phase completion, but the direct
    /// progress setter may override it (see the store documentation).
    pub progress: u8,
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

impl DimensionState {
    pub fn new(id: Dimension, phases: Vec<TransformationPhase>) -> Self {
        Self {
            id,
            active_phase_id: None,
            phases,
            progress: 0,
            is_complete: false,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn phase(&self, phase_id: &str) -> Option<&TransformationPhase> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    pub fn phase_mut(&mut self, phase_id: &str) -> Option<&mut TransformationPhase> {
        self.phases.iter_mut().find(|p| p.id == phase_id)
    }

    pub fn completed_phase_count(&self) -> usize {
        self.phases.iter().filter(|p| p.completed).count()
    }

    /// Progress as derived from phase completion: round(100 * completed / total)
    pub fn derived_progress(&self) -> u8 {
        if self.phases.is_empty() {
            return 0;
        }
        let ratio = self.completed_phase_count() as f64 / self.phases.len() as f64;
        (ratio * 100.0).round() as u8
    }

    /// Clear all progression state back to the pristine default
    pub fn reset(&mut self) {
        self.active_phase_id = None;
        for phase in &mut self.phases {
            phase.completed = false;
            phase.started_at = None;
            phase.completed_at = None;
        }
        self.progress = 0;
        self.is_complete = false;
        self.started_at = None;
        self.completed_at = None;
    }
}

/// The fixed record of per-dimension states. Serializes as a JS-style
/// object keyed by dimension id, matching the frontend store shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub temporal: DimensionState,
    pub depth: DimensionState,
    pub relational: DimensionState,
}

impl Dimensions {
    pub fn get(&self, id: Dimension) -> &DimensionState {
        match id {
            Dimension::Temporal => &self.temporal,
            Dimension::Depth => &self.depth,
            Dimension::Relational => &self.relational,
        }
    }

    pub fn get_mut(&mut self, id: Dimension) -> &mut DimensionState {
        match id {
            Dimension::Temporal => &mut self.temporal,
            Dimension::Depth => &mut self.depth,
            Dimension::Relational => &mut self.relational,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionState> {
        Dimension::ALL.iter().map(move |id| self.get(*id))
    }
}

/// A timestamped scalar observation for the visualization layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransformationData {
    pub id: String,
    pub dimension_id: Dimension,
    pub timestamp: u64,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TransformationData {
    /// Create a data point with a generated id
    pub fn new(dimension_id: Dimension, timestamp: u64, value: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            dimension_id,
            timestamp,
            value,
            metadata: None,
        }
    }

    /// Merge the present fields of a patch into this point
    pub fn apply_patch(&mut self, patch: &TransformationDataPatch) {
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(metadata) = &patch.metadata {
            self.metadata = Some(metadata.clone());
        }
    }
}

/// Partial update for a data point. Identity fields (id, dimension) are
/// fixed at creation; only the observation itself can be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationDataPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_round_trip() {
        for dim in Dimension::ALL {
            let parsed: Dimension = dim.as_str().parse().unwrap();
            assert_eq!(parsed, dim);
        }
        assert!("sideways".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_dimension_serde_lowercase() {
        let json = serde_json::to_string(&Dimension::Relational).unwrap();
        assert_eq!(json, "\"relational\"");
    }

    #[test]
    fn test_derived_progress_rounds() {
        let mut dim = DimensionState::new(
            Dimension::Temporal,
            vec![
                TransformationPhase::new("a", "A", ""),
                TransformationPhase::new("b", "B", ""),
                TransformationPhase::new("c", "C", ""),
            ],
        );
        assert_eq!(dim.derived_progress(), 0);
        dim.phase_mut("a").unwrap().completed = true;
        assert_eq!(dim.derived_progress(), 33);
        dim.phase_mut("b").unwrap().completed = true;
        assert_eq!(dim.derived_progress(), 67);
        dim.phase_mut("c").unwrap().completed = true;
        assert_eq!(dim.derived_progress(), 100);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut dim = DimensionState::new(
            Dimension::Depth,
            vec![TransformationPhase::new("a", "A", "")],
        );
        dim.active_phase_id = Some("a".to_string());
        dim.phase_mut("a").unwrap().completed = true;
        dim.phase_mut("a").unwrap().completed_at = Some(42);
        dim.progress = 100;
        dim.is_complete = true;
        dim.completed_at = Some(42);

        dim.reset();

        assert_eq!(dim.active_phase_id, None);
        assert_eq!(dim.progress, 0);
        assert!(!dim.is_complete);
        assert_eq!(dim.completed_at, None);
        assert!(dim
            .phases
            .iter()
            .all(|p| !p.completed && p.completed_at.is_none()));
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut point = TransformationData {
            id: "a".to_string(),
            dimension_id: Dimension::Depth,
            timestamp: 0,
            value: 10.0,
            metadata: None,
        };
        point.apply_patch(&TransformationDataPatch {
            value: Some(20.0),
            ..Default::default()
        });
        assert_eq!(point.value, 20.0);
        assert_eq!(point.timestamp, 0);
        assert_eq!(point.dimension_id, Dimension::Depth);
    }
}
