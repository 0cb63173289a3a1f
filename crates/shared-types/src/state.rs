//! Store state structures mirroring the frontend transformation store
//!
//! `TransformationState` is the full in-memory state; `PersistedState` is
//! the durable subset written through to local storage. Keeping the split
//! as two types (rather than an ad-hoc field list at the persistence call
//! site) makes the durable/volatile boundary auditable.

use serde::{Deserialize, Serialize};

use crate::{
    AnimationState, Dimension, DimensionState, Dimensions, InteractionMode, TransformationData,
    TransformationPhase, MAX_ANIMATION_SPEED, MIN_ANIMATION_SPEED,
};

/// Complete store state, camelCase to match the frontend shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransformationState {
    // Dimension tracking
    pub selected_dimension: Option<Dimension>,
    pub dimensions: Dimensions,

    // Animation control
    pub animation_state: AnimationState,
    pub animation_speed: f32,

    // User interaction
    pub interaction_mode: InteractionMode,
    pub is_ui_visible: bool,

    // Visualization data
    pub transformation_data: Vec<TransformationData>,
    pub selected_data_point_id: Option<String>,

    // Layout
    pub sidebar_open: bool,
    pub show_guide: bool,
}

fn default_dimensions() -> Dimensions {
    Dimensions {
        temporal: DimensionState::new(
            Dimension::Temporal,
            vec![
                TransformationPhase::new(
                    "past-reflection",
                    "Past Reflection",
                    "Understanding your personal history",
                ),
                TransformationPhase::new(
                    "present-awareness",
                    "Present Awareness",
                    "Current state assessment",
                ),
                TransformationPhase::new("future-vision", "Future Vision", "Envisioning your goals"),
            ],
        ),
        depth: DimensionState::new(
            Dimension::Depth,
            vec![
                TransformationPhase::new(
                    "surface-awareness",
                    "Surface Awareness",
                    "Identifying surface behaviors",
                ),
                TransformationPhase::new(
                    "core-values",
                    "Core Values",
                    "Discovering underlying values",
                ),
                TransformationPhase::new("integration", "Integration", "Integrating insights"),
            ],
        ),
        relational: DimensionState::new(
            Dimension::Relational,
            vec![
                TransformationPhase::new(
                    "self-connection",
                    "Self Connection",
                    "Building self-awareness",
                ),
                TransformationPhase::new(
                    "others-connection",
                    "Others Connection",
                    "Improving interpersonal relationships",
                ),
                TransformationPhase::new(
                    "systems-alignment",
                    "Systems Alignment",
                    "Aligning with broader systems",
                ),
            ],
        ),
    }
}

impl Default for TransformationState {
    fn default() -> Self {
        Self {
            selected_dimension: None,
            dimensions: default_dimensions(),
            animation_state: AnimationState::Paused,
            animation_speed: 1.0,
            interaction_mode: InteractionMode::Explore,
            is_ui_visible: true,
            transformation_data: Vec::new(),
            selected_data_point_id: None,
            sidebar_open: true,
            show_guide: false,
        }
    }
}

/// Store validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Detailed change detection result
#[derive(Debug, Clone, PartialEq)]
pub struct StateChangeDetection {
    pub selection_changed: bool,
    pub dimensions_changed: bool,
    pub animation_changed: bool,
    pub interaction_changed: bool,
    pub data_changed: bool,
    pub layout_changed: bool,
    /// True iff a field from the durable subset changed
    pub requires_persist: bool,
    pub requires_render: bool,
    pub change_summary: Vec<String>,
}

impl StateChangeDetection {
    pub fn has_changes(&self) -> bool {
        self.requires_render
    }
}

impl TransformationState {
    /// Validate the state structure, typically after rehydration.
    /// Divergence between direct and phase-derived progress is legal
    /// (both update pathways exist) and only warns.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for dim in self.dimensions.iter() {
            if dim.progress > 100 {
                errors.push(format!(
                    "Dimension {} progress out of range: {}",
                    dim.id, dim.progress
                ));
            }

            if dim.is_complete != (dim.progress == 100) {
                errors.push(format!(
                    "Dimension {} isComplete inconsistent with progress {}",
                    dim.id, dim.progress
                ));
            }

            if dim.phases.is_empty() {
                errors.push(format!("Dimension {} has no phases", dim.id));
            }

            // Unknown active phase ids are accepted verbatim by the
            // store, so a dangling reference is legal persisted state
            if let Some(active) = &dim.active_phase_id {
                if dim.phase(active).is_none() {
                    warnings.push(format!(
                        "Dimension {} active phase does not exist: {}",
                        dim.id, active
                    ));
                }
            }

            if dim.progress != dim.derived_progress() {
                warnings.push(format!(
                    "Dimension {} progress {} diverges from phase-derived {}",
                    dim.id,
                    dim.progress,
                    dim.derived_progress()
                ));
            }
        }

        if !(MIN_ANIMATION_SPEED..=MAX_ANIMATION_SPEED).contains(&self.animation_speed) {
            warnings.push(format!(
                "Animation speed {} outside [{MIN_ANIMATION_SPEED}, {MAX_ANIMATION_SPEED}]",
                self.animation_speed
            ));
        }

        // Duplicate data point ids are accepted but worth surfacing
        let mut seen = std::collections::HashSet::new();
        for point in &self.transformation_data {
            if !seen.insert(point.id.as_str()) {
                warnings.push(format!("Duplicate data point id: {}", point.id));
            }
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Detect what changed relative to a previous snapshot
    pub fn detect_changes_from(&self, previous: &TransformationState) -> StateChangeDetection {
        let mut change_summary = Vec::new();

        let selection_changed = self.selected_dimension != previous.selected_dimension
            || self.selected_data_point_id != previous.selected_data_point_id;
        if self.selected_dimension != previous.selected_dimension {
            change_summary.push(format!(
                "Selected dimension: {:?} -> {:?}",
                previous.selected_dimension, self.selected_dimension
            ));
        }

        let dimensions_changed = self.dimensions != previous.dimensions;
        if dimensions_changed {
            for dim in Dimension::ALL {
                if self.dimensions.get(dim) != previous.dimensions.get(dim) {
                    change_summary.push(format!(
                        "Dimension {dim}: progress {} -> {}",
                        previous.dimensions.get(dim).progress,
                        self.dimensions.get(dim).progress
                    ));
                }
            }
        }

        let animation_changed = self.animation_state != previous.animation_state
            || self.animation_speed != previous.animation_speed;
        if animation_changed {
            change_summary.push(format!(
                "Animation: {:?} x{} -> {:?} x{}",
                previous.animation_state,
                previous.animation_speed,
                self.animation_state,
                self.animation_speed
            ));
        }

        let interaction_changed = self.interaction_mode != previous.interaction_mode;
        if interaction_changed {
            change_summary.push(format!(
                "Interaction mode: {:?} -> {:?}",
                previous.interaction_mode, self.interaction_mode
            ));
        }

        let data_changed = self.transformation_data != previous.transformation_data;
        if data_changed {
            change_summary.push(format!(
                "Data points: {} -> {}",
                previous.transformation_data.len(),
                self.transformation_data.len()
            ));
        }

        let layout_changed = self.is_ui_visible != previous.is_ui_visible
            || self.sidebar_open != previous.sidebar_open
            || self.show_guide != previous.show_guide;
        if layout_changed {
            change_summary.push("Layout toggled".to_string());
        }

        let requires_render = selection_changed
            || dimensions_changed
            || animation_changed
            || interaction_changed
            || data_changed
            || layout_changed;

        StateChangeDetection {
            selection_changed,
            dimensions_changed,
            animation_changed,
            interaction_changed,
            data_changed,
            layout_changed,
            requires_persist: PersistedState::from(self) != PersistedState::from(previous),
            requires_render,
            change_summary,
        }
    }
}

/// The durable subset of the store state. Everything else
/// (animation playback, UI visibility, guide overlay, data point
/// selection) is intentionally volatile and reverts to defaults on
/// rehydration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub selected_dimension: Option<Dimension>,
    pub dimensions: Dimensions,
    pub animation_speed: f32,
    pub interaction_mode: InteractionMode,
    pub transformation_data: Vec<TransformationData>,
    pub sidebar_open: bool,
}

impl From<&TransformationState> for PersistedState {
    fn from(state: &TransformationState) -> Self {
        Self {
            selected_dimension: state.selected_dimension,
            dimensions: state.dimensions.clone(),
            animation_speed: state.animation_speed,
            interaction_mode: state.interaction_mode,
            transformation_data: state.transformation_data.clone(),
            sidebar_open: state.sidebar_open,
        }
    }
}

impl PersistedState {
    /// Overlay the durable fields onto a state, leaving volatile fields alone
    pub fn apply_to(self, state: &mut TransformationState) {
        state.selected_dimension = self.selected_dimension;
        state.dimensions = self.dimensions;
        state.animation_speed = self.animation_speed;
        state.interaction_mode = self.interaction_mode;
        state.transformation_data = self.transformation_data;
        state.sidebar_open = self.sidebar_open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_shape() {
        let state = TransformationState::default();
        assert_eq!(state.selected_dimension, None);
        assert_eq!(state.animation_state, AnimationState::Paused);
        assert_eq!(state.animation_speed, 1.0);
        assert_eq!(state.interaction_mode, InteractionMode::Explore);
        assert!(state.is_ui_visible);
        assert!(state.sidebar_open);
        assert!(!state.show_guide);
        assert!(state.transformation_data.is_empty());
        for dim in state.dimensions.iter() {
            assert_eq!(dim.phases.len(), 3);
            assert_eq!(dim.progress, 0);
            assert!(!dim.is_complete);
        }
        assert_eq!(
            state.dimensions.temporal.phases[0].id,
            "past-reflection".to_string()
        );
    }

    #[test]
    fn test_default_state_is_valid() {
        let result = TransformationState::default().validate();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_accepts_dangling_active_phase_with_warning() {
        let mut state = TransformationState::default();
        state.dimensions.temporal.active_phase_id = Some("no-such-phase".to_string());
        let result = state.validate();
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("no-such-phase")));
    }

    #[test]
    fn test_validate_rejects_inconsistent_completion_flag() {
        let mut state = TransformationState::default();
        state.dimensions.temporal.progress = 50;
        state.dimensions.temporal.is_complete = true;
        let result = state.validate();
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("isComplete"));
    }

    #[test]
    fn test_validate_warns_on_progress_divergence() {
        let mut state = TransformationState::default();
        // Direct setter pathway: progress without any completed phase
        state.dimensions.depth.progress = 40;
        let result = state.validate();
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("diverges")));
    }

    #[test]
    fn test_detect_changes_drives_persistence() {
        let previous = TransformationState::default();

        let mut state = previous.clone();
        state.animation_state = AnimationState::Playing;
        let change = state.detect_changes_from(&previous);
        assert!(change.animation_changed);
        assert!(change.requires_render);
        // Playback state is volatile
        assert!(!change.requires_persist);

        let mut state = previous.clone();
        state.sidebar_open = false;
        let change = state.detect_changes_from(&previous);
        assert!(change.layout_changed);
        assert!(change.requires_persist);

        let change = previous.clone().detect_changes_from(&previous);
        assert!(!change.has_changes());
        assert!(!change.requires_persist);
    }

    #[test]
    fn test_persisted_round_trip() {
        let mut state = TransformationState::default();
        state.selected_dimension = Some(Dimension::Depth);
        state.animation_speed = 1.5;
        state.show_guide = true;
        state.animation_state = AnimationState::Playing;

        let json = serde_json::to_string(&PersistedState::from(&state)).unwrap();
        let restored: PersistedState = serde_json::from_str(&json).unwrap();

        let mut fresh = TransformationState::default();
        restored.apply_to(&mut fresh);

        assert_eq!(fresh.selected_dimension, Some(Dimension::Depth));
        assert_eq!(fresh.animation_speed, 1.5);
        // Volatile fields fall back to defaults
        assert!(!fresh.show_guide);
        assert_eq!(fresh.animation_state, AnimationState::Paused);
    }
}
