//! Pure read-only projections over the store state
//!
//! Counterparts of the frontend selector hooks: side-effect free, cheap
//! enough to call on every render, and value-stable for unchanged state.

use transformation_shared::{
    AnimationState, Dimension, DimensionState, InteractionMode, TransformationData,
    TransformationState,
};

/// Combined animation playback view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationView {
    pub state: AnimationState,
    pub speed: f32,
}

pub fn selected_dimension(state: &TransformationState) -> Option<Dimension> {
    state.selected_dimension
}

pub fn dimension(state: &TransformationState, id: Dimension) -> &DimensionState {
    state.dimensions.get(id)
}

pub fn dimension_progress(state: &TransformationState, id: Dimension) -> u8 {
    state.dimensions.get(id).progress
}

pub fn animation(state: &TransformationState) -> AnimationView {
    AnimationView {
        state: state.animation_state,
        speed: state.animation_speed,
    }
}

pub fn interaction_mode(state: &TransformationState) -> InteractionMode {
    state.interaction_mode
}

pub fn transformation_data(state: &TransformationState) -> &[TransformationData] {
    &state.transformation_data
}

/// The selected data point, joined against the collection. None when
/// nothing is selected or the selected id does not resolve.
pub fn selected_data_point(state: &TransformationState) -> Option<&TransformationData> {
    let id = state.selected_data_point_id.as_deref()?;
    state.transformation_data.iter().find(|p| p.id == id)
}

/// Dimensions with any progress, in declaration order
pub fn active_dimensions(state: &TransformationState) -> Vec<Dimension> {
    Dimension::ALL
        .into_iter()
        .filter(|id| state.dimensions.get(*id).progress > 0)
        .collect()
}

/// Rounded mean progress across the three dimensions
pub fn overall_progress(state: &TransformationState) -> u8 {
    let total: u32 = state
        .dimensions
        .iter()
        .map(|dim| dim.progress as u32)
        .sum();
    ((total as f64 / Dimension::ALL.len() as f64).round()) as u8
}

/// (completed, total) phase counts for a dimension, as rendered on the
/// dimension cards
pub fn completed_phase_count(state: &TransformationState, id: Dimension) -> (usize, usize) {
    let dim = state.dimensions.get(id);
    (dim.completed_phase_count(), dim.phases.len())
}
