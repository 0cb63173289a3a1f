//! The state container and its update operations
//!
//! Every operation is a single synchronous state replacement: the store
//! snapshots the state, applies the mutation, and either commits (logging
//! the change and writing through to storage when a durable field moved)
//! or rolls back to the snapshot if the inner update reported an error.
//! No operation raises to the caller; malformed input is clamped or
//! absorbed, matching the behavior the frontend was built against.

use transformation_shared::{
    AnimationState, Dimension, InteractionMode, PersistedState, TransformError,
    TransformResult, TransformationData, TransformationDataPatch, TransformationState,
    MAX_ANIMATION_SPEED, MIN_ANIMATION_SPEED,
};
use transformation_storage::PersistGate;

fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

pub struct TransformationStore {
    state: TransformationState,
    gate: Option<PersistGate>,
}

impl Default for TransformationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationStore {
    /// In-memory store with the deterministic default state
    pub fn new() -> Self {
        Self {
            state: TransformationState::default(),
            gate: None,
        }
    }

    /// Store with write-through persistence, rehydrated from the gate.
    /// A missing, corrupt or invalid snapshot falls back to defaults.
    pub fn with_storage(gate: PersistGate) -> Self {
        let state = match gate.load::<PersistedState>() {
            Ok(Some(persisted)) => {
                let mut state = TransformationState::default();
                persisted.apply_to(&mut state);
                let validation = state.validate();
                for warning in &validation.warnings {
                    log::warn!("Rehydrated state: {warning}");
                }
                if validation.is_valid {
                    state
                } else {
                    log::warn!(
                        "Discarding invalid persisted state: {:?}",
                        validation.errors
                    );
                    TransformationState::default()
                }
            }
            Ok(None) => TransformationState::default(),
            Err(err) => {
                log::warn!("Failed to rehydrate state, using defaults: {err}");
                TransformationState::default()
            }
        };

        Self {
            state,
            gate: Some(gate),
        }
    }

    /// Read-only view of the full state
    pub fn state(&self) -> &TransformationState {
        &self.state
    }

    // Dimension management

    pub fn select_dimension(&mut self, dimension: Option<Dimension>) {
        self.mutate("select_dimension", |state| {
            state.selected_dimension = dimension;
            Ok(())
        });
    }

    /// Set the active phase reference verbatim. An unknown phase id is
    /// accepted (documented non-invariant); a known phase gets its
    /// startedAt stamped the first time it becomes active.
    pub fn set_active_phase(&mut self, dimension: Dimension, phase_id: Option<&str>) {
        let now = now_millis();
        self.mutate("set_active_phase", |state| {
            let dim = state.dimensions.get_mut(dimension);
            if let Some(id) = phase_id {
                if let Some(phase) = dim.phase_mut(id) {
                    if phase.started_at.is_none() {
                        phase.started_at = Some(now);
                    }
                }
            }
            dim.active_phase_id = phase_id.map(str::to_string);
            Ok(())
        });
    }

    /// Mark a phase completed and recompute the dimension aggregate.
    /// Idempotent on the completed flag and progress value; the phase
    /// completedAt timestamp is re-stamped on repeat calls.
    pub fn complete_phase(&mut self, dimension: Dimension, phase_id: &str) {
        let now = now_millis();
        self.mutate("complete_phase", |state| {
            let dim = state.dimensions.get_mut(dimension);
            let phase = dim
                .phase_mut(phase_id)
                .ok_or_else(|| TransformError::PhaseNotFound {
                    dimension,
                    phase_id: phase_id.to_string(),
                })?;

            phase.completed = true;
            phase.completed_at = Some(now);

            if dim.started_at.is_none() {
                dim.started_at = Some(now);
            }

            let was_complete = dim.is_complete;
            dim.progress = dim.derived_progress();
            dim.is_complete = dim.progress == 100;
            if dim.is_complete && !was_complete {
                dim.completed_at = Some(now);
            }
            Ok(())
        });
    }

    /// Direct progress override, clamped to [0, 100]. Bypasses the
    /// phase-derived computation, so direct and derived progress can
    /// diverge; rehydration validation surfaces the divergence as a
    /// warning.
    pub fn update_dimension_progress(&mut self, dimension: Dimension, progress: i32) {
        let now = now_millis();
        self.mutate("update_dimension_progress", |state| {
            let dim = state.dimensions.get_mut(dimension);
            let clamped = progress.clamp(0, 100) as u8;

            if dim.started_at.is_none() && clamped > 0 {
                dim.started_at = Some(now);
            }

            let was_complete = dim.is_complete;
            dim.progress = clamped;
            dim.is_complete = clamped == 100;
            if dim.is_complete && !was_complete {
                dim.completed_at = Some(now);
            }
            Ok(())
        });
    }

    pub fn reset_dimension(&mut self, dimension: Dimension) {
        self.mutate("reset_dimension", |state| {
            state.dimensions.get_mut(dimension).reset();
            Ok(())
        });
    }

    /// Reset every dimension and clear the selection and data log
    pub fn reset_all_dimensions(&mut self) {
        self.mutate("reset_all_dimensions", |state| {
            for dimension in Dimension::ALL {
                state.dimensions.get_mut(dimension).reset();
            }
            state.selected_dimension = None;
            state.transformation_data.clear();
            state.selected_data_point_id = None;
            Ok(())
        });
    }

    // Animation control. Transitions are unguarded: any state is
    // reachable from any state, and repeat calls are stable fixed points.

    pub fn play_animation(&mut self) {
        self.set_animation_state("play_animation", AnimationState::Playing);
    }

    pub fn pause_animation(&mut self) {
        self.set_animation_state("pause_animation", AnimationState::Paused);
    }

    pub fn stop_animation(&mut self) {
        self.set_animation_state("stop_animation", AnimationState::Stopped);
    }

    fn set_animation_state(&mut self, action: &str, animation_state: AnimationState) {
        self.mutate(action, |state| {
            state.animation_state = animation_state;
            Ok(())
        });
    }

    /// Clamp to [0.5, 2.0]. NaN would pass through `clamp`, so it is
    /// absorbed like any other malformed input.
    pub fn set_animation_speed(&mut self, speed: f32) {
        if speed.is_nan() {
            log::warn!("set_animation_speed absorbed: speed is NaN");
            return;
        }
        self.mutate("set_animation_speed", |state| {
            state.animation_speed = speed.clamp(MIN_ANIMATION_SPEED, MAX_ANIMATION_SPEED);
            Ok(())
        });
    }

    // Interaction

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.mutate("set_interaction_mode", |state| {
            state.interaction_mode = mode;
            Ok(())
        });
    }

    pub fn toggle_ui_visibility(&mut self) {
        self.mutate("toggle_ui_visibility", |state| {
            state.is_ui_visible = !state.is_ui_visible;
            Ok(())
        });
    }

    pub fn toggle_sidebar(&mut self) {
        self.mutate("toggle_sidebar", |state| {
            state.sidebar_open = !state.sidebar_open;
            Ok(())
        });
    }

    pub fn toggle_guide(&mut self) {
        self.mutate("toggle_guide", |state| {
            state.show_guide = !state.show_guide;
            Ok(())
        });
    }

    // Visualization data

    /// Append a data point. Insertion order is preserved and duplicate
    /// ids are not rejected (documented gap; validation warns on them).
    pub fn add_transformation_data(&mut self, point: TransformationData) {
        self.mutate("add_transformation_data", |state| {
            state.transformation_data.push(point);
            Ok(())
        });
    }

    /// Merge a partial update into the first point matching `id`.
    /// Absorbed as a no-op when the id is absent. Identity fields (id,
    /// dimension) are deliberately not patchable; a point keeps them
    /// for life and is only removed by the bulk clear.
    pub fn update_transformation_data(&mut self, id: &str, patch: TransformationDataPatch) {
        self.mutate("update_transformation_data", |state| {
            let point = state
                .transformation_data
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| TransformError::DataPointNotFound { id: id.to_string() })?;
            point.apply_patch(&patch);
            Ok(())
        });
    }

    pub fn clear_transformation_data(&mut self) {
        self.mutate("clear_transformation_data", |state| {
            state.transformation_data.clear();
            state.selected_data_point_id = None;
            Ok(())
        });
    }

    /// Set the selected data point id verbatim, no existence check
    pub fn select_data_point(&mut self, id: Option<&str>) {
        self.mutate("select_data_point", |state| {
            state.selected_data_point_id = id.map(str::to_string);
            Ok(())
        });
    }

    /// Restore the entire state to the deterministic default
    pub fn reset_store(&mut self) {
        self.mutate("reset_store", |state| {
            *state = TransformationState::default();
            Ok(())
        });
    }

    /// Apply a mutation atomically: on error the pre-operation snapshot
    /// is restored and the error is absorbed (logged, not raised). On
    /// success, durable-field changes write through to storage.
    fn mutate<F>(&mut self, action: &str, f: F)
    where
        F: FnOnce(&mut TransformationState) -> TransformResult<()>,
    {
        let before = self.state.clone();
        if let Err(err) = f(&mut self.state) {
            self.state = before;
            log::warn!("{action} absorbed: {err}");
            return;
        }

        let change = self.state.detect_changes_from(&before);
        if change.has_changes() {
            log::debug!("{action}: {}", change.change_summary.join("; "));
        }
        if change.requires_persist {
            self.persist();
        }
    }

    fn persist(&mut self) {
        if let Some(gate) = &mut self.gate {
            let snapshot = PersistedState::from(&self.state);
            if let Err(err) = gate.save(&snapshot) {
                log::warn!("Write-through failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transformation_storage::{MemoryStorage, PersistGate, StorageBackend, STORAGE_KEY};

    #[test]
    fn test_unknown_phase_id_is_absorbed() {
        let mut store = TransformationStore::new();
        store.complete_phase(Dimension::Temporal, "no-such-phase");
        assert_eq!(store.state(), &TransformationState::default());
    }

    #[test]
    fn test_failed_update_rolls_back_whole_state() {
        let mut store = TransformationStore::new();
        store.update_transformation_data("ghost", TransformationDataPatch::default());
        assert_eq!(store.state(), &TransformationState::default());
    }

    #[test]
    fn test_active_phase_set_verbatim_even_when_unknown() {
        let mut store = TransformationStore::new();
        store.set_active_phase(Dimension::Depth, Some("not-a-phase"));
        assert_eq!(
            store.state().dimensions.depth.active_phase_id.as_deref(),
            Some("not-a-phase")
        );
    }

    #[test]
    fn test_active_phase_stamps_started_at_once() {
        let mut store = TransformationStore::new();
        store.set_active_phase(Dimension::Depth, Some("core-values"));
        let first = store.state().dimensions.depth.phase("core-values").unwrap().started_at;
        assert!(first.is_some());

        store.set_active_phase(Dimension::Depth, None);
        store.set_active_phase(Dimension::Depth, Some("core-values"));
        let second = store.state().dimensions.depth.phase("core-values").unwrap().started_at;
        assert_eq!(first, second);
    }

    #[test]
    fn test_dimension_completed_at_stamped_once() {
        let mut store = TransformationStore::new();
        store.update_dimension_progress(Dimension::Relational, 100);
        let stamped = store.state().dimensions.relational.completed_at;
        assert!(stamped.is_some());

        // Dropping below 100 does not clear it; re-reaching does not re-stamp
        store.update_dimension_progress(Dimension::Relational, 50);
        assert_eq!(store.state().dimensions.relational.completed_at, stamped);
        assert!(!store.state().dimensions.relational.is_complete);

        store.update_dimension_progress(Dimension::Relational, 100);
        assert_eq!(store.state().dimensions.relational.completed_at, stamped);
    }

    #[test]
    fn test_volatile_ops_do_not_write_through() {
        let storage = MemoryStorage::new();
        let mut store =
            TransformationStore::with_storage(PersistGate::new(Box::new(storage.clone())));
        assert!(storage.is_empty());

        store.play_animation();
        store.toggle_ui_visibility();
        store.toggle_guide();
        assert!(storage.is_empty());

        store.toggle_sidebar();
        assert_eq!(storage.len(), 1);
        assert!(storage.get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_default() {
        let storage = MemoryStorage::new();
        {
            let mut raw = storage.clone();
            raw.set(STORAGE_KEY, "{definitely not json").unwrap();
        }
        let store = TransformationStore::with_storage(PersistGate::new(Box::new(storage)));
        assert_eq!(store.state(), &TransformationState::default());
    }

    #[test]
    fn test_invalid_snapshot_is_discarded() {
        let storage = MemoryStorage::new();
        {
            let mut state = TransformationState::default();
            state.dimensions.temporal.progress = 50;
            state.dimensions.temporal.is_complete = true;
            let mut gate = PersistGate::new(Box::new(storage.clone()));
            gate.save(&PersistedState::from(&state)).unwrap();
        }
        let store = TransformationStore::with_storage(PersistGate::new(Box::new(storage)));
        assert_eq!(store.state(), &TransformationState::default());
    }

    #[test]
    fn test_dangling_active_phase_survives_rehydration() {
        let storage = MemoryStorage::new();
        {
            let mut store =
                TransformationStore::with_storage(PersistGate::new(Box::new(storage.clone())));
            store.set_active_phase(Dimension::Depth, Some("not-a-phase"));
            store.complete_phase(Dimension::Depth, "surface-awareness");
        }

        let store = TransformationStore::with_storage(PersistGate::new(Box::new(storage)));
        let depth = &store.state().dimensions.depth;
        assert_eq!(depth.progress, 33);
        assert_eq!(depth.completed_phase_count(), 1);
        assert_eq!(depth.active_phase_id.as_deref(), Some("not-a-phase"));
    }
}
