use std::str::FromStr;

use wasm_bindgen::prelude::*;

use transformation_shared::{
    Dimension, InteractionMode, TransformationData, TransformationDataPatch,
};
use transformation_storage::{LocalStorage, MemoryStorage, PersistGate};
use transformation_store::{selectors, TransformationStore};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn parse_dimension(id: &str) -> Result<Dimension, JsValue> {
    Dimension::from_str(id).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// JS handle to the transformation store. All mutations route through
/// here; reads come back as JSON snapshots the frontend deserializes
/// into its own store shape.
#[wasm_bindgen]
pub struct TransformationApp {
    store: TransformationStore,
}

impl Default for TransformationApp {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl TransformationApp {
    /// Store over localStorage, rehydrated from a previous session.
    /// Falls back to a memory backend when localStorage is unavailable
    /// (private browsing, storage disabled).
    #[wasm_bindgen(constructor)]
    pub fn new() -> TransformationApp {
        use transformation_storage::StorageBackend;

        let mut probe = LocalStorage::new();
        let gate = match probe.set("transformation-store-probe", "1") {
            Ok(()) => {
                let _ = probe.remove("transformation-store-probe");
                PersistGate::new(Box::new(LocalStorage::new()))
            }
            Err(err) => {
                log::warn!("localStorage unavailable, state will not persist: {err}");
                PersistGate::new(Box::new(MemoryStorage::new()))
            }
        };

        TransformationApp {
            store: TransformationStore::with_storage(gate),
        }
    }

    // Dimension management

    pub fn select_dimension(&mut self, dimension: Option<String>) -> Result<(), JsValue> {
        let dimension = dimension.as_deref().map(parse_dimension).transpose()?;
        self.store.select_dimension(dimension);
        Ok(())
    }

    pub fn set_active_phase(
        &mut self,
        dimension: &str,
        phase_id: Option<String>,
    ) -> Result<(), JsValue> {
        let dimension = parse_dimension(dimension)?;
        self.store.set_active_phase(dimension, phase_id.as_deref());
        Ok(())
    }

    pub fn complete_phase(&mut self, dimension: &str, phase_id: &str) -> Result<(), JsValue> {
        let dimension = parse_dimension(dimension)?;
        self.store.complete_phase(dimension, phase_id);
        Ok(())
    }

    pub fn update_dimension_progress(
        &mut self,
        dimension: &str,
        progress: i32,
    ) -> Result<(), JsValue> {
        let dimension = parse_dimension(dimension)?;
        self.store.update_dimension_progress(dimension, progress);
        Ok(())
    }

    pub fn reset_dimension(&mut self, dimension: &str) -> Result<(), JsValue> {
        let dimension = parse_dimension(dimension)?;
        self.store.reset_dimension(dimension);
        Ok(())
    }

    pub fn reset_all_dimensions(&mut self) {
        self.store.reset_all_dimensions();
    }

    // Animation control

    pub fn play_animation(&mut self) {
        self.store.play_animation();
    }

    pub fn pause_animation(&mut self) {
        self.store.pause_animation();
    }

    pub fn stop_animation(&mut self) {
        self.store.stop_animation();
    }

    pub fn set_animation_speed(&mut self, speed: f32) {
        self.store.set_animation_speed(speed);
    }

    pub fn animation_state(&self) -> String {
        self.store.state().animation_state.as_str().to_string()
    }

    pub fn animation_speed(&self) -> f32 {
        selectors::animation(self.store.state()).speed
    }

    // Interaction

    pub fn set_interaction_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode =
            InteractionMode::from_str(mode).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.store.set_interaction_mode(mode);
        Ok(())
    }

    pub fn toggle_ui_visibility(&mut self) {
        self.store.toggle_ui_visibility();
    }

    pub fn toggle_sidebar(&mut self) {
        self.store.toggle_sidebar();
    }

    pub fn toggle_guide(&mut self) {
        self.store.toggle_guide();
    }

    // Visualization data

    /// Record a data point for a dimension, stamped now. Returns the
    /// generated point id.
    pub fn add_data_point(&mut self, dimension: &str, value: f64) -> Result<String, JsValue> {
        let dimension = parse_dimension(dimension)?;
        let timestamp = chrono::Utc::now().timestamp_millis() as u64;
        let point = TransformationData::new(dimension, timestamp, value);
        let id = point.id.clone();
        self.store.add_transformation_data(point);
        Ok(id)
    }

    pub fn update_data_point_value(&mut self, id: &str, value: f64) {
        self.store.update_transformation_data(
            id,
            TransformationDataPatch {
                value: Some(value),
                ..Default::default()
            },
        );
    }

    pub fn clear_data_points(&mut self) {
        self.store.clear_transformation_data();
    }

    pub fn select_data_point(&mut self, id: Option<String>) {
        self.store.select_data_point(id.as_deref());
    }

    pub fn reset_store(&mut self) {
        self.store.reset_store();
    }

    // Read projections

    /// Full state snapshot as JSON, in the frontend store shape
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.store.state()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn dimension_json(&self, dimension: &str) -> Result<String, JsValue> {
        let dimension = parse_dimension(dimension)?;
        serde_json::to_string(selectors::dimension(self.store.state(), dimension))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn dimension_progress(&self, dimension: &str) -> Result<u8, JsValue> {
        let dimension = parse_dimension(dimension)?;
        Ok(selectors::dimension_progress(self.store.state(), dimension))
    }

    pub fn overall_progress(&self) -> u8 {
        selectors::overall_progress(self.store.state())
    }

    /// Ids of dimensions with any progress
    pub fn active_dimensions(&self) -> js_sys::Array {
        let ids = js_sys::Array::new();
        for dimension in selectors::active_dimensions(self.store.state()) {
            ids.push(&JsValue::from_str(dimension.as_str()));
        }
        ids
    }
}
