//! Transformation UI state store
//!
//! Single source of truth for the transformation-tracking UI: dimension
//! progress, animation playback, interaction mode and the visualization
//! data log. Views read through [`selectors`] and route every mutation
//! through [`TransformationStore`] operations; a durable subset of the
//! state writes through to local storage after each change.

pub mod selectors;
mod store;

pub use store::TransformationStore;
