//! WASM bridge for the Transformation Framework store
//!
//! The JavaScript-facing surface: wraps the state store over browser
//! localStorage and exposes its operation set and read projections to
//! the hosting web app. Browser-only; on other targets this crate
//! compiles to nothing.

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
pub use app::TransformationApp;
