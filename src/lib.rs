// src/lib.rs
//! partview
//!
//! A hierarchical part tree for 3D scenes. Parts are named, coloured and
//! independently visible; leaf parts carry geometry loaded from STL or OBJ
//! files on worker threads. A render engine's actor set is kept in step with
//! the tree.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod loader;
pub mod logging;
pub mod prelude;
pub mod status;
pub mod sync;
pub mod tree;

// Re-export main types for convenience
pub use app::PartViewApp;
pub use config::AppConfig;

/// Creates a headless app with the default configuration and an in-memory engine
pub fn default() -> Result<PartViewApp<gfx::ActorRegistry>, error::LoaderError> {
    PartViewApp::with_engine(&AppConfig::default(), gfx::ActorRegistry::new())
}
