//! # partview Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use partview::prelude::*;
//!
//! fn main() -> Result<(), LoaderError> {
//!     let mut app = partview::default()?;
//!     let group = app.insert_group("Assembly", None);
//!     app.load_files(["bracket.stl", "bolt.obj"], Some(group));
//!     app.wait_for_loads();
//!
//!     for message in app.drain_status() {
//!         println!("{}", message.text);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export core application types
pub use crate::app::PartViewApp;
pub use crate::config::AppConfig;
pub use crate::default;
pub use crate::status::{StatusBar, StatusMessage};

// Re-export the tree model
pub use crate::tree::{Column, PartData, PartIndex, PartNode, PartTree, PartValue, TreeEvent, TreeObserver};

// Re-export graphics boundaries
pub use crate::gfx::{ActorRegistry, GeometryParser, MeshData, MeshParser, RenderEngine, RenderHandle, Rgb};
pub use crate::sync::{propagate, SceneSync};

// Re-export errors
pub use crate::error::{ConfigError, GeometryLoadError, IndexError, LoaderError, ParseRgbError, StructuralError};
