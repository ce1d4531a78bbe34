//! # Graphics Module
//!
//! Everything the part tree needs from the graphics side, kept behind narrow
//! boundaries:
//!
//! - **Geometry** ([`geometry`]) - Immutable triangle meshes and primitives
//! - **Render handles** ([`handle`]) - One actor: shared mesh plus color/visibility
//! - **Engine contracts** ([`render_engine`]) - [`RenderEngine`] and [`GeometryParser`]
//! - **File formats** ([`formats`]) - STL and OBJ decoding
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use partview::gfx::{ActorRegistry, GeometryParser, MeshParser, RenderEngine};
//!
//! let handle = MeshParser::new().parse(Path::new("part.stl")).unwrap();
//! let mut engine = ActorRegistry::new();
//! engine.add_actor(&handle);
//! engine.request_redraw();
//! ```

pub mod formats;
pub mod geometry;
pub mod handle;
pub mod render_engine;

// Re-export commonly used types
pub use formats::MeshParser;
pub use geometry::{Bounds, MeshData};
pub use handle::{ActorId, RenderHandle, Rgb};
pub use render_engine::{ActorRegistry, GeometryParser, RenderEngine, SceneStatistics};
