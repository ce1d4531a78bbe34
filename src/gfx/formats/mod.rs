//! # Geometry File Formats
//!
//! Default [`GeometryParser`] implementation. Dispatches on the file extension:
//!
//! - `.stl` - binary or ASCII STL ([`stl`])
//! - `.obj` - Wavefront OBJ via `tobj` ([`obj`])

pub mod obj;
pub mod stl;

use std::path::Path;
use std::sync::Arc;

use crate::error::GeometryLoadError;

use super::handle::RenderHandle;
use super::render_engine::GeometryParser;

/// Decodes STL and OBJ files from disk into render handles
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshParser;

impl MeshParser {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryParser for MeshParser {
    fn parse(&self, path: &Path) -> Result<RenderHandle, GeometryLoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let mesh = match extension.as_str() {
            "stl" => stl::read(path)?,
            "obj" => obj::read(path)?,
            _ => {
                return Err(GeometryLoadError::UnsupportedFormat(
                    path.display().to_string(),
                ))
            }
        };

        if mesh.is_empty() {
            return Err(GeometryLoadError::EmptyGeometry(path.to_path_buf()));
        }

        log::debug!(
            "parsed {}: {} triangles, {} vertices",
            path.display(),
            mesh.triangle_count(),
            mesh.vertex_count()
        );

        Ok(RenderHandle::new(Arc::new(mesh)))
    }
}
