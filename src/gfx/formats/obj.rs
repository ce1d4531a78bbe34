//! Wavefront OBJ loading via `tobj`

use std::path::Path;

use crate::error::GeometryLoadError;
use crate::gfx::geometry::MeshData;

/// Loads every model in an OBJ file into a single mesh
///
/// Materials are ignored: a part's color comes from the tree, not the file.
pub fn read(path: &Path) -> Result<MeshData, GeometryLoadError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| match source {
        tobj::LoadError::OpenFileFailed => GeometryLoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "could not open file"),
        },
        source => GeometryLoadError::Obj {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut merged = MeshData::new();

    for model in &models {
        let mesh = &model.mesh;
        let base = merged.vertices.len() as u32;
        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();

        // Use normals from the file if available, otherwise calculate them
        let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
            mesh.normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect()
        } else {
            MeshData::calculate_face_normals(&positions, &mesh.indices)
        };

        merged.vertices.extend(positions);
        merged.normals.extend(normals);
        merged.indices.extend(mesh.indices.iter().map(|i| i + base));
    }

    log::trace!(
        "OBJ {} merged {} models into {} triangles",
        path.display(),
        models.len(),
        merged.triangle_count()
    );

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_two_objects_are_merged() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        write!(
            file,
            "o first\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
             o second\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n"
        )
        .unwrap();
        file.flush().unwrap();

        let mesh = read(file.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.normals.len(), 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_missing_file() {
        let err = read(Path::new("/definitely/not/here.obj")).unwrap_err();
        assert!(matches!(err, GeometryLoadError::Io { .. }));
    }
}
