//! # Mesh Geometry
//!
//! Immutable triangle geometry shared between render handles, plus procedural
//! primitives used for the floor actor and test fixtures.
//!
//! ## Usage
//!
//! ```rust
//! use partview::gfx::geometry::{generate_cube, MeshData};
//!
//! let cube = generate_cube();
//! assert_eq!(cube.triangle_count(), 12);
//!
//! let bounds = cube.bounds().unwrap();
//! assert_eq!(bounds.size().x, 1.0);
//! ```

pub mod primitives;

pub use primitives::*;

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

/// Triangle mesh data decoded from a geometry file or generated procedurally
///
/// Once wrapped in a [`RenderHandle`](crate::gfx::handle::RenderHandle) the data
/// is shared read-only through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z), one per vertex
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Build a mesh from positions and indices, computing smooth vertex normals
    pub fn from_triangles(vertices: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let normals = Self::calculate_face_normals(&vertices, &indices);
        Self {
            vertices,
            normals,
            indices,
        }
    }

    /// Get the number of vertices in this mesh
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned bounds of all vertices, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let (first, rest) = self.vertices.split_first()?;
        let mut min = Point3::from(*first);
        let mut max = min;

        for v in rest {
            min.x = min.x.min(v[0]);
            min.y = min.y.min(v[1]);
            min.z = min.z.min(v[2]);
            max.x = max.x.max(v[0]);
            max.y = max.y.max(v[1]);
            max.z = max.z.max(v[2]);
        }

        Some(Bounds { min, max })
    }

    /// Averages the face normals of every triangle touching a vertex
    ///
    /// Triangles referencing out-of-range vertices are skipped. Vertices with
    /// no (or only degenerate) triangles keep a zero normal.
    pub fn calculate_face_normals(vertices: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); vertices.len()];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
                continue;
            }

            let v0 = Vector3::from(vertices[i0]);
            let v1 = Vector3::from(vertices[i1]);
            let v2 = Vector3::from(vertices[i2]);

            let face_normal = (v1 - v0).cross(v2 - v0);
            for idx in [i0, i1, i2] {
                sums[idx] += face_normal;
            }
        }

        sums.into_iter()
            .map(|n| {
                if n.magnitude2() > 0.0 {
                    n.normalize().into()
                } else {
                    [0.0, 0.0, 0.0]
                }
            })
            .collect()
    }
}

impl Default for MeshData {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_normals_single_triangle() {
        let mesh = MeshData::from_triangles(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![0, 1, 2],
        );

        for normal in &mesh.normals {
            assert_eq!(*normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_face_normals_skip_bad_indices() {
        let normals = MeshData::calculate_face_normals(&[[0.0, 0.0, 0.0]], &[0, 5, 9]);
        assert_eq!(normals, vec![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_bounds() {
        let mesh = MeshData::from_triangles(
            vec![[-1.0, 2.0, 0.0], [3.0, -2.0, 1.0], [0.0, 0.0, -4.0]],
            vec![0, 1, 2],
        );
        let bounds = mesh.bounds().unwrap();

        assert_eq!(bounds.min, Point3::new(-1.0, -2.0, -4.0));
        assert_eq!(bounds.max, Point3::new(3.0, 2.0, 1.0));
        assert_eq!(bounds.center(), Point3::new(1.0, 0.0, -1.5));
        assert!(MeshData::new().bounds().is_none());
    }
}
