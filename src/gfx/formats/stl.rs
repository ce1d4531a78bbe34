//! STL reading (binary and ASCII) and binary STL writing

use std::path::Path;

use cgmath::Vector3;

use crate::error::GeometryLoadError;
use crate::gfx::geometry::MeshData;

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

/// Reads an STL file from disk
pub fn read(path: &Path) -> Result<MeshData, GeometryLoadError> {
    let bytes = std::fs::read(path).map_err(|source| GeometryLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes, path)
}

/// Decodes STL bytes, detecting binary or ASCII encoding
///
/// A file whose size matches the triangle count in its header is binary even
/// if the header starts with `solid`, which many exporters write.
pub fn decode(bytes: &[u8], path: &Path) -> Result<MeshData, GeometryLoadError> {
    if let Some(count) = binary_triangle_count(bytes) {
        if HEADER_LEN + 4 + count * TRIANGLE_LEN == bytes.len() {
            return Ok(decode_binary(bytes, count));
        }
    }

    let looks_ascii = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .is_some_and(|start| bytes[start..].starts_with(b"solid"));

    if looks_ascii {
        let text = std::str::from_utf8(bytes).map_err(|_| malformed(path, "ASCII STL is not valid UTF-8"))?;
        return decode_ascii(text, path);
    }

    match binary_triangle_count(bytes) {
        Some(count) => Err(malformed(
            path,
            format!(
                "header declares {count} triangles but file holds {} bytes",
                bytes.len()
            ),
        )),
        None => Err(malformed(path, "file too short for an STL header")),
    }
}

fn binary_triangle_count(bytes: &[u8]) -> Option<usize> {
    let raw = bytes.get(HEADER_LEN..HEADER_LEN + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize)
}

fn decode_binary(bytes: &[u8], count: usize) -> MeshData {
    let mut vertices = Vec::with_capacity(count * 3);

    for tri in bytes[HEADER_LEN + 4..].chunks_exact(TRIANGLE_LEN).take(count) {
        // Skip the stored facet normal (12 bytes); normals are recomputed
        for corner in 0..3 {
            let offset = 12 + corner * 12;
            vertices.push([
                read_f32(tri, offset),
                read_f32(tri, offset + 4),
                read_f32(tri, offset + 8),
            ]);
        }
    }

    let indices = (0..vertices.len() as u32).collect();
    MeshData::from_triangles(vertices, indices)
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn decode_ascii(text: &str, path: &Path) -> Result<MeshData, GeometryLoadError> {
    let mut vertices = Vec::new();
    let mut tokens = text.split_ascii_whitespace();

    while let Some(token) = tokens.next() {
        if token != "vertex" {
            continue;
        }
        let mut coord = [0.0f32; 3];
        for c in &mut coord {
            let raw = tokens
                .next()
                .ok_or_else(|| malformed(path, "vertex with fewer than three coordinates"))?;
            *c = raw
                .parse()
                .map_err(|_| malformed(path, format!("invalid coordinate '{raw}'")))?;
        }
        vertices.push(coord);
    }

    if vertices.len() % 3 != 0 {
        return Err(malformed(
            path,
            format!("{} vertices do not form whole triangles", vertices.len()),
        ));
    }

    let indices = (0..vertices.len() as u32).collect();
    Ok(MeshData::from_triangles(vertices, indices))
}

fn malformed(path: &Path, reason: impl Into<String>) -> GeometryLoadError {
    GeometryLoadError::MalformedStl {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Encodes a mesh as binary STL
pub fn to_binary_bytes(mesh: &MeshData) -> Vec<u8> {
    let triangles: Vec<[[f32; 3]; 3]> = mesh
        .indices
        .chunks_exact(3)
        .filter_map(|t| {
            Some([
                *mesh.vertices.get(t[0] as usize)?,
                *mesh.vertices.get(t[1] as usize)?,
                *mesh.vertices.get(t[2] as usize)?,
            ])
        })
        .collect();

    let mut out = Vec::with_capacity(HEADER_LEN + 4 + triangles.len() * TRIANGLE_LEN);
    let mut header = [0u8; HEADER_LEN];
    let label = b"partview binary STL";
    header[..label.len()].copy_from_slice(label);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());

    for [a, b, c] in triangles {
        let (va, vb, vc) = (Vector3::from(a), Vector3::from(b), Vector3::from(c));
        let n = (vb - va).cross(vc - va);
        for value in [n.x, n.y, n.z] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        for corner in [a, b, c] {
            for value in corner {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    out
}
