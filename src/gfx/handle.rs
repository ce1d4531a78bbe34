//! Render handles: drawable geometry plus per-actor visual properties

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;

use super::geometry::MeshData;
use crate::error::ParseRgbError;

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const FLOOR_GREY: Rgb = Rgb::new(204, 204, 204);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color components scaled to 0.0-1.0, as engines expect for diffuse color
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

/// Formats as `r,g,b`, the way the tree's colour column displays it
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let &[r, g, b] = parts.as_slice() else {
            return Err(ParseRgbError::new(s));
        };
        let channel = |c: &str| c.parse::<u8>().map_err(|_| ParseRgbError::new(s));
        Ok(Rgb::new(channel(r)?, channel(g)?, channel(b)?))
    }
}

/// Engine-side identity of one drawable actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    fn next() -> Self {
        ActorId(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// One part's drawable geometry plus its visual properties
///
/// Cloning a handle clones a reference to the *same* actor (same [`ActorId`]).
/// Use [`RenderHandle::duplicate`] for an independent actor that shares the
/// geometry.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    id: ActorId,
    mesh: Arc<MeshData>,
    color: Rgb,
    visible: bool,
}

impl RenderHandle {
    /// Wraps decoded geometry in a new actor, white and visible
    pub fn new(mesh: Arc<MeshData>) -> Self {
        Self {
            id: ActorId::next(),
            mesh,
            color: Rgb::WHITE,
            visible: true,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn mesh(&self) -> &Arc<MeshData> {
        &self.mesh
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// New actor sharing this handle's immutable geometry, with its own copy
    /// of color and visibility
    pub fn duplicate(&self) -> RenderHandle {
        RenderHandle {
            id: ActorId::next(),
            mesh: Arc::clone(&self.mesh),
            color: self.color,
            visible: self.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn test_rgb_text_round_trip() {
        let c = Rgb::new(12, 0, 255);
        assert_eq!(c.to_string(), "12,0,255");
        assert_eq!("12, 0,255".parse::<Rgb>(), Ok(c));
        assert_eq!(
            "12,0".parse::<Rgb>().unwrap_err().to_string(),
            "invalid colour '12,0', expected r,g,b"
        );
        assert!("256,0,0".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(255, 0, 51).to_unit(), [1.0, 0.0, 0.2]);
    }

    #[test]
    fn test_duplicate_shares_geometry_not_properties() {
        let mut original = RenderHandle::new(Arc::new(generate_cube()));
        original.set_color(Rgb::new(10, 20, 30));

        let mut copy = original.duplicate();
        assert_ne!(copy.id(), original.id());
        assert!(Arc::ptr_eq(copy.mesh(), original.mesh()));
        assert_eq!(copy.color(), Rgb::new(10, 20, 30));

        copy.set_visible(false);
        copy.set_color(Rgb::WHITE);
        assert!(original.is_visible());
        assert_eq!(original.color(), Rgb::new(10, 20, 30));
    }
}
