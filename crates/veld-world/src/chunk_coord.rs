use serde::{Deserialize, Serialize};

/// Integer chunk-grid coordinate. `cy` is always 0 in the current design
/// (a single streamed ground layer) but the key space keeps the axis so
/// vertical layers can be added without reshaping the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Chunk containing the given world (x, z), on the ground layer.
    #[inline]
    pub fn from_world(wx: f32, wz: f32, size: usize) -> Self {
        let s = size as f32;
        Self {
            cx: (wx / s).floor() as i32,
            cy: 0,
            cz: (wz / s).floor() as i32,
        }
    }

    /// World-space position of the chunk's minimum corner.
    #[inline]
    pub fn base_world(self, size: usize) -> (f32, f32) {
        let s = size as f32;
        (self.cx as f32 * s, self.cz as f32 * s)
    }

    /// World-space position of the chunk footprint's center.
    #[inline]
    pub fn center_world(self, size: usize) -> (f32, f32) {
        let (bx, bz) = self.base_world(size);
        let half = size as f32 * 0.5;
        (bx + half, bz + half)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_world_floors_negative_coordinates() {
        assert_eq!(ChunkCoord::from_world(0.0, 0.0, 32), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::from_world(31.9, 31.9, 32), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::from_world(32.0, 0.0, 32), ChunkCoord::new(1, 0, 0));
        assert_eq!(
            ChunkCoord::from_world(-0.1, -32.1, 32),
            ChunkCoord::new(-1, 0, -2)
        );
    }

    #[test]
    fn center_is_inside_footprint() {
        let c = ChunkCoord::new(-3, 0, 5);
        let (cx, cz) = c.center_world(32);
        assert_eq!(ChunkCoord::from_world(cx, cz, 32), c);
    }
}
