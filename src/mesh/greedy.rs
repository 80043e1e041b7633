//! Per-direction rectangle merge over visible, same-type faces.
//!
//! Each of the six face directions is handled independently as its own
//! stack of 2D planes swept along the direction's constant axis. Within a
//! plane the merge is a standard greedy-mesher scanline: extend a run along
//! the width axis, then try to extend that whole run one row further along
//! the height axis, repeating until blocked.

use std::collections::HashMap;

use crate::geometry::BlockPos;

/// The six face directions, in the canonical order the visibility mask
/// uses: `Front = +Z, Back = -Z, Left = -X, Right = +X, Top = +Y, Bottom =
/// -Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Front,
        Direction::Back,
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            Direction::Front => 0,
            Direction::Back => 1,
            Direction::Left => 2,
            Direction::Right => 3,
            Direction::Top => 4,
            Direction::Bottom => 5,
        }
    }

    /// Outward-facing unit normal.
    pub fn normal(self) -> (f32, f32, f32) {
        match self {
            Direction::Front => (0.0, 0.0, 1.0),
            Direction::Back => (0.0, 0.0, -1.0),
            Direction::Left => (-1.0, 0.0, 0.0),
            Direction::Right => (1.0, 0.0, 0.0),
            Direction::Top => (0.0, 1.0, 0.0),
            Direction::Bottom => (0.0, -1.0, 0.0),
        }
    }

    /// The integer axis a merged rectangle's `width` extends along.
    pub(crate) fn width_axis(self) -> (i32, i32, i32) {
        match self {
            Direction::Front | Direction::Back | Direction::Top | Direction::Bottom => (1, 0, 0),
            Direction::Left | Direction::Right => (0, 0, 1),
        }
    }

    /// The integer axis a merged rectangle's `height` extends along.
    pub(crate) fn height_axis(self) -> (i32, i32, i32) {
        match self {
            Direction::Front | Direction::Back | Direction::Left | Direction::Right => (0, 1, 0),
            Direction::Top | Direction::Bottom => (0, 0, 1),
        }
    }

    /// Decomposes a world position into (sweep, u, v) for this direction's
    /// plane: `sweep` is the constant coordinate, `u`/`v` are the in-plane
    /// width/height coordinates.
    fn plane_coords(self, pos: BlockPos) -> (i32, i32, i32) {
        match self {
            Direction::Front | Direction::Back => (pos.z, pos.x, pos.y),
            Direction::Left | Direction::Right => (pos.x, pos.z, pos.y),
            Direction::Top | Direction::Bottom => (pos.y, pos.x, pos.z),
        }
    }

    /// Inverse of [`Self::plane_coords`].
    fn plane_to_world(self, sweep: i32, u: i32, v: i32) -> BlockPos {
        match self {
            Direction::Front | Direction::Back => BlockPos::new(u, v, sweep),
            Direction::Left | Direction::Right => BlockPos::new(sweep, v, u),
            Direction::Top | Direction::Bottom => BlockPos::new(u, sweep, v),
        }
    }
}

/// One bool per face direction (indexed via [`Direction::index`]), true
/// where that face is visible (its neighbor is not solid).
pub type FaceMask = [bool; 6];

/// A maximal axis-aligned rectangle of coplanar, same-type, same-direction
/// visible faces, in block units. `origin` is its minimum corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedQuad {
    pub direction: Direction,
    pub origin: BlockPos,
    pub width: i32,
    pub height: i32,
    pub block_type: u32,
}

impl MergedQuad {
    /// The world position of the unit cell at offset `(i, j)` within this
    /// rectangle, `i` along the width axis and `j` along the height axis.
    pub fn unit_position(&self, i: i32, j: i32) -> BlockPos {
        let (wx, wy, wz) = self.direction.width_axis();
        let (hx, hy, hz) = self.direction.height_axis();
        self.origin
            .offset(wx * i + hx * j, wy * i + hy * j, wz * i + hz * j)
    }
}

/// Runs the greedy merge for every face direction and returns the merged
/// rectangles across the whole chunk. `visibility` must contain an entry
/// for every position in `blocks`; positions with no visible face at all
/// contribute no rectangles in any direction (this is the "excluded from
/// the mesh entirely" rule from the face-culling contract applied
/// per-direction rather than as an upfront filter).
pub fn mesh_chunk(blocks: &[(BlockPos, u32)], visibility: &HashMap<BlockPos, FaceMask>) -> Vec<MergedQuad> {
    let mut quads = Vec::new();

    for direction in Direction::ALL {
        let idx = direction.index();
        let mut planes: HashMap<i32, HashMap<(i32, i32), u32>> = HashMap::new();

        for &(pos, block_type) in blocks {
            let visible = visibility.get(&pos).map(|mask| mask[idx]).unwrap_or(false);
            if !visible {
                continue;
            }
            let (sweep, u, v) = direction.plane_coords(pos);
            planes.entry(sweep).or_default().insert((u, v), block_type);
        }

        let mut sweeps: Vec<i32> = planes.keys().copied().collect();
        sweeps.sort_unstable();

        for sweep in sweeps {
            let cells = &planes[&sweep];
            for (u, v, width, height, block_type) in merge_plane(cells) {
                quads.push(MergedQuad {
                    direction,
                    origin: direction.plane_to_world(sweep, u, v),
                    width,
                    height,
                    block_type,
                });
            }
        }
    }

    quads
}

/// Greedy scanline merge of a single sparse 2D plane. Traversal order (`v`
/// ascending, then `u` ascending) is fixed so identical inputs always yield
/// an identical rectangle sequence.
fn merge_plane(cells: &HashMap<(i32, i32), u32>) -> Vec<(i32, i32, i32, i32, u32)> {
    let mut u_values: Vec<i32> = cells.keys().map(|&(u, _)| u).collect();
    u_values.sort_unstable();
    u_values.dedup();
    let mut v_values: Vec<i32> = cells.keys().map(|&(_, v)| v).collect();
    v_values.sort_unstable();
    v_values.dedup();

    let mut visited: std::collections::HashSet<(i32, i32)> = std::collections::HashSet::new();
    let mut result = Vec::new();

    for &v in &v_values {
        for &u in &u_values {
            if visited.contains(&(u, v)) {
                continue;
            }
            let Some(&block_type) = cells.get(&(u, v)) else {
                continue;
            };

            let mut width = 1;
            while matches!(cells.get(&(u + width, v)), Some(&bt) if bt == block_type)
                && !visited.contains(&(u + width, v))
            {
                width += 1;
            }

            let mut height = 1;
            'grow: loop {
                for du in 0..width {
                    match cells.get(&(u + du, v + height)) {
                        Some(&bt) if bt == block_type && !visited.contains(&(u + du, v + height)) => {}
                        _ => break 'grow,
                    }
                }
                height += 1;
            }

            for dv in 0..height {
                for du in 0..width {
                    visited.insert((u + du, v + dv));
                }
            }

            result.push((u, v, width, height, block_type));
        }
    }

    result
}
