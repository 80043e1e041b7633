//! Translates merged rectangles into atlas-safe unit quads: one full-tile
//! quad per unit cell, so no quad's UV rectangle can straddle two atlas
//! tiles. Trades vertex count for texture correctness on a non-tileable
//! atlas; see the greedy-rectangle-per-large-quad variant noted as a future
//! pluggable strategy.

use crate::block::atlas_tile;
use crate::geometry::BlockPos;
use crate::mesh::greedy::{Direction, MergedQuad};
use crate::world::chunk::Vertex;

/// Four CCW (viewed from outside the cube) corner offsets from a unit
/// block's center, for each face direction.
fn face_corners(direction: Direction, pos: BlockPos) -> [[f32; 3]; 4] {
    let x = pos.x as f32;
    let y = pos.y as f32;
    let z = pos.z as f32;

    match direction {
        Direction::Front => [
            [x - 0.5, y - 0.5, z + 0.5],
            [x + 0.5, y - 0.5, z + 0.5],
            [x + 0.5, y + 0.5, z + 0.5],
            [x - 0.5, y + 0.5, z + 0.5],
        ],
        Direction::Back => [
            [x + 0.5, y - 0.5, z - 0.5],
            [x - 0.5, y - 0.5, z - 0.5],
            [x - 0.5, y + 0.5, z - 0.5],
            [x + 0.5, y + 0.5, z - 0.5],
        ],
        Direction::Left => [
            [x - 0.5, y - 0.5, z + 0.5],
            [x - 0.5, y - 0.5, z - 0.5],
            [x - 0.5, y + 0.5, z - 0.5],
            [x - 0.5, y + 0.5, z + 0.5],
        ],
        Direction::Right => [
            [x + 0.5, y - 0.5, z - 0.5],
            [x + 0.5, y - 0.5, z + 0.5],
            [x + 0.5, y + 0.5, z + 0.5],
            [x + 0.5, y + 0.5, z - 0.5],
        ],
        Direction::Top => [
            [x - 0.5, y + 0.5, z - 0.5],
            [x + 0.5, y + 0.5, z - 0.5],
            [x + 0.5, y + 0.5, z + 0.5],
            [x - 0.5, y + 0.5, z + 0.5],
        ],
        Direction::Bottom => [
            [x - 0.5, y - 0.5, z + 0.5],
            [x + 0.5, y - 0.5, z + 0.5],
            [x + 0.5, y - 0.5, z - 0.5],
            [x - 0.5, y - 0.5, z - 0.5],
        ],
    }
}

fn emit_unit_face(out: &mut Vec<Vertex>, direction: Direction, pos: BlockPos, block_type: u32, atlas_grid: u32) {
    let (nx, ny, nz) = direction.normal();
    let normal = [nx, ny, nz];

    let (tile_u, tile_v) = atlas_tile(block_type, atlas_grid);
    let tile_size = 1.0 / atlas_grid as f32;
    let u0 = tile_u as f32 * tile_size;
    let v0 = tile_v as f32 * tile_size;
    let u1 = u0 + tile_size;
    let v1 = v0 + tile_size;
    let uvs = [[u0, v1], [u1, v1], [u1, v0], [u0, v0]];

    for (position, uv) in face_corners(direction, pos).into_iter().zip(uvs) {
        out.push(Vertex { position, normal, uv });
    }
}

/// Splits every merged rectangle back into `width * height` unit quads,
/// each carrying a single atlas tile's UV. Vertices are already in world
/// coordinates (positions fed into the mesher are world-space `BlockPos`
/// values), so no further transform is needed.
pub fn atlas_safe_quads(quads: &[MergedQuad], atlas_grid: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(quads.iter().map(|q| (q.width * q.height) as usize * 4).sum());
    for quad in quads {
        for j in 0..quad.height {
            for i in 0..quad.width {
                let pos = quad.unit_position(i, j);
                emit_unit_face(&mut vertices, quad.direction, pos, quad.block_type, atlas_grid);
            }
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sub_quad_uv_stays_within_one_atlas_tile() {
        let quad = MergedQuad {
            direction: Direction::Top,
            origin: BlockPos::new(0, 0, 0),
            width: 3,
            height: 3,
            block_type: 5,
        };
        let atlas_grid = 16;
        let vertices = atlas_safe_quads(&[quad], atlas_grid);
        assert_eq!(vertices.len(), 9 * 4);

        let (tile_u, tile_v) = atlas_tile(5, atlas_grid);
        let tile_size = 1.0 / atlas_grid as f32;
        let u0 = tile_u as f32 * tile_size;
        let v0 = tile_v as f32 * tile_size;

        for vertex in &vertices {
            assert!(vertex.uv[0] >= u0 - 1e-6 && vertex.uv[0] <= u0 + tile_size + 1e-6);
            assert!(vertex.uv[1] >= v0 - 1e-6 && vertex.uv[1] <= v0 + tile_size + 1e-6);
        }
    }

    #[test]
    fn a_three_by_three_top_slab_emits_nine_unit_quads_sharing_one_tile() {
        let quad = MergedQuad {
            direction: Direction::Top,
            origin: BlockPos::new(2, 4, -1),
            width: 3,
            height: 3,
            block_type: 2,
        };
        let vertices = atlas_safe_quads(&[quad], 16);
        assert_eq!(vertices.len(), 36);

        let first_uv = vertices[0].uv;
        for face in vertices.chunks(4) {
            assert_eq!(face[0].uv, first_uv);
            for v in face {
                assert_eq!(v.normal, [0.0, 1.0, 0.0]);
            }
        }
    }

    #[test]
    fn face_normal_matches_direction() {
        let pos = BlockPos::new(0, 0, 0);
        let vertices = atlas_safe_quads(
            &[MergedQuad {
                direction: Direction::Right,
                origin: pos,
                width: 1,
                height: 1,
                block_type: 0,
            }],
            16,
        );
        assert!(vertices.iter().all(|v| v.normal == [1.0, 0.0, 0.0]));
    }
}
