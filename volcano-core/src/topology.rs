//! Board topology: the 80-tile geodesic sphere
//!
//! The board is an icosahedron whose 20 faces are each split into four
//! triangles: one centre triangle (`A`) and three corner triangles
//! (`B`, `C`, `D`). Tiles are addressed by index `0..80`; tile `4 * f + s`
//! is sub-triangle `s` of face `f`, named `"{f + 1}{A|B|C|D}"`.
//!
//! Faces are ordered so that faces `0..10` and `10..20` are antipodal images
//! of each other. Every tile in the first half therefore has its antipode in
//! the second half, which lets win detection scan only tiles `0..40`.

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Number of tiles on the board
pub const TILE_COUNT: usize = 80;

/// Number of tiles scanned by win detection (the rest are their antipodes)
pub const HALF_TILE_COUNT: usize = TILE_COUNT / 2;

/// Tile index
pub type TileIndex = usize;

const FACE_COUNT: usize = 20;
const VERTEX_COUNT: usize = 12;
const SUB_TILE_NAMES: [char; 4] = ['A', 'B', 'C', 'D'];

/// Golden ratio, icosahedron vertex coordinate
const PHI: f64 = 1.618_033_988_749_895;

/// Squared edge length of the icosahedron built from (0, +-1, +-PHI)
const EDGE_LENGTH_SQ: f64 = 4.0;

static TOPOLOGY: OnceLock<Topology> = OnceLock::new();

/// Shared topology table, built on first use
pub fn topology() -> &'static Topology {
    TOPOLOGY.get_or_init(Topology::build)
}

/// Static board data: adjacency, antipodes, kitty corners, names
#[derive(Debug)]
pub struct Topology {
    adjacent: [[TileIndex; 3]; TILE_COUNT],
    antipodes: [TileIndex; TILE_COUNT],
    kitty_corners: Vec<Vec<TileIndex>>,
    names: Vec<String>,
}

impl Topology {
    /// Tiles sharing an edge with `tile` (always three, ascending)
    pub fn adjacent(&self, tile: TileIndex) -> &[TileIndex] {
        &self.adjacent[tile]
    }

    /// The tile on the opposite side of the sphere
    pub fn antipode(&self, tile: TileIndex) -> TileIndex {
        self.antipodes[tile]
    }

    /// Tiles sharing exactly one vertex (and no edge) with `tile`
    pub fn kitty_corners(&self, tile: TileIndex) -> &[TileIndex] {
        &self.kitty_corners[tile]
    }

    /// Display name, e.g. `"7A"`
    pub fn name(&self, tile: TileIndex) -> &str {
        &self.names[tile]
    }

    /// Reverse lookup of [`Topology::name`]
    pub fn tile_by_name(&self, name: &str) -> Option<TileIndex> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    /// Whether this tile is the centre triangle of its face
    pub fn is_face_center(&self, tile: TileIndex) -> bool {
        tile % 4 == 0
    }

    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    fn build() -> Self {
        let vertices = icosahedron_vertices();
        let vertex_antipode = vertex_antipodes(&vertices);
        let faces = ordered_faces(&vertices, &vertex_antipode);

        // Each tile is the sorted set of its three vertex keys
        let mut tiles: Vec<[u32; 3]> = Vec::with_capacity(TILE_COUNT);
        let mut names = Vec::with_capacity(TILE_COUNT);
        for (f, &[a, b, c]) in faces.iter().enumerate() {
            let sub_tiles = [
                [mid(a, b), mid(b, c), mid(c, a)],
                [corner(a), mid(a, b), mid(a, c)],
                [corner(b), mid(b, c), mid(b, a)],
                [corner(c), mid(c, a), mid(c, b)],
            ];
            for (s, mut keys) in sub_tiles.into_iter().enumerate() {
                keys.sort_unstable();
                tiles.push(keys);
                names.push(format!("{}{}", f + 1, SUB_TILE_NAMES[s]));
            }
        }

        let index_of: FxHashMap<[u32; 3], TileIndex> =
            tiles.iter().enumerate().map(|(i, &k)| (k, i)).collect();

        let mut antipodes = [0; TILE_COUNT];
        for (i, keys) in tiles.iter().enumerate() {
            let mut mirrored = keys.map(|k| mirror_key(k, &vertex_antipode));
            mirrored.sort_unstable();
            antipodes[i] = index_of[&mirrored];
        }

        let mut adjacent = [[0; 3]; TILE_COUNT];
        let mut kitty_corners = vec![Vec::new(); TILE_COUNT];
        for i in 0..TILE_COUNT {
            let mut edge_neighbors = Vec::with_capacity(3);
            for j in 0..TILE_COUNT {
                if i == j {
                    continue;
                }
                match shared_vertices(&tiles[i], &tiles[j]) {
                    2 => edge_neighbors.push(j),
                    1 => kitty_corners[i].push(j),
                    _ => {}
                }
            }
            adjacent[i].copy_from_slice(&edge_neighbors);
        }

        Self {
            adjacent,
            antipodes,
            kitty_corners,
            names,
        }
    }
}

// ============================================================================
// GEOMETRY HELPERS
// ============================================================================

type Vec3 = [f64; 3];

fn icosahedron_vertices() -> Vec<Vec3> {
    let mut vertices = Vec::with_capacity(VERTEX_COUNT);
    for &s1 in &[1.0, -1.0] {
        for &s2 in &[1.0, -1.0] {
            vertices.push([0.0, s1, s2 * PHI]);
            vertices.push([s1, s2 * PHI, 0.0]);
            vertices.push([s2 * PHI, 0.0, s1]);
        }
    }
    vertices
}

fn distance_sq(a: &Vec3, b: &Vec3) -> f64 {
    (0..3).map(|k| (a[k] - b[k]).powi(2)).sum()
}

fn vertex_antipodes(vertices: &[Vec3]) -> Vec<usize> {
    vertices
        .iter()
        .map(|v| {
            let negated = [-v[0], -v[1], -v[2]];
            vertices
                .iter()
                .position(|w| distance_sq(w, &negated) < 1e-9)
                .unwrap_or_default()
        })
        .collect()
}

/// Faces `0..10` in lexicographic order of their vertices, skipping any
/// face whose antipode was already taken; faces `10..20` are their images
/// with corresponding vertex order.
fn ordered_faces(vertices: &[Vec3], vertex_antipode: &[usize]) -> Vec<[usize; 3]> {
    let is_edge = |a: usize, b: usize| {
        (distance_sq(&vertices[a], &vertices[b]) - EDGE_LENGTH_SQ).abs() < 1e-9
    };

    let mut all_faces = Vec::with_capacity(FACE_COUNT);
    for a in 0..VERTEX_COUNT {
        for b in a + 1..VERTEX_COUNT {
            for c in b + 1..VERTEX_COUNT {
                if is_edge(a, b) && is_edge(b, c) && is_edge(a, c) {
                    all_faces.push([a, b, c]);
                }
            }
        }
    }

    let mirror = |face: &[usize; 3]| face.map(|v| vertex_antipode[v]);
    let sorted = |mut face: [usize; 3]| {
        face.sort_unstable();
        face
    };

    let mut first_half: Vec<[usize; 3]> = Vec::with_capacity(FACE_COUNT / 2);
    for face in &all_faces {
        let taken = first_half
            .iter()
            .any(|f| f == face || sorted(mirror(f)) == *face);
        if !taken {
            first_half.push(*face);
        }
    }

    let second_half: Vec<[usize; 3]> = first_half.iter().map(mirror).collect();
    first_half.into_iter().chain(second_half).collect()
}

/// Vertex key for an icosahedron corner
fn corner(v: usize) -> u32 {
    v as u32
}

/// Vertex key for the midpoint of an icosahedron edge
fn mid(a: usize, b: usize) -> u32 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    100 + (lo * VERTEX_COUNT + hi) as u32
}

fn mirror_key(key: u32, vertex_antipode: &[usize]) -> u32 {
    if key < 100 {
        corner(vertex_antipode[key as usize])
    } else {
        let packed = (key - 100) as usize;
        let (a, b) = (packed / VERTEX_COUNT, packed % VERTEX_COUNT);
        mid(vertex_antipode[a], vertex_antipode[b])
    }
}

fn shared_vertices(a: &[u32; 3], b: &[u32; 3]) -> usize {
    a.iter().filter(|k| b.contains(k)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tile_has_three_symmetric_neighbors() {
        let topo = topology();
        for i in 0..TILE_COUNT {
            let adj = topo.adjacent(i);
            assert_eq!(adj.len(), 3);
            for &j in adj {
                assert_ne!(i, j);
                assert!(topo.adjacent(j).contains(&i), "{} -> {} not mutual", i, j);
            }
        }
    }

    #[test]
    fn test_antipodes_split_board_in_half() {
        let topo = topology();
        for i in 0..TILE_COUNT {
            let a = topo.antipode(i);
            assert_ne!(a, i);
            assert_eq!(topo.antipode(a), i);
            if i < HALF_TILE_COUNT {
                assert!(a >= HALF_TILE_COUNT, "antipode of {} is {}", i, a);
            }
        }
    }

    #[test]
    fn test_antipode_preserves_adjacency() {
        let topo = topology();
        for i in 0..TILE_COUNT {
            for &j in topo.adjacent(i) {
                assert!(topo.adjacent(topo.antipode(i)).contains(&topo.antipode(j)));
            }
        }
    }

    #[test]
    fn test_kitty_corners() {
        let topo = topology();
        for i in 0..TILE_COUNT {
            let expected = if topo.is_face_center(i) { 9 } else { 8 };
            assert_eq!(topo.kitty_corners(i).len(), expected, "tile {}", topo.name(i));
            for &j in topo.kitty_corners(i) {
                assert!(!topo.adjacent(i).contains(&j));
                assert!(topo.kitty_corners(j).contains(&i));
            }
        }

        // Face centres reach the centres of the three neighbouring faces
        let center_links = topo
            .kitty_corners(0)
            .iter()
            .filter(|&&t| topo.is_face_center(t))
            .count();
        assert_eq!(center_links, 3);
    }

    #[test]
    fn test_names() {
        let topo = topology();
        assert_eq!(topo.name(0), "1A");
        assert_eq!(topo.name(7), "2D");
        assert_eq!(topo.name(79), "20D");
        assert_eq!(topo.tile_by_name("2d"), Some(7));
        assert_eq!(topo.tile_by_name("21A"), None);
    }
}
