//! Hexahedron patterns.
//!
//! Local ordering of every emitted tuple follows the hexahedron convention:
//! bottom `[0, 1, 2, 3]`, top `[4, 5, 6, 7]`, vertical edges `i` to `i + 4`.

use super::{completions, others};
use crate::geometry::quality::{Point3, dot, norm, scale, sub};
use crate::mesh::VolumeMesh;
use crate::recombine::adjacency::AdjacencyIndex;
use crate::recombine::candidate::{Candidate, Pattern, all_distinct};
use crate::recombine::options::HexPatterns;
use crate::topology::element::Element;
use crate::topology::point::VertexId;
use itertools::{Itertools, iproduct};
use std::collections::BTreeMap;

/// Number of tetrahedra fanned around a hexahedron body diagonal.
const FAN_SIZE: usize = 6;

/// Scored hexahedron candidates grown from one seed tetrahedron.
pub fn candidates(
    mesh: &VolumeMesh,
    adjacency: &AdjacencyIndex,
    seed: &Element,
    patterns: &HexPatterns,
    face_epsilon: f64,
) -> Vec<Candidate> {
    let Element::Tetrahedron(tet) = *seed else {
        return Vec::new();
    };
    let mut shapes: Vec<([VertexId; 8], Pattern)> = Vec::new();
    if patterns.diamond_corner {
        shapes.extend(
            diamond_corner(adjacency, tet)
                .into_iter()
                .map(|h| (h, Pattern::DiamondCorner)),
        );
    }
    if patterns.diagonal_fan {
        shapes.extend(
            diagonal_fan(mesh, adjacency, tet)
                .into_iter()
                .map(|h| (h, Pattern::DiagonalFan)),
        );
    }
    if patterns.crossed_diagonals {
        shapes.extend(
            crossed_diagonals(mesh, adjacency, tet)
                .into_iter()
                .map(|h| (h, Pattern::CrossedDiagonals)),
        );
    }
    shapes
        .into_iter()
        .filter_map(|(h, pattern)| {
            Candidate::score(mesh, Element::Hexahedron(h), pattern, face_epsilon)
        })
        .collect()
}

/// Corner pattern: the seed is the corner `a` with hex neighbors `b, c, d`.
///
/// Each pair of `b, c, d` spans a quad through `a` whose fourth vertex is a
/// common neighbor of the pair; the eighth vertex is adjacent to all three
/// fourth vertices.
pub fn diamond_corner(adjacency: &AdjacencyIndex, tet: [VertexId; 4]) -> Vec<[VertexId; 8]> {
    let mut out = Vec::new();
    for (i, &a) in tet.iter().enumerate() {
        let [b, c, d] = others(tet, i);
        let qs = completions(adjacency, b, c, [a, d]);
        let ps = completions(adjacency, b, d, [a, c]);
        let rs = completions(adjacency, c, d, [a, b]);
        for (&q, &p, &r) in iproduct!(&qs, &ps, &rs) {
            if q == p || q == r || p == r {
                continue;
            }
            for s in adjacency.common_neighbors(p, q) {
                if !adjacency.are_adjacent(s, r) {
                    continue;
                }
                let hex = [a, b, q, c, d, p, s, r];
                if all_distinct(&hex) {
                    out.push(hex);
                }
            }
        }
    }
    out
}

/// Fan pattern: the seed's longest edge is a body diagonal shared by exactly
/// six tetrahedra whose link is a single hexagon.
///
/// The hexagon alternates between neighbors of the two diagonal ends, so
/// both alternations are emitted.
pub fn diagonal_fan(
    mesh: &VolumeMesh,
    adjacency: &AdjacencyIndex,
    tet: [VertexId; 4],
) -> Vec<[VertexId; 8]> {
    let seed = Element::Tetrahedron(tet);
    let Some((a, b)) = seed.edges().max_by(|&(p, q), &(r, s)| {
        edge_length(mesh, p, q).total_cmp(&edge_length(mesh, r, s))
    }) else {
        return Vec::new();
    };
    let fan = adjacency.elements_containing(mesh, &[a, b]);
    if fan.len() != FAN_SIZE {
        return Vec::new();
    }
    let mut links = Vec::with_capacity(FAN_SIZE);
    for id in fan {
        let Element::Tetrahedron(vs) = mesh.elements[id.index()] else {
            return Vec::new();
        };
        let Some((p, q)) = vs
            .iter()
            .copied()
            .filter(|&v| v != a && v != b)
            .collect_tuple()
        else {
            return Vec::new();
        };
        links.push((p, q));
    }
    let Some(ring) = link_cycle(&links) else {
        return Vec::new();
    };
    (0..2).map(|shift| fan_hex(a, b, &ring, shift)).collect()
}

fn edge_length(mesh: &VolumeMesh, a: VertexId, b: VertexId) -> f64 {
    norm(sub(mesh.point(a), mesh.point(b)))
}

/// Walk the link edges into one closed hexagon, starting at the smallest
/// vertex towards its smaller neighbor.
fn link_cycle(links: &[(VertexId, VertexId)]) -> Option<[VertexId; FAN_SIZE]> {
    let mut nbrs: BTreeMap<VertexId, Vec<VertexId>> = BTreeMap::new();
    for &(p, q) in links {
        nbrs.entry(p).or_default().push(q);
        nbrs.entry(q).or_default().push(p);
    }
    if nbrs.len() != FAN_SIZE || nbrs.values().any(|n| n.len() != 2) {
        return None;
    }
    let (&start, first) = nbrs.iter().next()?;
    let mut ring = [start; FAN_SIZE];
    let mut prev = start;
    let mut cur = first[0].min(first[1]);
    for slot in ring.iter_mut().skip(1) {
        *slot = cur;
        let n = &nbrs[&cur];
        let next = if n[0] == prev { n[1] } else { n[0] };
        prev = cur;
        cur = next;
    }
    (cur == start && all_distinct(&ring)).then_some(ring)
}

fn fan_hex(a: VertexId, b: VertexId, ring: &[VertexId; FAN_SIZE], shift: usize) -> [VertexId; 8] {
    let r = |i: usize| ring[(i + shift) % FAN_SIZE];
    [a, r(0), r(1), r(2), r(4), r(5), b, r(3)]
}

/// Vertical edges of a hexahedron.
const VERTICALS: [(usize, usize); 4] = [(0, 4), (1, 5), (2, 6), (3, 7)];
/// Both diagonals of each lateral face; one of each pair must be a mesh edge.
const LATERAL_DIAGONALS: [[(usize, usize); 2]; 4] = [
    [(0, 5), (1, 4)],
    [(1, 6), (2, 5)],
    [(2, 7), (3, 6)],
    [(3, 4), (0, 7)],
];
/// The bottom and top diagonals not carried by the seed; they must not be edges.
const FREE_DIAGONALS: [(usize, usize); 2] = [(1, 3), (4, 6)];

/// Crossed pattern: the seed joins the bottom diagonal `a-c` to the crossed
/// top diagonal `b-d`.
///
/// Bottom and top quads are completed by common neighbors of each diagonal;
/// the top is then rotated so its vertical edges are as parallel as possible
/// before the full adjacency of the shape is checked.
pub fn crossed_diagonals(
    mesh: &VolumeMesh,
    adjacency: &AdjacencyIndex,
    tet: [VertexId; 4],
) -> Vec<[VertexId; 8]> {
    let [v0, v1, v2, v3] = tet;
    let mut out = Vec::new();
    for ((a, c), (b, d)) in [((v0, v1), (v2, v3)), ((v0, v2), (v1, v3)), ((v0, v3), (v1, v2))] {
        let bottom = completions(adjacency, a, c, [b, d]);
        let top = completions(adjacency, b, d, [a, c]);
        let bottom_pairs = bottom.iter().copied().tuple_combinations::<(_, _)>();
        let top_pairs: Vec<(VertexId, VertexId)> =
            top.iter().copied().tuple_combinations().collect();
        for ((x, y), &(z, w)) in bottom_pairs.cartesian_product(&top_pairs) {
            let (a2, c2) = align(mesh, (a, c), (z, w));
            let (x2, y2) = align(mesh, (x, y), (b, d));
            let hex = [a, x, c, y, a2, x2, c2, y2];
            if all_distinct(&hex) && crossed_edges_hold(adjacency, &hex) {
                out.push(hex);
            }
        }
    }
    out
}

/// Pair `(u, w)` with `(p, q)` so that `p -> u` and `q -> w` are the more
/// parallel of the two assignments.
fn align(
    mesh: &VolumeMesh,
    (p, q): (VertexId, VertexId),
    (u, w): (VertexId, VertexId),
) -> (VertexId, VertexId) {
    let dir = |from: VertexId, to: VertexId| unit(sub(mesh.point(to), mesh.point(from)));
    let straight = dot(dir(p, u), dir(q, w));
    let swapped = dot(dir(p, w), dir(q, u));
    if straight >= swapped { (u, w) } else { (w, u) }
}

fn unit(v: Point3) -> Point3 {
    let n = norm(v);
    if n > 0.0 { scale(v, 1.0 / n) } else { v }
}

fn crossed_edges_hold(adjacency: &AdjacencyIndex, hex: &[VertexId; 8]) -> bool {
    let edge = |(i, j): (usize, usize)| adjacency.are_adjacent(hex[i], hex[j]);
    VERTICALS.into_iter().all(edge)
        && LATERAL_DIAGONALS
            .iter()
            .all(|pair| pair.iter().copied().any(edge))
        && !FREE_DIAGONALS.into_iter().any(edge)
}
