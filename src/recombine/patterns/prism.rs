//! Prism pattern.
//!
//! A corner `a` of the seed with the opposite-face edge `b-c` forms the
//! bottom triangle; the remaining seed vertex `d` sits above `a`. The top
//! vertices over `b` and `c` complete the two lateral quads through `d` and
//! must themselves share an edge.

use super::{completions, others};
use crate::mesh::VolumeMesh;
use crate::recombine::adjacency::AdjacencyIndex;
use crate::recombine::candidate::{Candidate, Pattern, all_distinct};
use crate::topology::element::Element;
use crate::topology::point::VertexId;

/// Scored prism candidates grown from one seed tetrahedron.
pub fn candidates(
    mesh: &VolumeMesh,
    adjacency: &AdjacencyIndex,
    seed: &Element,
    face_epsilon: f64,
) -> Vec<Candidate> {
    let Element::Tetrahedron(tet) = *seed else {
        return Vec::new();
    };
    prism_corner(adjacency, tet)
        .into_iter()
        .filter_map(|p| {
            Candidate::score(mesh, Element::Prism(p), Pattern::PrismCorner, face_epsilon)
        })
        .collect()
}

/// Prism tuples `[a, b, c, d, e, f]` with bottom `a, b, c` and top `d, e, f`.
pub fn prism_corner(adjacency: &AdjacencyIndex, tet: [VertexId; 4]) -> Vec<[VertexId; 6]> {
    let mut out = Vec::new();
    for (i, &a) in tet.iter().enumerate() {
        let rest = others(tet, i);
        for k in 0..3 {
            let d = rest[k];
            let b = rest[(k + 1) % 3];
            let c = rest[(k + 2) % 3];
            for e in completions(adjacency, b, d, [a, c]) {
                for f in completions(adjacency, c, d, [a, b]) {
                    if e == f || !adjacency.are_adjacent(e, f) {
                        continue;
                    }
                    let prism = [a, b, c, d, e, f];
                    if all_distinct(&prism) {
                        out.push(prism);
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_generation::{kuhn_cube, three_tet_prism};
    use crate::topology::CellType;

    fn ids<const N: usize>(raw: [usize; N]) -> [VertexId; N] {
        raw.map(VertexId::new)
    }

    fn same_set(a: &[VertexId], b: &[VertexId]) -> bool {
        let mut a = a.to_vec();
        let mut b = b.to_vec();
        a.sort();
        b.sort();
        a == b
    }

    #[test]
    fn finds_prism_from_corner() {
        let g = three_tet_prism();
        let adj = AdjacencyIndex::build_for(&g.mesh, &[CellType::Tetrahedron]);
        let prisms = prism_corner(&adj, ids([0, 1, 2, 5]));
        assert!(prisms.contains(&ids([2, 0, 1, 5, 3, 4])));
    }

    #[test]
    fn scored_prism_is_positive() {
        let g = three_tet_prism();
        let adj = AdjacencyIndex::build_for(&g.mesh, &[CellType::Tetrahedron]);
        let seed = g.mesh.elements[0];
        let found = candidates(&g.mesh, &adj, &seed, 1e-6);
        assert!(!found.is_empty());
        for c in &found {
            assert!(c.quality > 0.0);
            assert!(g.mesh.signed_volume(&c.element) > 0.0);
            assert!(same_set(c.element.vertices(), &ids([0, 1, 2, 3, 4, 5])));
        }
    }

    #[test]
    fn cube_corners_also_complete_prisms() {
        // Half of a Kuhn cube is a prism: the tets (0,1,2,6), (0,5,1,6),
        // (0,4,5,6) fill the prism with bottom 0,1,2 and top 4,5,6.
        let g = kuhn_cube();
        let adj = AdjacencyIndex::build_for(&g.mesh, &[CellType::Tetrahedron]);
        let found = candidates(&g.mesh, &adj, &g.mesh.elements[0], 1e-6);
        assert!(
            found
                .iter()
                .any(|c| same_set(c.element.vertices(), &ids([0, 1, 2, 4, 5, 6])))
        );
    }
}
