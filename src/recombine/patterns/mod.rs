//! Macro-element pattern detection.
//!
//! Every pattern starts from a seed tetrahedron and completes it through the
//! [`AdjacencyIndex`] into an ordered vertex tuple. Tuples are scored by
//! [`Candidate::score`]; shapes that are degenerate or inverted never reach
//! the pool.

pub mod hex;
pub mod prism;

use crate::mesh::VolumeMesh;
use crate::recombine::adjacency::AdjacencyIndex;
use crate::recombine::candidate::{Candidate, CandidatePool};
use crate::topology::element::Element;
use crate::topology::point::{ElementId, VertexId};

/// Run `per_seed` on every seed and pool the results in seed order.
///
/// With the `rayon` feature the seeds are processed in parallel; the results
/// are still pooled in seed order, so generation order is unchanged.
pub fn generate<F>(mesh: &VolumeMesh, seeds: &[ElementId], per_seed: F) -> CandidatePool
where
    F: Fn(&Element) -> Vec<Candidate> + Sync,
{
    #[cfg(feature = "rayon")]
    let batches: Vec<Vec<Candidate>> = {
        use rayon::prelude::*;
        seeds
            .par_iter()
            .map(|id| per_seed(&mesh.elements[id.index()]))
            .collect()
    };
    #[cfg(not(feature = "rayon"))]
    let batches: Vec<Vec<Candidate>> = seeds
        .iter()
        .map(|id| per_seed(&mesh.elements[id.index()]))
        .collect();

    let mut pool = CandidatePool::new();
    for batch in batches {
        pool.extend(batch);
    }
    pool
}

/// The three vertices of `tet` other than the one at `skip`, in order.
pub(crate) fn others(tet: [VertexId; 4], skip: usize) -> [VertexId; 3] {
    let mut out = [tet[0]; 3];
    let mut k = 0;
    for (j, &v) in tet.iter().enumerate() {
        if j != skip {
            out[k] = v;
            k += 1;
        }
    }
    out
}

/// Common neighbors of `u` and `v` other than `exclude`, ascending.
pub(crate) fn completions(
    adjacency: &AdjacencyIndex,
    u: VertexId,
    v: VertexId,
    exclude: [VertexId; 2],
) -> Vec<VertexId> {
    adjacency
        .common_neighbors(u, v)
        .into_iter()
        .filter(|w| !exclude.contains(w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_generation::{five_tet_cube, kuhn_cube, three_tet_prism};
    use crate::recombine::candidate::Pattern;
    use crate::recombine::options::HexPatterns;
    use crate::topology::CellType;

    fn seeds(mesh: &VolumeMesh) -> Vec<ElementId> {
        (0..mesh.elements.len()).map(ElementId::new).collect()
    }

    #[test]
    fn others_skips_one_slot() {
        let tet = [3, 1, 4, 2].map(VertexId::new);
        assert_eq!(others(tet, 1), [3, 4, 2].map(VertexId::new));
    }

    #[test]
    fn kuhn_cube_yields_one_perfect_hex() {
        let g = kuhn_cube();
        let adj = AdjacencyIndex::build_for(&g.mesh, &[CellType::Tetrahedron]);
        let pool = generate(&g.mesh, &seeds(&g.mesh), |seed| {
            hex::candidates(&g.mesh, &adj, seed, &HexPatterns::default(), 1e-6)
        });
        let sorted = pool.into_sorted();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].quality, 1.0);
        assert_eq!(sorted[0].pattern, Pattern::DiagonalFan);
        assert!((g.mesh.signed_volume(&sorted[0].element) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn five_tet_cube_is_found_by_corner_and_crossed_patterns() {
        let g = five_tet_cube();
        let adj = AdjacencyIndex::build_for(&g.mesh, &[CellType::Tetrahedron]);
        for patterns in [
            HexPatterns {
                diamond_corner: true,
                diagonal_fan: false,
                crossed_diagonals: false,
            },
            HexPatterns {
                diamond_corner: false,
                diagonal_fan: false,
                crossed_diagonals: true,
            },
        ] {
            let pool = generate(&g.mesh, &seeds(&g.mesh), |seed| {
                hex::candidates(&g.mesh, &adj, seed, &patterns, 1e-6)
            });
            let sorted = pool.into_sorted();
            assert_eq!(sorted.len(), 1, "{patterns:?}");
            assert_eq!(sorted[0].quality, 1.0);
        }
    }

    #[test]
    fn prism_fixture_yields_prism() {
        let g = three_tet_prism();
        let adj = AdjacencyIndex::build_for(&g.mesh, &[CellType::Tetrahedron]);
        let pool = generate(&g.mesh, &seeds(&g.mesh), |seed| {
            prism::candidates(&g.mesh, &adj, seed, 1e-6)
        });
        let sorted = pool.into_sorted();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].element.cell_type(), CellType::Prism);
        assert!((g.mesh.signed_volume(&sorted[0].element) - 0.5).abs() < 1e-12);
    }
}
