//! Boundary reconciliation.
//!
//! Pairs of boundary triangles that tile a quadrilateral face of a volume
//! element are replaced by that quadrilateral, provided both triangles carry
//! the same region. Triangles of different regions are never joined.

use crate::mesh::{BoundaryFace, BoundaryMesh};
use crate::recombine::keys::{FaceKey, FacetKey, quad_facets};
use crate::topology::element::{Element, Face};
use crate::topology::point::VertexId;
use hashbrown::{HashMap, HashSet};

/// What one reconciliation run changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub quads_created: usize,
    /// Triangle pairs that tile a quad face but belong to different regions.
    pub pairs_refused: usize,
}

/// Replace boundary triangle pairs by the quad faces of `elements` they tile.
///
/// Running this twice is a no-op the second time: joined triangles are gone
/// and refused pairs are refused again without change.
pub fn reconcile(boundary: &mut BoundaryMesh, elements: &[Element]) -> ReconcileOutcome {
    let mut by_facet: HashMap<FacetKey, usize> = HashMap::new();
    for (idx, f) in boundary.faces.iter().enumerate() {
        if let Face::Triangle([a, b, c]) = f.face {
            by_facet.entry(FacetKey::new(a, b, c)).or_insert(idx);
        }
    }

    let mut outcome = ReconcileOutcome::default();
    let mut seen: HashSet<FaceKey> = HashSet::new();
    let mut consumed = vec![false; boundary.faces.len()];
    let mut replaced: HashMap<usize, BoundaryFace> = HashMap::new();
    for element in elements {
        for face in element.faces() {
            let Face::Quad(q) = face else {
                continue;
            };
            if !seen.insert(FaceKey::quad(q)) {
                continue;
            }
            let [abc, acd, abd, bcd] = quad_facets(q);
            for (t1, t2) in [(abc, acd), (abd, bcd)] {
                let (Some(&i), Some(&j)) = (by_facet.get(&t1), by_facet.get(&t2)) else {
                    continue;
                };
                if consumed[i] || consumed[j] {
                    continue;
                }
                let (first, second) = (&boundary.faces[i], &boundary.faces[j]);
                if first.region != second.region {
                    outcome.pairs_refused += 1;
                    log::debug!(
                        "kept triangles {i} and {j}: {} differs from {}",
                        first.region,
                        second.region
                    );
                    break;
                }
                let Some(quad) = join(first.face, second.face) else {
                    continue;
                };
                consumed[i] = true;
                consumed[j] = true;
                replaced.insert(
                    i,
                    BoundaryFace {
                        face: quad,
                        region: first.region,
                    },
                );
                outcome.quads_created += 1;
                break;
            }
        }
    }

    if outcome.quads_created > 0 {
        let faces = std::mem::take(&mut boundary.faces);
        boundary.faces = faces
            .into_iter()
            .enumerate()
            .filter_map(|(idx, f)| match replaced.remove(&idx) {
                Some(quad) => Some(quad),
                None if consumed[idx] => None,
                None => Some(f),
            })
            .collect();
    }
    outcome
}

/// Quad spanned by two triangles sharing an edge, wound like `first`.
fn join(first: Face, second: Face) -> Option<Face> {
    let (Face::Triangle(t1), Face::Triangle(t2)) = (first, second) else {
        return None;
    };
    let opposite = t2.iter().copied().find(|v| !t1.contains(v))?;
    // Rotate `t1` so its vertex off the shared edge sits in the middle.
    let apex = t1.iter().position(|v| !t2.contains(v))?;
    let rot: [VertexId; 3] = std::array::from_fn(|k| t1[(apex + 2 + k) % 3]);
    Some(Face::Quad([rot[0], rot[1], rot[2], opposite]))
}
