//! Scored macro-element candidates and the candidate pool.

use crate::geometry::quality::{min_face_distortion, min_scaled_jacobian, signed_volume_of};
use crate::mesh::VolumeMesh;
use crate::topology::element::Element;
use crate::topology::point::VertexId;
use hashbrown::HashMap;

/// Which topological pattern produced a candidate.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Pattern {
    /// Hex grown from one corner tetrahedron and its three adjacent quads.
    DiamondCorner,
    /// Hex reconstructed from the six tetrahedra fanned around a long diagonal.
    DiagonalFan,
    /// Hex whose seed tetrahedron joins crossed diagonals of two opposite faces.
    CrossedDiagonals,
    /// Prism grown from one corner tetrahedron.
    PrismCorner,
}

/// A positively oriented macro-element shape with its quality score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub element: Element,
    /// Worst normalized corner jacobian, in `(0, 1]`.
    pub quality: f64,
    pub pattern: Pattern,
    /// Generation order, used to break quality ties.
    pub seq: usize,
}

impl Candidate {
    /// Orient and score a shape; `None` when it is degenerate or inverted.
    ///
    /// The shape is discarded when any vertex repeats, when its worst corner
    /// jacobian is not strictly positive, or when any quadrilateral face has a
    /// shape distortion at or below `face_epsilon`.
    pub fn score(
        mesh: &VolumeMesh,
        element: Element,
        pattern: Pattern,
        face_epsilon: f64,
    ) -> Option<Self> {
        if !all_distinct(element.vertices()) {
            return None;
        }
        let ct = element.cell_type();
        let mut element = element;
        let mut points = mesh.element_points(&element);
        if signed_volume_of(ct, &points) < 0.0 {
            element = element.reversed();
            points = mesh.element_points(&element);
        }
        let quality = min_scaled_jacobian(ct, &points);
        if !(quality > 0.0) {
            return None;
        }
        if min_face_distortion(ct, &points) <= face_epsilon {
            return None;
        }
        Some(Self {
            element,
            quality,
            pattern,
            seq: 0,
        })
    }

    /// Sorted vertex set identifying the candidate regardless of ordering.
    pub fn vertex_key(&self) -> Vec<VertexId> {
        let mut key = self.element.vertices().to_vec();
        key.sort_unstable();
        key
    }
}

/// `true` when no vertex repeats.
pub(crate) fn all_distinct(vertices: &[VertexId]) -> bool {
    let mut sorted = vertices.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).all(|w| w[0] != w[1])
}

/// Deduplicating collection of candidates in generation order.
#[derive(Debug, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    by_key: HashMap<Vec<VertexId>, usize>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate. A candidate over an already-seen vertex set replaces
    /// the earlier one only if its quality is strictly higher, keeping the
    /// earlier generation slot.
    pub fn push(&mut self, mut candidate: Candidate) {
        let key = candidate.vertex_key();
        match self.by_key.get(&key) {
            Some(&slot) => {
                if candidate.quality > self.candidates[slot].quality {
                    candidate.seq = self.candidates[slot].seq;
                    self.candidates[slot] = candidate;
                }
            }
            None => {
                candidate.seq = self.candidates.len();
                self.by_key.insert(key, self.candidates.len());
                self.candidates.push(candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates by descending quality; ties keep generation order.
    pub fn into_sorted(self) -> Vec<Candidate> {
        let mut out = self.candidates;
        out.sort_by(|a, b| b.quality.total_cmp(&a.quality));
        out
    }
}

impl Extend<Candidate> for CandidatePool {
    fn extend<I: IntoIterator<Item = Candidate>>(&mut self, iter: I) {
        for c in iter {
            self.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_mesh() -> VolumeMesh {
        VolumeMesh {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
                [0.0, 1.0, 1.0],
            ],
            elements: Vec::new(),
        }
    }

    fn hex(raw: [usize; 8]) -> Element {
        Element::Hexahedron(raw.map(VertexId::new))
    }

    #[test]
    fn mirrored_shape_is_reoriented() {
        let mesh = cube_mesh();
        let c = Candidate::score(
            &mesh,
            hex([0, 3, 2, 1, 4, 7, 6, 5]),
            Pattern::DiagonalFan,
            1e-6,
        )
        .unwrap();
        assert_eq!(c.quality, 1.0);
        assert!(mesh.signed_volume(&c.element) > 0.0);
    }

    #[test]
    fn degenerate_shapes_are_discarded() {
        let mesh = cube_mesh();
        // Repeated vertex.
        assert!(Candidate::score(&mesh, hex([0, 1, 2, 3, 4, 5, 6, 6]), Pattern::DiagonalFan, 1e-6).is_none());
        // Bow-tie ordering of the bottom and top faces.
        assert!(Candidate::score(&mesh, hex([0, 2, 1, 3, 4, 6, 5, 7]), Pattern::DiagonalFan, 1e-6).is_none());
    }

    #[test]
    fn pool_dedupes_and_sorts() {
        let mesh = cube_mesh();
        let a = Candidate::score(&mesh, hex([0, 1, 2, 3, 4, 5, 6, 7]), Pattern::DiagonalFan, 1e-6).unwrap();
        let b = Candidate::score(&mesh, hex([4, 5, 6, 7, 0, 1, 2, 3]), Pattern::DiamondCorner, 1e-6).unwrap();
        let mut pool = CandidatePool::new();
        pool.push(a);
        pool.push(b);
        assert_eq!(pool.len(), 1);
        let sorted = pool.into_sorted();
        assert_eq!(sorted[0].pattern, Pattern::DiagonalFan);
        assert_eq!(sorted[0].seq, 0);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut pool = CandidatePool::new();
        let e = |i: usize| Element::Tetrahedron([i, i + 1, i + 2, i + 3].map(VertexId::new));
        for (i, q) in [0.5, 0.9, 0.5, 0.9].into_iter().enumerate() {
            pool.push(Candidate {
                element: e(i * 4),
                quality: q,
                pattern: Pattern::PrismCorner,
                seq: 0,
            });
        }
        let seqs: Vec<_> = pool.into_sorted().iter().map(|c| c.seq).collect();
        assert_eq!(seqs, vec![1, 3, 0, 2]);
    }
}
