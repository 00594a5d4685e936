//! Conformity ledger: globally committed facets and diagonals.
//!
//! For every accepted macro-element the ledger records
//! - *facets*: the four triangles spanned by each quadrilateral face (both
//!   splits) and each triangular face, mapped to the face they belong to;
//! - *short diagonals*: the two diagonals of each quadrilateral face;
//! - *long diagonals*: the element edges.
//!
//! A face may be registered by two elements that share it whole; every other
//! overlap between a candidate and the ledger is a conformity violation.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshRecombineError;
use crate::recombine::keys::{DiagonalKey, FaceKey, FacetKey, quad_diagonals, quad_facets};
use crate::topology::element::{Element, Face};
use hashbrown::{HashMap, HashSet};

/// Why a candidate does not conform to the committed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conflict {
    /// A facet of the candidate belongs to a different committed face, or the
    /// shared face already has two owners.
    Facet,
    /// A candidate edge is a committed face diagonal.
    EdgeOnDiagonal,
    /// A candidate face diagonal is a committed edge.
    DiagonalOnEdge,
}

#[derive(Clone, Debug, Default)]
pub struct ConformityLedger {
    facets: HashMap<FacetKey, FaceKey>,
    face_owners: HashMap<FaceKey, u8>,
    short_diagonals: HashSet<DiagonalKey>,
    long_diagonals: HashSet<DiagonalKey>,
}

impl ConformityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `element` against the committed set without modifying it.
    pub fn check(&self, element: &Element) -> Result<(), Conflict> {
        for face in element.faces() {
            let key = FaceKey::from(&face);
            for facet in face_facets(&face) {
                if let Some(owner) = self.facets.get(&facet) {
                    if *owner != key {
                        return Err(Conflict::Facet);
                    }
                }
            }
            if self.face_owners.get(&key).copied().unwrap_or(0) >= 2 {
                return Err(Conflict::Facet);
            }
        }
        for (a, b) in element.edges() {
            if self.short_diagonals.contains(&DiagonalKey::new(a, b)) {
                return Err(Conflict::EdgeOnDiagonal);
            }
        }
        for face in element.faces() {
            if let Face::Quad(q) = face {
                for d in quad_diagonals(q) {
                    if self.long_diagonals.contains(&d) {
                        return Err(Conflict::DiagonalOnEdge);
                    }
                }
            }
        }
        Ok(())
    }

    /// Register the facets and diagonals of an accepted element.
    pub fn register(&mut self, element: &Element) {
        for face in element.faces() {
            let key = FaceKey::from(&face);
            for facet in face_facets(&face) {
                self.facets.insert(facet, key);
            }
            *self.face_owners.entry(key).or_insert(0) += 1;
            if let Face::Quad(q) = face {
                self.short_diagonals.extend(quad_diagonals(q));
            }
        }
        self.long_diagonals
            .extend(element.edges().map(|(a, b)| DiagonalKey::new(a, b)));
    }

    pub fn contains_facet(&self, facet: &FacetKey) -> bool {
        self.facets.contains_key(facet)
    }

    pub fn contains_short_diagonal(&self, d: &DiagonalKey) -> bool {
        self.short_diagonals.contains(d)
    }

    pub fn contains_long_diagonal(&self, d: &DiagonalKey) -> bool {
        self.long_diagonals.contains(d)
    }

    /// Number of registrations of a whole face (0, 1 or 2).
    pub fn face_owner_count(&self, face: &FaceKey) -> u8 {
        self.face_owners.get(face).copied().unwrap_or(0)
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Rebuild a ledger from a set of accepted elements, reporting the first
    /// registration that would not have passed [`check`](Self::check).
    pub fn rebuild<'a>(
        elements: impl IntoIterator<Item = &'a Element>,
    ) -> Result<Self, MeshRecombineError> {
        let mut ledger = Self::new();
        for (idx, element) in elements.into_iter().enumerate() {
            if let Err(conflict) = ledger.check(element) {
                return Err(MeshRecombineError::InvariantViolation(format!(
                    "macro-element {idx} conflicts with the ledger: {conflict:?}"
                )));
            }
            ledger.register(element);
        }
        Ok(ledger)
    }
}

fn face_facets(face: &Face) -> Vec<FacetKey> {
    match *face {
        Face::Triangle([a, b, c]) => vec![FacetKey::new(a, b, c)],
        Face::Quad(q) => quad_facets(q).to_vec(),
    }
}

impl DebugInvariants for ConformityLedger {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "ConformityLedger");
    }

    fn validate_invariants(&self) -> Result<(), MeshRecombineError> {
        if let Some((face, n)) = self.face_owners.iter().find(|(_, n)| **n > 2) {
            return Err(MeshRecombineError::InvariantViolation(format!(
                "face {face:?} registered by {n} elements"
            )));
        }
        if let Some(d) = self
            .short_diagonals
            .iter()
            .find(|d| self.long_diagonals.contains(*d))
        {
            return Err(MeshRecombineError::InvariantViolation(format!(
                "{d:?} is both a face diagonal and an element edge"
            )));
        }
        for (facet, face) in &self.facets {
            if !self.face_owners.contains_key(face) {
                return Err(MeshRecombineError::InvariantViolation(format!(
                    "facet {facet:?} points at unregistered face {face:?}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::point::VertexId;

    fn hex(raw: [usize; 8]) -> Element {
        Element::Hexahedron(raw.map(VertexId::new))
    }

    // Two unit cubes stacked along x share the face {1, 2, 5, 6}:
    //  0..7 is the first cube, 1, 8, 9, 2, 5, 10, 11, 6 the second.
    fn left() -> Element {
        hex([0, 1, 2, 3, 4, 5, 6, 7])
    }

    fn right() -> Element {
        hex([1, 8, 9, 2, 5, 10, 11, 6])
    }

    #[test]
    fn shared_face_is_allowed_once() {
        let mut ledger = ConformityLedger::new();
        ledger.register(&left());
        assert_eq!(ledger.check(&right()), Ok(()));
        ledger.register(&right());
        assert!(ledger.validate_invariants().is_ok());
        let shared = FaceKey::quad([1, 2, 6, 5].map(VertexId::new));
        assert_eq!(ledger.face_owner_count(&shared), 2);
        // Both splits of the shared quad are registered.
        let v = VertexId::new;
        assert!(ledger.contains_facet(&FacetKey::new(v(1), v(2), v(6))));
        assert!(ledger.contains_facet(&FacetKey::new(v(1), v(5), v(2))));
        // A third element on the same face is rejected.
        let third = hex([1, 2, 6, 5, 12, 13, 14, 15]);
        assert_eq!(ledger.check(&third), Err(Conflict::Facet));
    }

    #[test]
    fn half_shared_face_is_rejected() {
        let mut ledger = ConformityLedger::new();
        ledger.register(&left());
        // Shares only the triangle {1, 2, 6} of the face {1, 2, 6, 5}.
        let skew = hex([1, 8, 9, 2, 12, 10, 11, 6]);
        assert_eq!(ledger.check(&skew), Err(Conflict::Facet));
    }

    #[test]
    fn edge_on_committed_diagonal_is_rejected() {
        let mut ledger = ConformityLedger::new();
        ledger.register(&left());
        // Uses the face diagonal 1-6 of the first cube as an edge.
        let tilted = hex([1, 6, 20, 21, 22, 23, 24, 25]);
        assert_eq!(ledger.check(&tilted), Err(Conflict::EdgeOnDiagonal));
    }

    #[test]
    fn diagonal_on_committed_edge_is_rejected() {
        let mut ledger = ConformityLedger::new();
        ledger.register(&left());
        // Face {0, 20, 1, 21} has the committed edge 0-1 as its diagonal.
        let crossing = hex([0, 20, 1, 21, 22, 23, 24, 25]);
        assert_eq!(ledger.check(&crossing), Err(Conflict::DiagonalOnEdge));
    }

    #[test]
    fn rebuild_detects_conflicts() {
        assert!(ConformityLedger::rebuild([&left(), &right()]).is_ok());
        assert!(ConformityLedger::rebuild([&left(), &hex([1, 8, 9, 2, 12, 10, 11, 6])]).is_err());
    }
}
