//! Canonical facet and diagonal keys.
//!
//! Keys are sorted fixed-size vertex arrays, so structural equality is exact
//! and they can be used directly as hash-map keys.

use crate::topology::element::Face;
use crate::topology::point::VertexId;

/// Unordered triangle key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacetKey([VertexId; 3]);

impl FacetKey {
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Self {
        let mut v = [a, b, c];
        v.sort_unstable();
        FacetKey(v)
    }

    pub fn vertices(&self) -> [VertexId; 3] {
        self.0
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.0.contains(&v)
    }
}

/// Unordered vertex-pair key (edge or diagonal).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagonalKey([VertexId; 2]);

impl DiagonalKey {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            DiagonalKey([a, b])
        } else {
            DiagonalKey([b, a])
        }
    }

    pub fn vertices(&self) -> [VertexId; 2] {
        self.0
    }
}

/// Unordered key of a whole element face (3 or 4 vertices).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaceKey {
    Triangle([VertexId; 3]),
    Quad([VertexId; 4]),
}

impl FaceKey {
    pub fn triangle(a: VertexId, b: VertexId, c: VertexId) -> Self {
        FaceKey::Triangle(FacetKey::new(a, b, c).0)
    }

    pub fn quad(mut q: [VertexId; 4]) -> Self {
        q.sort_unstable();
        FaceKey::Quad(q)
    }
}

impl From<&Face> for FaceKey {
    fn from(face: &Face) -> Self {
        match *face {
            Face::Triangle([a, b, c]) => FaceKey::triangle(a, b, c),
            Face::Quad(q) => FaceKey::quad(q),
        }
    }
}

/// The four triangles spanned by a quad `a-b-c-d`: both splits.
pub fn quad_facets(q: [VertexId; 4]) -> [FacetKey; 4] {
    let [a, b, c, d] = q;
    [
        FacetKey::new(a, b, c),
        FacetKey::new(a, c, d),
        FacetKey::new(a, b, d),
        FacetKey::new(b, c, d),
    ]
}

/// The two diagonals of a quad `a-b-c-d`.
pub fn quad_diagonals(q: [VertexId; 4]) -> [DiagonalKey; 2] {
    [DiagonalKey::new(q[0], q[2]), DiagonalKey::new(q[1], q[3])]
}
