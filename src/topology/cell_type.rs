//! Cell type metadata and canonical local topology tables.
//!
//! Vertex orderings:
//!
//! - **Triangle**: `[v0, v1, v2]`.
//! - **Quadrilateral**: `[v0, v1, v2, v3]` in cyclic order.
//! - **Tetrahedron**: `[v0, v1, v2, v3]`.
//! - **Pyramid**: base quad `[0, 1, 2, 3]` and apex `4`.
//! - **Prism**: bottom triangle `[0, 1, 2]`, top triangle `[3, 4, 5]`,
//!   vertical edges `0-3`, `1-4`, `2-5`.
//! - **Hexahedron**: bottom face `[0, 1, 2, 3]`, top face `[4, 5, 6, 7]`,
//!   vertical edges `0-4`, `1-5`, `2-6`, `3-7`.
//!
//! Positively oriented solids have a positive signed volume as computed by
//! [`crate::geometry::quality::signed_volume_of`].

/// Cell types handled by the recombination engine.
#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum CellType {
    /// 2D simplex (boundary triangle).
    Triangle,
    /// 2D tensor-product cell (boundary quad).
    Quadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
    /// 3D pyramid.
    Pyramid,
    /// 3D wedge/prism.
    Prism,
    /// 3D tensor-product cell (hex).
    Hexahedron,
}

impl CellType {
    /// The solid cell type with `n` vertices, if any.
    pub fn solid_from_vertex_count(n: usize) -> Option<Self> {
        match n {
            4 => Some(CellType::Tetrahedron),
            5 => Some(CellType::Pyramid),
            6 => Some(CellType::Prism),
            8 => Some(CellType::Hexahedron),
            _ => None,
        }
    }

    /// Number of vertices of the cell.
    pub fn vertex_count(self) -> usize {
        match self {
            CellType::Triangle => 3,
            CellType::Quadrilateral | CellType::Tetrahedron => 4,
            CellType::Pyramid => 5,
            CellType::Prism => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// Local edges as pairs of local vertex indices.
    pub fn edges(self) -> &'static [(usize, usize)] {
        match self {
            CellType::Triangle => &TRI_EDGES,
            CellType::Quadrilateral => &QUAD_EDGES,
            CellType::Tetrahedron => &TET_EDGES,
            CellType::Pyramid => &PYRAMID_EDGES,
            CellType::Prism => &PRISM_EDGES,
            CellType::Hexahedron => &HEX_EDGES,
        }
    }

    /// Local faces, each as a cyclic list of local vertex indices.
    ///
    /// For positively oriented solids every face normal (right-hand rule)
    /// points outward.
    pub fn faces(self) -> &'static [&'static [usize]] {
        match self {
            CellType::Triangle => &TRI_FACES,
            CellType::Quadrilateral => &QUAD_FACES,
            CellType::Tetrahedron => &TET_FACES,
            CellType::Pyramid => &PYRAMID_FACES,
            CellType::Prism => &PRISM_FACES,
            CellType::Hexahedron => &HEX_FACES,
        }
    }

    /// Quadrilateral faces only.
    pub fn quad_faces(self) -> impl Iterator<Item = &'static [usize]> {
        self.faces().iter().copied().filter(|f| f.len() == 4)
    }

    /// Triangular faces only.
    pub fn tri_faces(self) -> impl Iterator<Item = &'static [usize]> {
        self.faces().iter().copied().filter(|f| f.len() == 3)
    }

    /// Short lowercase name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            CellType::Triangle => "triangle",
            CellType::Quadrilateral => "quadrilateral",
            CellType::Tetrahedron => "tetrahedron",
            CellType::Pyramid => "pyramid",
            CellType::Prism => "prism",
            CellType::Hexahedron => "hexahedron",
        }
    }
}

const TRI_EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];
const QUAD_EDGES: [(usize, usize); 4] = [(0, 1), (1, 2), (2, 3), (3, 0)];
const TET_EDGES: [(usize, usize); 6] = [(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)];
const HEX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];
const PRISM_EDGES: [(usize, usize); 9] = [
    (0, 1),
    (1, 2),
    (2, 0),
    (3, 4),
    (4, 5),
    (5, 3),
    (0, 3),
    (1, 4),
    (2, 5),
];
const PYRAMID_EDGES: [(usize, usize); 8] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (0, 4),
    (1, 4),
    (2, 4),
    (3, 4),
];

const TRI_FACE: [usize; 3] = [0, 1, 2];
const QUAD_FACE: [usize; 4] = [0, 1, 2, 3];
const TET_FACE_0: [usize; 3] = [0, 2, 1];
const TET_FACE_1: [usize; 3] = [0, 1, 3];
const TET_FACE_2: [usize; 3] = [1, 2, 3];
const TET_FACE_3: [usize; 3] = [0, 3, 2];
const HEX_FACE_0: [usize; 4] = [0, 3, 2, 1];
const HEX_FACE_1: [usize; 4] = [4, 5, 6, 7];
const HEX_FACE_2: [usize; 4] = [0, 1, 5, 4];
const HEX_FACE_3: [usize; 4] = [1, 2, 6, 5];
const HEX_FACE_4: [usize; 4] = [2, 3, 7, 6];
const HEX_FACE_5: [usize; 4] = [3, 0, 4, 7];
const PRISM_FACE_0: [usize; 3] = [0, 2, 1];
const PRISM_FACE_1: [usize; 3] = [3, 4, 5];
const PRISM_FACE_2: [usize; 4] = [0, 1, 4, 3];
const PRISM_FACE_3: [usize; 4] = [1, 2, 5, 4];
const PRISM_FACE_4: [usize; 4] = [2, 0, 3, 5];
const PYRAMID_FACE_0: [usize; 4] = [0, 3, 2, 1];
const PYRAMID_FACE_1: [usize; 3] = [0, 1, 4];
const PYRAMID_FACE_2: [usize; 3] = [1, 2, 4];
const PYRAMID_FACE_3: [usize; 3] = [2, 3, 4];
const PYRAMID_FACE_4: [usize; 3] = [3, 0, 4];

const TRI_FACES: [&[usize]; 1] = [&TRI_FACE];
const QUAD_FACES: [&[usize]; 1] = [&QUAD_FACE];
const TET_FACES: [&[usize]; 4] = [&TET_FACE_0, &TET_FACE_1, &TET_FACE_2, &TET_FACE_3];
const HEX_FACES: [&[usize]; 6] = [
    &HEX_FACE_0,
    &HEX_FACE_1,
    &HEX_FACE_2,
    &HEX_FACE_3,
    &HEX_FACE_4,
    &HEX_FACE_5,
];
const PRISM_FACES: [&[usize]; 5] = [
    &PRISM_FACE_0,
    &PRISM_FACE_1,
    &PRISM_FACE_2,
    &PRISM_FACE_3,
    &PRISM_FACE_4,
];
const PYRAMID_FACES: [&[usize]; 5] = [
    &PYRAMID_FACE_0,
    &PYRAMID_FACE_1,
    &PYRAMID_FACE_2,
    &PYRAMID_FACE_3,
    &PYRAMID_FACE_4,
];
