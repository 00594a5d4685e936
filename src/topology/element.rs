//! Volume elements and their faces as vertex tuples.
//!
//! Vertex order is load-bearing: facets, diagonals and corners are all derived
//! from the local tables in [`CellType`].

use crate::topology::cell_type::CellType;
use crate::topology::point::VertexId;

/// A solid element of the mixed mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Element {
    Tetrahedron([VertexId; 4]),
    Pyramid([VertexId; 5]),
    Prism([VertexId; 6]),
    Hexahedron([VertexId; 8]),
}

impl Element {
    /// Build an element from an ordered vertex tuple of length 4, 5, 6 or 8.
    pub fn from_vertices(vertices: &[VertexId]) -> Option<Self> {
        Some(match vertices.len() {
            4 => Element::Tetrahedron(vertices.try_into().ok()?),
            5 => Element::Pyramid(vertices.try_into().ok()?),
            6 => Element::Prism(vertices.try_into().ok()?),
            8 => Element::Hexahedron(vertices.try_into().ok()?),
            _ => return None,
        })
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            Element::Tetrahedron(_) => CellType::Tetrahedron,
            Element::Pyramid(_) => CellType::Pyramid,
            Element::Prism(_) => CellType::Prism,
            Element::Hexahedron(_) => CellType::Hexahedron,
        }
    }

    /// Ordered vertex tuple.
    pub fn vertices(&self) -> &[VertexId] {
        match self {
            Element::Tetrahedron(v) => v,
            Element::Pyramid(v) => v,
            Element::Prism(v) => v,
            Element::Hexahedron(v) => v,
        }
    }

    /// Connectivity as raw `u32` indices, for solver exporters.
    pub fn connectivity_u32(&self) -> &[u32] {
        bytemuck::cast_slice(self.vertices())
    }

    #[inline]
    pub fn contains(&self, v: VertexId) -> bool {
        self.vertices().contains(&v)
    }

    pub fn is_tetrahedron(&self) -> bool {
        matches!(self, Element::Tetrahedron(_))
    }

    /// `true` for hexahedra and prisms.
    pub fn is_macro(&self) -> bool {
        matches!(self, Element::Hexahedron(_) | Element::Prism(_))
    }

    /// Faces in canonical order, outward for positively oriented elements.
    pub fn faces(&self) -> impl Iterator<Item = Face> + '_ {
        let verts = self.vertices();
        self.cell_type()
            .faces()
            .iter()
            .map(move |local| Face::from_local(verts, local))
    }

    /// Edges as vertex pairs in local-table order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let verts = self.vertices();
        self.cell_type()
            .edges()
            .iter()
            .map(move |&(a, b)| (verts[a], verts[b]))
    }

    /// The same element with reversed orientation.
    pub fn reversed(&self) -> Self {
        match *self {
            Element::Tetrahedron([a, b, c, d]) => Element::Tetrahedron([a, c, b, d]),
            Element::Pyramid([a, b, c, d, e]) => Element::Pyramid([a, d, c, b, e]),
            Element::Prism([a, b, c, d, e, f]) => Element::Prism([d, e, f, a, b, c]),
            Element::Hexahedron([a, b, c, d, e, f, g, h]) => {
                Element::Hexahedron([e, f, g, h, a, b, c, d])
            }
        }
    }
}

/// A triangular or quadrilateral face as a cyclic vertex tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Face {
    Triangle([VertexId; 3]),
    Quad([VertexId; 4]),
}

impl Face {
    fn from_local(verts: &[VertexId], local: &[usize]) -> Self {
        match *local {
            [a, b, c] => Face::Triangle([verts[a], verts[b], verts[c]]),
            [a, b, c, d] => Face::Quad([verts[a], verts[b], verts[c], verts[d]]),
            _ => unreachable!("face tables only hold triangles and quads"),
        }
    }

    pub fn vertices(&self) -> &[VertexId] {
        match self {
            Face::Triangle(v) => v,
            Face::Quad(v) => v,
        }
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            Face::Triangle(_) => CellType::Triangle,
            Face::Quad(_) => CellType::Quadrilateral,
        }
    }

    /// The same face with opposite winding.
    pub fn reversed(&self) -> Self {
        match *self {
            Face::Triangle([a, b, c]) => Face::Triangle([a, c, b]),
            Face::Quad([a, b, c, d]) => Face::Quad([a, d, c, b]),
        }
    }
}
