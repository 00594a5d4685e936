//! Vertex-to-vertex and vertex-to-element lookup tables.
//!
//! The index is a snapshot of the live element set: it is rebuilt whenever
//! element membership changes and never patched in place. Neighbor sets are
//! ordered so every traversal is deterministic.

use crate::mesh::VolumeMesh;
use crate::topology::cell_type::CellType;
use crate::topology::element::Element;
use crate::topology::point::{ElementId, VertexId};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
    vertex_to_vertices: Vec<BTreeSet<VertexId>>,
    vertex_to_elements: Vec<Vec<ElementId>>,
}

impl AdjacencyIndex {
    /// Index every element accepted by `include`.
    pub fn build<F>(mesh: &VolumeMesh, mut include: F) -> Self
    where
        F: FnMut(ElementId, &Element) -> bool,
    {
        let n = mesh.vertex_count();
        let mut vertex_to_vertices = vec![BTreeSet::new(); n];
        let mut vertex_to_elements = vec![Vec::new(); n];
        for (idx, element) in mesh.elements.iter().enumerate() {
            let id = ElementId::new(idx);
            if !include(id, element) {
                continue;
            }
            for &v in element.vertices() {
                vertex_to_elements[v.index()].push(id);
            }
            for (a, b) in element.edges() {
                vertex_to_vertices[a.index()].insert(b);
                vertex_to_vertices[b.index()].insert(a);
            }
        }
        Self {
            vertex_to_vertices,
            vertex_to_elements,
        }
    }

    /// Index the elements whose type is in `types`.
    pub fn build_for(mesh: &VolumeMesh, types: &[CellType]) -> Self {
        Self::build(mesh, |_, e| types.contains(&e.cell_type()))
    }

    /// Vertices sharing an element edge with `v`.
    pub fn neighbors(&self, v: VertexId) -> &BTreeSet<VertexId> {
        &self.vertex_to_vertices[v.index()]
    }

    /// Indexed elements incident to `v`, in ascending id order.
    pub fn elements(&self, v: VertexId) -> &[ElementId] {
        &self.vertex_to_elements[v.index()]
    }

    pub fn are_adjacent(&self, a: VertexId, b: VertexId) -> bool {
        self.vertex_to_vertices[a.index()].contains(&b)
    }

    /// Vertices adjacent to both `a` and `b`, ascending.
    pub fn common_neighbors(&self, a: VertexId, b: VertexId) -> Vec<VertexId> {
        self.neighbors(a)
            .intersection(self.neighbors(b))
            .copied()
            .collect()
    }

    /// Indexed elements containing every vertex in `vertices`, ascending.
    pub fn elements_containing(&self, mesh: &VolumeMesh, vertices: &[VertexId]) -> Vec<ElementId> {
        let Some((&first, rest)) = vertices.split_first() else {
            return Vec::new();
        };
        self.elements(first)
            .iter()
            .copied()
            .filter(|id| {
                let e = &mesh.elements[id.index()];
                rest.iter().all(|&v| e.contains(v))
            })
            .collect()
    }

    /// Indexed elements whose vertices all lie in `vertices`, ascending.
    pub fn elements_within(&self, mesh: &VolumeMesh, vertices: &[VertexId]) -> Vec<ElementId> {
        let mut out = BTreeSet::new();
        for &v in vertices {
            for &id in self.elements(v) {
                let e = &mesh.elements[id.index()];
                if e.vertices().iter().all(|w| vertices.contains(w)) {
                    out.insert(id);
                }
            }
        }
        out.into_iter().collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_to_vertices.len()
    }
}
