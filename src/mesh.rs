//! Mixed-element volume mesh and its tagged boundary surface.
//!
//! [`VolumeMesh`] owns a vertex arena and an element arena addressed by
//! [`VertexId`] / [`ElementId`](crate::topology::ElementId). [`BoundaryMesh`]
//! holds the surface triangles/quads, each tagged with the [`RegionId`] of the
//! surface it came from. Both constructors validate their input completely
//! before returning, so the recombination passes can assume well-formed data.

use crate::debug_invariants::DebugInvariants;
use crate::geometry::quality::{Point3, signed_volume_of};
use crate::mesh_error::MeshRecombineError;
use crate::topology::cell_type::CellType;
use crate::topology::element::{Element, Face};
use crate::topology::point::VertexId;
use std::collections::BTreeMap;
use std::fmt;

/// Tetrahedral or mixed-element volume mesh.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolumeMesh {
    /// Vertex coordinates indexed by [`VertexId`].
    pub vertices: Vec<Point3>,
    /// Live elements.
    pub elements: Vec<Element>,
}

impl VolumeMesh {
    /// Build a mesh from raw coordinates and per-element vertex index lists.
    ///
    /// Fails on any element whose vertex count is not 4, 5, 6 or 8, on any
    /// out-of-range vertex index and on non-finite coordinates.
    pub fn try_from_raw(
        vertices: Vec<Point3>,
        elements: &[Vec<usize>],
    ) -> Result<Self, MeshRecombineError> {
        check_coordinates(&vertices)?;
        let mut out = Vec::with_capacity(elements.len());
        for (idx, raw) in elements.iter().enumerate() {
            if CellType::solid_from_vertex_count(raw.len()).is_none() {
                return Err(MeshRecombineError::InvalidVertexCount {
                    element: idx,
                    found: raw.len(),
                });
            }
            let mut ids = Vec::with_capacity(raw.len());
            for &v in raw {
                if v >= vertices.len() {
                    return Err(MeshRecombineError::MissingVertex {
                        element: idx,
                        vertex: v,
                    });
                }
                ids.push(VertexId::new(v));
            }
            let element = Element::from_vertices(&ids).ok_or(
                MeshRecombineError::InvalidVertexCount {
                    element: idx,
                    found: raw.len(),
                },
            )?;
            out.push(element);
        }
        Ok(Self {
            vertices,
            elements: out,
        })
    }

    /// Build an all-tetrahedral mesh.
    pub fn from_tetrahedra(
        vertices: Vec<Point3>,
        tetrahedra: &[[usize; 4]],
    ) -> Result<Self, MeshRecombineError> {
        let raw: Vec<Vec<usize>> = tetrahedra.iter().map(|t| t.to_vec()).collect();
        Self::try_from_raw(vertices, &raw)
    }

    #[inline]
    pub fn point(&self, v: VertexId) -> Point3 {
        self.vertices[v.index()]
    }

    /// Coordinates of an element's vertices in element order.
    pub fn element_points(&self, element: &Element) -> Vec<Point3> {
        element.vertices().iter().map(|&v| self.point(v)).collect()
    }

    /// Signed volume of an element.
    pub fn signed_volume(&self, element: &Element) -> f64 {
        signed_volume_of(element.cell_type(), &self.element_points(element))
    }

    /// Sum of absolute element volumes.
    pub fn total_volume(&self) -> f64 {
        self.elements
            .iter()
            .map(|e| self.signed_volume(e).abs())
            .sum()
    }

    /// Append a vertex and return its handle.
    pub fn add_vertex(&mut self, p: Point3) -> VertexId {
        self.vertices.push(p);
        VertexId::new(self.vertices.len() - 1)
    }

    /// Number of live elements of a given type.
    pub fn count(&self, cell_type: CellType) -> usize {
        self.elements
            .iter()
            .filter(|e| e.cell_type() == cell_type)
            .count()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl DebugInvariants for VolumeMesh {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "VolumeMesh");
    }

    fn validate_invariants(&self) -> Result<(), MeshRecombineError> {
        check_coordinates(&self.vertices)?;
        for (idx, element) in self.elements.iter().enumerate() {
            for &v in element.vertices() {
                if v.index() >= self.vertices.len() {
                    return Err(MeshRecombineError::MissingVertex {
                        element: idx,
                        vertex: v.index(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_coordinates(vertices: &[Point3]) -> Result<(), MeshRecombineError> {
    match vertices
        .iter()
        .position(|p| p.iter().any(|c| !c.is_finite()))
    {
        Some(vertex) => Err(MeshRecombineError::NonFiniteCoordinate { vertex }),
        None => Ok(()),
    }
}

/// Ownership tag of a boundary face, inherited from the upstream surface model.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region {}", self.0)
    }
}

/// A boundary triangle or quad and its owning region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundaryFace {
    pub face: Face,
    pub region: RegionId,
}

/// Surface mesh of the domain boundary.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundaryMesh {
    pub faces: Vec<BoundaryFace>,
    /// Optional human-readable region names.
    pub region_names: BTreeMap<RegionId, String>,
}

impl BoundaryMesh {
    /// Build a boundary of triangles referencing vertices of `mesh`.
    pub fn try_from_triangles(
        mesh: &VolumeMesh,
        triangles: &[([usize; 3], RegionId)],
    ) -> Result<Self, MeshRecombineError> {
        let raw: Vec<(Vec<usize>, RegionId)> =
            triangles.iter().map(|(t, r)| (t.to_vec(), *r)).collect();
        Self::try_from_raw(mesh, &raw)
    }

    /// Build a boundary from raw triangles and quads referencing vertices of `mesh`.
    pub fn try_from_raw(
        mesh: &VolumeMesh,
        faces: &[(Vec<usize>, RegionId)],
    ) -> Result<Self, MeshRecombineError> {
        let mut out = Vec::with_capacity(faces.len());
        for (idx, (raw, region)) in faces.iter().enumerate() {
            if let Some(&vertex) = raw.iter().find(|&&v| v >= mesh.vertex_count()) {
                return Err(MeshRecombineError::MissingBoundaryVertex { face: idx, vertex });
            }
            let face = match raw.as_slice() {
                &[a, b, c] => Face::Triangle([a, b, c].map(VertexId::new)),
                &[a, b, c, d] => Face::Quad([a, b, c, d].map(VertexId::new)),
                _ => {
                    return Err(MeshRecombineError::InvalidBoundaryFace {
                        face: idx,
                        found: raw.len(),
                    });
                }
            };
            out.push(BoundaryFace {
                face,
                region: *region,
            });
        }
        Ok(Self {
            faces: out,
            region_names: BTreeMap::new(),
        })
    }

    /// Attach a name to a region.
    pub fn set_region_name(&mut self, region: RegionId, name: impl Into<String>) {
        self.region_names.insert(region, name.into());
    }

    pub fn region_name(&self, region: RegionId) -> Option<&str> {
        self.region_names.get(&region).map(String::as_str)
    }

    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .filter(|f| matches!(f.face, Face::Triangle(_)))
            .count()
    }

    pub fn quad_count(&self) -> usize {
        self.faces
            .iter()
            .filter(|f| matches!(f.face, Face::Quad(_)))
            .count()
    }

    /// Check that every face references a vertex of `mesh`.
    pub fn validate_against(&self, mesh: &VolumeMesh) -> Result<(), MeshRecombineError> {
        for (idx, f) in self.faces.iter().enumerate() {
            if let Some(v) = f
                .face
                .vertices()
                .iter()
                .find(|v| v.index() >= mesh.vertex_count())
            {
                return Err(MeshRecombineError::MissingBoundaryVertex {
                    face: idx,
                    vertex: v.index(),
                });
            }
        }
        Ok(())
    }
}

impl DebugInvariants for BoundaryMesh {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "BoundaryMesh");
    }

    /// Faces have distinct corners and no face is listed twice.
    fn validate_invariants(&self) -> Result<(), MeshRecombineError> {
        let mut seen = hashbrown::HashSet::with_capacity(self.faces.len());
        for (idx, f) in self.faces.iter().enumerate() {
            let mut key = f.face.vertices().to_vec();
            key.sort_unstable();
            if key.windows(2).any(|w| w[0] == w[1]) {
                return Err(MeshRecombineError::InvariantViolation(format!(
                    "boundary face {idx} repeats a vertex"
                )));
            }
            if !seen.insert(key) {
                return Err(MeshRecombineError::InvariantViolation(format!(
                    "boundary face {idx} is listed twice"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> Vec<Point3> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn rejects_bad_vertex_count() {
        let err = VolumeMesh::try_from_raw(unit_tet(), &[vec![0, 1, 2]]).unwrap_err();
        assert_eq!(
            err,
            MeshRecombineError::InvalidVertexCount {
                element: 0,
                found: 3
            }
        );
        let err = VolumeMesh::try_from_raw(unit_tet(), &[vec![0, 1, 2, 3, 0, 1, 2]]).unwrap_err();
        assert!(matches!(
            err,
            MeshRecombineError::InvalidVertexCount { found: 7, .. }
        ));
    }

    #[test]
    fn rejects_missing_vertex() {
        let err = VolumeMesh::from_tetrahedra(unit_tet(), &[[0, 1, 2, 9]]).unwrap_err();
        assert_eq!(
            err,
            MeshRecombineError::MissingVertex {
                element: 0,
                vertex: 9
            }
        );
    }

    #[test]
    fn rejects_non_finite() {
        let mut v = unit_tet();
        v[2][1] = f64::NAN;
        assert!(matches!(
            VolumeMesh::from_tetrahedra(v, &[[0, 1, 2, 3]]),
            Err(MeshRecombineError::NonFiniteCoordinate { vertex: 2 })
        ));
    }

    #[test]
    fn volume_of_unit_tet() {
        let mesh = VolumeMesh::from_tetrahedra(unit_tet(), &[[0, 1, 2, 3]]).unwrap();
        assert!((mesh.total_volume() - 1.0 / 6.0).abs() < 1e-15);
        assert_eq!(mesh.count(CellType::Tetrahedron), 1);
        assert!(mesh.validate_invariants().is_ok());
    }

    #[test]
    fn boundary_rejects_missing_vertex() {
        let mesh = VolumeMesh::from_tetrahedra(unit_tet(), &[[0, 1, 2, 3]]).unwrap();
        let err =
            BoundaryMesh::try_from_triangles(&mesh, &[([0, 1, 4], RegionId(1))]).unwrap_err();
        assert_eq!(
            err,
            MeshRecombineError::MissingBoundaryVertex { face: 0, vertex: 4 }
        );
        let err = BoundaryMesh::try_from_raw(&mesh, &[(vec![0, 1], RegionId(1))]).unwrap_err();
        assert!(matches!(
            err,
            MeshRecombineError::InvalidBoundaryFace { found: 2, .. }
        ));
    }

    #[test]
    fn boundary_counts_and_names() {
        let mesh = VolumeMesh::from_tetrahedra(unit_tet(), &[[0, 1, 2, 3]]).unwrap();
        let mut b = BoundaryMesh::try_from_raw(
            &mesh,
            &[
                (vec![0, 1, 2], RegionId(1)),
                (vec![0, 1, 2, 3], RegionId(2)),
            ],
        )
        .unwrap();
        b.set_region_name(RegionId(1), "inlet");
        assert_eq!(b.triangle_count(), 1);
        assert_eq!(b.quad_count(), 1);
        assert_eq!(b.region_name(RegionId(1)), Some("inlet"));
        assert_eq!(b.region_name(RegionId(2)), None);
        assert!(b.validate_against(&mesh).is_ok());
        assert!(b.validate_invariants().is_ok());
    }

    #[test]
    fn boundary_invariants_catch_duplicates() {
        let mesh = VolumeMesh::from_tetrahedra(unit_tet(), &[[0, 1, 2, 3]]).unwrap();
        let b = BoundaryMesh::try_from_triangles(
            &mesh,
            &[([0, 1, 2], RegionId(1)), ([2, 1, 0], RegionId(2))],
        )
        .unwrap();
        assert!(matches!(
            b.validate_invariants(),
            Err(MeshRecombineError::InvariantViolation(_))
        ));
        let b = BoundaryMesh::try_from_triangles(&mesh, &[([0, 1, 1], RegionId(1))]).unwrap();
        assert!(b.validate_invariants().is_err());
    }
}
