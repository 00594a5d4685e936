//! Structured tetrahedral generators with boundary region tagging.
//!
//! [`kuhn_box_mesh`] splits a box into cubes and every cube into the six
//! Kuhn tetrahedra around its main diagonal, so the whole grid recombines
//! into hexahedra. The single-cell fixtures cover the other hexahedron and
//! prism patterns.

use crate::geometry::quality::{Point3, centroid};
use crate::mesh::{BoundaryFace, BoundaryMesh, RegionId, VolumeMesh};
use crate::mesh_error::MeshRecombineError;
use crate::recombine::keys::FacetKey;
use crate::topology::element::{Element, Face};
use crate::topology::point::VertexId;
use hashbrown::HashMap;

/// Boundary region name for the minimum-x side.
pub const BOUNDARY_X_MIN: &str = "boundary_x_min";
/// Boundary region name for the maximum-x side.
pub const BOUNDARY_X_MAX: &str = "boundary_x_max";
/// Boundary region name for the minimum-y side.
pub const BOUNDARY_Y_MIN: &str = "boundary_y_min";
/// Boundary region name for the maximum-y side.
pub const BOUNDARY_Y_MAX: &str = "boundary_y_max";
/// Boundary region name for the minimum-z side.
pub const BOUNDARY_Z_MIN: &str = "boundary_z_min";
/// Boundary region name for the maximum-z side.
pub const BOUNDARY_Z_MAX: &str = "boundary_z_max";

/// Region assigned to boundary faces that lie on no box side.
pub const UNCLASSIFIED_REGION: RegionId = RegionId(0);

/// Region ids of the box sides, in `x_min, x_max, y_min, y_max, z_min, z_max` order.
pub const SIDE_REGIONS: [RegionId; 6] = [
    RegionId(1),
    RegionId(2),
    RegionId(3),
    RegionId(4),
    RegionId(5),
    RegionId(6),
];

const SIDE_NAMES: [&str; 6] = [
    BOUNDARY_X_MIN,
    BOUNDARY_X_MAX,
    BOUNDARY_Y_MIN,
    BOUNDARY_Y_MAX,
    BOUNDARY_Z_MIN,
    BOUNDARY_Z_MAX,
];

/// Local hexahedron corners of the six Kuhn tetrahedra, all positively
/// oriented for a positively oriented cube.
const KUHN_TETS: [[usize; 4]; 6] = [
    [0, 1, 2, 6],
    [0, 5, 1, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 4, 5, 6],
    [0, 7, 4, 6],
];

/// The unit cube corners in hexahedron order.
pub const UNIT_CUBE: [Point3; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// A generated tetrahedral mesh and its tagged boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedMesh {
    pub mesh: VolumeMesh,
    pub boundary: BoundaryMesh,
}

fn invalid_geometry(message: impl Into<String>) -> MeshRecombineError {
    MeshRecombineError::InvalidGeometry(message.into())
}

/// Generate a Kuhn-triangulated box over `[min, max]` with `nx`×`ny`×`nz` cubes.
///
/// Boundary triangles are tagged with [`SIDE_REGIONS`] and named after the
/// `BOUNDARY_*` constants.
pub fn kuhn_box_mesh(
    nx: usize,
    ny: usize,
    nz: usize,
    min: Point3,
    max: Point3,
) -> Result<GeneratedMesh, MeshRecombineError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(invalid_geometry("nx, ny, and nz must be positive"));
    }
    if (0..3).any(|d| !(max[d] > min[d])) {
        return Err(invalid_geometry("max must exceed min on every axis"));
    }

    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let dz = (max[2] - min[2]) / nz as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        let z = min[2] + dz * k as f64;
        for j in 0..=ny {
            let y = min[1] + dy * j as f64;
            for i in 0..=nx {
                let x = min[0] + dx * i as f64;
                vertices.push([x, y, z]);
            }
        }
    }

    let mut tets = Vec::with_capacity(6 * nx * ny * nz);
    let row_stride = nx + 1;
    let slab_stride = row_stride * (ny + 1);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let base = k * slab_stride + j * row_stride + i;
                let v0 = base;
                let v1 = base + 1;
                let v3 = base + row_stride;
                let v2 = v3 + 1;
                let v4 = base + slab_stride;
                let v5 = v4 + 1;
                let v7 = v4 + row_stride;
                let v6 = v7 + 1;
                let cube = [v0, v1, v2, v3, v4, v5, v6, v7];
                tets.extend(KUHN_TETS.iter().map(|t| t.map(|l| cube[l])));
            }
        }
    }

    let mesh = VolumeMesh::from_tetrahedra(vertices, &tets)?;
    let boundary = boundary_triangles(&mesh, |p| side_region(p, min, max));
    Ok(GeneratedMesh { mesh, boundary })
}

/// A unit cube split into a central tetrahedron and four corner tetrahedra.
pub fn five_tet_cube() -> GeneratedMesh {
    fixture(
        UNIT_CUBE.to_vec(),
        &[
            [1, 3, 4, 6],
            [0, 1, 3, 4],
            [2, 3, 1, 6],
            [5, 4, 6, 1],
            [7, 6, 4, 3],
        ],
    )
}

/// A unit cube split into six tetrahedra around the diagonal `0-6`.
pub fn kuhn_cube() -> GeneratedMesh {
    fixture(UNIT_CUBE.to_vec(), &KUHN_TETS)
}

/// A right triangular prism split into three tetrahedra.
///
/// Bottom triangle `0, 1, 2` at `z = 0`, top triangle `3, 4, 5` at `z = 1`.
pub fn three_tet_prism() -> GeneratedMesh {
    fixture(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
        ],
        &[[0, 1, 2, 5], [0, 1, 5, 4], [0, 4, 5, 3]],
    )
}

/// Build a fixture from hand-checked tetrahedra; the unit box tags its boundary.
fn fixture(vertices: Vec<Point3>, tets: &[[usize; 4]]) -> GeneratedMesh {
    let mesh = VolumeMesh {
        vertices,
        elements: tets
            .iter()
            .map(|t| Element::Tetrahedron(t.map(VertexId::new)))
            .collect(),
    };
    let boundary = boundary_triangles(&mesh, |p| side_region(p, [0.0; 3], [1.0; 3]));
    GeneratedMesh { mesh, boundary }
}

/// Region of a boundary face whose centroid is `p` on the box `[min, max]`.
pub fn side_region(p: Point3, min: Point3, max: Point3) -> RegionId {
    for d in 0..3 {
        let tol = 1e-9 * (max[d] - min[d]).abs().max(1.0);
        if (p[d] - min[d]).abs() <= tol {
            return SIDE_REGIONS[2 * d];
        }
        if (p[d] - max[d]).abs() <= tol {
            return SIDE_REGIONS[2 * d + 1];
        }
    }
    UNCLASSIFIED_REGION
}

/// Extract the outward boundary triangles of a tetrahedral mesh.
///
/// A facet is on the boundary when exactly one tetrahedron uses it. Faces
/// are emitted in element order and tagged by `region_of` applied to their
/// centroid. Side names are attached for every [`SIDE_REGIONS`] tag in use.
pub fn boundary_triangles(
    mesh: &VolumeMesh,
    region_of: impl Fn(Point3) -> RegionId,
) -> BoundaryMesh {
    let mut counts: HashMap<FacetKey, usize> = HashMap::new();
    for element in mesh.elements.iter().filter(|e| e.is_tetrahedron()) {
        for face in element.faces() {
            if let Face::Triangle([a, b, c]) = face {
                *counts.entry(FacetKey::new(a, b, c)).or_insert(0) += 1;
            }
        }
    }
    let mut boundary = BoundaryMesh::default();
    for element in mesh.elements.iter().filter(|e| e.is_tetrahedron()) {
        for face in element.faces() {
            let Face::Triangle([a, b, c]) = face else {
                continue;
            };
            if counts.get(&FacetKey::new(a, b, c)) != Some(&1) {
                continue;
            }
            let region = region_of(centroid([a, b, c].map(|v| mesh.point(v))));
            boundary.faces.push(BoundaryFace { face, region });
        }
    }
    for (region, name) in SIDE_REGIONS.iter().zip(SIDE_NAMES) {
        if boundary.faces.iter().any(|f| f.region == *region) {
            boundary.set_region_name(*region, name);
        }
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::CellType;

    #[test]
    fn kuhn_box_counts_and_volume() {
        let g = kuhn_box_mesh(2, 3, 1, [0.0; 3], [2.0, 3.0, 1.0]).unwrap();
        assert_eq!(g.mesh.vertex_count(), 3 * 4 * 2);
        assert_eq!(g.mesh.count(CellType::Tetrahedron), 36);
        assert!((g.mesh.total_volume() - 6.0).abs() < 1e-12);
        for e in &g.mesh.elements {
            assert!(g.mesh.signed_volume(e) > 0.0);
        }
        // Two triangles per boundary cube face: 2 * (2*3 + 2*1 + 3*1) * 2.
        assert_eq!(g.boundary.triangle_count(), 44);
        assert!(
            g.boundary
                .faces
                .iter()
                .all(|f| f.region != UNCLASSIFIED_REGION)
        );
        assert_eq!(g.boundary.region_name(SIDE_REGIONS[5]), Some(BOUNDARY_Z_MAX));
    }

    #[test]
    fn rejects_empty_box() {
        assert!(matches!(
            kuhn_box_mesh(0, 1, 1, [0.0; 3], [1.0; 3]),
            Err(MeshRecombineError::InvalidGeometry(_))
        ));
        assert!(kuhn_box_mesh(1, 1, 1, [0.0; 3], [1.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn fixtures_are_positive_and_closed() {
        for (g, volume, triangles) in [
            (kuhn_cube(), 1.0, 12),
            (five_tet_cube(), 1.0, 12),
            (three_tet_prism(), 0.5, 8),
        ] {
            assert!((g.mesh.total_volume() - volume).abs() < 1e-12);
            assert!(g.mesh.elements.iter().all(|e| g.mesh.signed_volume(e) > 0.0));
            assert_eq!(g.boundary.triangle_count(), triangles);
        }
    }

    #[test]
    fn prism_slanted_side_is_unclassified() {
        let g = three_tet_prism();
        let slanted = g
            .boundary
            .faces
            .iter()
            .filter(|f| f.region == UNCLASSIFIED_REGION)
            .count();
        assert_eq!(slanted, 2);
    }
}
