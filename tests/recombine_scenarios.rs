use mesh_recombine::geometry::quality::min_scaled_jacobian;
use mesh_recombine::mesh::{BoundaryMesh, VolumeMesh};
use mesh_recombine::mesh_generation::{
    UNIT_CUBE, five_tet_cube, kuhn_box_mesh, kuhn_cube, three_tet_prism,
};
use mesh_recombine::recombine::ledger::ConformityLedger;
use mesh_recombine::recombine::{RecombineOptions, Recombinator, recombine};
use mesh_recombine::topology::CellType;

fn assert_close(a: f64, b: f64) {
    assert!(
        (a - b).abs() <= 1e-9 * b.abs().max(1.0),
        "expected {b}, got {a}"
    );
}

fn all_positive(mesh: &VolumeMesh) -> bool {
    mesh.elements.iter().all(|e| mesh.signed_volume(e) > 0.0)
}

#[test]
fn perfect_cube_becomes_one_hexahedron() {
    let mut g = kuhn_cube();
    let report = recombine(&mut g.mesh, &mut g.boundary, &RecombineOptions::default()).unwrap();

    assert_eq!(g.mesh.elements.len(), 1);
    let hex = g.mesh.elements[0];
    assert_eq!(hex.cell_type(), CellType::Hexahedron);
    assert_close(g.mesh.signed_volume(&hex), 1.0);
    assert_eq!(
        min_scaled_jacobian(CellType::Hexahedron, &g.mesh.element_points(&hex)),
        1.0
    );
    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.accepted[0].quality, 1.0);
    assert_close(report.volume_percent(CellType::Hexahedron), 100.0);
    assert_eq!(g.boundary.quad_count(), 6);
    assert_eq!(g.boundary.triangle_count(), 0);
}

#[test]
fn isolated_tetrahedra_are_unchanged() {
    let mut mesh = VolumeMesh::from_tetrahedra(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [5.0, 5.0, 5.0],
            [6.0, 5.0, 5.0],
            [5.0, 6.0, 5.0],
            [5.0, 5.0, 6.0],
        ],
        &[[0, 1, 2, 3], [4, 5, 6, 7]],
    )
    .unwrap();
    let before = mesh.clone();
    let mut boundary = BoundaryMesh::default();
    let report = recombine(&mut mesh, &mut boundary, &RecombineOptions::default()).unwrap();
    assert_eq!(mesh, before);
    assert!(report.accepted.is_empty());
    assert_eq!(report.candidates.get(&CellType::Hexahedron), Some(&0));
    assert_eq!(report.candidates.get(&CellType::Prism), Some(&0));
}

#[test]
fn inverted_corner_keeps_all_tetrahedra() {
    let mut g = kuhn_cube();
    // Pull the (1, 1, 0) corner inside the bottom face so that corner of
    // the cube becomes reflex; every tetrahedron stays positive.
    g.mesh.vertices[2] = [0.4, 0.4, 0.0];
    assert!(all_positive(&g.mesh));
    let before = g.mesh.clone();
    let options = RecombineOptions {
        prisms: false,
        ..Default::default()
    };
    let report = recombine(&mut g.mesh, &mut g.boundary, &options).unwrap();
    assert_eq!(g.mesh, before);
    assert_eq!(report.count(CellType::Tetrahedron), 6);
    assert_eq!(report.count(CellType::Hexahedron), 0);
    assert!(report.accepted.is_empty());
}

#[test]
fn five_tetrahedra_cube_becomes_one_hexahedron() {
    let mut g = five_tet_cube();
    let report = recombine(&mut g.mesh, &mut g.boundary, &RecombineOptions::default()).unwrap();
    assert_eq!(report.count(CellType::Hexahedron), 1);
    assert_eq!(g.mesh.elements.len(), 1);
    assert_close(report.output_volume, 1.0);
}

#[test]
fn prism_fixture_becomes_one_prism() {
    let mut g = three_tet_prism();
    let report = recombine(&mut g.mesh, &mut g.boundary, &RecombineOptions::default()).unwrap();
    assert_eq!(report.count(CellType::Prism), 1);
    assert!(report.accepted_of(CellType::Prism).all(|a| a.quality >= 0.15));
    assert!(all_positive(&g.mesh));
}

#[test]
fn grid_recombines_completely() {
    let mut g = kuhn_box_mesh(3, 2, 2, [-1.0, 0.0, 2.0], [2.0, 1.0, 3.0]).unwrap();
    let volume = g.mesh.total_volume();
    let boundary_triangles = g.boundary.triangle_count();
    let report = recombine(&mut g.mesh, &mut g.boundary, &RecombineOptions::default()).unwrap();

    assert_eq!(report.input_tetrahedra, 72);
    assert_eq!(report.count(CellType::Hexahedron), 12);
    assert_eq!(g.mesh.elements.len(), 12);
    assert_close(report.output_volume, volume);
    assert_eq!(g.boundary.quad_count(), boundary_triangles / 2);
    assert_eq!(g.boundary.triangle_count(), 0);
    assert!(ConformityLedger::rebuild(&g.mesh.elements).is_ok());
}

#[test]
fn capped_face_is_closed_by_a_pyramid() {
    let mut vertices = UNIT_CUBE.to_vec();
    vertices.push([0.5, 0.5, 1.5]);
    let mut mesh =
        VolumeMesh::try_from_raw(vertices, &[(0..8).collect(), vec![4, 5, 6, 8], vec![4, 6, 7, 8]])
            .unwrap();
    let volume = mesh.total_volume();
    let mut boundary = BoundaryMesh::default();
    let report = Recombinator::new(RecombineOptions::default())
        .run(&mut mesh, &mut boundary)
        .unwrap();

    assert_eq!(report.pyramids_inserted, 1);
    assert_eq!(report.count(CellType::Pyramid), 1);
    // One new tetrahedron per lateral triangle of the two capping tetrahedra.
    assert_eq!(report.count(CellType::Tetrahedron), 4);
    assert_eq!(report.count(CellType::Hexahedron), 1);
    assert!(all_positive(&mesh));
    assert_close(report.output_volume, volume);
}

#[test]
fn open_face_between_cubes_is_closed() {
    let mut g = kuhn_box_mesh(2, 1, 1, [0.0; 3], [2.0, 1.0, 1.0]).unwrap();
    // Spoil the second cube so only the first one becomes a hexahedron.
    let corner = g
        .mesh
        .vertices
        .iter()
        .position(|p| *p == [2.0, 1.0, 0.0])
        .unwrap();
    g.mesh.vertices[corner] = [1.4, 0.4, 0.0];
    let volume = g.mesh.total_volume();
    let options = RecombineOptions {
        prisms: false,
        ..Default::default()
    };
    let report = recombine(&mut g.mesh, &mut g.boundary, &options).unwrap();

    assert_eq!(report.count(CellType::Hexahedron), 1);
    assert_eq!(report.count(CellType::Pyramid), 1);
    assert_eq!(report.count(CellType::Tetrahedron), 8);
    assert_eq!(report.vertices_added, 1);
    assert!(all_positive(&g.mesh));
    assert_close(report.output_volume, volume);
    // Five faces of the hexahedron lie on the box boundary.
    assert_eq!(g.boundary.quad_count(), 5);
}

#[test]
fn accepted_qualities_never_increase() {
    let mut g = kuhn_box_mesh(2, 2, 2, [0.0; 3], [1.0, 1.0, 1.0]).unwrap();
    let report = recombine(&mut g.mesh, &mut g.boundary, &RecombineOptions::default()).unwrap();
    for ct in [CellType::Hexahedron, CellType::Prism] {
        let qs: Vec<f64> = report.accepted_of(ct).map(|a| a.quality).collect();
        assert!(qs.windows(2).all(|w| w[0] >= w[1]), "{ct:?}: {qs:?}");
    }
    assert!(report.accepted_of(CellType::Hexahedron).all(|a| a.quality >= 0.25));
}
