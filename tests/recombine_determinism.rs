use mesh_recombine::mesh_generation::{GeneratedMesh, kuhn_box_mesh};
use mesh_recombine::recombine::{RecombineOptions, recombine};
use mesh_recombine::topology::{CellType, VertexId};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

fn shuffled(seed: u64) -> GeneratedMesh {
    let mut g = kuhn_box_mesh(2, 2, 2, [0.0; 3], [1.0, 1.0, 1.0]).unwrap();
    let mut rng = SmallRng::seed_from_u64(seed);
    g.mesh.elements.shuffle(&mut rng);
    g.boundary.faces.shuffle(&mut rng);
    g
}

fn hex_vertex_sets(g: &GeneratedMesh) -> Vec<Vec<VertexId>> {
    let mut sets: Vec<Vec<VertexId>> = g
        .mesh
        .elements
        .iter()
        .filter(|e| e.cell_type() == CellType::Hexahedron)
        .map(|e| {
            let mut v = e.vertices().to_vec();
            v.sort_unstable();
            v
        })
        .collect();
    sets.sort();
    sets
}

#[test]
fn same_input_same_output() {
    let options = RecombineOptions::default();
    let mut a = shuffled(7);
    let mut b = shuffled(7);
    let ra = recombine(&mut a.mesh, &mut a.boundary, &options).unwrap();
    let rb = recombine(&mut b.mesh, &mut b.boundary, &options).unwrap();
    assert_eq!(a, b);
    assert_eq!(ra, rb);
}

#[test]
fn element_order_does_not_change_the_hexahedra() {
    let options = RecombineOptions::default();
    let mut reference = shuffled(0);
    recombine(&mut reference.mesh, &mut reference.boundary, &options).unwrap();
    let expected = hex_vertex_sets(&reference);
    assert_eq!(expected.len(), 8);
    for seed in [1, 2, 3, 42] {
        let mut g = shuffled(seed);
        recombine(&mut g.mesh, &mut g.boundary, &options).unwrap();
        assert_eq!(hex_vertex_sets(&g), expected, "seed {seed}");
        assert_eq!(g.boundary.quad_count(), 24);
    }
}
