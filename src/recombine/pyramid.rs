//! Pyramid transitions on open macro-element faces.
//!
//! A quadrilateral face of a hexahedron or prism that is not shared with
//! another macro-element still has tetrahedra on its far side, triangulated
//! along one of the quad's diagonals. The elements around that diagonal form
//! a cavity; it is re-filled from a new apex vertex: a pyramid on the quad
//! and one tetrahedron (or pyramid) per remaining cavity face.
//!
//! The apex starts at the mean of the cavity's other vertices and is pulled
//! towards the quad centroid until every new element is positively oriented,
//! then further while a quad face of the new elements is badly shaped. Both
//! loops are bounded; when the bound is hit the last position is kept and
//! the insertion stands.

use crate::geometry::quality::{Point3, centroid, cross, dot, lerp, min_face_distortion, sub};
use crate::mesh::VolumeMesh;
use crate::recombine::adjacency::AdjacencyIndex;
use crate::recombine::keys::FaceKey;
use crate::recombine::options::{RecombineOptions, RelaxationOptions};
use crate::recombine::report::RecombinationReport;
use crate::topology::cell_type::CellType;
use crate::topology::element::{Element, Face};
use crate::topology::point::{ElementId, VertexId};
use hashbrown::{HashMap, HashSet};
use std::collections::BTreeSet;

/// Quad face of a macro-element that still borders tetrahedra.
#[derive(Clone, Copy, Debug)]
struct OpenFace {
    owner: ElementId,
    quad: [VertexId; 4],
}

/// Elements around one quad diagonal and the faces they expose.
#[derive(Debug)]
struct Cavity {
    elements: Vec<ElementId>,
    /// The quad, wound away from its owner and starting at a diagonal end.
    base: [VertexId; 4],
    /// Cavity faces other than the two base triangles, wound outwards.
    lateral: Vec<Face>,
    /// Cavity vertices other than the diagonal ends.
    link: Vec<VertexId>,
}

/// Elements that replace one cavity.
#[derive(Debug)]
enum Closure {
    /// Two tetrahedra sharing the apex opposite the quad became one pyramid.
    ApexPair(Element),
    /// A new apex vertex and the elements coned from it.
    Inserted(Insertion),
}

/// Elements coned from a new apex and whether relaxation made them all
/// positive within its bound.
#[derive(Debug)]
struct Insertion {
    elements: Vec<Element>,
    converged: bool,
}

/// Mutable state of one pyramid round: a snapshot of the tetrahedra and
/// pyramids, the elements consumed so far and their replacements.
struct PyramidRound {
    adjacency: AdjacencyIndex,
    marked: Vec<bool>,
    created: Vec<Element>,
}

impl PyramidRound {
    fn new(mesh: &VolumeMesh) -> Self {
        Self {
            adjacency: AdjacencyIndex::build_for(
                mesh,
                &[CellType::Tetrahedron, CellType::Pyramid],
            ),
            marked: vec![false; mesh.elements.len()],
            created: Vec::new(),
        }
    }

    /// Drop consumed elements and append the replacements.
    fn compact(mut self, mesh: &mut VolumeMesh) {
        let mut idx = 0;
        mesh.elements.retain(|_| {
            let keep = !self.marked[idx];
            idx += 1;
            keep
        });
        mesh.elements.append(&mut self.created);
    }
}

/// Close every open quad face of the hexahedra and prisms in `mesh`.
///
/// Rounds repeat until one makes no progress, since a cavity touched by an
/// earlier closure in the same round is deferred to the next. Returns the
/// number of closed faces.
pub fn close_open_faces(
    mesh: &mut VolumeMesh,
    options: &RecombineOptions,
    report: &mut RecombinationReport,
) -> usize {
    let mut total = 0;
    loop {
        let closed = run_round(mesh, options, report);
        if closed == 0 {
            break;
        }
        total += closed;
    }
    total
}

fn run_round(
    mesh: &mut VolumeMesh,
    options: &RecombineOptions,
    report: &mut RecombinationReport,
) -> usize {
    let faces = open_faces(mesh);
    let mut round = PyramidRound::new(mesh);
    let mut closed = 0;
    for face in faces {
        let Some(cavity) = Cavity::find(mesh, &round.adjacency, face) else {
            continue;
        };
        if cavity.elements.iter().any(|id| round.marked[id.index()]) {
            continue;
        }
        let merged = if options.merge_apex_pairs {
            cavity.apex_pair(mesh)
        } else {
            None
        };
        let closure = match merged {
            Some(pyramid) => Closure::ApexPair(pyramid),
            None => Closure::Inserted(cavity.insert_apex(mesh, &options.relaxation)),
        };
        for id in &cavity.elements {
            round.marked[id.index()] = true;
        }
        match closure {
            Closure::ApexPair(pyramid) => {
                report.apex_pairs_merged += 1;
                round.created.push(pyramid);
            }
            Closure::Inserted(Insertion {
                elements,
                converged,
            }) => {
                report.pyramids_inserted += 1;
                report.vertices_added += 1;
                if !converged {
                    log::warn!(
                        "apex over the open face {:?} of element {} is not positive after {} steps; kept as is",
                        face.quad.map(VertexId::index),
                        face.owner.index(),
                        options.relaxation.max_volume_iterations
                    );
                    report.relaxations_unconverged += 1;
                }
                log::trace!(
                    "closed face {:?}: {} elements replaced by {}",
                    face.quad.map(VertexId::index),
                    cavity.elements.len(),
                    elements.len()
                );
                round.created.extend(elements);
            }
        }
        closed += 1;
    }
    round.compact(mesh);
    closed
}

/// Quad faces of hexahedra and prisms that are neither shared with another
/// macro-element nor already the base of a pyramid, in element order.
fn open_faces(mesh: &VolumeMesh) -> Vec<OpenFace> {
    let mut owners: HashMap<FaceKey, usize> = HashMap::new();
    let mut bases: HashSet<FaceKey> = HashSet::new();
    for element in &mesh.elements {
        match element {
            Element::Pyramid(p) => {
                bases.insert(FaceKey::quad([p[0], p[1], p[2], p[3]]));
            }
            e if e.is_macro() => {
                for face in e.faces() {
                    if let Face::Quad(q) = face {
                        *owners.entry(FaceKey::quad(q)).or_insert(0) += 1;
                    }
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    for (idx, element) in mesh.elements.iter().enumerate() {
        if !element.is_macro() {
            continue;
        }
        for face in element.faces() {
            let Face::Quad(quad) = face else {
                continue;
            };
            let key = FaceKey::quad(quad);
            if owners.get(&key) == Some(&1) && !bases.contains(&key) {
                out.push(OpenFace {
                    owner: ElementId::new(idx),
                    quad,
                });
            }
        }
    }
    out
}

impl Cavity {
    /// Elements around the diagonal `q0-q2`, else around `q1-q3`.
    fn find(mesh: &VolumeMesh, adjacency: &AdjacencyIndex, face: OpenFace) -> Option<Self> {
        let owner = &mesh.elements[face.owner.index()];
        let quad = away_from(mesh, owner, face.quad);
        for shift in 0..2 {
            let base: [VertexId; 4] = std::array::from_fn(|k| quad[(k + shift) % 4]);
            let elements = adjacency.elements_containing(mesh, &[base[0], base[2]]);
            if elements.is_empty() {
                continue;
            }
            return Self::around(mesh, elements, base);
        }
        None
    }

    fn around(mesh: &VolumeMesh, elements: Vec<ElementId>, base: [VertexId; 4]) -> Option<Self> {
        let mut faces: HashMap<FaceKey, (usize, Face)> = HashMap::new();
        let mut link = BTreeSet::new();
        for id in &elements {
            let element = &mesh.elements[id.index()];
            link.extend(element.vertices().iter().copied());
            for face in element.faces() {
                let slot = faces
                    .entry(FaceKey::from(&face))
                    .or_insert((0, outward(mesh, element, face)));
                slot.0 += 1;
            }
        }
        let [a, b, c, d] = base;
        let halves = [FaceKey::triangle(a, b, c), FaceKey::triangle(a, c, d)];
        if halves
            .iter()
            .any(|h| faces.get(h).map(|&(n, _)| n) != Some(1))
        {
            return None;
        }
        let mut lateral: Vec<Face> = faces
            .into_iter()
            .filter(|(key, (n, _))| *n == 1 && !halves.contains(key))
            .map(|(_, (_, face))| face)
            .collect();
        if lateral.is_empty() {
            return None;
        }
        lateral.sort_by_key(|f| FaceKey::from(f));
        link.remove(&a);
        link.remove(&c);
        Some(Self {
            elements,
            base,
            lateral,
            link: link.into_iter().collect(),
        })
    }

    /// Two tetrahedra `a-b-c-p` and `a-c-d-p` merged into the pyramid on
    /// the quad with apex `p`.
    fn apex_pair(&self, mesh: &VolumeMesh) -> Option<Element> {
        let [a, b, c, d] = self.base;
        let [first, second] = self.elements.as_slice() else {
            return None;
        };
        let rest = |id: &ElementId| -> Option<BTreeSet<VertexId>> {
            let Element::Tetrahedron(t) = mesh.elements[id.index()] else {
                return None;
            };
            Some(t.into_iter().filter(|&v| v != a && v != c).collect())
        };
        let (r1, r2) = (rest(first)?, rest(second)?);
        let mut apex = r1.intersection(&r2);
        let p = *apex.next()?;
        if apex.next().is_some() {
            return None;
        }
        let spread: BTreeSet<VertexId> = r1.union(&r2).copied().collect();
        if spread != BTreeSet::from([b, d, p]) {
            return None;
        }
        let pyramid = Element::Pyramid([a, b, c, d, p]);
        (mesh.signed_volume(&pyramid) > 0.0).then_some(pyramid)
    }

    /// Add an apex vertex, cone the cavity from it and relax the apex.
    fn insert_apex(&self, mesh: &mut VolumeMesh, relax: &RelaxationOptions) -> Insertion {
        let start = centroid(self.link.iter().map(|&v| mesh.point(v)));
        let anchor = centroid(self.base.iter().map(|&v| mesh.point(v)));
        let x = mesh.add_vertex(start);
        let mut elements = Vec::with_capacity(self.lateral.len() + 1);
        let [a, b, c, d] = self.base;
        elements.push(Element::Pyramid([a, b, c, d, x]));
        elements.extend(self.lateral.iter().map(|f| cone(f, x)));
        let converged = relax_apex(mesh, &elements, x, anchor, relax);
        Insertion {
            elements,
            converged,
        }
    }
}

/// Blend the apex `x` towards `anchor` while a shape is not positive, then
/// while a quad face of the shapes is badly shaped. Each step moves the
/// given fraction of the remaining distance.
///
/// The apex is left at the last computed position. Returns whether every
/// shape ended up positive.
fn relax_apex(
    mesh: &mut VolumeMesh,
    shapes: &[Element],
    x: VertexId,
    anchor: Point3,
    relax: &RelaxationOptions,
) -> bool {
    let mut pos = mesh.point(x);
    let mut steps = 0;
    while !all_positive(mesh, shapes) && steps < relax.max_volume_iterations {
        pos = lerp(pos, anchor, relax.centroid_blend);
        mesh.vertices[x.index()] = pos;
        steps += 1;
    }
    let converged = all_positive(mesh, shapes);
    for _ in 0..relax.max_quality_iterations {
        if worst_face_shape(mesh, shapes) >= relax.min_quality {
            break;
        }
        let trial = lerp(pos, anchor, relax.centroid_blend);
        mesh.vertices[x.index()] = trial;
        if converged && !all_positive(mesh, shapes) {
            mesh.vertices[x.index()] = pos;
            break;
        }
        pos = trial;
    }
    converged
}

fn all_positive(mesh: &VolumeMesh, shapes: &[Element]) -> bool {
    shapes.iter().all(|e| mesh.signed_volume(e) > 0.0)
}

/// Worst shape distortion over the quad faces of `shapes`; `1.0` without quads.
fn worst_face_shape(mesh: &VolumeMesh, shapes: &[Element]) -> f64 {
    shapes
        .iter()
        .map(|e| min_face_distortion(e.cell_type(), &mesh.element_points(e)))
        .fold(1.0, f64::min)
}

/// Element spanned by an outward cavity face and an interior apex.
fn cone(face: &Face, apex: VertexId) -> Element {
    match *face {
        Face::Triangle([p, q, r]) => Element::Tetrahedron([p, r, q, apex]),
        Face::Quad([p, q, r, s]) => Element::Pyramid([p, s, r, q, apex]),
    }
}

fn face_normal(mesh: &VolumeMesh, face: &Face) -> Point3 {
    let p = |i: usize| mesh.point(face.vertices()[i]);
    match face {
        Face::Triangle(_) => cross(sub(p(1), p(0)), sub(p(2), p(0))),
        Face::Quad(_) => cross(sub(p(2), p(0)), sub(p(3), p(1))),
    }
}

/// `face` wound so its normal points away from the centroid of `element`.
fn outward(mesh: &VolumeMesh, element: &Element, face: Face) -> Face {
    let inside = centroid(mesh.element_points(element));
    let middle = centroid(face.vertices().iter().map(|&v| mesh.point(v)));
    if dot(face_normal(mesh, &face), sub(middle, inside)) < 0.0 {
        face.reversed()
    } else {
        face
    }
}

fn away_from(mesh: &VolumeMesh, owner: &Element, quad: [VertexId; 4]) -> [VertexId; 4] {
    match outward(mesh, owner, Face::Quad(quad)) {
        Face::Quad(q) => q,
        Face::Triangle(_) => quad,
    }
}
