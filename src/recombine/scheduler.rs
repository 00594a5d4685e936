//! Greedy merge scheduling.
//!
//! Candidates are visited by descending quality. Each one is checked by an
//! ordered list of named predicates; the first failing predicate names the
//! [`Rejection`]. An accepted candidate marks the tetrahedra it consumes,
//! which are never unmarked again during the pass.
//!
//! All mutable state of a merge phase lives in one [`PassContext`]: the
//! adjacency snapshot, the per-element markings, the conformity ledger and
//! the macro-elements accepted since the last compaction.

use crate::geometry::quality::signed_volume_of;
use crate::mesh::{BoundaryMesh, RegionId, VolumeMesh};
use crate::recombine::adjacency::AdjacencyIndex;
use crate::recombine::candidate::Candidate;
use crate::recombine::keys::{FacetKey, quad_facets};
use crate::recombine::ledger::{Conflict, ConformityLedger};
use crate::recombine::report::{AcceptedCandidate, RecombinationReport};
use crate::topology::cell_type::CellType;
use crate::topology::element::{Element, Face};
use crate::topology::point::{ElementId, VertexId};
use hashbrown::{HashMap, HashSet};

/// Relative tolerance between a candidate's volume and the volume of the
/// tetrahedra it replaces.
const VOLUME_TOLERANCE: f64 = 1e-9;

/// The named predicate that turned a candidate down.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Rejection {
    /// A tetrahedron inside the candidate was consumed by an earlier merge.
    AlreadyConsumed,
    /// A facet is shared by more than two of the inner tetrahedra.
    OverlappingTetrahedra,
    /// The inner tetrahedra do not reconstruct the candidate's faces.
    IncompleteTiling,
    /// The inner tetrahedra do not fill the candidate's volume.
    VolumeMismatch,
    /// A face overlaps a committed face only partially.
    FacetConflict,
    /// An edge is a committed face diagonal.
    EdgeOnDiagonal,
    /// A face diagonal is a committed edge.
    DiagonalOnEdge,
    /// A quad face would join boundary triangles of different regions.
    RegionMismatch,
}

impl From<Conflict> for Rejection {
    fn from(c: Conflict) -> Self {
        match c {
            Conflict::Facet => Rejection::FacetConflict,
            Conflict::EdgeOnDiagonal => Rejection::EdgeOnDiagonal,
            Conflict::DiagonalOnEdge => Rejection::DiagonalOnEdge,
        }
    }
}

/// Mutable state of one merge phase.
#[derive(Debug)]
pub struct PassContext {
    adjacency: AdjacencyIndex,
    marked: Vec<bool>,
    ledger: ConformityLedger,
    regions: HashMap<FacetKey, RegionId>,
    accepted: Vec<Element>,
}

impl PassContext {
    /// Index the tetrahedra of `mesh` and the boundary triangle regions.
    pub fn new(mesh: &VolumeMesh, boundary: &BoundaryMesh) -> Self {
        let mut regions = HashMap::new();
        for f in &boundary.faces {
            if let Face::Triangle([a, b, c]) = f.face {
                regions.insert(FacetKey::new(a, b, c), f.region);
            }
        }
        Self {
            adjacency: AdjacencyIndex::build_for(mesh, &[CellType::Tetrahedron]),
            marked: vec![false; mesh.elements.len()],
            ledger: ConformityLedger::new(),
            regions,
            accepted: Vec::new(),
        }
    }

    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    pub fn ledger(&self) -> &ConformityLedger {
        &self.ledger
    }

    pub fn is_marked(&self, id: ElementId) -> bool {
        self.marked[id.index()]
    }

    /// Tetrahedra still available as seeds, in element order.
    pub fn seeds(&self, mesh: &VolumeMesh) -> Vec<ElementId> {
        mesh.elements
            .iter()
            .enumerate()
            .filter(|(i, e)| e.is_tetrahedron() && !self.marked[*i])
            .map(|(i, _)| ElementId::new(i))
            .collect()
    }

    /// Drop consumed elements, append the accepted macro-elements and
    /// rebuild the adjacency snapshot. Returns the number of elements added.
    pub fn compact(&mut self, mesh: &mut VolumeMesh) -> usize {
        let mut idx = 0;
        mesh.elements.retain(|_| {
            let keep = !self.marked[idx];
            idx += 1;
            keep
        });
        let added = self.accepted.len();
        mesh.elements.append(&mut self.accepted);
        self.marked = vec![false; mesh.elements.len()];
        self.adjacency = AdjacencyIndex::build_for(mesh, &[CellType::Tetrahedron]);
        added
    }

    /// Finish the phase, handing back the ledger.
    pub fn into_ledger(self) -> ConformityLedger {
        self.ledger
    }
}

/// Everything the predicates need to know about one candidate.
#[derive(Debug)]
struct Attempt<'c> {
    candidate: &'c Candidate,
    /// Unmarked tetrahedra inside the candidate, slivers on its faces included.
    tiles: Vec<ElementId>,
    /// A non-sliver tetrahedron inside the candidate is already marked.
    claimed: bool,
    overfull: bool,
    /// Facets used by exactly one tile.
    outer: HashSet<FacetKey>,
    /// For each quad face, the split found among the outer facets.
    splits: Vec<Option<[FacetKey; 2]>>,
    triangles: Vec<FacetKey>,
    tile_volume: f64,
    volume: f64,
}

impl<'c> Attempt<'c> {
    fn new(ctx: &PassContext, mesh: &VolumeMesh, candidate: &'c Candidate) -> Self {
        let element = &candidate.element;
        let mut quads = Vec::new();
        let mut triangles = Vec::new();
        for face in element.faces() {
            match face {
                Face::Quad(q) => quads.push(q),
                Face::Triangle([a, b, c]) => triangles.push(FacetKey::new(a, b, c)),
            }
        }

        let mut tiles = Vec::new();
        let mut claimed = false;
        for id in ctx.adjacency.elements_within(mesh, element.vertices()) {
            let Element::Tetrahedron(t) = mesh.elements[id.index()] else {
                continue;
            };
            let sliver = quads.iter().any(|q| same_vertices(&t, q));
            match (ctx.marked[id.index()], sliver) {
                (true, true) => {}
                (true, false) => claimed = true,
                (false, _) => tiles.push(id),
            }
        }

        let mut counts: HashMap<FacetKey, u32> = HashMap::new();
        let mut tile_volume = 0.0;
        for id in &tiles {
            let tet = &mesh.elements[id.index()];
            tile_volume += mesh.signed_volume(tet).abs();
            for face in tet.faces() {
                if let Face::Triangle([a, b, c]) = face {
                    *counts.entry(FacetKey::new(a, b, c)).or_insert(0) += 1;
                }
            }
        }
        let overfull = counts.values().any(|&n| n > 2);
        let outer: HashSet<FacetKey> = counts
            .into_iter()
            .filter(|&(_, n)| n == 1)
            .map(|(k, _)| k)
            .collect();
        let splits = quads.iter().map(|&q| split_of(q, &outer)).collect();
        let volume = signed_volume_of(element.cell_type(), &mesh.element_points(element));

        Self {
            candidate,
            tiles,
            claimed,
            overfull,
            outer,
            splits,
            triangles,
            tile_volume,
            volume,
        }
    }
}

fn same_vertices(tet: &[VertexId; 4], quad: &[VertexId; 4]) -> bool {
    tet.iter().all(|v| quad.contains(v))
}

/// The diagonal split of `q` present in `outer`, if exactly one is.
fn split_of(q: [VertexId; 4], outer: &HashSet<FacetKey>) -> Option<[FacetKey; 2]> {
    let [abc, acd, abd, bcd] = quad_facets(q);
    let first = outer.contains(&abc) && outer.contains(&acd);
    let second = outer.contains(&abd) && outer.contains(&bcd);
    match (first, second) {
        (true, false) if !outer.contains(&abd) && !outer.contains(&bcd) => Some([abc, acd]),
        (false, true) if !outer.contains(&abc) && !outer.contains(&acd) => Some([abd, bcd]),
        _ => None,
    }
}

type Predicate = fn(&PassContext, &Attempt<'_>) -> Result<(), Rejection>;

/// Checks applied to every candidate, in order.
const PREDICATES: [(&str, Predicate); 6] = [
    ("unclaimed", unclaimed),
    ("no_overlap", no_overlap),
    ("faces_reconstructed", faces_reconstructed),
    ("volume_filled", volume_filled),
    ("conforming", conforming),
    ("single_region", single_region),
];

fn unclaimed(_: &PassContext, a: &Attempt<'_>) -> Result<(), Rejection> {
    if a.claimed {
        Err(Rejection::AlreadyConsumed)
    } else {
        Ok(())
    }
}

fn no_overlap(_: &PassContext, a: &Attempt<'_>) -> Result<(), Rejection> {
    if a.overfull {
        Err(Rejection::OverlappingTetrahedra)
    } else {
        Ok(())
    }
}

/// Every quad face is covered by exactly one diagonal split, every triangle
/// face by itself, and no other facet of the tiles is exposed.
fn faces_reconstructed(_: &PassContext, a: &Attempt<'_>) -> Result<(), Rejection> {
    let quads_ok = a.splits.iter().all(Option::is_some);
    let tris_ok = a.triangles.iter().all(|t| a.outer.contains(t));
    let exact = a.outer.len() == 2 * a.splits.len() + a.triangles.len();
    if quads_ok && tris_ok && exact {
        Ok(())
    } else {
        Err(Rejection::IncompleteTiling)
    }
}

fn volume_filled(_: &PassContext, a: &Attempt<'_>) -> Result<(), Rejection> {
    let tol = VOLUME_TOLERANCE * a.volume.abs().max(f64::MIN_POSITIVE);
    if (a.tile_volume - a.volume.abs()).abs() <= tol {
        Ok(())
    } else {
        Err(Rejection::VolumeMismatch)
    }
}

fn conforming(ctx: &PassContext, a: &Attempt<'_>) -> Result<(), Rejection> {
    ctx.ledger
        .check(&a.candidate.element)
        .map_err(Rejection::from)
}

fn single_region(ctx: &PassContext, a: &Attempt<'_>) -> Result<(), Rejection> {
    for [t1, t2] in a.splits.iter().flatten() {
        if let (Some(r1), Some(r2)) = (ctx.regions.get(t1), ctx.regions.get(t2)) {
            if r1 != r2 {
                return Err(Rejection::RegionMismatch);
            }
        }
    }
    Ok(())
}

/// Evaluate the predicates in order; the first failure wins.
fn evaluate(ctx: &PassContext, attempt: &Attempt<'_>) -> Result<(), Rejection> {
    for (name, check) in PREDICATES {
        if let Err(r) = check(ctx, attempt) {
            log::trace!(
                "candidate #{} ({:?}, q={:.4}) failed {name}: {r:?}",
                attempt.candidate.seq,
                attempt.candidate.pattern,
                attempt.candidate.quality
            );
            return Err(r);
        }
    }
    Ok(())
}

/// Greedily accept `candidates` (sorted by descending quality) until the
/// quality falls below `cutoff`. Returns the number of accepted candidates.
pub fn run_pass(
    ctx: &mut PassContext,
    mesh: &VolumeMesh,
    candidates: &[Candidate],
    cutoff: f64,
    report: &mut RecombinationReport,
) -> usize {
    let mut accepted = 0;
    for candidate in candidates {
        if candidate.quality < cutoff {
            break;
        }
        let attempt = Attempt::new(ctx, mesh, candidate);
        match evaluate(ctx, &attempt) {
            Ok(()) => {
                for id in &attempt.tiles {
                    ctx.marked[id.index()] = true;
                }
                ctx.ledger.register(&candidate.element);
                ctx.accepted.push(candidate.element);
                report.accepted.push(AcceptedCandidate::from(candidate));
                accepted += 1;
                log::trace!(
                    "accepted #{} {:?} q={:.4} replacing {} tetrahedra",
                    candidate.seq,
                    candidate.pattern,
                    candidate.quality,
                    attempt.tiles.len()
                );
            }
            Err(r) => report.record_rejection(r),
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_invariants::DebugInvariants;
    use crate::mesh_generation::{five_tet_cube, kuhn_box_mesh, kuhn_cube};
    use crate::recombine::candidate::Pattern;
    use crate::recombine::options::HexPatterns;
    use crate::recombine::patterns::{generate, hex};

    fn hex_candidates(ctx: &PassContext, mesh: &VolumeMesh) -> Vec<Candidate> {
        let adj = ctx.adjacency();
        generate(mesh, &ctx.seeds(mesh), |seed| {
            hex::candidates(mesh, adj, seed, &HexPatterns::default(), 1e-6)
        })
        .into_sorted()
    }

    #[test]
    fn perfect_cube_merges_and_compacts() {
        let mut g = kuhn_cube();
        let mut ctx = PassContext::new(&g.mesh, &g.boundary);
        let cands = hex_candidates(&ctx, &g.mesh);
        let mut report = RecombinationReport::default();
        assert_eq!(run_pass(&mut ctx, &g.mesh, &cands, 0.25, &mut report), 1);
        assert_eq!(ctx.compact(&mut g.mesh), 1);
        assert_eq!(g.mesh.elements.len(), 1);
        assert_eq!(g.mesh.count(CellType::Hexahedron), 1);
        assert!((g.mesh.total_volume() - 1.0).abs() < 1e-12);
        assert!(ctx.ledger().validate_invariants().is_ok());
    }

    #[test]
    fn five_tet_cube_merges() {
        let mut g = five_tet_cube();
        let mut ctx = PassContext::new(&g.mesh, &g.boundary);
        let cands = hex_candidates(&ctx, &g.mesh);
        let mut report = RecombinationReport::default();
        assert_eq!(run_pass(&mut ctx, &g.mesh, &cands, 0.25, &mut report), 1);
        ctx.compact(&mut g.mesh);
        assert_eq!(g.mesh.elements.len(), 1);
    }

    #[test]
    fn consumed_tetrahedra_block_overlapping_candidates() {
        let g = kuhn_cube();
        let mut ctx = PassContext::new(&g.mesh, &g.boundary);
        let cands = hex_candidates(&ctx, &g.mesh);
        let dup = vec![cands[0], cands[0]];
        let mut report = RecombinationReport::default();
        assert_eq!(run_pass(&mut ctx, &g.mesh, &dup, 0.25, &mut report), 1);
        assert_eq!(report.rejected(Rejection::AlreadyConsumed), 1);
        assert_eq!(report.accepted.len(), 1);
    }

    #[test]
    fn cutoff_ends_the_pass() {
        let g = kuhn_cube();
        let mut ctx = PassContext::new(&g.mesh, &g.boundary);
        let cands = hex_candidates(&ctx, &g.mesh);
        let mut report = RecombinationReport::default();
        assert_eq!(run_pass(&mut ctx, &g.mesh, &cands, 1.5, &mut report), 0);
        assert!(report.rejections.is_empty());
    }

    #[test]
    fn region_mismatch_rejects() {
        let mut g = kuhn_cube();
        // Retag one triangle of the bottom face.
        let bottom = g
            .boundary
            .faces
            .iter_mut()
            .find(|f| f.face.vertices().iter().all(|v| v.index() < 4))
            .unwrap();
        bottom.region = RegionId(99);
        let mut ctx = PassContext::new(&g.mesh, &g.boundary);
        let cands = hex_candidates(&ctx, &g.mesh);
        let mut report = RecombinationReport::default();
        assert_eq!(run_pass(&mut ctx, &g.mesh, &cands, 0.25, &mut report), 0);
        assert_eq!(report.rejected(Rejection::RegionMismatch), 1);
    }

    #[test]
    fn neighbouring_cubes_conform() {
        let mut g = kuhn_box_mesh(2, 2, 1, [0.0; 3], [2.0, 2.0, 1.0]).unwrap();
        let mut ctx = PassContext::new(&g.mesh, &g.boundary);
        let cands = hex_candidates(&ctx, &g.mesh);
        let mut report = RecombinationReport::default();
        assert_eq!(run_pass(&mut ctx, &g.mesh, &cands, 0.25, &mut report), 4);
        ctx.compact(&mut g.mesh);
        assert_eq!(g.mesh.count(CellType::Hexahedron), 4);
        let rebuilt = ConformityLedger::rebuild(&g.mesh.elements);
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn slivers_on_faces_are_absorbed() {
        // A flat tetrahedron on the top face of the cube.
        let mut g = kuhn_cube();
        g.mesh
            .elements
            .push(Element::Tetrahedron([4, 5, 6, 7].map(VertexId::new)));
        let mut ctx = PassContext::new(&g.mesh, &g.boundary);
        let cand = Candidate::score(
            &g.mesh,
            Element::Hexahedron([0, 1, 2, 3, 4, 5, 6, 7].map(VertexId::new)),
            Pattern::DiagonalFan,
            1e-6,
        )
        .unwrap();
        let mut report = RecombinationReport::default();
        assert_eq!(run_pass(&mut ctx, &g.mesh, &[cand], 0.25, &mut report), 1);
        assert!(ctx.is_marked(ElementId::new(6)));
        ctx.compact(&mut g.mesh);
        assert_eq!(g.mesh.elements.len(), 1);
    }
}
