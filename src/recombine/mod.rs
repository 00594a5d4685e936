//! Tetrahedra to hex-dominant recombination.
//!
//! The pipeline runs in fixed phases over one [`VolumeMesh`]:
//!
//! 1. hexahedron pass: candidates from [`patterns::hex`], greedily accepted
//!    by [`scheduler::run_pass`] down to `hex_min_quality`;
//! 2. prism pass on the remaining tetrahedra, down to `prism_min_quality`;
//! 3. [`boundary::reconcile`] joins boundary triangle pairs under the new
//!    quad faces;
//! 4. [`pyramid::close_open_faces`] fills the tetrahedra left against open
//!    quad faces, followed by a second reconciliation.
//!
//! The conformity ledger is shared by both merge passes, so prisms never
//! cut through a committed hexahedron face.
//!
//! ```rust
//! use mesh_recombine::mesh_generation::kuhn_cube;
//! use mesh_recombine::recombine::{RecombineOptions, Recombinator};
//! use mesh_recombine::topology::CellType;
//!
//! let mut g = kuhn_cube();
//! let report = Recombinator::new(RecombineOptions::default())
//!     .run(&mut g.mesh, &mut g.boundary)?;
//! assert_eq!(report.count(CellType::Hexahedron), 1);
//! assert_eq!(g.boundary.quad_count(), 6);
//! # Ok::<(), mesh_recombine::mesh_error::MeshRecombineError>(())
//! ```

pub mod adjacency;
pub mod boundary;
pub mod candidate;
pub mod keys;
pub mod ledger;
pub mod options;
pub mod patterns;
pub mod pyramid;
pub mod report;
pub mod scheduler;

pub use options::{HexPatterns, RecombineOptions, RelaxationOptions};
pub use report::RecombinationReport;
pub use scheduler::Rejection;

use crate::debug_invariants::DebugInvariants;
use crate::mesh::{BoundaryMesh, VolumeMesh};
use crate::mesh_error::MeshRecombineError;
use crate::topology::cell_type::CellType;
use scheduler::PassContext;

/// Pipeline driver holding the run configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recombinator {
    options: RecombineOptions,
}

impl Recombinator {
    pub fn new(options: RecombineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RecombineOptions {
        &self.options
    }

    /// Recombine `mesh` in place and update `boundary` to match.
    ///
    /// Both inputs are validated before anything is changed; on error they
    /// are left untouched.
    pub fn run(
        &self,
        mesh: &mut VolumeMesh,
        boundary: &mut BoundaryMesh,
    ) -> Result<RecombinationReport, MeshRecombineError> {
        mesh.validate_invariants()?;
        boundary.validate_against(mesh)?;

        let mut report = RecombinationReport::default();
        report.record_input(mesh);
        log::info!(
            "recombining {} tetrahedra ({} elements, {} boundary faces)",
            report.input_tetrahedra,
            mesh.elements.len(),
            boundary.faces.len()
        );

        let mut ctx = PassContext::new(mesh, boundary);
        if self.options.hexahedra {
            let accepted = self.hex_pass(&mut ctx, mesh, &mut report);
            log::info!("hexahedron pass accepted {accepted}");
        }
        if self.options.prisms {
            let accepted = self.prism_pass(&mut ctx, mesh, &mut report);
            log::info!("prism pass accepted {accepted}");
        }
        let ledger = ctx.into_ledger();
        ledger.debug_assert_invariants();
        mesh.debug_assert_invariants();

        self.reconcile(mesh, boundary, &mut report);

        if self.options.pyramids {
            let closed = pyramid::close_open_faces(mesh, &self.options, &mut report);
            log::info!(
                "closed {closed} open faces ({} inserted, {} apex pairs, {} unconverged)",
                report.pyramids_inserted,
                report.apex_pairs_merged,
                report.relaxations_unconverged
            );
            mesh.debug_assert_invariants();
            self.reconcile(mesh, boundary, &mut report);
        }

        report.record_output(mesh);
        log::info!(
            "recombined into {} hexahedra, {} prisms, {} pyramids, {} tetrahedra",
            report.count(CellType::Hexahedron),
            report.count(CellType::Prism),
            report.count(CellType::Pyramid),
            report.count(CellType::Tetrahedron)
        );
        Ok(report)
    }

    fn hex_pass(
        &self,
        ctx: &mut PassContext,
        mesh: &mut VolumeMesh,
        report: &mut RecombinationReport,
    ) -> usize {
        let seeds = ctx.seeds(mesh);
        let pool = {
            let adjacency = ctx.adjacency();
            let shared: &VolumeMesh = mesh;
            patterns::generate(shared, &seeds, |seed| {
                patterns::hex::candidates(
                    shared,
                    adjacency,
                    seed,
                    &self.options.hex_patterns,
                    self.options.face_distortion_epsilon,
                )
            })
        };
        self.merge(ctx, mesh, pool, CellType::Hexahedron, self.options.hex_min_quality, report)
    }

    fn prism_pass(
        &self,
        ctx: &mut PassContext,
        mesh: &mut VolumeMesh,
        report: &mut RecombinationReport,
    ) -> usize {
        let seeds = ctx.seeds(mesh);
        let pool = {
            let adjacency = ctx.adjacency();
            let shared: &VolumeMesh = mesh;
            patterns::generate(shared, &seeds, |seed| {
                patterns::prism::candidates(
                    shared,
                    adjacency,
                    seed,
                    self.options.face_distortion_epsilon,
                )
            })
        };
        self.merge(ctx, mesh, pool, CellType::Prism, self.options.prism_min_quality, report)
    }

    fn merge(
        &self,
        ctx: &mut PassContext,
        mesh: &mut VolumeMesh,
        pool: candidate::CandidatePool,
        target: CellType,
        cutoff: f64,
        report: &mut RecombinationReport,
    ) -> usize {
        report.candidates.insert(target, pool.len());
        let candidates = pool.into_sorted();
        let rejected_before: usize = report.rejections.values().sum();
        let accepted = scheduler::run_pass(ctx, mesh, &candidates, cutoff, report);
        let rejected = report.rejections.values().sum::<usize>() - rejected_before;
        log::debug!(
            "{} pass: {} candidates, {accepted} accepted, {rejected} rejected",
            target.name(),
            candidates.len()
        );
        let added = ctx.compact(mesh);
        debug_assert_eq!(added, accepted);
        accepted
    }

    fn reconcile(
        &self,
        mesh: &VolumeMesh,
        boundary: &mut BoundaryMesh,
        report: &mut RecombinationReport,
    ) {
        let outcome = boundary::reconcile(boundary, &mesh.elements);
        report.boundary_quads_created += outcome.quads_created;
        report.boundary_pairs_refused += outcome.pairs_refused;
        log::debug!(
            "boundary: {} quads created, {} pairs refused",
            outcome.quads_created,
            outcome.pairs_refused
        );
        boundary.debug_assert_invariants();
    }
}

/// Recombine with the given options; shorthand for [`Recombinator::run`].
pub fn recombine(
    mesh: &mut VolumeMesh,
    boundary: &mut BoundaryMesh,
    options: &RecombineOptions,
) -> Result<RecombinationReport, MeshRecombineError> {
    Recombinator::new(*options).run(mesh, boundary)
}
