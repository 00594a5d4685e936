#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-recombine
//!
//! mesh-recombine turns an all-tetrahedral volume mesh into a hex-dominant
//! mixed mesh for finite-element solvers. Groups of tetrahedra are greedily
//! merged into hexahedra and triangular prisms, the boundary surface is
//! updated to carry the new quadrilateral faces, and tetrahedra left against
//! open quad faces are rebuilt into pyramid transitions.
//!
//! ## Features
//! - Arena-based [`VolumeMesh`](mesh::VolumeMesh) with integer vertex and element handles
//! - Three hexahedron patterns and one prism pattern grown from seed tetrahedra
//! - Global conformity ledger so accepted elements never overlap partially
//! - Region-aware boundary reconciliation
//! - Pyramid insertion with bounded apex relaxation
//! - Structured Kuhn box generator for tests and benchmarks
//!
//! ## Determinism
//!
//! Candidates are visited by descending quality with ties broken by
//! generation order, and every index is traversed in sorted order, so the
//! same input always yields the same output. The optional `rayon` feature
//! parallelizes candidate generation without changing acceptance order.
//!
//! ## Usage
//!
//! ```rust
//! use mesh_recombine::prelude::*;
//!
//! let mut g = mesh_recombine::mesh_generation::kuhn_box_mesh(2, 2, 1, [0.0; 3], [2.0, 2.0, 1.0])?;
//! let report = recombine(&mut g.mesh, &mut g.boundary, &RecombineOptions::default())?;
//! assert_eq!(report.count(CellType::Hexahedron), 4);
//! println!("{report}");
//! # Ok::<(), MeshRecombineError>(())
//! ```
//!
//! Invariant checks run after every phase in debug builds; enable the
//! `strict-invariants` feature to keep them in release builds.

pub mod debug_invariants;
pub mod geometry;
pub mod mesh;
pub mod mesh_error;
pub mod mesh_generation;
pub mod recombine;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh::{BoundaryFace, BoundaryMesh, RegionId, VolumeMesh};
    pub use crate::mesh_error::MeshRecombineError;
    pub use crate::recombine::{
        HexPatterns, RecombinationReport, RecombineOptions, Recombinator, Rejection,
        RelaxationOptions, recombine,
    };
    pub use crate::topology::{CellType, Element, ElementId, Face, VertexId};
}
