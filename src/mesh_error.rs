//! MeshRecombineError: Unified error type for mesh-recombine public APIs
//!
//! The recombination engine itself never fails: candidates that do not
//! validate are skipped. Errors are reserved for malformed *input* meshes and
//! are raised before any element is touched.

use thiserror::Error;

/// Unified error type for mesh-recombine operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshRecombineError {
    /// An element was given with a vertex count other than 4, 5, 6 or 8.
    #[error("element {element} has {found} vertices (expected 4, 5, 6 or 8)")]
    InvalidVertexCount { element: usize, found: usize },
    /// An element references a vertex index that is not in the vertex list.
    #[error("element {element} references missing vertex {vertex}")]
    MissingVertex { element: usize, vertex: usize },
    /// A boundary face references a vertex that is not in the volume mesh.
    #[error("boundary face {face} references missing vertex {vertex}")]
    MissingBoundaryVertex { face: usize, vertex: usize },
    /// A boundary face was given with a vertex count other than 3 or 4.
    #[error("boundary face {face} has {found} vertices (expected 3 or 4)")]
    InvalidBoundaryFace { face: usize, found: usize },
    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate { vertex: usize },
    /// Generator parameters do not describe a valid domain.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A structural invariant was violated (reported by `DebugInvariants`).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
