//! Tunable parameters of the recombination pipeline.
//!
//! The default values are the historical thresholds of the algorithm and are
//! not derived from first principles; change them only with care.

/// Which hexahedron patterns to enumerate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HexPatterns {
    /// Corner tetrahedron completed through its three adjacent quads.
    pub diamond_corner: bool,
    /// Six tetrahedra fanned around a body diagonal.
    pub diagonal_fan: bool,
    /// Seed tetrahedron spanning crossed diagonals of opposite faces.
    pub crossed_diagonals: bool,
}

impl Default for HexPatterns {
    fn default() -> Self {
        Self {
            diamond_corner: true,
            diagonal_fan: true,
            crossed_diagonals: true,
        }
    }
}

/// Bounds of the apex relaxation performed by pyramid insertion.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RelaxationOptions {
    /// Steps allowed to make every created element positive.
    pub max_volume_iterations: usize,
    /// Further steps allowed while a created quad face is badly shaped.
    pub max_quality_iterations: usize,
    /// Quad shape distortion below which the further steps run.
    pub min_quality: f64,
    /// Fraction of the remaining distance to the face centroid covered per step.
    pub centroid_blend: f64,
}

impl Default for RelaxationOptions {
    fn default() -> Self {
        Self {
            max_volume_iterations: 100,
            max_quality_iterations: 6,
            min_quality: 0.2,
            centroid_blend: 0.9,
        }
    }
}

/// Pipeline configuration.
///
/// ```rust
/// use mesh_recombine::recombine::RecombineOptions;
///
/// let opts = RecombineOptions { pyramids: false, ..Default::default() };
/// assert_eq!(opts.hex_min_quality, 0.25);
/// assert_eq!(opts.relaxation.max_volume_iterations, 100);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecombineOptions {
    /// Run the hexahedron pass.
    pub hexahedra: bool,
    /// Run the prism pass.
    pub prisms: bool,
    /// Run pyramid insertion on unresolved quad faces.
    pub pyramids: bool,
    pub hex_patterns: HexPatterns,
    /// Candidates below this quality end the hexahedron pass.
    pub hex_min_quality: f64,
    /// Candidates below this quality end the prism pass.
    pub prism_min_quality: f64,
    /// Quad faces with a shape distortion at or below this are degenerate.
    pub face_distortion_epsilon: f64,
    pub relaxation: RelaxationOptions,
    /// Merge two tetrahedra that close a quad face with a common apex into a
    /// pyramid instead of inserting a vertex.
    pub merge_apex_pairs: bool,
}

impl Default for RecombineOptions {
    fn default() -> Self {
        Self {
            hexahedra: true,
            prisms: true,
            pyramids: true,
            hex_patterns: HexPatterns::default(),
            hex_min_quality: 0.25,
            prism_min_quality: 0.15,
            face_distortion_epsilon: 1e-6,
            relaxation: RelaxationOptions::default(),
            merge_apex_pairs: false,
        }
    }
}
