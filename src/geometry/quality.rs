//! Element quality and volume utilities on explicit coordinates.
//!
//! # Metrics
//! - [`scaled_jacobian`]: corner distortion `det([v1-v0, v2-v0, v3-v0]) / (|v1-v0| |v2-v0| |v3-v0|)`.
//!   Equal to `1.0` for a right-angled corner, `0.0` for a flat corner and
//!   negative for an inverted one.
//! - [`min_scaled_jacobian`]: worst corner of a solid, normalized per cell type
//!   so that the ideal element scores `1.0`.
//! - [`shape_distortion`]: angle-based shape measure of a quadrilateral face;
//!   `1.0` for a rectangle, `<= 0.0` for degenerate, non-convex or
//!   self-intersecting quads.
//!
//! # Supported cell types
//! Vertex orderings follow [`CellType`]: hex bottom `[0, 1, 2, 3]` / top
//! `[4, 5, 6, 7]`, prism bottom `[0, 1, 2]` / top `[3, 4, 5]`, pyramid base
//! `[0, 1, 2, 3]` / apex `4`.
//!
//! # Examples
//! ```rust
//! use mesh_recombine::geometry::quality::{min_scaled_jacobian, signed_volume_of};
//! use mesh_recombine::topology::CellType;
//!
//! let cube = [
//!     [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0],
//! ];
//! assert_eq!(min_scaled_jacobian(CellType::Hexahedron, &cube), 1.0);
//! assert!((signed_volume_of(CellType::Hexahedron, &cube) - 1.0).abs() < 1e-12);
//! ```

use crate::topology::cell_type::CellType;
use std::f64::consts::{FRAC_PI_2, PI};

/// A point in 3-space.
pub type Point3 = [f64; 3];

const EPS: f64 = 1e-12;

/// Corner jacobian of a regular tetrahedron / square pyramid with unit edges.
const TET_IDEAL_CORNER: f64 = std::f64::consts::FRAC_1_SQRT_2;
/// Corner jacobian of an equilateral-triangle prism corner.
const PRISM_IDEAL_CORNER: f64 = 0.866_025_403_784_438_6;

/// Per-corner `(corner, e1, e2, e3)` local indices of a hexahedron.
const HEX_CORNERS: [(usize, usize, usize, usize); 8] = [
    (0, 1, 3, 4),
    (1, 2, 0, 5),
    (2, 3, 1, 6),
    (3, 0, 2, 7),
    (4, 7, 5, 0),
    (5, 4, 6, 1),
    (6, 5, 7, 2),
    (7, 6, 4, 3),
];
/// Per-corner `(corner, e1, e2, e3)` local indices of a prism.
const PRISM_CORNERS: [(usize, usize, usize, usize); 6] = [
    (0, 1, 2, 3),
    (1, 2, 0, 4),
    (2, 0, 1, 5),
    (3, 5, 4, 0),
    (4, 3, 5, 1),
    (5, 4, 3, 2),
];
/// Base corners of a pyramid; the apex is left out.
const PYRAMID_CORNERS: [(usize, usize, usize, usize); 4] =
    [(0, 1, 3, 4), (1, 2, 0, 4), (2, 3, 1, 4), (3, 0, 2, 4)];
const TET_CORNERS: [(usize, usize, usize, usize); 4] =
    [(0, 1, 2, 3), (1, 2, 0, 3), (2, 0, 1, 3), (3, 0, 2, 1)];

/// Signed scaled jacobian of the corner at `v0` spanned by `v1`, `v2`, `v3`.
pub fn scaled_jacobian(v0: Point3, v1: Point3, v2: Point3, v3: Point3) -> f64 {
    let a = sub(v1, v0);
    let b = sub(v2, v0);
    let c = sub(v3, v0);
    let lengths = norm(a) * norm(b) * norm(c);
    if lengths <= EPS {
        return 0.0;
    }
    dot(a, cross(b, c)) / lengths
}

/// Worst corner scaled jacobian of a solid, normalized so the ideal shape of
/// each type scores `1.0`. Values are capped at `1.0`.
///
/// 2D cell types score `0.0`.
pub fn min_scaled_jacobian(cell_type: CellType, vertices: &[Point3]) -> f64 {
    let (corners, ideal): (&[(usize, usize, usize, usize)], f64) = match cell_type {
        CellType::Hexahedron => (&HEX_CORNERS, 1.0),
        CellType::Prism => (&PRISM_CORNERS, PRISM_IDEAL_CORNER),
        CellType::Pyramid => (&PYRAMID_CORNERS, TET_IDEAL_CORNER),
        CellType::Tetrahedron => (&TET_CORNERS, TET_IDEAL_CORNER),
        CellType::Triangle | CellType::Quadrilateral => return 0.0,
    };
    corners
        .iter()
        .map(|&(o, a, b, c)| {
            scaled_jacobian(vertices[o], vertices[a], vertices[b], vertices[c]) / ideal
        })
        .fold(f64::INFINITY, f64::min)
        .min(1.0)
}

/// Angle-based shape measure of the quadrilateral `a-b-c-d`.
///
/// Computes `1 - max_i |pi/2 - alpha_i| / (pi/2)` where `alpha_i` are the
/// corner angles measured in `(0, 2 pi)` around the quad normal, so reflex
/// corners push the value below zero.
pub fn shape_distortion(a: Point3, b: Point3, c: Point3, d: Point3) -> f64 {
    let pts = [a, b, c, d];
    let normal = cross(sub(c, a), sub(d, b));
    let n_len = norm(normal);
    if n_len <= EPS {
        return 0.0;
    }
    let mut worst = 0.0f64;
    for i in 0..4 {
        let cur = pts[i];
        let e1 = sub(pts[(i + 1) % 4], cur);
        let e2 = sub(pts[(i + 3) % 4], cur);
        let l = norm(e1) * norm(e2);
        if l <= EPS {
            return 0.0;
        }
        let sin = dot(cross(e1, e2), normal) / (l * n_len);
        let cos = dot(e1, e2) / l;
        let mut angle = sin.atan2(cos);
        if angle < 0.0 {
            angle += 2.0 * PI;
        }
        worst = worst.max((FRAC_PI_2 - angle).abs());
    }
    1.0 - worst / FRAC_PI_2
}

/// Worst [`shape_distortion`] over the quadrilateral faces of a solid.
pub fn min_face_distortion(cell_type: CellType, vertices: &[Point3]) -> f64 {
    cell_type
        .quad_faces()
        .map(|f| {
            shape_distortion(
                vertices[f[0]],
                vertices[f[1]],
                vertices[f[2]],
                vertices[f[3]],
            )
        })
        .fold(1.0, f64::min)
}

/// Signed volume of a tetrahedron.
pub fn signed_volume(a: Point3, b: Point3, c: Point3, d: Point3) -> f64 {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let ad = sub(d, a);
    dot(ab, cross(ac, ad)) / 6.0
}

/// Signed volume of a solid element; 2D cell types have zero volume.
pub fn signed_volume_of(cell_type: CellType, vertices: &[Point3]) -> f64 {
    match cell_type {
        CellType::Tetrahedron => signed_volume(vertices[0], vertices[1], vertices[2], vertices[3]),
        CellType::Pyramid => pyramid_signed_volume(vertices),
        CellType::Prism => prism_signed_volume(vertices),
        CellType::Hexahedron => hex_signed_volume(vertices),
        CellType::Triangle | CellType::Quadrilateral => 0.0,
    }
}

fn prism_signed_volume(vertices: &[Point3]) -> f64 {
    signed_volume(vertices[0], vertices[1], vertices[2], vertices[3])
        + signed_volume(vertices[1], vertices[4], vertices[2], vertices[3])
        + signed_volume(vertices[2], vertices[4], vertices[5], vertices[3])
}

fn pyramid_signed_volume(vertices: &[Point3]) -> f64 {
    signed_volume(vertices[0], vertices[1], vertices[2], vertices[4])
        + signed_volume(vertices[0], vertices[2], vertices[3], vertices[4])
}

fn hex_signed_volume(vertices: &[Point3]) -> f64 {
    signed_volume(vertices[0], vertices[1], vertices[3], vertices[4])
        + signed_volume(vertices[1], vertices[2], vertices[3], vertices[6])
        + signed_volume(vertices[1], vertices[3], vertices[4], vertices[6])
        + signed_volume(vertices[1], vertices[4], vertices[5], vertices[6])
        + signed_volume(vertices[3], vertices[4], vertices[6], vertices[7])
}

/// Arithmetic mean of a non-empty point set.
pub fn centroid(points: impl IntoIterator<Item = Point3>) -> Point3 {
    let mut sum = [0.0; 3];
    let mut n = 0usize;
    for p in points {
        sum = add(sum, p);
        n += 1;
    }
    if n == 0 {
        return sum;
    }
    scale(sum, 1.0 / n as f64)
}

/// `a + t (b - a)`.
pub fn lerp(a: Point3, b: Point3, t: f64) -> Point3 {
    add(a, scale(sub(b, a), t))
}

pub(crate) fn sub(a: Point3, b: Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn add(a: Point3, b: Point3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn scale(a: Point3, s: f64) -> Point3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub(crate) fn dot(a: Point3, b: Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: Point3, b: Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn norm(a: Point3) -> f64 {
    dot(a, a).sqrt()
}
