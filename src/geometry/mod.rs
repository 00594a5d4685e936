//! Geometry utilities for mesh-recombine.
//!
//! Quality measures and signed volumes evaluated on explicit vertex
//! coordinates.

pub mod quality;
