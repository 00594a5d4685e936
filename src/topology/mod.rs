//! Mesh entity handles, cell types and element tuples.

pub mod cell_type;
pub mod element;
pub mod point;

pub use cell_type::CellType;
pub use element::{Element, Face};
pub use point::{ElementId, VertexId};
