//! Core data types: attribute store and geometry container.

pub mod attrib;
pub mod geometry;

pub use attrib::{
    Attrib, AttribCell, AttribSchema, AttribStore, AttribType, AttribValue, EntityKind,
    StringTable,
};
pub use geometry::{Geometry, Point, PointRef, Prim};
