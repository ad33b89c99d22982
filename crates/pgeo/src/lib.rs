//! PGEOMETRY V5: line-oriented text geometry interchange format.
//!
//! This crate provides the in-memory geometry container, a
//! deterministic text serializer, and a permissive-but-strict parser
//! for the PGEOMETRY V5 subset this pipeline emits and consumes.
//!
//! # Overview
//!
//! A geometry is an ordered sequence of 3D points, an ordered sequence
//! of primitives (point-index runs with an open/closed flag), and a
//! typed, fixed-arity attribute schema per entity kind:
//! - **Write-once**: geometries are assembled in a single pass and then
//!   serialized or queried; there is no deletion or merging
//! - **Typed attributes**: int, float, and interned-string values with
//!   a schema fixed at first assignment
//! - **Byte-stable output**: repeated serialization of the same
//!   geometry is byte-identical
//!
//! # Quick Start
//!
//! ```rust
//! use pgeo::{parse, serialize, Geometry};
//!
//! // Build a geometry: two points, one open primitive, one label.
//! let mut geo = Geometry::new();
//! let a = geo.add_point(0.0, 0.0, 0.0);
//! let b = geo.add_point(1.0, 0.0, 0.0);
//! let prim = geo.add_prim(vec![a, b], false);
//! geo.set_prim_attr_string("label", prim, "border").unwrap();
//!
//! // Serialize to text
//! let text = serialize(&geo);
//!
//! // Parse back
//! let decoded = parse(&text).unwrap();
//! assert_eq!(decoded.points().len(), 2);
//! assert_eq!(
//!     decoded.get_prim_attr("label", 0).unwrap().as_str(),
//!     Some("border")
//! );
//! ```
//!
//! # Modules
//!
//! - [`model`]: the geometry container and attribute store
//! - [`codec`]: text serialization and parsing
//! - [`error`]: error types
//!
//! # Format
//!
//! Line-oriented UTF-8 text. Only the subset this system produces is
//! supported: point/vertex/primitive groups are never populated, and
//! the detail block holds a single `varmap` manifest that is written
//! but never read back. The codec validates structure, not geometric
//! correctness; primitive point references are kept verbatim and never
//! bounds-checked.

pub mod codec;
pub mod error;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{parse, serialize};
pub use error::{AttribError, ParseError};
pub use model::{
    Attrib, AttribCell, AttribSchema, AttribStore, AttribType, AttribValue, EntityKind,
    Geometry, Point, PointRef, Prim, StringTable,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// PGEOMETRY format version this crate reads and writes.
pub const FORMAT_VERSION: &str = "V5";
