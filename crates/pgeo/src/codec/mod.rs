//! Text encoding/decoding for PGEOMETRY V5.

pub mod lex;
pub mod read;
pub mod write;

pub use read::parse;
pub use write::serialize;
