//! The in-memory geometry container.

use std::fmt;

use crate::error::AttribError;
use crate::model::attrib::{AttribStore, AttribValue, EntityKind};

/// A point: three coordinates, identified by its position in the
/// geometry's point sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A primitive's reference to a point.
///
/// References created through the mutation API are numeric indices into
/// the point sequence. The parser keeps point tokens verbatim instead:
/// they are never validated as in-range integers, so external ID
/// schemes survive a read/write cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointRef {
    /// Numeric index assigned at creation time.
    Index(usize),
    /// Verbatim token copied from parsed input.
    Raw(String),
}

impl PointRef {
    /// Numeric view of the reference, if the token parses as an index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PointRef::Index(i) => Some(*i),
            PointRef::Raw(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for PointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointRef::Index(i) => write!(f, "{i}"),
            PointRef::Raw(s) => f.write_str(s),
        }
    }
}

/// An ordered run of point references plus an open/closed flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Prim {
    pub points: Vec<PointRef>,
    pub closed: bool,
}

/// A point/primitive mesh with typed per-entity attributes.
///
/// Assembled in a single top-to-bottom pass, either through the
/// mutation API or by [`crate::parse`]; consumed by [`crate::serialize`]
/// or by direct query. Indices are positional and never reused; there
/// is no deletion or merging.
#[derive(Debug, Clone)]
pub struct Geometry {
    points: Vec<Point>,
    prims: Vec<Prim>,
    point_attribs: AttribStore,
    prim_attribs: AttribStore,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    /// Creates an empty geometry.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            prims: Vec::new(),
            point_attribs: AttribStore::new(EntityKind::Point),
            prim_attribs: AttribStore::new(EntityKind::Prim),
        }
    }

    /// Appends a point, returning its index.
    pub fn add_point(&mut self, x: f64, y: f64, z: f64) -> usize {
        self.points.push(Point { x, y, z });
        self.points.len() - 1
    }

    /// Appends a primitive referencing the given point indices in
    /// order, returning its index.
    ///
    /// Indices are not validated against the point sequence; keeping
    /// them in bounds is the producer's responsibility.
    pub fn add_prim(&mut self, points: impl IntoIterator<Item = usize>, closed: bool) -> usize {
        let points = points.into_iter().map(PointRef::Index).collect();
        self.add_prim_refs(points, closed)
    }

    /// Appends a primitive from pre-built references (the parser path).
    pub fn add_prim_refs(&mut self, points: Vec<PointRef>, closed: bool) -> usize {
        self.prims.push(Prim { points, closed });
        self.prims.len() - 1
    }

    /// Returns the ordered point sequence.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the ordered primitive sequence.
    pub fn prims(&self) -> &[Prim] {
        &self.prims
    }

    /// Returns the point attribute store.
    pub fn point_attribs(&self) -> &AttribStore {
        &self.point_attribs
    }

    /// Returns the primitive attribute store.
    pub fn prim_attribs(&self) -> &AttribStore {
        &self.prim_attribs
    }

    pub(crate) fn attribs_mut(&mut self, kind: EntityKind) -> &mut AttribStore {
        match kind {
            EntityKind::Point => &mut self.point_attribs,
            EntityKind::Prim => &mut self.prim_attribs,
        }
    }

    /// Sets integer components of a point attribute.
    pub fn set_point_attr_int(
        &mut self,
        name: &str,
        index: usize,
        values: &[i64],
    ) -> Result<(), AttribError> {
        self.point_attribs.set_int(name, index, values)
    }

    /// Sets float components of a point attribute.
    pub fn set_point_attr_float(
        &mut self,
        name: &str,
        index: usize,
        values: &[f64],
    ) -> Result<(), AttribError> {
        self.point_attribs.set_float(name, index, values)
    }

    /// Sets a string point attribute, interning the text.
    pub fn set_point_attr_string(
        &mut self,
        name: &str,
        index: usize,
        text: &str,
    ) -> Result<(), AttribError> {
        self.point_attribs.set_string(name, index, text)
    }

    /// Sets integer components of a primitive attribute.
    pub fn set_prim_attr_int(
        &mut self,
        name: &str,
        index: usize,
        values: &[i64],
    ) -> Result<(), AttribError> {
        self.prim_attribs.set_int(name, index, values)
    }

    /// Sets float components of a primitive attribute.
    pub fn set_prim_attr_float(
        &mut self,
        name: &str,
        index: usize,
        values: &[f64],
    ) -> Result<(), AttribError> {
        self.prim_attribs.set_float(name, index, values)
    }

    /// Sets a string primitive attribute, interning the text.
    pub fn set_prim_attr_string(
        &mut self,
        name: &str,
        index: usize,
        text: &str,
    ) -> Result<(), AttribError> {
        self.prim_attribs.set_string(name, index, text)
    }

    /// Resolves a point attribute value.
    pub fn get_point_attr(&self, name: &str, index: usize) -> Result<AttribValue, AttribError> {
        self.point_attribs.get(name, index)
    }

    /// Resolves a primitive attribute value.
    pub fn get_prim_attr(&self, name: &str, index: usize) -> Result<AttribValue, AttribError> {
        self.prim_attribs.get(name, index)
    }

    /// All attribute names present, point names then primitive names,
    /// in insertion order. This is the varmap manifest.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.point_attribs
            .names()
            .chain(self.prim_attribs.names())
            .collect()
    }
}
