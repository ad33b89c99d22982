//! Typed, fixed-arity attribute tables with string interning.
//!
//! An attribute is named, has a fixed element type and arity set at
//! first assignment, and holds a sparse mapping from entity index to a
//! value of that arity. String attributes store interned indices into a
//! private ordered table rather than the text itself.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::error::AttribError;

/// Entity kinds that can carry attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Point,
    Prim,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Point => f.write_str("Point"),
            EntityKind::Prim => f.write_str("Prim"),
        }
    }
}

/// Element types for attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttribType {
    Int,
    Float,
    String,
}

impl AttribType {
    /// Wire keyword on attribute definition lines.
    ///
    /// String attributes are written as `index`: the value is an index
    /// into the attribute's interning table.
    pub fn keyword(self) -> &'static str {
        match self {
            AttribType::Int => "int",
            AttribType::Float => "float",
            AttribType::String => "index",
        }
    }

    /// Creates an AttribType from its wire keyword.
    pub fn from_keyword(kw: &str) -> Option<AttribType> {
        match kw {
            "int" => Some(AttribType::Int),
            "float" => Some(AttribType::Float),
            "index" => Some(AttribType::String),
            _ => None,
        }
    }
}

/// Fixed schema of an attribute: element type and arity.
///
/// Set once at first assignment, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribSchema {
    pub ty: AttribType,
    pub arity: usize,
}

impl fmt::Display for AttribSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.ty.keyword(), self.arity)
    }
}

/// Interning table for one string attribute: unique strings in
/// first-seen order, referenced by stored index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringTable {
    strings: Vec<String>,
    indices: FxHashMap<String, usize>,
}

impl StringTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or gets the index for a string.
    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(&idx) = self.indices.get(text) {
            idx
        } else {
            let idx = self.strings.len();
            self.strings.push(text.to_string());
            self.indices.insert(text.to_string(), idx);
            idx
        }
    }

    /// Returns the text for a stored index.
    pub fn resolve(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Returns the number of unique strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if no strings have been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterates the strings in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

/// A stored attribute cell: numeric components, or an interned string
/// index.
#[derive(Debug, Clone, PartialEq)]
pub enum AttribCell {
    Int(Vec<i64>),
    Float(Vec<f64>),
    StrIndex(usize),
}

/// A resolved attribute value returned by queries.
///
/// Arity-1 numeric attributes come back unwrapped as scalars; string
/// attributes come back resolved through the interning table.
#[derive(Debug, Clone, PartialEq)]
pub enum AttribValue {
    Int(i64),
    Float(f64),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    Str(String),
}

impl AttribValue {
    /// Scalar integer view, if this is an arity-1 int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttribValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Scalar float view, if this is an arity-1 float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttribValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String view, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttribValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One named attribute: fixed schema, sparse values, and (for string
/// attributes) the private interning table.
#[derive(Debug, Clone)]
pub struct Attrib {
    name: String,
    schema: AttribSchema,
    values: FxHashMap<usize, AttribCell>,
    strings: StringTable,
}

impl Attrib {
    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fixed schema.
    pub fn schema(&self) -> AttribSchema {
        self.schema
    }

    /// Returns the interning table (empty for numeric attributes).
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Returns the stored cell for an entity, if explicitly set.
    pub fn cell(&self, entity: usize) -> Option<&AttribCell> {
        self.values.get(&entity)
    }

    /// Resolves an entity's value, falling back to the schema default.
    pub fn resolve(&self, entity: usize) -> AttribValue {
        match self.values.get(&entity) {
            Some(AttribCell::Int(v)) if v.len() == 1 => AttribValue::Int(v[0]),
            Some(AttribCell::Int(v)) => AttribValue::IntList(v.clone()),
            Some(AttribCell::Float(v)) if v.len() == 1 => AttribValue::Float(v[0]),
            Some(AttribCell::Float(v)) => AttribValue::FloatList(v.clone()),
            Some(AttribCell::StrIndex(i)) => {
                AttribValue::Str(self.strings.resolve(*i).unwrap_or("").to_string())
            }
            None => self.default_value(),
        }
    }

    /// Zero-valued default of the schema's arity. Unset string
    /// attributes resolve through stored index 0.
    fn default_value(&self) -> AttribValue {
        match (self.schema.ty, self.schema.arity) {
            (AttribType::Int, 1) => AttribValue::Int(0),
            (AttribType::Int, n) => AttribValue::IntList(vec![0; n]),
            (AttribType::Float, 1) => AttribValue::Float(0.0),
            (AttribType::Float, n) => AttribValue::FloatList(vec![0.0; n]),
            (AttribType::String, _) => {
                AttribValue::Str(self.strings.resolve(0).unwrap_or("").to_string())
            }
        }
    }
}

/// Ordered, typed attribute tables for one entity kind.
///
/// Names are unique within the store; listing order is insertion order,
/// which is also the serialization order.
#[derive(Debug, Clone)]
pub struct AttribStore {
    kind: EntityKind,
    attribs: Vec<Attrib>,
    by_name: FxHashMap<String, usize>,
}

impl AttribStore {
    /// Creates an empty store for the given entity kind.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            attribs: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Returns the entity kind this store serves.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.attribs.len()
    }

    /// Returns true if no attributes are defined.
    pub fn is_empty(&self) -> bool {
        self.attribs.is_empty()
    }

    /// Iterates attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attribs.iter().map(|a| a.name.as_str())
    }

    /// Iterates attribute definitions in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attrib> {
        self.attribs.iter()
    }

    /// Looks up an attribute definition by name.
    pub fn attrib(&self, name: &str) -> Option<&Attrib> {
        self.by_name.get(name).map(|&idx| &self.attribs[idx])
    }

    /// Stores integer components at an entity index. The first set for
    /// a name fixes its schema as `int[values.len()]`.
    pub fn set_int(&mut self, name: &str, entity: usize, values: &[i64]) -> Result<(), AttribError> {
        let schema = AttribSchema {
            ty: AttribType::Int,
            arity: values.len(),
        };
        let attrib = self.slot(name, schema)?;
        attrib.values.insert(entity, AttribCell::Int(values.to_vec()));
        Ok(())
    }

    /// Stores float components at an entity index. The first set for a
    /// name fixes its schema as `float[values.len()]`.
    pub fn set_float(
        &mut self,
        name: &str,
        entity: usize,
        values: &[f64],
    ) -> Result<(), AttribError> {
        let schema = AttribSchema {
            ty: AttribType::Float,
            arity: values.len(),
        };
        let attrib = self.slot(name, schema)?;
        attrib
            .values
            .insert(entity, AttribCell::Float(values.to_vec()));
        Ok(())
    }

    /// Interns `text` into the attribute's table and stores its index
    /// at the entity. String attributes always have arity 1.
    pub fn set_string(&mut self, name: &str, entity: usize, text: &str) -> Result<(), AttribError> {
        let schema = AttribSchema {
            ty: AttribType::String,
            arity: 1,
        };
        let attrib = self.slot(name, schema)?;
        let index = attrib.strings.intern(text);
        attrib.values.insert(entity, AttribCell::StrIndex(index));
        Ok(())
    }

    /// Resolves an attribute value for an entity.
    ///
    /// Fails with `NotFound` if the name was never set for this kind;
    /// entities with no explicit value read back the schema default.
    pub fn get(&self, name: &str, entity: usize) -> Result<AttribValue, AttribError> {
        let Some(&idx) = self.by_name.get(name) else {
            return Err(AttribError::NotFound {
                kind: self.kind,
                name: name.to_string(),
            });
        };
        Ok(self.attribs[idx].resolve(entity))
    }

    /// Finds or creates the attribute slot for a name, enforcing schema
    /// immutability.
    fn slot(&mut self, name: &str, requested: AttribSchema) -> Result<&mut Attrib, AttribError> {
        if let Some(&idx) = self.by_name.get(name) {
            let attrib = &mut self.attribs[idx];
            if attrib.schema != requested {
                return Err(AttribError::SchemaConflict {
                    kind: self.kind,
                    name: name.to_string(),
                    existing: attrib.schema,
                    requested,
                });
            }
            Ok(attrib)
        } else {
            let idx = self.attribs.len();
            self.attribs.push(Attrib {
                name: name.to_string(),
                schema: requested,
                values: FxHashMap::default(),
                strings: StringTable::new(),
            });
            self.by_name.insert(name.to_string(), idx);
            Ok(&mut self.attribs[idx])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_fixed_at_first_set() {
        let mut store = AttribStore::new(EntityKind::Point);
        store.set_int("a", 0, &[1, 2]).unwrap();

        // Different type
        let err = store.set_float("a", 1, &[3.0, 4.0]).unwrap_err();
        assert!(matches!(err, AttribError::SchemaConflict { .. }));

        // Different arity
        let err = store.set_int("a", 1, &[3]).unwrap_err();
        assert!(matches!(
            err,
            AttribError::SchemaConflict {
                existing: AttribSchema {
                    ty: AttribType::Int,
                    arity: 2
                },
                ..
            }
        ));

        // Matching schema still works
        store.set_int("a", 1, &[3, 4]).unwrap();
    }

    #[test]
    fn test_interning_idempotent() {
        let mut store = AttribStore::new(EntityKind::Prim);
        store.set_string("k", 0, "X").unwrap();
        store.set_string("k", 1, "X").unwrap();

        let attrib = store.attrib("k").unwrap();
        assert_eq!(attrib.strings().len(), 1);
        assert_eq!(attrib.cell(0), Some(&AttribCell::StrIndex(0)));
        assert_eq!(attrib.cell(1), Some(&AttribCell::StrIndex(0)));

        store.set_string("k", 2, "Y").unwrap();
        assert_eq!(store.attrib("k").unwrap().strings().len(), 2);
        assert_eq!(
            store.attrib("k").unwrap().cell(2),
            Some(&AttribCell::StrIndex(1))
        );
    }

    #[test]
    fn test_default_fallback() {
        let mut store = AttribStore::new(EntityKind::Point);
        store.set_int("id", 0, &[7]).unwrap();
        store.set_float("uv", 0, &[0.5, 0.5]).unwrap();

        // Unset entity reads back zeros of the declared arity.
        assert_eq!(store.get("id", 99).unwrap(), AttribValue::Int(0));
        assert_eq!(
            store.get("uv", 99).unwrap(),
            AttribValue::FloatList(vec![0.0, 0.0])
        );

        // Unknown name is an error, not a default.
        assert!(matches!(
            store.get("missing", 0),
            Err(AttribError::NotFound { .. })
        ));
    }

    #[test]
    fn test_string_default_resolves_first_entry() {
        let mut store = AttribStore::new(EntityKind::Prim);
        store.set_string("label", 0, "first").unwrap();
        store.set_string("label", 1, "second").unwrap();

        assert_eq!(
            store.get("label", 5).unwrap(),
            AttribValue::Str("first".to_string())
        );
    }

    #[test]
    fn test_arity_one_unwrapped() {
        let mut store = AttribStore::new(EntityKind::Point);
        store.set_int("id", 0, &[42]).unwrap();
        store.set_float("w", 0, &[1.5]).unwrap();

        assert_eq!(store.get("id", 0).unwrap().as_int(), Some(42));
        assert_eq!(store.get("w", 0).unwrap().as_float(), Some(1.5));
    }

    #[test]
    fn test_names_insertion_order() {
        let mut store = AttribStore::new(EntityKind::Point);
        store.set_int("z", 0, &[0]).unwrap();
        store.set_float("a", 0, &[0.0]).unwrap();
        store.set_string("m", 0, "x").unwrap();
        store.set_int("z", 1, &[1]).unwrap(); // re-set must not reorder

        let names: Vec<&str> = store.names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_keyword_roundtrip() {
        for ty in [AttribType::Int, AttribType::Float, AttribType::String] {
            assert_eq!(AttribType::from_keyword(ty.keyword()), Some(ty));
        }
        assert_eq!(AttribType::from_keyword("vector"), None);
    }
}
