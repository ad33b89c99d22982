//! Serialization to PGEOMETRY V5 text.
//!
//! A single deterministic pass over the geometry. The exact layout —
//! blank lines and the trailing space on continued lines included — is
//! the wire contract downstream tools diff against, so it must stay
//! byte-stable.

use crate::codec::lex::quote;
use crate::model::{Attrib, AttribCell, AttribStore, AttribType, Geometry};

/// Serializes a geometry to PGEOMETRY V5 text.
///
/// Output is byte-identical across repeated calls on the same geometry:
/// attribute blocks follow schema insertion order and interning tables
/// keep first-seen order.
pub fn serialize(geo: &Geometry) -> String {
    let point_attribs = geo.point_attribs();
    let prim_attribs = geo.prim_attribs();
    let any_attribs = !point_attribs.is_empty() || !prim_attribs.is_empty();

    let mut out = String::new();

    // Header: counts, group counts (groups unsupported, always 0), and
    // the detail-attribute flag.
    out.push_str("PGEOMETRY V5\n");
    out.push_str(&format!(
        "NPoints {} NPrims {}\n",
        geo.points().len(),
        geo.prims().len()
    ));
    out.push_str("NPointGroups 0 NPrimGroups 0\n");
    out.push_str(&format!(
        "NPointAttrib {} NVertexAttrib 0 NPrimAttrib {} NAttrib {}\n",
        point_attribs.len(),
        prim_attribs.len(),
        u8::from(any_attribs)
    ));
    out.push('\n');

    if !point_attribs.is_empty() {
        out.push_str("PointAttrib\n\n");
        write_attrib_defs(&mut out, point_attribs);
    }
    out.push('\n');

    for (p, point) in geo.points().iter().enumerate() {
        out.push_str(&format!(
            "{:.6} {:.6} {:.6} {:.6} ",
            point.x, point.y, point.z, 1.0
        ));
        if !point_attribs.is_empty() {
            write_attrib_values(&mut out, point_attribs, p);
        }
        out.push('\n');
    }
    out.push_str("\n\n");

    if !geo.prims().is_empty() {
        out.push('\n');
        if !prim_attribs.is_empty() {
            out.push_str("PrimitiveAttrib\n\n");
            write_attrib_defs(&mut out, prim_attribs);
        }
        out.push('\n');
        for (r, prim) in geo.prims().iter().enumerate() {
            let refs: Vec<String> = prim.points.iter().map(ToString::to_string).collect();
            out.push_str(&format!(
                "Poly {} {} {} ",
                prim.points.len(),
                if prim.closed { "<" } else { ":" },
                refs.join(" ")
            ));
            if !prim_attribs.is_empty() {
                write_attrib_values(&mut out, prim_attribs, r);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out.push('\n');

    if any_attribs {
        out.push_str("DetailAttrib\n");
        let names: Vec<String> = geo
            .attribute_names()
            .iter()
            .map(|name| quote(&format!("{name} -> {name}")))
            .collect();
        out.push_str(&format!(
            "varmap 1 index {} {}\n",
            names.len(),
            names.join(" ")
        ));
        out.push_str(" (0)\n");
    }
    out.push_str("\nbeginExtra\nendExtra\n");
    out
}

/// One definition line per attribute, in insertion order.
fn write_attrib_defs(out: &mut String, store: &AttribStore) {
    for attrib in store.iter() {
        let schema = attrib.schema();
        match schema.ty {
            AttribType::String => {
                // The value list is the interning table itself.
                out.push_str(&format!(
                    "{} 1 index {} ",
                    attrib.name(),
                    attrib.strings().len()
                ));
                for text in attrib.strings().iter() {
                    out.push_str(&quote(text));
                    out.push(' ');
                }
                out.push('\n');
            }
            AttribType::Int => {
                let defaults = vec!["0"; schema.arity].join(" ");
                out.push_str(&format!(
                    "{} {} int {}\n",
                    attrib.name(),
                    schema.arity,
                    defaults
                ));
            }
            AttribType::Float => {
                let defaults = vec!["0.0"; schema.arity].join(" ");
                out.push_str(&format!(
                    "{} {} float {}\n",
                    attrib.name(),
                    schema.arity,
                    defaults
                ));
            }
        }
    }
}

/// The parenthesized value block for one entity: tab-separated between
/// attributes, space-separated within an attribute's components. String
/// attributes emit their interned index, not the text.
fn write_attrib_values(out: &mut String, store: &AttribStore, entity: usize) {
    let blocks: Vec<String> = store.iter().map(|a| attrib_tokens(a, entity)).collect();
    out.push_str(&format!("({}) ", blocks.join("\t")));
}

fn attrib_tokens(attrib: &Attrib, entity: usize) -> String {
    let arity = attrib.schema().arity;
    match attrib.cell(entity) {
        Some(AttribCell::Int(v)) => v
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "),
        Some(AttribCell::Float(v)) => v
            .iter()
            .map(|f| fmt_float(*f))
            .collect::<Vec<_>>()
            .join(" "),
        Some(AttribCell::StrIndex(i)) => i.to_string(),
        None => match attrib.schema().ty {
            AttribType::Int => vec!["0"; arity].join(" "),
            AttribType::Float => vec!["0.0"; arity].join(" "),
            AttribType::String => "0".to_string(),
        },
    }
}

/// Formats an attribute float: integral finite values keep a trailing
/// `.0`, everything else uses the shortest form that parses back to
/// the same value. Exactness here is what keeps decode(encode(g))
/// lossless for float attributes.
fn fmt_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
