//! Parsing of PGEOMETRY V5 text.
//!
//! A line-oriented state machine: four fixed header lines matched in
//! strict order, then attribute schema sections that fall through into
//! the data sections on the first non-matching line. The point/prim
//! counts declared in the header bound the data states, so sections
//! without an attribute block (and thus without a marker line) are
//! still entered and left correctly.

use crate::codec::lex::split_quoted;
use crate::error::ParseError;
use crate::model::{AttribType, EntityKind, Geometry, PointRef};

/// Parses PGEOMETRY V5 text into a geometry.
///
/// Parsing is strict about structure (a malformed header or data line
/// aborts the whole read) but permissive about content: primitive point
/// tokens are kept verbatim and never validated as in-range indices,
/// and a `DetailAttrib` line stops parsing immediately (the varmap
/// block is write-only).
pub fn parse(input: &str) -> Result<Geometry, ParseError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let header = parse_header(&mut lines)?;

    let mut geo = Geometry::new();
    let mut point_defs: Vec<AttribDef> = Vec::new();
    let mut prim_defs: Vec<AttribDef> = Vec::new();
    let mut points_read = 0usize;
    let mut prims_read = 0usize;
    let mut mode = Mode::PointAttribSchema;

    for (line_no, line) in lines {
        match line {
            "PointAttrib" => {
                mode = Mode::PointAttribSchema;
                continue;
            }
            "PrimitiveAttrib" => {
                mode = Mode::PrimAttribSchema;
                continue;
            }
            "DetailAttrib" => break,
            "beginExtra" | "endExtra" => continue,
            _ => {}
        }

        // Schema states fall through to their data state on the first
        // non-matching line; data states hand off once the declared
        // count is satisfied. The loop re-dispatches the same line
        // after each transition.
        loop {
            match mode {
                Mode::PointAttribSchema => {
                    if let Some(def) = parse_attrib_def(line_no, line)? {
                        point_defs.push(def);
                        break;
                    }
                    mode = Mode::Point;
                }
                Mode::Point => {
                    if points_read == header.npoints {
                        mode = Mode::PrimAttribSchema;
                        continue;
                    }
                    parse_point_line(line_no, line, &point_defs, &mut geo, points_read)?;
                    points_read += 1;
                    break;
                }
                Mode::PrimAttribSchema => {
                    if is_run_marker(line) {
                        break;
                    }
                    if let Some(def) = parse_attrib_def(line_no, line)? {
                        prim_defs.push(def);
                        break;
                    }
                    mode = Mode::Prim;
                }
                Mode::Prim => {
                    if prims_read == header.nprims {
                        mode = Mode::Done;
                        continue;
                    }
                    parse_prim_line(line_no, line, &prim_defs, &mut geo, prims_read)?;
                    prims_read += 1;
                    break;
                }
                Mode::Done => break,
            }
        }
    }

    Ok(geo)
}

/// Parser states after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    PointAttribSchema,
    Point,
    PrimAttribSchema,
    Prim,
    Done,
}

/// Declared counts from the header. The attribute and group counts are
/// informational and not cross-checked against the blocks that follow;
/// the point/prim counts bound the data states.
#[derive(Debug, Clone, Copy)]
struct Header {
    npoints: usize,
    nprims: usize,
}

/// One attribute definition read from a schema section.
#[derive(Debug, Clone, PartialEq)]
struct AttribDef {
    name: String,
    ty: AttribType,
    /// Wire tokens per entity. String (`index`) attributes always
    /// contribute exactly one token.
    arity: usize,
    /// Ordered interning table (string attributes only).
    strings: Vec<String>,
}

fn parse_header<'a, I>(lines: &mut I) -> Result<Header, ParseError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let (line_no, line) = lines
        .next()
        .ok_or(ParseError::UnexpectedEof { context: "header" })?;
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("PGEOMETRY") || tokens.next() != Some("V5") {
        return Err(ParseError::MalformedHeader {
            line_no,
            line: line.to_string(),
        });
    }

    let counts = parse_count_line(lines, &["NPoints", "NPrims"])?;
    let (npoints, nprims) = (counts[0], counts[1]);
    parse_count_line(lines, &["NPointGroups", "NPrimGroups"])?;
    parse_count_line(
        lines,
        &["NPointAttrib", "NVertexAttrib", "NPrimAttrib", "NAttrib"],
    )?;

    Ok(Header { npoints, nprims })
}

/// Matches the next line against `Key <n> Key <n> ...`, returning the
/// counts. Any deviation is a fatal `MalformedHeader`.
fn parse_count_line<'a, I>(lines: &mut I, keys: &[&str]) -> Result<Vec<usize>, ParseError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let (line_no, line) = lines
        .next()
        .ok_or(ParseError::UnexpectedEof { context: "header" })?;
    let malformed = || ParseError::MalformedHeader {
        line_no,
        line: line.to_string(),
    };

    let mut tokens = line.split_whitespace();
    let mut counts = Vec::with_capacity(keys.len());
    for key in keys {
        if tokens.next() != Some(*key) {
            return Err(malformed());
        }
        let count = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        counts.push(count);
    }
    Ok(counts)
}

/// `Run <n> Poly` lines are a no-op in the primitive attribute section.
fn is_run_marker(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    tokens.next() == Some("Run")
        && tokens
            .next()
            .is_some_and(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        && tokens.next() == Some("Poly")
        && tokens.next().is_none()
}

/// Tries a line against the attribute-definition grammar
/// `name length {int|float|index} value...`.
///
/// Returns `Ok(None)` when the line does not look like a definition at
/// all (the caller falls through to the data state). Once the
/// `name length type` prefix matches, malformed values are fatal.
fn parse_attrib_def(line_no: usize, line: &str) -> Result<Option<AttribDef>, ParseError> {
    let Some((name, rest)) = line.split_once(' ') else {
        return Ok(None);
    };
    let Some((len_tok, rest)) = rest.split_once(' ') else {
        return Ok(None);
    };
    let Some((kw, values)) = rest.split_once(' ') else {
        return Ok(None);
    };
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Ok(None);
    }
    let Ok(arity) = len_tok.parse::<usize>() else {
        return Ok(None);
    };
    let Some(ty) = AttribType::from_keyword(kw) else {
        return Ok(None);
    };

    let malformed = || ParseError::MalformedLine {
        line_no,
        context: "attribute definition",
        line: line.to_string(),
    };

    let strings = match ty {
        AttribType::String => {
            if arity != 1 {
                return Err(malformed());
            }
            let mut fields = split_quoted(values).ok_or_else(malformed)?.into_iter();
            let count: usize = fields
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(malformed)?;
            let strings: Vec<String> = fields.collect();
            if strings.len() != count {
                return Err(malformed());
            }
            strings
        }
        AttribType::Int => {
            // Defaults are count-checked but not stored: unset entities
            // read back zeros regardless of the file's defaults.
            let defaults: Vec<i64> = values
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| malformed())?;
            if defaults.len() != arity {
                return Err(malformed());
            }
            Vec::new()
        }
        AttribType::Float => {
            let defaults: Vec<f64> = values
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| malformed())?;
            if defaults.len() != arity {
                return Err(malformed());
            }
            Vec::new()
        }
    };

    Ok(Some(AttribDef {
        name: name.to_string(),
        ty,
        arity,
        strings,
    }))
}

/// Parses `x y z w [(attr-values)]`, discarding `w`.
fn parse_point_line(
    line_no: usize,
    line: &str,
    defs: &[AttribDef],
    geo: &mut Geometry,
    ordinal: usize,
) -> Result<(), ParseError> {
    let cleaned: String = line.chars().filter(|&c| c != '(' && c != ')').collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let malformed = || ParseError::MalformedLine {
        line_no,
        context: "point",
        line: line.to_string(),
    };

    if tokens.len() < 4 {
        return Err(malformed());
    }
    let mut coords = [0.0f64; 4];
    for (slot, tok) in coords.iter_mut().zip(&tokens[..4]) {
        *slot = tok.parse().map_err(|_| malformed())?;
    }

    geo.add_point(coords[0], coords[1], coords[2]);
    apply_attrib_tokens(
        line_no,
        line,
        &tokens[4..],
        defs,
        EntityKind::Point,
        ordinal,
        geo,
    )
}

/// Parses `[Poly] n {<|:} idx... [(attr-values)]`. Point tokens are
/// kept verbatim; any marker other than `<` means open.
fn parse_prim_line(
    line_no: usize,
    line: &str,
    defs: &[AttribDef],
    geo: &mut Geometry,
    ordinal: usize,
) -> Result<(), ParseError> {
    let cleaned: String = line
        .chars()
        .filter(|&c| !matches!(c, '[' | ']' | '(' | ')'))
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let malformed = || ParseError::MalformedLine {
        line_no,
        context: "primitive",
        line: line.to_string(),
    };

    let mut pos = 0;
    if tokens.first() == Some(&"Poly") {
        pos = 1;
    }
    let count: usize = tokens
        .get(pos)
        .and_then(|t| t.parse().ok())
        .ok_or_else(malformed)?;
    let closed = *tokens.get(pos + 1).ok_or_else(malformed)? == "<";

    let start = pos + 2;
    let end = start + count;
    if tokens.len() < end {
        return Err(malformed());
    }
    let refs: Vec<PointRef> = tokens[start..end]
        .iter()
        .map(|t| PointRef::Raw((*t).to_string()))
        .collect();

    geo.add_prim_refs(refs, closed);
    apply_attrib_tokens(
        line_no,
        line,
        &tokens[end..],
        defs,
        EntityKind::Prim,
        ordinal,
        geo,
    )
}

/// Consumes a data line's attribute tokens against the schema read so
/// far: one token per scalar component in schema order, `index` tokens
/// resolved through the definition's string table.
fn apply_attrib_tokens(
    line_no: usize,
    line: &str,
    tokens: &[&str],
    defs: &[AttribDef],
    kind: EntityKind,
    entity: usize,
    geo: &mut Geometry,
) -> Result<(), ParseError> {
    let expected: usize = defs.iter().map(|d| d.arity).sum();
    if tokens.len() != expected {
        return Err(ParseError::TokenCountMismatch {
            line_no,
            expected,
            found: tokens.len(),
        });
    }
    let malformed = || ParseError::MalformedLine {
        line_no,
        context: "attribute value",
        line: line.to_string(),
    };

    let store = geo.attribs_mut(kind);
    let mut rest = tokens;
    for def in defs {
        let (take, remaining) = rest.split_at(def.arity);
        rest = remaining;
        match def.ty {
            AttribType::String => {
                let index: usize = take[0].parse().map_err(|_| malformed())?;
                let text = def.strings.get(index).ok_or_else(|| {
                    ParseError::StringIndexOutOfBounds {
                        line_no,
                        name: def.name.clone(),
                        index,
                        size: def.strings.len(),
                    }
                })?;
                store.set_string(&def.name, entity, text)?;
            }
            AttribType::Int => {
                let values: Vec<i64> = take
                    .iter()
                    .map(|t| t.parse())
                    .collect::<Result<_, _>>()
                    .map_err(|_| malformed())?;
                store.set_int(&def.name, entity, &values)?;
            }
            AttribType::Float => {
                let values: Vec<f64> = take
                    .iter()
                    .map(|t| t.parse())
                    .collect::<Result<_, _>>()
                    .map_err(|_| malformed())?;
                store.set_float(&def.name, entity, &values)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttribValue;

    fn geo_text(body: &str, npoints: usize, nprims: usize, pa: usize, ra: usize) -> String {
        format!(
            "PGEOMETRY V5\n\
             NPoints {npoints} NPrims {nprims}\n\
             NPointGroups 0 NPrimGroups 0\n\
             NPointAttrib {pa} NVertexAttrib 0 NPrimAttrib {ra} NAttrib 1\n\
             {body}"
        )
    }

    #[test]
    fn test_rejects_bad_magic() {
        let err = parse("GEOMETRY V5\nNPoints 0 NPrims 0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedHeader { line_no: 1, .. }
        ));
    }

    #[test]
    fn test_rejects_bad_count_line() {
        let text = "PGEOMETRY V5\nNPoints x NPrims 0\n";
        assert!(matches!(
            parse(text).unwrap_err(),
            ParseError::MalformedHeader { line_no: 2, .. }
        ));
    }

    #[test]
    fn test_rejects_truncated_header() {
        let err = parse("PGEOMETRY V5\nNPoints 0 NPrims 0\n").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEof { context: "header" });
    }

    #[test]
    fn test_parses_points_without_markers() {
        // No attribute blocks, so no PointAttrib/PrimitiveAttrib lines.
        let text = geo_text(
            "0.000000 0.000000 0.000000 1.000000 \n\
             1.000000 2.000000 3.000000 1.000000 \n\
             Poly 2 < 0 1 \n\
             beginExtra\nendExtra\n",
            2,
            1,
            0,
            0,
        );
        let geo = parse(&text).unwrap();
        assert_eq!(geo.points().len(), 2);
        assert_eq!(geo.points()[1].z, 3.0);
        assert_eq!(geo.prims().len(), 1);
        assert!(geo.prims()[0].closed);
    }

    #[test]
    fn test_schema_falls_through_to_data() {
        let text = geo_text(
            "PointAttrib\n\
             mass 2 float 0.0 0.0\n\
             id 1 int 0\n\
             0.000000 0.000000 0.000000 1.000000 (1.5 2.5\t7) \n",
            1,
            0,
            2,
            0,
        );
        let geo = parse(&text).unwrap();
        assert_eq!(
            geo.get_point_attr("mass", 0).unwrap(),
            AttribValue::FloatList(vec![1.5, 2.5])
        );
        assert_eq!(geo.get_point_attr("id", 0).unwrap(), AttribValue::Int(7));
    }

    #[test]
    fn test_token_count_mismatch_is_fatal() {
        let text = geo_text(
            "PointAttrib\n\
             mass 2 float 0.0 0.0\n\
             0.000000 0.000000 0.000000 1.000000 (1.5) \n",
            1,
            0,
            1,
            0,
        );
        assert!(matches!(
            parse(&text).unwrap_err(),
            ParseError::TokenCountMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_string_index_out_of_bounds() {
        let text = geo_text(
            "PrimitiveAttrib\n\
             label 1 index 1 \"border\" \n\
             Poly 1 : 0 (3) \n",
            0,
            1,
            0,
            1,
        );
        assert!(matches!(
            parse(&text).unwrap_err(),
            ParseError::StringIndexOutOfBounds {
                index: 3,
                size: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_run_marker_skipped() {
        let text = geo_text(
            "PrimitiveAttrib\n\
             Run 4 Poly\n\
             label 1 index 1 \"x\" \n\
             Poly 1 < 0 (0) \n",
            0,
            1,
            0,
            1,
        );
        let geo = parse(&text).unwrap();
        assert_eq!(geo.get_prim_attr("label", 0).unwrap().as_str(), Some("x"));
    }

    #[test]
    fn test_detail_attrib_stops_parsing() {
        let text = geo_text(
            "0.000000 0.000000 0.000000 1.000000 \n\
             DetailAttrib\n\
             varmap 1 index 1 \"a -> a\"\n\
             this line would be malformed anywhere\n",
            1,
            0,
            0,
            0,
        );
        let geo = parse(&text).unwrap();
        assert_eq!(geo.points().len(), 1);
    }

    #[test]
    fn test_prim_tokens_kept_verbatim() {
        let text = geo_text("Poly 3 : DE FR 12 \n", 0, 1, 0, 0);
        let geo = parse(&text).unwrap();
        let refs = &geo.prims()[0].points;
        assert_eq!(refs[0], PointRef::Raw("DE".to_string()));
        assert_eq!(refs[1].as_index(), None);
        assert_eq!(refs[2].as_index(), Some(12));
    }

    #[test]
    fn test_prim_without_poly_keyword() {
        let text = geo_text("2 < 0 1 \n", 0, 1, 0, 0);
        let geo = parse(&text).unwrap();
        assert_eq!(geo.prims()[0].points.len(), 2);
        assert!(geo.prims()[0].closed);
    }

    #[test]
    fn test_bracketed_prim_indices() {
        let text = geo_text("Poly 3 < [0 1 2]\n", 0, 1, 0, 0);
        let geo = parse(&text).unwrap();
        assert_eq!(geo.prims()[0].points.len(), 3);
    }

    #[test]
    fn test_malformed_point_line() {
        let text = geo_text("0.0 nope 0.0 1.0\n", 1, 0, 0, 0);
        assert!(matches!(
            parse(&text).unwrap_err(),
            ParseError::MalformedLine {
                context: "point",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_def_values_are_fatal() {
        let text = geo_text("PointAttrib\nmass 2 float 0.0 oops\n", 0, 0, 1, 0);
        assert!(matches!(
            parse(&text).unwrap_err(),
            ParseError::MalformedLine {
                context: "attribute definition",
                ..
            }
        ));
    }

    #[test]
    fn test_index_def_requires_arity_one() {
        let text = geo_text("PointAttrib\ntag 2 index 1 \"a\" \n", 0, 0, 1, 0);
        assert!(parse(&text).is_err());
    }

    #[test]
    fn test_strings_with_spaces_in_table() {
        let text = geo_text(
            "PrimitiveAttrib\n\
             label 1 index 2 \"north border\" \"south border\" \n\
             Poly 1 : 0 (1) \n",
            0,
            1,
            0,
            1,
        );
        let geo = parse(&text).unwrap();
        assert_eq!(
            geo.get_prim_attr("label", 0).unwrap().as_str(),
            Some("south border")
        );
    }
}
