//! Simple reader to inspect PGEOMETRY files.

use std::fs;

use pgeo::{parse, AttribValue, Geometry};

fn format_value(v: &AttribValue) -> String {
    match v {
        AttribValue::Int(n) => format!("{n}"),
        AttribValue::Float(x) => format!("{x:.6}"),
        AttribValue::IntList(ns) => format!("{ns:?}"),
        AttribValue::FloatList(xs) => format!("{xs:?}"),
        AttribValue::Str(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.len() > 80 {
                format!("\"{preview}...\"")
            } else {
                format!("\"{preview}\"")
            }
        }
    }
}

fn print_schema(geo: &Geometry) {
    println!("\n=== Point Attributes ===");
    for attrib in geo.point_attribs().iter() {
        println!("  {} {}", attrib.name(), attrib.schema());
    }
    println!("\n=== Primitive Attributes ===");
    for attrib in geo.prim_attribs().iter() {
        println!("  {} {}", attrib.name(), attrib.schema());
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "geometry.geo".to_string());

    println!("Reading: {}", path);

    let text = fs::read_to_string(&path).expect("Failed to read file");
    println!("File size: {} bytes", text.len());

    let geo = parse(&text).expect("Failed to parse");

    println!("\n=== Geometry ===");
    println!("Points: {}", geo.points().len());
    println!("Prims:  {}", geo.prims().len());

    print_schema(&geo);

    println!("\n=== First points ===");
    for (i, point) in geo.points().iter().take(5).enumerate() {
        print!("  [{i}] {:.6} {:.6} {:.6}", point.x, point.y, point.z);
        for attrib in geo.point_attribs().iter() {
            let value = geo
                .get_point_attr(attrib.name(), i)
                .expect("schema names resolve");
            print!("  {}={}", attrib.name(), format_value(&value));
        }
        println!();
    }

    println!("\n=== First prims ===");
    for (i, prim) in geo.prims().iter().take(5).enumerate() {
        let refs: Vec<String> = prim.points.iter().map(ToString::to_string).collect();
        print!(
            "  [{i}] {} [{}]",
            if prim.closed { "closed" } else { "open" },
            refs.join(" ")
        );
        for attrib in geo.prim_attribs().iter() {
            let value = geo
                .get_prim_attr(attrib.name(), i)
                .expect("schema names resolve");
            print!("  {}={}", attrib.name(), format_value(&value));
        }
        println!();
    }
}
