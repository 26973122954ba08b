//! Simple decoder to inspect stored entity documents.
//!
//! Reads a `CDOC`/`CDOCZ` file, prints its envelope and fields, and decodes
//! it as a structure or computation when the fields match. Without a path
//! it inspects a freshly encoded sample structure.

use std::fs;

use computation::codec::{decode_document, encode_document_compressed, is_compressed, registry};
use computation::model::{leaf, node, GraphBuilder};
use computation::{Bson, Definition, Document, Element, Structure, StructureId};

fn format_value(value: &Bson) -> String {
    match value {
        Bson::Null => "null".to_string(),
        Bson::Bool(b) => format!("{}", b),
        Bson::Int32(v) => format!("{}", v),
        Bson::Int64(v) => format!("{}i64", v),
        Bson::String(s) => {
            let preview: String = s.chars().take(60).collect();
            if s.chars().count() > 60 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Bson::Array(items) => format!("[{} items]", items.len()),
        Bson::Document(doc) => format!("{{{} fields}}", doc.len()),
    }
}

fn sample_bytes() -> Vec<u8> {
    let root = Element::new(
        "plant",
        [Definition::new("capacity", "12.5".parse().expect("valid decimal"))],
    );
    let elements = GraphBuilder::new()
        .tree(node(root, [leaf(Element::named("line-1")), leaf(Element::named("line-2"))]))
        .build();
    let structure = Structure::new(StructureId::new(), elements);
    let document = registry()
        .structure
        .encode_document(&structure, registry())
        .expect("Failed to encode");
    encode_document_compressed(&document, 3).expect("Failed to compress")
}

fn describe(document: &Document) {
    let registry = registry();
    if document.contains_key("elements") {
        match registry.structure.decode_document(document, registry) {
            Ok(structure) => {
                println!("\n=== Structure {} ===", structure.id);
                println!("Elements: {}", structure.elements.node_count());
                println!("Edges: {}", structure.elements.edge_count());
                for (source, target) in structure.elements.edges().into_iter().take(20) {
                    println!("  {} -> {}", source.name, target.name);
                }
            }
            Err(e) => println!("\nNot a readable structure: {}", e),
        }
    } else if document.contains_key("expression") {
        match registry.computation.decode_document(document, registry) {
            Ok(computation) => {
                println!("\n=== Computation {} ===", computation.id);
                println!("Structure: {}", computation.structure_id);
                println!("Element: {}", computation.element_name);
                println!("Expression: {}", computation.expression);
                println!("Variables: {:?}", computation.expression.variables());
                println!("Status: {}", computation.status);
                if let Some(result) = computation.result {
                    println!("Result: {}", result);
                }
            }
            Err(e) => println!("\nNot a readable computation: {}", e),
        }
    }
}

fn main() {
    let data = match std::env::args().nth(1) {
        Some(path) => {
            println!("Reading: {}", path);
            fs::read(&path).expect("Failed to read file")
        }
        None => {
            println!("Reading: generated sample");
            sample_bytes()
        }
    };
    println!("Size: {} bytes (compressed: {})", data.len(), is_compressed(&data));

    let document = decode_document(&data).expect("Failed to decode");

    println!("\n=== Fields ({}) ===", document.len());
    for (name, value) in document.iter() {
        println!("  {} = {}", name, format_value(value));
    }

    describe(&document);
}
