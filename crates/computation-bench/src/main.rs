//! Benchmark for structure persistence and expression evaluation.
//!
//! Builds a hierarchy (from a JSON file, or a synthetic tree when no path is
//! given), then times envelope encoding, the binary document format with
//! and without compression, catalog round trips and expression evaluation.
//!
//! Set `RUST_LOG=computation=debug` to see per-request catalog logging.

use std::collections::BTreeMap;
use std::fs;
use std::time::{Duration, Instant};

use computation::codec::{decode_document, encode_document, encode_document_compressed, registry};
use computation::model::{node, GraphBuilder, TreeNode};
use computation::{
    Catalog, Computation, ComputationId, Database, Decimal, Definition, Element, Expression,
    ListQuery, StoreConfig, Structure, StructureId,
};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

// =============================================================================
// JSON DATA STRUCTURES
// =============================================================================

/// One element of the input hierarchy.
#[derive(Debug, Deserialize)]
struct HierarchyNode {
    name: String,
    /// Definition name to decimal literal.
    #[serde(default)]
    definitions: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<HierarchyNode>,
}

fn to_tree(input: &HierarchyNode) -> TreeNode<Element> {
    let definitions = input.definitions.iter().map(|(name, value)| {
        let value: Decimal = value.parse().expect("Failed to parse definition value");
        Definition::new(name.as_str(), value)
    });
    let element = Element::new(input.name.as_str(), definitions);
    node(element, input.children.iter().map(to_tree))
}

// =============================================================================
// SYNTHETIC DATA
// =============================================================================

const FANOUT: usize = 6;
const DEPTH: usize = 5;

fn synthetic(path: &str, depth: usize) -> HierarchyNode {
    let mut definitions = BTreeMap::new();
    definitions.insert("capacity".to_string(), format!("{}.5", path.len() * 10));
    definitions.insert("load".to_string(), format!("{}", depth * 3));
    let children = if depth == 0 {
        Vec::new()
    } else {
        (0..FANOUT)
            .map(|i| synthetic(&format!("{}.{}", path, i), depth - 1))
            .collect()
    };
    HierarchyNode {
        name: path.to_string(),
        definitions,
        children,
    }
}

// =============================================================================
// REPORTING
// =============================================================================

fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let hierarchy = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading hierarchy from: {}", path);
            let json = fs::read_to_string(&path).expect("Failed to read hierarchy file");
            serde_json::from_str(&json).expect("Failed to parse JSON")
        }
        None => {
            println!("Generating synthetic hierarchy (fanout {}, depth {})", FANOUT, DEPTH);
            synthetic("root", DEPTH)
        }
    };

    let convert_start = Instant::now();
    let elements = GraphBuilder::new().tree(to_tree(&hierarchy)).build();
    let structure = Structure::new(StructureId::new(), elements);
    let convert_time = convert_start.elapsed();
    println!(
        "Built structure with {} elements and {} edges in {:?}",
        structure.elements.node_count(),
        structure.elements.edge_count(),
        convert_time
    );

    let registry = registry();

    // Envelope encoding
    let envelope_start = Instant::now();
    let document = registry
        .structure
        .encode_document(&structure, registry)
        .expect("Failed to encode structure");
    let envelope_time = envelope_start.elapsed();
    println!("\nEnvelope encode: {:?}", envelope_time);

    // Binary format, uncompressed
    let encode_start = Instant::now();
    let encoded = encode_document(&document).expect("Failed to encode document");
    let encode_time = encode_start.elapsed();
    println!("\nUncompressed: {} bytes in {:?}", encoded.len(), encode_time);
    println!("  Throughput: {:.2} MB/s", throughput(encoded.len(), encode_time));

    // Binary format, compressed
    let compress_start = Instant::now();
    let compressed = encode_document_compressed(&document, 3).expect("Failed to compress");
    let compress_time = compress_start.elapsed();
    println!("\nCompressed (level 3): {} bytes in {:?}", compressed.len(), compress_time);
    println!(
        "  Compression ratio: {:.1}x",
        encoded.len() as f64 / compressed.len() as f64
    );

    // Decoding
    let decode_start = Instant::now();
    let decoded_document = decode_document(&compressed).expect("Failed to decode document");
    let decoded = registry
        .structure
        .decode_document(&decoded_document, registry)
        .expect("Failed to decode structure");
    let decode_time = decode_start.elapsed();
    assert_eq!(decoded, structure, "Round trip should preserve the structure");
    println!("\nDecode (compressed + envelope): {:?}", decode_time);
    println!("  Throughput: {:.2} MB/s", throughput(encoded.len(), decode_time));

    // Catalog round trip
    let db = Database::in_memory(StoreConfig::from_env());
    let catalog = Catalog::new(&db);
    let catalog_start = Instant::now();
    let stored = catalog.create_structure(&structure).expect("Failed to store structure");
    let computations: Vec<Computation> = structure
        .elements
        .nodes()
        .map(|element| {
            let request = Computation::new(
                ComputationId::new(),
                stored.id.clone(),
                element.name.clone(),
                "capacity - load + 1",
            );
            catalog.create_computation(&request).expect("Failed to store computation")
        })
        .collect();
    let rows = catalog
        .list_computations(&ListQuery::parse(None, Some("status")))
        .expect("Failed to list computations");
    let catalog_time = catalog_start.elapsed();
    println!(
        "\nCatalog: stored {} computations, listed {} rows in {:?}",
        computations.len(),
        rows.len(),
        catalog_time
    );

    // Expression evaluation against each element's own definitions
    let expression = Expression::from("capacity - load + 1");
    let eval_start = Instant::now();
    let mut computed = 0usize;
    let mut total = Decimal::ZERO;
    for element in structure.elements.nodes() {
        let resolver = |name: &str| element.values_of(name).next();
        if let Some(value) = expression.evaluate(resolver) {
            computed += 1;
            total = total.checked_add(value).unwrap_or(total);
        }
    }
    let eval_time = eval_start.elapsed();
    println!(
        "\nEvaluated {} of {} expressions in {:?} (sum {})",
        computed,
        structure.elements.node_count(),
        eval_time,
        total
    );

    info!(elements = structure.elements.node_count(), bytes = encoded.len(), "benchmark finished");
}
