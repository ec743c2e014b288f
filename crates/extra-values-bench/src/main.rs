//! Benchmark for extra field value encoding using embedding vectors.
//!
//! Compares packed and primitive float arrays for wire size, encode/decode
//! throughput and element access.
//!
//! Usage: `bench-vectors [--count N] [--dim D] [--input vectors.json]`

use std::fs;
use std::time::{Duration, Instant};

use extra_values::codec::{
    decode_extra_field_values, decode_snapshot, encode_extra_field_values,
    encode_extra_field_values_with_options, encode_snapshot, encode_snapshot_compressed,
};
use extra_values::{
    BytesValue, EncodeOptions, ExtraFieldValue, ExtraFieldValues, PackedFloatArray,
    PrimitiveFloatArray,
};
use clap::Parser;
use serde::Deserialize;

// =============================================================================
// INPUT
// =============================================================================

#[derive(Debug, Deserialize)]
struct Document {
    id: String,
    embedding: Vec<f32>,
    #[serde(default)]
    thumbnail: Option<String>,
}

/// Packed vs primitive float array benchmark.
#[derive(Parser)]
#[command(name = "bench-vectors")]
struct Args {
    /// Number of synthetic documents.
    #[arg(long, default_value_t = 10_000)]
    count: usize,
    /// Embedding dimension of synthetic documents.
    #[arg(long, default_value_t = 768)]
    dim: usize,
    /// JSON file of documents to use instead of synthetic ones.
    #[arg(long)]
    input: Option<String>,
}

/// Deterministic pseudo-random documents (LCG), so runs are comparable.
fn synthetic_documents(count: usize, dim: usize) -> Vec<Document> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
    };
    (0..count)
        .map(|i| Document {
            id: format!("doc-{}", i),
            embedding: (0..dim).map(|_| next()).collect(),
            thumbnail: (i % 4 == 0).then(|| format!("thumb-{:08}", i)),
        })
        .collect()
}

// =============================================================================
// CONVERSION
// =============================================================================

fn to_bag(doc: &Document, packed: bool) -> ExtraFieldValues {
    let embedding: ExtraFieldValue = if packed {
        PackedFloatArray::from_floats(&doc.embedding).into()
    } else {
        PrimitiveFloatArray::new(doc.embedding.clone()).into()
    };

    let mut entries: Vec<(String, ExtraFieldValue)> = vec![
        ("doc.id".to_string(), BytesValue::from(doc.id.as_bytes()).into()),
        ("doc.embedding".to_string(), embedding),
    ];
    if let Some(ref thumb) = doc.thumbnail {
        entries.push(("doc.thumbnail".to_string(), BytesValue::from(thumb.as_bytes()).into()));
    }
    entries.into_iter().collect()
}

fn mb_per_sec(bytes: usize, elapsed: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_representation(label: &str, bags: &[ExtraFieldValues]) -> usize {
    const DECODE_ITERS: u32 = 5;

    let encode_start = Instant::now();
    let encoded: Vec<Vec<u8>> = bags
        .iter()
        .map(|bag| encode_extra_field_values(bag).expect("Failed to encode"))
        .collect();
    let encode_time = encode_start.elapsed();
    let total: usize = encoded.iter().map(Vec::len).sum();

    println!("\n=== {} ===", label);
    println!("Encoded: {} bytes in {:?}", total, encode_time);
    println!("  Throughput: {:.2} MB/s", mb_per_sec(total, encode_time));

    // Warmup
    for bytes in encoded.iter().take(100) {
        let _ = decode_extra_field_values(bytes).expect("Failed to decode");
    }

    let decode_start = Instant::now();
    let mut decoded: Vec<ExtraFieldValues> = Vec::new();
    for _ in 0..DECODE_ITERS {
        decoded = encoded
            .iter()
            .map(|bytes| decode_extra_field_values(bytes).expect("Failed to decode"))
            .collect();
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;
    println!(
        "Decode: {:?} (avg of {} iterations)",
        decode_time, DECODE_ITERS
    );
    println!("  Throughput: {:.2} MB/s", mb_per_sec(total, decode_time));
    assert_eq!(decoded.len(), bags.len());

    // Single element access vs full materialization
    let get_start = Instant::now();
    let mut checksum = 0.0f64;
    for bag in &decoded {
        let fav = bag
            .get("doc.embedding")
            .and_then(ExtraFieldValue::as_float_array)
            .expect("embedding present");
        if fav.dimension() > 0 {
            checksum += fav.get(fav.dimension() / 2).expect("in range") as f64;
        }
    }
    let get_time = get_start.elapsed();

    let seq_start = Instant::now();
    for bag in &decoded {
        let fav = bag
            .get("doc.embedding")
            .and_then(ExtraFieldValue::as_float_array)
            .expect("embedding present");
        checksum += fav.as_float_sequence().iter().map(|&f| f as f64).sum::<f64>();
    }
    let seq_time = seq_start.elapsed();

    // Second pass hits the memoized sequence
    let seq2_start = Instant::now();
    for bag in &decoded {
        let fav = bag
            .get("doc.embedding")
            .and_then(ExtraFieldValue::as_float_array)
            .expect("embedding present");
        checksum += fav.as_float_sequence().len() as f64;
    }
    let seq2_time = seq2_start.elapsed();

    println!("Access:");
    println!("  get(mid):                {:?}", get_time);
    println!("  as_float_sequence():     {:?}", seq_time);
    println!("  as_float_sequence() x2:  {:?}", seq2_time);
    println!("  (checksum {:.3})", checksum);

    total
}

fn main() {
    let args = Args::parse();

    let load_start = Instant::now();
    let docs = match args.input {
        Some(ref path) => {
            println!("Loading documents from: {}", path);
            let json = fs::read_to_string(path).expect("Failed to read input");
            serde_json::from_str::<Vec<Document>>(&json).expect("Failed to parse JSON")
        }
        None => {
            println!(
                "Generating {} synthetic documents (dim={})",
                args.count, args.dim
            );
            synthetic_documents(args.count, args.dim)
        }
    };
    println!("Loaded {} documents in {:?}", docs.len(), load_start.elapsed());

    let packed_bags: Vec<ExtraFieldValues> = docs.iter().map(|d| to_bag(d, true)).collect();
    let primitive_bags: Vec<ExtraFieldValues> = docs.iter().map(|d| to_bag(d, false)).collect();

    let packed_size = bench_representation("Packed float arrays", &packed_bags);
    let primitive_size = bench_representation("Primitive float arrays", &primitive_bags);

    // Canonical encoding must be deterministic
    if let Some(bag) = packed_bags.first() {
        let a = encode_extra_field_values_with_options(bag, EncodeOptions::canonical())
            .expect("Failed to encode canonical");
        let b = encode_extra_field_values_with_options(bag, EncodeOptions::canonical())
            .expect("Failed to encode canonical");
        assert_eq!(a, b, "Canonical encoding should be deterministic");
    }

    // Snapshot of the whole corpus in one bag
    let corpus: ExtraFieldValues = docs
        .iter()
        .map(|d| {
            (
                format!("{}.embedding", d.id),
                ExtraFieldValue::from(PackedFloatArray::from_floats(&d.embedding)),
            )
        })
        .collect();

    let snap_start = Instant::now();
    let snapshot = encode_snapshot(&corpus, EncodeOptions::canonical()).expect("Failed to encode snapshot");
    let snap_time = snap_start.elapsed();

    let compress_start = Instant::now();
    let compressed = encode_snapshot_compressed(&corpus, 3, EncodeOptions::canonical())
        .expect("Failed to compress snapshot");
    let compress_time = compress_start.elapsed();

    let restored = decode_snapshot(&compressed).expect("Failed to decode snapshot");
    assert_eq!(restored.len(), corpus.len());

    println!("\n=== Snapshot ===");
    println!("Uncompressed: {} bytes in {:?}", snapshot.len(), snap_time);
    println!(
        "Compressed (level 3): {} bytes in {:?}",
        compressed.len(),
        compress_time
    );
    println!(
        "  Compression ratio: {:.2}x",
        snapshot.len() as f64 / compressed.len() as f64
    );

    println!("\n=== Summary ===");
    println!("Documents: {}", docs.len());
    println!("Packed wire size:    {} bytes", packed_size);
    println!("Primitive wire size: {} bytes", primitive_size);
    println!(
        "Packed vs primitive: {:.1}%",
        100.0 * packed_size as f64 / primitive_size as f64
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["bench-vectors"]).unwrap();
        assert_eq!(args.count, 10_000);
        assert_eq!(args.dim, 768);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from([
            "bench-vectors",
            "--count",
            "5",
            "--dim",
            "3",
            "--input",
            "docs.json",
        ])
        .unwrap();
        assert_eq!(args.count, 5);
        assert_eq!(args.dim, 3);
        assert_eq!(args.input.as_deref(), Some("docs.json"));
    }

    #[test]
    fn test_args_reject_unknown_flag() {
        assert!(Args::try_parse_from(["bench-vectors", "--dims", "3"]).is_err());
    }

    #[test]
    fn test_synthetic_bag_roundtrip() {
        let docs = synthetic_documents(4, 8);
        for doc in &docs {
            for packed in [true, false] {
                let bag = to_bag(doc, packed);
                let bytes = encode_extra_field_values(&bag).unwrap();
                assert_eq!(decode_extra_field_values(&bytes).unwrap(), bag);
            }
        }
    }
}
