//! Simple decoder to inspect extra field value snapshots.

use std::fs;

use extra_values::{decode_snapshot, ExtraFieldValue, FloatArrayValue};

fn format_value(v: &ExtraFieldValue) -> String {
    match v {
        ExtraFieldValue::Bytes(b) => {
            let bytes = b.to_vec();
            let preview: Vec<String> = bytes.iter().take(16).map(|x| format!("{:02x}", x)).collect();
            if bytes.len() > 16 {
                format!("BYTES[{}] {}...", bytes.len(), preview.join(""))
            } else {
                format!("BYTES[{}] {}", bytes.len(), preview.join(""))
            }
        }
        ExtraFieldValue::FloatArray(fav) => {
            let kind = match fav {
                FloatArrayValue::Packed(_) => "packed",
                FloatArrayValue::Primitive(_) => "primitive",
            };
            let head: Vec<String> = fav
                .as_float_sequence()
                .iter()
                .take(4)
                .map(|f| format!("{:.4}", f))
                .collect();
            let more = if fav.dimension() > 4 { ", ..." } else { "" };
            format!("FLOAT_ARRAY({}, dim={}) [{}{}]", kind, fav.dimension(), head.join(", "), more)
        }
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "values.efvs".to_string());

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());
    if data.starts_with(b"EFVSZ") {
        println!("Envelope: compressed");
    } else {
        println!("Envelope: uncompressed");
    }

    let bag = decode_snapshot(&data).expect("Failed to decode");

    println!("\n=== Entries ({}) ===", bag.len());
    let mut bytes_count = 0;
    let mut float_array_count = 0;
    for (path, value) in bag.sorted_entries() {
        match value {
            ExtraFieldValue::Bytes(_) => bytes_count += 1,
            ExtraFieldValue::FloatArray(_) => float_array_count += 1,
        }
        println!("  {} = {}", path, format_value(value));
    }

    println!("\n=== Types ===");
    println!("  BYTES: {}", bytes_count);
    println!("  FLOAT_ARRAY: {}", float_array_count);
}
