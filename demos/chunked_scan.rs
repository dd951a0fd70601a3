//! Chunk-by-chunk scanning with an early stop.
//!
//! The scan reads the series in chunks of m values through a `2m` buffer, so
//! a caller can inspect the best-so-far between chunks and stop early, e.g.
//! once a match is good enough or a time budget runs out.
//!
//! Run with: cargo run --release --example chunked_scan

use bestmatch::io::to_bytes;
use bestmatch::{BestMatchEngine, BinarySource, SearchConfig};

fn main() {
    let n = 50_000;
    let m = 64;

    let ts: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            (t * 0.021).sin() + 0.5 * (t * 0.33).cos() + 0.3 * ((t * 78.233).sin() * 9631.7).fract()
        })
        .collect();
    let raw_query = ts[31_000..31_000 + m].to_vec();

    // Round-trip through the raw binary format the CLI reads
    let bytes = to_bytes(&ts);
    let source = BinarySource::with_len(bytes.as_slice(), ts.len());

    let engine = BestMatchEngine::new(SearchConfig::new());
    let query = engine.prepare(&raw_query).expect("query is not searchable");
    let mut scan = engine.stream(&query, source).expect("series too short");

    println!("Chunked Scan");
    println!("============");
    println!("Series length: {n}, query length: {m}");
    println!();

    let threshold = 1e-6;
    let mut chunks = 0;
    while scan.next_chunk().expect("read failed") {
        chunks += 1;
        if chunks % 100 == 0 {
            let counters = scan.counters();
            println!(
                "  after {:>5} points: best {:.6} at location {:?}",
                counters.points_scanned,
                scan.best().distance(),
                scan.best().location()
            );
        }
        if scan.best().distance() < threshold {
            println!("\nGood-enough match found, stopping after {chunks} chunks");
            break;
        }
    }

    let finished = scan.is_finished();
    let (best, counters) = scan.into_parts();
    println!("Location (1-based): {:?}", best.location());
    println!("Distance: {:.6}", best.distance());
    println!(
        "Points read: {} of {n} (scan finished: {finished})",
        counters.points_scanned
    );
    println!(
        "Pruned by early abandoning: {:.2}%",
        counters.abandon_rate() * 100.0
    );
}
