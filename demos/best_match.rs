//! Best-match search over an in-memory series.
//!
//! A scaled and shifted copy of a short pattern is planted in a noisy
//! signal. The streaming scan finds it regardless of amplitude and offset,
//! and the MASS and brute-force baselines agree with it.
//!
//! Run with: cargo run --release --example best_match

use bestmatch::{
    best_match_brute_force, best_match_mass, BestMatchEngine, ExhaustiveEngine, SearchConfig,
};

fn main() {
    let n = 20_000;
    let m = 100;

    // Base: quasi-periodic signal plus deterministic noise
    let mut ts: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            (t * 0.013).sin() + 0.4 * ((t * 7.1).sin() * (t * 11.3).cos())
        })
        .collect();

    // Pattern: a damped chirp
    let pattern: Vec<f64> = (0..m)
        .map(|j| {
            let t = j as f64 / m as f64;
            (-3.0 * t).exp() * (40.0 * t * t).sin()
        })
        .collect();

    // Plant it at a different amplitude and baseline
    let planted_at = 13_579;
    for (k, &p) in pattern.iter().enumerate() {
        ts[planted_at + k] = 25.0 * p - 7.0;
    }

    let engine = BestMatchEngine::new(SearchConfig::new());
    let result = engine.search(&pattern, &ts).expect("search failed");

    println!("Best-Match Search");
    println!("=================");
    println!("Series length: {n}");
    println!("Query length: {m}");
    println!("Planted at offset: {planted_at}");
    println!();
    println!("Location (1-based): {}", result.location);
    println!("Distance: {:.6}", result.distance);
    println!("Windows scanned: {}", result.counters.windows);
    println!(
        "Pruned by early abandoning: {:.2}%",
        result.counters.abandon_rate() * 100.0
    );
    println!(
        "Query values compared: {} of {}",
        result.counters.values_compared,
        result.counters.windows * m
    );

    let exhaustive = ExhaustiveEngine::new(SearchConfig::new())
        .search(&pattern, &ts)
        .expect("exhaustive search failed");
    let mass = best_match_mass(&pattern, &ts).expect("MASS failed");
    let brute = best_match_brute_force(&pattern, &ts).expect("brute force failed");

    println!("\nBaselines:");
    println!(
        "  exhaustive:  location {:>6}, distance {:.6}",
        exhaustive.location, exhaustive.distance
    );
    println!(
        "  mass:        location {:>6}, distance {:.6}",
        mass.location().unwrap_or(0),
        mass.distance()
    );
    println!(
        "  brute force: location {:>6}, distance {:.6}",
        brute.location().unwrap_or(0),
        brute.distance()
    );
}
