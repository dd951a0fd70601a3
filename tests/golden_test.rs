use bestmatch::io::to_bytes;
use bestmatch::{
    best_match_brute_force, best_match_mass, load_query, BestMatchEngine, BinarySource,
    ExhaustiveEngine, QueryOrder, SearchConfig,
};
use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct GoldenCase {
    ts: Vec<f64>,
    query: Vec<f64>,
    m: usize,
    /// 1-based location from an offline two-pass brute force.
    location: usize,
    distance: f64,
}

const EPSILON: f64 = 1e-6;

fn load_golden(name: &str) -> GoldenCase {
    let path = format!("tests/golden_data/{name}.json");
    let data = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Golden data file not found: {path}"));
    serde_json::from_str(&data).unwrap()
}

fn assert_matches_golden(name: &str, location: usize, distance: f64, golden: &GoldenCase) {
    assert_eq!(
        location, golden.location,
        "{name}: location mismatch (rust={location}, ref={})",
        golden.location
    );
    let diff = (distance - golden.distance).abs();
    assert!(
        diff < EPSILON,
        "{name}: distance diff = {diff:.2e} (rust={distance}, ref={}), epsilon={EPSILON:.0e}",
        golden.distance
    );
    eprintln!("  {name}: distance diff = {diff:.2e} (epsilon = {EPSILON:.0e})");
}

#[test]
fn test_random_walk_stream_vs_reference() {
    let golden = load_golden("random_walk_best_match");
    assert_eq!(golden.query.len(), golden.m);
    // n is not a multiple of m, so the last chunk is short
    assert_ne!(golden.ts.len() % golden.m, 0);

    let result = BestMatchEngine::new(SearchConfig::new())
        .search(&golden.query, &golden.ts)
        .unwrap();
    assert_matches_golden("stream", result.location, result.distance, &golden);
    assert_eq!(result.counters.windows, golden.ts.len() - golden.m + 1);
}

#[test]
fn test_random_walk_all_variants_agree() {
    let golden = load_golden("random_walk_best_match");

    let natural = BestMatchEngine::new(SearchConfig::new().with_order(QueryOrder::Natural))
        .search(&golden.query, &golden.ts)
        .unwrap();
    assert_matches_golden("natural_order", natural.location, natural.distance, &golden);

    let exhaustive = ExhaustiveEngine::new(SearchConfig::new())
        .search(&golden.query, &golden.ts)
        .unwrap();
    assert_matches_golden("exhaustive", exhaustive.location, exhaustive.distance, &golden);

    let brute = best_match_brute_force(&golden.query, &golden.ts).unwrap();
    assert_matches_golden(
        "brute_force",
        brute.location().unwrap(),
        brute.distance(),
        &golden,
    );

    let mass = best_match_mass(&golden.query, &golden.ts).unwrap();
    assert_matches_golden("mass", mass.location().unwrap(), mass.distance(), &golden);
}

#[test]
fn test_injected_query_found() {
    let golden = load_golden("injected_best_match");

    let result = BestMatchEngine::new(SearchConfig::new())
        .search(&golden.query, &golden.ts)
        .unwrap();
    assert_matches_golden("injected", result.location, result.distance, &golden);
    assert!(
        result.counters.abandoned > result.counters.windows / 2,
        "expected most windows to be pruned, got {} of {}",
        result.counters.abandoned,
        result.counters.windows
    );
}

#[test]
fn test_injected_query_sharded() {
    let golden = load_golden("injected_best_match");
    let result = BestMatchEngine::new(SearchConfig::new().with_shards(4))
        .search(&golden.query, &golden.ts)
        .unwrap();
    assert_matches_golden("sharded", result.location, result.distance, &golden);
}

#[test]
fn test_binary_files_end_to_end() {
    let golden = load_golden("random_walk_best_match");
    let dir = std::env::temp_dir().join(format!("bestmatch-golden-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let data_path = dir.join("data.bin");
    let query_path = dir.join("query.bin");
    fs::write(&data_path, to_bytes(&golden.ts)).unwrap();

    // Query file carries extra trailing values; only the first m are used
    let mut padded_query = golden.query.clone();
    padded_query.extend([1e6, -1e6, 42.0]);
    fs::write(&query_path, to_bytes(&padded_query)).unwrap();

    let query = bestmatch::io::read_series(BinarySource::open(&query_path).unwrap(), Some(golden.m))
        .unwrap();
    let result = BestMatchEngine::new(SearchConfig::new())
        .search_source(&query, BinarySource::open(&data_path).unwrap())
        .unwrap();
    assert_matches_golden("binary_files", result.location, result.distance, &golden);
    assert_eq!(result.counters.points_scanned, golden.ts.len());

    // The command-line path: load and prepare the query in one step, then stream
    let engine = BestMatchEngine::new(SearchConfig::new());
    let prepared = load_query(
        BinarySource::open(&query_path).unwrap(),
        Some(golden.m),
        QueryOrder::Magnitude,
    )
    .unwrap();
    let streamed = engine
        .stream(&prepared, BinarySource::open(&data_path).unwrap())
        .unwrap()
        .run()
        .unwrap();
    assert_matches_golden("binary_stream", streamed.location, streamed.distance, &golden);

    let data = bestmatch::io::read_series(BinarySource::open(&data_path).unwrap(), None).unwrap();
    let sharded = BestMatchEngine::new(SearchConfig::new().with_shards(2))
        .search_prepared(&prepared, &data)
        .unwrap();
    assert_matches_golden("binary_sharded", sharded.location, sharded.distance, &golden);

    fs::remove_dir_all(&dir).unwrap();
}
