//! bestmatch command-line interface
//!
//! Finds the subsequence of a data file that best matches a query file under
//! z-normalized Euclidean distance. Both files hold raw native-endian `f64`
//! values with no header.
//!
//! ```bash
//! # Use the whole query file
//! bestmatch data.bin query.bin
//!
//! # Use only the first 128 query values, emit JSON
//! bestmatch data.bin query.bin 128 --json
//!
//! # Load the data into memory and scan 8 shards
//! bestmatch data.bin query.bin --shards 8
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use bestmatch::io::read_series;
use bestmatch::{
    load_query, BestMatchEngine, BinarySource, ExhaustiveEngine, PreparedQuery, QueryOrder,
    SearchConfig, SearchResult,
};

/// Streaming z-normalized Euclidean best-match search
#[derive(Parser, Debug)]
#[command(name = "bestmatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reference series file (raw f64 values)
    data: PathBuf,

    /// Query file (raw f64 values)
    query: PathBuf,

    /// Use only the first QUERY_LEN values of the query file
    query_len: Option<usize>,

    /// Scan the data in memory with this many shards (1 streams from disk)
    #[arg(short, long, default_value = "1")]
    shards: usize,

    /// Query evaluation order
    #[arg(long, value_enum, default_value = "magnitude")]
    order: OrderArg,

    /// Score every window in full instead of abandoning early
    #[arg(long)]
    exhaustive: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OrderArg {
    Magnitude,
    Natural,
}

impl From<OrderArg> for QueryOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Magnitude => QueryOrder::Magnitude,
            OrderArg::Natural => QueryOrder::Natural,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SearchConfig::new()
        .with_order(args.order.into())
        .with_shards(args.shards);

    // QUERY_LEN is applied while reading, not through SearchConfig
    let query_source = BinarySource::open(&args.query)
        .with_context(|| format!("opening query file {}", args.query.display()))?;
    let query = load_query(query_source, args.query_len, config.order)
        .with_context(|| format!("loading query file {}", args.query.display()))?;
    info!(
        "loaded query of {} values (mean {:.6}, std {:.6})",
        query.len(),
        query.mean(),
        query.std()
    );

    let result = if args.exhaustive {
        run(&ExhaustiveEngine::new(config), &query, &args)?
    } else {
        run(&BestMatchEngine::new(config), &query, &args)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }
    Ok(())
}

fn run<D: bestmatch::WindowDistance>(
    engine: &bestmatch::Engine<D>,
    query: &PreparedQuery,
    args: &Args,
) -> Result<SearchResult> {
    let data_source = BinarySource::open(&args.data)
        .with_context(|| format!("opening data file {}", args.data.display()))?;

    let result = if engine.config().shards > 1 {
        let data = read_series(data_source, None)
            .with_context(|| format!("reading data file {}", args.data.display()))?;
        info!("loaded {} data values into memory", data.len());
        engine.search_prepared(query, &data)?
    } else {
        engine.stream(query, data_source)?.run()?
    };
    Ok(result)
}

fn print_report(result: &SearchResult) {
    println!("Location : {}", result.location);
    println!("Distance : {:.6}", result.distance);
    println!("Data Scanned : {}", result.counters.points_scanned);
    println!(
        "Total Execution Time : {:.4} sec",
        result.elapsed.as_secs_f64()
    );
    println!(
        "Pruned by Early Abandoning : {:.2}%",
        result.counters.abandon_rate() * 100.0
    );
}
