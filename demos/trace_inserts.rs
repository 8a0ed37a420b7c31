//! Walks thirteen string keys into a default table, printing every
//! insertion's index arithmetic and the full bucket layout after each step.
//! The thirteenth key crosses the threshold and shows the resize.
//!
//! Usage: `cargo run --example trace_inserts [config.toml]`
//! Set `RUST_LOG=traced_hashmap=trace` to see resize internals as well.

use log::LevelFilter;
use std::io::{self, Stdout};
use std::path::Path;
use traced_hashmap::{Event, HashTable, LogSink, Sink, SinkError, TableConfig, WriterSink};

/// Prints to stdout and mirrors resize notices to the log.
struct Tee {
    out: WriterSink<Stdout>,
    log: LogSink,
}

impl Sink<String, usize> for Tee {
    fn record(&mut self, event: &Event<'_, String, usize>) -> Result<(), SinkError> {
        if let Event::ThresholdChanged { .. } = event {
            self.log.record(event)?;
        }
        self.out.record(event)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => TableConfig::load(Path::new(&path))?,
        None => TableConfig::default(),
    };
    let sink = Tee {
        out: WriterSink::new(io::stdout()),
        log: LogSink::new(),
    };
    let mut table = HashTable::with_sink(config, sink)?;

    for i in 0..13usize {
        table.put(i.to_string(), i)?;
        table.log_buckets();
        println!();
    }

    log::info!(
        "{} entries in {} buckets, threshold {}",
        table.len(),
        table.capacity(),
        table.threshold()
    );
    Ok(())
}
