//! File and stdout example
//!
//! Logs one tagged, timestamped message to standard output and a file at the
//! same time, then closes both writers.
//!
//! Run with: cargo run --example file_and_stdout

use rust_structured_logger::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    let file = FileWriter::new("test.log")?;

    let logger = Logger::builder()
        .min_level(LogLevel::Info)
        .writer(StdOutWriter::with_colors(true))
        .writer(file)
        .prefix(with_log_level(LogLevel::Debug))
        .prefix(with_timestamp())
        .concurrency(true)
        .error_handler(Arc::new(StderrErrorHandler))
        .build();

    logger
        .with_temporary_prefix(vec![with_tag("TAG")])
        .info_fmt(format_args!("Debug message: {}", "test format"));

    logger.close()?;
    println!("Check 'test.log' for the file output");

    Ok(())
}
