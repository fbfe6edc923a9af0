//! Print every top-level JSON value arriving on stdin, one per line.
//!
//! ```text
//! curl -sN https://example.org/stream | cargo run --example stdin_values
//! RUST_LOG=jsonsp_core=trace cargo run --example stdin_values -- --single < doc.json
//! ```

use std::io::{Read, Write};

use jsonsp_core::{Parser, ParserOptions};
use tracing_subscriber::EnvFilter;

const CHUNK_SIZE: usize = 4096;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let single = std::env::args().skip(1).any(|arg| arg == "--single");
    let options = ParserOptions::default().allow_multiple_values(!single);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut write_failed = None;

    let mut parser = Parser::with_listener(options, |value| {
        if write_failed.is_none() {
            if let Err(err) = writeln!(out, "{}", value) {
                write_failed = Some(err);
            }
        }
    });
    parser.on_error(|err| tracing::warn!(offset = ?err.offset(), "{}", err));

    let mut stdin = std::io::stdin().lock();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = stdin.read(&mut buf)?;
        if n == 0 {
            break;
        }
        parser.feed(&buf[..n]);
    }
    parser.finish();

    let count = parser.values_emitted();
    drop(parser);
    tracing::info!(values = count, "end of input");

    match write_failed {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
