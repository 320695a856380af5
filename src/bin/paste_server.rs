use std::io;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout carries protocol responses; all logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    eprintln!("[Paste Server] Reading JSON-RPC requests from stdin...");
    let stdin = io::stdin();
    let stdout = io::stdout();
    geopaste::rpc::serve(stdin.lock(), stdout.lock())
}
