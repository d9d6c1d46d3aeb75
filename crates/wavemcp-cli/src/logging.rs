//! Diagnostic logging to stderr

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info,wavemcp_client=debug,wavemcp_websocket=debug",
        _ => "trace",
    }
}

/// Install a stderr fmt subscriber. `RUST_LOG` overrides the `-v` count.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // A subscriber may already be set when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .try_init();
}
