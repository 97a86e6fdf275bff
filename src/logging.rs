//! Log initialisation for the `mdp-solve` binary.
//!
//! Logs go to stderr; stdout is reserved for the JSON solution. `RUST_LOG`
//! overrides the level chosen from the `-v` count.
use tracing_subscriber::EnvFilter;

pub fn level_for(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u64) {
    let level = level_for(verbosity);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("markov_dp={0},mdp_solve={0}", level)));
    // a subscriber may already be installed when called from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
