//! Log output for native builds.

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER: &str = "chatapp=info,warn";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`. A second call is a no-op.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// The web renderer owns the browser console.
#[cfg(target_arch = "wasm32")]
pub fn init() {}
