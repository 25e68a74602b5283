use chatapp::config::{install_bundled_defaults, parse_env_file};

/// Bundled config for builds without a `.env` file (web, mobile).
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

#[cfg(not(target_arch = "wasm32"))]
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    load_bundled_config();
}

/// The browser has no process environment; settings come from the bundle.
#[cfg(target_arch = "wasm32")]
fn load_dotenv() {
    install_bundled_defaults(BUNDLED_CONFIG);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_bundled_config() {
    for (key, value) in parse_env_file(BUNDLED_CONFIG) {
        if std::env::var(&key).is_err() {
            // SAFETY: runs at startup, before any other thread exists.
            unsafe {
                std::env::set_var(&key, &value);
            }
        }
    }
    install_bundled_defaults(BUNDLED_CONFIG);
}

fn main() {
    load_dotenv();
    chatapp::telemetry::init();
    tracing::info!("starting chatapp");
    dioxus::launch(chatapp::ui::App);
}
