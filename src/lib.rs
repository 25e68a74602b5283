pub mod api;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod session;
pub mod storage;
pub mod stream;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
