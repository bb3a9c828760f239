//! Terminal dashboard for an independent musician: lyric drafts ("verses"), a
//! small storefront, and sales analytics, all backed by the ONIMIX REST API.
//!
//! Each section is a reducer (`update(msg) -> Outcome`) whose requests run on
//! a background [`worker::Worker`]; the `ui` module only turns keys into
//! messages and draws state.
pub mod analytics;
pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod state;
pub mod store;
pub mod ui;
pub mod verses;
pub mod worker;

/// Backend seam and the HTTP implementation used by the binary.
pub use api::{ApiError, Backend, HttpBackend};

/// Configuration resolved from flags, environment, and the config file.
pub use config::{Cli, Config};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
