//! # parley-client
//!
//! The use-case layer a front-end drives. [`Client`] wires the session, the
//! local database, the repositories and the chat synchroniser together;
//! every operation validates its input eagerly, talks to the server through
//! the repository traits and keeps the local session state current.

pub mod client;
pub mod config;
pub mod error;
pub mod usecases;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use client::Client;
pub use config::ClientConfig;
pub use error::ClientError;
pub use usecases::profile::ProfileForm;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the
/// built-in filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("parley_client=debug,parley_sync=debug,parley_net=info,parley_store=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
