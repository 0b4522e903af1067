pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod identity;
pub mod logutil;
pub mod models;
pub mod presenter;
pub mod transport;

use anyhow::{Context, Result};

pub use api::BoardClient;
pub use app::{BoardApp, BoardView, SyncState, ViewId};
pub use config::FrontendConfig;
pub use error::{BoardError, ErrorKind};
pub use identity::{Identity, IdentityStore};
pub use models::{Post, TOP_LEVEL};
pub use presenter::{ListChange, PostList};

/// Loads (or creates) the installation's tripcode and wires an app against the configured host.
pub fn bootstrap(config: &FrontendConfig) -> Result<BoardApp> {
    let store = IdentityStore::new(config.identity_path());
    let identity = store
        .load_or_create()
        .with_context(|| format!("failed to load tripcode from {}", store.path().display()))?;
    let client = BoardClient::connect(config, identity)?;
    log::info!("using board at {}", client.base_url());
    Ok(BoardApp::new(client))
}
