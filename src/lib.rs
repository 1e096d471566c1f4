#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::sync::Arc;

pub use config::Config;

use error::Result;
use model::{election::WindowManager, sqlite::ensure_schema_exists, sqlite::Store, user::User};
use server::Server;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod scheduled_task;
pub mod server;

/// Everything a request handler needs: the store, the window lifecycle, and
/// the configuration. Cheap to clone.
#[derive(Clone)]
pub struct Backend {
    store: Store,
    windows: WindowManager,
    config: Arc<Config>,
}

impl Backend {
    /// Open the store, make sure the schema and any configured admin exist,
    /// and re-arm transitions for windows that have not finished.
    pub async fn open(config: Config) -> Result<Self> {
        let store = Store::open(config.db_path(), config.pool_size(), config.busy_timeout())?;

        let admin = config
            .bootstrap_admin()
            .map(|(cnic, hash)| (cnic.to_string(), hash.to_string()));
        store
            .run(move |conn| {
                ensure_schema_exists(conn)?;
                if let Some((cnic, password_hash)) = admin {
                    if User::ensure_admin(conn, &cnic, &password_hash)? {
                        info!("Created admin account {cnic}");
                    }
                }
                Ok(())
            })
            .await?;

        let windows = WindowManager::new(store.clone(), config.utc_offset());
        windows.scheduler().schedule_pending().await?;

        Ok(Self {
            store,
            windows,
            config: Arc::new(config),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Open the backend and bind the server, ready to run.
pub async fn build(config: Config) -> Result<Server> {
    let backend = Backend::open(config).await?;
    let server = Server::bind(backend).await?;
    info!("Server listening on {}", server.local_addr()?);
    Ok(server)
}
