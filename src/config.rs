use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment, Profile,
};
use serde::{Deserialize, Serialize};

/// Default port the server has always listened on.
pub const DEFAULT_PORT: u16 = 12346;

/// Environment keys read verbatim. `Env` would parse an all-digit CNIC or
/// hash as a number and drop leading zeros.
const VERBATIM_ENV: [&str; 2] = ["ADMIN_CNIC", "ADMIN_PASSWORD_HASH"];

/// Application configuration, derived from `Ems.toml` and `EMS_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    // network
    address: IpAddr,
    port: u16,
    // store
    db_path: PathBuf,
    pool_size: u32,
    busy_timeout_ms: u64,
    // time
    utc_offset_minutes: i32,
    // bootstrap admin
    admin_cnic: Option<String>,
    admin_password_hash: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            db_path: PathBuf::from("ems.sqlite3"),
            pool_size: 8,
            busy_timeout_ms: 5000,
            utc_offset_minutes: 5 * 60,
            admin_cnic: None,
            admin_password_hash: None,
        }
    }
}

impl Config {
    /// The layered configuration sources: defaults, then the selected profile
    /// of `Ems.toml` (or the file named by `EMS_CONFIG`), then `EMS_*`
    /// environment variables.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(Env::var_or("EMS_CONFIG", "Ems.toml")).nested())
            .merge(
                Env::prefixed("EMS_")
                    .ignore(&["PROFILE", "CONFIG"])
                    .ignore(&VERBATIM_ENV)
                    .global(),
            );
        for key in VERBATIM_ENV {
            if let Some(value) = Env::var(&format!("EMS_{key}")) {
                figment = figment.merge(Serialized::global(&key.to_lowercase(), value));
            }
        }
        figment.select(Profile::from_env_or("EMS_PROFILE", "default"))
    }

    /// Load and validate the configuration.
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, figment::Error> {
        let config: Config = figment.extract()?;
        if config.offset().is_none() {
            return Err(format!(
                "utc_offset_minutes out of range: {}",
                config.utc_offset_minutes
            )
            .into());
        }
        if config.pool_size == 0 {
            return Err("pool_size must be at least 1".into());
        }
        Ok(config)
    }

    /// Default configuration pointed at the given database file, listening on
    /// an ephemeral loopback port.
    pub fn with_database<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            db_path: db_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// The socket address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Path of the SQLite database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Number of pooled store connections.
    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// How long a store connection waits on a locked database.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Offset used to read wall-clock timestamps off the wire and to decide
    /// which calendar day a window belongs to.
    pub fn utc_offset(&self) -> FixedOffset {
        // Validated on load.
        self.offset().unwrap_or_else(|| Utc.fix())
    }

    /// Credentials for an admin account to create on startup, if configured.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.admin_cnic, &self.admin_password_hash) {
            (Some(cnic), Some(hash)) => Some((cnic.as_str(), hash.as_str())),
            _ => None,
        }
    }

    fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }
}
