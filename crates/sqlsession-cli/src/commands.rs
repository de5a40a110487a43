//! Command implementations.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::Args;
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use sqlsession::{SessionHandler, SessionStore, StoreConfig};
use tracing::{debug, info};

use crate::Cli;

/// Config file layout. The `[store]` section is parsed by the library.
///
/// ```toml
/// database = "/var/lib/app/sessions.db"
///
/// [store]
/// table = "sessions"
/// cleanup_rate = 0.2
/// ```
#[derive(Debug, Default)]
struct FileConfig {
    database: Option<PathBuf>,
    store: StoreConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatabaseSection {
    database: Option<PathBuf>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let store = StoreConfig::from_toml_str(&content)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        let DatabaseSection { database } = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        Ok(Self { database, store })
    }
}

/// Settings resolved from flags, environment and config file.
#[derive(Debug)]
pub struct Context {
    pub database: PathBuf,
    pub store: StoreConfig,
}

impl Context {
    /// Flags win over the config file.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let Some(database) = cli.database.clone().or(file.database) else {
            bail!("no database given; pass --database, set SQLSESSION_DATABASE, or add `database` to the config file");
        };

        let mut store = file.store;
        if let Some(table) = &cli.table {
            store = store.with_table(table.clone());
        }
        if let Some(rate) = cli.cleanup_rate {
            store = store.with_cleanup_rate(rate);
        }

        Ok(Self { database, store })
    }

    fn open(&self) -> Result<Connection> {
        // Never create the file: the schema is provisioned elsewhere.
        let conn = Connection::open_with_flags(
            &self.database,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database '{}'", self.database.display()))?;
        debug!(database = %self.database.display(), "Database opened");
        Ok(conn)
    }

    fn with_store<T>(&self, f: impl FnOnce(&SessionStore<&Connection>) -> Result<T>) -> Result<T> {
        let conn = self.open()?;
        let store = SessionStore::with_config(&conn, self.store.clone())
            .context("invalid store configuration")?;
        debug!(
            table = store.table(),
            cleanup_rate = store.cleanup_rate(),
            "Session store ready"
        );
        f(&store)
    }
}

#[derive(Args)]
pub struct ReadArgs {
    /// Session ID
    pub id: String,
}

#[derive(Args)]
pub struct WriteArgs {
    /// Session ID
    pub id: String,

    /// Payload; read from stdin when omitted
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Session ID
    pub id: String,
}

#[derive(Args)]
pub struct GcArgs {
    /// Maximum session lifetime in seconds
    #[arg(long)]
    pub max_lifetime: i64,
}

pub fn read(args: ReadArgs, ctx: &Context) -> Result<()> {
    let data = ctx.with_store(|store| {
        store
            .read(&args.id)
            .with_context(|| format!("failed to read session '{}'", args.id))
    })?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}

pub fn write(args: WriteArgs, ctx: &Context) -> Result<()> {
    let data = match args.data {
        Some(data) => data.into_bytes(),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        }
    };

    ctx.with_store(|store| {
        store
            .write(&args.id, &data)
            .with_context(|| format!("failed to write session '{}'", args.id))
    })?;
    info!(session_id = %args.id, bytes = data.len(), "Session written");
    Ok(())
}

pub fn destroy(args: DestroyArgs, ctx: &Context) -> Result<()> {
    ctx.with_store(|store| {
        store
            .destroy(&args.id)
            .with_context(|| format!("failed to destroy session '{}'", args.id))
    })?;
    info!(session_id = %args.id, "Session destroyed");
    Ok(())
}

pub fn gc(args: GcArgs, ctx: &Context) -> Result<()> {
    if args.max_lifetime < 0 {
        bail!("--max-lifetime must not be negative");
    }
    ctx.with_store(|store| {
        store
            .gc(args.max_lifetime)
            .context("failed to collect expired sessions")
    })?;
    info!(max_lifetime = args.max_lifetime, "Expired sessions collected");
    Ok(())
}
