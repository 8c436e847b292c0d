//! `Backend` implementation: one SQLite transaction per unit of work

use fireside_core::storage::{Backend, Session, StorageError};
use rusqlite::TransactionBehavior;
use tracing::{trace, warn};

use crate::config::SqliteConfig;
use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};
use crate::session::SqliteSession;

/// SQLite-backed archive storage
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating and migrating if needed) the database described by `config`
    pub fn open(config: SqliteConfig) -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::new(config)?))
    }

    /// Private in-memory database
    pub fn memory() -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::memory()?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn run<R, E, F>(&self, f: F, behavior: TransactionBehavior, commit: bool) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>,
    {
        let mut conn = self.pool.lock();
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(storage_error::<E>)?;

        let result = f(&SqliteSession::new(&tx));

        match result {
            Ok(value) if commit => {
                tx.commit().map_err(storage_error::<E>)?;
                trace!("SQLite transaction committed");
                Ok(value)
            }
            Ok(value) => {
                tx.rollback().map_err(storage_error::<E>)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(error = %rollback, "SQLite rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Backend for SqliteBackend {
    fn read<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>,
    {
        self.run(f, TransactionBehavior::Deferred, false)
    }

    /// `IMMEDIATE` so the write lock is taken before the first read; two
    /// processes saving at once queue on `busy_timeout` instead of failing
    /// mid-transaction.
    fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>,
    {
        self.run(f, TransactionBehavior::Immediate, true)
    }
}

fn storage_error<E: From<StorageError>>(err: rusqlite::Error) -> E {
    E::from(StorageError::from(SqliteError::from(err)))
}
