use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::debug;
use rusqlite::{Connection, OpenFlags};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::SQLITE_BUSY_TIMEOUT;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("database file not found: {0:?} (run the analyzer first)")]
    Missing(PathBuf),

    #[error("failed to open database {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("no free store connection after {0:?}")]
    PoolTimeout(Duration),

    #[error("store pool is closed")]
    PoolClosed,

    #[error("store pool size must be at least 1")]
    EmptyPool,
}

/// Пул read-only соединений с SQLite.
///
/// Соединения открываются сразу (это же и pre-flight проверка БД),
/// лежат в bounded канале и возвращаются туда из `Drop` у [`PooledConnection`].
pub(crate) struct StorePool {
    idle_tx: Sender<Connection>,
    idle_rx: Receiver<Connection>,
    size: usize,
    acquire_timeout: Duration,
}

impl StorePool {
    pub(crate) fn open(
        path: impl AsRef<Path>,
        size: usize,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if size == 0 {
            return Err(StoreError::EmptyPool);
        }
        if !path.is_file() {
            return Err(StoreError::Missing(path.to_path_buf()));
        }

        let (idle_tx, idle_rx) = crossbeam_channel::bounded(size);
        for _ in 0..size {
            let conn = open_read_only(path)?;
            // ёмкость = size, receiver жив => не блокирует и не падает
            idle_tx.send(conn).map_err(|_| StoreError::PoolClosed)?;
        }

        debug!("opened {size} store connections to {path:?}");

        Ok(Self {
            idle_tx,
            idle_rx,
            size,
            acquire_timeout,
        })
    }

    /// Взять соединение на время обработки одного запроса
    pub(crate) fn get(&self) -> Result<PooledConnection<'_>, StoreError> {
        match self.idle_rx.recv_timeout(self.acquire_timeout) {
            Ok(conn) => Ok(PooledConnection {
                conn: Some(conn),
                home: &self.idle_tx,
            }),
            Err(RecvTimeoutError::Timeout) => Err(StoreError::PoolTimeout(self.acquire_timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::PoolClosed),
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn idle(&self) -> usize {
        self.idle_rx.len()
    }
}

fn open_read_only(path: &Path) -> Result<Connection, StoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    let conn = Connection::open_with_flags(path, flags).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    conn.busy_timeout(SQLITE_BUSY_TIMEOUT)
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(conn)
}

/// Соединение, взятое из пула. Возвращается обратно при drop на любом пути выхода.
pub(crate) struct PooledConnection<'a> {
    conn: Option<Connection>,
    home: &'a Sender<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("connection is present until drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if self.home.try_send(conn).is_err() {
                debug!("store pool is gone; closing connection");
            }
        }
    }
}
