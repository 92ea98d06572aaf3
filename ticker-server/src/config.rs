use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) const DEFAULT_PORT: u16 = 5000;
pub(crate) const DEFAULT_DB_PATH: &str = "stocks.db";

pub(crate) const DEFAULT_WORKERS: usize = 4;
pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 64;

pub(crate) const TCP_READ_TIMEOUT_MS: u64 = 5_000;
pub(crate) const TCP_WRITE_TIMEOUT_MS: u64 = 5_000;
pub(crate) const POOL_ACQUIRE_TIMEOUT_MS: u64 = 2_000;

/// Сколько ждёт SQLite, если анализатор держит блокировку на запись
pub(crate) const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_millis(500);

/// Шаг опроса неблокирующего listener'а (и проверки shutdown)
pub(crate) const ACCEPT_TICK: Duration = Duration::from_millis(50);

/// Всё, что раньше было глобальными константами сервера
#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_path: PathBuf,
    pub(crate) workers: usize,
    pub(crate) queue_capacity: usize,
    /// по одному соединению с БД на воркера, если не задано иное
    pub(crate) pool_size: usize,
    pub(crate) read_timeout: Duration,
    pub(crate) write_timeout: Duration,
    pub(crate) acquire_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            pool_size: DEFAULT_WORKERS,
            read_timeout: Duration::from_millis(TCP_READ_TIMEOUT_MS),
            write_timeout: Duration::from_millis(TCP_WRITE_TIMEOUT_MS),
            acquire_timeout: Duration::from_millis(POOL_ACQUIRE_TIMEOUT_MS),
        }
    }
}
