use anyhow::{Result, bail};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{self, ServerConfig};

/// Ticker Server - отвечает последней ценой тикера из БД анализатора.
///
/// Один запрос на соединение: строка с тикером -> строка с ценой.
#[derive(Parser, Debug, Clone)]
#[command(name = "ticker-server", version, about)]
pub(crate) struct Args {
    /// TCP bind address (по умолчанию только loopback)
    #[arg(long, default_value = ticker_core::DEFAULT_SERVER_ADDR)]
    pub(crate) bind: SocketAddr,

    /// Путь к SQLite базе, которую наполняет анализатор
    #[arg(long, env = "TICKER_DB", default_value = config::DEFAULT_DB_PATH)]
    pub(crate) db: PathBuf,

    /// Количество потоков-обработчиков
    #[arg(long, default_value_t = config::DEFAULT_WORKERS)]
    pub(crate) workers: usize,

    /// Ёмкость очереди принятых, но ещё не обработанных соединений
    #[arg(long, default_value_t = config::DEFAULT_QUEUE_CAPACITY)]
    pub(crate) queue_capacity: usize,

    /// Размер пула соединений с БД (по умолчанию = --workers)
    #[arg(long)]
    pub(crate) pool_size: Option<usize>,

    /// Таймаут чтения запроса, мс
    #[arg(long, default_value_t = config::TCP_READ_TIMEOUT_MS)]
    pub(crate) read_timeout_ms: u64,

    /// Таймаут записи ответа, мс
    #[arg(long, default_value_t = config::TCP_WRITE_TIMEOUT_MS)]
    pub(crate) write_timeout_ms: u64,

    /// Сколько ждать свободное соединение из пула, мс
    #[arg(long, default_value_t = config::POOL_ACQUIRE_TIMEOUT_MS)]
    pub(crate) acquire_timeout_ms: u64,

    /// Напечатать доступные тикеры и выйти
    #[arg(long)]
    pub(crate) list_tickers: bool,
}

impl Args {
    pub(crate) fn to_config(&self) -> Result<ServerConfig> {
        if self.workers == 0 {
            bail!("--workers must be at least 1");
        }
        if self.queue_capacity == 0 {
            bail!("--queue-capacity must be at least 1");
        }
        let pool_size = self.pool_size.unwrap_or(self.workers);
        if pool_size == 0 {
            bail!("--pool-size must be at least 1");
        }
        for (name, ms) in [
            ("--read-timeout-ms", self.read_timeout_ms),
            ("--write-timeout-ms", self.write_timeout_ms),
            ("--acquire-timeout-ms", self.acquire_timeout_ms),
        ] {
            // Duration::ZERO в set_read_timeout - ошибка
            if ms == 0 {
                bail!("{name} must be greater than zero");
            }
        }

        Ok(ServerConfig {
            bind_addr: self.bind,
            db_path: self.db.clone(),
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            pool_size,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
        })
    }
}
