use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

/// Ticker Client - спрашивает у ticker-server последнюю цену тикера.
///
/// Каждый запрос - отдельное TCP соединение: тикер -> строка ответа.
#[derive(Parser, Debug, Clone)]
#[command(name = "ticker-client", version, about)]
pub(crate) struct Args {
    /// TCP адрес ticker-server, например 127.0.0.1:5000
    #[arg(long, default_value = ticker_core::DEFAULT_SERVER_ADDR)]
    pub(crate) server: String,

    /// Ограничение на подключение для запроса тикера, мс
    #[arg(long, default_value_t = ticker_core::CONNECT_TIMEOUT.as_millis() as u64)]
    pub(crate) connect_timeout_ms: u64,

    /// Ограничение на подключение для команды `test`, мс
    #[arg(long, default_value_t = ticker_core::PROBE_TIMEOUT.as_millis() as u64)]
    pub(crate) probe_timeout_ms: u64,
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("--server is empty");
        }
        if !self.server.contains(':') {
            bail!("--server must look like HOST:PORT (got: {})", self.server);
        }
        if self.connect_timeout_ms == 0 || self.probe_timeout_ms == 0 {
            bail!("timeouts must be greater than zero");
        }
        Ok(())
    }

    pub(crate) fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub(crate) fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub(crate) fn server_socket_addr(&self) -> std::io::Result<SocketAddr> {
        // Берём первый результат резолвинга
        self.server.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        })
    }
}
