//! Точка входа `ticker-client`.
//!
//! Жизненный цикл:
//! - парсинг CLI и резолвинг адреса сервера
//! - интерактивный цикл: `help`/`?`, `test`, `exit`/`quit`, иначе тикер
//! - на каждый тикер - отдельное TCP соединение с ограничением на connect

mod cli;
mod repl;
mod tcp;

use std::io;

use anyhow::Context;
use clap::Parser;
use log::info;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG; stdout занят диалогом, поэтому по умолчанию только warn
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::Args::parse();
    args.validate()?;

    let server = args
        .server_socket_addr()
        .with_context(|| format!("resolve server address {}", args.server))?;

    info!(
        "Starting ticker-client: server={}, connect_timeout={:?}",
        server,
        args.connect_timeout()
    );

    let session = repl::Session {
        server,
        connect_timeout: args.connect_timeout(),
        probe_timeout: args.probe_timeout(),
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    session.run(stdin.lock(), &mut stdout)?;

    Ok(())
}
