//! Точка входа `ticker-server`.
//!
//! Жизненный цикл:
//! - парсинг CLI и сборка `ServerConfig`
//! - открытие пула read-only соединений с БД анализатора (заодно pre-flight)
//! - `--list-tickers`: печать доступных тикеров и выход
//! - иначе accept loop + пул воркеров до `Ctrl+C`

mod cli;
mod config;
mod lookup;
mod queries;
mod store;
mod tcp;
mod workers;

#[cfg(test)]
mod fixtures;

use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

use anyhow::Context;
use clap::Parser;
use log::info;

use crate::store::StorePool;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG, по умолчанию info - это и есть консоль оператора
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    let cfg = args.to_config()?;

    let pool = StorePool::open(&cfg.db_path, cfg.pool_size, cfg.acquire_timeout)
        .with_context(|| format!("open database {:?}", cfg.db_path))?;
    info!(
        "database found: {:?} ({} connections)",
        cfg.db_path,
        pool.size()
    );

    if args.list_tickers {
        return print_tickers(&pool);
    }

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let listener = tcp::bind(cfg.bind_addr)?;
    info!(
        "ticker-server listening on {} (workers={}, queue={})",
        listener.local_addr()?,
        cfg.workers,
        cfg.queue_capacity
    );

    tcp::run_tcp_listener(listener, &cfg, Arc::new(pool), shutdown)?;

    info!("ticker-server stopped");
    Ok(())
}

fn print_tickers(pool: &StorePool) -> anyhow::Result<()> {
    let tickers = lookup::available_tickers(pool).context("list tickers")?;

    println!("Available tickers:");
    if tickers.is_empty() {
        println!("  (database is empty)");
    }
    for t in &tickers {
        println!("  {t}");
    }
    Ok(())
}
