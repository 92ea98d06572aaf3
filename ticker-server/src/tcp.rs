use crate::config::{ACCEPT_TICK, ServerConfig};
use crate::lookup::lookup_in_pool;
use crate::store::StorePool;
use crate::workers::{Rejected, WorkerPool};
use anyhow::Context;
use log::{debug, info, warn};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::thread;
use ticker_core::protocol::{read_frame, request_symbol, write_frame};
use ticker_core::{BUSY_RESPONSE, MAX_REQUEST_BYTES};

pub(crate) fn bind(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    TcpListener::bind(addr).with_context(|| format!("bind TCP listener {}", addr))
}

// accept loop: соединения раздаются воркерам, сам цикл никогда не ждёт клиента
pub(crate) fn run_tcp_listener(
    listener: TcpListener,
    cfg: &ServerConfig,
    pool: Arc<StorePool>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    listener
        .set_nonblocking(true)
        .context("listener.set_nonblocking(true)")?;

    let workers = WorkerPool::start(cfg.workers, cfg.queue_capacity, move |stream: TcpStream| {
        if let Err(e) = handle_conn(stream, &pool) {
            warn!("handle_conn error: {e:#}");
        }
    })
    .context("start worker pool")?;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down tcp listener");
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                info!("new client {addr}");

                if let Err(e) = prepare_stream(&stream, cfg) {
                    warn!("failed to configure stream from {addr}: {e:#}");
                    continue;
                }

                match workers.submit(stream) {
                    Ok(()) => {}
                    Err(Rejected::Full(stream)) => {
                        warn!("work queue is full; rejecting {addr}");
                        reject_busy(stream);
                    }
                    Err(Rejected::Closed(_)) => {
                        warn!("worker pool closed; stopping listener");
                        break;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // нет новых соединений прямо сейчас
                thread::sleep(ACCEPT_TICK);
            }
            Err(e) => {
                warn!("accept error: {e}");
                thread::sleep(ACCEPT_TICK);
            }
        }
    }

    workers.shutdown();
    Ok(())
}

fn prepare_stream(stream: &TcpStream, cfg: &ServerConfig) -> anyhow::Result<()> {
    stream
        .set_nonblocking(false)
        .context("stream.set_nonblocking(false)")?;
    stream.set_nodelay(true).ok();
    stream
        .set_read_timeout(Some(cfg.read_timeout))
        .context("stream.set_read_timeout")?;
    stream
        .set_write_timeout(Some(cfg.write_timeout))
        .context("stream.set_write_timeout")?;
    Ok(())
}

fn reject_busy(stream: TcpStream) {
    if let Err(e) = write_frame(&stream, BUSY_RESPONSE) {
        debug!("failed to send busy reply: {e}");
    }
}

/// Один запрос - один ответ, потом соединение закрывается (drop).
fn handle_conn(stream: TcpStream, pool: &StorePool) -> anyhow::Result<()> {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());

    let frame = match read_frame(&stream, MAX_REQUEST_BYTES)
        .with_context(|| format!("read request from {peer}"))?
    {
        Some(f) => f,
        None => {
            info!("empty request from {peer}");
            return Ok(());
        }
    };

    if frame.at_limit {
        warn!(
            "request from {peer} reached the {MAX_REQUEST_BYTES}-byte limit without a line break; \
             anything after it is ignored"
        );
    }

    // пустой после trim запрос тоже ищется и получает "not found"
    let symbol = request_symbol(&frame.payload);
    info!("request from {peer}: {symbol:?}");

    let outcome = lookup_in_pool(pool, &symbol);
    let response = outcome.to_string();

    write_frame(&stream, &response).with_context(|| format!("write response to {peer}"))?;
    if outcome.is_found() {
        info!("response to {peer}: {response}");
    } else {
        info!("no price for {:?} sent to {peer}: {response}", outcome.symbol());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::io::{Read, Write};
    use std::net::Shutdown;
    use std::time::Duration;

    fn connect_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();

        (client, server)
    }

    fn read_reply(mut client: TcpStream) -> String {
        client
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap_or(0);
        String::from_utf8_lossy(&buf).to_string()
    }

    fn test_pool(db: &fixtures::TestDb) -> StorePool {
        StorePool::open(db.path(), 2, Duration::from_millis(200)).unwrap()
    }

    /// Сервер в фоне на 127.0.0.1:0; останавливается при drop
    struct RunningServer {
        addr: SocketAddr,
        shutdown: Arc<AtomicBool>,
        handle: Option<thread::JoinHandle<()>>,
    }

    impl RunningServer {
        fn start(db: &fixtures::TestDb, cfg: ServerConfig) -> Self {
            let pool = Arc::new(
                StorePool::open(db.path(), cfg.pool_size, cfg.acquire_timeout).unwrap(),
            );
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            let shutdown = Arc::new(AtomicBool::new(false));

            let handle = {
                let shutdown = shutdown.clone();
                thread::spawn(move || {
                    run_tcp_listener(listener, &cfg, pool, shutdown).unwrap();
                })
            };

            Self {
                addr,
                shutdown,
                handle: Some(handle),
            }
        }

        fn ask(&self, request: &[u8]) -> String {
            let mut client = TcpStream::connect(self.addr).unwrap();
            client.write_all(request).unwrap();
            read_reply(client)
        }
    }

    impl Drop for RunningServer {
        fn drop(&mut self) {
            self.shutdown.store(true, Ordering::Relaxed);
            if let Some(h) = self.handle.take() {
                let _ = h.join();
            }
        }
    }

    fn small_cfg() -> ServerConfig {
        ServerConfig {
            workers: 2,
            pool_size: 2,
            read_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(2),
            acquire_timeout: Duration::from_millis(500),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn handle_conn_answers_known_ticker_in_any_case() {
        let db = fixtures::scenario_db();
        let (mut client, server) = connect_pair();
        client.write_all(b"aapl\n").unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        assert_eq!(read_reply(client), "AAPL: $152.34 (UP)\n");
    }

    #[test]
    fn handle_conn_answers_not_found() {
        let db = fixtures::scenario_db();
        let (mut client, server) = connect_pair();
        client.write_all(b"MSFT\n").unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        assert_eq!(
            read_reply(client),
            "Ticker 'MSFT' not found in database\n"
        );
    }

    #[test]
    fn handle_conn_accepts_request_closed_by_eof() {
        let db = fixtures::scenario_db();
        let (mut client, server) = connect_pair();
        client.write_all(b"  tsla  ").unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        assert_eq!(read_reply(client), "TSLA: $250.50\n");
    }

    #[test]
    fn handle_conn_writes_nothing_on_eof_before_request() {
        let db = fixtures::scenario_db();
        let (client, server) = connect_pair();
        client.shutdown(Shutdown::Write).unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        assert_eq!(read_reply(client), "");
    }

    #[test]
    fn handle_conn_answers_blank_request_with_not_found() {
        let db = fixtures::scenario_db();
        let (mut client, server) = connect_pair();
        client.write_all(b"   \n").unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        assert_eq!(read_reply(client), "Ticker '' not found in database\n");
    }

    #[test]
    fn handle_conn_answers_request_of_exactly_limit_bytes() {
        let db = fixtures::scenario_db();
        let (mut client, server) = connect_pair();
        client.write_all(&[b'q'; MAX_REQUEST_BYTES]).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        let expected = format!(
            "Ticker '{}' not found in database\n",
            "Q".repeat(MAX_REQUEST_BYTES)
        );
        assert_eq!(read_reply(client), expected);
    }

    #[test]
    fn handle_conn_truncates_oversized_request() {
        let db = fixtures::scenario_db();
        let (mut client, server) = connect_pair();
        let mut req = vec![b'x'; 400];
        req.push(b'\n');
        client.write_all(&req).unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        let expected = format!("Ticker '{}' not found in database\n", "X".repeat(256));
        assert_eq!(read_reply(client), expected);
    }

    #[test]
    fn handle_conn_reports_store_error_distinctly() {
        let db = fixtures::db_without_prices();
        let (mut client, server) = connect_pair();
        client.write_all(b"AAPL\n").unwrap();

        handle_conn(server, &test_pool(&db)).unwrap();

        assert_eq!(
            read_reply(client),
            "Ticker 'AAPL' lookup failed: store unavailable\n"
        );
    }

    #[test]
    fn handle_conn_errors_on_silent_client_after_read_timeout() {
        let db = fixtures::scenario_db();
        let (_client, server) = connect_pair();
        server
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();

        let res = handle_conn(server, &test_pool(&db));
        assert!(res.is_err());
    }

    #[test]
    fn end_to_end_scenario() {
        let db = fixtures::scenario_db();
        let server = RunningServer::start(&db, small_cfg());

        assert_eq!(server.ask(b"aapl\n"), "AAPL: $152.34 (UP)\n");
        assert_eq!(
            server.ask(b"MSFT\n"),
            "Ticker 'MSFT' not found in database\n"
        );
    }

    #[test]
    fn repeated_requests_are_idempotent() {
        let db = fixtures::scenario_db();
        let server = RunningServer::start(&db, small_cfg());

        let first = server.ask(b"AAPL\n");
        let second = server.ask(b"AAPL\n");
        assert_eq!(first, second);
    }

    #[test]
    fn listener_survives_empty_connections() {
        let db = fixtures::scenario_db();
        let server = RunningServer::start(&db, small_cfg());

        for _ in 0..3 {
            let c = TcpStream::connect(server.addr).unwrap();
            drop(c);
        }

        assert_eq!(server.ask(b"tsla\n"), "TSLA: $250.50\n");
    }

    #[test]
    fn silent_client_does_not_block_others() {
        let db = fixtures::scenario_db();
        let server = RunningServer::start(&db, small_cfg());

        // держит один воркер до read timeout
        let _silent = TcpStream::connect(server.addr).unwrap();
        thread::sleep(Duration::from_millis(100));

        assert_eq!(server.ask(b"aapl\n"), "AAPL: $152.34 (UP)\n");
    }

    #[test]
    fn full_queue_gets_busy_reply() {
        let db = fixtures::scenario_db();
        let cfg = ServerConfig {
            workers: 1,
            queue_capacity: 1,
            pool_size: 1,
            read_timeout: Duration::from_secs(2),
            ..small_cfg()
        };
        let server = RunningServer::start(&db, cfg);

        // первый занимает воркер, второй лежит в очереди
        let first = TcpStream::connect(server.addr).unwrap();
        thread::sleep(Duration::from_millis(200));
        let second = TcpStream::connect(server.addr).unwrap();
        thread::sleep(Duration::from_millis(200));

        let third = TcpStream::connect(server.addr).unwrap();
        assert_eq!(read_reply(third), format!("{BUSY_RESPONSE}\n"));

        drop(first);
        drop(second);
    }
}
