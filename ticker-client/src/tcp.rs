use std::io::ErrorKind;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use thiserror::Error;
use ticker_core::protocol::{normalize_symbol, read_frame, write_frame};
use ticker_core::{MAX_RESPONSE_BYTES, PROBE_PAYLOAD, ProtocolError};

const TCP_READ_TIMEOUT_S: u64 = 5;
const TCP_WRITE_TIMEOUT_S: u64 = 5;

#[derive(Debug, Error)]
pub(crate) enum ClientError {
    #[error("server {addr} did not accept the connection within {after:?}")]
    ConnectTimeout { addr: SocketAddr, after: Duration },

    #[error("server {addr} is unreachable")]
    Unreachable {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server did not answer within {0:?}")]
    ResponseTimeout(Duration),

    #[error("server closed connection without response")]
    EmptyResponse,

    #[error("invalid request: {0}")]
    Request(ProtocolError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProtocolError> for ClientError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Io(io) if is_timeout(&io) => {
                ClientError::ResponseTimeout(Duration::from_secs(TCP_READ_TIMEOUT_S))
            }
            ProtocolError::Io(io) => ClientError::Io(io),
            other => ClientError::Request(other),
        }
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Подключение с ограничением по времени. По истечении `timeout` попытка
/// прерывается, висящих подключений не остаётся.
fn connect(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, ClientError> {
    let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => ClientError::ConnectTimeout {
            addr,
            after: timeout,
        },
        ErrorKind::ConnectionRefused
        | ErrorKind::ConnectionReset
        | ErrorKind::HostUnreachable
        | ErrorKind::NetworkUnreachable
        | ErrorKind::AddrNotAvailable => ClientError::Unreachable { addr, source: e },
        _ => ClientError::Io(e),
    })?;

    stream.set_nodelay(true).ok();
    stream.set_read_timeout(Some(Duration::from_secs(TCP_READ_TIMEOUT_S)))?;
    stream.set_write_timeout(Some(Duration::from_secs(TCP_WRITE_TIMEOUT_S)))?;
    Ok(stream)
}

/// Один кадр туда, один обратно.
fn exchange(stream: &TcpStream, request: &str) -> Result<Option<String>, ClientError> {
    write_frame(stream, request)?;
    let reply = read_frame(stream, MAX_RESPONSE_BYTES)?;
    Ok(reply.map(|f| f.payload))
}

/// Запрос цены тикера: отдаёт строку ответа сервера как есть.
pub(crate) fn query_ticker(
    server: SocketAddr,
    raw_symbol: &str,
    connect_timeout: Duration,
) -> Result<String, ClientError> {
    let symbol = normalize_symbol(raw_symbol)?;
    let stream = connect(server, connect_timeout)?;

    exchange(&stream, &symbol)?.ok_or(ClientError::EmptyResponse)
}

/// Проверка связи: шлём `TEST`, ответ не интерпретируем.
/// `Ok(None)` - подключились, но сервер ничего не прислал.
pub(crate) fn probe(server: SocketAddr, timeout: Duration) -> Result<Option<String>, ClientError> {
    let stream = connect(server, timeout)?;
    exchange(&stream, PROBE_PAYLOAD)
}
