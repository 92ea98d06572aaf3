use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::time::Duration;

use log::debug;

use crate::tcp::{self, ClientError};

pub(crate) const HELP_TEXT: &str = "\
Commands:
  help, ?    - show this help
  test       - check connection to the server
  exit, quit - leave the client
Anything else is treated as a ticker symbol (e.g. AAPL);
the server answers with the latest price from its database.";

/// Что ввёл пользователь
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Empty,
    Exit,
    Help,
    Test,
    Ticker(String),
}

/// Команды распознаются без учёта регистра; остальное - тикер.
pub(crate) fn parse_input(line: &str) -> Input {
    let s = line.trim();
    if s.is_empty() {
        return Input::Empty;
    }

    match s.to_ascii_lowercase().as_str() {
        "exit" | "quit" => Input::Exit,
        "help" | "?" => Input::Help,
        "test" => Input::Test,
        _ => Input::Ticker(s.to_string()),
    }
}

pub(crate) struct Session {
    pub(crate) server: SocketAddr,
    pub(crate) connect_timeout: Duration,
    pub(crate) probe_timeout: Duration,
}

impl Session {
    /// Цикл чтения команд до `exit` или EOF на входе.
    pub(crate) fn run<R: BufRead, W: Write>(&self, mut input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Ticker client. Server: {}", self.server)?;
        writeln!(out, "Type 'help' for commands, 'exit' to quit.")?;

        let mut buf = Vec::new();
        loop {
            write!(out, "ticker> ")?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                // stdin закрыт
                writeln!(out)?;
                break;
            }

            // битый UTF-8 не должен завершать сессию
            let line = String::from_utf8_lossy(&buf);
            match parse_input(&line) {
                Input::Empty => continue,
                Input::Exit => {
                    writeln!(out, "Goodbye!")?;
                    break;
                }
                Input::Help => writeln!(out, "{HELP_TEXT}")?,
                Input::Test => self.test_connection(out)?,
                Input::Ticker(symbol) => self.lookup(&symbol, out)?,
            }
        }

        Ok(())
    }

    fn lookup<W: Write>(&self, symbol: &str, out: &mut W) -> io::Result<()> {
        match tcp::query_ticker(self.server, symbol, self.connect_timeout) {
            Ok(resp) => writeln!(out, "{resp}"),
            Err(e) => {
                debug!("lookup of {symbol} failed: {e:?}");
                writeln!(out, "{}", describe(&e))
            }
        }
    }

    fn test_connection<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Checking connection to {}...", self.server)?;
        match tcp::probe(self.server, self.probe_timeout) {
            Ok(Some(reply)) => {
                writeln!(out, "Server is reachable")?;
                writeln!(out, "Server replied: {reply}")
            }
            Ok(None) => writeln!(out, "Server is reachable (no reply)"),
            Err(e) => {
                debug!("probe failed: {e:?}");
                writeln!(out, "{}", describe(&e))
            }
        }
    }
}

/// Сообщение для пользователя; таймаут, недоступность и прочее различаются.
pub(crate) fn describe(e: &ClientError) -> String {
    match e {
        ClientError::ConnectTimeout { after, .. } => {
            format!("Server is not responding (timeout after {}s)", after.as_secs_f32())
        }
        ClientError::Unreachable { addr, .. } => format!("Could not connect to server at {addr}"),
        ClientError::ResponseTimeout(_) => "Server did not answer in time".to_string(),
        ClientError::EmptyResponse => "Server returned no response".to_string(),
        ClientError::Request(err) => format!("Invalid request: {err}"),
        ClientError::Io(err) => format!("Unexpected error: {err}"),
    }
}
