//! # ticker-core
//!
//! Общий протокол для Ticker Server / Ticker Client.
//!
//! Этот крейт содержит:
//!
//! - [`protocol`] — кадрирование (строка до `\n` или EOF, с лимитом) и нормализация символа
//! - [`types`] — доменные типы и форматирование строки ответа
//! - [`error`] — типы ошибок `ticker-core`
//!
//! ## Быстрый пример: запрос и ответ
//!
//! ```rust
//! use std::io::Cursor;
//! use ticker_core::protocol::{normalize_symbol, read_frame, write_frame};
//! use ticker_core::{LookupOutcome, Quote, MAX_REQUEST_BYTES};
//!
//! let frame = read_frame(Cursor::new(b"  aapl \n".to_vec()), MAX_REQUEST_BYTES)
//!     .unwrap()
//!     .unwrap();
//! let symbol = normalize_symbol(&frame.payload).unwrap();
//! assert_eq!(symbol, "AAPL");
//!
//! let outcome = LookupOutcome::Found(Quote {
//!     symbol,
//!     price: 152.34,
//!     condition: Some("UP".to_string()),
//! });
//!
//! let mut wire = Vec::new();
//! write_frame(&mut wire, &outcome.to_string()).unwrap();
//! assert_eq!(wire, b"AAPL: $152.34 (UP)\n");
//! ```
//!
//! ## Дизайн
//!
//! `ticker-core` - общая зависимость сервера, клиента и тестов.
//! Здесь только чистые типы, кадрирование и форматирование,
//! без SQLite и без сетевого runtime.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Кадрирование запросов/ответов и нормализация символа.
pub mod protocol;

/// Доменные типы (котировка, результат поиска).
pub mod types;

/// Ошибки `ticker-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{
    BUSY_RESPONSE, CONNECT_TIMEOUT, DEFAULT_SERVER_ADDR, MAX_REQUEST_BYTES, MAX_RESPONSE_BYTES,
    PROBE_PAYLOAD, PROBE_TIMEOUT,
};

// --- Re-exports (публичный фасад API) ---

pub use crate::error::ProtocolError;
pub use crate::protocol::Frame;
pub use crate::types::{LookupOutcome, Quote, TickerSummary};
