use thiserror::Error;

/// Ошибки протокола
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// После trim от запроса ничего не осталось
    #[error("empty symbol")]
    EmptySymbol,

    /// Payload содержит разделитель кадров
    #[error("frame payload must not contain line breaks")]
    EmbeddedLineBreak,

    /// Ошибка сокета/потока при чтении или записи кадра
    #[error("frame i/o error: {0}")]
    Io(#[from] std::io::Error),
}
