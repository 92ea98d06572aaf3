use std::io::{BufRead, BufReader, Read, Write};

use crate::error::ProtocolError;

/// Разделитель кадров
pub const FRAME_DELIMITER: u8 = b'\n';

/// Один кадр (запрос или ответ), уже без разделителя.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Текст кадра (UTF-8, невалидные байты заменены)
    pub payload: String,
    /// Прочитано ровно `max_len` байт без разделителя: всё, что пир
    /// прислал после лимита (если прислал), не читается
    pub at_limit: bool,
}

/// Читает один кадр: байты до первого `\n` или до EOF, но не больше `max_len`.
///
/// Частичные чтения склеиваются (`read_until` крутит `read` сам).
/// `Ok(None)` - пир закрыл соединение, не прислав ни одного байта.
pub fn read_frame<R: Read>(reader: R, max_len: usize) -> Result<Option<Frame>, ProtocolError> {
    let mut limited = BufReader::new(reader.take(max_len as u64));
    let mut buf = Vec::with_capacity(max_len.min(1024));

    let n = limited.read_until(FRAME_DELIMITER, &mut buf)?;
    if n == 0 {
        return Ok(None);
    }

    let terminated = buf.last() == Some(&FRAME_DELIMITER);
    if terminated {
        buf.pop();
    }
    // есть ли продолжение, не узнать без ещё одного (блокирующего) read
    let at_limit = !terminated && n >= max_len;

    Ok(Some(Frame {
        payload: String::from_utf8_lossy(&buf).into_owned(),
        at_limit,
    }))
}

/// Пишет `line` одним `write_all` вместе с разделителем.
pub fn write_frame<W: Write>(mut writer: W, line: &str) -> Result<(), ProtocolError> {
    if line.contains('\n') {
        return Err(ProtocolError::EmbeddedLineBreak);
    }

    let mut bytes = Vec::with_capacity(line.len() + 1);
    bytes.extend_from_slice(line.as_bytes());
    bytes.push(FRAME_DELIMITER);

    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Символ из кадра запроса на стороне сервера: trim + uppercase, без отказов.
/// Пустая строка остаётся пустой и ищется как обычный символ.
pub fn request_symbol(payload: &str) -> String {
    payload.trim().to_uppercase()
}

/// Нормализация ввода на стороне клиента: trim + uppercase, пустое - ошибка.
/// "  aapl\r" -> "AAPL"
pub fn normalize_symbol(raw: &str) -> Result<String, ProtocolError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ProtocolError::EmptySymbol);
    }
    if s.contains(['\n', '\r']) {
        return Err(ProtocolError::EmbeddedLineBreak);
    }
    Ok(s.to_uppercase())
}
