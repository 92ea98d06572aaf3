use std::time::Duration;

/// Адрес сервера по умолчанию (только loopback)
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:5000";

/// Максимальный размер запроса (символ тикера) в байтах
pub const MAX_REQUEST_BYTES: usize = 256;

/// Максимальный размер ответа, который читает клиент
pub const MAX_RESPONSE_BYTES: usize = 1024;

/// Ограничение на установку соединения для запроса тикера
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Ограничение на установку соединения для команды `test`
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Payload проверки связи
pub const PROBE_PAYLOAD: &str = "TEST";

/// Ответ сервера, когда очередь воркеров переполнена
pub const BUSY_RESPONSE: &str = "Server busy, try again later";
