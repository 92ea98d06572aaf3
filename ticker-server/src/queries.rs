use rusqlite::{Connection, OptionalExtension, params};

use crate::store::StoreError;
use ticker_core::TickerSummary;

const LATEST_PRICE_SQL: &str = "
    SELECT p.Value
    FROM Prices p
    JOIN Tickers t ON p.TickerId = t.Id
    WHERE t.Symbol = ?1
    ORDER BY p.Date DESC
    LIMIT 1";

// ключа сортировки у состояния нет - берём последнюю вставленную строку
const TODAY_CONDITION_SQL: &str = "
    SELECT tc.State
    FROM TodaysConditions tc
    JOIN Tickers t ON tc.TickerId = t.Id
    WHERE t.Symbol = ?1
    ORDER BY tc.rowid DESC
    LIMIT 1";

const LIST_TICKERS_SQL: &str = "
    SELECT t.Symbol,
           (SELECT p.Value FROM Prices p
            WHERE p.TickerId = t.Id
            ORDER BY p.Date DESC LIMIT 1),
           (SELECT tc.State FROM TodaysConditions tc
            WHERE tc.TickerId = t.Id
            ORDER BY tc.rowid DESC LIMIT 1)
    FROM Tickers t
    ORDER BY t.Symbol";

/// Значение самой свежей цены. `None` - нет строк или Value = NULL.
pub(crate) fn latest_price(conn: &Connection, symbol: &str) -> Result<Option<f64>, StoreError> {
    let mut stmt = conn.prepare_cached(LATEST_PRICE_SQL)?;
    let value: Option<Option<f64>> = stmt
        .query_row(params![symbol], |row| row.get(0))
        .optional()?;
    Ok(value.flatten())
}

/// Дневное состояние. `None` - нет строки, NULL или пустая строка.
pub(crate) fn today_condition(
    conn: &Connection,
    symbol: &str,
) -> Result<Option<String>, StoreError> {
    let mut stmt = conn.prepare_cached(TODAY_CONDITION_SQL)?;
    let state: Option<Option<String>> = stmt
        .query_row(params![symbol], |row| row.get(0))
        .optional()?;
    Ok(state.flatten().filter(|s| !s.trim().is_empty()))
}

pub(crate) fn list_tickers(conn: &Connection) -> Result<Vec<TickerSummary>, StoreError> {
    let mut stmt = conn.prepare(LIST_TICKERS_SQL)?;
    let rows = stmt.query_map([], |row| {
        let condition: Option<String> = row.get(2)?;
        Ok(TickerSummary {
            symbol: row.get(0)?,
            last_price: row.get(1)?,
            condition: condition.filter(|s| !s.trim().is_empty()),
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
