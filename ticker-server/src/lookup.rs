use log::warn;
use rusqlite::Connection;

use crate::queries;
use crate::store::{StoreError, StorePool};
use ticker_core::{LookupOutcome, Quote, TickerSummary};

/// Поиск по уже нормализованному символу на одном соединении:
/// сначала цена, потом состояние.
///
/// Ошибка запроса цены -> `StoreError`; ошибка запроса состояния только
/// логируется, цену всё равно отдаём.
pub(crate) fn lookup(conn: &Connection, symbol: &str) -> LookupOutcome {
    let price = match queries::latest_price(conn, symbol) {
        Ok(p) => p,
        Err(e) => {
            warn!("price query for {symbol} failed: {e}");
            return store_error(symbol, &e);
        }
    };

    let Some(price) = price else {
        return LookupOutcome::NotFound {
            symbol: symbol.to_string(),
        };
    };

    let condition = match queries::today_condition(conn, symbol) {
        Ok(c) => c,
        Err(e) => {
            warn!("condition query for {symbol} failed: {e}; answering without it");
            None
        }
    };

    LookupOutcome::Found(Quote {
        symbol: symbol.to_string(),
        price,
        condition,
    })
}

/// Одно соединение из пула на весь запрос; вернётся в пул при выходе из функции.
pub(crate) fn lookup_in_pool(pool: &StorePool, symbol: &str) -> LookupOutcome {
    match pool.get() {
        Ok(conn) => lookup(&conn, symbol),
        Err(e) => {
            warn!(
                "no store connection for {symbol}: {e} (idle {}/{})",
                pool.idle(),
                pool.size()
            );
            store_error(symbol, &e)
        }
    }
}

pub(crate) fn available_tickers(pool: &StorePool) -> Result<Vec<TickerSummary>, StoreError> {
    let conn = pool.get()?;
    queries::list_tickers(&conn)
}

fn store_error(symbol: &str, e: &StoreError) -> LookupOutcome {
    LookupOutcome::StoreError {
        symbol: symbol.to_string(),
        detail: e.to_string(),
    }
}
