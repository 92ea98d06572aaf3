//! Временные SQLite базы для тестов (схема как у анализатора).

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA_SQL: &str = "
    CREATE TABLE Tickers (
        Id     INTEGER PRIMARY KEY,
        Symbol TEXT NOT NULL UNIQUE
    );
    CREATE TABLE Prices (
        Id       INTEGER PRIMARY KEY,
        TickerId INTEGER NOT NULL REFERENCES Tickers(Id),
        Value    REAL,
        Date     TEXT NOT NULL
    );
    CREATE TABLE TodaysConditions (
        Id       INTEGER PRIMARY KEY,
        TickerId INTEGER NOT NULL REFERENCES Tickers(Id),
        State    TEXT
    );";

const SCENARIO_SQL: &str = "
    INSERT INTO Tickers (Id, Symbol) VALUES (1, 'AAPL'), (2, 'TSLA'), (3, 'NOPR');
    INSERT INTO Prices (TickerId, Value, Date) VALUES
        (1, 150.00, '2024-01-01'),
        (1, 152.34, '2024-01-02'),
        (2, 250.50, '2024-01-02');
    INSERT INTO TodaysConditions (TickerId, State) VALUES (1, 'UP');";

/// База живёт, пока жив `TempDir`
pub(crate) struct TestDb {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDb {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

fn create(sql: &str) -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stocks.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    drop(conn);

    TestDb { _dir: dir, path }
}

/// AAPL: 150.00 -> 152.34, UP; TSLA: 250.50 без состояния; NOPR без цен
pub(crate) fn scenario_db() -> TestDb {
    create(&format!("{SCHEMA_SQL}{SCENARIO_SQL}"))
}

/// Битая схема: таблицы Prices нет, любой запрос цены падает
pub(crate) fn db_without_prices() -> TestDb {
    create(
        "CREATE TABLE Tickers (Id INTEGER PRIMARY KEY, Symbol TEXT NOT NULL UNIQUE);
         INSERT INTO Tickers (Id, Symbol) VALUES (1, 'AAPL');",
    )
}
