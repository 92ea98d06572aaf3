use std::fmt;

/// Последняя цена тикера и (опционально) его дневное состояние.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Символ в верхнем регистре
    pub symbol: String,
    /// Значение из самой свежей записи цены
    pub price: f64,
    /// Дневное состояние от анализатора (например `UP`)
    pub condition: Option<String>,
}

impl fmt::Display for Quote {
    /// `AAPL: $152.34 (UP)`; пустое состояние не выводится
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ${:.2}", self.symbol, self.price)?;
        match self.condition.as_deref() {
            Some(c) if !c.is_empty() => write!(f, " ({c})"),
            _ => Ok(()),
        }
    }
}

/// Результат одного поиска тикера.
///
/// "Нет такого тикера" и "хранилище недоступно" - разные варианты,
/// чтобы их можно было различить и в логах, и на проводе.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Цена найдена
    Found(Quote),
    /// Тикера нет или у него нет ни одной цены
    NotFound {
        /// Запрошенный символ
        symbol: String,
    },
    /// Хранилище вернуло ошибку
    StoreError {
        /// Запрошенный символ
        symbol: String,
        /// Текст ошибки для логов
        detail: String,
    },
}

impl LookupOutcome {
    /// Символ, по которому выполнялся поиск
    pub fn symbol(&self) -> &str {
        match self {
            LookupOutcome::Found(q) => &q.symbol,
            LookupOutcome::NotFound { symbol } => symbol,
            LookupOutcome::StoreError { symbol, .. } => symbol,
        }
    }

    /// Найдена ли цена
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

impl fmt::Display for LookupOutcome {
    /// Строка ответа для клиента (без `\n`). `detail` на провод не попадает.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::Found(q) => q.fmt(f),
            LookupOutcome::NotFound { symbol } => {
                write!(f, "Ticker '{symbol}' not found in database")
            }
            LookupOutcome::StoreError { symbol, .. } => {
                write!(f, "Ticker '{symbol}' lookup failed: store unavailable")
            }
        }
    }
}

/// Строка листинга доступных тикеров.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSummary {
    /// Символ тикера
    pub symbol: String,
    /// Последняя цена, если есть
    pub last_price: Option<f64>,
    /// Дневное состояние, если есть
    pub condition: Option<String>,
}

impl fmt::Display for TickerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_price {
            Some(p) => write!(f, "{:<6} - ${:.2}", self.symbol, p)?,
            None => write!(f, "{:<6} - no data", self.symbol)?,
        }
        match self.condition.as_deref() {
            Some(c) if !c.is_empty() => write!(f, " [{c}]"),
            _ => Ok(()),
        }
    }
}
