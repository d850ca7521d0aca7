//! Stock search display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::StockDto;

/// Search result display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct StockDisplay {
    #[tabled(rename = "SYMBOL")]
    pub symbol: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "EXCHANGE")]
    pub exchange: String,

    #[tabled(rename = "TYPE")]
    pub kind: String,
}

fn or_dash(value: String) -> String {
    if value.is_empty() {
        "--".to_string()
    } else {
        value
    }
}

impl From<StockDto> for StockDisplay {
    fn from(stock: StockDto) -> Self {
        Self {
            symbol: stock.symbol,
            name: stock.name,
            exchange: or_dash(stock.exchange),
            kind: or_dash(stock.kind),
        }
    }
}
