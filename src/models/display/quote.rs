//! Quote display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::StockPriceDto;
use crate::output::formatters::{format_change, format_change_percent, format_price, format_volume};

/// Stock quote display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct QuoteDisplay {
    #[tabled(rename = "SYMBOL")]
    pub symbol: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "PRICE")]
    pub price: String,

    #[tabled(rename = "CHANGE")]
    pub change: String,

    #[tabled(rename = "CHANGE %")]
    pub change_percent: String,

    #[tabled(rename = "VOLUME")]
    pub volume: String,

    /// Raw change, used for colouring in pretty output
    #[tabled(skip)]
    #[serde(skip)]
    pub direction: f64,
}

impl From<&StockPriceDto> for QuoteDisplay {
    fn from(quote: &StockPriceDto) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            name: if quote.name.is_empty() {
                "--".to_string()
            } else {
                quote.name.clone()
            },
            price: format_price(quote.current_price, &quote.currency),
            change: format_change(quote.price_change),
            change_percent: format_change_percent(quote.price_change_percent),
            volume: format_volume(quote.volume),
            direction: quote.price_change,
        }
    }
}

impl From<StockPriceDto> for QuoteDisplay {
    fn from(quote: StockPriceDto) -> Self {
        QuoteDisplay::from(&quote)
    }
}
