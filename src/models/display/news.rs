//! News display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::NewsArticleDto;
use crate::output::formatters::format_timestamp_local;

/// Longest headline shown in a table cell
const MAX_HEADLINE: usize = 70;

/// News article display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct NewsDisplay {
    #[tabled(rename = "PUBLISHED")]
    pub published: String,

    #[tabled(rename = "SOURCE")]
    pub source: String,

    #[tabled(rename = "HEADLINE")]
    pub headline: String,

    #[tabled(rename = "RELATED")]
    pub related: String,

    #[tabled(skip)]
    pub url: String,
}

/// Truncate on a character boundary, adding "..." if truncated
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

impl From<NewsArticleDto> for NewsDisplay {
    fn from(article: NewsArticleDto) -> Self {
        Self {
            published: format_timestamp_local(article.datetime),
            source: article.source,
            headline: truncate(&article.headline, MAX_HEADLINE),
            related: if article.related.is_empty() {
                "--".to_string()
            } else {
                article.related
            },
            url: article.url,
        }
    }
}
