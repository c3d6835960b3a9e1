use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};

use crate::calendar::{
    error::FetchError,
    provider::{EventFeed, FeedResult, RowExtractor},
    types::RawRow,
};
use crate::error::AppError;

pub const DEFAULT_FEED_URL: &str = "https://sa.investing.com/economic-calendar";

/// The calendar page refuses requests without a browser-like agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches a calendar page over HTTP and hands the body to a [`RowExtractor`].
#[derive(Clone)]
pub struct HttpFeedClient {
    url: String,
    http: Client,
    extractor: Arc<dyn RowExtractor>,
}

impl HttpFeedClient {
    pub fn new(
        url: String,
        timeout: Duration,
        extractor: Arc<dyn RowExtractor>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;

        Ok(Self { url, http, extractor })
    }

    /// Client for the investing.com calendar markup.
    pub fn investing(url: String, timeout: Duration) -> Result<Self, AppError> {
        Self::new(url, timeout, Arc::new(InvestingRowExtractor::new()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventFeed for HttpFeedClient {
    async fn fetch(&self) -> FeedResult<Vec<RawRow>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|err| FetchError::unreachable(err.to_string()))?;

        tracing::info!("Calendar responded with HTTP {}", response.status());

        if response.status() != StatusCode::OK {
            return Err(FetchError::BadStatus {
                code: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::body(err.to_string()))?;

        let rows = self.extractor.extract(&body);
        tracing::info!("Found {} event rows", rows.len());
        Ok(rows)
    }

    fn feed_name(&self) -> &str {
        &self.url
    }
}

/// Row extractor for the investing.com economic calendar table.
pub struct InvestingRowExtractor {
    row: Selector,
    flag_cell: Selector,
    flag: Selector,
    time: Selector,
    title: Selector,
    impact: Selector,
}

/// Class tokens on the flag cell that never name a country.
const FLAG_LAYOUT_CLASSES: &[&str] = &["left", "flagCur", "noWrap", "ceFlags"];

impl InvestingRowExtractor {
    pub fn new() -> Self {
        Self {
            row: selector("tr.js-event-item"),
            flag_cell: selector("td.flagCur"),
            flag: selector("span"),
            time: selector("td.time"),
            title: selector("td.event"),
            impact: selector("td.sentiment"),
        }
    }

    fn extract_row(&self, row: ElementRef<'_>) -> RawRow {
        let flag_cell = row.select(&self.flag_cell).next();

        RawRow {
            region: flag_cell.and_then(|cell| self.region_of(cell)),
            time: row.select(&self.time).next().map(cell_text),
            title: row.select(&self.title).next().map(cell_text),
            impact: row.select(&self.impact).next().map(|cell| {
                let text = cell_text(cell);
                if text.is_empty() {
                    cell.value().attr("title").unwrap_or_default().trim().to_string()
                } else {
                    text
                }
            }),
        }
    }

    /// The country class token on the flag (`ceFlags United_States`), then
    /// its `data-img_key`, then its `title`, then a class token on the cell.
    ///
    /// Titles are localized on non-English editions, so they come last.
    fn region_of(&self, cell: ElementRef<'_>) -> Option<String> {
        let flag = cell.select(&self.flag).next();

        if let Some(token) = flag.and_then(country_class) {
            return Some(token);
        }

        let attr = |name: &str| {
            flag.and_then(|f| f.value().attr(name))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        attr("data-img_key")
            .or_else(|| attr("title"))
            .or_else(|| country_class(cell))
    }
}

/// First class token that is not part of the flag cell's layout.
fn country_class(el: ElementRef<'_>) -> Option<String> {
    el.value()
        .classes()
        .find(|class| !FLAG_LAYOUT_CLASSES.contains(class))
        .map(str::to_string)
}

impl Default for InvestingRowExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RowExtractor for InvestingRowExtractor {
    fn extract(&self, body: &str) -> Vec<RawRow> {
        let document = Html::parse_document(body);
        document
            .select(&self.row)
            .map(|row| self.extract_row(row))
            .collect()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector should be valid")
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
