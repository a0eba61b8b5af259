//! Search results page -> ordered job identifiers.

use scraper::{Html, Selector};
use std::sync::Arc;

use crate::dispatcher::Transport;
use crate::models::{JobId, Query};
use crate::progress::SharedSink;
use crate::utils::{encode_spaces, preview};

const ENTITY_ATTR: &str = "data-entity-urn";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListingScan {
    /// Every `<li>` on the page, job card or not
    pub item_count: usize,
    pub ids: Vec<JobId>,
}

/// Walk a listing body in document order.
///
/// Only `<li>` nodes holding a `div.base-card` with a `data-entity-urn`
/// of at least four `:`-separated segments yield an identifier; everything
/// else on the page (promoted slots, separators) is skipped. Repeats are kept.
pub fn scan_listing(html: &str) -> ListingScan {
    let document = Html::parse_document(html);

    let (Ok(item_sel), Ok(card_sel)) = (Selector::parse("li"), Selector::parse("div.base-card"))
    else {
        return ListingScan::default();
    };

    let mut scan = ListingScan::default();
    for item in document.select(&item_sel) {
        scan.item_count += 1;

        let id = item
            .select(&card_sel)
            .next()
            .and_then(|card| card.value().attr(ENTITY_ATTR))
            .and_then(|urn| urn.split(':').nth(3));

        if let Some(id) = id.filter(|id| !id.is_empty()) {
            scan.ids.push(id.to_string());
        }
    }
    scan
}

pub fn extract_job_ids(html: &str) -> Vec<JobId> {
    scan_listing(html).ids
}

pub struct ListingResolver<T: Transport> {
    transport: Arc<T>,
    endpoint: String,
    progress: SharedSink,
}

impl<T: Transport> ListingResolver<T> {
    pub fn new(transport: Arc<T>, endpoint: impl Into<String>, progress: SharedSink) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            progress,
        }
    }

    pub fn listing_url(&self, query: &Query) -> String {
        format!(
            "{}?keywords={}&location={}&start={}",
            self.endpoint,
            encode_spaces(&query.title),
            encode_spaces(&query.location),
            query.start_offset
        )
    }

    /// Resolve one listing page. Any fetch failure reads as "no results".
    pub async fn resolve(&self, query: &Query) -> Vec<JobId> {
        let url = self.listing_url(query);
        self.progress.info(&format!("Searching URL: {}", url));

        let response = match self.transport.fetch(&url).await {
            Ok(response) => response,
            Err(e) => {
                self.progress.error(&format!("Error fetching job listings: {}", e));
                return Vec::new();
            }
        };

        self.progress.info(&format!("Response status: {}", response.status));
        self.progress
            .info(&format!("Response preview: {}", preview(&response.body, 100)));

        let response = match response.into_success() {
            Ok(response) => response,
            Err(e) => {
                self.progress.error(&format!("Error fetching job listings: {}", e));
                return Vec::new();
            }
        };

        let scan = scan_listing(&response.body);
        self.progress
            .info(&format!("Found {} job listings on page", scan.item_count));
        for id in &scan.ids {
            self.progress.debug(&format!("Found job ID: {}", id));
        }

        scan.ids
    }
}
