//! Fetch pipeline: paginated retrieval from the upstream
//! product-search API, with backpressure via `page_fetch_delay` and
//! cancellation between every page.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{NotifyError, NotifyResult};
use crate::fetcher::Fetcher;

use super::model::{NaverItem, NaverSearchResponse};
use super::settings::CommandSettings;

const SEARCH_ENDPOINT: &str = "https://openapi.naver.com/v1/search/shop.json";
const PAGE_SIZE: u64 = 100;
const MAX_ITEMS: u64 = 1000;

/// Fetch every page of results for `settings.query`, honoring cancellation
/// between pages and between the inter-page delay.
pub async fn fetch_all(
    fetcher: &dyn Fetcher,
    client_id: &str,
    client_secret: &str,
    settings: &CommandSettings,
    cancel: &CancellationToken,
) -> NotifyResult<Vec<NaverItem>> {
    let headers = [
        ("X-Naver-Client-Id", client_id),
        ("X-Naver-Client-Secret", client_secret),
    ];

    let mut items = Vec::new();
    let mut start_index: u64 = 1;
    let mut target_fetch_count: Option<u64> = None;

    loop {
        if cancel.is_cancelled() {
            return Err(NotifyError::Canceled);
        }

        let query = [
            ("query", settings.query.clone()),
            ("start", start_index.to_string()),
            ("display", PAGE_SIZE.to_string()),
            ("sort", "sim".to_string()),
        ];

        let raw = fetcher
            .fetch_json(SEARCH_ENDPOINT, &headers, &query, cancel)
            .await?;
        let page: NaverSearchResponse = crate::fetcher::decode(raw)?;

        let target = *target_fetch_count.get_or_insert_with(|| page.total.min(MAX_ITEMS));

        items.extend(page.items);

        if items.len() as u64 >= target || page.items_is_empty_marker() {
            break;
        }

        start_index += PAGE_SIZE;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(NotifyError::Canceled),
            _ = tokio::time::sleep(settings.page_fetch_delay) => {}
        }
    }

    Ok(items)
}

impl NaverSearchResponse {
    /// Paginated fetches stop once a page comes back with no items, even if
    /// the running total hasn't yet reached `target_fetch_count` — the
    /// upstream API's `total` can overcount relative to what it will
    /// actually serve.
    fn items_is_empty_marker(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parse and filter one raw item: strip HTML from the title, apply the
/// keyword matcher, parse the price, and retain only items strictly under
/// the configured threshold. Parse failures are logged and dropped rather
/// than aborting the whole run.
pub fn parse_and_filter(
    raw: Vec<NaverItem>,
    settings: &CommandSettings,
) -> Vec<super::model::Product> {
    let mut out = Vec::new();
    for item in raw {
        let title = crate::strings::strip_html_tags(&item.title);

        if !crate::strings::keyword_matches(
            &title,
            &settings.filters.included_keywords,
            &settings.filters.excluded_keywords,
        ) {
            continue;
        }

        let price = match crate::strings::parse_comma_int(&item.lprice) {
            Some(p) => p,
            None => {
                warn!(lprice = %item.lprice, product_id = %item.product_id, "dropping item with unparseable price");
                continue;
            }
        };

        if !(price > 0 && price < settings.filters.price_less_than) {
            continue;
        }

        out.push(super::model::Product {
            product_id: item.product_id,
            product_type: item.product_type,
            title,
            link: item.link,
            low_price: price,
            mall_name: item.mall_name,
        });
    }
    out
}
