//! Composite news source.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{NewsItem, NewsProvider, ProviderError};

/// Merges a primary headline source with a supplementary one.
///
/// The supplement is only queried when the primary returns fewer than
/// `max_items`. Supplement items whose title is already present are skipped;
/// the primary list is kept as returned.
pub struct CompositeNewsProvider {
    primary: Arc<dyn NewsProvider>,
    supplement: Arc<dyn NewsProvider>,
}

impl CompositeNewsProvider {
    pub fn new(primary: Arc<dyn NewsProvider>, supplement: Arc<dyn NewsProvider>) -> Self {
        Self { primary, supplement }
    }
}

fn fetch_or_empty(
    source: &str,
    code: &str,
    result: Result<Vec<NewsItem>, ProviderError>,
) -> Vec<NewsItem> {
    result.unwrap_or_else(|e| {
        warn!(provider = source, code = %code, error = %e, "News source failed");
        Vec::new()
    })
}

#[async_trait]
impl NewsProvider for CompositeNewsProvider {
    fn name(&self) -> &'static str {
        "composite"
    }

    async fn collect_news(
        &self,
        name: &str,
        code: &str,
        max_items: usize,
    ) -> Result<Vec<NewsItem>, ProviderError> {
        let mut items = fetch_or_empty(
            self.primary.name(),
            code,
            self.primary.collect_news(name, code, max_items).await,
        );

        if items.len() < max_items {
            let extra = fetch_or_empty(
                self.supplement.name(),
                code,
                self.supplement.collect_news(name, code, max_items).await,
            );
            let mut seen: HashSet<String> = items.iter().map(|i| i.title.clone()).collect();
            for item in extra {
                if items.len() >= max_items {
                    break;
                }
                if seen.insert(item.title.clone()) {
                    items.push(item);
                }
            }
        }

        items.truncate(max_items);

        debug!(code = %code, count = items.len(), "News collected");
        Ok(items)
    }
}
