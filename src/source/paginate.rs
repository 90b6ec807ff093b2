//! Pagination accumulator.

use super::{ContentItem, ContentSource, Query, SourceError};
use crate::debug;

/// Load every item matching `query`, one page at a time.
///
/// Stops once the requested offset plus the page's item count reaches the
/// reported `total`, so a short page in the middle of a listing does not end
/// it early. An empty page before `total` also stops the load. The offset
/// advances by the page `limit` (or by the item count if the source reports
/// no limit) and never moves backwards. Any failed page aborts the load.
pub async fn load_all_items(
    source: &dyn ContentSource,
    query: &Query,
) -> Result<Vec<ContentItem>, SourceError> {
    let mut items: Vec<ContentItem> = Vec::new();
    let mut skip = 0usize;
    let mut fetches = 0usize;

    loop {
        let page = source.list_items(query, skip).await?;
        fetches += 1;

        let received = page.items.len();
        let room = page.total.saturating_sub(items.len());
        items.extend(page.items.into_iter().take(room));

        if skip + received >= page.total || items.len() >= page.total {
            break;
        }
        if received == 0 {
            debug!("fetch"; "empty page at offset {} before total {}, stopping", skip, page.total);
            break;
        }

        skip += if page.limit > 0 { page.limit } else { received };
    }

    debug!("fetch"; "{} items in {} page(s)", items.len(), fetches);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ItemPage, LocaleList};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Serves pre-built pages in order and records requested offsets.
    struct Scripted {
        pages: Mutex<Vec<Result<ItemPage, SourceError>>>,
        offsets: Mutex<Vec<usize>>,
    }

    impl Scripted {
        fn new(pages: Vec<Result<ItemPage, SourceError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                offsets: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ContentSource for Scripted {
        async fn list_items(&self, _query: &Query, skip: usize) -> Result<ItemPage, SourceError> {
            self.offsets.lock().push(skip);
            self.pages
                .lock()
                .pop()
                .unwrap_or_else(|| Err(SourceError::Unavailable("script exhausted".into())))
        }

        async fn get_item(&self, id: &str) -> Result<ContentItem, SourceError> {
            Err(SourceError::NotFound(id.to_string()))
        }

        async fn list_locales(&self) -> Result<LocaleList, SourceError> {
            Ok(LocaleList::default())
        }
    }

    fn page(range: std::ops::Range<usize>, skip: usize, limit: usize, total: usize) -> ItemPage {
        ItemPage {
            items: range.map(|i| json!({ "n": i })).collect(),
            skip,
            limit,
            total,
        }
    }

    fn numbers(items: &[ContentItem]) -> Vec<u64> {
        items.iter().filter_map(|i| i["n"].as_u64()).collect()
    }

    #[tokio::test]
    async fn test_three_pages() {
        let source = Scripted::new(vec![
            Ok(page(0..10, 0, 10, 25)),
            Ok(page(10..20, 10, 10, 25)),
            Ok(page(20..25, 20, 10, 25)),
        ]);

        let items = load_all_items(&source, &Query::new()).await.unwrap();
        assert_eq!(numbers(&items), (0..25).collect::<Vec<_>>());
        assert_eq!(*source.offsets.lock(), vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn test_short_middle_page() {
        let source = Scripted::new(vec![
            Ok(page(0..10, 0, 10, 25)),
            Ok(page(10..17, 10, 10, 25)),
            Ok(page(20..25, 20, 10, 25)),
        ]);

        let items = load_all_items(&source, &Query::new()).await.unwrap();
        assert_eq!(items.len(), 22);
        assert_eq!(*source.offsets.lock(), vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn test_single_page() {
        let source = Scripted::new(vec![Ok(page(0..3, 0, 100, 3))]);
        let items = load_all_items(&source, &Query::new()).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(source.offsets.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let source = Scripted::new(vec![Ok(page(0..0, 0, 100, 0))]);
        assert!(load_all_items(&source, &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_never_exceeds_total() {
        let source = Scripted::new(vec![Ok(page(0..5, 0, 5, 8)), Ok(page(5..12, 5, 5, 8))]);
        let items = load_all_items(&source, &Query::new()).await.unwrap();
        assert_eq!(numbers(&items), (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_stalled_source_terminates() {
        let source = Scripted::new(vec![Ok(page(0..0, 0, 0, 10))]);
        let items = load_all_items(&source, &Query::new()).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(source.offsets.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_page_with_limit_terminates() {
        let source = Scripted::new(vec![
            Ok(page(0..3, 0, 10, 25)),
            Ok(page(0..0, 0, 10, 25)),
            Ok(page(0..0, 0, 10, 25)),
        ]);
        let items = load_all_items(&source, &Query::new()).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(*source.offsets.lock(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_offset_ignores_reported_skip() {
        let source = Scripted::new(vec![
            Ok(page(0..10, 0, 10, 20)),
            Ok(page(10..20, 0, 10, 20)),
        ]);
        let items = load_all_items(&source, &Query::new()).await.unwrap();
        assert_eq!(numbers(&items), (0..20).collect::<Vec<_>>());
        assert_eq!(*source.offsets.lock(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_failed_page_propagates() {
        let source = Scripted::new(vec![
            Ok(page(0..10, 0, 10, 25)),
            Err(SourceError::Unavailable("503".into())),
        ]);
        let err = load_all_items(&source, &Query::new()).await.unwrap_err();
        assert_eq!(err, SourceError::Unavailable("503".into()));
        assert_eq!(source.offsets.lock().len(), 2);
    }
}
