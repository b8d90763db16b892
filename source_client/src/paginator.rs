use std::future::Future;

use crate::Error;
use crate::Page;

/// Drains a paged collection by requesting pages at increasing offsets until
/// the source-reported total is covered.
///
/// The `fetch_page` callback receives `(skip, limit)` and is expected to
/// honour the source-side ordering it was built with. An empty collection
/// (`total = 0`) issues exactly one page request. Any page failure aborts the
/// whole fetch; retrying is the source's business, not ours.
///
/// # Panics
///
/// Panics if `page_size` is null.
pub async fn fetch_all<F, Fut>(
    page_size: u64,
    mut fetch_page: F,
) -> Result<Vec<serde_json::Value>, Error>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Page, Error>>,
{
    assert!(page_size > 0);
    let mut items = Vec::new();
    let mut skip = 0;
    loop {
        let page = fetch_page(skip, page_size).await?;
        items.extend(page.items);
        if skip + page_size >= page.total {
            break;
        }
        skip += page_size;
    }
    Ok(items)
}
