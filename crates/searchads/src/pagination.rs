//! Auto-pagination over list and `/find` endpoints
//!
//! Both engines call a caller-supplied fetch closure once per page, strictly
//! in increasing offset order, and stop on an empty page, on reaching the
//! server's reported total, or on a short page when no total is reported.
//! The first fetch error is returned as-is and the pages gathered so far are
//! dropped.

use crate::error::{Error, Result};
use crate::observability::log_page;
use searchads_protocol::{PageDetail, Pagination, Selector};
use std::future::Future;
use tracing::warn;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: i64 = 1000;

/// Fetch every page of an offset/limit listing.
///
/// `fetch` is called as `fetch(limit, offset)`. A `page_size` of zero or less
/// selects [`DEFAULT_PAGE_SIZE`].
///
/// # Example
///
/// ```rust,no_run
/// # use searchads::{Client, pagination::collect_all_offset_paginated};
/// # async fn example(client: Client) -> searchads::Result<()> {
/// let campaigns: Vec<serde_json::Value> = collect_all_offset_paginated(0, 0, |limit, offset| {
///     let client = client.clone();
///     async move { client.get_list("/campaigns", limit, offset).await }
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn collect_all_offset_paginated<T, F, Fut>(
    page_size: i64,
    start_offset: i64,
    fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<PageDetail>)>>,
{
    let limit = if page_size > 0 {
        page_size
    } else {
        DEFAULT_PAGE_SIZE
    };
    drive(limit, start_offset, fetch).await
}

/// Fetch every page of a `/find` search.
///
/// The starting offset comes from `selector.pagination`, or zero when unset.
/// The limit is the selector's own when positive, otherwise `page_size`, or
/// [`DEFAULT_PAGE_SIZE`] when that is not positive either. Each
/// page is requested with its own copy of the selector, so the caller's value
/// is never modified.
///
/// # Errors
///
/// Returns [`Error::InvalidPageSize`] before any fetch when the resolved
/// limit is zero or negative.
pub async fn collect_all_selector_paginated<T, F, Fut>(
    selector: &Selector,
    page_size: i64,
    mut fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(Selector) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<PageDetail>)>>,
{
    let preset = selector.pagination.unwrap_or_default();
    let limit = if preset.limit > 0 {
        preset.limit
    } else if page_size > 0 {
        page_size
    } else {
        DEFAULT_PAGE_SIZE
    };
    if limit <= 0 {
        return Err(Error::InvalidPageSize(limit));
    }

    drive(limit, preset.offset, |limit, offset| {
        let mut page = selector.clone();
        page.pagination = Some(Pagination::new(offset, limit));
        fetch(page)
    })
    .await
}

async fn drive<T, F, Fut>(limit: i64, mut offset: i64, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<PageDetail>)>>,
{
    let mut all = Vec::new();

    loop {
        let (items, page) = fetch(limit, offset).await?;
        let returned = items.len();
        let total = page.as_ref().and_then(PageDetail::total);
        log_page(offset, limit, returned, total);

        if returned == 0 {
            break;
        }
        let count = i64::try_from(returned).unwrap_or(i64::MAX);
        if count > limit {
            warn!(offset, limit, returned, "Server returned more items than requested");
        }
        all.extend(items);

        let done = match total {
            Some(total) => offset.saturating_add(count) >= total,
            None => count < limit,
        };
        if done {
            break;
        }
        offset = offset.saturating_add(count);
    }

    Ok(all)
}
