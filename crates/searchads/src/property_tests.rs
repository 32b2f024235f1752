//! Property-based tests for searchads
//!
//! Checks the pagination engines and the retry schedule against randomly
//! generated page layouts and attempt counts.

use crate::error::Result;
use crate::pagination::{collect_all_offset_paginated, collect_all_selector_paginated};
use proptest::prelude::*;
use searchads_core::retry::BackoffStrategy;
use searchads_protocol::{PageDetail, Pagination, Selector};
use searchads_transport::RetryPolicy;
use std::time::Duration;

// ===== Strategy Generators =====

fn arb_page_size() -> impl Strategy<Value = i64> {
    1i64..50
}

fn arb_total() -> impl Strategy<Value = i64> {
    0i64..500
}

/// Serve `total` items in pages of at most `limit`, like the server.
fn serve(total: i64, limit: i64, offset: i64, report_total: bool) -> (Vec<i64>, Option<PageDetail>) {
    let end = (offset + limit).min(total);
    let items = (offset..end.max(offset)).collect();
    let page = report_total.then_some(PageDetail {
        total_results: total,
        start_index: offset,
        items_per_page: limit,
    });
    (items, page)
}

proptest! {
    /// Property: offset pagination returns every item exactly once, in order
    #[test]
    fn prop_offset_collects_everything(
        total in arb_total(),
        limit in arb_page_size(),
        report_total in any::<bool>(),
    ) {
        let mut calls = 0i64;
        let result: Result<Vec<i64>> = tokio_test::block_on(collect_all_offset_paginated(
            limit,
            0,
            |limit, offset| {
                calls += 1;
                let page = serve(total, limit, offset, report_total);
                async move { Ok(page) }
            },
        ));

        let items = result.unwrap();
        prop_assert_eq!(items, (0..total).collect::<Vec<_>>());

        // Never more than one page past the data.
        let full_pages = total / limit;
        prop_assert!(calls <= full_pages + 1);
        prop_assert!(calls >= 1);
    }

    /// Property: selector pagination never touches the caller's selector
    #[test]
    fn prop_selector_left_untouched(
        total in arb_total(),
        limit in arb_page_size(),
        preset in any::<bool>(),
    ) {
        let selector = if preset {
            Selector::new().with_pagination(Pagination::new(0, limit))
        } else {
            Selector::new()
        };
        let before = selector.clone();

        let result: Result<Vec<i64>> = tokio_test::block_on(collect_all_selector_paginated(
            &selector,
            limit,
            |page: Selector| {
                let window = page.pagination.unwrap_or_default();
                let served = serve(total, window.limit, window.offset, true);
                async move { Ok(served) }
            },
        ));

        prop_assert_eq!(result.unwrap().len() as i64, total);
        prop_assert_eq!(selector, before);
    }

    /// Property: backoff never exceeds the cap and never shrinks
    #[test]
    fn prop_backoff_is_capped_and_monotonic(attempt in 0u32..64) {
        let policy = RetryPolicy::default();
        let current = policy.backoff(attempt);
        let next = policy.backoff(attempt + 1);

        prop_assert!(current >= Duration::from_secs(2));
        prop_assert!(current <= Duration::from_secs(16));
        prop_assert!(next >= current);
        prop_assert_eq!(policy.max_attempts(), 5);
    }
}
