// crates/gateway-transport/src/bulk.rs
// ============================================================================
// Module: Bulk Fan-out
// Description: Bounded-parallel execution of per-item gateway calls.
// Purpose: Run one async operation per input item with a concurrency cap
//          and deliver exactly one response envelope per item.
// Dependencies: gateway-core, tokio, tokio-util
// ============================================================================

//! ## Overview
//! [`bulk_invoke`] spawns one task per item behind a shared semaphore, then
//! drains the join set. A task that panics or is aborted still yields a
//! fabricated technical-error envelope for its item, so callers can zip
//! the output against the input without length checks.
//! Invariants:
//! - The output has exactly one entry per input item, in input order.
//! - At most `max_parallel` operations run concurrently.
//! - Cancellation converts every unfinished item into a technical error,
//!   never a missing entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use gateway_core::GatewayResponse;
use gateway_core::RequestId;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

// ============================================================================
// SECTION: Fan-out
// ============================================================================

/// Runs `op` once per item with at most `max_parallel` in flight.
///
/// Every item is paired with the envelope its task produced. Items whose
/// task panicked, was cancelled, or never acquired a permit are paired
/// with a fabricated technical error carrying the parent correlation id.
pub async fn bulk_invoke<I, T, F, Fut>(
    items: Vec<I>,
    max_parallel: usize,
    cancel: &CancellationToken,
    parent_id: &RequestId,
    source: &str,
    op: F,
) -> Vec<(I, GatewayResponse<T>)>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GatewayResponse<T>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let op = Arc::new(op);
    let mut join_set = JoinSet::new();
    let mut pending: HashMap<tokio::task::Id, usize> = HashMap::with_capacity(items.len());

    for (index, item) in items.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let op = Arc::clone(&op);
        let cancel = cancel.clone();
        let handle = join_set.spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return None;
            };
            if cancel.is_cancelled() {
                return None;
            }
            Some(op(item).await)
        });
        pending.insert(handle.id(), index);
    }

    let mut slots: Vec<Option<GatewayResponse<T>>> = Vec::with_capacity(items.len());
    slots.resize_with(items.len(), || None);

    while let Some(joined) = join_set.join_next_with_id().await {
        match joined {
            Ok((task_id, outcome)) => {
                if let Some(index) = pending.remove(&task_id) {
                    slots[index] = outcome;
                }
            }
            Err(join_error) => {
                let task_id = join_error.id();
                if join_error.is_panic() {
                    warn!(source, error = %join_error, "bulk sub-call panicked");
                }
                // The slot stays empty and is backfilled below.
                pending.remove(&task_id);
            }
        }
    }

    items
        .into_iter()
        .zip(slots)
        .map(|(item, slot)| {
            let response = slot.unwrap_or_else(|| {
                GatewayResponse::technical_error(
                    parent_id.clone(),
                    source,
                    500,
                    "sub-call did not complete",
                )
            });
            (item, response)
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use gateway_core::GatewayResponse;
    use gateway_core::GatewayStatus;
    use gateway_core::RequestId;
    use tokio_util::sync::CancellationToken;

    use super::bulk_invoke;

    fn parent() -> RequestId {
        RequestId::from_caller("bulk-test-parent").unwrap()
    }

    #[tokio::test]
    async fn yields_one_response_per_item_in_order() {
        let items: Vec<u32> = (0..12).collect();
        let parent = parent();
        let cancel = CancellationToken::new();
        let results = bulk_invoke(items.clone(), 4, &cancel, &parent, "srp", move |n| {
            let id = RequestId::from_caller("bulk-test-sub").unwrap();
            async move { GatewayResponse::success(id, "srp", n * 2) }
        })
        .await;
        assert_eq!(results.len(), items.len());
        for (expected, (item, response)) in items.iter().zip(&results) {
            assert_eq!(item, expected);
            assert_eq!(response.data, Some(expected * 2));
        }
    }

    #[tokio::test]
    async fn respects_the_concurrency_cap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let items: Vec<u32> = (0..20).collect();
        let parent = parent();
        let cancel = CancellationToken::new();
        let in_flight_op = Arc::clone(&in_flight);
        let peak_op = Arc::clone(&peak);
        let results = bulk_invoke(items, 3, &cancel, &parent, "srp", move |n| {
            let in_flight = Arc::clone(&in_flight_op);
            let peak = Arc::clone(&peak_op);
            let id = RequestId::from_caller("bulk-test-sub").unwrap();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                GatewayResponse::success(id, "srp", n)
            }
        })
        .await;
        assert_eq!(results.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn panicking_sub_call_becomes_a_technical_error() {
        let items = vec![1_u32, 2, 3];
        let parent = parent();
        let cancel = CancellationToken::new();
        let results = bulk_invoke(items, 2, &cancel, &parent, "rdo", move |n| {
            let id = RequestId::from_caller("bulk-test-sub").unwrap();
            async move {
                assert!(n != 2, "boom");
                GatewayResponse::success(id, "rdo", n)
            }
        })
        .await;
        assert_eq!(results.len(), 3);
        let failed = results.iter().find(|(item, _)| *item == 2).unwrap();
        assert_eq!(failed.1.status, GatewayStatus::TechnicalError);
        assert!(results.iter().filter(|(_, r)| r.is_success()).count() == 2);
    }

    #[tokio::test]
    async fn cancellation_fills_remaining_items_with_errors() {
        let items: Vec<u32> = (0..8).collect();
        let parent = parent();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let results = bulk_invoke(items, 2, &cancel, &parent, "srp", move |n| {
            let id = RequestId::from_caller("bulk-test-sub").unwrap();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                GatewayResponse::success(id, "srp", n)
            }
        })
        .await;
        assert_eq!(results.len(), 8);
        assert!(
            results
                .iter()
                .all(|(_, r)| r.status == GatewayStatus::TechnicalError)
        );
    }
}
