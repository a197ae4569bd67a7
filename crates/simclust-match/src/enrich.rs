//! Bounded fan-out of record lookups, gathered back into input order.

use std::future::Future;

use futures::StreamExt;
use futures::stream;
use simclust_core::{Record, Resolution};
use tracing::info;

/// Resolve every record with at most `concurrency` lookups in flight.
///
/// `resolve` runs once per record; its failures must already be folded into
/// the returned [`Resolution`], so this stage never drops or aborts: exactly
/// one resolution comes back per input record. Lookups complete in whatever
/// order the network allows; results are gathered into a slot per input
/// position and read out in input order.
///
/// A `concurrency` of zero is clamped to one; unbounded fan-out is not an
/// option here, the remote service meters per-caller throughput.
pub async fn enrich<F, Fut>(records: Vec<Record>, concurrency: usize, resolve: F) -> Vec<Resolution>
where
    F: Fn(Record) -> Fut,
    Fut: Future<Output = Resolution>,
{
    let concurrency = concurrency.max(1);
    let total = records.len();
    info!(records = total, concurrency, "enriching batch");

    let mut slots: Vec<Option<Resolution>> = (0..total).map(|_| None).collect();

    let mut done = stream::iter(records.into_iter().enumerate())
        .map(|(slot, record)| {
            let fut = resolve(record);
            async move { (slot, fut.await) }
        })
        .buffer_unordered(concurrency);

    while let Some((slot, resolution)) = done.next().await {
        slots[slot] = Some(resolution);
    }

    info!(records = total, "batch enriched");
    slots.into_iter().flatten().collect()
}
