//! Background worker that persists click events.
//!
//! Events arrive over a bounded channel from the redirect path and are
//! written in batches: one insert for the detail rows and one aggregated
//! in-place increment for the per-link counters. Persistence failures are
//! logged and the batch is dropped; the worker never feeds errors back
//! into redirects.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;
use crate::infrastructure::geoip::GeoResolver;

/// Upper bound on events drained per flush.
const MAX_BATCH: usize = 256;

/// Runs the click recording loop until the channel closes and drains.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    clicks: Arc<dyn ClickRepository>,
    geo: Arc<dyn GeoResolver>,
) {
    let mut buffer: Vec<ClickEvent> = Vec::with_capacity(MAX_BATCH);

    loop {
        let received = rx.recv_many(&mut buffer, MAX_BATCH).await;
        if received == 0 {
            // Zero means the channel is closed and fully drained
            break;
        }

        flush(&buffer, clicks.as_ref(), geo.as_ref()).await;
        buffer.clear();
    }

    info!("Click worker stopped");
}

/// Writes one batch: detail rows first, then aggregated counter bumps.
///
/// The two writes are independent. A failed detail insert does not stop
/// the counters from advancing, and vice versa.
async fn flush(events: &[ClickEvent], clicks: &dyn ClickRepository, geo: &dyn GeoResolver) {
    let mut rows = Vec::with_capacity(events.len());
    let mut bumps: HashMap<String, i64> = HashMap::new();

    for event in events {
        let country = event
            .ip
            .as_deref()
            .and_then(|ip| ip.parse().ok())
            .and_then(|ip| geo.country(ip));

        rows.push(NewClick {
            link_id: event.link_id,
            occurred_at: event.occurred_at,
            ip: event.ip.clone(),
            user_agent: event.user_agent.clone(),
            referer: event.referer.clone(),
            country,
        });

        *bumps.entry(event.code.clone()).or_insert(0) += 1;
    }

    let row_count = rows.len() as u64;
    match clicks.insert_clicks(rows).await {
        Ok(()) => {
            metrics::counter!("clicks_recorded_total").increment(row_count);
        }
        Err(e) => {
            warn!("Failed to record {} click rows, dropping batch: {}", row_count, e);
            metrics::counter!("clicks_dropped_total", "stage" => "insert").increment(row_count);
        }
    }

    let increments: Vec<(String, i64)> = bumps.into_iter().collect();
    if let Err(e) = clicks.bump_click_counts(increments).await {
        warn!("Failed to bump click counters: {}", e);
        metrics::counter!("clicks_dropped_total", "stage" => "bump").increment(row_count);
    }
}
