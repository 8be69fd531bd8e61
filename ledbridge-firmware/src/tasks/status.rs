//! Status task - periodic counter log

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::config::STATUS_INTERVAL_S;
use crate::stats;

/// Log bridge counters every [`STATUS_INTERVAL_S`] seconds
#[embassy_executor::task]
pub async fn status_task() {
    info!("Status task started");

    let mut ticker = Ticker::every(Duration::from_secs(STATUS_INTERVAL_S));
    let mut last = stats::snapshot();

    loop {
        ticker.next().await;

        let now = stats::snapshot();
        info!(
            "passes={} ({}/{}s) transactions={} stored={} dropped={}",
            now.passes,
            now.passes_since(&last),
            STATUS_INTERVAL_S,
            now.transactions,
            now.stored,
            now.dropped
        );
        debug!("sent={} bus_errors={}", now.sent, now.bus_errors);

        if now.bus_errors != last.bus_errors {
            warn!("{} new bus errors", now.bus_errors.wrapping_sub(last.bus_errors));
        }

        last = now;
    }
}
