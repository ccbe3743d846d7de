//! Track command - follow the beacon's broadcast

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Result;
use beacon_client::VehicleTracker;

use crate::output::OutputContext;

/// Print broadcast records until Ctrl+C or `count` records have arrived
pub async fn track(bind: SocketAddr, count: Option<u64>, ctx: &OutputContext) -> Result<()> {
    let tracker = VehicleTracker::bind(bind)?;
    ctx.info(&format!(
        "Listening for beacons on {} - press Ctrl+C to stop",
        tracker.local_addr()?
    ));
    ctx.print_track_header();

    let received = follow(&tracker, count, ctx, tokio::signal::ctrl_c()).await?;
    ctx.info(&format!("{} record(s) received", received));
    Ok(())
}

/// Print records until `stop` completes or `count` is reached
///
/// `stop` is polled across iterations, so a signal that arrives while a
/// record is being printed still ends the loop.
async fn follow<F>(
    tracker: &VehicleTracker,
    count: Option<u64>,
    ctx: &OutputContext,
    stop: F,
) -> Result<u64>
where
    F: Future,
{
    tokio::pin!(stop);

    let mut received = 0u64;
    while count.map_or(true, |n| received < n) {
        tokio::select! {
            result = tracker.recv() => {
                let (record, from) = result?;
                ctx.print_record(&record, from);
                received += 1;
            }
            _ = &mut stop => break,
        }
    }
    Ok(received)
}
