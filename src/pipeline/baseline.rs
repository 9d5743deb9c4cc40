//! Baseline variant without a signal bus
//!
//! Producer and consumer share only the queue; completion is simply joining
//! both tasks. No pause, no resume, no terminate.

use log::{debug, info};

use crate::error::{PcbusError, Result};
use crate::pipeline::queue;

/// Produce `1..=total` through a queue of `capacity` and return what was consumed
pub async fn run_baseline(capacity: usize, total: u64) -> Result<Vec<u64>> {
    if total == 0 {
        return Err(PcbusError::InvalidConfig("total must be positive".to_string()));
    }
    let (mut writer, mut reader) = queue::bounded(capacity)?;
    info!("baseline: capacity={} total={}", capacity, total);

    let producer = tokio::spawn(async move {
        for num in 1..=total {
            debug!("baseline producer: {} -> queue", num);
            writer.push(num).await?;
        }
        writer.close();
        Ok::<_, PcbusError>(())
    });

    let consumer = tokio::spawn(async move {
        let mut consumed = Vec::new();
        while let Some(num) = reader.pop().await {
            debug!("baseline consumer: queue -> {}", num);
            consumed.push(num);
        }
        consumed
    });

    let (produced, consumed) = tokio::try_join!(producer, consumer)?;
    produced?;
    info!("baseline: done");
    Ok(consumed)
}
