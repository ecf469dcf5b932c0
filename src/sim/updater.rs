//! Simulated pending-dataset updater.
//!
//! Models the Thread pending-dataset exchange timeline: the dataset
//! activates once its migration delay elapses, then the updater observes
//! the check-wait settle window before reporting the terminal outcome.

use wpan_core::UpdateError;

use crate::entities::{DatasetUpdater, PendingDatasetInfo};

#[derive(Debug)]
struct Inflight {
    dataset: PendingDatasetInfo,
    activate_at_ms: u64,
    done_at_ms: u64,
    activated: bool,
}

/// Event reported by [`SimDatasetUpdater::poll`], routed by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdaterEvent {
    /// The pending dataset activated; the PAN switches to this channel.
    Activated(u8),
    /// Terminal outcome of the exchange.
    Completed(Result<(), UpdateError>),
}

#[derive(Debug, Default)]
pub struct SimDatasetUpdater {
    now_ms: u64,
    inflight: Option<Inflight>,
}

impl SimDatasetUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the updater's clock and pop the next due event, if any.
    /// Called by the runner at the top of every tick, before the entities.
    pub fn poll(&mut self, now_ms: u64) -> Option<UpdaterEvent> {
        self.now_ms = now_ms;

        let inflight = self.inflight.as_mut()?;

        if !inflight.activated && now_ms >= inflight.activate_at_ms {
            inflight.activated = true;
            return Some(UpdaterEvent::Activated(inflight.dataset.channel));
        }

        if now_ms >= inflight.done_at_ms {
            let inflight = self.inflight.take().expect("checked above");
            tracing::info!(
                "SimDatasetUpdater: update to channel {} completed",
                inflight.dataset.channel
            );
            return Some(UpdaterEvent::Completed(Ok(())));
        }

        None
    }
}

impl DatasetUpdater for SimDatasetUpdater {
    fn request_update(
        &mut self,
        dataset: PendingDatasetInfo,
        check_wait_ms: u64,
    ) -> Result<(), UpdateError> {
        if self.inflight.is_some() {
            return Err(UpdateError::Busy);
        }

        tracing::info!(
            "SimDatasetUpdater: pending dataset queued: channel {}, delay {} ms",
            dataset.channel,
            dataset.delay_ms
        );

        self.inflight = Some(Inflight {
            activate_at_ms: self.now_ms + dataset.delay_ms,
            done_at_ms: self.now_ms + dataset.delay_ms + check_wait_ms,
            activated: false,
            dataset,
        });

        Ok(())
    }

    fn cancel_update(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            tracing::info!(
                "SimDatasetUpdater: canceled update to channel {}",
                inflight.dataset.channel
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_timeline() {
        let mut updater = SimDatasetUpdater::new();
        assert_eq!(updater.poll(0), None);

        let dataset = PendingDatasetInfo {
            channel: 15,
            delay_ms: 120_000,
        };
        updater.request_update(dataset, 30_000).unwrap();

        // A second request while one is in flight is refused.
        assert_eq!(
            updater.request_update(dataset, 30_000),
            Err(UpdateError::Busy)
        );

        assert_eq!(updater.poll(119_999), None);
        assert_eq!(updater.poll(120_000), Some(UpdaterEvent::Activated(15)));
        assert_eq!(updater.poll(130_000), None);
        assert_eq!(updater.poll(150_000), Some(UpdaterEvent::Completed(Ok(()))));
        assert_eq!(updater.poll(151_000), None);
    }

    #[test]
    fn test_cancel_drops_inflight() {
        let mut updater = SimDatasetUpdater::new();
        updater
            .request_update(
                PendingDatasetInfo {
                    channel: 15,
                    delay_ms: 120_000,
                },
                30_000,
            )
            .unwrap();

        updater.cancel_update();
        assert_eq!(updater.poll(1_000_000), None);

        // The slot is free again.
        updater
            .request_update(
                PendingDatasetInfo {
                    channel: 20,
                    delay_ms: 120_000,
                },
                30_000,
            )
            .unwrap();
    }
}
