//! Channel-selection policy: picks the cleanest candidate out of the
//! monitor's occupancy table and decides whether moving there is worth a
//! network-wide migration.

use wpan_core::StackError;

use super::{
    ChannelManager, StationServices, CCA_FAILURE_RATE_THRESHOLD, MIN_MONITOR_SAMPLE_COUNT,
    THRESHOLD_TO_CHANGE_CHANNEL, THRESHOLD_TO_SKIP_FAVORED,
};

impl ChannelManager {
    /// Run the selection policy and, when a sufficiently cleaner channel
    /// exists, kick off a migration to it.
    ///
    /// Errors: `InvalidState` when the mesh layer is disabled or the
    /// monitor has too few samples, `NotFound` when no candidate exists.
    /// A healthy CCA failure rate (unless `skip_quality_check`) and an
    /// improvement below the change threshold both return success without
    /// migrating.
    pub fn request_channel_select(
        &mut self,
        now_ms: u64,
        svc: &mut dyn StationServices,
        skip_quality_check: bool,
    ) -> Result<(), StackError> {
        tracing::info!(
            "ChannelManager: Request to select channel (skip quality check: {})",
            if skip_quality_check { "yes" } else { "no" }
        );

        let result = self.channel_select(now_ms, svc, skip_quality_check);

        if let Err(err) = result {
            tracing::info!(
                "ChannelManager: Request to select better channel failed, error: {}",
                err
            );
        }

        result
    }

    fn channel_select(
        &mut self,
        now_ms: u64,
        svc: &mut dyn StationServices,
        skip_quality_check: bool,
    ) -> Result<(), StackError> {
        if svc.mesh().is_disabled() {
            return Err(StackError::InvalidState);
        }

        if !skip_quality_check && !self.should_attempt_channel_change(svc) {
            return Ok(());
        }

        let (new_channel, new_occupancy) = self.find_better_channel(svc)?;

        let cur_channel = svc.mac().pan_channel();
        let cur_occupancy = svc.monitor().channel_occupancy(cur_channel);

        if new_channel == cur_channel {
            tracing::info!(
                "ChannelManager: Already on best possible channel {}",
                cur_channel
            );
            return Ok(());
        }

        tracing::info!(
            "ChannelManager: Cur channel {}, occupancy 0x{:04x} - Best channel {}, occupancy 0x{:04x}",
            cur_channel,
            cur_occupancy,
            new_channel,
            new_occupancy
        );

        // Migrate only when the improvement clears the hysteresis threshold.
        if new_occupancy >= cur_occupancy
            || (cur_occupancy - new_occupancy) < THRESHOLD_TO_CHANGE_CHANNEL
        {
            tracing::info!("ChannelManager: Occupancy rate diff too small to change channel");
            return Ok(());
        }

        self.request_channel_change(now_ms, svc, new_channel);

        Ok(())
    }

    /// Pick the cleanest candidate from the monitor's occupancy table.
    ///
    /// Favored channels win unless there is no favored candidate at all, or
    /// the best favored channel is dirtier than the best overall by at
    /// least the skip-favored threshold.
    fn find_better_channel(
        &mut self,
        svc: &dyn StationServices,
    ) -> Result<(u8, u16), StackError> {
        let monitor = svc.monitor();

        if monitor.sample_count() <= MIN_MONITOR_SAMPLE_COUNT {
            tracing::info!(
                "ChannelManager: Too few samples ({} <= {}) to select channel",
                monitor.sample_count(),
                MIN_MONITOR_SAMPLE_COUNT
            );
            return Err(StackError::InvalidState);
        }

        let favored_and_supported = self.favored_channels.intersection(self.supported_channels);

        let (mut best, mut best_occupancy) = monitor.find_best_channels(favored_and_supported);
        let (overall_best, overall_occupancy) =
            monitor.find_best_channels(self.supported_channels);

        tracing::info!(
            "ChannelManager: Best favored {}, occupancy 0x{:04x}",
            best,
            best_occupancy
        );
        tracing::info!(
            "ChannelManager: Best overall {}, occupancy 0x{:04x}",
            overall_best,
            overall_occupancy
        );

        if best.is_empty()
            || (best_occupancy >= THRESHOLD_TO_SKIP_FAVORED
                && overall_occupancy < best_occupancy - THRESHOLD_TO_SKIP_FAVORED)
        {
            if !best.is_empty() {
                tracing::info!(
                    "ChannelManager: Preferring an unfavored channel due to high occupancy rate diff"
                );
            }

            best = overall_best;
            best_occupancy = overall_occupancy;
        }

        if best.is_empty() {
            return Err(StackError::NotFound);
        }

        // Ties are broken at random so a fleet reacting to the same trigger
        // spreads over the candidates instead of stampeding onto one; the
        // pending-dataset exchange converges the network afterwards.
        let channel = best.choose_random(&mut self.rng).expect("mask is non-empty");

        Ok((channel, best_occupancy))
    }

    fn should_attempt_channel_change(&self, svc: &dyn StationServices) -> bool {
        let cca_failure_rate = svc.mac().cca_failure_rate();
        let should_attempt = cca_failure_rate >= CCA_FAILURE_RATE_THRESHOLD;

        tracing::info!(
            "ChannelManager: CCA-err-rate: 0x{:04x} {} 0x{:04x}, selecting channel: {}",
            cca_failure_rate,
            if should_attempt { ">=" } else { "<" },
            CCA_FAILURE_RATE_THRESHOLD,
            if should_attempt { "yes" } else { "no" }
        );

        should_attempt
    }
}
