//! Channel manager: keeps the mesh operating on the best available radio
//! channel.
//!
//! A channel migration is never local. Every node in the mesh has to switch
//! at roughly the same moment, which is coordinated through a pending
//! operational dataset carrying a migration delay. This entity debounces
//! migration requests, runs the periodic channel-selection policy, drives
//! the dataset updater and absorbs its failures.

mod selection;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use wpan_core::time::{msec_to_sec, sec_to_msec};
use wpan_core::{
    ChannelMask, OneShotTimer, StackError, StationEvent, UpdateError, MAX_TIMER_DURATION_MS,
};

use super::{PendingDatasetInfo, StationServices};

/// Smallest accepted migration delay, seconds.
pub const MINIMUM_DELAY_S: u16 = 120;

/// Default auto-selection period, seconds (3 hours).
pub const DEFAULT_AUTO_SELECT_INTERVAL_S: u32 = 10_800;

/// Longest accepted auto-selection period, seconds.
pub const MAX_AUTO_SELECT_INTERVAL_S: u32 = msec_to_sec(MAX_TIMER_DURATION_MS) as u32;

/// Upper bound of the random jitter applied before kicking off a requested
/// migration, milliseconds. Spreads the dataset exchange out when several
/// nodes react to the same external trigger.
const REQUEST_START_JITTER_MS: u64 = 10_000;

/// Gap before re-asking a busy updater, milliseconds.
const PENDING_DATASET_TX_RETRY_MS: u64 = 20_000;

/// Settle window the updater observes after the dataset activates, ms.
const CHANGE_CHECK_WAIT_MS: u64 = 30_000;

/// Monitor samples required before occupancy figures are trusted.
const MIN_MONITOR_SAMPLE_COUNT: u32 = 500;

/// Occupancy above which the best favored channel may be passed over for a
/// sufficiently cleaner unfavored one.
const THRESHOLD_TO_SKIP_FAVORED: u16 = 0x7000;

/// Minimum occupancy improvement required to migrate at all.
const THRESHOLD_TO_CHANGE_CHANNEL: u16 = 0x5000;

/// CCA failure rate below which the network is considered healthy and
/// auto-selection leaves the channel alone.
const CCA_FAILURE_RATE_THRESHOLD: u16 = 0x3666;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No migration requested; the timer, if running, is the auto-select
    /// trigger.
    Idle,
    /// A migration is requested; the timer runs the kickoff jitter or the
    /// retry gap.
    ChangeRequested,
    /// A dataset update is outstanding; waiting for its outcome.
    ChangeInProgress,
}

pub struct ChannelManager {
    supported_channels: ChannelMask,
    favored_channels: ChannelMask,
    /// Migration delay for the next issued dataset update, seconds.
    delay_s: u16,
    /// Channel targeted by a requested or in-flight migration. Meaningful
    /// only outside `Idle`.
    channel: u8,
    state: State,
    /// Single timer shared by the auto-select, jitter and retry roles. The
    /// role in effect follows from `state`, which is safe because the timer
    /// is armed for at most one role at a time.
    timer: OneShotTimer,
    auto_select_interval_s: u32,
    auto_select_enabled: bool,
    rng: SmallRng,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Deterministic construction for tests and reproducible simulations.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            supported_channels: ChannelMask::new(),
            favored_channels: ChannelMask::new(),
            delay_s: MINIMUM_DELAY_S,
            channel: 0,
            state: State::Idle,
            timer: OneShotTimer::new(),
            auto_select_interval_s: DEFAULT_AUTO_SELECT_INTERVAL_S,
            auto_select_enabled: false,
            rng,
        }
    }

    /// Drive the entity from the station tick loop.
    pub fn tick(&mut self, now_ms: u64, svc: &mut dyn StationServices) {
        if self.timer.take_expired(now_ms) {
            self.handle_timer(now_ms, svc);
        }
    }

    /// Request a network-wide migration to `channel`.
    ///
    /// Requesting the channel the PAN already operates on is a no-op. A
    /// request that contradicts an in-flight migration cancels it and
    /// starts over.
    pub fn request_channel_change(
        &mut self,
        now_ms: u64,
        svc: &mut dyn StationServices,
        channel: u8,
    ) {
        tracing::info!(
            "ChannelManager: Request to change to channel {} with delay {} sec",
            channel,
            self.delay_s
        );

        if channel == svc.mac().pan_channel() {
            tracing::info!(
                "ChannelManager: Already operating on the requested channel {}",
                channel
            );
            return;
        }

        if self.state == State::ChangeInProgress {
            if self.channel == channel {
                return;
            }
            svc.updater().cancel_update();
        }

        self.state = State::ChangeRequested;
        self.channel = channel;

        self.timer
            .start(now_ms, 1 + self.rng.gen_range(0..REQUEST_START_JITTER_MS));

        svc.notifier().signal(StationEvent::ChannelTargetChanged);
    }

    /// Set the migration delay carried by subsequently issued dataset
    /// updates.
    pub fn set_delay(&mut self, delay_s: u16) -> Result<(), StackError> {
        if delay_s < MINIMUM_DELAY_S {
            return Err(StackError::InvalidArgs);
        }
        self.delay_s = delay_s;
        Ok(())
    }

    /// Restrict the channels the manager may migrate to. The stored mask is
    /// the intersection with what the radio supports.
    pub fn set_supported_channels(&mut self, svc: &dyn StationServices, mask: ChannelMask) {
        self.supported_channels = mask.intersection(svc.mac().supported_channel_mask());

        tracing::info!(
            "ChannelManager: Supported channels: {}",
            self.supported_channels
        );
    }

    /// Set the operator-preferred channels. The stored mask is the
    /// intersection with what the radio supports.
    pub fn set_favored_channels(&mut self, svc: &dyn StationServices, mask: ChannelMask) {
        self.favored_channels = mask.intersection(svc.mac().supported_channel_mask());

        tracing::info!("ChannelManager: Favored channels: {}", self.favored_channels);
    }

    /// Enable or disable autonomous periodic channel selection. Enabling
    /// runs a selection pass immediately; disabling stops the timer once no
    /// migration is pending.
    pub fn set_auto_selection_enabled(
        &mut self,
        now_ms: u64,
        svc: &mut dyn StationServices,
        enabled: bool,
    ) {
        if enabled == self.auto_select_enabled {
            return;
        }

        self.auto_select_enabled = enabled;

        if enabled {
            let _ = self.request_channel_select(now_ms, svc, false);
        }

        self.start_auto_select_timer(now_ms);
    }

    /// Set the auto-selection period. When the auto timer is running, the
    /// new period is applied from the running schedule's origin, not from
    /// now, so repeated reconfiguration cannot postpone the next selection
    /// forever.
    pub fn set_auto_selection_interval(&mut self, interval_s: u32) -> Result<(), StackError> {
        if interval_s == 0 || interval_s > MAX_AUTO_SELECT_INTERVAL_S {
            return Err(StackError::InvalidArgs);
        }

        let prev_interval_s = self.auto_select_interval_s;
        self.auto_select_interval_s = interval_s;

        if self.auto_select_enabled
            && self.state == State::Idle
            && self.timer.is_running()
            && prev_interval_s != interval_s
        {
            self.timer
                .start_at(self.timer.start_time(), sec_to_msec(interval_s));
        }

        Ok(())
    }

    pub fn supported_channels(&self) -> ChannelMask {
        self.supported_channels
    }

    pub fn favored_channels(&self) -> ChannelMask {
        self.favored_channels
    }

    pub fn delay(&self) -> u16 {
        self.delay_s
    }

    pub fn auto_selection_enabled(&self) -> bool {
        self.auto_select_enabled
    }

    pub fn auto_selection_interval(&self) -> u32 {
        self.auto_select_interval_s
    }

    /// Channel targeted by a requested or in-flight migration, if any.
    pub fn requested_channel(&self) -> Option<u8> {
        (self.state != State::Idle).then_some(self.channel)
    }

    /// Terminal outcome of the dataset update, routed in by the host loop.
    ///
    /// An outcome arriving outside `ChangeInProgress` belongs to a canceled
    /// update whose cancellation was best-effort; the newer request cycle
    /// is driven by its own timer, so the stale outcome is dropped.
    pub fn handle_dataset_update_done(&mut self, now_ms: u64, result: Result<(), UpdateError>) {
        if self.state != State::ChangeInProgress {
            tracing::debug!("ChannelManager: Dropping stale dataset update outcome");
            return;
        }

        match result {
            Ok(()) => {
                tracing::info!("ChannelManager: Channel changed to {}", self.channel);
            }
            Err(UpdateError::Superseded) => {
                tracing::info!(
                    "ChannelManager: Canceling channel change to {} since current active dataset is more recent",
                    self.channel
                );
            }
            Err(err) => {
                tracing::info!(
                    "ChannelManager: Canceling channel change to {}: {}",
                    self.channel,
                    err
                );
            }
        }

        self.state = State::Idle;
        self.start_auto_select_timer(now_ms);
    }

    fn handle_timer(&mut self, now_ms: u64, svc: &mut dyn StationServices) {
        match self.state {
            State::Idle => {
                tracing::info!("ChannelManager: Auto-triggered channel select");
                let _ = self.request_channel_select(now_ms, svc, false);
                self.start_auto_select_timer(now_ms);
            }
            State::ChangeRequested => {
                self.start_dataset_update(now_ms, svc);
            }
            State::ChangeInProgress => {}
        }
    }

    fn start_dataset_update(&mut self, now_ms: u64, svc: &mut dyn StationServices) {
        let dataset = PendingDatasetInfo {
            channel: self.channel,
            delay_ms: sec_to_msec(u32::from(self.delay_s)),
        };

        match svc.updater().request_update(dataset, CHANGE_CHECK_WAIT_MS) {
            Ok(()) => {
                self.state = State::ChangeInProgress;
                // Wait for the `handle_dataset_update_done()` outcome.
            }
            Err(UpdateError::Busy) | Err(UpdateError::NoBufs) => {
                self.timer.start(now_ms, PENDING_DATASET_TX_RETRY_MS);
            }
            Err(err) => {
                if err == UpdateError::InvalidState {
                    tracing::info!(
                        "ChannelManager: Request to change to channel {} failed. Device is disabled",
                        self.channel
                    );
                }
                self.state = State::Idle;
                self.start_auto_select_timer(now_ms);
            }
        }
    }

    /// No-op unless idle. When idle, arms the timer for the auto-selection
    /// period, or stops it if auto-selection is off.
    fn start_auto_select_timer(&mut self, now_ms: u64) {
        if self.state != State::Idle {
            return;
        }

        if self.auto_select_enabled {
            self.timer
                .start(now_ms, sec_to_msec(self.auto_select_interval_s));
        } else {
            self.timer.stop();
        }
    }
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
