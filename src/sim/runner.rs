//! Cooperative tick loop wiring the channel manager to the simulated
//! collaborators.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use wpan_config::SharedConfig;
use wpan_core::{StackError, StationEvent};

use crate::entities::{
    ChannelManager, ChannelMonitor, DatasetUpdater, MacLayer, MeshLayer, Notifier,
    StationServices,
};
use crate::sim::mle::SimMeshLayer;
use crate::sim::notifier::LogNotifier;
use crate::sim::radio::{SimChannelMonitor, SimMac};
use crate::sim::updater::{SimDatasetUpdater, UpdaterEvent};

pub struct SimServices {
    pub mac: SimMac,
    pub monitor: SimChannelMonitor,
    pub updater: SimDatasetUpdater,
    pub mesh: SimMeshLayer,
    pub notifier: LogNotifier,
}

impl StationServices for SimServices {
    fn mac(&self) -> &dyn MacLayer {
        &self.mac
    }

    fn monitor(&self) -> &dyn ChannelMonitor {
        &self.monitor
    }

    fn updater(&mut self) -> &mut dyn DatasetUpdater {
        &mut self.updater
    }

    fn mesh(&self) -> &dyn MeshLayer {
        &self.mesh
    }

    fn notifier(&mut self) -> &mut dyn Notifier {
        &mut self.notifier
    }
}

/// A whole station instance on a simulated clock.
pub struct SimStation {
    config: SharedConfig,
    services: SimServices,
    manager: ChannelManager,
    now_ms: u64,
}

impl SimStation {
    pub fn new(config: SharedConfig, seed: u64) -> Result<Self, StackError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let cfg = config.config();

        let services = SimServices {
            mac: SimMac::new(&cfg.radio),
            monitor: SimChannelMonitor::new(&mut rng),
            updater: SimDatasetUpdater::new(),
            mesh: SimMeshLayer::new(config.clone()),
            notifier: LogNotifier::default(),
        };

        let manager = ChannelManager::with_seed(rng.gen());

        let mut station = Self {
            config,
            services,
            manager,
            now_ms: 0,
        };
        station.apply_config()?;

        Ok(station)
    }

    fn apply_config(&mut self) -> Result<(), StackError> {
        let cfg = self.config.config();

        // Attach the mesh before the control plane comes up.
        self.config.state_write().mesh_active = true;

        self.manager
            .set_supported_channels(&self.services, cfg.chanmgr.supported_channels);
        self.manager
            .set_favored_channels(&self.services, cfg.chanmgr.favored_channels);
        self.manager.set_delay(cfg.chanmgr.delay_s)?;
        self.manager
            .set_auto_selection_interval(cfg.chanmgr.auto_select_interval_s)?;
        self.manager
            .set_auto_selection_enabled(self.now_ms, &mut self.services, cfg.chanmgr.auto_select);

        Ok(())
    }

    /// Host-facing: request a migration to `channel`.
    pub fn request_channel_change(&mut self, channel: u8) {
        self.manager
            .request_channel_change(self.now_ms, &mut self.services, channel);
    }

    /// Host-facing: run one selection pass immediately.
    pub fn request_channel_select(&mut self, skip_quality_check: bool) -> Result<(), StackError> {
        self.manager
            .request_channel_select(self.now_ms, &mut self.services, skip_quality_check)
    }

    pub fn pan_channel(&self) -> u8 {
        self.services.mac.pan_channel()
    }

    /// Run for `duration_ms` of simulated time at `tick_ms` resolution.
    pub fn run(&mut self, duration_ms: u64, tick_ms: u64) {
        assert!(tick_ms > 0, "tick must be non-zero");

        let end_ms = self.now_ms + duration_ms;
        while self.now_ms < end_ms {
            self.step();
            self.now_ms += tick_ms;
        }

        let cfg = self.config.config();
        tracing::info!(
            "SimStation: run complete: t={} ms, channel {} (started on {}), {} target change(s), {} PAN move(s), {} monitor samples",
            self.now_ms,
            self.services.mac.pan_channel(),
            cfg.radio.pan_channel,
            self.services.notifier.target_changes,
            self.services.notifier.pan_changes,
            self.services.monitor.sample_count(),
        );
    }

    /// One cooperative scheduling round at the current clock value.
    fn step(&mut self) {
        self.services.monitor.tick();

        while let Some(event) = self.services.updater.poll(self.now_ms) {
            match event {
                UpdaterEvent::Activated(channel) => {
                    self.services.mac.set_pan_channel(channel);
                    self.services
                        .notifier
                        .signal(StationEvent::PanChannelChanged);
                }
                UpdaterEvent::Completed(result) => {
                    self.manager.handle_dataset_update_done(self.now_ms, result);
                }
            }
        }

        self.manager.tick(self.now_ms, &mut self.services);
    }
}
