//! Protocol entities of the station control plane and the interfaces they
//! consume from the rest of the stack.

pub mod channel_manager;

pub use channel_manager::ChannelManager;

use wpan_core::{ChannelMask, StationEvent, UpdateError};

/// A pending operational dataset carrying a scheduled channel migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDatasetInfo {
    /// Channel the network migrates to when the dataset activates.
    pub channel: u8,
    /// Time until activation, milliseconds.
    pub delay_ms: u64,
}

/// MAC-layer view consumed by the control plane.
pub trait MacLayer {
    /// Channel the PAN currently operates on.
    fn pan_channel(&self) -> u8;

    /// Channels the radio hardware supports.
    fn supported_channel_mask(&self) -> ChannelMask;

    /// Fraction of transmissions failing clear-channel assessment,
    /// scaled to 0x0000-0xffff.
    fn cca_failure_rate(&self) -> u16;
}

/// Per-channel occupancy statistics accumulated by the channel monitor.
pub trait ChannelMonitor {
    /// Number of samples collected so far.
    fn sample_count(&self) -> u32;

    /// Occupancy of one channel; lower is cleaner.
    fn channel_occupancy(&self, channel: u8) -> u16;

    /// Channels of `mask` tied for minimum occupancy, with that occupancy.
    /// An empty `mask` yields an empty tie set and occupancy 0xffff.
    fn find_best_channels(&self, mask: ChannelMask) -> (ChannelMask, u16);
}

/// Pending-dataset exchange service.
pub trait DatasetUpdater {
    /// Start a network-wide dataset update. The terminal outcome is routed
    /// back by the host loop through
    /// [`ChannelManager::handle_dataset_update_done`].
    fn request_update(
        &mut self,
        dataset: PendingDatasetInfo,
        check_wait_ms: u64,
    ) -> Result<(), UpdateError>;

    /// Best-effort cancellation of the outstanding update. A terminal
    /// outcome may still be delivered shortly after.
    fn cancel_update(&mut self);
}

/// Mesh (MLE) layer view.
pub trait MeshLayer {
    /// True while the device is detached from any mesh.
    fn is_disabled(&self) -> bool;
}

/// Publishes configuration-change events to interested parties.
pub trait Notifier {
    fn signal(&mut self, event: StationEvent);
}

/// Collaborator registry handed into entity operations. There is one per
/// station instance; entities never own each other.
pub trait StationServices {
    fn mac(&self) -> &dyn MacLayer;
    fn monitor(&self) -> &dyn ChannelMonitor;
    fn updater(&mut self) -> &mut dyn DatasetUpdater;
    fn mesh(&self) -> &dyn MeshLayer;
    fn notifier(&mut self) -> &mut dyn Notifier;
}
