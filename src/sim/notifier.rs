//! Notifier that logs signaled events and keeps counts for the run summary.

use wpan_core::StationEvent;

use crate::entities::Notifier;

#[derive(Debug, Default)]
pub struct LogNotifier {
    pub target_changes: u32,
    pub pan_changes: u32,
}

impl Notifier for LogNotifier {
    fn signal(&mut self, event: StationEvent) {
        tracing::debug!("Notifier: {:?}", event);

        match event {
            StationEvent::ChannelTargetChanged => self.target_changes += 1,
            StationEvent::PanChannelChanged => self.pan_changes += 1,
        }
    }
}
