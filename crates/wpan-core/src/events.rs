/// Configuration-change events published through the station notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEvent {
    /// The channel manager committed to a new target channel for migration.
    ChannelTargetChanged,

    /// The MAC moved to a new PAN channel (a pending dataset activated).
    PanChannelChanged,
}
