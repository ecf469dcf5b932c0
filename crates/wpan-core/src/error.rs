//! Error types for the station control plane.

use thiserror::Error;

/// Errors surfaced to the host application by station operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// A setter was handed an out-of-range value.
    #[error("invalid arguments")]
    InvalidArgs,

    /// The operation is not possible in the current stack state.
    #[error("invalid state")]
    InvalidState,

    /// No result could be produced.
    #[error("not found")]
    NotFound,
}

/// Failure modes of a pending-dataset update request. These never reach the
/// host; the channel manager absorbs them all.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// The updater already has an exchange in flight.
    #[error("updater busy with another request")]
    Busy,

    /// No buffer space for the dataset exchange.
    #[error("out of message buffers")]
    NoBufs,

    /// The device is disabled and cannot start an exchange.
    #[error("device is disabled")]
    InvalidState,

    /// A more recent active dataset already superseded the requested update.
    #[error("active dataset is more recent")]
    Superseded,

    /// The exchange started but did not complete.
    #[error("dataset exchange failed")]
    Failed,
}
