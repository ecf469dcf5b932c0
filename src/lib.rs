//! Control-plane station for an 802.15.4 / Thread-style mesh.
//!
//! The station keeps the mesh operating on the best available radio
//! channel: the channel manager entity accepts explicit migration requests
//! and periodically samples channel quality to migrate autonomously, with
//! the switch coordinated network-wide through a delayed pending
//! operational dataset.

pub mod common;
pub mod entities;
pub mod sim;
