/// Consensus parameters for the supported networks.
pub mod params;

pub use params::{Checkpoint, Params};
