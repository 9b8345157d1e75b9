mod controller;
mod types;

pub use controller::AntennaController;
pub use types::{AntennaConfig, LockState, Pointing, TrackingSample};
