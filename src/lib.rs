//! Ground-station view of a single low-Earth-orbit satellite pass.
//!
//! A [`Propagator`] yields look angles over time, the [`signal`] module turns
//! range and range rate into a link budget, and an [`AntennaController`]
//! follows the target under a slew-rate limit. [`FlybyDriver`] ties the
//! three together over a fixed time grid.

pub mod angles;
pub mod config;
pub mod error;
pub mod flyby;
pub mod orbit;
pub mod signal;
pub mod stream;
pub mod tracking;

pub use config::{ConfigError, FlybyConfig};
pub use error::{Error, Result};
pub use flyby::{CancelToken, FlybyDriver, FlybyRecord, FlybyRun, FlybySummary, RunFailure};
pub use orbit::{build_propagator, GeometrySample, GroundStation, OrbitConfig, Propagator};
pub use signal::{evaluate, LinkModel, LinkModelConfig, RadioConfig, SignalSample};
pub use stream::{spawn_stream, FlybyStream, StreamError, StreamOptions};
pub use tracking::{AntennaConfig, AntennaController, LockState, TrackingSample};
