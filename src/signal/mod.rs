mod atmosphere;
mod budget;
mod model;
mod noise;

pub use atmosphere::AtmosphereConfig;
pub use budget::{
    doppler_shift_hz, evaluate, free_space_path_loss_db, path_loss_db, received_power_dbm,
    thermal_noise_dbm, RadioConfig, SignalSample, BOLTZMANN_J_K, SPEED_OF_LIGHT_M_S,
};
pub use model::{LinkModel, LinkModelConfig};
pub use noise::{NoiseConfig, NoiseSource};
