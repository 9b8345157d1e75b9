mod cancel;
mod driver;
mod record;
mod summary;

pub use cancel::CancelToken;
pub(crate) use driver::validate_grid;
pub use driver::{FlybyDriver, FlybyRun, RunFailure, MAX_STEPS};
pub use record::FlybyRecord;
pub use summary::{FlybySummary, Stats};
