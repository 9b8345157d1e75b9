use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::flyby::{validate_grid, CancelToken, FlybyDriver, FlybyRecord};
use crate::orbit::Propagator;

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Flyby(#[from] Error),
    #[error("stream producer failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamOptions {
    /// Records buffered before the producer blocks.
    pub capacity: usize,
    /// Wall-clock spacing between records. `None` produces as fast as the
    /// consumer reads.
    pub pace: Option<Duration>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            pace: None,
        }
    }
}

impl StreamOptions {
    /// One record per simulated step of wall-clock time.
    pub fn realtime(time_step_sec: f64) -> Self {
        Self {
            pace: Duration::try_from_secs_f64(time_step_sec).ok(),
            ..Self::default()
        }
    }
}

/// Receiving end of a flyby running on a blocking worker.
pub struct FlybyStream {
    rx: mpsc::Receiver<FlybyRecord>,
    cancel: CancelToken,
    join: JoinHandle<Result<usize, Error>>,
}

impl FlybyStream {
    /// Next record, or `None` once the producer has finished or stopped.
    pub async fn recv(&mut self) -> Option<FlybyRecord> {
        self.rx.recv().await
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Waits for the producer and returns how many records it delivered.
    ///
    /// Records still buffered are discarded, so drain with `recv` first.
    pub async fn finish(self) -> Result<usize, StreamError> {
        let FlybyStream { rx, join, .. } = self;
        drop(rx);
        Ok(join.await??)
    }

    pub async fn stop(self) -> Result<usize, StreamError> {
        self.cancel.cancel();
        self.finish().await
    }
}

/// Runs `driver` on a tokio blocking task, pushing records into a bounded
/// channel. Must be called from within a tokio runtime.
///
/// An invalid grid or capacity is reported here, before anything is spawned.
pub fn spawn_stream<P>(
    driver: FlybyDriver<P>,
    duration_sec: f64,
    time_step_sec: f64,
    options: StreamOptions,
) -> Result<FlybyStream, Error>
where
    P: Propagator + 'static,
{
    validate_grid(duration_sec, time_step_sec)?;
    if options.capacity == 0 {
        return Err(Error::config("stream capacity must be > 0"));
    }

    let (tx, rx) = mpsc::channel(options.capacity);
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let join = tokio::task::spawn_blocking(move || {
        produce(&driver, duration_sec, time_step_sec, options.pace, token, tx)
    });

    Ok(FlybyStream { rx, cancel, join })
}

fn produce<P: Propagator>(
    driver: &FlybyDriver<P>,
    duration_sec: f64,
    time_step_sec: f64,
    pace: Option<Duration>,
    cancel: CancelToken,
    tx: mpsc::Sender<FlybyRecord>,
) -> Result<usize, Error> {
    let run = driver.simulate_with_cancel(duration_sec, time_step_sec, cancel)?;
    let started = Instant::now();
    let mut sent = 0usize;

    for item in run {
        let record = item?;
        if let Some(pace) = pace {
            let due = started + pace.mul_f64(sent as f64);
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
        }
        if tx.blocking_send(record).is_err() {
            log::debug!("stream receiver dropped after {} records", sent);
            break;
        }
        sent += 1;
    }

    Ok(sent)
}
