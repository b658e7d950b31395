//! Worker selection for the apply functions.
//!
//! `n_jobs` follows the joblib convention: `1` runs on the calling thread,
//! positive counts ask for that many workers and negative counts are taken
//! relative to the number of cores (`-1` = all of them, `-2` = all but one).
use crate::error::{NumpyExtError, Result};
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::ops::Range;
use tracing::trace;

/// How many workers evaluate the windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jobs {
    /// Evaluate on the calling thread.
    #[default]
    Sequential,
    /// Evaluate on a dedicated pool with this many threads.
    Threads(NonZeroUsize),
    /// Evaluate on the global rayon pool.
    AllCores,
}

fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl Jobs {
    /// A pool of `n` threads; one thread or fewer is sequential.
    pub fn threads(n: usize) -> Self {
        match NonZeroUsize::new(n) {
            Some(n) if n.get() > 1 => Jobs::Threads(n),
            _ => Jobs::Sequential,
        }
    }

    /// Translate a joblib-style `n_jobs` value.
    ///
    /// ```
    /// use numpy_ext::Jobs;
    ///
    /// assert_eq!(Jobs::from_n_jobs(1).unwrap(), Jobs::Sequential);
    /// assert_eq!(Jobs::from_n_jobs(-1).unwrap(), Jobs::AllCores);
    /// assert!(Jobs::from_n_jobs(0).is_err());
    /// ```
    pub fn from_n_jobs(n_jobs: i64) -> Result<Self> {
        match n_jobs {
            0 => Err(NumpyExtError::InvalidJobs),
            1 => Ok(Jobs::Sequential),
            -1 => Ok(Jobs::AllCores),
            n if n > 1 => Ok(Jobs::threads(usize::try_from(n).unwrap_or(usize::MAX))),
            n => {
                let cores = i64::try_from(available_cores()).unwrap_or(i64::MAX);
                let wanted = cores.saturating_add(1).saturating_add(n).max(1);
                Ok(Jobs::threads(usize::try_from(wanted).unwrap_or(1)))
            }
        }
    }

    pub fn is_parallel(&self) -> bool {
        !matches!(self, Jobs::Sequential)
    }

    /// Evaluate `f` for every index of `range`.
    ///
    /// Results are returned in index order regardless of how the work was
    /// scheduled.
    pub fn map_indices<T, F>(&self, range: Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match *self {
            Jobs::Sequential => Ok(range.map(f).collect()),
            Jobs::AllCores => Ok(range.into_par_iter().map(f).collect()),
            Jobs::Threads(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n.get())
                    .thread_name(|i| format!("numpy-ext-{i}"))
                    .build()?;
                trace!(threads = n.get(), "built dedicated thread pool");
                Ok(pool.install(move || range.into_par_iter().map(f).collect()))
            }
        }
    }
}
