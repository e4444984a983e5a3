use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride must be valid.
    #[error("row stride must be > 0, got {0}")]
    InvalidRowStride(usize),

    /// The buffer does not hold a whole number of rows.
    #[error("buffer of length {0} is not a multiple of the row stride {1}")]
    SizeMismatch(usize, usize),
}

/// Controls how row-wise operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    AutoRows,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// The strategy stages should use once running inside [`run_with_strategy`].
    ///
    /// A [`ExecutionStrategy::Fixed`] pool is already installed at that point, so
    /// its stages fan out on the current pool instead of building another one.
    fn installed(self) -> Self {
        match self {
            ExecutionStrategy::Fixed(_) => ExecutionStrategy::AutoRows,
            other => other,
        }
    }
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExecutionStrategy::AutoRows => write!(f, "auto-rows"),
            ExecutionStrategy::Serial => write!(f, "serial"),
            ExecutionStrategy::Fixed(n) => write!(f, "fixed({n})"),
        }
    }
}

/// Apply a function to every row of a row-major buffer.
///
/// Each row is handed to `f` exactly once together with its index, so rows can be
/// written from different threads without synchronization.
///
/// # Arguments
///
/// * `dst` - The destination buffer, `stride * rows` elements long.
/// * `stride` - The number of elements per row.
/// * `strategy` - How the rows are distributed.
/// * `f` - The operation to perform on each `(row index, row)` pair.
///
/// # Errors
///
/// Returns an error if the stride is zero, the buffer is not made of whole rows,
/// or a [`ExecutionStrategy::Fixed`] pool cannot be built.
pub fn par_iter_rows_indexed<T, F>(
    dst: &mut [T],
    stride: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if stride == 0 {
        return Err(ParallelError::InvalidRowStride(stride));
    }

    if dst.len() % stride != 0 {
        return Err(ParallelError::SizeMismatch(dst.len(), stride));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }
        ExecutionStrategy::AutoRows => {
            dst.par_chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_exact_mut(stride)
                    .enumerate()
                    .for_each(|(y, row)| f(y, row));
            });
        }
    }

    Ok(())
}

/// Run a multi-stage operation under a single execution strategy.
///
/// For [`ExecutionStrategy::Fixed`] the local pool is built once and `op` runs inside
/// it, so every stage shares that pool. `op` receives the strategy its stages should
/// pass to [`par_iter_rows_indexed`].
///
/// # Errors
///
/// Returns an error if a [`ExecutionStrategy::Fixed`] pool cannot be built.
pub fn run_with_strategy<R, F>(strategy: ExecutionStrategy, op: F) -> Result<R, ParallelError>
where
    R: Send,
    F: FnOnce(ExecutionStrategy) -> R + Send,
{
    match strategy {
        ExecutionStrategy::Serial | ExecutionStrategy::AutoRows => Ok(op(strategy)),
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            Ok(pool.install(|| op(strategy.installed())))
        }
    }
}
