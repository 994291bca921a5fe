//! Parallel processing utilities for the contouring kernels
//!
//! This module provides configurable thread pool management plus the small
//! set of data-parallel helpers the Flying Edges passes are built on. Every
//! helper falls back to a plain sequential loop when parallel processing is
//! disabled, and produces the same result either way.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::{Arc, Mutex, OnceLock};
use isoflow_core::{Error, Result};

/// Global thread pool used by the contouring kernels
static GLOBAL_THREAD_POOL: OnceLock<Option<Arc<ThreadPool>>> = OnceLock::new();
static THREAD_POOL_CONFIG: Mutex<ThreadPoolConfig> = Mutex::new(ThreadPoolConfig::new());

const DEFAULT_STACK_SIZE: usize = 8 * 1024 * 1024;
const DEFAULT_THREAD_PREFIX: &str = "isoflow";

/// Thread pool configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of threads to use (None = automatic)
    pub num_threads: Option<usize>,
    /// Thread stack size in bytes
    pub stack_size: Option<usize>,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
}

impl ThreadPoolConfig {
    const fn new() -> Self {
        Self {
            num_threads: None,
            stack_size: None,
            thread_name_prefix: String::new(),
            enabled: true,
        }
    }

    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set stack size
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Set the prefix used to name worker threads
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn build_pool(&self) -> std::result::Result<ThreadPool, rayon::ThreadPoolBuildError> {
        let mut builder = ThreadPoolBuilder::new();

        if let Some(num_threads) = self.num_threads {
            builder = builder.num_threads(num_threads);
        }

        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        if !self.thread_name_prefix.is_empty() {
            let prefix = self.thread_name_prefix.clone();
            builder = builder.thread_name(move |index| format!("{}-{}", prefix, index));
        }

        builder.build()
    }
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            stack_size: Some(DEFAULT_STACK_SIZE),
            thread_name_prefix: DEFAULT_THREAD_PREFIX.to_string(),
            enabled: true,
        }
    }
}

/// Initialize the global thread pool with custom configuration
///
/// The pool can only be built once; later calls still update the `enabled`
/// switch but keep the existing workers.
pub fn init_thread_pool(config: ThreadPoolConfig) -> Result<()> {
    if let Ok(mut global_config) = THREAD_POOL_CONFIG.lock() {
        *global_config = config.clone();
    }

    if GLOBAL_THREAD_POOL.get().is_some() {
        log::debug!("Thread pool already initialized, keeping existing workers");
        return Ok(());
    }

    let pool = config
        .build_pool()
        .map_err(|e| Error::Algorithm(format!("Failed to create thread pool: {}", e)))?;

    if GLOBAL_THREAD_POOL.set(Some(Arc::new(pool))).is_err() {
        log::debug!("Thread pool was initialized concurrently, keeping existing workers");
    }

    Ok(())
}

/// Get the global thread pool, initializing with defaults if needed
///
/// Returns `None` if the default pool could not be created, in which case
/// work runs on rayon's global pool.
pub fn get_thread_pool() -> Option<Arc<ThreadPool>> {
    GLOBAL_THREAD_POOL
        .get_or_init(|| match ThreadPoolConfig::default().build_pool() {
            Ok(pool) => Some(Arc::new(pool)),
            Err(e) => {
                log::warn!("Falling back to the global rayon pool: {}", e);
                None
            }
        })
        .clone()
}

/// Get current thread pool configuration
pub fn get_config() -> ThreadPoolConfig {
    THREAD_POOL_CONFIG
        .lock()
        .map(|config| config.clone())
        .unwrap_or_else(|_| ThreadPoolConfig::default())
}

/// Check if parallel processing is enabled
pub fn is_parallel_enabled() -> bool {
    get_config().enabled
}

/// Execute a parallel operation with the global thread pool
pub fn execute_parallel<F, R>(op: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match get_thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Parallel map operation
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    if !is_parallel_enabled() {
        return data.iter().map(f).collect();
    }

    execute_parallel(|| data.par_iter().map(f).collect())
}

/// Run `f(chunk_index, chunk)` over disjoint `chunk_len`-sized pieces of `data`
pub fn for_each_chunk_mut<T, F>(data: &mut [T], chunk_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if chunk_len == 0 {
        return;
    }

    if !is_parallel_enabled() {
        data.chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(index, chunk)| f(index, chunk));
        return;
    }

    execute_parallel(|| {
        data.par_chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(index, chunk)| f(index, chunk))
    })
}

/// Consume independent tasks, running `f` on each
pub fn for_each_task<T, F>(tasks: Vec<T>, f: F)
where
    T: Send,
    F: Fn(T) + Sync + Send,
{
    if !is_parallel_enabled() {
        tasks.into_iter().for_each(f);
        return;
    }

    execute_parallel(|| tasks.into_par_iter().for_each(f))
}
