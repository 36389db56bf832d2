//! Streaming content fingerprints and the bounded hashing pool.
//!
//! # Overview
//!
//! [`Hasher`] computes a fingerprint for one file by streaming it through a
//! fixed-size buffer, so memory use does not depend on file size.
//! [`fingerprint_all`] fingerprints a batch of [`FileRecord`]s in place on a
//! dedicated rayon pool with exactly `workers` threads and returns only once
//! every queued file has been attempted.
//!
//! Two algorithms are available:
//! - XXH3-128 (default): fast, non-cryptographic, fine for equality checks
//! - BLAKE3: slower but collision resistant
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::scanner::{HashConfig, HashEngine, Hasher, FileRecord};
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let engine = HashEngine::new(Hasher::new(), HashConfig::default().with_workers(4));
//! let mut records = vec![FileRecord::new(
//!     PathBuf::from("/tmp/a.bin"),
//!     PathBuf::from("/tmp"),
//!     3,
//!     SystemTime::now(),
//! )];
//! let report = engine.fingerprint_all(records.iter_mut());
//! println!("{} hashed, {} failed", report.hashed, report.failed);
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{FileRecord, HashError};
use crate::progress::ProgressCallback;

/// Default read buffer for streaming hashes.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Content fingerprint algorithm.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// XXH3 128-bit (non-cryptographic)
    #[default]
    Xxh3,
    /// BLAKE3 256-bit
    Blake3,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xxh3 => write!(f, "xxh3"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

enum DigestState {
    Xxh3(Box<xxhash_rust::xxh3::Xxh3>),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Xxh3 => Self::Xxh3(Box::new(xxhash_rust::xxh3::Xxh3::new())),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Xxh3(state) => state.update(data),
            Self::Blake3(state) => {
                state.update(data);
            }
        }
    }

    fn finish_hex(self) -> String {
        match self {
            Self::Xxh3(state) => format!("{:032x}", state.digest128()),
            Self::Blake3(state) => state.finalize().to_hex().to_string(),
        }
    }
}

/// Single-file fingerprinter.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher using XXH3 and the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Use a different fingerprint algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Use a different read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Fingerprint the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn fingerprint(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.fingerprint_reader(file)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Fingerprint everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`.
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<String> {
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(state.finish_hex())
    }
}

/// Configuration for batch fingerprinting.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of concurrent hashing workers (always at least 1).
    pub workers: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("workers", &self.workers)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the worker count. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Number of CPUs available to this process, or 1 if unknown.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Outcome of a [`fingerprint_all`] call.
#[derive(Debug, Default)]
pub struct HashReport {
    /// Records that already carried a fingerprint and were left alone
    pub memoized: usize,
    /// Distinct paths submitted to the pool
    pub attempted: usize,
    /// Distinct paths fingerprinted successfully
    pub hashed: usize,
    /// Distinct paths that could not be read
    pub failed: usize,
    /// Per-file errors, one per failed path
    pub errors: Vec<HashError>,
}

impl HashReport {
    /// Whether every attempted file was fingerprinted.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: HashReport) {
        self.memoized += other.memoized;
        self.attempted += other.attempted;
        self.hashed += other.hashed;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }
}

/// Fingerprint every record that does not have a fingerprint yet.
///
/// Records that already carry a fingerprint are skipped before any work is
/// queued. Records sharing a path are collapsed so each distinct path is read
/// once, and the result is written to all of them. Work runs on a dedicated
/// pool with `config.workers` threads; a file that cannot be read leaves its
/// records without a fingerprint and does not stop the rest of the batch.
///
/// Blocks until all files have been attempted. Builds a fresh pool for this
/// call; [`HashEngine`] keeps one for its lifetime instead.
pub fn fingerprint_all<'a, I>(records: I, hasher: &Hasher, config: &HashConfig) -> HashReport
where
    I: IntoIterator<Item = &'a mut FileRecord>,
{
    let pool = build_pool(config.workers);
    fingerprint_on(records, hasher, config, pool.as_ref())
}

/// Dedicated hashing pool, or `None` if the threads cannot be spawned.
fn build_pool(workers: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("crossdupe-hash-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!(
                "Failed to create hashing pool ({}), hashing on the calling thread",
                e
            );
            None
        }
    }
}

fn fingerprint_on<'a, I>(
    records: I,
    hasher: &Hasher,
    config: &HashConfig,
    pool: Option<&rayon::ThreadPool>,
) -> HashReport
where
    I: IntoIterator<Item = &'a mut FileRecord>,
{
    let mut report = HashReport::default();

    let mut pending: Vec<&mut FileRecord> = Vec::new();
    for record in records {
        if record.is_fingerprinted() {
            report.memoized += 1;
        } else {
            pending.push(record);
        }
    }

    if pending.is_empty() {
        log::debug!(
            "Hash: nothing to do ({} records already fingerprinted)",
            report.memoized
        );
        return report;
    }

    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut paths: Vec<PathBuf> = Vec::new();
    for record in &pending {
        if !index.contains_key(&record.path) {
            index.insert(record.path.clone(), paths.len());
            paths.push(record.path.clone());
        }
    }
    report.attempted = paths.len();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hash", paths.len());
    }

    log::info!(
        "Computing {} fingerprints for {} files with {} workers",
        hasher.algorithm(),
        paths.len(),
        config.workers
    );

    let completed = AtomicUsize::new(0);
    let hash_one = |path: &PathBuf| {
        let result = hasher.fingerprint(path);
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(ref callback) = config.progress_callback {
            callback.on_progress(done, path.to_string_lossy().as_ref());
        }
        match result {
            Ok(ref fingerprint) => {
                log::trace!("Fingerprint {} for {}", fingerprint, path.display());
            }
            Err(ref e) => log::warn!("Failed to hash {}: {}", path.display(), e),
        }
        result
    };

    let results: Vec<Result<String, HashError>> = match pool {
        Some(pool) => pool.install(|| paths.par_iter().map(hash_one).collect()),
        None => paths.iter().map(hash_one).collect(),
    };

    let mut fingerprints: Vec<Option<String>> = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(fingerprint) => {
                report.hashed += 1;
                fingerprints.push(Some(fingerprint));
            }
            Err(e) => {
                report.failed += 1;
                report.errors.push(e);
                fingerprints.push(None);
            }
        }
    }

    for record in pending {
        if let Some(&slot) = index.get(&record.path) {
            if let Some(ref fingerprint) = fingerprints[slot] {
                record.fingerprint = Some(fingerprint.clone());
            }
        }
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hash");
    }

    log::info!(
        "Hashing complete: {} hashed, {} failed, {} already known",
        report.hashed,
        report.failed,
        report.memoized
    );

    report
}

/// A [`Hasher`] bundled with the hashing pool it runs on.
///
/// The pool is created once and shared by clones of the engine.
#[derive(Debug, Clone)]
pub struct HashEngine {
    hasher: Hasher,
    config: HashConfig,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new(Hasher::default(), HashConfig::default())
    }
}

impl HashEngine {
    /// Create an engine and its pool of `config.workers` threads.
    #[must_use]
    pub fn new(hasher: Hasher, config: HashConfig) -> Self {
        let pool = build_pool(config.workers).map(Arc::new);
        Self {
            hasher,
            config,
            pool,
        }
    }

    /// Fingerprint a single file.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn fingerprint(&self, path: &Path) -> Result<String, HashError> {
        self.hasher.fingerprint(path)
    }

    /// Fingerprint a batch of records in place on the engine's pool. See
    /// [`fingerprint_all`].
    pub fn fingerprint_all<'a, I>(&self, records: I) -> HashReport
    where
        I: IntoIterator<Item = &'a mut FileRecord>,
    {
        fingerprint_on(records, &self.hasher, &self.config, self.pool.as_deref())
    }
}
