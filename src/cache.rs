//! The cache collaborator: an opaque key to blob store the table builders
//! consult so that expensive tables are only ever computed once.
//!
//! Table names follow a dotted scheme such as `cube2.distance_m3` or
//! `cube3.p0.distance_m3`.

use log::{info, warn};

use std::fs;
use std::path::PathBuf;

/// A key-value store for serialized tables. The cache is advisory: a missing
/// or malformed entry just means the table is rebuilt.
pub trait TableCache {
    /// Fetch the blob stored under `name`, if any.
    fn load(&self, name: &str) -> Option<Vec<u8>>;

    /// Store a blob under `name`. Failures are logged, never surfaced.
    fn store(&self, name: &str, bytes: &[u8]);
}

/// A cache keeping one file per table under a directory.
pub struct DirCache {
    dir: PathBuf,
}

impl DirCache {
    /// Use `dir` as the cache directory. It is created on the first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirCache { dir: dir.into() }
    }
}

impl TableCache for DirCache {
    fn load(&self, name: &str) -> Option<Vec<u8>> {
        fs::read(self.dir.join(name)).ok()
    }

    fn store(&self, name: &str, bytes: &[u8]) {
        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(self.dir.join(name), bytes));
        if let Err(err) = result {
            warn!("save {}: {}", name, err);
        }
    }
}

/// A cache that never holds anything; every table is rebuilt.
pub struct NoCache;

impl TableCache for NoCache {
    fn load(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }

    fn store(&self, _name: &str, _bytes: &[u8]) {}
}

/// Load the table `name` from the cache, or build it and ask the cache to
/// keep the encoded result. A blob that fails to decode (wrong size, stale
/// format) is discarded and rebuilt.
pub fn fetch_or_build<T, E>(
    cache: &dyn TableCache,
    name: &str,
    decode: impl FnOnce(&[u8]) -> Option<T>,
    encode: impl FnOnce(&T) -> Vec<u8>,
    build: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    if let Some(bytes) = cache.load(name) {
        if let Some(table) = decode(&bytes) {
            info!("load {} ok", name);
            return Ok(table);
        }
        warn!("load {}: malformed entry, rebuilding", name);
    }
    info!("compute {} ...", name);
    let table = build()?;
    info!("compute {} ok", name);
    cache.store(name, &encode(&table));
    Ok(table)
}
