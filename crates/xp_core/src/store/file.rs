//! File-backed progression store
//!
//! Layout: MessagePack (named fields) → LZ4 (size prepended) → SHA-256
//! trailer. The whole store is rewritten on every mutation through a temp
//! file and an atomic rename, under an exclusive lock file.

use std::collections::BTreeMap;
use std::fs::{self, rename, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, SystemTime};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::StoreError;
use super::history::{current_timestamp, XpHistoryEntry};
use super::{newest_for_user, ProgressionStore, StoreResult};
use crate::state::{StoredProgression, UserId};

pub const STORE_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;

/// Everything persisted in one store file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct StoreSnapshot {
    version: u32,
    /// Unix milliseconds of the last write
    updated_at: u64,
    users: BTreeMap<UserId, StoredProgression>,
    #[serde(default)]
    history: Vec<XpHistoryEntry>,
}

impl StoreSnapshot {
    fn new() -> Self {
        Self {
            version: STORE_VERSION,
            updated_at: current_timestamp(),
            users: BTreeMap::new(),
            history: Vec::new(),
        }
    }
}

/// Store backed by one file.
///
/// Every mutation takes an exclusive `<path>.lock` file, reloads the file,
/// applies the change and rewrites it, so several stores (or processes) on
/// one path do not erase each other's updates. Reads reload whenever the
/// file changed on disk. A lock file left behind by a crashed writer has
/// to be removed by hand.
pub struct FileStore {
    path: PathBuf,
    loaded: Mutex<Loaded>,
}

/// In-memory copy of the file plus the on-disk state it was read from
struct Loaded {
    snapshot: StoreSnapshot,
    fingerprint: Option<Fingerprint>,
}

type Fingerprint = (SystemTime, u64);

impl FileStore {
    /// Open a store file, starting empty when it does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let fingerprint = fingerprint(&path)?;
        let snapshot = if fingerprint.is_some() {
            load_from_path(&path).map_err(|e| {
                log::warn!("Failed to load store {:?}: {}", path, e);
                e
            })?
        } else {
            log::info!("No store at {:?}, starting empty", path);
            StoreSnapshot::new()
        };
        Ok(Self { path, loaded: Mutex::new(Loaded { snapshot, fingerprint }) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a level 1 record; false if the user already has one
    pub fn create_profile(&self, user_id: &UserId) -> StoreResult<bool> {
        let created = self.mutate(|snapshot| {
            if snapshot.users.contains_key(user_id) {
                return false;
            }
            snapshot.users.insert(user_id.clone(), StoredProgression::initial());
            true
        })?;
        if created {
            log::info!("Created progression profile for {}", user_id);
        }
        Ok(created)
    }

    pub fn user_count(&self) -> StoreResult<usize> {
        Ok(self.current()?.snapshot.users.len())
    }

    fn lock(&self) -> MutexGuard<'_, Loaded> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locked view, reloaded first if another writer changed the file
    fn current(&self) -> StoreResult<MutexGuard<'_, Loaded>> {
        let mut loaded = self.lock();
        let on_disk = fingerprint(&self.path)?;
        if on_disk != loaded.fingerprint {
            self.reload(&mut loaded, on_disk)?;
        }
        Ok(loaded)
    }

    fn reload(&self, loaded: &mut Loaded, on_disk: Option<Fingerprint>) -> StoreResult<()> {
        loaded.snapshot = match on_disk {
            Some(_) => load_from_path(&self.path)?,
            None => StoreSnapshot::new(),
        };
        loaded.fingerprint = on_disk;
        Ok(())
    }

    /// Apply `f` to a fresh copy of the file, persist it, and only then
    /// publish it.
    ///
    /// Nothing is written when `f` leaves the snapshot unchanged.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreSnapshot) -> T) -> StoreResult<T> {
        let _file_lock = WriterLock::acquire(&self.path)?;
        let mut loaded = self.lock();

        // Fingerprints can collide within one mtime tick; reload unconditionally
        let on_disk = fingerprint(&self.path)?;
        self.reload(&mut loaded, on_disk)?;

        let mut next = loaded.snapshot.clone();
        let out = f(&mut next);
        if next == loaded.snapshot {
            return Ok(out);
        }
        next.updated_at = current_timestamp();
        save_to_path(&self.path, &next)?;

        loaded.snapshot = next;
        // Unknown fingerprint only forces the next read to reload
        loaded.fingerprint = fingerprint(&self.path).ok().flatten();
        Ok(out)
    }
}

impl ProgressionStore for FileStore {
    fn read_progression(&self, user_id: &UserId) -> StoreResult<Option<StoredProgression>> {
        Ok(self.current()?.snapshot.users.get(user_id).copied())
    }

    fn write_progression(&self, user_id: &UserId, record: StoredProgression) -> StoreResult<()> {
        self.mutate(|snapshot| {
            snapshot.users.insert(user_id.clone(), record);
        })
    }

    fn append_history(&self, entry: &XpHistoryEntry) -> StoreResult<()> {
        self.mutate(|snapshot| snapshot.history.push(entry.clone()))
    }

    fn recent_history(&self, user_id: &UserId, limit: usize) -> StoreResult<Vec<XpHistoryEntry>> {
        Ok(newest_for_user(&self.current()?.snapshot.history, user_id, limit))
    }
}

const LOCK_ATTEMPTS: u32 = 200;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Exclusive `<path>.lock` file, removed on drop
struct WriterLock {
    path: PathBuf,
}

impl WriterLock {
    fn acquire(store_path: &Path) -> StoreResult<Self> {
        ensure_parent_dir(store_path)?;
        let path = store_path.with_extension("lock");

        for _ in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => thread::sleep(LOCK_RETRY_DELAY),
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Unavailable(format!("store is locked by {}", path.display())))
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Failed to remove lock file {:?}: {}", self.path, e);
        }
    }
}

fn fingerprint(path: &Path) -> StoreResult<Option<Fingerprint>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some((meta.modified()?, meta.len()))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn encode_snapshot(snapshot: &StoreSnapshot) -> StoreResult<Vec<u8>> {
    let msgpack = to_vec_named(snapshot)?;
    let mut data = compress_prepend_size(&msgpack);

    let checksum = Sha256::digest(&data);
    data.extend_from_slice(&checksum);
    Ok(data)
}

fn decode_snapshot(bytes: &[u8]) -> StoreResult<StoreSnapshot> {
    // size header + checksum
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(StoreError::Corrupted);
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(StoreError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| StoreError::Decompression)?;
    let snapshot: StoreSnapshot = from_slice(&msgpack)?;

    if snapshot.version != STORE_VERSION {
        return Err(StoreError::VersionMismatch {
            found: snapshot.version,
            expected: STORE_VERSION,
        });
    }

    Ok(snapshot)
}

fn save_to_path(path: &Path, snapshot: &StoreSnapshot) -> StoreResult<()> {
    ensure_parent_dir(path)?;

    let data = encode_snapshot(snapshot)?;
    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }

    rename(&temp_path, path)?;

    log::debug!("Saved {} bytes to {:?}", data.len(), path);
    Ok(())
}

fn load_from_path(path: &Path) -> StoreResult<StoreSnapshot> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let snapshot = decode_snapshot(&data)?;

    log::debug!(
        "Loaded {} bytes from {:?} ({} users)",
        data.len(),
        path,
        snapshot.users.len()
    );
    Ok(snapshot)
}
