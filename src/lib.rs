//! Validation, decoding and synthesis of Chinese resident identity numbers.
//!
//! [`IdentityCodec`] is the core: it owns one loaded [`ReferenceTable`] and
//! every operation returns a [`Result`]. The free functions below keep the
//! path-based calling convention: they load (and cache) the table for the
//! given path, or the default one, and remember the outcome of the latest
//! call for [`last_error`].

pub mod checksum;
pub mod codec;
pub mod config;
pub mod date;
pub mod error;
pub mod location;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub use codec::IdentityCodec;
pub use error::{IdCardError, Result};
pub use idcard_types::{
    Constellation, ErrorCode, IdentityRecord, LastError, Location, LocationQuery, Sex,
};
pub use location::{ReferenceTable, SPECIAL_CITIES};

// ── Shared table cache ───────────────────────────────────────────────────

struct Cached {
    path: PathBuf,
    codec: Arc<IdentityCodec>,
}

/// Loaded once per path; a different path replaces it.
static SHARED: Mutex<Option<Cached>> = Mutex::new(None);

thread_local! {
    static LAST_ERROR: RefCell<LastError> = RefCell::new(LastError::default());
}

fn record<T>(result: Result<T>) -> Result<T> {
    let state = match &result {
        Ok(_) => LastError::default(),
        Err(e) => LastError::from(e),
    };
    LAST_ERROR.with(|last| *last.borrow_mut() = state);
    result
}

fn shared_codec(path: Option<&Path>) -> Result<Arc<IdentityCodec>> {
    let path = config::resolve_location_path(path);
    let mut shared = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(cached) = shared.as_ref().filter(|c| c.path == path) {
        return Ok(Arc::clone(&cached.codec));
    }
    let codec = Arc::new(IdentityCodec::load(&path)?);
    *shared = Some(Cached {
        path,
        codec: Arc::clone(&codec),
    });
    Ok(codec)
}

// ── Path-based operations ────────────────────────────────────────────────

/// Load the reference table at `path` (default table when None or empty).
/// Repeated calls with the same path reuse the cached table.
pub fn load_reference_table(path: Option<&Path>) -> Result<Arc<IdentityCodec>> {
    record(shared_codec(path))
}

pub fn parse(id: &str, path: Option<&Path>) -> Result<IdentityRecord> {
    record(shared_codec(path).and_then(|codec| codec.parse(id)))
}

/// `sex` is 1 for male, 2 for female; anything else picks one at random.
pub fn generate(
    location: impl Into<LocationQuery>,
    date: &str,
    sex: u8,
    path: Option<&Path>,
) -> Result<String> {
    let location = location.into();
    record(
        shared_codec(path)
            .and_then(|codec| codec.generate(&location, date, Sex::from_code(sex))),
    )
}

pub fn upgrade_to_eighteen(id: &str, path: Option<&Path>) -> Result<String> {
    record(shared_codec(path).and_then(|codec| codec.upgrade_to_eighteen(id)))
}

/// The whole loaded table.
pub fn get_location(path: Option<&Path>) -> Result<ReferenceTable> {
    record(shared_codec(path).map(|codec| codec.table().clone()))
}

/// Outcome of the latest path-based call made on this thread.
pub fn last_error() -> LastError {
    LAST_ERROR.with(|last| last.borrow().clone())
}
