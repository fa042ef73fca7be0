//! Test-only helpers shared across this crate's `#[cfg(test)]` modules.

#![cfg(test)]

use std::fs;

use crate::db::StateDb;

/// Opens a fresh `StateDb` under a uniquely-named directory in `std::env::temp_dir()`,
/// wiping any leftovers from a previous run first.
pub fn temp_db(name: &str) -> (std::path::PathBuf, StateDb) {
    let dir = std::env::temp_dir().join(format!("certid_state_test_{name}"));
    let _ = fs::remove_dir_all(&dir);
    let db = StateDb::open(&dir).expect("open temp state db");
    (dir, db)
}
