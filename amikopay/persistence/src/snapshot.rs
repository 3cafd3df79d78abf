//! Whole-`NodeState` persistence via the atomic-rename protocol: serialize to
//! `<file>.new`, swap it in over the live file, then drop the backup left
//! behind by the swap. A crash at any point leaves either the old file or the
//! new file intact, never a half-written one, since only the final rename
//! observes the new bytes.
use std::{
	fs,
	path::Path,
};

use amikopay_state_machine::types::NodeState;
use tracing::{
	debug,
	warn,
};

use crate::errors::PersistenceError;

fn new_path(path: &Path) -> std::path::PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(".new");
	name.into()
}

fn old_path(path: &Path) -> std::path::PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(".old");
	name.into()
}

/// Serializes `state` and atomically swaps it in over whatever snapshot is
/// currently at `path`, if any.
pub fn save_snapshot(path: &Path, state: &NodeState) -> Result<(), PersistenceError> {
	let serialized = serde_json::to_vec_pretty(state)?;
	let tmp = new_path(path);
	fs::write(&tmp, &serialized).map_err(|source| PersistenceError::io(&tmp, source))?;

	let backup = old_path(path);
	if path.exists() {
		fs::rename(path, &backup).map_err(|source| PersistenceError::io(path, source))?;
	}
	fs::rename(&tmp, path).map_err(|source| PersistenceError::io(path, source))?;

	if backup.exists() {
		if let Err(err) = fs::remove_file(&backup) {
			warn!(path = %backup.display(), error = %err, "failed to clean up snapshot backup");
		}
	}

	debug!(path = %path.display(), bytes = serialized.len(), "snapshot saved");
	Ok(())
}

/// Loads the most recent snapshot at `path`. Falls back to `<file>.old` if
/// `path` itself is missing, which can only happen if a prior save crashed
/// between the two renames.
pub fn load_snapshot(path: &Path) -> Result<NodeState, PersistenceError> {
	let candidate = if path.exists() {
		path.to_path_buf()
	} else {
		let backup = old_path(path);
		if !backup.exists() {
			return Err(PersistenceError::NotFound(path.to_path_buf()))
		}
		warn!(path = %path.display(), "snapshot missing, recovering from backup left by a crashed save");
		backup
	};

	let bytes = fs::read(&candidate).map_err(|source| PersistenceError::io(&candidate, source))?;
	let state = serde_json::from_slice(&bytes)?;
	Ok(state)
}

#[cfg(test)]
mod tests {
	use amikopay_primitives::types::{
		LinkName,
		LocalId,
	};
	use amikopay_state_machine::{
		machine::state_transition,
		types::StateChange,
	};

	use super::*;

	#[test]
	fn round_trips_through_atomic_rename() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state.json");

		let mut state = NodeState::new();
		state_transition(
			&mut state,
			StateChange::LinkCreated(amikopay_state_machine::types::state_change::LinkCreated {
				name: LinkName("a".to_string()),
				local_id: LocalId("a->b".to_string()),
				remote_id: LocalId("b->a".to_string()),
				remote_url: None,
			}),
			0,
		)
		.unwrap();

		save_snapshot(&path, &state).unwrap();
		assert!(path.exists());
		assert!(!new_path(&path).exists());
		assert!(!old_path(&path).exists());

		let loaded = load_snapshot(&path).unwrap();
		assert_eq!(loaded, state);
	}

	#[test]
	fn second_save_leaves_no_backup_behind() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state.json");

		save_snapshot(&path, &NodeState::new()).unwrap();
		save_snapshot(&path, &NodeState::new()).unwrap();

		assert!(path.exists());
		assert!(!old_path(&path).exists());
	}

	#[test]
	fn recovers_from_a_backup_left_by_a_crashed_save() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state.json");
		save_snapshot(&path, &NodeState::new()).unwrap();

		// Simulate a crash between the two renames: the live file is gone, the
		// backup from the swap is still there.
		fs::rename(&path, old_path(&path)).unwrap();

		let loaded = load_snapshot(&path).unwrap();
		assert_eq!(loaded, NodeState::new());
	}

	#[test]
	fn missing_snapshot_is_reported() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state.json");
		assert!(matches!(load_snapshot(&path), Err(PersistenceError::NotFound(_))));
	}
}
