//! World snapshot storage.

use std::fs;
use std::path::{Path, PathBuf};

use game_core::WorldState;

use super::{RepositoryError, Result};

/// Save/load of world snapshots indexed by tick.
pub trait StateRepository: Send + Sync {
    fn save(&self, tick: u64, world: &WorldState) -> Result<()>;

    fn load(&self, tick: u64) -> Result<Option<WorldState>>;

    /// Ticks with a stored snapshot, ascending.
    fn list_ticks(&self) -> Result<Vec<u64>>;

    /// Most recent snapshot, if any.
    fn latest(&self) -> Result<Option<(u64, WorldState)>> {
        let Some(&tick) = self.list_ticks()?.last() else {
            return Ok(None);
        };
        Ok(self.load(tick)?.map(|world| (tick, world)))
    }
}

/// File-based snapshot repository.
///
/// Snapshots are stored as `world_{tick}.bin` in bincode format, written to
/// a temporary file first and renamed into place.
pub struct FileStateRepository {
    base_dir: PathBuf,
}

impl FileStateRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, tick: u64) -> PathBuf {
        self.base_dir.join(format!("world_{}.bin", tick))
    }
}

impl StateRepository for FileStateRepository {
    fn save(&self, tick: u64, world: &WorldState) -> Result<()> {
        let path = self.snapshot_path(tick);
        let temp_path = path.with_extension("bin.tmp");

        let bytes =
            bincode::serialize(world).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved world[{}] to {}", tick, path.display());
        Ok(())
    }

    fn load(&self, tick: u64) -> Result<Option<WorldState>> {
        let path = self.snapshot_path(tick);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let world = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        tracing::debug!("Loaded world[{}] from {}", tick, path.display());
        Ok(Some(world))
    }

    fn list_ticks(&self) -> Result<Vec<u64>> {
        let mut ticks = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(tick) = filename
                    .strip_prefix("world_")
                    .and_then(|s| s.strip_suffix(".bin"))
                    .and_then(|s| s.parse::<u64>().ok())
            {
                ticks.push(tick);
            }
        }

        ticks.sort_unstable();
        Ok(ticks)
    }
}
