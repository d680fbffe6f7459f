use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::store::Snapshot;

/// Consider cache stale after 1 hour.
const CACHE_STALE_MINUTES: i64 = 60;

const SNAPSHOT_FILE: &str = "snapshot";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    /// Short relative age: "just now", "5m ago", "2h ago", "3d ago".
    /// Hours and days round to the nearest unit.
    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        match minutes {
            // Negative ages come from clock skew
            m if m < 1 => "just now".to_string(),
            m if m < 60 => format!("{}m ago", m),
            m if m < 1440 => format!("{}h ago", (m + 30) / 60),
            m => format!("{}d ago", (m + 720) / 1440),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    /// Write through a temporary file so a crash never leaves a truncated
    /// cache behind.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace cache file: {}", name))?;
        debug!(cache = name, "Cache saved");
        Ok(())
    }

    pub fn load_snapshot(&self) -> Result<Option<CachedData<Snapshot>>> {
        self.load(SNAPSHOT_FILE)
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.save(SNAPSHOT_FILE, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Athlete, AthleteStatus, Attendance, Group};
    use chrono::Duration;

    fn aged(minutes: i64) -> CachedData<()> {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(minutes);
        cached
    }

    #[test]
    fn test_age_display() {
        assert_eq!(CachedData::new(()).age_display(), "just now");
        assert_eq!(aged(-5).age_display(), "just now");
        assert_eq!(aged(5).age_display(), "5m ago");
        assert_eq!(aged(89).age_display(), "1h ago");
        assert_eq!(aged(90).age_display(), "2h ago");
        assert_eq!(aged(3 * 1440).age_display(), "3d ago");
        assert_eq!(aged(1440 + 720).age_display(), "2d ago");
    }

    #[test]
    fn test_staleness() {
        assert!(!CachedData::new(()).is_stale());
        assert!(!aged(60).is_stale());
        assert!(aged(61).is_stale());
    }

    #[test]
    fn test_snapshot_round_trip_drops_checked() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().join("traintrack")).unwrap();
        assert!(cache.load_snapshot().unwrap().is_none());

        let snapshot = Snapshot {
            athletes: vec![Athlete {
                id: 1,
                name: "Alexey Smirnov".into(),
                group: "Boxers".into(),
                attendance: Attendance::new(95).unwrap(),
                status: AthleteStatus::Active,
                last_visit: "today".into(),
                checked: true,
            }],
            groups: vec![Group {
                id: 1,
                name: "Boxers".into(),
                count: 1,
                color: "bg-primary".into(),
            }],
            schedules: vec![],
        };
        cache.save_snapshot(&snapshot).unwrap();

        let cached = cache.load_snapshot().unwrap().expect("snapshot should be cached");
        assert_eq!(cached.data.groups, snapshot.groups);
        assert_eq!(cached.data.athletes[0].name, "Alexey Smirnov");
        assert!(!cached.data.athletes[0].checked);
        assert!(!cached.is_stale());
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("snapshot.json"), "{ not json").unwrap();

        assert!(cache.load_snapshot().is_err());
    }
}
