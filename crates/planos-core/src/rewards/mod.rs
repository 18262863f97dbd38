//! Points, levels and achievements.
//!
//! Points only ever grow. Level and progress are derived from the point
//! total on every read and never stored. Achievements unlock once, when
//! the level first reaches their threshold, and stay unlocked.

use serde::{Deserialize, Serialize};

use crate::storage::{
    read_or_absent, write_or_warn, AchievementDef, KeyValueStore, ACHIEVEMENTS_KEY, POINTS_KEY,
};

/// Width of one level band.
pub const POINTS_PER_LEVEL: u64 = 100;

/// `floor(points / 100) + 1`.
pub fn level(points: u64) -> u64 {
    points / POINTS_PER_LEVEL + 1
}

/// Progress through the current level band, `0.0 ..< 100.0`.
pub fn progress_percent(points: u64) -> f64 {
    let level = level(points);
    let floor = (level - 1) * POINTS_PER_LEVEL;
    let ceiling = level * POINTS_PER_LEVEL;
    (points - floor) as f64 / (ceiling - floor) as f64 * 100.0
}

/// An unlockable flag tied to a level threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub level: u64,
    pub name: String,
    #[serde(default)]
    pub unlocked: bool,
}

impl From<&AchievementDef> for Achievement {
    fn from(def: &AchievementDef) -> Self {
        Self {
            level: def.level,
            name: def.name.clone(),
            unlocked: false,
        }
    }
}

/// Point total with its derived level and progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardsSnapshot {
    pub points: u64,
    pub level: u64,
    pub progress_percent: f64,
}

impl RewardsSnapshot {
    pub fn from_points(points: u64) -> Self {
        Self {
            points,
            level: level(points),
            progress_percent: progress_percent(points),
        }
    }
}

/// Result of one award.
#[derive(Debug, Clone, PartialEq)]
pub struct AwardOutcome {
    pub snapshot: RewardsSnapshot,
    /// Achievements unlocked by this award, each reported exactly once.
    pub unlocked: Vec<Achievement>,
}

/// Borrowing view over the `points` and `achievements` blobs.
pub struct RewardsLedger<'a, S: KeyValueStore + ?Sized> {
    store: &'a mut S,
    catalogue: &'a [AchievementDef],
}

impl<'a, S: KeyValueStore + ?Sized> RewardsLedger<'a, S> {
    pub fn new(store: &'a mut S, catalogue: &'a [AchievementDef]) -> Self {
        Self { store, catalogue }
    }

    /// Stored point total; absent or unparseable reads as 0.
    pub fn points(&self) -> u64 {
        let Some(raw) = read_or_absent(&*self.store, POINTS_KEY) else {
            return 0;
        };
        raw.trim().parse::<u64>().unwrap_or_else(|e| {
            tracing::warn!(value = %raw, error = %e, "points blob is corrupted, reading as 0");
            0
        })
    }

    pub fn snapshot(&self) -> RewardsSnapshot {
        RewardsSnapshot::from_points(self.points())
    }

    /// Persisted achievements followed by any catalogue entries not yet
    /// persisted. Persisted entries are never dropped or relocked.
    pub fn achievements(&self) -> Vec<Achievement> {
        let mut achievements = read_or_absent(&*self.store, ACHIEVEMENTS_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<Achievement>>(&raw) {
                Ok(list) => Some(list),
                Err(e) => {
                    tracing::warn!(error = %e, "achievements blob is corrupted, using catalogue");
                    None
                }
            })
            .unwrap_or_default();

        for def in self.catalogue {
            let known = achievements
                .iter()
                .any(|a| a.level == def.level && a.name == def.name);
            if !known {
                achievements.push(Achievement::from(def));
            }
        }
        achievements
    }

    /// Add points, persist, and unlock whatever the new level qualifies for.
    pub fn award(&mut self, amount: u64) -> AwardOutcome {
        let points = self.points().saturating_add(amount);
        write_or_warn(&mut *self.store, POINTS_KEY, &points.to_string());
        tracing::info!(amount, points, level = level(points), "points awarded");

        AwardOutcome {
            snapshot: RewardsSnapshot::from_points(points),
            unlocked: self.unlock_up_to(level(points)),
        }
    }

    /// Unlock every locked achievement whose threshold the stored level meets.
    ///
    /// Returns only the achievements unlocked by this call.
    pub fn evaluate_achievements(&mut self) -> Vec<Achievement> {
        let current = level(self.points());
        self.unlock_up_to(current)
    }

    fn unlock_up_to(&mut self, current_level: u64) -> Vec<Achievement> {
        let mut achievements = self.achievements();
        let mut newly_unlocked = Vec::new();
        for achievement in achievements.iter_mut() {
            if !achievement.unlocked && achievement.level <= current_level {
                achievement.unlocked = true;
                tracing::info!(
                    name = %achievement.name,
                    level = achievement.level,
                    "achievement unlocked"
                );
                newly_unlocked.push(achievement.clone());
            }
        }

        if !newly_unlocked.is_empty() {
            match serde_json::to_string(&achievements) {
                Ok(json) => {
                    write_or_warn(&mut *self.store, ACHIEVEMENTS_KEY, &json);
                }
                Err(e) => tracing::warn!(error = %e, "failed to serialize achievements"),
            }
        }
        newly_unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn catalogue() -> Vec<AchievementDef> {
        vec![
            AchievementDef {
                level: 2,
                name: "Getting Started".into(),
            },
            AchievementDef {
                level: 5,
                name: "Committed".into(),
            },
        ]
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level(0), 1);
        assert_eq!(level(99), 1);
        assert_eq!(level(100), 2);
        assert_eq!(level(250), 3);
    }

    #[test]
    fn progress_within_band() {
        assert_eq!(progress_percent(0), 0.0);
        assert_eq!(progress_percent(150), 50.0);
        assert_eq!(progress_percent(299), 99.0);
        assert_eq!(progress_percent(300), 0.0);
    }

    #[test]
    fn award_accumulates_and_persists() {
        let mut store = MemoryStore::new();
        let cat = catalogue();
        let mut ledger = RewardsLedger::new(&mut store, &cat);
        assert_eq!(ledger.award(15).snapshot.points, 15);
        let outcome = ledger.award(100);
        assert_eq!(outcome.snapshot, RewardsSnapshot::from_points(115));
        assert_eq!(store.get(POINTS_KEY).unwrap().as_deref(), Some("115"));
    }

    #[test]
    fn achievement_unlocks_once_at_threshold() {
        let mut store = MemoryStore::new();
        let cat = catalogue();
        let mut ledger = RewardsLedger::new(&mut store, &cat);

        assert!(ledger.award(50).unlocked.is_empty());
        let unlocked = ledger.award(50).unlocked;
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].name, "Getting Started");

        assert!(ledger.award(10).unlocked.is_empty());
        assert!(ledger.evaluate_achievements().is_empty());
        let stored = ledger.achievements();
        assert!(stored.iter().find(|a| a.level == 2).unwrap().unlocked);
        assert!(!stored.iter().find(|a| a.level == 5).unwrap().unlocked);
    }

    #[test]
    fn one_big_award_can_unlock_several() {
        let mut store = MemoryStore::new();
        let cat = catalogue();
        let mut ledger = RewardsLedger::new(&mut store, &cat);
        let unlocked = ledger.award(1000).unlocked;
        assert_eq!(unlocked.len(), 2);
    }

    #[test]
    fn unlocked_achievements_are_never_relocked() {
        let mut store = MemoryStore::new();
        store
            .set(ACHIEVEMENTS_KEY, r#"[{"level":2,"name":"Getting Started","unlocked":true}]"#)
            .unwrap();
        let cat = catalogue();
        let ledger = RewardsLedger::new(&mut store, &cat);
        let achievements = ledger.achievements();
        assert_eq!(achievements.len(), 2);
        assert!(achievements[0].unlocked);
        assert!(!achievements[1].unlocked);
    }

    #[test]
    fn corrupted_blobs_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(POINTS_KEY, "NaN").unwrap();
        store.set(ACHIEVEMENTS_KEY, "[{").unwrap();
        let cat = catalogue();
        let mut ledger = RewardsLedger::new(&mut store, &cat);
        assert_eq!(ledger.points(), 0);
        assert_eq!(ledger.achievements().len(), 2);
        assert_eq!(ledger.award(100).snapshot.points, 100);
    }

    #[test]
    fn points_saturate() {
        let mut store = MemoryStore::new();
        store.set(POINTS_KEY, &u64::MAX.to_string()).unwrap();
        let mut ledger = RewardsLedger::new(&mut store, &[]);
        assert_eq!(ledger.award(100).snapshot.points, u64::MAX);
    }
}
