use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::outcome::Outcome;
use crate::persist::{lenient_int, lenient_optional_flag, lenient_optional_int};
use crate::player::PlayerId;

/// Multiplier of a regular round.
pub const BASE_MULTIPLIER: i64 = 1;
/// Multiplier of a bock round.
pub const BOCK_MULTIPLIER: i64 = 2;

/// Stored form of one entry of a round's results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub key: PlayerId,
    #[serde(default)]
    pub value: Outcome,
}

/// Outcome per player for a single round.
///
/// Persisted as an array of `{key, value}` pairs. Decoding additionally accepts
/// an object keyed by player id and treats null as empty. Entries without a
/// readable key are skipped one by one. When a player id occurs more than once
/// the last entry wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundResults(BTreeMap<PlayerId, Outcome>);

impl RoundResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: &str) -> Option<Outcome> {
        self.0.get(player).copied()
    }

    pub fn contains(&self, player: &str) -> bool {
        self.0.contains_key(player)
    }

    pub fn insert(&mut self, player: impl Into<PlayerId>, outcome: Outcome) -> Option<Outcome> {
        self.0.insert(player.into(), outcome)
    }

    pub fn remove(&mut self, player: &str) -> Option<Outcome> {
        self.0.remove(player)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, Outcome)> {
        self.0.iter().map(|(id, outcome)| (id, *outcome))
    }

    pub fn win_count(&self) -> usize {
        self.0.values().filter(|o| o.is_win()).count()
    }

    pub fn lose_count(&self) -> usize {
        self.0.values().filter(|o| o.is_lose()).count()
    }

    /// Entries in the stored pair form.
    pub fn to_pairs(&self) -> Vec<ResultEntry> {
        self.0
            .iter()
            .map(|(key, value)| ResultEntry {
                key: key.clone(),
                value: *value,
            })
            .collect()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = ResultEntry>) -> Self {
        pairs
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }
}

impl FromIterator<(PlayerId, Outcome)> for RoundResults {
    fn from_iter<T: IntoIterator<Item = (PlayerId, Outcome)>>(iter: T) -> Self {
        let mut results = RoundResults::new();
        for (player, outcome) in iter {
            results.0.insert(player, outcome);
        }
        results
    }
}

impl Serialize for RoundResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_pairs())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResults {
    Pairs(Vec<Option<RawEntry>>),
    Keyed(BTreeMap<String, KeyedValue>),
    Missing(()),
    Malformed(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Entry(ResultEntry),
    Malformed(IgnoredAny),
}

impl RawEntry {
    fn into_entry(self) -> Option<ResultEntry> {
        match self {
            RawEntry::Entry(entry) => Some(entry),
            RawEntry::Malformed(_) => {
                tracing::warn!("result entry without a player key, skipping it");
                None
            }
        }
    }
}

/// Backends that turn arrays into objects keep the pair inside each value.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyedValue {
    Entry(ResultEntry),
    Outcome(Outcome),
}

impl<'de> Deserialize<'de> for RoundResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let results = match RawResults::deserialize(deserializer)? {
            RawResults::Pairs(pairs) => pairs
                .into_iter()
                .flatten()
                .filter_map(RawEntry::into_entry)
                .map(|entry| (entry.key, entry.value))
                .collect(),
            RawResults::Keyed(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    KeyedValue::Entry(entry) => (entry.key, entry.value),
                    KeyedValue::Outcome(outcome) => (key, outcome),
                })
                .collect(),
            RawResults::Missing(()) => RoundResults::new(),
            RawResults::Malformed(_) => {
                tracing::warn!("round results are neither pairs nor an object, treating as empty");
                RoundResults::new()
            }
        };
        Ok(results)
    }
}

/// A single round of a game.
///
/// `solo` is derived from the results and `multiplier` from `bock`; both are
/// kept in sync by every mutating method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RoundRecord")]
pub struct Round {
    id: usize,
    round_points: i64,
    cowardice_points: i64,
    multiplier: i64,
    solo: bool,
    bock: bool,
    results: RoundResults,
}

impl Round {
    pub fn new(id: usize, round_points: i64, cowardice_points: i64) -> Self {
        Self {
            id,
            round_points,
            cowardice_points,
            multiplier: BASE_MULTIPLIER,
            solo: false,
            bock: false,
            results: RoundResults::new(),
        }
    }

    pub fn with_bock(mut self, bock: bool) -> Self {
        self.set_bock(bock);
        self
    }

    pub fn with_results(mut self, results: RoundResults) -> Self {
        self.results = results;
        self.refresh_solo();
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    pub fn round_points(&self) -> i64 {
        self.round_points
    }

    pub fn set_round_points(&mut self, points: i64) {
        self.round_points = points;
    }

    pub fn cowardice_points(&self) -> i64 {
        self.cowardice_points
    }

    pub fn set_cowardice_points(&mut self, points: i64) {
        self.cowardice_points = points;
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier
    }

    pub fn is_bock(&self) -> bool {
        self.bock
    }

    pub fn set_bock(&mut self, bock: bool) {
        self.bock = bock;
        self.multiplier = if bock { BOCK_MULTIPLIER } else { BASE_MULTIPLIER };
    }

    pub fn toggle_bock(&mut self) {
        self.set_bock(!self.bock);
    }

    pub fn is_solo(&self) -> bool {
        self.solo
    }

    pub fn results(&self) -> &RoundResults {
        &self.results
    }

    /// Outcome of `player`; players without an entry count as unchanged.
    pub fn outcome(&self, player: &str) -> Outcome {
        self.results.get(player).unwrap_or_default()
    }

    pub fn set_outcome(&mut self, player: impl Into<PlayerId>, outcome: Outcome) {
        self.results.insert(player, outcome);
        self.refresh_solo();
    }

    pub fn clear_outcome(&mut self, player: &str) -> Option<Outcome> {
        let removed = self.results.remove(player);
        self.refresh_solo();
        removed
    }

    /// Points charged for `outcome` in this round: losers carry the stake,
    /// winners the cowardice bonus, both scaled by the multiplier. Saturates
    /// instead of overflowing.
    pub fn delta(&self, outcome: Outcome) -> i64 {
        match outcome {
            Outcome::Lose => self.round_points.saturating_mul(self.multiplier),
            Outcome::Win => self.cowardice_points.saturating_mul(self.multiplier),
            Outcome::Unchanged => 0,
        }
    }

    pub fn points_for(&self, player: &str) -> i64 {
        self.delta(self.outcome(player))
    }

    fn refresh_solo(&mut self) {
        self.solo = self.results.win_count() == 1 || self.results.lose_count() == 1;
    }
}

/// Round as the backend stores it; derived fields are recomputed on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoundRecord {
    #[serde(default, deserialize_with = "lenient_optional_int")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    round_points: i64,
    #[serde(default, deserialize_with = "lenient_int")]
    cowardice_points: i64,
    #[serde(default, deserialize_with = "lenient_optional_int")]
    multiplier: Option<i64>,
    #[serde(default, deserialize_with = "lenient_optional_flag")]
    bock: Option<bool>,
    #[serde(default)]
    results: RoundResults,
}

impl From<RoundRecord> for Round {
    fn from(record: RoundRecord) -> Self {
        // Renumbered by the owning game.
        let id = record
            .id
            .and_then(|id| usize::try_from(id).ok())
            .unwrap_or_default();
        let bock = record
            .bock
            .unwrap_or(record.multiplier == Some(BOCK_MULTIPLIER));
        if let Some(stored) = record.multiplier {
            let expected = if bock { BOCK_MULTIPLIER } else { BASE_MULTIPLIER };
            if stored != expected {
                tracing::debug!(
                    round = id,
                    stored,
                    expected,
                    "stored multiplier disagrees with bock flag"
                );
            }
        }
        Round::new(id, record.round_points, record.cowardice_points)
            .with_bock(bock)
            .with_results(record.results)
    }
}
