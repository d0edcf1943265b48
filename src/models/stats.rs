use std::{cmp::Ordering, fmt};

use serde::{Serialize, Serializer, ser::SerializeSeq};

use crate::models::{
    rating::{MAX_SCORE, MIN_SCORE},
    store::Store,
};

/// Arithmetic mean of a set of scores, kept as an exact fraction.
///
/// Comparisons cross-multiply, so two stores with 9/2 and 45/10 compare
/// equal. Rendering rounds half up to two decimals; an empty set renders as
/// `0.00`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Average {
    sum: u64,
    count: u64,
}

impl Average {
    pub fn new(sum: u64, count: u64) -> Self {
        Self { sum, count }
    }

    pub fn of_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = i16>,
    {
        scores.into_iter().fold(Self::default(), |mut acc, score| {
            acc.add(score);
            acc
        })
    }

    pub fn add(&mut self, score: i16) {
        self.sum += u64::from(score.unsigned_abs());
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Average) {
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn hundredths(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        (self.sum * 200 + self.count) / (2 * self.count)
    }

    /// True when the mean reaches `threshold`. An empty set never does.
    pub fn at_least(&self, threshold: f64) -> bool {
        self.count > 0 && self.sum as f64 >= threshold * self.count as f64
    }

    fn denominator(&self) -> u128 {
        u128::from(self.count.max(1))
    }
}

impl Ord for Average {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.sum) * other.denominator();
        let rhs = u128::from(other.sum) * self.denominator();
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Average {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Average {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Average {}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hundredths = self.hundredths();
        write!(f, "{}.{:02}", hundredths / 100, hundredths % 100)
    }
}

impl Serialize for Average {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub score: i16,
    pub count: u64,
}

/// Count of ratings per score level. Serializes as `[{score, count}]` from 5
/// down to 1, every level present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Distribution {
    buckets: [u64; 5],
}

impl Distribution {
    pub fn record(&mut self, score: i16) {
        if let Some(bucket) = Self::slot(score).and_then(|i| self.buckets.get_mut(i)) {
            *bucket += 1;
        }
    }

    pub fn count(&self, score: i16) -> u64 {
        Self::slot(score)
            .and_then(|i| self.buckets.get(i).copied())
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    pub fn entries(&self) -> Vec<DistributionEntry> {
        (MIN_SCORE..=MAX_SCORE)
            .rev()
            .map(|score| DistributionEntry {
                score,
                count: self.count(score),
            })
            .collect()
    }

    fn slot(score: i16) -> Option<usize> {
        if (MIN_SCORE..=MAX_SCORE).contains(&score) {
            usize::try_from(score - MIN_SCORE).ok()
        } else {
            None
        }
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut seq = serializer.serialize_seq(Some(entries.len()))?;
        for entry in &entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub count: u64,
    pub average: Average,
    pub distribution: Distribution,
}

impl StoreStats {
    pub fn record(&mut self, score: i16) {
        self.count += 1;
        self.average.add(score);
        self.distribution.record(score);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersByRole {
    pub admin: u64,
    pub store_owner: u64,
    pub user: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
    pub users_by_role: UsersByRole,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStore {
    #[serde(flatten)]
    pub store: Store,
    pub average: Average,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaterSummary {
    pub count: u64,
    pub average: Average,
}
