use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Sex of an animal as recorded in the uploaded sheet
///
/// Labels other than male/female are kept trimmed and lower-cased, so
/// "Unknown" and " unknown " are the same sex. Sorting is by label,
/// case-insensitive, which places e.g. "castrated" before "female".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sex {
    Female,
    Male,
    Other(String),
}

impl Sex {
    /// Parse a raw sex cell. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "male" | "m" => Sex::Male,
            "female" | "f" => Sex::Female,
            _ => Sex::Other(trimmed.to_lowercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
            Sex::Other(label) => label,
        }
    }

    fn sort_key(&self) -> &str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
            Sex::Other(label) => label,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
            Sex::Other(_) => 2,
        }
    }
}

impl Ord for Sex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(other.sort_key())
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl PartialOrd for Sex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Sex::parse(&raw))
    }
}

/// A validated animal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalRecord {
    #[serde(rename = "animalId", alias = "animal_id")]
    pub id: String,
    pub sex: Sex,
    pub genotype: String,
    #[serde(rename = "ageWeeks", alias = "age_weeks")]
    pub age_weeks: u32,
}

impl AnimalRecord {
    pub fn new(id: impl Into<String>, sex: Sex, genotype: impl Into<String>, age_weeks: u32) -> Self {
        Self {
            id: id.into(),
            sex,
            genotype: genotype.into(),
            age_weeks,
        }
    }

    /// Absolute age difference in weeks
    #[inline]
    pub fn age_gap(&self, other: &AnimalRecord) -> u32 {
        self.age_weeks.abs_diff(other.age_weeks)
    }
}

/// Two animals matched together by the pair matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub first: AnimalRecord,
    pub second: AnimalRecord,
    #[serde(rename = "ageDifference")]
    pub age_difference: u32,
}

impl Pair {
    pub fn new(first: AnimalRecord, second: AnimalRecord) -> Self {
        let age_difference = first.age_gap(&second);
        Self {
            first,
            second,
            age_difference,
        }
    }
}

/// Anything that can be placed in a group. Summaries walk the animals
/// behind each member, so a pair contributes both of its animals.
pub trait GroupMember {
    fn animals(&self) -> Vec<&AnimalRecord>;
}

impl GroupMember for AnimalRecord {
    fn animals(&self) -> Vec<&AnimalRecord> {
        vec![self]
    }
}

impl GroupMember for Pair {
    fn animals(&self) -> Vec<&AnimalRecord> {
        vec![&self.first, &self.second]
    }
}

/// Named bucket of animals or pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group<T> {
    pub name: String,
    pub members: Vec<T>,
}

impl<T> Group<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    #[serde(rename = "pairCount")]
    pub pair_count: usize,
    #[serde(rename = "unpairedCount")]
    pub unpaired_count: usize,
}

/// Output of one pair matcher run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub pairs: Vec<Pair>,
    pub unpaired: Vec<AnimalRecord>,
    pub counts: MatchCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionCounts {
    pub total: usize,
}

/// Output of one distributor run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionResult {
    pub groups: Vec<Group<AnimalRecord>>,
    pub counts: DistributionCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SexCounts {
    pub males: usize,
    pub females: usize,
}

/// Per-group counts for display and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub total: usize,
    pub males: usize,
    pub females: usize,
    #[serde(rename = "ageHistogram")]
    pub age_histogram: BTreeMap<u32, SexCounts>,
}

/// Whole-cohort breakdown shown above the group tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortOverview {
    #[serde(rename = "totalAnimals")]
    pub total_animals: usize,
    #[serde(rename = "byGenotype")]
    pub by_genotype: BTreeMap<String, usize>,
    #[serde(rename = "bySex")]
    pub by_sex: BTreeMap<String, usize>,
}
