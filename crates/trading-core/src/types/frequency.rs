//! Data frequency definitions for simulations and bundle ingestion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar frequency of a simulation or of an ingested bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataFrequency {
    /// Daily bars
    #[default]
    Daily,
    /// Minute bars
    Minute,
}

impl DataFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFrequency::Daily => "daily",
            DataFrequency::Minute => "minute",
        }
    }
}

impl fmt::Display for DataFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(DataFrequency::Daily),
            "minute" => Ok(DataFrequency::Minute),
            _ => Err(format!("Invalid data frequency: {}", s)),
        }
    }
}

/// A non-empty, duplicate-free set of frequencies, as accepted by ingestion
/// (`daily`, `minute`, `daily,minute`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<DataFrequency>", try_from = "Vec<DataFrequency>")]
pub struct FrequencySet(Vec<DataFrequency>);

impl FrequencySet {
    pub fn single(frequency: DataFrequency) -> Self {
        Self(vec![frequency])
    }

    pub fn contains(&self, frequency: DataFrequency) -> bool {
        self.0.contains(&frequency)
    }
}

impl Default for FrequencySet {
    fn default() -> Self {
        Self::single(DataFrequency::Daily)
    }
}

impl From<FrequencySet> for Vec<DataFrequency> {
    fn from(set: FrequencySet) -> Self {
        set.0
    }
}

impl TryFrom<Vec<DataFrequency>> for FrequencySet {
    type Error = String;

    fn try_from(mut frequencies: Vec<DataFrequency>) -> Result<Self, Self::Error> {
        frequencies.sort();
        frequencies.dedup();
        if frequencies.is_empty() {
            return Err("at least one data frequency is required".to_string());
        }
        Ok(Self(frequencies))
    }
}

impl fmt::Display for FrequencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(DataFrequency::as_str).collect();
        f.write_str(&names.join(","))
    }
}

impl FromStr for FrequencySet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let frequencies = s
            .split(',')
            .map(DataFrequency::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from(frequencies)
    }
}
