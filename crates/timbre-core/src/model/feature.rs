use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the audio features describing a track.
///
/// The declaration order is the canonical column order used everywhere a
/// feature vector is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Danceability,
    Energy,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Speechiness,
    /// Pitch class, 0 (C) through 11 (B).
    Key,
    /// 1 for major, 0 for minor.
    Mode,
    /// Beats per minute.
    Tempo,
    /// Beats per bar.
    TimeSignature,
}

/// The natural range a feature's raw values fall into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureRange {
    /// Continuous values in `[0, 1]`.
    Unit,
    /// Integer classes `0..=max`.
    Class { max: u8 },
    /// Positive values without a fixed upper bound.
    Unbounded,
}

impl Feature {
    /// Every feature, in canonical column order.
    pub const ALL: [Self; 11] = [
        Self::Danceability,
        Self::Energy,
        Self::Acousticness,
        Self::Instrumentalness,
        Self::Liveness,
        Self::Valence,
        Self::Speechiness,
        Self::Key,
        Self::Mode,
        Self::Tempo,
        Self::TimeSignature,
    ];

    /// The perceptual descriptors, each a confidence in `[0, 1]`. Chart
    /// trends are tracked over these.
    pub const DESCRIPTORS: [Self; 7] = [
        Self::Danceability,
        Self::Energy,
        Self::Acousticness,
        Self::Instrumentalness,
        Self::Liveness,
        Self::Valence,
        Self::Speechiness,
    ];

    /// The snake_case column name used in input rows and weight maps.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Acousticness => "acousticness",
            Self::Instrumentalness => "instrumentalness",
            Self::Liveness => "liveness",
            Self::Valence => "valence",
            Self::Speechiness => "speechiness",
            Self::Key => "key",
            Self::Mode => "mode",
            Self::Tempo => "tempo",
            Self::TimeSignature => "time_signature",
        }
    }

    pub const fn range(self) -> FeatureRange {
        match self {
            Self::Key => FeatureRange::Class { max: 11 },
            Self::Tempo | Self::TimeSignature => FeatureRange::Unbounded,
            _ => FeatureRange::Unit,
        }
    }

    /// Position of this feature in [`Feature::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|feature| feature.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::InvalidWeightFeature {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for FeatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("[0, 1]"),
            Self::Class { max } => write!(f, "integer 0..={max}"),
            Self::Unbounded => f.write_str("positive, unbounded"),
        }
    }
}
