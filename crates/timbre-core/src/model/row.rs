use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::model::feature::Feature;

/// A single raw record from the data layer (usually one track), already
/// joined with the entity that owns it.
///
/// Deserializes from a flat object such as
/// `{"entity": "Daft Punk", "danceability": 0.8, "tempo": 123.0, ...}`.
/// A `null`, absent or non-numeric feature column is missing data. Columns
/// that are not audio features (ids, release dates, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureRow {
    #[serde(alias = "name")]
    pub entity: String,

    /// Time period the row was charted in, e.g. the chart year.
    #[serde(
        default,
        alias = "year",
        deserialize_with = "period_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub period: Option<String>,

    #[serde(flatten, deserialize_with = "feature_columns")]
    pub values: BTreeMap<String, Option<f64>>,
}

/// Keep the feature columns of a flattened row, keyed by canonical name.
fn feature_columns<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, LooseValue>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            key.parse::<Feature>()
                .ok()
                .map(|feature| (feature.name().to_string(), value.number()))
        })
        .collect())
}

/// A period given as text (`"2019"`, `"2019-05"`) or as a number (`2019`).
fn period_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        LooseValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{n:.0}")),
        LooseValue::Number(n) if n.is_finite() => Some(n.to_string()),
        _ => None,
    })
}

/// Any JSON value, reduced to what a row cares about.
enum LooseValue {
    Number(f64),
    Text(String),
    Empty,
}

impl LooseValue {
    fn number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LooseValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(LooseValueVisitor)
    }
}

struct LooseValueVisitor;

impl<'de> Visitor<'de> for LooseValueVisitor {
    type Value = LooseValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Number(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Number(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Text(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Empty)
    }

    fn visit_bytes<E: de::Error>(self, _: &[u8]) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Empty)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Empty)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(LooseValue::Empty)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Self::Value, D::Error> {
        LooseValue::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(LooseValue::Empty)
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(LooseValue::Empty)
    }
}

impl RawFeatureRow {
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            period: None,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn in_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    #[must_use]
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.values.insert(feature.name().to_string(), Some(value));
        self
    }

    /// The value of a feature, or `None` when it is absent, null or not finite.
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values
            .get(feature.name())
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }

    /// Extract the requested columns, failing on the first missing one.
    pub fn require(&self, columns: &[Feature]) -> Result<Vec<f64>> {
        columns
            .iter()
            .map(|&feature| {
                self.get(feature).ok_or_else(|| Error::MissingFeatureData {
                    entity: self.entity.clone(),
                    feature: feature.name().to_string(),
                })
            })
            .collect()
    }
}

/// One row per base entity (song or artist), with one slot per table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFeatureRow {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl EntityFeatureRow {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A row with every value present.
    #[must_use]
    pub fn complete(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied().map(Some).collect())
    }

    /// All values, or the first missing column when the row is incomplete.
    pub fn complete_values(&self, columns: &[Feature]) -> Result<Vec<f64>> {
        if self.values.len() != columns.len() {
            return Err(Error::InvalidData(format!(
                "row {} has {} values for {} columns",
                self.name,
                self.values.len(),
                columns.len()
            )));
        }
        self.values
            .iter()
            .zip(columns)
            .map(|(value, feature)| {
                value
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| Error::MissingFeatureData {
                        entity: self.name.clone(),
                        feature: feature.name().to_string(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_row_from_json() {
        let row: RawFeatureRow = serde_json::from_value(json!({
            "entity": "Daft Punk",
            "danceability": 0.8,
            "tempo": 123.0,
            "key": null
        }))
        .unwrap();

        assert_eq!(row.entity, "Daft Punk");
        assert_eq!(row.get(Feature::Danceability), Some(0.8));
        assert_eq!(row.get(Feature::Key), None);
        assert_eq!(row.get(Feature::Energy), None);
    }

    #[test]
    fn test_raw_row_ignores_non_feature_columns() {
        let rows: Vec<RawFeatureRow> = serde_json::from_value(json!([{
            "entity": "Air",
            "track_id": "3n3Ppam7vgaVa1iaRUc9Lp",
            "artist_id": "0ZrpamOxcZybMHGg1AYtHP",
            "release_date": "1998-01-16",
            "popularity": 71,
            "explicit": false,
            "genres": ["french house", "downtempo"],
            "energy": 0.5,
            "Tempo": 96,
            "valence": "high"
        }]))
        .unwrap();

        let row = &rows[0];
        assert_eq!(row.entity, "Air");
        assert_eq!(row.get(Feature::Energy), Some(0.5));
        assert_eq!(row.get(Feature::Tempo), Some(96.0));
        assert_eq!(row.get(Feature::Valence), None);
        assert!(row.values.keys().all(|k| k.parse::<Feature>().is_ok()));
        assert_eq!(row.values.len(), 3);
    }

    #[test]
    fn test_raw_row_period() {
        let rows: Vec<RawFeatureRow> = serde_json::from_value(json!([
            {"entity": "A", "year": 2019, "energy": 0.5},
            {"entity": "B", "period": "2020-05", "energy": 0.5},
            {"entity": "C", "year": null, "energy": 0.5},
            {"entity": "D", "energy": 0.5}
        ]))
        .unwrap();

        let periods: Vec<Option<&str>> = rows.iter().map(|r| r.period.as_deref()).collect();
        assert_eq!(periods, vec![Some("2019"), Some("2020-05"), None, None]);
        assert!(rows.iter().all(|r| !r.values.contains_key("year")));
    }

    #[test]
    fn test_raw_row_name_alias() {
        let row: RawFeatureRow =
            serde_json::from_value(json!({"name": "Around the World", "energy": 0.7})).unwrap();
        assert_eq!(row.entity, "Around the World");
    }

    #[test]
    fn test_require_reports_missing_feature() {
        let row = RawFeatureRow::new("A").with(Feature::Energy, 0.5);
        let err = row
            .require(&[Feature::Energy, Feature::Valence])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingFeatureData { ref entity, ref feature }
                if entity == "A" && feature == "valence"
        ));
    }

    #[test]
    fn test_non_finite_value_is_missing() {
        let row = RawFeatureRow::new("A").with(Feature::Tempo, f64::NAN);
        assert_eq!(row.get(Feature::Tempo), None);
    }

    #[test]
    fn test_complete_values() {
        let columns = [Feature::Energy, Feature::Tempo];
        let row = EntityFeatureRow::complete("A", &[0.5, 120.0]);
        assert_eq!(row.complete_values(&columns).unwrap(), vec![0.5, 120.0]);

        let partial = EntityFeatureRow::new("B", vec![Some(0.5), None]);
        assert!(partial.complete_values(&columns).is_err());
    }
}
