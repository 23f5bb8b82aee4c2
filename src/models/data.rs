//! Read models for the machine data endpoint (`GET /api/v1/data`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which series the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Weight,
    Food,
    Both,
}

impl DataType {
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw.unwrap_or("both") {
            "weight" => Ok(Self::Weight),
            "food" => Ok(Self::Food),
            "both" | "" => Ok(Self::Both),
            _ => Err("type must be weight, food, or both".to_string()),
        }
    }

    pub fn includes_weight(self) -> bool {
        matches!(self, Self::Weight | Self::Both)
    }

    pub fn includes_food(self) -> bool {
        matches!(self, Self::Food | Self::Both)
    }
}

/// Query string for the data endpoint.
///
/// `from` and `to` are inclusive calendar dates (`YYYY-MM-DD`, UTC).
#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Validated form of [`DataQuery`].
#[derive(Debug, Clone, Copy)]
pub struct DataRange {
    pub data_type: DataType,
    pub start: DateTime<Utc>,
    /// Exclusive upper bound (start of the day after `to`)
    pub end: DateTime<Utc>,
}

impl DataQuery {
    pub fn into_range(self) -> Result<DataRange, String> {
        let data_type = DataType::parse(self.data_type.as_deref())?;

        let (Some(from), Some(to)) = (self.from, self.to) else {
            return Err("from and to date parameters are required (YYYY-MM-DD)".to_string());
        };
        let from = NaiveDate::parse_from_str(&from, "%Y-%m-%d")
            .map_err(|_| "invalid from date format, expected YYYY-MM-DD".to_string())?;
        let to = NaiveDate::parse_from_str(&to, "%Y-%m-%d")
            .map_err(|_| "invalid to date format, expected YYYY-MM-DD".to_string())?;
        if to < from {
            return Err("to must not be before from".to_string());
        }

        let start = from
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| "invalid from date".to_string())?
            .and_utc();
        let end = to
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| "invalid to date".to_string())?
            .and_utc();

        Ok(DataRange {
            data_type,
            start,
            end,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct WeightEntry {
    pub weight: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct FoodEntry {
    pub food: String,
    pub calories: i32,
    pub weight: f64,
    pub kcal_per_100g: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proteins: Option<f64>,
    pub meal_datetime: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize)]
pub struct DataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Vec<WeightEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food: Option<Vec<FoodEntry>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(t: Option<&str>, from: Option<&str>, to: Option<&str>) -> DataQuery {
        DataQuery {
            data_type: t.map(String::from),
            from: from.map(String::from),
            to: to.map(String::from),
        }
    }

    #[test]
    fn test_range_defaults_to_both_and_is_inclusive() {
        let range = query(None, Some("2025-01-01"), Some("2025-01-31"))
            .into_range()
            .unwrap();
        assert_eq!(range.data_type, DataType::Both);
        assert_eq!(range.start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(range.end.to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_range_rejects_bad_input() {
        assert!(query(Some("steps"), Some("2025-01-01"), Some("2025-01-02")).into_range().is_err());
        assert!(query(None, None, Some("2025-01-02")).into_range().is_err());
        assert!(query(None, Some("01/01/2025"), Some("2025-01-02")).into_range().is_err());
        assert!(query(None, Some("2025-01-03"), Some("2025-01-02")).into_range().is_err());
    }
}
