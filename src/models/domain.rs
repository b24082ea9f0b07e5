use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Driver snapshot sent with a dispatch request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub is_available: bool,
    #[validate(range(min = 0.0))]
    pub daily_hours_used: f64,
    #[validate(range(min = 0.0))]
    pub weekly_hours_used: f64,
    #[serde(default)]
    pub adr_certificate: bool,
    #[serde(with = "flexible_date")]
    pub license_deadline: DateTime<Utc>,
    #[serde(with = "flexible_date")]
    pub cqc_deadline: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Vehicle snapshot sent with a dispatch request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub plate: String,
    pub brand: String,
    pub model: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    #[validate(range(min = 0.0))]
    pub max_capacity_kg: f64,
    #[validate(range(min = 0.0))]
    #[serde(default, rename = "maxCapacityM3")]
    pub max_capacity_m3: Option<f64>,
    pub is_available: bool,
    #[serde(with = "flexible_date")]
    pub revision_deadline: DateTime<Utc>,
    #[serde(with = "flexible_date")]
    pub insurance_deadline: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One stop along a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub city: String,
    #[serde(rename = "type")]
    pub stop_type: String,
}

/// Trip snapshot sent with a dispatch request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    /// Owned by the dashboard; see [`Trip::is_open`]
    pub status: String,
    pub cargo_type: String,
    #[validate(range(min = 0.0))]
    pub cargo_weight: f64,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default)]
    pub is_adr: bool,
    #[serde(with = "flexible_date")]
    pub start_date: DateTime<Utc>,
    #[validate(range(min = 0.0))]
    pub total_km: f64,
    pub estimated_cost: f64,
    #[validate(length(min = 1, message = "a trip needs at least one stop"))]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
}

impl Trip {
    /// Planned or in-progress trips are still open for assignment
    pub fn is_open(&self) -> bool {
        self.status.eq_ignore_ascii_case("PLANNED") || self.status.eq_ignore_ascii_case("IN_PROGRESS")
    }
}

/// Fleet snapshot sent alongside a query
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FleetContext {
    #[validate(nested)]
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[validate(nested)]
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[validate(nested)]
    #[serde(default)]
    pub trips: Vec<Trip>,
}

impl FleetContext {
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            drivers_total: self.drivers.len(),
            drivers_available: self.drivers.iter().filter(|d| d.is_available).count(),
            vehicles_total: self.vehicles.len(),
            vehicles_available: self.vehicles.iter().filter(|v| v.is_available).count(),
            trips_total: self.trips.len(),
            trips_open: self.trips.iter().filter(|t| t.is_open()).count(),
        }
    }
}

/// Headline counts for a fleet snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextSummary {
    pub drivers_total: usize,
    pub drivers_available: usize,
    pub vehicles_total: usize,
    pub vehicles_available: usize,
    pub trips_total: usize,
    pub trips_open: usize,
}

/// Accepts RFC 3339 timestamps, ISO timestamps without an offset and plain `YYYY-MM-DD` dates
pub mod flexible_date {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        // Local timestamps without an offset are read as UTC
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
