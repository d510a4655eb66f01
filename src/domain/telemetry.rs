// Telemetry data domain models
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_READING_CAPACITY: usize = 20;

/// Accepts numbers and numeric strings; anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_vibration<'de, D>(deserializer: D) -> Result<Option<Vibration>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Accelerometer (MPU) reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vibration {
    #[serde(rename = "X", default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(rename = "Y", default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    #[serde(rename = "Z", default, deserialize_with = "lenient_number")]
    pub z: Option<f64>,
}

impl Vibration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Largest absolute component. Missing components count as zero as long
    /// as at least one component was reported.
    pub fn magnitude(&self) -> Option<f64> {
        [self.x, self.y, self.z]
            .into_iter()
            .flatten()
            .map(f64::abs)
            .reduce(f64::max)
    }
}

/// One reading of the `Engine_Health` record, using the store's field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(rename = "Fuel", default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fuel_percent: Option<f64>,
    #[serde(rename = "Oil", default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub oil_percent: Option<f64>,
    #[serde(rename = "Temp", default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(rename = "Volt", default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub voltage_v: Option<f64>,
    #[serde(rename = "Humidity", default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub humidity_percent: Option<f64>,
    #[serde(rename = "Water", default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub coolant_percent: Option<f64>,
    #[serde(rename = "MPU", default, deserialize_with = "lenient_vibration", skip_serializing_if = "Option::is_none")]
    pub vibration: Option<Vibration>,
}

impl TelemetrySnapshot {
    /// Decode a raw JSON value. Anything that is not an object has no
    /// telemetry in it.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    pub fn vibration_magnitude(&self) -> Option<f64> {
        self.vibration.as_ref().and_then(Vibration::magnitude)
    }
}

/// Display formatting for a possibly missing value.
pub fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}{}", v, unit),
        None => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    pub time_ms: i64,
    pub snapshot: TelemetrySnapshot,
}

impl TelemetryReading {
    pub fn new(time_ms: i64, snapshot: TelemetrySnapshot) -> Self {
        Self { time_ms, snapshot }
    }
}

/// Recent readings kept for charts and the report.
#[derive(Debug, Clone)]
pub struct ReadingHistory {
    capacity: usize,
    readings: VecDeque<TelemetryReading>,
}

impl ReadingHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, reading: TelemetryReading) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn latest(&self) -> Option<&TelemetryReading> {
        self.readings.back()
    }

    pub fn to_vec(&self) -> Vec<TelemetryReading> {
        self.readings.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(id: &str, name: &str, unit: &str, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            points,
        }
    }
}

type Extractor = fn(&TelemetrySnapshot) -> Option<f64>;

const SERIES: [(&str, &str, &str, Extractor); 9] = [
    ("fuel", "Fuel", "%", |s| s.fuel_percent),
    ("oil", "Oil", "%", |s| s.oil_percent),
    ("voltage", "Voltage", "V", |s| s.voltage_v),
    ("temperature", "Temperature", "°C", |s| s.temperature_c),
    ("humidity", "Humidity", "%", |s| s.humidity_percent),
    ("coolant", "Coolant", "%", |s| s.coolant_percent),
    ("vibration_x", "Vibration X-Axis", "", |s| s.vibration.and_then(|v| v.x)),
    ("vibration_y", "Vibration Y-Axis", "", |s| s.vibration.and_then(|v| v.y)),
    ("vibration_z", "Vibration Z-Axis", "", |s| s.vibration.and_then(|v| v.z)),
];

/// Project readings into one chart series per metric. Readings that lack a
/// metric leave a gap in that series instead of plotting zero.
pub fn chart_series(readings: &[TelemetryReading]) -> Vec<SeriesData> {
    SERIES
        .iter()
        .map(|(id, name, unit, extract)| {
            let points = readings
                .iter()
                .filter_map(|r| extract(&r.snapshot).map(|v| TimeSeriesPoint::new(r.time_ms, v)))
                .collect();
            SeriesData::new(id, name, unit, points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_from_store_fields() {
        let value = json!({
            "Fuel": 55, "Oil": 72.5, "Temp": 81, "Volt": 12.9,
            "Humidity": 40, "Water": 66, "MPU": { "X": -12, "Y": 3, "Z": 9.5 }
        });
        let snapshot = TelemetrySnapshot::from_json(&value).unwrap();

        assert_eq!(snapshot.fuel_percent, Some(55.0));
        assert_eq!(snapshot.oil_percent, Some(72.5));
        assert_eq!(snapshot.voltage_v, Some(12.9));
        assert_eq!(snapshot.coolant_percent, Some(66.0));
        assert_eq!(snapshot.vibration_magnitude(), Some(12.0));
    }

    #[test]
    fn test_malformed_fields_are_absent() {
        let value = json!({
            "Fuel": "45", "Oil": "low", "Temp": true, "Volt": null,
            "Humidity": { "nested": 1 }, "MPU": "broken"
        });
        let snapshot = TelemetrySnapshot::from_json(&value).unwrap();

        assert_eq!(snapshot.fuel_percent, Some(45.0));
        assert_eq!(snapshot.oil_percent, None);
        assert_eq!(snapshot.temperature_c, None);
        assert_eq!(snapshot.voltage_v, None);
        assert_eq!(snapshot.humidity_percent, None);
        assert_eq!(snapshot.coolant_percent, None);
        assert_eq!(snapshot.vibration, None);
    }

    #[test]
    fn test_non_object_has_no_snapshot() {
        assert!(TelemetrySnapshot::from_json(&serde_json::Value::Null).is_none());
        assert!(TelemetrySnapshot::from_json(&json!(42)).is_none());
    }

    #[test]
    fn test_vibration_magnitude_with_missing_components() {
        let partial = Vibration { x: None, y: Some(-7.0), z: None };
        assert_eq!(partial.magnitude(), Some(7.0));
        assert_eq!(Vibration::default().magnitude(), None);
    }

    #[test]
    fn test_reading_history_evicts_oldest() {
        let mut history = ReadingHistory::new(3);
        for t in 0..5 {
            history.push(TelemetryReading::new(t, TelemetrySnapshot::default()));
        }
        let times: Vec<i64> = history.to_vec().iter().map(|r| r.time_ms).collect();
        assert_eq!(times, vec![2, 3, 4]);
        assert_eq!(history.latest().map(|r| r.time_ms), Some(4));
    }

    #[test]
    fn test_chart_series_skips_missing_values() {
        let readings = vec![
            TelemetryReading::new(1, TelemetrySnapshot { fuel_percent: Some(50.0), ..Default::default() }),
            TelemetryReading::new(2, TelemetrySnapshot::default()),
        ];
        let series = chart_series(&readings);
        let fuel = series.iter().find(|s| s.id == "fuel").unwrap();
        assert_eq!(fuel.points, vec![TimeSeriesPoint::new(1, 50.0)]);
        let oil = series.iter().find(|s| s.id == "oil").unwrap();
        assert!(oil.points.is_empty());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(13.2), "V"), "13.2V");
        assert_eq!(format_value(None, "V"), "N/A");
    }
}
