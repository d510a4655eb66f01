// Plain-text health report offered as a download
use crate::application::monitoring_service::DashboardState;
use crate::domain::telemetry::{TelemetryReading, TelemetrySnapshot, Vibration, format_value};
use crate::domain::vehicle::VehicleProfile;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Write;

pub const DEFAULT_REPORT_READINGS: usize = 5;

pub fn report_file_name(generated_at: DateTime<Utc>) -> String {
    format!("engine-health-report-{}.txt", generated_at.format("%Y%m%d-%H%M%S"))
}

/// Render the report. `recent` limits how many historical readings are listed.
pub fn render_report(
    profile: Option<&VehicleProfile>,
    state: &DashboardState,
    generated_at: DateTime<Utc>,
    recent: usize,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, profile, state, generated_at, recent)?;
    Ok(out)
}

fn write_report(
    out: &mut String,
    profile: Option<&VehicleProfile>,
    state: &DashboardState,
    generated_at: DateTime<Utc>,
    recent: usize,
) -> std::fmt::Result {
    writeln!(out, "VEHICLE HEALTH REPORT")?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    if let Some(profile) = profile {
        writeln!(out, "Vehicle: {}", profile.display_name())?;
    }
    if !state.connected && state.latest.is_some() {
        writeln!(out, "Telemetry connection lost: readings may be stale")?;
    }
    writeln!(out)?;

    writeln!(out, "VEHICLE DETAILS")?;
    let field = |value: Option<&str>| match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "N/A".to_string(),
    };
    writeln!(out, "Car Name: {}", field(profile.map(|p| p.car_name.as_str())))?;
    writeln!(out, "Car Number: {}", field(profile.map(|p| p.car_number.as_str())))?;
    writeln!(out, "Owner: {}", field(profile.map(|p| p.user_name.as_str())))?;
    writeln!(out, "Phone: {}", field(profile.map(|p| p.phone_number.as_str())))?;
    writeln!(out)?;

    writeln!(out, "CURRENT READINGS")?;
    match &state.latest {
        Some(reading) => write_snapshot(out, &reading.snapshot)?,
        None => writeln!(out, "No telemetry received yet.")?,
    }
    writeln!(out)?;

    let evaluation = state.evaluation.clone().unwrap_or_default();

    writeln!(out, "ACTIVE ALERTS ({})", evaluation.alerts.len())?;
    if !evaluation.has_alerts() {
        writeln!(out, "None")?;
    }
    for alert in &evaluation.alerts {
        writeln!(out, "- [{}] {}", alert.severity.label(), alert.message)?;
    }
    writeln!(out)?;

    writeln!(out, "SUGGESTIONS")?;
    if evaluation.suggestions.is_empty() {
        writeln!(out, "None")?;
    }
    for suggestion in &evaluation.suggestions {
        writeln!(out, "- {}", suggestion.message)?;
    }
    writeln!(out)?;

    writeln!(out, "SERVICE RECOMMENDATIONS")?;
    if evaluation.service_recommendations.is_empty() {
        writeln!(out, "None")?;
    }
    for item in &evaluation.service_recommendations {
        writeln!(out, "- [P{} {}] {}: {}", item.priority, item.status.label(), item.title, item.condition)?;
        writeln!(out, "  {}", item.suggestion)?;
    }
    writeln!(out)?;

    let skip = state.readings.len().saturating_sub(recent);
    let history: Vec<&TelemetryReading> = state.readings.iter().skip(skip).collect();
    writeln!(out, "RECENT HISTORY (last {})", history.len())?;
    if history.is_empty() {
        writeln!(out, "None")?;
    }
    for reading in history {
        let s = &reading.snapshot;
        writeln!(
            out,
            "- {} | Fuel {} | Oil {} | Temp {} | Volt {} | Humidity {} | Coolant {} | Vibration {}",
            format_time(reading.time_ms),
            format_value(s.fuel_percent, "%"),
            format_value(s.oil_percent, "%"),
            format_value(s.temperature_c, "°C"),
            format_value(s.voltage_v, "V"),
            format_value(s.humidity_percent, "%"),
            format_value(s.coolant_percent, "%"),
            format_value(s.vibration_magnitude(), ""),
        )?;
    }
    Ok(())
}

fn write_snapshot(out: &mut String, s: &TelemetrySnapshot) -> std::fmt::Result {
    writeln!(out, "Fuel: {}", format_value(s.fuel_percent, "%"))?;
    writeln!(out, "Oil: {}", format_value(s.oil_percent, "%"))?;
    writeln!(out, "Temperature: {}", format_value(s.temperature_c, "°C"))?;
    writeln!(out, "Voltage: {}", format_value(s.voltage_v, "V"))?;
    writeln!(out, "Humidity: {}", format_value(s.humidity_percent, "%"))?;
    writeln!(out, "Coolant: {}", format_value(s.coolant_percent, "%"))?;
    let axis = |pick: fn(&Vibration) -> Option<f64>| {
        format_value(s.vibration.as_ref().and_then(pick), "")
    };
    writeln!(
        out,
        "Vibration: X {} / Y {} / Z {}",
        axis(|v| v.x),
        axis(|v| v.y),
        axis(|v| v.z)
    )
}

fn format_time(time_ms: i64) -> String {
    match Utc.timestamp_millis_opt(time_ms).single() {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => time_ms.to_string(),
    }
}
