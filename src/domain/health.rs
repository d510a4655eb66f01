// Health evaluation results: alerts, suggestions, service recommendations
use serde::{Serialize, Serializer};

pub const PRIORITY_URGENT: u8 = 1;
pub const PRIORITY_SOON: u8 = 2;
pub const PRIORITY_RECOMMENDED: u8 = 3;
pub const PRIORITY_ROUTINE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// Escalated critical tier, e.g. oil below 15%.
    Urgent,
    Critical,
    Warning,
}

impl Severity {
    pub fn is_critical(self) -> bool {
        matches!(self, Severity::Urgent | Severity::Critical)
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Urgent => "URGENT",
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
}

impl Alert {
    pub fn new(message: String, severity: Severity) -> Self {
        Self { message, severity }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub message: String,
}

impl Suggestion {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceStatus {
    Urgent,
    Required,
    Soon,
    Recommended,
    Scheduled,
    Healthy,
}

impl ServiceStatus {
    pub fn label(self) -> &'static str {
        match self {
            ServiceStatus::Urgent => "URGENT",
            ServiceStatus::Required => "REQUIRED",
            ServiceStatus::Soon => "SOON",
            ServiceStatus::Recommended => "RECOMMENDED",
            ServiceStatus::Scheduled => "SCHEDULED",
            ServiceStatus::Healthy => "HEALTHY",
        }
    }
}

/// Display colour of a recommendation card, serialized as its hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Red,
    Amber,
    Blue,
    Green,
    Gray,
}

impl ColorTag {
    pub fn hex(self) -> &'static str {
        match self {
            ColorTag::Red => "#ef4444",
            ColorTag::Amber => "#f59e0b",
            ColorTag::Blue => "#3b82f6",
            ColorTag::Green => "#10b981",
            ColorTag::Gray => "#6b7280",
        }
    }
}

impl Serialize for ColorTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecommendation {
    pub title: String,
    pub status: ServiceStatus,
    pub condition: String,
    pub suggestion: String,
    /// 1 is most urgent, 4 is routine.
    pub priority: u8,
    pub color_tag: ColorTag,
}

impl ServiceRecommendation {
    pub fn new(
        title: &str,
        status: ServiceStatus,
        condition: String,
        suggestion: &str,
        priority: u8,
        color_tag: ColorTag,
    ) -> Self {
        Self {
            title: title.to_string(),
            status,
            condition,
            suggestion: suggestion.to_string(),
            priority,
            color_tag,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub alerts: Vec<Alert>,
    pub suggestions: Vec<Suggestion>,
    pub service_recommendations: Vec<ServiceRecommendation>,
}

impl EvaluationResult {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    pub fn critical_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.severity.is_critical())
    }
}
