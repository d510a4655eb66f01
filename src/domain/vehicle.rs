// Vehicle profile domain model
use serde::{Deserialize, Serialize};

/// User-entered vehicle details, stored per user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    #[serde(default)]
    pub car_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub car_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl VehicleProfile {
    /// Header line used by the dashboard and the report.
    pub fn display_name(&self) -> String {
        match (self.car_name.trim(), self.car_number.trim()) {
            ("", "") => "Unnamed vehicle".to_string(),
            (name, "") => name.to_string(),
            ("", plate) => plate.to_string(),
            (name, plate) => format!("{} ({})", name, plate),
        }
    }

    /// Case-insensitive substring match over every searchable field.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(self.car_name.as_str()),
            Some(self.car_number.as_str()),
            Some(self.user_name.as_str()),
            Some(self.phone_number.as_str()),
            self.user_email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// A profile as listed in the admin view, keyed by user id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVehicle {
    pub user_id: String,
    pub profile: VehicleProfile,
}

pub fn filter_profiles(profiles: Vec<UserVehicle>, search: &str) -> Vec<UserVehicle> {
    profiles.into_iter().filter(|p| p.profile.matches(search)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> VehicleProfile {
        VehicleProfile {
            car_name: "Swift".to_string(),
            user_name: "Asha".to_string(),
            phone_number: "9876543210".to_string(),
            car_number: "KA01AB1234".to_string(),
            user_email: Some("asha@example.com".to_string()),
            last_updated: None,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(profile().display_name(), "Swift (KA01AB1234)");
        assert_eq!(VehicleProfile::default().display_name(), "Unnamed vehicle");
    }

    #[test]
    fn test_matches_any_field_case_insensitive() {
        let p = profile();
        assert!(p.matches("swift"));
        assert!(p.matches("ka01"));
        assert!(p.matches("EXAMPLE.COM"));
        assert!(p.matches("98765"));
        assert!(p.matches("  "));
        assert!(!p.matches("civic"));
    }

    #[test]
    fn test_filter_profiles() {
        let profiles = vec![
            UserVehicle { user_id: "u1".to_string(), profile: profile() },
            UserVehicle { user_id: "u2".to_string(), profile: VehicleProfile::default() },
        ];
        let found = filter_profiles(profiles, "asha");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, "u1");
    }

    #[test]
    fn test_deserialize_store_record() {
        let json = r#"{"carName":"City","userName":"Ravi","phoneNumber":"1","carNumber":"TN09","lastUpdated":"2026-01-01T00:00:00Z"}"#;
        let profile: VehicleProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.car_name, "City");
        assert_eq!(profile.user_email, None);
        assert_eq!(profile.last_updated.as_deref(), Some("2026-01-01T00:00:00Z"));
    }
}
