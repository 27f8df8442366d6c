//! Park Settings Model

use serde::{Deserialize, Serialize};

/// Operating hours as display strings (free text, never parsed as time)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    pub open_time: String,
    pub close_time: String,
    pub days: String,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            open_time: "10:00 AM".to_string(),
            close_time: "5:00 PM".to_string(),
            days: "Monday - Sunday".to_string(),
        }
    }
}

/// Ticket prices (whole currency units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    pub weekday: u32,
    pub weekend: u32,
}

impl Default for Prices {
    fn default() -> Self {
        Self {
            weekday: 400,
            weekend: 500,
        }
    }
}

/// Facility rental fees (whole currency units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facilities {
    pub locker_room: u32,
    pub swimming_costumes: u32,
}

impl Default for Facilities {
    fn default() -> Self {
        Self {
            locker_room: 50,
            swimming_costumes: 100,
        }
    }
}

/// Park settings entity (singleton)
///
/// Older records may lack `facilities`; serde defaults fill the gap so the
/// richest shape is always what the application sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkSettings {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timings: Timings,
    #[serde(default)]
    pub prices: Prices,
    #[serde(default)]
    pub facilities: Facilities,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl ParkSettings {
    /// Build the default settings record created lazily before first read
    pub fn with_defaults(now: i64) -> Self {
        Self {
            id: "main".to_string(),
            timings: Timings::default(),
            prices: Prices::default(),
            facilities: Facilities::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update, section by section
    pub fn merge(&mut self, update: ParkSettingsUpdate) {
        if let Some(timings) = update.timings {
            self.timings = timings;
        }
        if let Some(prices) = update.prices {
            self.prices = prices;
        }
        if let Some(facilities) = update.facilities {
            self.facilities = facilities;
        }
    }
}

/// Partial settings update payload
///
/// Each section is replaced wholesale when present; absent sections are
/// left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<Timings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<Prices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Facilities>,
}

impl ParkSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.timings.is_none() && self.prices.is_none() && self.facilities.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_replaces_only_present_sections() {
        let mut settings = ParkSettings::with_defaults(1000);
        settings.merge(ParkSettingsUpdate {
            prices: Some(Prices {
                weekday: 350,
                weekend: 500,
            }),
            ..Default::default()
        });

        assert_eq!(settings.prices.weekday, 350);
        assert_eq!(settings.prices.weekend, 500);
        // Untouched sections keep their committed values
        assert_eq!(settings.timings, Timings::default());
        assert_eq!(settings.facilities, Facilities::default());
    }

    #[test]
    fn test_settings_without_facilities_deserialize_with_defaults() {
        // Records written before the facilities section existed
        let json = r#"{
            "id": "main",
            "timings": {"open_time": "9:00 AM", "close_time": "6:00 PM", "days": "Mon - Sun"},
            "prices": {"weekday": 400, "weekend": 500},
            "created_at": 1, "updated_at": 1
        }"#;
        let settings: ParkSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.facilities, Facilities::default());
        assert_eq!(settings.timings.open_time, "9:00 AM");
    }

    #[test]
    fn test_update_skips_absent_sections_on_wire() {
        let update = ParkSettingsUpdate {
            timings: Some(Timings::default()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("timings"));
        assert!(!json.contains("prices"));
        assert!(!json.contains("facilities"));
    }
}
