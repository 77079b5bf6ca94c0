//! Entity records persisted in the LifeTracker tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fixed-width UTC timestamp text with millisecond precision.
///
/// Stored text sorts lexicographically in chronological order.
pub mod timestamp {
    use chrono::{DateTime, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    /// Current time truncated to milliseconds.
    pub fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    pub fn format(value: &DateTime<Utc>) -> String {
        value.format(FORMAT).to_string()
    }

    /// Parse any RFC 3339 timestamp into UTC, truncated to milliseconds.
    pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value.trim())
            .map(|parsed| parsed.with_timezone(&Utc).trunc_subsecs(3))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Kind of tracked activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Food,
    Drink,
    Exercise,
    Supplement,
    Sleep,
    Smoking,
    Stomach,
    Other,
}

impl ActivityType {
    pub const ALL: [ActivityType; 8] = [
        ActivityType::Food,
        ActivityType::Drink,
        ActivityType::Exercise,
        ActivityType::Supplement,
        ActivityType::Sleep,
        ActivityType::Smoking,
        ActivityType::Stomach,
        ActivityType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Food => "food",
            ActivityType::Drink => "drink",
            ActivityType::Exercise => "exercise",
            ActivityType::Supplement => "supplement",
            ActivityType::Sleep => "sleep",
            ActivityType::Smoking => "smoking",
            ActivityType::Stomach => "stomach",
            ActivityType::Other => "other",
        }
    }

    /// Food and drink entries carry nutritional data.
    pub fn is_food_or_drink(&self) -> bool {
        matches!(self, ActivityType::Food | ActivityType::Drink)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let allowed: Vec<&str> = ActivityType::ALL.iter().map(ActivityType::as_str).collect();
                format!(
                    "unknown activity type `{value}` (expected one of: {})",
                    allowed.join(", ")
                )
            })
    }
}

/// Reads a present field as `Some`, including an explicit `null`.
///
/// Paired with `#[serde(default)]`, only an absent field becomes `None`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// One tracked event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub owner: String,
    pub activity_type: ActivityType,
    pub raw_input: String,
    /// Structured interpretation of `raw_input`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub processed_data: Option<Value>,
    /// When the activity happened.
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ActivityLog {
    /// New unsaved log; `timestamp` defaults to now.
    pub fn new(
        owner: impl Into<String>,
        activity_type: ActivityType,
        raw_input: impl Into<String>,
        processed_data: Option<Value>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: String::new(),
            owner: owner.into(),
            activity_type,
            raw_input: raw_input.into(),
            processed_data,
            timestamp: timestamp.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Nutritional breakdown of a food or drink entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodProcessedData {
    /// Detailed interpretation, e.g. "150g grilled chicken breast".
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_portion_size: Option<String>,
    /// Grams per macronutrient.
    pub macro_nutrients: BTreeMap<String, f64>,
    /// Amount text per micronutrient, e.g. "485mg".
    pub micro_nutrients: BTreeMap<String, String>,
    pub glycemic_load: i64,
}

impl FoodProcessedData {
    pub const MAX_GLYCEMIC_LOAD: i64 = 50;

    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("processed_data.description must not be empty".to_string());
        }
        if !(0..=Self::MAX_GLYCEMIC_LOAD).contains(&self.glycemic_load) {
            return Err(format!(
                "processed_data.glycemic_load must be between 0 and {}, got {}",
                Self::MAX_GLYCEMIC_LOAD,
                self.glycemic_load
            ));
        }
        if let Some((name, grams)) = self
            .macro_nutrients
            .iter()
            .find(|(_, grams)| !grams.is_finite() || **grams < 0.0)
        {
            return Err(format!(
                "processed_data.macro_nutrients.{name} must be a non-negative number, got {grams}"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseIntensity {
    Low,
    Moderate,
    High,
}

/// Exercise session details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProcessedData {
    pub duration_min: i64,
    /// e.g. "running", "yoga".
    pub exercise_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<ExerciseIntensity>,
}

impl ExerciseProcessedData {
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_min < 1 {
            return Err(format!(
                "processed_data.duration_min must be at least 1, got {}",
                self.duration_min
            ));
        }
        if self.exercise_type.trim().is_empty() {
            return Err("processed_data.exercise_type must not be empty".to_string());
        }
        Ok(())
    }
}

/// Per-owner profile; the owner is the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
    /// Free-form extra data.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Empty profile for `owner`, stamped now.
    pub fn new(owner: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            owner: owner.into(),
            email: None,
            gender: None,
            date_of_birth: None,
            weight: None,
            height: None,
            activity_level: None,
            dietary_preferences: None,
            health_goals: None,
            allergies: None,
            medications: None,
            attributes: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update.
///
/// Present scalar fields overwrite. Attribute keys merge into the existing
/// map, and a `null` value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Option<String>,
    #[serde(default)]
    pub health_goals: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

impl ProfilePatch {
    /// Apply the patch and bump `updated_at`; `created_at` is untouched.
    pub fn apply(&self, mut profile: UserProfile, now: DateTime<Utc>) -> UserProfile {
        fn overwrite<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
            if let Some(value) = value {
                *field = Some(value.clone());
            }
        }

        overwrite(&mut profile.email, &self.email);
        overwrite(&mut profile.gender, &self.gender);
        overwrite(&mut profile.date_of_birth, &self.date_of_birth);
        overwrite(&mut profile.weight, &self.weight);
        overwrite(&mut profile.height, &self.height);
        overwrite(&mut profile.activity_level, &self.activity_level);
        overwrite(&mut profile.dietary_preferences, &self.dietary_preferences);
        overwrite(&mut profile.health_goals, &self.health_goals);
        overwrite(&mut profile.allergies, &self.allergies);
        overwrite(&mut profile.medications, &self.medications);
        if let Some(attributes) = &self.attributes {
            for (key, value) in attributes {
                if value.is_null() {
                    profile.attributes.remove(key);
                } else {
                    profile.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        profile.updated_at = now;
        profile
    }

    /// Numeric fields must be positive and finite.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("weight", self.weight), ("height", self.height)] {
            if let Some(value) = value.filter(|value| !value.is_finite() || *value <= 0.0) {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        Ok(())
    }
}

/// Saved reusable item, such as a favourite meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    pub id: String,
    pub owner: String,
    /// e.g. "food", "exercise", "custom".
    pub entry_type: String,
    pub name: String,
    pub data: Value,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(
        owner: impl Into<String>,
        entry_type: impl Into<String>,
        name: impl Into<String>,
        data: Value,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: String::new(),
            owner: owner.into(),
            entry_type: entry_type.into(),
            name: name.into(),
            data,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One-tap shortcut shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickAction {
    pub id: String,
    pub owner: String,
    pub category: String,
    pub label: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<Value>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl QuickAction {
    pub fn new(
        owner: impl Into<String>,
        category: impl Into<String>,
        label: impl Into<String>,
        action: Option<Value>,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: String::new(),
            owner: owner.into(),
            category: category.into(),
            label: label.into(),
            action,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ActivityType, ExerciseIntensity, ExerciseProcessedData, FoodProcessedData, ProfilePatch,
        UserProfile, timestamp,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn timestamps_format_fixed_width_utc() {
        let parsed = timestamp::parse("2025-01-31T09:15:00.123456+01:00").expect("parse");
        assert_eq!(timestamp::format(&parsed), "2025-01-31T08:15:00.123Z");
        let whole = timestamp::parse("2025-01-31T08:15:00Z").expect("parse");
        assert_eq!(timestamp::format(&whole), "2025-01-31T08:15:00.000Z");
        assert!(timestamp::parse("31/01/2025").is_err());
    }

    #[test]
    fn activity_type_parses_known_values_only() {
        assert_eq!("Food".parse::<ActivityType>(), Ok(ActivityType::Food));
        assert_eq!(" stomach ".parse::<ActivityType>(), Ok(ActivityType::Stomach));
        let err = "lunch".parse::<ActivityType>().unwrap_err();
        assert!(err.contains("lunch"));
        assert!(err.contains("exercise"));
    }

    #[test]
    fn food_payload_enforces_glycemic_load_range() {
        let mut food: FoodProcessedData = serde_json::from_value(json!({
            "description": "1 cup of Greek yogurt",
            "macro_nutrients": {"protein": 20.0, "carbs": 9.0},
            "micro_nutrients": {"calcium": "200mg"},
            "glycemic_load": 3
        }))
        .expect("decode");
        assert_eq!(food.validate(), Ok(()));
        food.glycemic_load = 51;
        assert!(food.validate().is_err());
        food.glycemic_load = -1;
        assert!(food.validate().is_err());
    }

    #[test]
    fn exercise_payload_requires_positive_duration() {
        let exercise: ExerciseProcessedData = serde_json::from_value(json!({
            "duration_min": 0,
            "exercise_type": "running",
            "intensity": "high"
        }))
        .expect("decode");
        assert_eq!(exercise.intensity, Some(ExerciseIntensity::High));
        assert!(exercise.validate().is_err());
    }

    #[test]
    fn patch_merges_attributes_and_keeps_created_at() {
        let mut profile = UserProfile::new("u1");
        profile.email = Some("old@example.com".to_string());
        profile.attributes.insert("theme".to_string(), json!("dark"));
        profile.attributes.insert("units".to_string(), json!("metric"));
        let created_at = profile.created_at;

        let patch: ProfilePatch = serde_json::from_value(json!({
            "weight": 72.5,
            "attributes": {"units": null, "goal": {"steps": 10000}}
        }))
        .expect("decode");
        let later = timestamp::parse("2030-01-01T00:00:00Z").expect("parse");
        let updated = patch.apply(profile, later);

        assert_eq!(updated.email.as_deref(), Some("old@example.com"));
        assert_eq!(updated.weight, Some(72.5));
        assert_eq!(updated.attributes.get("theme"), Some(&json!("dark")));
        assert_eq!(updated.attributes.get("units"), None);
        assert_eq!(updated.attributes.get("goal"), Some(&json!({"steps": 10000})));
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, later);
    }
}
