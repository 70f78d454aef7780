use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Closed, case-normalized gender set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

// Accept any input casing ("Male", "FEMALE"); store lowercase.
impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Closed marital status set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "single",
            MaritalStatus::Married => "married",
            MaritalStatus::Divorced => "divorced",
            MaritalStatus::Widowed => "widowed",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(MaritalStatus::Single),
            "married" => Ok(MaritalStatus::Married),
            "divorced" => Ok(MaritalStatus::Divorced),
            "widowed" => Ok(MaritalStatus::Widowed),
            other => Err(format!("unknown marital status '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for MaritalStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl Serialize for MaritalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A profile row — the person behind a user.
///
/// Exactly one live profile per user. Same timestamp/soft-delete lifecycle
/// as [`super::User`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// UUIDv4 (no dashes), independent of `user_id`.
    pub profile_id: String,

    /// The owning user's sequential id.
    pub user_id: String,

    pub first_name: String,
    pub last_name: String,

    /// Digits only, 7-20 chars. Checked at validation time, not at storage.
    pub phone: String,

    /// Lowercased before storage/comparison; unique among live profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub gender: Gender,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,

    /// Emergency contact phone, same format rules as `phone`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,

    pub created_at: String,
    pub updated_at: String,

    #[serde(default)]
    pub is_deleted: bool,
}

/// Input for creating a profile alongside a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub gender: Gender,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
}

impl CreateProfile {
    /// Validate field shapes. Runs before any storage or hashing work.
    pub fn validate(&self) -> Result<(), String> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_phone(&self.phone)?;
        if let Some(contact) = &self.emergency_contact {
            validate_phone(contact)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
}

impl UpdateProfile {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.first_name {
            validate_name("first_name", name)?;
        }
        if let Some(name) = &self.last_name {
            validate_name("last_name", name)?;
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(contact) = &self.emergency_contact {
            validate_phone(contact)?;
        }
        Ok(())
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    if value.chars().count() > 50 {
        return Err(format!("{} must be at most 50 characters", field));
    }
    Ok(())
}

fn validate_phone(value: &str) -> Result<(), String> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err("phone number must contain only digits".into());
    }
    if !(7..=20).contains(&value.len()) {
        return Err("phone number must be between 7 and 20 digits".into());
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), String> {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(format!("invalid email address '{}'", value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_profile() -> CreateProfile {
        CreateProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: "0712345678".into(),
            email: Some("ada@example.com".into()),
            gender: Gender::Female,
            date_of_birth: None,
            photo_url: None,
            marital_status: None,
            emergency_contact: None,
        }
    }

    #[test]
    fn test_valid_profile_passes() {
        assert!(valid_profile().validate().is_ok());
    }

    #[test]
    fn test_phone_rejects_non_digits() {
        let mut profile = valid_profile();
        profile.phone = "07-1234-5678".into();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_phone_rejects_bad_length() {
        let mut profile = valid_profile();
        profile.phone = "123456".into();
        assert!(profile.validate().is_err());

        profile.phone = "1".repeat(21);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_name_rejects_empty_and_oversized() {
        let mut profile = valid_profile();
        profile.first_name = "  ".into();
        assert!(profile.validate().is_err());

        profile.first_name = "x".repeat(51);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        let mut profile = valid_profile();
        profile.email = Some("not-an-email".into());
        assert!(profile.validate().is_err());

        profile.email = Some("a@b.example".into());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_gender_case_insensitive_deserialize() {
        let gender: Gender = serde_json::from_str("\"FeMale\"").unwrap();
        assert_eq!(gender, Gender::Female);
        assert!(serde_json::from_str::<Gender>("\"unknown\"").is_err());
    }

    #[test]
    fn test_gender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
    }

    #[test]
    fn test_marital_status_parse() {
        assert_eq!("Widowed".parse::<MaritalStatus>().unwrap(), MaritalStatus::Widowed);
        assert!("complicated".parse::<MaritalStatus>().is_err());
    }
}
