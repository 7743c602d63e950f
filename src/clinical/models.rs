use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
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

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {}", s)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatientStatus {
    #[default]
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "follow-up")]
    FollowUp,
    #[serde(rename = "inactive")]
    Inactive,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::FollowUp => "follow-up",
            PatientStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PatientStatus::Active),
            "follow-up" => Ok(PatientStatus::FollowUp),
            "inactive" => Ok(PatientStatus::Inactive),
            _ => Err(format!("unknown patient status: {}", s)),
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub status: PatientStatus,
    /// Set at insert, never updated
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TumorType {
    pub id: i32,
    pub name: String,
    pub system_affected: String,
}

/// Tumor type before the store assigns its id
#[derive(Debug, Clone)]
pub struct NewTumorType {
    pub name: String,
    pub system_affected: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ClinicalRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub tumor_type_id: i32,
    pub diagnosis_date: NaiveDate,
    pub stage: Option<String>,
    pub treatment_protocol: Option<String>,
    /// Set at insert, never updated
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&PatientStatus::FollowUp).unwrap(),
            "\"follow-up\""
        );
        assert_eq!(
            serde_json::from_str::<PatientStatus>("\"inactive\"").unwrap(),
            PatientStatus::Inactive
        );
        assert_eq!(PatientStatus::default(), PatientStatus::Active);
        assert!("Active".parse::<PatientStatus>().is_err());
    }

    #[test]
    fn test_gender_round_trips_through_str() {
        for gender in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
        assert!(serde_json::from_str::<Gender>("\"unknown\"").is_err());
    }
}
