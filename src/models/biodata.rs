//! Biodata Model
//!
//! Matrimonial profile records, the input accepted when creating or editing
//! one, and directory filters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::{
    error::{AppError, AppResult},
    validation::validate_email,
};

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiodataType {
    Male,
    Female,
}

impl BiodataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiodataType::Male => "Male",
            BiodataType::Female => "Female",
        }
    }
}

impl fmt::Display for BiodataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BiodataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(BiodataType::Male),
            "female" => Ok(BiodataType::Female),
            other => Err(format!("unknown biodata type '{}'", other)),
        }
    }
}

/// Protected contact channels, only shown to the owner, admins and
/// requesters whose contact request was approved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub contact_email: String,
    pub mobile_number: String,
}

/// Editable content of a biodata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataProfile {
    pub biodata_type: BiodataType,
    pub name: String,
    pub dob: NaiveDate,
    pub height: String,
    pub weight: String,
    pub age: i32,
    pub occupation: String,
    pub race: String,
    pub father_name: String,
    pub mother_name: String,
    pub permanent_division: String,
    pub present_division: String,
    pub partner_age: Option<String>,
    pub partner_height: Option<String>,
    pub partner_weight: Option<String>,
    pub marital_status: Option<String>,
    pub profile_image: String,
    #[serde(flatten)]
    pub contact: Option<ContactDetails>,
}

/// Stored biodata record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Biodata {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Owner email (unique, normalized)
    pub email: String,

    #[serde(flatten)]
    pub profile: BiodataProfile,

    /// Denormalized copy of the owner's premium flag. Records written before
    /// the flag existed carry `None`; reads resolve it against the owner.
    pub is_premium: Option<bool>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Biodata {
    /// Drops the protected contact channels
    pub fn without_contact(mut self) -> Self {
        self.profile.contact = None;
        self
    }
}

/// Fields needed to insert a new biodata
#[derive(Debug, Clone)]
pub struct NewBiodata {
    pub email: String,
    pub profile: BiodataProfile,
    pub is_premium: bool,
}

/// Biodata fields as submitted through the create/update endpoints.
///
/// Every field is optional here: creation checks completeness, updates merge
/// the supplied fields over the stored record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataInput {
    pub biodata_type: Option<BiodataType>,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub race: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub permanent_division: Option<String>,
    pub present_division: Option<String>,
    pub partner_age: Option<String>,
    pub partner_height: Option<String>,
    pub partner_weight: Option<String>,
    pub contact_email: Option<String>,
    pub mobile_number: Option<String>,
    pub marital_status: Option<String>,
    pub is_premium: Option<bool>,
}

impl BiodataInput {
    /// Sets a field from a multipart text part. Unknown fields are ignored.
    pub fn set_field(&mut self, name: &str, value: String) -> AppResult<()> {
        let value = value.trim().to_string();

        match name {
            "biodataType" => {
                self.biodata_type = Some(value.parse().map_err(AppError::Validation)?);
            }
            "name" => self.name = Some(value),
            "dob" => self.dob = Some(parse_dob(&value)?),
            "height" => self.height = Some(value),
            "weight" => self.weight = Some(value),
            "age" => {
                self.age = Some(value.parse().map_err(|_| {
                    AppError::Validation(format!("age must be a whole number, got '{}'", value))
                })?);
            }
            "occupation" => self.occupation = Some(value),
            "race" => self.race = Some(value),
            "fatherName" => self.father_name = Some(value),
            "motherName" => self.mother_name = Some(value),
            "permanentDivision" => self.permanent_division = Some(value),
            "presentDivision" => self.present_division = Some(value),
            "partnerAge" => self.partner_age = Some(value),
            "partnerHeight" => self.partner_height = Some(value),
            "partnerWeight" => self.partner_weight = Some(value),
            "contactEmail" => self.contact_email = Some(value),
            "mobileNumber" => self.mobile_number = Some(value),
            "maritalStatus" => self.marital_status = Some(value),
            "isPremium" => {
                self.is_premium = Some(value.parse().map_err(|_| {
                    AppError::Validation(format!("isPremium must be true or false, got '{}'", value))
                })?);
            }
            other => log::debug!("Ignoring unknown biodata field '{}'", other),
        }

        Ok(())
    }

    /// Checks the values that were supplied, without requiring completeness
    pub fn validate_values(&self) -> AppResult<()> {
        if let Some(age) = self.age {
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                return Err(AppError::Validation(format!(
                    "age must be between {} and {}",
                    MIN_AGE, MAX_AGE
                )));
            }
        }

        if let Some(dob) = self.dob {
            if dob > Utc::now().date_naive() {
                return Err(AppError::Validation(
                    "dob cannot be in the future".to_string(),
                ));
            }
        }

        if let Some(email) = &self.contact_email {
            if !validate_email(email) {
                return Err(AppError::Validation(format!(
                    "contactEmail is not a valid email address: {}",
                    email
                )));
            }
        }

        let required_text = [
            ("name", &self.name),
            ("height", &self.height),
            ("weight", &self.weight),
            ("occupation", &self.occupation),
            ("race", &self.race),
            ("fatherName", &self.father_name),
            ("motherName", &self.mother_name),
            ("permanentDivision", &self.permanent_division),
            ("presentDivision", &self.present_division),
            ("mobileNumber", &self.mobile_number),
        ];
        for (field, value) in required_text {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(AppError::Validation(format!("{} cannot be empty", field)));
            }
        }

        Ok(())
    }

    /// Names of required fields that were not supplied
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            ("biodataType", self.biodata_type.is_some()),
            ("name", self.name.is_some()),
            ("dob", self.dob.is_some()),
            ("height", self.height.is_some()),
            ("weight", self.weight.is_some()),
            ("age", self.age.is_some()),
            ("occupation", self.occupation.is_some()),
            ("race", self.race.is_some()),
            ("fatherName", self.father_name.is_some()),
            ("motherName", self.mother_name.is_some()),
            ("permanentDivision", self.permanent_division.is_some()),
            ("presentDivision", self.present_division.is_some()),
            ("contactEmail", self.contact_email.is_some()),
            ("mobileNumber", self.mobile_number.is_some()),
        ];

        present
            .into_iter()
            .filter(|(_, is_present)| !is_present)
            .map(|(field, _)| field)
            .collect()
    }

    /// Fails with a validation error listing every missing required field
    pub fn check_complete(&self) -> AppResult<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Builds a complete profile for a new biodata
    pub fn into_profile(self, profile_image: String) -> AppResult<BiodataProfile> {
        self.check_complete()?;
        let missing = |field: &str| AppError::Validation(format!("Missing required field: {}", field));

        Ok(BiodataProfile {
            biodata_type: self.biodata_type.ok_or_else(|| missing("biodataType"))?,
            name: self.name.ok_or_else(|| missing("name"))?,
            dob: self.dob.ok_or_else(|| missing("dob"))?,
            height: self.height.ok_or_else(|| missing("height"))?,
            weight: self.weight.ok_or_else(|| missing("weight"))?,
            age: self.age.ok_or_else(|| missing("age"))?,
            occupation: self.occupation.ok_or_else(|| missing("occupation"))?,
            race: self.race.ok_or_else(|| missing("race"))?,
            father_name: self.father_name.ok_or_else(|| missing("fatherName"))?,
            mother_name: self.mother_name.ok_or_else(|| missing("motherName"))?,
            permanent_division: self
                .permanent_division
                .ok_or_else(|| missing("permanentDivision"))?,
            present_division: self
                .present_division
                .ok_or_else(|| missing("presentDivision"))?,
            partner_age: self.partner_age,
            partner_height: self.partner_height,
            partner_weight: self.partner_weight,
            marital_status: self.marital_status,
            profile_image,
            contact: Some(ContactDetails {
                contact_email: self.contact_email.ok_or_else(|| missing("contactEmail"))?,
                mobile_number: self.mobile_number.ok_or_else(|| missing("mobileNumber"))?,
            }),
        })
    }

    /// Merges the supplied fields over an existing profile
    pub fn apply_to(self, profile: &mut BiodataProfile) {
        fn merge<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        merge(&mut profile.biodata_type, self.biodata_type);
        merge(&mut profile.name, self.name);
        merge(&mut profile.dob, self.dob);
        merge(&mut profile.height, self.height);
        merge(&mut profile.weight, self.weight);
        merge(&mut profile.age, self.age);
        merge(&mut profile.occupation, self.occupation);
        merge(&mut profile.race, self.race);
        merge(&mut profile.father_name, self.father_name);
        merge(&mut profile.mother_name, self.mother_name);
        merge(&mut profile.permanent_division, self.permanent_division);
        merge(&mut profile.present_division, self.present_division);

        if self.partner_age.is_some() {
            profile.partner_age = self.partner_age;
        }
        if self.partner_height.is_some() {
            profile.partner_height = self.partner_height;
        }
        if self.partner_weight.is_some() {
            profile.partner_weight = self.partner_weight;
        }
        if self.marital_status.is_some() {
            profile.marital_status = self.marital_status;
        }

        if self.contact_email.is_some() || self.mobile_number.is_some() {
            let current = profile.contact.take();
            let (email, mobile) = match current {
                Some(c) => (c.contact_email, c.mobile_number),
                None => (String::new(), String::new()),
            };
            profile.contact = Some(ContactDetails {
                contact_email: self.contact_email.unwrap_or(email),
                mobile_number: self.mobile_number.unwrap_or(mobile),
            });
        }
    }
}

fn parse_dob(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("dob must be YYYY-MM-DD, got '{}'", value)))
}

/// Directory filters for the public biodata listing
#[derive(Debug, Clone, Default)]
pub struct BiodataFilter {
    pub biodata_type: Option<BiodataType>,
    pub permanent_division: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
}

impl BiodataFilter {
    pub fn matches(&self, biodata: &Biodata) -> bool {
        let profile = &biodata.profile;
        self.biodata_type.map_or(true, |t| profile.biodata_type == t)
            && self
                .permanent_division
                .as_ref()
                .map_or(true, |d| profile.permanent_division.eq_ignore_ascii_case(d))
            && self.min_age.map_or(true, |min| profile.age >= min)
            && self.max_age.map_or(true, |max| profile.age <= max)
    }
}

/// One page of the biodata directory
#[derive(Debug, Serialize)]
pub struct BiodataPage {
    pub items: Vec<Biodata>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
