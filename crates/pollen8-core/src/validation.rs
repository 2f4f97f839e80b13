use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::{Connection, InviteLink, User};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid format for field '{field}': {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Invalid length for field '{field}': expected {min}-{max} characters, got {actual}")]
    InvalidLength {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Value out of range for field '{field}': {value}")]
    ValueOutOfRange { field: String, value: String },

    #[error("Required field '{field}' is missing")]
    RequiredField { field: String },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

lazy_static! {
    static ref E164_REGEX: Regex = Regex::new(r"^\+[1-9][0-9]{7,14}$").unwrap();
    static ref ZIP_REGEX: Regex = Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").unwrap();
    static ref INVITE_CODE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
}

const MAX_TAG_LEN: usize = 100;
pub const INVITE_CODE_MIN_LEN: usize = 6;
pub const INVITE_CODE_MAX_LEN: usize = 32;
/// Longest look-back accepted for the summary growth window.
pub const MAX_GROWTH_WINDOW_DAYS: u32 = 3650;
/// Longest daily click series an invite summary will build.
pub const MAX_CLICK_WINDOW_DAYS: u32 = 366;

/// Phone numbers are stored in E.164 form after verification.
pub struct PhoneNumberValidator;

impl PhoneNumberValidator {
    pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
        if phone.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "phone_number".to_string(),
            });
        }
        if !E164_REGEX.is_match(phone) {
            return Err(ValidationError::InvalidFormat {
                field: "phone_number".to_string(),
                reason: "Expected E.164 format, e.g. +14155550123".to_string(),
            });
        }
        Ok(())
    }
}

pub struct LocationValidator;

impl LocationValidator {
    pub fn validate_zip_code(zip: &str) -> Result<(), ValidationError> {
        if !ZIP_REGEX.is_match(zip.trim()) {
            return Err(ValidationError::InvalidFormat {
                field: "zip_code".to_string(),
                reason: "Expected 5 digits or ZIP+4".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_city(city: &str) -> Result<(), ValidationError> {
        TagValidator::validate_tag(city, "city")
    }
}

/// Industry, interest and city names.
pub struct TagValidator;

impl TagValidator {
    pub fn validate_tag(tag: &str, field_name: &str) -> Result<(), ValidationError> {
        let trimmed = tag.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_TAG_LEN {
            return Err(ValidationError::InvalidLength {
                field: field_name.to_string(),
                min: 1,
                max: MAX_TAG_LEN,
                actual: trimmed.len(),
            });
        }
        Ok(())
    }
}

pub struct InviteCodeValidator;

impl InviteCodeValidator {
    pub fn validate_code(code: &str) -> Result<(), ValidationError> {
        if code.len() < INVITE_CODE_MIN_LEN || code.len() > INVITE_CODE_MAX_LEN {
            return Err(ValidationError::InvalidLength {
                field: "code".to_string(),
                min: INVITE_CODE_MIN_LEN,
                max: INVITE_CODE_MAX_LEN,
                actual: code.len(),
            });
        }
        if !INVITE_CODE_REGEX.is_match(code) {
            return Err(ValidationError::InvalidFormat {
                field: "code".to_string(),
                reason: "Only ASCII letters and digits allowed".to_string(),
            });
        }
        Ok(())
    }
}

pub struct ConnectionValueValidator;

impl ConnectionValueValidator {
    pub fn validate_value(value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::ValueOutOfRange {
                field: "connection_value".to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for Connection {
    fn validate(&self) -> Result<(), ValidationError> {
        ConnectionValueValidator::validate_value(self.connection_value)?;
        if !self.user_id.is_nil() && self.user_id == self.connected_user_id {
            return Err(ValidationError::InvalidFormat {
                field: "connected_user_id".to_string(),
                reason: "A user cannot connect to themselves".to_string(),
            });
        }
        for industry in &self.industries {
            TagValidator::validate_tag(industry, "industries")?;
        }
        Ok(())
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(phone) = &self.phone_number {
            PhoneNumberValidator::validate_phone_number(phone)?;
        }
        for industry in &self.industries {
            TagValidator::validate_tag(&industry.name, "industries")?;
        }
        for interest in &self.interests {
            TagValidator::validate_tag(&interest.name, "interests")?;
        }
        // Blank location fields are treated as absent, not as malformed.
        if self.has_city() {
            if let Some(city) = &self.city {
                LocationValidator::validate_city(city)?;
            }
        }
        if self.has_zip_code() {
            if let Some(zip) = &self.zip_code {
                LocationValidator::validate_zip_code(zip)?;
            }
        }
        Ok(())
    }
}

impl Validate for InviteLink {
    fn validate(&self) -> Result<(), ValidationError> {
        InviteCodeValidator::validate_code(&self.code)?;
        let bucketed: u64 = self.daily_clicks.values().sum();
        if bucketed > self.click_count {
            return Err(ValidationError::ValueOutOfRange {
                field: "daily_clicks".to_string(),
                value: format!("{} bucketed clicks exceed total {}", bucketed, self.click_count),
            });
        }
        Ok(())
    }
}
