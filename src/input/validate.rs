//! Typed validation of batch records.
//!
//! Rows from delimited text go through [`FromRow`]; structured records go
//! through [`Validate`]. Both report every problem they find so the operator
//! can fix a whole file in one pass.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::platform::{NewClient, NewService, NewServiceCategory, NewStaff};

/// Longest service the platform accepts, in minutes.
pub const MAX_SERVICE_DURATION_MINUTES: u32 = 24 * 60;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("phone pattern is valid"));

/// A single problem with one field of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// 1-based record number, if the error belongs to a specific record.
    pub row: Option<usize>,
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(row: Option<usize>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {row}, {}: {}", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// All field errors found in a rejected batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Schema check for an already-structured record.
pub trait Validate {
    /// Every rule this record breaks; empty when valid.
    fn validate(&self, row: Option<usize>) -> Vec<FieldError>;
}

/// Parse and validate one string-keyed row.
pub trait FromRow: Sized {
    fn from_row(row: &HashMap<String, String>, index: Option<usize>) -> Result<Self, Vec<FieldError>>;
}

/// Field accessor that accumulates errors while parsing a row.
struct RowReader<'a> {
    row: &'a HashMap<String, String>,
    index: Option<usize>,
    errors: Vec<FieldError>,
}

impl<'a> RowReader<'a> {
    fn new(row: &'a HashMap<String, String>, index: Option<usize>) -> Self {
        Self {
            row,
            index,
            errors: Vec::new(),
        }
    }

    fn optional(&self, field: &str) -> Option<String> {
        self.row
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn required(&mut self, field: &str) -> String {
        match self.optional(field) {
            Some(v) => v,
            None => {
                self.errors
                    .push(FieldError::new(self.index, field, "is required"));
                String::new()
            }
        }
    }

    fn optional_number<T: std::str::FromStr>(&mut self, field: &str) -> Option<T> {
        let raw = self.optional(field)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.errors.push(FieldError::new(
                    self.index,
                    field,
                    format!("{raw:?} is not a valid number"),
                ));
                None
            }
        }
    }

    fn required_number<T: std::str::FromStr + Default>(&mut self, field: &str) -> T {
        if self.optional(field).is_none() {
            self.errors
                .push(FieldError::new(self.index, field, "is required"));
            return T::default();
        }
        self.optional_number(field).unwrap_or_default()
    }

    /// Attach schema-level errors and finish.
    fn finish<T: Validate>(mut self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            self.errors = value.validate(self.index);
        }
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check_email(errors: &mut Vec<FieldError>, row: Option<usize>, email: Option<&str>) {
    if let Some(email) = email
        && !email.contains('@')
    {
        errors.push(FieldError::new(row, "email", format!("{email:?} is not an email address")));
    }
}

fn check_phone(errors: &mut Vec<FieldError>, row: Option<usize>, phone: Option<&str>) {
    if let Some(phone) = phone
        && !PHONE_RE.is_match(phone.trim())
    {
        errors.push(FieldError::new(row, "phone", format!("{phone:?} is not a phone number")));
    }
}

impl Validate for NewServiceCategory {
    fn validate(&self, row: Option<usize>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if blank(&self.title) {
            errors.push(FieldError::new(row, "title", "is required"));
        }
        errors
    }
}

impl FromRow for NewServiceCategory {
    fn from_row(row: &HashMap<String, String>, index: Option<usize>) -> Result<Self, Vec<FieldError>> {
        let mut r = RowReader::new(row, index);
        let value = Self {
            title: r.required("title"),
            weight: r.optional_number("weight"),
        };
        r.finish(value)
    }
}

impl Validate for NewStaff {
    fn validate(&self, row: Option<usize>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if blank(&self.name) {
            errors.push(FieldError::new(row, "name", "is required"));
        }
        if blank(&self.specialization) {
            errors.push(FieldError::new(row, "specialization", "is required"));
        }
        check_phone(&mut errors, row, self.phone.as_deref());
        check_email(&mut errors, row, self.email.as_deref());
        errors
    }
}

impl FromRow for NewStaff {
    fn from_row(row: &HashMap<String, String>, index: Option<usize>) -> Result<Self, Vec<FieldError>> {
        let mut r = RowReader::new(row, index);
        let value = Self {
            name: r.required("name"),
            specialization: r.required("specialization"),
            phone: r.optional("phone"),
            email: r.optional("email"),
            weight: r.optional_number("weight"),
        };
        r.finish(value)
    }
}

impl Validate for NewService {
    fn validate(&self, row: Option<usize>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if blank(&self.title) {
            errors.push(FieldError::new(row, "title", "is required"));
        }
        if self.category_id == 0 {
            errors.push(FieldError::new(row, "category_id", "must be a category id"));
        }
        if !self.price_min.is_finite() || self.price_min < 0.0 {
            errors.push(FieldError::new(row, "price_min", "must be zero or more"));
        }
        if let Some(max) = self.price_max
            && (!max.is_finite() || max < self.price_min)
        {
            errors.push(FieldError::new(row, "price_max", "must not be below price_min"));
        }
        if self.duration == 0 {
            errors.push(FieldError::new(row, "duration", "must be at least one minute"));
        } else if self.duration > MAX_SERVICE_DURATION_MINUTES {
            errors.push(FieldError::new(
                row,
                "duration",
                format!("must be at most {MAX_SERVICE_DURATION_MINUTES} minutes"),
            ));
        }
        errors
    }
}

impl FromRow for NewService {
    fn from_row(row: &HashMap<String, String>, index: Option<usize>) -> Result<Self, Vec<FieldError>> {
        let mut r = RowReader::new(row, index);
        let value = Self {
            title: r.required("title"),
            category_id: r.required_number("category_id"),
            price_min: r.required_number("price_min"),
            price_max: r.optional_number("price_max"),
            duration: r.required_number("duration"),
            comment: r.optional("comment"),
        };
        r.finish(value)
    }
}

impl Validate for NewClient {
    fn validate(&self, row: Option<usize>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if blank(&self.name) {
            errors.push(FieldError::new(row, "name", "is required"));
        }
        let phone = self.phone.as_deref().filter(|p| !blank(p));
        let email = self.email.as_deref().filter(|e| !blank(e));
        if phone.is_none() && email.is_none() {
            errors.push(FieldError::new(row, "phone", "client must have phone or email"));
        }
        check_phone(&mut errors, row, phone);
        check_email(&mut errors, row, email);
        errors
    }
}

impl FromRow for NewClient {
    fn from_row(row: &HashMap<String, String>, index: Option<usize>) -> Result<Self, Vec<FieldError>> {
        let r = RowReader::new(row, index);
        let value = Self {
            name: r.optional("name").unwrap_or_default(),
            phone: r.optional("phone"),
            email: r.optional("email"),
            comment: r.optional("comment"),
        };
        r.finish(value)
    }
}
