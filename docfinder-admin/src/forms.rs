//! Doctor form state
//!
//! The add and edit pages share one form. Its state is a plain value and
//! every input change goes through `reduce`, so the form logic is testable
//! without any HTTP or UI in the way. Validation turns a form into the
//! store payload for the add (`to_new_doctor`) or edit (`to_patch`) flow.

use docfinder_common::models::{Doctor, DoctorPatch, Location, NewDoctor, Specialty};
use serde::{Deserialize, Serialize};

/// City pre-filled on a blank form
pub const DEFAULT_CITY: &str = "Gaborone";

/// Input values as typed, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorForm {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub about: String,
    pub education: String,
    pub experience: String,
    pub is_available: bool,
    pub accepts_insurance: bool,
}

impl Default for DoctorForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            specialty: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: DEFAULT_CITY.to_string(),
            latitude: String::new(),
            longitude: String::new(),
            about: String::new(),
            education: String::new(),
            experience: String::new(),
            is_available: true,
            accepts_insurance: false,
        }
    }
}

/// A form input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Specialty,
    Email,
    Phone,
    Address,
    City,
    Latitude,
    Longitude,
    About,
    Education,
    Experience,
    IsAvailable,
    AcceptsInsurance,
}

impl FormField {
    /// Look up a field by its wire name (`isAvailable`, `latitude`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "name" => FormField::Name,
            "specialty" => FormField::Specialty,
            "email" => FormField::Email,
            "phone" => FormField::Phone,
            "address" => FormField::Address,
            "city" => FormField::City,
            "latitude" => FormField::Latitude,
            "longitude" => FormField::Longitude,
            "about" => FormField::About,
            "education" => FormField::Education,
            "experience" => FormField::Experience,
            "isAvailable" => FormField::IsAvailable,
            "acceptsInsurance" => FormField::AcceptsInsurance,
            _ => return None,
        };
        Some(field)
    }

    /// Checkbox inputs
    pub fn is_flag(&self) -> bool {
        matches!(self, FormField::IsAvailable | FormField::AcceptsInsurance)
    }
}

/// New value for one input
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Flag(bool),
}

impl FormValue {
    fn into_text(self) -> String {
        match self {
            FormValue::Text(text) => text,
            FormValue::Flag(flag) => flag.to_string(),
        }
    }

    /// Checkbox reading of the value; text is true for `true`, `on`, `1`
    fn into_flag(self) -> bool {
        match self {
            FormValue::Flag(flag) => flag,
            FormValue::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "1"
            ),
        }
    }
}

/// Apply one input change, returning the next form state
pub fn reduce(mut form: DoctorForm, field: FormField, value: FormValue) -> DoctorForm {
    if field.is_flag() {
        let flag = value.into_flag();
        match field {
            FormField::IsAvailable => form.is_available = flag,
            _ => form.accepts_insurance = flag,
        }
        return form;
    }

    let text = value.into_text();
    match field {
        FormField::Name => form.name = text,
        FormField::Specialty => form.specialty = text,
        FormField::Email => form.email = text,
        FormField::Phone => form.phone = text,
        FormField::Address => form.address = text,
        FormField::City => form.city = text,
        FormField::Latitude => form.latitude = text,
        FormField::Longitude => form.longitude = text,
        FormField::About => form.about = text,
        FormField::Education => form.education = text,
        FormField::Experience => form.experience = text,
        FormField::IsAvailable | FormField::AcceptsInsurance => {}
    }
    form
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// All problems found in one submission
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: FormField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: FormField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Fields that survive validation in typed form
struct Checked {
    specialty: Specialty,
    location: Option<Location>,
    experience: Option<u32>,
}

impl DoctorForm {
    /// Pre-populate from a stored record
    ///
    /// Missing values fall back to the blank-form defaults.
    pub fn from_doctor(doctor: &Doctor) -> Self {
        let defaults = Self::default();
        Self {
            name: doctor.name.clone(),
            specialty: doctor.specialty.map(|s| s.name().to_string()).unwrap_or_default(),
            email: doctor.email.clone(),
            phone: doctor.phone.clone(),
            address: doctor.address.clone(),
            city: if doctor.city.trim().is_empty() {
                defaults.city
            } else {
                doctor.city.clone()
            },
            latitude: doctor.location.map(|l| l.latitude.to_string()).unwrap_or_default(),
            longitude: doctor.location.map(|l| l.longitude.to_string()).unwrap_or_default(),
            about: doctor.about.clone(),
            education: doctor.education.clone(),
            experience: doctor.experience.map(|e| e.to_string()).unwrap_or_default(),
            is_available: doctor.is_available,
            accepts_insurance: doctor.accepts_insurance,
        }
    }

    /// Check the form without building a payload
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.check(true).map(|_| ())
    }

    /// Payload for the add flow
    ///
    /// Experience must be blank or a non-negative integer.
    pub fn to_new_doctor(&self, created_at: i64) -> Result<NewDoctor, ValidationErrors> {
        let checked = self.check(true)?;
        Ok(NewDoctor {
            name: self.name.trim().to_string(),
            specialty: checked.specialty,
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            location: checked.location,
            about: self.about.clone(),
            education: self.education.clone(),
            experience: checked.experience,
            is_available: self.is_available,
            accepts_insurance: self.accepts_insurance,
            photo_url: None,
            rating: 0.0,
            review_count: 0,
            created_at,
        })
    }

    /// Partial update for the edit flow
    ///
    /// Experience is coerced: whatever leading integer the input has, else 0.
    /// An incomplete coordinate pair leaves the stored location untouched.
    pub fn to_patch(&self, updated_at: i64) -> Result<DoctorPatch, ValidationErrors> {
        let checked = self.check(false)?;
        Ok(DoctorPatch {
            name: self.name.trim().to_string(),
            specialty: checked.specialty,
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            location: checked.location,
            about: self.about.clone(),
            education: self.education.clone(),
            experience: coerce_experience(&self.experience),
            is_available: self.is_available,
            accepts_insurance: self.accepts_insurance,
            photo_url: None,
            updated_at,
        })
    }

    fn check(&self, strict_experience: bool) -> Result<Checked, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for (field, value, label) in [
            (FormField::Name, &self.name, "Name"),
            (FormField::Email, &self.email, "Email"),
            (FormField::Phone, &self.phone, "Phone"),
            (FormField::Address, &self.address, "Address"),
        ] {
            if value.trim().is_empty() {
                errors.push(field, format!("{} is required", label));
            }
        }

        let email = self.email.trim();
        if !email.is_empty() && !is_plausible_email(email) {
            errors.push(FormField::Email, "Email must look like name@domain");
        }

        let specialty = if self.specialty.trim().is_empty() {
            errors.push(FormField::Specialty, "Specialty is required");
            None
        } else {
            let parsed = Specialty::from_name(&self.specialty);
            if parsed.is_none() {
                errors.push(
                    FormField::Specialty,
                    format!("Unknown specialty: {}", self.specialty.trim()),
                );
            }
            parsed
        };

        let experience = if strict_experience {
            match parse_experience(&self.experience) {
                Ok(years) => years,
                Err(message) => {
                    errors.push(FormField::Experience, message);
                    None
                }
            }
        } else {
            None
        };

        let latitude = parse_coordinate(&self.latitude, 90.0, FormField::Latitude, &mut errors);
        let longitude = parse_coordinate(&self.longitude, 180.0, FormField::Longitude, &mut errors);

        match specialty {
            Some(specialty) if errors.is_empty() => Ok(Checked {
                specialty,
                location: Location::from_parts(latitude, longitude),
                experience,
            }),
            _ => Err(errors),
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace),
        None => false,
    }
}

fn parse_experience(text: &str) -> Result<Option<u32>, &'static str> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u32>()
        .map(Some)
        .map_err(|_| "Experience must be a whole number of years")
}

/// Leading-integer reading of a text input; 0 when there is none
///
/// A negative value also reads as 0.
pub fn coerce_experience(text: &str) -> u32 {
    let text = text.trim();
    if text.starts_with('-') {
        return 0;
    }
    let digits: String = text
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Parse one coordinate; blank is None, anything else must be in range
fn parse_coordinate(
    text: &str,
    limit: f64,
    field: FormField,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Some(value),
        Ok(_) => {
            errors.push(field, format!("Must be between -{} and {}", limit, limit));
            None
        }
        Err(_) => {
            errors.push(field, "Must be a number");
            None
        }
    }
}
