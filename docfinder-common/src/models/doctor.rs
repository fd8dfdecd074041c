//! Doctor record and its write payloads

use serde::{Deserialize, Serialize};

use super::Specialty;

/// Geographic coordinate pair
///
/// Both halves always travel together; a record either has a full location
/// or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Build a location from optional halves
    ///
    /// Returns None unless both coordinates are present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self { latitude, longitude }),
            _ => None,
        }
    }
}

/// A doctor as stored in the `doctors` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// Store key (UUID for form-created records, email-derived for seeded ones)
    pub id: String,
    pub name: String,
    /// None when the stored value is empty or not a known specialty
    pub specialty: Option<Specialty>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub location: Option<Location>,
    /// Free-text biography
    pub about: String,
    pub education: String,
    /// Years of practice; None when never recorded
    pub experience: Option<u32>,
    pub is_available: bool,
    pub accepts_insurance: bool,
    pub photo_url: Option<String>,
    pub rating: f64,
    pub review_count: u32,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds of the last edit
    pub updated_at: Option<i64>,
}

impl Doctor {
    /// Apply a partial update in place
    ///
    /// Photo URL and location are only replaced when the patch carries them.
    pub fn apply(&mut self, patch: &DoctorPatch) {
        self.name = patch.name.clone();
        self.specialty = Some(patch.specialty);
        self.email = patch.email.clone();
        self.phone = patch.phone.clone();
        self.address = patch.address.clone();
        self.city = patch.city.clone();
        self.about = patch.about.clone();
        self.education = patch.education.clone();
        self.experience = Some(patch.experience);
        self.is_available = patch.is_available;
        self.accepts_insurance = patch.accepts_insurance;
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(url) = &patch.photo_url {
            self.photo_url = Some(url.clone());
        }
        self.updated_at = Some(patch.updated_at);
    }
}

/// Payload for creating a doctor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub name: String,
    pub specialty: Specialty,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub location: Option<Location>,
    pub about: String,
    pub education: String,
    pub experience: Option<u32>,
    pub is_available: bool,
    pub accepts_insurance: bool,
    pub photo_url: Option<String>,
    pub rating: f64,
    pub review_count: u32,
    pub created_at: i64,
}

impl NewDoctor {
    /// Materialize the stored record under the given key
    pub fn into_doctor(self, id: String) -> Doctor {
        Doctor {
            id,
            name: self.name,
            specialty: Some(self.specialty),
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            location: self.location,
            about: self.about,
            education: self.education,
            experience: self.experience,
            is_available: self.is_available,
            accepts_insurance: self.accepts_insurance,
            photo_url: self.photo_url,
            rating: self.rating,
            review_count: self.review_count,
            created_at: self.created_at,
            updated_at: None,
        }
    }
}

/// Partial update written by the edit form
///
/// `location` and `photo_url` set to None leave the stored values untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPatch {
    pub name: String,
    pub specialty: Specialty,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub location: Option<Location>,
    pub about: String,
    pub education: String,
    pub experience: u32,
    pub is_available: bool,
    pub accepts_insurance: bool,
    pub photo_url: Option<String>,
    pub updated_at: i64,
}

/// Derive a caller-assigned key from an email address
///
/// Characters the document store disallows in keys (`.`, `#`, `$`, `[`, `]`)
/// become underscores.
pub fn doctor_key_from_email(email: &str) -> String {
    email
        .chars()
        .map(|c| match c {
            '.' | '#' | '$' | '[' | ']' => '_',
            other => other,
        })
        .collect()
}
