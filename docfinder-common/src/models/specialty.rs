//! Medical specialty enumeration
//!
//! The set is closed: doctor records may only carry one of these twenty
//! values. The `specialties` collection mirrors it for reference.

use serde::{Deserialize, Serialize};

/// Medical specialty of a doctor
///
/// Serialized with its display name ("Plastic Surgeon"), which is also the
/// value persisted in the `doctors.specialty` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    #[serde(rename = "General Practitioner")]
    GeneralPractitioner,
    Pediatrician,
    Dermatologist,
    Cardiologist,
    Neurologist,
    Psychiatrist,
    Orthopedist,
    Gynecologist,
    Ophthalmologist,
    Dentist,
    Otolaryngologist,
    Endocrinologist,
    Gastroenterologist,
    Urologist,
    Nephrologist,
    Oncologist,
    Neurosurgeon,
    #[serde(rename = "Plastic Surgeon")]
    PlasticSurgeon,
    Radiologist,
    Pathologist,
}

impl Specialty {
    /// All specialties in presentation order
    pub const ALL: [Specialty; 20] = [
        Specialty::GeneralPractitioner,
        Specialty::Pediatrician,
        Specialty::Dermatologist,
        Specialty::Cardiologist,
        Specialty::Neurologist,
        Specialty::Psychiatrist,
        Specialty::Orthopedist,
        Specialty::Gynecologist,
        Specialty::Ophthalmologist,
        Specialty::Dentist,
        Specialty::Otolaryngologist,
        Specialty::Endocrinologist,
        Specialty::Gastroenterologist,
        Specialty::Urologist,
        Specialty::Nephrologist,
        Specialty::Oncologist,
        Specialty::Neurosurgeon,
        Specialty::PlasticSurgeon,
        Specialty::Radiologist,
        Specialty::Pathologist,
    ];

    /// Display name, also the persisted value
    pub fn name(&self) -> &'static str {
        match self {
            Specialty::GeneralPractitioner => "General Practitioner",
            Specialty::Pediatrician => "Pediatrician",
            Specialty::Dermatologist => "Dermatologist",
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Neurologist => "Neurologist",
            Specialty::Psychiatrist => "Psychiatrist",
            Specialty::Orthopedist => "Orthopedist",
            Specialty::Gynecologist => "Gynecologist",
            Specialty::Ophthalmologist => "Ophthalmologist",
            Specialty::Dentist => "Dentist",
            Specialty::Otolaryngologist => "Otolaryngologist",
            Specialty::Endocrinologist => "Endocrinologist",
            Specialty::Gastroenterologist => "Gastroenterologist",
            Specialty::Urologist => "Urologist",
            Specialty::Nephrologist => "Nephrologist",
            Specialty::Oncologist => "Oncologist",
            Specialty::Neurosurgeon => "Neurosurgeon",
            Specialty::PlasticSurgeon => "Plastic Surgeon",
            Specialty::Radiologist => "Radiologist",
            Specialty::Pathologist => "Pathologist",
        }
    }

    /// Parse from the display name (exact match after trimming)
    ///
    /// Returns None for empty or unknown values.
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|sp| sp.name() == s)
    }

    /// Key used for this specialty in the `specialties` collection
    ///
    /// Whitespace is replaced by underscores: "Plastic Surgeon" → "Plastic_Surgeon".
    pub fn record_key(&self) -> String {
        self.name().replace(char::is_whitespace, "_")
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference entry in the `specialties` side collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: i64,
}

impl SpecialtyRecord {
    /// Build the reference entry for a specialty
    pub fn for_specialty(specialty: Specialty, created_at: i64) -> Self {
        Self {
            id: specialty.record_key(),
            name: specialty.name().to_string(),
            description: format!("Medical specialty: {}", specialty.name()),
            created_at,
        }
    }
}
