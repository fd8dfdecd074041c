//! Roster search

use docfinder_common::models::Doctor;

/// Select doctors matching a free-text query and a specialty name
///
/// `text` is matched case-insensitively as a substring of name, email or
/// address. The text is used as typed, so surrounding spaces are part of the
/// needle. `specialty` must equal the doctor's specialty name exactly.
/// Empty criteria match everything; input order is preserved.
pub fn filter_doctors<'a>(doctors: &'a [Doctor], text: &str, specialty: &str) -> Vec<&'a Doctor> {
    let needle = text.to_lowercase();
    let specialty = specialty.trim();

    doctors
        .iter()
        .filter(|d| {
            let matches_text = needle.is_empty()
                || d.name.to_lowercase().contains(&needle)
                || d.email.to_lowercase().contains(&needle)
                || d.address.to_lowercase().contains(&needle);
            let matches_specialty =
                specialty.is_empty() || d.specialty.map(|s| s.name()) == Some(specialty);
            matches_text && matches_specialty
        })
        .collect()
}
