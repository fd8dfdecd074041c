//! Aggregate reports over a doctor collection
//!
//! Every function here is pure: same input, same output.

use docfinder_common::models::{Doctor, Specialty};
use serde::Serialize;

/// Doctors per specialty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialtyCount {
    pub specialty: Specialty,
    pub count: usize,
}

/// Experience range, inclusive on the right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExperienceBin {
    #[serde(rename = "0-5")]
    UpToFive,
    #[serde(rename = "6-10")]
    SixToTen,
    #[serde(rename = "11-15")]
    ElevenToFifteen,
    #[serde(rename = "16-20")]
    SixteenToTwenty,
    #[serde(rename = "20+")]
    OverTwenty,
}

impl ExperienceBin {
    pub const ALL: [ExperienceBin; 5] = [
        ExperienceBin::UpToFive,
        ExperienceBin::SixToTen,
        ExperienceBin::ElevenToFifteen,
        ExperienceBin::SixteenToTwenty,
        ExperienceBin::OverTwenty,
    ];

    pub fn for_years(years: u32) -> Self {
        match years {
            0..=5 => ExperienceBin::UpToFive,
            6..=10 => ExperienceBin::SixToTen,
            11..=15 => ExperienceBin::ElevenToFifteen,
            16..=20 => ExperienceBin::SixteenToTwenty,
            _ => ExperienceBin::OverTwenty,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExperienceBin::UpToFive => "0-5",
            ExperienceBin::SixToTen => "6-10",
            ExperienceBin::ElevenToFifteen => "11-15",
            ExperienceBin::SixteenToTwenty => "16-20",
            ExperienceBin::OverTwenty => "20+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperienceCount {
    pub range: ExperienceBin,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
    pub specialties: usize,
}

/// Everything the reports page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: Summary,
    pub by_specialty: Vec<SpecialtyCount>,
    pub by_experience: Vec<ExperienceCount>,
}

/// Count doctors per specialty, in first-seen order
///
/// Doctors without a specialty are left out.
pub fn specialty_histogram(doctors: &[Doctor]) -> Vec<SpecialtyCount> {
    let mut counts: Vec<SpecialtyCount> = Vec::new();
    for specialty in doctors.iter().filter_map(|d| d.specialty) {
        match counts.iter_mut().find(|c| c.specialty == specialty) {
            Some(entry) => entry.count += 1,
            None => counts.push(SpecialtyCount { specialty, count: 1 }),
        }
    }
    counts
}

/// Count doctors per experience range
///
/// Always returns all five ranges in ascending order. Doctors without a
/// recorded experience are left out.
pub fn experience_histogram(doctors: &[Doctor]) -> Vec<ExperienceCount> {
    let mut counts = [0usize; 5];
    for years in doctors.iter().filter_map(|d| d.experience) {
        let bin = ExperienceBin::for_years(years);
        if let Some(idx) = ExperienceBin::ALL.iter().position(|b| *b == bin) {
            counts[idx] += 1;
        }
    }

    ExperienceBin::ALL
        .iter()
        .zip(counts)
        .map(|(range, count)| ExperienceCount { range: *range, count })
        .collect()
}

pub fn summary(doctors: &[Doctor]) -> Summary {
    let available = doctors.iter().filter(|d| d.is_available).count();
    Summary {
        total: doctors.len(),
        available,
        unavailable: doctors.len() - available,
        specialties: specialty_histogram(doctors).len(),
    }
}

pub fn build_report(doctors: &[Doctor]) -> Report {
    Report {
        summary: summary(doctors),
        by_specialty: specialty_histogram(doctors),
        by_experience: experience_histogram(doctors),
    }
}
