//! Derived views over the doctor collection
//!
//! - `projection`: live view rebuilt from every store snapshot
//! - `filter`: text + specialty search
//! - `reports`: histograms and summary counts

pub mod filter;
pub mod projection;
pub mod reports;

pub use filter::filter_doctors;
pub use projection::{RosterReader, RosterSubscription, RosterView};
pub use reports::{build_report, experience_histogram, specialty_histogram, summary, Report};
