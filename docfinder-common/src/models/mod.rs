//! Domain model shared by the store adapters and the admin service

mod doctor;
mod specialty;

pub use doctor::{doctor_key_from_email, Doctor, DoctorPatch, Location, NewDoctor};
pub use specialty::{Specialty, SpecialtyRecord};
