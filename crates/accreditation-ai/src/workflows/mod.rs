pub mod accreditation;
