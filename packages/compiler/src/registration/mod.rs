//! Registration Module
//!
//! Merging of reflective and JNI declarations into per-class records.

pub mod merger;
pub mod record;

pub use merger::{jni_records, merge, RegistrationMerger, RegistrationPlan};
pub use record::{ClassRegistrationRecord, JniClassRecord, MethodSignature, RegistrationFlags};
