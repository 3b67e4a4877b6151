//! Merged registration records.

use bitflags::bitflags;
use indexmap::IndexSet;
use serde::Serialize;
use smallvec::SmallVec;

bitflags! {
    /// Capabilities requested for one class. Merging is a bitwise union, so a
    /// flag never goes back to unset once any declaration asked for it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    #[serde(transparent)]
    pub struct RegistrationFlags: u8 {
        const CONSTRUCTORS = 0b0000_0001;
        const METHODS = 0b0000_0010;
        const FIELDS = 0b0000_0100;
        const FINAL_FIELDS_WRITABLE = 0b0000_1000;
        const WEAK = 0b0001_0000;
        const SERIALIZATION = 0b0010_0000;
    }
}

impl RegistrationFlags {
    pub fn from_bools(
        constructors: bool,
        methods: bool,
        fields: bool,
        final_fields_writable: bool,
        weak: bool,
        serialization: bool,
    ) -> Self {
        let mut flags = RegistrationFlags::empty();
        flags.set(RegistrationFlags::CONSTRUCTORS, constructors);
        flags.set(RegistrationFlags::METHODS, methods);
        flags.set(RegistrationFlags::FIELDS, fields);
        flags.set(RegistrationFlags::FINAL_FIELDS_WRITABLE, final_fields_writable);
        flags.set(RegistrationFlags::WEAK, weak);
        flags.set(RegistrationFlags::SERIALIZATION, serialization);
        flags
    }
}

/// Name plus exact parameter types of an explicitly requested executable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: SmallVec<[String; 4]>,
}

impl MethodSignature {
    pub fn new(name: &str, params: &[String]) -> Self {
        MethodSignature {
            name: name.to_string(),
            params: params.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRegistrationRecord {
    pub class_name: String,
    pub flags: RegistrationFlags,
    pub explicit_constructors: IndexSet<MethodSignature>,
    pub explicit_methods: IndexSet<MethodSignature>,
    pub explicit_fields: IndexSet<String>,
}

impl ClassRegistrationRecord {
    pub fn new(class_name: &str, flags: RegistrationFlags) -> Self {
        ClassRegistrationRecord {
            class_name: class_name.to_string(),
            flags,
            explicit_constructors: IndexSet::new(),
            explicit_methods: IndexSet::new(),
            explicit_fields: IndexSet::new(),
        }
    }

    pub fn allow_constructors(&self) -> bool {
        self.flags.contains(RegistrationFlags::CONSTRUCTORS)
    }

    pub fn allow_methods(&self) -> bool {
        self.flags.contains(RegistrationFlags::METHODS)
    }

    pub fn allow_fields(&self) -> bool {
        self.flags.contains(RegistrationFlags::FIELDS)
    }

    pub fn final_fields_writable(&self) -> bool {
        self.flags.contains(RegistrationFlags::FINAL_FIELDS_WRITABLE)
    }

    pub fn weak(&self) -> bool {
        self.flags.contains(RegistrationFlags::WEAK)
    }

    pub fn serialization(&self) -> bool {
        self.flags.contains(RegistrationFlags::SERIALIZATION)
    }
}

/// JNI accessibility of one class, tracked apart from reflective access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JniClassRecord {
    pub class_name: String,
    pub constructors: bool,
    pub methods: bool,
    pub fields: bool,
    pub final_fields_writable: bool,
}
