//! Recording Hosted Environment
//!
//! A `HostEnvironment` that plays the part of the AOT compiler's hosted
//! registries. It knows a catalogue of application classes plus the platform
//! classes generated units rely on, and records every registration it
//! receives as a `HostEvent`.

use crate::output::evaluator::{HostEnvironment, HostFault, HostValue, Member};
use crate::output::unit_ast::{InvokeKind, MethodRef};
use crate::synthesis::descriptors::*;
use indexmap::{IndexMap, IndexSet};

const PLATFORM_PREFIXES: &[&str] = &[
    "java.",
    "javax.",
    "jdk.",
    "sun.",
    "org.graalvm.",
    "com.oracle.svm.",
    "io.quarkus.runner.",
    "io.quarkus.runtime.",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

const ABSTRACT_MODIFIER: i32 = 0x0400;
const PUBLIC_MODIFIER: i32 = 0x0001;

const CONSTRUCTOR_ACCESSOR: &str = "jdk.internal.reflect.ConstructorAccessor";

/// An application class known to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedClass {
    pub name: String,
    pub is_abstract: bool,
    pub constructors: Vec<Vec<String>>,
    pub methods: Vec<(String, Vec<String>)>,
    pub fields: Vec<String>,
}

impl HostedClass {
    pub fn new(name: &str) -> Self {
        HostedClass {
            name: name.to_string(),
            is_abstract: false,
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn constructor(mut self, params: &[&str]) -> Self {
        self.constructors
            .push(params.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn method(mut self, name: &str, params: &[&str]) -> Self {
        self.methods.push((
            name.to_string(),
            params.iter().map(|p| p.to_string()).collect(),
        ));
        self
    }

    pub fn field(mut self, name: &str) -> Self {
        self.fields.push(name.to_string());
        self
    }

    fn constructor_members(&self) -> Vec<HostValue> {
        self.constructors
            .iter()
            .map(|params| {
                HostValue::Member(Member::Constructor {
                    declaring_class: self.name.clone(),
                    params: params.clone(),
                })
            })
            .collect()
    }

    fn method_members(&self) -> Vec<HostValue> {
        self.methods
            .iter()
            .map(|(name, params)| {
                HostValue::Member(Member::Method {
                    declaring_class: self.name.clone(),
                    name: name.clone(),
                    params: params.clone(),
                })
            })
            .collect()
    }

    fn field_members(&self) -> Vec<HostValue> {
        self.fields
            .iter()
            .map(|name| {
                HostValue::Member(Member::Field {
                    declaring_class: self.name.clone(),
                    name: name.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Registry {
    Reflection,
    Jni,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    RegisterClasses {
        registry: Registry,
        classes: Vec<String>,
    },
    RegisterExecutables {
        registry: Registry,
        members: Vec<Member>,
    },
    RegisterFields {
        registry: Registry,
        fields: Vec<Member>,
        final_fields_writable: bool,
        serialization: bool,
    },
    UnsafeAccessed {
        class_name: String,
        field: String,
    },
    InitializeAtRunTime {
        classes: Vec<String>,
    },
    InitializePackagesAtRunTime {
        packages: Vec<String>,
    },
    RerunInitialization {
        class_name: String,
        originator: String,
    },
    ProxyClass {
        interfaces: Vec<String>,
    },
    Resource(String),
    ResourcePatternExcluded(String),
    ResourcePatternIncluded(String),
    ResourceBundle(String),
    CipherRequested(String),
    ConstructorAccessor {
        class_name: String,
        constructor_class: String,
    },
    SerializationReflections {
        class_name: String,
        object_class: String,
    },
    FailureReported(HostFault),
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    classes: IndexMap<String, HostedClass>,
    bundles: IndexSet<String>,
    ciphers: IndexSet<String>,
    missing_singletons: IndexSet<String>,
    events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: HostedClass) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn with_bundle(mut self, bundle_name: &str) -> Self {
        self.bundles.insert(bundle_name.to_string());
        self
    }

    pub fn with_cipher(mut self, transformation: &str) -> Self {
        self.ciphers.insert(transformation.to_string());
        self
    }

    /// Makes `ImageSingletons.lookup` fail for `class_name`.
    pub fn without_singleton(mut self, class_name: &str) -> Self {
        self.missing_singletons.insert(class_name.to_string());
        self
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every class registered with `registry`, in registration order.
    pub fn registered_classes(&self, registry: Registry) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::RegisterClasses { registry: r, classes } if *r == registry => {
                    Some(classes.clone())
                }
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn reported_failures(&self) -> Vec<&HostFault> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::FailureReported(fault) => Some(fault),
                _ => None,
            })
            .collect()
    }

    pub fn is_platform_class(name: &str) -> bool {
        if let Some(component) = name.strip_suffix("[]") {
            return Self::is_platform_class(component);
        }
        PRIMITIVES.contains(&name) || PLATFORM_PREFIXES.iter().any(|p| name.starts_with(p))
    }

    fn knows_class(&self, name: &str) -> bool {
        let component = name.trim_end_matches("[]");
        self.classes.contains_key(component) || Self::is_platform_class(name)
    }

    fn hosted(&self, receiver: Option<&HostValue>) -> Result<Option<&HostedClass>, HostFault> {
        match receiver {
            Some(HostValue::Class(name)) => Ok(self.classes.get(name)),
            other => Err(unexpected("a class receiver", other)),
        }
    }

    fn record(&mut self, event: HostEvent) -> Result<HostValue, HostFault> {
        self.events.push(event);
        Ok(HostValue::Null)
    }

    fn invoke_class(
        &mut self,
        method: &MethodRef,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostFault> {
        let receiver_name = receiver
            .and_then(HostValue::as_class)
            .unwrap_or_default()
            .to_string();
        match method.name.as_str() {
            "forName" => {
                let name = arg_str(args, 0)?;
                self.load_class(name)
            }
            "getClassLoader" => Ok(HostValue::Object(CLASS_LOADER.to_string())),
            "getDeclaredConstructors" => Ok(HostValue::array(
                self.hosted(receiver)?
                    .map(HostedClass::constructor_members)
                    .unwrap_or_default(),
            )),
            "getDeclaredMethods" => Ok(HostValue::array(
                self.hosted(receiver)?
                    .map(HostedClass::method_members)
                    .unwrap_or_default(),
            )),
            "getDeclaredFields" => Ok(HostValue::array(
                self.hosted(receiver)?
                    .map(HostedClass::field_members)
                    .unwrap_or_default(),
            )),
            "getDeclaredConstructor" => {
                let params = class_names(arg(args, 0)?)?;
                match self.hosted(receiver)? {
                    Some(class) if class.constructors.contains(&params) => {
                        Ok(HostValue::Member(Member::Constructor {
                            declaring_class: receiver_name,
                            params,
                        }))
                    }
                    _ => Err(HostFault::no_such_method(
                        &receiver_name,
                        &format!("<init>({})", params.join(", ")),
                    )),
                }
            }
            "getDeclaredMethod" => {
                let name = arg_str(args, 0)?.to_string();
                let params = class_names(arg(args, 1)?)?;
                let found = match self.hosted(receiver)? {
                    Some(class) => class
                        .methods
                        .iter()
                        .any(|(n, p)| *n == name && *p == params),
                    None => Self::is_platform_class(&receiver_name),
                };
                if found {
                    Ok(HostValue::Member(Member::Method {
                        declaring_class: receiver_name,
                        name,
                        params,
                    }))
                } else {
                    Err(HostFault::no_such_method(
                        &receiver_name,
                        &format!("{}({})", name, params.join(", ")),
                    ))
                }
            }
            "getDeclaredField" => {
                let name = arg_str(args, 0)?.to_string();
                let found = match self.hosted(receiver)? {
                    Some(class) => class.fields.contains(&name),
                    None => Self::is_platform_class(&receiver_name),
                };
                if found {
                    Ok(HostValue::Member(Member::Field {
                        declaring_class: receiver_name,
                        name,
                    }))
                } else {
                    Err(HostFault::no_such_field(&receiver_name, &name))
                }
            }
            "getModifiers" => {
                let is_abstract = self.hosted(receiver)?.map_or(false, |c| c.is_abstract);
                Ok(HostValue::Int(if is_abstract {
                    PUBLIC_MODIFIER | ABSTRACT_MODIFIER
                } else {
                    PUBLIC_MODIFIER
                }))
            }
            _ => Err(unsupported(method)),
        }
    }

    fn invoke_registry(
        &mut self,
        registry: Registry,
        method: &MethodRef,
        args: &[HostValue],
    ) -> Result<HostValue, HostFault> {
        let params: Vec<&str> = method.params.iter().map(String::as_str).collect();
        match params.as_slice() {
            [CLASS_ARRAY] => {
                let classes = class_names(arg(args, 0)?)?;
                self.record(HostEvent::RegisterClasses { registry, classes })
            }
            [EXECUTABLE_ARRAY] => {
                let members = members(arg(args, 0)?)?;
                self.record(HostEvent::RegisterExecutables { registry, members })
            }
            [BOOLEAN, BOOLEAN, FIELD_ARRAY] => {
                let event = HostEvent::RegisterFields {
                    registry,
                    final_fields_writable: arg_bool(args, 0)?,
                    serialization: arg_bool(args, 1)?,
                    fields: members(arg(args, 2)?)?,
                };
                self.record(event)
            }
            [BOOLEAN, FIELD_ARRAY] => {
                let event = HostEvent::RegisterFields {
                    registry,
                    final_fields_writable: arg_bool(args, 0)?,
                    serialization: false,
                    fields: members(arg(args, 1)?)?,
                };
                self.record(event)
            }
            [FIELD_ARRAY] => {
                let event = HostEvent::RegisterFields {
                    registry,
                    final_fields_writable: false,
                    serialization: false,
                    fields: members(arg(args, 0)?)?,
                };
                self.record(event)
            }
            _ => Err(unsupported(method)),
        }
    }
}

impl HostEnvironment for RecordingHost {
    fn load_class(&mut self, name: &str) -> Result<HostValue, HostFault> {
        if self.knows_class(name) {
            Ok(HostValue::Class(name.to_string()))
        } else {
            Err(HostFault::class_not_found(name))
        }
    }

    fn new_instance(&mut self, class_name: &str) -> Result<HostValue, HostFault> {
        match class_name {
            ARRAY_LIST => Ok(HostValue::List(Default::default())),
            name if self.knows_class(name) => Ok(HostValue::Object(name.to_string())),
            name => Err(HostFault::class_not_found(name)),
        }
    }

    fn invoke(
        &mut self,
        _kind: InvokeKind,
        method: &MethodRef,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostFault> {
        match (method.owner.as_str(), method.name.as_str()) {
            (CLASS, _) => self.invoke_class(method, receiver, args),
            (THREAD, "currentThread") => Ok(HostValue::Object(THREAD.to_string())),
            (THREAD, "getContextClassLoader") => Ok(HostValue::Object(CLASS_LOADER.to_string())),
            (MODIFIER, "isAbstract") => match arg(args, 0)? {
                HostValue::Int(modifiers) => Ok(HostValue::Bool(modifiers & ABSTRACT_MODIFIER != 0)),
                other => Err(unexpected("int modifiers", Some(other))),
            },
            (THROWABLE, "printStackTrace") => match receiver {
                Some(HostValue::Throwable(fault)) => {
                    let fault = fault.clone();
                    self.record(HostEvent::FailureReported(fault))
                }
                other => Err(unexpected("a throwable receiver", other)),
            },
            (IMAGE_SINGLETONS, "lookup") => {
                let class = class_name(arg(args, 0)?)?;
                if self.missing_singletons.contains(&class) {
                    Err(HostFault::new(
                        "java.lang.IllegalStateException",
                        format!("no singleton registered for {}", class),
                    ))
                } else {
                    Ok(HostValue::Object(class))
                }
            }
            (BEFORE_ANALYSIS_ACCESS, "registerAsUnsafeAccessed") => match arg(args, 0)? {
                HostValue::Member(Member::Field {
                    declaring_class,
                    name,
                }) => {
                    let event = HostEvent::UnsafeAccessed {
                        class_name: declaring_class.clone(),
                        field: name.clone(),
                    };
                    self.record(event)
                }
                other => Err(unexpected("a field", Some(other))),
            },
            (RUNTIME_CLASS_INITIALIZATION, "initializeAtRunTime") => {
                let values = elements(arg(args, 0)?)?;
                if method.params.first().map(String::as_str) == Some(STRING_ARRAY) {
                    let packages = values
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                    self.record(HostEvent::InitializePackagesAtRunTime { packages })
                } else {
                    let classes = values
                        .iter()
                        .filter_map(|v| v.as_class().map(str::to_string))
                        .collect();
                    self.record(HostEvent::InitializeAtRunTime { classes })
                }
            }
            (RUNTIME_CLASS_INITIALIZATION_SUPPORT, "rerunInitialization") => {
                let event = HostEvent::RerunInitialization {
                    class_name: class_name(arg(args, 0)?)?,
                    originator: arg_str(args, 1)?.to_string(),
                };
                self.record(event)
            }
            (LIST, "add") => match receiver {
                Some(HostValue::List(values)) => {
                    values.borrow_mut().push(arg(args, 0)?.clone());
                    Ok(HostValue::Bool(true))
                }
                other => Err(unexpected("a list receiver", other)),
            },
            (LIST, "toArray") => match receiver {
                Some(HostValue::List(values)) => Ok(HostValue::array(values.borrow().clone())),
                other => Err(unexpected("a list receiver", other)),
            },
            (DYNAMIC_PROXY_REGISTRY, "addProxyClass") => {
                let interfaces = class_names(arg(args, 0)?)?;
                self.record(HostEvent::ProxyClass { interfaces })
            }
            (RESOURCE_HELPER, "registerResources") => {
                let path = arg_str(args, 0)?.to_string();
                self.record(HostEvent::Resource(path))
            }
            (RESOURCES_REGISTRY, "ignoreResources") => {
                let pattern = arg_str(args, 0)?.to_string();
                self.record(HostEvent::ResourcePatternExcluded(pattern))
            }
            (RESOURCES_REGISTRY, "addResources") => {
                let pattern = arg_str(args, 0)?.to_string();
                self.record(HostEvent::ResourcePatternIncluded(pattern))
            }
            (ACCESSIBLE_OBJECT, "setAccessible") => Ok(HostValue::Null),
            (METHOD, "invoke") => self.invoke_method(receiver, args),
            (CIPHER, "getInstance") => {
                let transformation = arg_str(args, 0)?.to_string();
                if self.ciphers.contains(&transformation) {
                    self.events.push(HostEvent::CipherRequested(transformation));
                    Ok(HostValue::Object(CIPHER.to_string()))
                } else {
                    Err(HostFault::new(
                        "java.security.NoSuchAlgorithmException",
                        transformation,
                    ))
                }
            }
            (RUNTIME_REFLECTION, "register") => {
                self.invoke_registry(Registry::Reflection, method, args)
            }
            (JNI_RUNTIME_ACCESS, "register") => self.invoke_registry(Registry::Jni, method, args),
            (COLLECTIONS, "singletonList") => Ok(HostValue::List(std::rc::Rc::new(
                std::cell::RefCell::new(vec![arg(args, 0)?.clone()]),
            ))),
            (REFLECTION_FACTORY, "getReflectionFactory") => {
                Ok(HostValue::Object(REFLECTION_FACTORY.to_string()))
            }
            (REFLECTION_FACTORY, "newConstructorForSerialization") => {
                Ok(HostValue::Member(Member::Constructor {
                    declaring_class: class_name(arg(args, 0)?)?,
                    params: Vec::new(),
                }))
            }
            (CONSTRUCTOR, "getDeclaringClass") => match receiver {
                Some(HostValue::Member(Member::Constructor {
                    declaring_class, ..
                })) => Ok(HostValue::Class(declaring_class.clone())),
                other => Err(unexpected("a constructor receiver", other)),
            },
            (REFLECTION_UTIL, "lookupMethod") => Ok(HostValue::Member(Member::Method {
                declaring_class: class_name(arg(args, 0)?)?,
                name: arg_str(args, 1)?.to_string(),
                params: class_names(arg(args, 2)?)?,
            })),
            (SERIALIZATION_SUPPORT, "addConstructorAccessor") => {
                let event = HostEvent::ConstructorAccessor {
                    class_name: class_name(arg(args, 0)?)?,
                    constructor_class: class_name(arg(args, 1)?)?,
                };
                self.record(event)
            }
            (SERIALIZATION_FEATURE, "addReflections") => {
                let event = HostEvent::SerializationReflections {
                    class_name: class_name(arg(args, 0)?)?,
                    object_class: class_name(arg(args, 1)?)?,
                };
                self.record(event)
            }
            _ => Err(unsupported(method)),
        }
    }
}

impl RecordingHost {
    fn invoke_method(
        &mut self,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostFault> {
        let (declaring_class, name) = match receiver {
            Some(HostValue::Member(Member::Method {
                declaring_class,
                name,
                ..
            })) => (declaring_class.as_str(), name.as_str()),
            other => return Err(unexpected("a method receiver", other)),
        };
        match (declaring_class, name) {
            (LOCALIZATION_FEATURE, ADD_BUNDLE_TO_CACHE) => {
                let call_args = elements(arg(args, 1)?)?;
                let bundle = call_args
                    .first()
                    .and_then(HostValue::as_str)
                    .ok_or_else(|| unexpected("a bundle name", call_args.first()))?
                    .to_string();
                if self.bundles.contains(&bundle) {
                    self.record(HostEvent::ResourceBundle(bundle))
                } else {
                    Err(HostFault::new(
                        "java.util.MissingResourceException",
                        format!("Can't find bundle for base name {}", bundle),
                    ))
                }
            }
            (CONSTRUCTOR, GET_CONSTRUCTOR_ACCESSOR) => {
                Ok(HostValue::Object(CONSTRUCTOR_ACCESSOR.to_string()))
            }
            _ => Ok(HostValue::Null),
        }
    }
}

fn unsupported(method: &MethodRef) -> HostFault {
    HostFault::new("java.lang.UnsupportedOperationException", method.to_string())
}

fn unexpected(expected: &str, found: Option<&HostValue>) -> HostFault {
    HostFault::new(
        "java.lang.IllegalArgumentException",
        format!("expected {}, found {:?}", expected, found),
    )
}

fn arg(args: &[HostValue], index: usize) -> Result<&HostValue, HostFault> {
    args.get(index)
        .ok_or_else(|| unexpected(&format!("argument {}", index), None))
}

fn arg_str(args: &[HostValue], index: usize) -> Result<&str, HostFault> {
    let value = arg(args, index)?;
    value.as_str().ok_or_else(|| unexpected("a string", Some(value)))
}

fn arg_bool(args: &[HostValue], index: usize) -> Result<bool, HostFault> {
    let value = arg(args, index)?;
    value.as_bool().ok_or_else(|| unexpected("a boolean", Some(value)))
}

fn class_name(value: &HostValue) -> Result<String, HostFault> {
    value
        .as_class()
        .map(str::to_string)
        .ok_or_else(|| unexpected("a class", Some(value)))
}

fn elements(value: &HostValue) -> Result<Vec<HostValue>, HostFault> {
    value
        .elements()
        .ok_or_else(|| unexpected("an array", Some(value)))
}

fn class_names(value: &HostValue) -> Result<Vec<String>, HostFault> {
    elements(value)?.iter().map(class_name).collect()
}

fn members(value: &HostValue) -> Result<Vec<Member>, HostFault> {
    elements(value)?
        .into_iter()
        .map(|v| match v {
            HostValue::Member(member) => Ok(member),
            other => Err(unexpected("a member", Some(&other))),
        })
        .collect()
}
