//! Names and method references of the platform and hosted APIs that
//! generated units call.

pub use crate::output::unit_ast::THROWABLE;

use crate::output::unit_ast::{MethodRef, VOID};
use once_cell::sync::Lazy;

pub const BOOLEAN: &str = "boolean";
pub const INT: &str = "int";

pub const OBJECT: &str = "java.lang.Object";
pub const OBJECT_ARRAY: &str = "java.lang.Object[]";
pub const STRING: &str = "java.lang.String";
pub const STRING_ARRAY: &str = "java.lang.String[]";
pub const CLASS: &str = "java.lang.Class";
pub const CLASS_ARRAY: &str = "java.lang.Class[]";
pub const CLASS_LOADER: &str = "java.lang.ClassLoader";
pub const THREAD: &str = "java.lang.Thread";
pub const CONSTRUCTOR: &str = "java.lang.reflect.Constructor";
pub const CONSTRUCTOR_ARRAY: &str = "java.lang.reflect.Constructor[]";
pub const METHOD: &str = "java.lang.reflect.Method";
pub const METHOD_ARRAY: &str = "java.lang.reflect.Method[]";
pub const FIELD: &str = "java.lang.reflect.Field";
pub const FIELD_ARRAY: &str = "java.lang.reflect.Field[]";
pub const EXECUTABLE_ARRAY: &str = "java.lang.reflect.Executable[]";
pub const ACCESSIBLE_OBJECT: &str = "java.lang.reflect.AccessibleObject";
pub const MODIFIER: &str = "java.lang.reflect.Modifier";
pub const LIST: &str = "java.util.List";
pub const ARRAY_LIST: &str = "java.util.ArrayList";
pub const COLLECTIONS: &str = "java.util.Collections";
pub const CIPHER: &str = "javax.crypto.Cipher";

pub const FEATURE: &str = "org.graalvm.nativeimage.hosted.Feature";
pub const BEFORE_ANALYSIS_ACCESS: &str = "org.graalvm.nativeimage.hosted.Feature$BeforeAnalysisAccess";
pub const AUTOMATIC_FEATURE: &str = "com.oracle.svm.core.annotate.AutomaticFeature";
pub const IMAGE_SINGLETONS: &str = "org.graalvm.nativeimage.ImageSingletons";
pub const RUNTIME_CLASS_INITIALIZATION: &str =
    "org.graalvm.nativeimage.hosted.RuntimeClassInitialization";
pub const RUNTIME_CLASS_INITIALIZATION_SUPPORT: &str =
    "org.graalvm.nativeimage.impl.RuntimeClassInitializationSupport";
pub const RUNTIME_REFLECTION: &str = "org.graalvm.nativeimage.hosted.RuntimeReflection";
pub const JNI_RUNTIME_ACCESS: &str = "com.oracle.svm.core.jni.JNIRuntimeAccess";
pub const DYNAMIC_PROXY_REGISTRY: &str = "com.oracle.svm.core.jdk.proxy.DynamicProxyRegistry";
pub const LOCALIZATION_FEATURE: &str = "com.oracle.svm.core.jdk.LocalizationFeature";
pub const RESOURCES_REGISTRY: &str = "com.oracle.svm.core.configure.ResourcesRegistry";
pub const RESOURCE_HELPER: &str = "io.quarkus.runtime.ResourceHelper";

pub const SERIALIZATION_FEATURE: &str = "com.oracle.svm.reflect.serialize.hosted.SerializationFeature";
pub const SERIALIZATION_REGISTRY: &str = "com.oracle.svm.core.jdk.serialize.SerializationRegistry";
pub const SERIALIZATION_SUPPORT: &str = "com.oracle.svm.reflect.serialize.SerializationSupport";
pub const STUB_FOR_ABSTRACT_CLASS: &str =
    "com.oracle.svm.reflect.serialize.SerializationSupport$StubForAbstractClass";
pub const REFLECTION_FACTORY: &str = "sun.reflect.ReflectionFactory";
pub const REFLECTION_UTIL: &str = "com.oracle.svm.util.ReflectionUtil";

/// Name of the bundle registration method looked up on the localization
/// feature.
pub const ADD_BUNDLE_TO_CACHE: &str = "addBundleToCache";
pub const GET_CONSTRUCTOR_ACCESSOR: &str = "getConstructorAccessor";

pub static FOR_NAME: Lazy<MethodRef> = Lazy::new(|| MethodRef::new(CLASS, "forName", CLASS, &[STRING]));
pub static FOR_NAME_WITH_LOADER: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(CLASS, "forName", CLASS, &[STRING, BOOLEAN, CLASS_LOADER])
});
pub static GET_CLASS_LOADER: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CLASS, "getClassLoader", CLASS_LOADER, &[]));
pub static CURRENT_THREAD: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(THREAD, "currentThread", THREAD, &[]));
pub static GET_CONTEXT_CLASS_LOADER: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(THREAD, "getContextClassLoader", CLASS_LOADER, &[]));

pub static GET_DECLARED_CONSTRUCTORS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CLASS, "getDeclaredConstructors", CONSTRUCTOR_ARRAY, &[]));
pub static GET_DECLARED_METHODS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CLASS, "getDeclaredMethods", METHOD_ARRAY, &[]));
pub static GET_DECLARED_FIELDS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CLASS, "getDeclaredFields", FIELD_ARRAY, &[]));
pub static GET_DECLARED_CONSTRUCTOR: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CLASS, "getDeclaredConstructor", CONSTRUCTOR, &[CLASS_ARRAY]));
pub static GET_DECLARED_METHOD: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(CLASS, "getDeclaredMethod", METHOD, &[STRING, CLASS_ARRAY])
});
pub static GET_DECLARED_FIELD: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CLASS, "getDeclaredField", FIELD, &[STRING]));
pub static GET_MODIFIERS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CLASS, "getModifiers", INT, &[]));
pub static IS_ABSTRACT: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(MODIFIER, "isAbstract", BOOLEAN, &[INT]));
pub static PRINT_STACK_TRACE: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(THROWABLE, "printStackTrace", VOID, &[]));

pub static IMAGE_SINGLETONS_LOOKUP: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(IMAGE_SINGLETONS, "lookup", OBJECT, &[CLASS]));
pub static REGISTER_AS_UNSAFE_ACCESSED: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(BEFORE_ANALYSIS_ACCESS, "registerAsUnsafeAccessed", VOID, &[FIELD])
});
pub static INITIALIZE_CLASSES_AT_RUN_TIME: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(RUNTIME_CLASS_INITIALIZATION, "initializeAtRunTime", VOID, &[CLASS_ARRAY])
});
pub static INITIALIZE_PACKAGES_AT_RUN_TIME: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(RUNTIME_CLASS_INITIALIZATION, "initializeAtRunTime", VOID, &[STRING_ARRAY])
});
pub static RERUN_INITIALIZATION: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(
        RUNTIME_CLASS_INITIALIZATION_SUPPORT,
        "rerunInitialization",
        VOID,
        &[CLASS, STRING],
    )
});
pub static LIST_ADD: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(LIST, "add", BOOLEAN, &[OBJECT]));
pub static LIST_TO_ARRAY: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(LIST, "toArray", OBJECT_ARRAY, &[OBJECT_ARRAY]));

pub static ADD_PROXY_CLASS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(DYNAMIC_PROXY_REGISTRY, "addProxyClass", VOID, &[CLASS_ARRAY]));
pub static REGISTER_RESOURCES: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(RESOURCE_HELPER, "registerResources", VOID, &[STRING]));
pub static ADD_RESOURCES: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(RESOURCES_REGISTRY, "addResources", VOID, &[STRING]));
pub static IGNORE_RESOURCES: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(RESOURCES_REGISTRY, "ignoreResources", VOID, &[STRING]));
pub static SET_ACCESSIBLE: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(ACCESSIBLE_OBJECT, "setAccessible", VOID, &[BOOLEAN]));
pub static METHOD_INVOKE: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(METHOD, "invoke", OBJECT, &[OBJECT, OBJECT_ARRAY]));
pub static CIPHER_GET_INSTANCE: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CIPHER, "getInstance", CIPHER, &[STRING]));

pub static REFLECTION_REGISTER_CLASSES: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(RUNTIME_REFLECTION, "register", VOID, &[CLASS_ARRAY]));
pub static REFLECTION_REGISTER_EXECUTABLES: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(RUNTIME_REFLECTION, "register", VOID, &[EXECUTABLE_ARRAY]));
pub static REFLECTION_REGISTER_FIELDS_WITH_FLAGS: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(
        RUNTIME_REFLECTION,
        "register",
        VOID,
        &[BOOLEAN, BOOLEAN, FIELD_ARRAY],
    )
});
pub static REFLECTION_REGISTER_FIELDS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(RUNTIME_REFLECTION, "register", VOID, &[FIELD_ARRAY]));

pub static JNI_REGISTER_CLASSES: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(JNI_RUNTIME_ACCESS, "register", VOID, &[CLASS_ARRAY]));
pub static JNI_REGISTER_EXECUTABLES: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(JNI_RUNTIME_ACCESS, "register", VOID, &[EXECUTABLE_ARRAY]));
pub static JNI_REGISTER_FIELDS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(JNI_RUNTIME_ACCESS, "register", VOID, &[BOOLEAN, FIELD_ARRAY]));

pub static SINGLETON_LIST: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(COLLECTIONS, "singletonList", LIST, &[OBJECT]));
pub static GET_REFLECTION_FACTORY: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(REFLECTION_FACTORY, "getReflectionFactory", REFLECTION_FACTORY, &[])
});
pub static NEW_CONSTRUCTOR_FOR_SERIALIZATION: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(
        REFLECTION_FACTORY,
        "newConstructorForSerialization",
        CONSTRUCTOR,
        &[CLASS],
    )
});
pub static GET_DECLARING_CLASS: Lazy<MethodRef> =
    Lazy::new(|| MethodRef::new(CONSTRUCTOR, "getDeclaringClass", CLASS, &[]));
pub static LOOKUP_METHOD: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(REFLECTION_UTIL, "lookupMethod", METHOD, &[CLASS, STRING, CLASS_ARRAY])
});
pub static ADD_CONSTRUCTOR_ACCESSOR: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(
        SERIALIZATION_SUPPORT,
        "addConstructorAccessor",
        OBJECT,
        &[CLASS, CLASS, OBJECT],
    )
});
pub static ADD_REFLECTIONS: Lazy<MethodRef> = Lazy::new(|| {
    MethodRef::new(SERIALIZATION_FEATURE, "addReflections", VOID, &[CLASS, CLASS])
});
