//! This module contains constants that are needed throughout the codebase.

/// The internal name of the root of the class hierarchy.
pub const JAVA_OBJECT: &str = "java/lang/Object";

/// The internal name of the `Cloneable` interface, implemented by all arrays.
pub const JAVA_CLONEABLE: &str = "java/lang/Cloneable";

/// The internal name of the `Serializable` interface, implemented by all
/// arrays.
pub const JAVA_SERIALIZABLE: &str = "java/io/Serializable";

/// The name of instance initialization methods.
pub const INIT_METHOD_NAME: &str = "<init>";

/// The name of class initialization methods.
pub const CLINIT_METHOD_NAME: &str = "<clinit>";

/// The error class synthesized when a reference is dereferenced while null.
pub const NULL_POINTER_EXCEPTION: &str = "java/lang/NullPointerException";

/// The error class synthesized when an array is accessed out of its bounds.
pub const ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION: &str = "java/lang/ArrayIndexOutOfBoundsException";

/// The error class synthesized when an incompatible value is stored into an
/// array.
pub const ARRAY_STORE_EXCEPTION: &str = "java/lang/ArrayStoreException";

/// The error class synthesized when a checked cast fails.
pub const CLASS_CAST_EXCEPTION: &str = "java/lang/ClassCastException";

/// The error class synthesized when a class cannot be found.
pub const NO_CLASS_DEFINITION_FOUND_ERROR: &str = "java/lang/NoClassDefFoundError";

/// The error class synthesized when method resolution finds no method.
pub const NO_SUCH_METHOD_ERROR: &str = "java/lang/NoSuchMethodError";

/// The error class synthesized when a resolved method is not compatible with
/// the invocation that referenced it.
pub const INCOMPATIBLE_CLASS_CHANGE_ERROR: &str = "java/lang/IncompatibleClassChangeError";

/// The error class synthesized when dispatch reaches an abstract method.
pub const ABSTRACT_METHOD_ERROR: &str = "java/lang/AbstractMethodError";

/// The error class synthesized when a native method has no implementation.
pub const UNSATISFIED_LINK_ERROR: &str = "java/lang/UnsatisfiedLinkError";

/// The code of the array load instruction family.
pub const ARRAY_LOAD_CODE: &str = "ARRAY_LOAD";

/// The code of the field load instruction family.
pub const FIELD_LOAD_CODE: &str = "FIELD_LOAD";

/// The code of the array store instruction family.
pub const ARRAY_STORE_CODE: &str = "ARRAY_STORE";

/// The code of the checked cast instruction family.
pub const CHECK_CAST_CODE: &str = "CHECK_CAST";

/// The code of the type test instruction family.
pub const INSTANCE_OF_CODE: &str = "INSTANCE_OF";

/// The code of the invocation instruction family.
pub const INVOKE_CODE: &str = "INVOKE";

/// The number assigned to the first alternative of every decision point.
pub const FIRST_BRANCH_NUMBER: u32 = 1;

/// The number of leading bytes of an identity digest shown when it is
/// displayed in short form.
pub const SHORT_IDENTITY_BYTES: usize = 6;

/// The default value for whether the engine consults the decision procedure
/// before keeping an alternative.
pub const DEFAULT_FEASIBILITY_CHECKS_ENABLED: bool = true;

/// The default value for whether the engine produces fault alternatives for
/// accesses that can fail.
pub const DEFAULT_FAULT_ALTERNATIVES_ENABLED: bool = true;

/// The default value for whether the engine considers symbolic invocation
/// receivers that may be null.
pub const DEFAULT_NULL_RECEIVERS_ENABLED: bool = true;

/// The default number of operations the engine will perform before
/// polling the watchdog.
pub const DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS: usize = 100;

/// The address size reported to analyzed code by the native overrides.
pub const EMULATED_ADDRESS_SIZE: i32 = 8;

/// The specification version reported by `System.initProperties`.
pub const JAVA_SPECIFICATION_VERSION: &str = "1.8";

/// The runtime version reported by `System.initProperties`.
pub const JAVA_VERSION: &str = "1.8.0_144";

/// The class file version reported by `System.initProperties`.
pub const JAVA_CLASS_VERSION: &str = "52.0";

/// The vendor home page reported by `System.initProperties`.
pub const JAVA_VENDOR_URL: &str = concat!("https://crates.io/crates/", env!("CARGO_PKG_NAME"));

/// The vendor bug tracker reported by `System.initProperties`. The crate page
/// links to the tracker of the repository.
pub const JAVA_VENDOR_URL_BUG: &str = JAVA_VENDOR_URL;
