//! This module contains the registry of overrides for native methods whose
//! behavior depends on the environment, and which the engine emulates
//! instead of executing.
//!
//! The registry is built once, from the [`EnvironmentConfig`], when the
//! engine is constructed. It is read-only afterward.

pub mod environment;

use std::collections::{BTreeMap, HashMap};

use derivative::Derivative;
pub use environment::EnvironmentConfig;

use crate::{
    class::MethodSignature,
    constant::{
        EMULATED_ADDRESS_SIZE,
        JAVA_CLASS_VERSION,
        JAVA_SPECIFICATION_VERSION,
        JAVA_VENDOR_URL,
        JAVA_VENDOR_URL_BUG,
        JAVA_VERSION,
    },
    value::Reference,
};

/// The arguments of a call to an overridden native method.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NativeCall {
    /// The receiver of the call, if the method is not static.
    pub receiver: Option<Reference>,

    /// The reference arguments of the call, in order.
    pub arguments: Vec<Reference>,

    /// The thread executing the call.
    pub current_thread: Option<Reference>,
}

/// A value produced by an overridden native method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NativeValue {
    Null,
    Boolean(bool),
    Int(i32),

    /// A set of system properties to be stored into the `Properties` object
    /// passed to the call, which is also the value returned.
    Properties(BTreeMap<String, String>),
}

/// What the interpreter must do in place of executing a native method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NativeOutcome {
    /// Return `_0` to the caller.
    Return(NativeValue),

    /// Invoke the `run` method of `action` and return its result.
    ///
    /// When `wraps_checked` is set, checked exceptions thrown by the action
    /// are wrapped in a `java.security.PrivilegedActionException`.
    RunAction {
        action:        Reference,
        wraps_checked: bool,
    },
}

/// An override for a native method.
pub type NativeOverride = Box<dyn Fn(&NativeCall) -> NativeOutcome>;

/// The registry mapping the signatures of overridden native methods to their
/// overrides.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct NativeOverrideRegistry {
    #[derivative(Debug = "ignore")]
    overrides: HashMap<MethodSignature, NativeOverride>,
}

impl NativeOverrideRegistry {
    /// Constructs the registry of the default overrides, with the system
    /// properties taken from `environment`.
    #[must_use]
    pub fn new(environment: &EnvironmentConfig) -> Self {
        let mut registry = Self::empty();

        let access_controller = "java/security/AccessController";
        registry.register(
            MethodSignature::new(
                access_controller,
                "(Ljava/security/PrivilegedExceptionAction;)Ljava/lang/Object;",
                "doPrivileged",
            ),
            Box::new(|call| run_first_argument(call, true)),
        );
        registry.register(
            MethodSignature::new(
                access_controller,
                "(Ljava/security/PrivilegedAction;)Ljava/lang/Object;",
                "doPrivileged",
            ),
            Box::new(|call| run_first_argument(call, false)),
        );
        registry.register(
            MethodSignature::new(
                access_controller,
                "()Ljava/security/AccessControlContext;",
                "getStackAccessControlContext",
            ),
            Box::new(|_| NativeOutcome::Return(NativeValue::Null)),
        );
        registry.register(
            MethodSignature::new("java/util/concurrent/atomic/AtomicLong", "()Z", "VMSupportsCS8"),
            Box::new(|_| NativeOutcome::Return(NativeValue::Boolean(true))),
        );
        registry.register(
            MethodSignature::new("java/lang/Class", "(Ljava/lang/Class;)Z", "desiredAssertionStatus0"),
            Box::new(|_| NativeOutcome::Return(NativeValue::Boolean(false))),
        );

        let properties = system_properties(environment);
        registry.register(
            MethodSignature::new(
                "java/lang/System",
                "(Ljava/util/Properties;)Ljava/util/Properties;",
                "initProperties",
            ),
            Box::new(move |_| NativeOutcome::Return(NativeValue::Properties(properties.clone()))),
        );

        registry.register(
            MethodSignature::new("java/lang/Thread", "()Z", "isAlive"),
            Box::new(|call| {
                // Only the current thread ever runs.
                let alive = call.receiver.is_some() && call.receiver == call.current_thread;
                NativeOutcome::Return(NativeValue::Boolean(alive))
            }),
        );
        registry.register(
            MethodSignature::new("jbse/meta/Analysis", "()Z", "isRunByJBSE"),
            Box::new(|_| NativeOutcome::Return(NativeValue::Boolean(true))),
        );

        let unsafe_class = "sun/misc/Unsafe";
        registry.register(
            MethodSignature::new(unsafe_class, "()I", "addressSize"),
            Box::new(|_| NativeOutcome::Return(NativeValue::Int(EMULATED_ADDRESS_SIZE))),
        );
        registry.register(
            MethodSignature::new(unsafe_class, "(Ljava/lang/Class;)I", "arrayBaseOffset"),
            Box::new(|_| NativeOutcome::Return(NativeValue::Int(0))),
        );
        registry.register(
            MethodSignature::new(unsafe_class, "(Ljava/lang/Class;)I", "arrayIndexScale"),
            Box::new(|_| NativeOutcome::Return(NativeValue::Int(1))),
        );

        registry
    }

    /// Constructs a registry with no overrides.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Registers `implementation` as the override of the native method with
    /// `signature`, replacing any existing override.
    pub fn register(&mut self, signature: MethodSignature, implementation: NativeOverride) {
        self.overrides.insert(signature, implementation);
    }

    /// Checks if the method with `signature` is overridden.
    #[must_use]
    pub fn is_overridden(&self, signature: &MethodSignature) -> bool {
        self.overrides.contains_key(signature)
    }

    /// Runs the override of the method with `signature` on `call`, or
    /// returns [`None`] if the method is not overridden.
    #[must_use]
    pub fn invoke(&self, signature: &MethodSignature, call: &NativeCall) -> Option<NativeOutcome> {
        let implementation = self.overrides.get(signature)?;
        log::trace!("Running the override of native method {signature}");
        Some(implementation(call))
    }

    /// Gets the signatures of all overridden methods in ascending order.
    #[must_use]
    pub fn signatures(&self) -> Vec<&MethodSignature> {
        let mut signatures: Vec<_> = self.overrides.keys().collect();
        signatures.sort();
        signatures
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Runs the action passed as the first argument of `doPrivileged`, as access
/// control is not enforced.
fn run_first_argument(call: &NativeCall, wraps_checked: bool) -> NativeOutcome {
    let action = call.arguments.first().cloned().unwrap_or(Reference::Null);
    NativeOutcome::RunAction {
        action,
        wraps_checked,
    }
}

/// Builds the system properties reported by `System.initProperties`.
fn system_properties(environment: &EnvironmentConfig) -> BTreeMap<String, String> {
    let fixed = [
        ("java.specification.version", JAVA_SPECIFICATION_VERSION),
        ("java.specification.name", "Java Platform API Specification"),
        ("java.specification.vendor", "Oracle Corporation"),
        ("java.version", JAVA_VERSION),
        ("java.vendor", env!("CARGO_PKG_NAME")),
        ("java.vendor.url", JAVA_VENDOR_URL),
        ("java.vendor.url.bug", JAVA_VENDOR_URL_BUG),
        ("java.class.version", JAVA_CLASS_VERSION),
        ("file.encoding.pkg", "sun.io"),
    ];

    let mut properties: BTreeMap<String, String> = fixed
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    properties.extend(environment.properties());
    properties
}

#[cfg(test)]
mod test {
    use crate::{
        class::MethodSignature,
        constant::{JAVA_VENDOR_URL, JAVA_VENDOR_URL_BUG},
        native::{EnvironmentConfig, NativeCall, NativeOutcome, NativeOverrideRegistry, NativeValue},
        value::Reference,
    };

    #[test]
    fn registers_the_default_overrides() {
        let registry = NativeOverrideRegistry::new(&EnvironmentConfig::new());
        assert_eq!(registry.len(), 11);

        let scale = MethodSignature::new("sun/misc/Unsafe", "(Ljava/lang/Class;)I", "arrayIndexScale");
        assert_eq!(
            registry.invoke(&scale, &NativeCall::default()),
            Some(NativeOutcome::Return(NativeValue::Int(1)))
        );

        let missing = MethodSignature::new("java/lang/Object", "()I", "hashCode");
        assert!(!registry.is_overridden(&missing));
        assert_eq!(registry.invoke(&missing, &NativeCall::default()), None);
    }

    #[test]
    fn system_properties_include_the_environment() {
        let environment = EnvironmentConfig {
            os_name: Some("Linux".into()),
            ..EnvironmentConfig::new()
        };
        let registry = NativeOverrideRegistry::new(&environment);
        let init = MethodSignature::new(
            "java/lang/System",
            "(Ljava/util/Properties;)Ljava/util/Properties;",
            "initProperties",
        );

        let Some(NativeOutcome::Return(NativeValue::Properties(properties))) =
            registry.invoke(&init, &NativeCall::default())
        else {
            panic!("initProperties did not return properties");
        };
        assert_eq!(properties.get("os.name").map(String::as_str), Some("Linux"));
        assert_eq!(
            properties.get("java.version").map(String::as_str),
            Some("1.8.0_144")
        );
        assert_eq!(
            properties.get("java.vendor.url").map(String::as_str),
            Some(JAVA_VENDOR_URL)
        );
        assert_eq!(
            properties.get("java.vendor.url.bug").map(String::as_str),
            Some(JAVA_VENDOR_URL_BUG)
        );
        assert!(!properties.contains_key("os.arch"));
    }

    #[test]
    fn only_the_current_thread_is_alive() {
        let registry = NativeOverrideRegistry::new(&EnvironmentConfig::new());
        let is_alive = MethodSignature::new("java/lang/Thread", "()Z", "isAlive");
        let call = |receiver| NativeCall {
            receiver:       Some(Reference::Concrete(receiver)),
            arguments:      vec![],
            current_thread: Some(Reference::Concrete(1)),
        };

        assert_eq!(
            registry.invoke(&is_alive, &call(1)),
            Some(NativeOutcome::Return(NativeValue::Boolean(true)))
        );
        assert_eq!(
            registry.invoke(&is_alive, &call(2)),
            Some(NativeOutcome::Return(NativeValue::Boolean(false)))
        );
    }

    #[test]
    fn privileged_actions_are_run() {
        let registry = NativeOverrideRegistry::new(&EnvironmentConfig::new());
        let do_privileged = MethodSignature::new(
            "java/security/AccessController",
            "(Ljava/security/PrivilegedAction;)Ljava/lang/Object;",
            "doPrivileged",
        );
        let call = NativeCall {
            arguments: vec![Reference::Concrete(5)],
            ..NativeCall::default()
        };

        assert_eq!(
            registry.invoke(&do_privileged, &call),
            Some(NativeOutcome::RunAction {
                action:        Reference::Concrete(5),
                wraps_checked: false,
            })
        );
    }
}
