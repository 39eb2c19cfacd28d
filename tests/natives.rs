//! This module is an integration test for the native overrides, configured
//! from an environment description on disk.
#![cfg(test)]

use decision_engine::{
    class::{ClassFile, ClassName, MethodInfo, MethodSignature},
    engine::{Config, Invocation, Target},
    heap::HeapSnapshot,
    native::{EnvironmentConfig, NativeCall, NativeOutcome, NativeValue},
    operand::{ConstantPool, OperandSupplier, PoolEntry},
    solver::PathCondition,
};

mod common;

const ENVIRONMENT: &str = r#"{
    "osName": "Linux",
    "osArch": "amd64",
    "fileSeparator": "/",
    "userLanguage": "en",
    "httpProxyHost": "proxy.internal",
    "httpProxyPort": "3128"
}"#;

#[test]
fn environments_are_read_from_json() -> anyhow::Result<()> {
    let environment: EnvironmentConfig = serde_json::from_str(ENVIRONMENT)?;
    assert_eq!(environment.os_name.as_deref(), Some("Linux"));
    assert_eq!(environment.http_proxy_port.as_deref(), Some("3128"));
    assert_eq!(environment.os_version, None);

    let written = serde_json::to_string(&environment)?;
    let read: EnvironmentConfig = serde_json::from_str(&written)?;
    assert_eq!(read, environment);

    Ok(())
}

#[test]
fn init_properties_reports_the_configured_environment() -> anyhow::Result<()> {
    let environment: EnvironmentConfig = serde_json::from_str(ENVIRONMENT)?;
    let classes = common::shapes().with(
        ClassFile::class("java/lang/System", "java/lang/Object").with_method(
            MethodInfo::new("initProperties", "(Ljava/util/Properties;)Ljava/util/Properties;")
                .as_static()
                .as_native(),
        ),
    );
    let heap = HeapSnapshot::new(&classes);
    let mut engine = common::new_engine(&classes, Config::default().with_environment(environment));

    let signature = MethodSignature::new(
        "java/lang/System",
        "(Ljava/util/Properties;)Ljava/util/Properties;",
        "initProperties",
    );
    let pool = ConstantPool::new().with(PoolEntry::MethodRef(signature.clone()));
    // invokestatic #1
    let code = [0xb8, 0x00, 0x01];
    let operands = OperandSupplier::new(&code, &pool).method_operands(0, false)?;
    let invocation = Invocation {
        operands,
        is_interface:   false,
        is_special:     false,
        is_static:      true,
        invoking_class: ClassName::new("pkg/Main"),
        receiver:       None,
    };
    let dispatched = engine.invoke(0, &heap, &PathCondition::new(), &invocation)?;
    assert!(matches!(dispatched[0].target, Target::Overridden(_)));

    let call = NativeCall {
        receiver:       None,
        arguments:      vec![],
        current_thread: None,
    };
    let Some(NativeOutcome::Return(NativeValue::Properties(properties))) =
        engine.natives().invoke(&signature, &call)
    else {
        anyhow::bail!("initProperties must return the properties");
    };
    assert_eq!(properties.get("os.name").map(String::as_str), Some("Linux"));
    assert_eq!(
        properties.get("http.proxyHost").map(String::as_str),
        Some("proxy.internal")
    );
    assert!(properties.contains_key("java.version"));
    assert!(!properties.contains_key("os.version"));

    Ok(())
}
