//! The configuration of the engine.

use crate::{
    constant::{
        DEFAULT_FAULT_ALTERNATIVES_ENABLED,
        DEFAULT_FEASIBILITY_CHECKS_ENABLED,
        DEFAULT_NULL_RECEIVERS_ENABLED,
    },
    native::EnvironmentConfig,
};

/// The configuration for the engine instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Whether the decision procedure is consulted before an alternative is
    /// kept.
    ///
    /// When disabled, every alternative is kept and flagged as needing a
    /// re-check.
    ///
    /// Defaults to [`DEFAULT_FEASIBILITY_CHECKS_ENABLED`].
    pub feasibility_checks: bool,

    /// Whether alternatives in which the analyzed program faults (out of
    /// bounds accesses and type mismatches) are produced.
    ///
    /// Defaults to [`DEFAULT_FAULT_ALTERNATIVES_ENABLED`].
    pub fault_alternatives: bool,

    /// Whether the receiver of an invocation is considered to possibly be
    /// null.
    ///
    /// Defaults to [`DEFAULT_NULL_RECEIVERS_ENABLED`].
    pub null_receivers: bool,

    /// The environment seen by the analyzed program through the native
    /// overrides.
    pub environment: EnvironmentConfig,
}

impl Config {
    /// Sets the `feasibility_checks` config parameter to `value`.
    #[must_use]
    pub fn with_feasibility_checks(mut self, value: bool) -> Self {
        self.feasibility_checks = value;
        self
    }

    /// Sets the `fault_alternatives` config parameter to `value`.
    #[must_use]
    pub fn with_fault_alternatives(mut self, value: bool) -> Self {
        self.fault_alternatives = value;
        self
    }

    /// Sets the `null_receivers` config parameter to `value`.
    #[must_use]
    pub fn with_null_receivers(mut self, value: bool) -> Self {
        self.null_receivers = value;
        self
    }

    /// Sets the environment to `value`.
    #[must_use]
    pub fn with_environment(mut self, value: EnvironmentConfig) -> Self {
        self.environment = value;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let feasibility_checks = DEFAULT_FEASIBILITY_CHECKS_ENABLED;
        let fault_alternatives = DEFAULT_FAULT_ALTERNATIVES_ENABLED;
        let null_receivers = DEFAULT_NULL_RECEIVERS_ENABLED;
        let environment = EnvironmentConfig::default();
        Self {
            feasibility_checks,
            fault_alternatives,
            null_receivers,
            environment,
        }
    }
}
