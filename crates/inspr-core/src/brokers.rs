//! Broker registry seam
//!
//! The control plane does not talk to brokers; it only needs to know which
//! ones are installed so channels can be stamped with a selected broker.

use crate::errors::{InsprError, Result};

/// Source of installed broker names
pub trait BrokerRegistry: Send + Sync {
    /// Installed brokers, in registration order
    fn available(&self) -> Vec<String>;

    /// Broker used when no entry of a priority list is installed
    fn default_broker(&self) -> Option<String>;
}

/// Fixed broker set, usually built from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticBrokers {
    available: Vec<String>,
    default: Option<String>,
}

impl StaticBrokers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a broker; the first one registered becomes the default
    ///
    /// # Errors
    ///
    /// `BrokerConfig` if the broker is already registered.
    pub fn register(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.available.contains(&name) {
            return Err(InsprError::BrokerConfig {
                broker: name,
                reason: "already installed".to_string(),
            });
        }
        if self.default.is_none() {
            self.default = Some(name.clone());
        }
        self.available.push(name);
        Ok(())
    }

    /// # Errors
    ///
    /// `BrokerConfig` if the broker is not registered.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.available.iter().any(|b| b == name) {
            return Err(InsprError::BrokerConfig {
                broker: name.to_string(),
                reason: "not installed".to_string(),
            });
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    /// Registry with the given brokers, the first being the default
    pub fn with_brokers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let available: Vec<String> = names.into_iter().map(Into::into).collect();
        let default = available.first().cloned();
        Self { available, default }
    }
}

impl BrokerRegistry for StaticBrokers {
    fn available(&self) -> Vec<String> {
        self.available.clone()
    }

    fn default_broker(&self) -> Option<String> {
        self.default.clone()
    }
}

/// Pick the broker a channel will use
///
/// The first installed entry of `priority` wins; otherwise the registry
/// default.
///
/// # Errors
///
/// `NoBrokersAvailable` when nothing is installed.
pub fn select_broker(priority: &[String], registry: &dyn BrokerRegistry) -> Result<String> {
    let available = registry.available();
    if available.is_empty() {
        return Err(InsprError::NoBrokersAvailable);
    }

    if let Some(chosen) = priority.iter().find(|b| available.contains(b)) {
        return Ok(chosen.clone());
    }

    registry
        .default_broker()
        .or_else(|| available.first().cloned())
        .ok_or(InsprError::NoBrokersAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_brokers_is_an_error() {
        let registry = StaticBrokers::new();
        assert_eq!(
            select_broker(&names(&["kafka"]), &registry),
            Err(InsprError::NoBrokersAvailable)
        );
    }

    #[test]
    fn test_priority_list_wins() {
        let registry = StaticBrokers::with_brokers(["kafka", "sidecar"]);
        assert_eq!(
            select_broker(&names(&["nats", "sidecar"]), &registry).unwrap(),
            "sidecar"
        );
    }

    #[test]
    fn test_falls_back_to_default() {
        let mut registry = StaticBrokers::with_brokers(["kafka", "sidecar"]);
        registry.set_default("sidecar").unwrap();
        assert_eq!(select_broker(&names(&["nats"]), &registry).unwrap(), "sidecar");
        assert_eq!(select_broker(&[], &registry).unwrap(), "sidecar");
    }

    #[test]
    fn test_register_and_default_rules() {
        let mut registry = StaticBrokers::new();
        registry.register("kafka").unwrap();
        registry.register("sidecar").unwrap();
        assert_eq!(registry.default_broker().as_deref(), Some("kafka"));
        assert!(registry.register("kafka").is_err());
        assert!(registry.set_default("nats").is_err());
    }
}
