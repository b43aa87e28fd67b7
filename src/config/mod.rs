use crate::error::{RestViewError, Result};
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

pub const EXCEPTION_CODES_KEY: &str = "RESTVIEW_EXCEPTION_CODES";
pub const EXCEPTION_MESSAGES_KEY: &str = "RESTVIEW_EXCEPTION_MESSAGES";
pub const DEBUG_KEY: &str = "RESTVIEW_DEBUG";

/// Container parameter names used by [`ExceptionSettings::from_container`].
pub const CODES_PARAMETER: &str = "restview.exception.codes";
pub const MESSAGES_PARAMETER: &str = "restview.exception.messages";

/// Key/value configuration, seeded from the process environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key).map(|raw| parse_bool(key, &raw)).transpose()
    }
}

/// Static exception configuration: status overrides and the message allow-list.
///
/// Loaded once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExceptionSettings {
    #[serde(default)]
    pub codes: HashMap<String, u16>,
    #[serde(default)]
    pub messages: HashMap<String, bool>,
}

impl ExceptionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, class: impl Into<String>, code: u16) -> Self {
        self.codes.insert(class.into(), code);
        self
    }

    pub fn with_message(mut self, class: impl Into<String>, expose: bool) -> Self {
        self.messages.insert(class.into(), expose);
        self
    }

    pub fn code_for(&self, class: &str) -> Option<u16> {
        self.codes.get(class).copied()
    }

    /// Only classes explicitly flagged `true` may expose their message.
    pub fn exposes_message(&self, class: &str) -> bool {
        self.messages.get(class).copied().unwrap_or(false)
    }

    /// Parse `Class=404,Other=409` / `Class=true` style entries.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let mut settings = Self::new();
        if let Some(raw) = config.get(EXCEPTION_CODES_KEY) {
            for (class, value) in parse_pairs(EXCEPTION_CODES_KEY, &raw)? {
                let code = value.parse::<u16>().map_err(|_| {
                    RestViewError::invalid_config(
                        EXCEPTION_CODES_KEY,
                        format!("'{}' is not a status code", value),
                    )
                })?;
                settings.codes.insert(class, code);
            }
        }
        if let Some(raw) = config.get(EXCEPTION_MESSAGES_KEY) {
            for (class, value) in parse_pairs(EXCEPTION_MESSAGES_KEY, &raw)? {
                let expose = parse_bool(EXCEPTION_MESSAGES_KEY, &value)?;
                settings.messages.insert(class, expose);
            }
        }
        Ok(settings)
    }

    pub fn from_container(container: &crate::di::Container) -> Result<Self> {
        let mut settings = Self::new();
        if container.has_parameter(CODES_PARAMETER) {
            settings.codes = container.parameter(CODES_PARAMETER)?;
        }
        if container.has_parameter(MESSAGES_PARAMETER) {
            settings.messages = container.parameter(MESSAGES_PARAMETER)?;
        }
        Ok(settings)
    }
}

fn parse_pairs(key: &str, raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (class, value) = entry.split_once('=').ok_or_else(|| {
                RestViewError::invalid_config(key, format!("expected Class=value, got '{}'", entry))
            })?;
            Ok((class.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(RestViewError::invalid_config(
            key,
            format!("'{}' is not a boolean", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::ContainerBuilder;
    use serde_json::json;

    #[test]
    fn test_settings_from_config() {
        let config = ConfigService::default();
        config.set(EXCEPTION_CODES_KEY, "NotFound=404, Conflict = 409");
        config.set(EXCEPTION_MESSAGES_KEY, "NotFound=true,Conflict=0");

        let settings = ExceptionSettings::from_config(&config).unwrap();
        assert_eq!(settings.code_for("NotFound"), Some(404));
        assert_eq!(settings.code_for("Conflict"), Some(409));
        assert_eq!(settings.code_for("Other"), None);
        assert!(settings.exposes_message("NotFound"));
        assert!(!settings.exposes_message("Conflict"));
        assert!(!settings.exposes_message("Other"));
    }

    #[test]
    fn test_malformed_entries_are_rejected() {
        let config = ConfigService::default();
        config.set(EXCEPTION_CODES_KEY, "NotFound");
        assert!(matches!(
            ExceptionSettings::from_config(&config),
            Err(RestViewError::InvalidConfig { .. })
        ));

        config.set(EXCEPTION_CODES_KEY, "NotFound=abc");
        assert!(ExceptionSettings::from_config(&config).is_err());

        config.set(DEBUG_KEY, "maybe");
        assert!(config.get_bool(DEBUG_KEY).is_err());
    }

    #[test]
    fn test_settings_from_container_and_json() {
        let container = ContainerBuilder::new()
            .parameter(CODES_PARAMETER, json!({"Forbidden": 403}))
            .build();
        let settings = ExceptionSettings::from_container(&container).unwrap();
        assert_eq!(settings.code_for("Forbidden"), Some(403));
        assert!(settings.messages.is_empty());

        let parsed: ExceptionSettings =
            serde_json::from_value(json!({"messages": {"Forbidden": true}})).unwrap();
        assert!(parsed.exposes_message("Forbidden"));
        assert!(parsed.codes.is_empty());
    }
}
