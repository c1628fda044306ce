// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor settings: autosave timing, save retries and creation defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Bounds, Point, Size};
use crate::model::{AccessModifier, Element, ElementId, Member, MemberId, MemberKind};
use crate::sync::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save_attempts must be at least 1")]
    ZeroAttempts,
    #[error("{what} default size must be positive (width={width}, height={height})")]
    InvalidSize { what: &'static str, width: f64, height: f64 },
}

/// Name and size given to a freshly added element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefaults {
    pub name: String,
    pub width: f64,
    pub height: f64,
}

impl ElementDefaults {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Name and type given to a freshly added member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDefaults {
    pub name: String,
    pub type_annotation: String,
    pub access: AccessModifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub autosave_debounce_ms: u64,
    pub save_attempts: u32,
    pub save_retry_backoff_ms: u64,
    pub class: ElementDefaults,
    pub interface: ElementDefaults,
    pub attribute: MemberDefaults,
    pub method: MemberDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 500,
            save_attempts: 3,
            save_retry_backoff_ms: 200,
            class: ElementDefaults { name: "NewClass".to_owned(), width: 200.0, height: 300.0 },
            interface: ElementDefaults {
                name: "NewInterface".to_owned(),
                width: 200.0,
                height: 200.0,
            },
            attribute: MemberDefaults {
                name: "newAttribute".to_owned(),
                type_annotation: "string".to_owned(),
                access: AccessModifier::Public,
            },
            method: MemberDefaults {
                name: "newMethod()".to_owned(),
                type_annotation: "string".to_owned(),
                access: AccessModifier::Public,
            },
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        for (what, defaults) in [("class", &self.class), ("interface", &self.interface)] {
            if !defaults.size().is_positive() {
                return Err(ConfigError::InvalidSize {
                    what,
                    width: defaults.width,
                    height: defaults.height,
                });
            }
        }
        Ok(())
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.save_attempts, Duration::from_millis(self.save_retry_backoff_ms))
    }

    /// A new class with a fresh id, top-left corner at `at`.
    pub fn new_class(&self, at: Point) -> Element {
        Element::class(ElementId::generate(), self.class.name.clone(), self.bounds(&self.class, at))
    }

    pub fn new_interface(&self, at: Point) -> Element {
        Element::interface(
            ElementId::generate(),
            self.interface.name.clone(),
            self.bounds(&self.interface, at),
        )
    }

    /// A new attribute or method with a fresh id.
    pub fn new_member(&self, kind: MemberKind) -> Member {
        let defaults = match kind {
            MemberKind::Attribute => &self.attribute,
            MemberKind::Method => &self.method,
        };
        Member::new(
            MemberId::generate(),
            defaults.name.clone(),
            defaults.type_annotation.clone(),
            defaults.access,
        )
    }

    fn bounds(&self, defaults: &ElementDefaults, at: Point) -> Bounds {
        Bounds::new(at, defaults.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    #[test]
    fn defaults_match_editor_behaviour() {
        let config = EditorConfig::default();
        assert_eq!(config.autosave_debounce(), Duration::from_millis(500));

        let class = config.new_class(Point::new(100.0, 100.0));
        assert_eq!(class.kind(), ElementKind::Class);
        assert_eq!(class.name(), "NewClass");
        assert_eq!(class.size(), Size::new(200.0, 300.0));
        assert_eq!(class.position(), Point::new(100.0, 100.0));

        let interface = config.new_interface(Point::new(0.0, 0.0));
        assert_eq!(interface.size(), Size::new(200.0, 200.0));

        let method = config.new_member(MemberKind::Method);
        assert_eq!(method.notation(), "+ newMethod(): string");
        assert_ne!(method.id(), config.new_member(MemberKind::Method).id());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = EditorConfig::from_json_str(
            r#"{"autosave_debounce_ms": 250, "class": {"name": "Entity", "width": 180, "height": 240}}"#,
        )
        .expect("config");

        assert_eq!(config.autosave_debounce_ms, 250);
        assert_eq!(config.class.name, "Entity");
        assert_eq!(config.save_attempts, 3);
        assert_eq!(config.interface, EditorConfig::default().interface);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EditorConfig::from_json_str(r#"{"save_attempts": 0}"#),
            Err(ConfigError::ZeroAttempts)
        ));
        assert!(matches!(
            EditorConfig::from_json_str(
                r#"{"interface": {"name": "I", "width": 200, "height": -1}}"#
            ),
            Err(ConfigError::InvalidSize { what: "interface", .. })
        ));
        assert!(matches!(
            EditorConfig::from_json_str(r#"{"debounce": 10}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
