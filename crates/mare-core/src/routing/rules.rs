//! The ordered rule table.
//!
//! Declared order is precedence: the first rule whose pattern matches wins,
//! regardless of match length or specificity. Reordering rules, or patterns
//! within a domain group, changes routing outcomes.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::routing::roles::{
    RoleName, BACKEND_DEVELOPER_REP, DEVOPS_ENGINEER_REP, PROTOCOL_DESIGNER_REP,
    SOFTWARE_ARCHITECT_REP, TEST_ENGINEER_REP,
};

/// Built-in rules, grouped by domain but evaluated as one flat list.
const STANDARD_RULES: &[(&str, &str)] = &[
    // Architecture and design
    (r"architecture|design|component|system", SOFTWARE_ARCHITECT_REP),
    (r"spec|diagram|interface", SOFTWARE_ARCHITECT_REP),
    // Implementation
    (r"implement|code|develop|build", BACKEND_DEVELOPER_REP),
    (r"router|runner|injector", BACKEND_DEVELOPER_REP),
    (r"mcp|integration", BACKEND_DEVELOPER_REP),
    // Protocol compliance
    (r"protocol|compliance|rfc|standard", PROTOCOL_DESIGNER_REP),
    (r"validate|specification|schema", PROTOCOL_DESIGNER_REP),
    // Testing and validation
    (r"test|demo|validation|proof", TEST_ENGINEER_REP),
    (r"scenario|metric|measure", TEST_ENGINEER_REP),
    // Deployment and operations
    (r"deploy|setup|run|demo.*ready", DEVOPS_ENGINEER_REP),
    (r"performance|monitoring|operational", DEVOPS_ENGINEER_REP),
];

/// A compiled (pattern, role) association.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    regex: Regex,
    role: RoleName,
}

impl Rule {
    /// Compile `pattern` case-insensitively. Fails on malformed patterns or a
    /// blank role.
    pub fn new(pattern: impl Into<String>, role: impl Into<RoleName>) -> Result<Self> {
        let pattern = pattern.into();
        let role = role.into();
        if role.as_str().trim().is_empty() {
            return Err(ConfigurationError::EmptyRole { pattern });
        }
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ConfigurationError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        Ok(Self {
            pattern,
            regex,
            role,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn role(&self) -> &RoleName {
        &self.role
    }

    /// Search semantics: the pattern may match anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Serialized form of a rule table (TOML rules file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTableSpec {
    #[serde(default = "default_role_name")]
    pub default_role: String,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub role: String,
}

fn default_role_name() -> String {
    SOFTWARE_ARCHITECT_REP.to_string()
}

/// An immutable, ordered list of rules plus the fallback role.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    default_role: RoleName,
}

impl RuleTable {
    /// Build a table from `(pattern, role)` pairs in precedence order.
    ///
    /// Every pattern is compiled here; the first malformed one is returned as
    /// [`ConfigurationError::InvalidPattern`].
    pub fn new<P, R>(
        rules: impl IntoIterator<Item = (P, R)>,
        default_role: impl Into<RoleName>,
    ) -> Result<Self>
    where
        P: Into<String>,
        R: Into<RoleName>,
    {
        let default_role = default_role.into();
        if default_role.as_str().trim().is_empty() {
            return Err(ConfigurationError::EmptyRole {
                pattern: "<default>".to_string(),
            });
        }
        let rules = rules
            .into_iter()
            .map(|(pattern, role)| Rule::new(pattern, role))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            default_role,
        })
    }

    /// The built-in table with `SOFTWARE_ARCHITECT_REP` as the default.
    pub fn standard() -> Self {
        let rules = STANDARD_RULES
            .iter()
            .map(|(pattern, role)| {
                Rule::new(*pattern, *role).expect("built-in rule patterns are valid regexes")
            })
            .collect();
        Self {
            rules,
            default_role: RoleName::default_role(),
        }
    }

    pub fn from_spec(spec: RuleTableSpec) -> Result<Self> {
        Self::new(
            spec.rules.into_iter().map(|r| (r.pattern, r.role)),
            spec.default_role,
        )
    }

    /// Parse a TOML rules document:
    ///
    /// ```toml
    /// default_role = "SOFTWARE_ARCHITECT_REP"
    ///
    /// [[rules]]
    /// pattern = "deploy|rollout"
    /// role = "DEVOPS_ENGINEER_REP"
    /// ```
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self> {
        let spec: RuleTableSpec =
            toml::from_str(source).map_err(|source| ConfigurationError::ParseToml {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::from_spec(spec)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| {
            ConfigurationError::ReadFile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&source, path)
    }

    /// Export the table in its serialized form.
    pub fn to_spec(&self) -> RuleTableSpec {
        RuleTableSpec {
            default_role: self.default_role.to_string(),
            rules: self
                .rules
                .iter()
                .map(|r| RuleSpec {
                    pattern: r.pattern.clone(),
                    role: r.role.to_string(),
                })
                .collect(),
        }
    }

    /// The first rule matching `normalized`, if any.
    pub fn first_match(&self, normalized: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.is_match(normalized))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_role(&self) -> &RoleName {
        &self.default_role
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}
