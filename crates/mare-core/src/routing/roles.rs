//! Role vocabulary and the role catalog loader.
//!
//! A [`RoleCatalog`] is an explicit, immutable object built once from a
//! directory of `*_rep.json` files and then passed to whoever needs role
//! metadata. The classifier never consults it.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::obs;

pub const SOFTWARE_ARCHITECT_REP: &str = "SOFTWARE_ARCHITECT_REP";
pub const BACKEND_DEVELOPER_REP: &str = "BACKEND_DEVELOPER_REP";
pub const PROTOCOL_DESIGNER_REP: &str = "PROTOCOL_DESIGNER_REP";
pub const TEST_ENGINEER_REP: &str = "TEST_ENGINEER_REP";
pub const DEVOPS_ENGINEER_REP: &str = "DEVOPS_ENGINEER_REP";

/// File-name suffix identifying role definition files.
pub const DEFAULT_REP_FILE_SUFFIX: &str = "_rep.json";

/// Name of a role (REP) a task can be routed to.
///
/// Rules may name roles that no catalog defines; nothing checks this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The generalist role broad or undecidable tasks fall back to.
    pub fn default_role() -> Self {
        Self::new(SOFTWARE_ARCHITECT_REP)
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RoleName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RoleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RoleName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RoleName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A role definition loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: RoleName,
    /// Ordered expertise tags, e.g. technologies the role is fluent in.
    pub expertise_tags: Vec<String>,
    /// Short description of the persona the role embodies.
    pub archetype: String,
    /// File the definition was read from; `None` for in-memory definitions.
    pub source: Option<PathBuf>,
}

impl RoleDefinition {
    pub fn new(
        name: impl Into<RoleName>,
        archetype: impl Into<String>,
        expertise_tags: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            expertise_tags,
            archetype: archetype.into(),
            source: None,
        }
    }
}

/// On-disk shape of a `*_rep.json` file. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RoleFile {
    name: Option<String>,
    archetype: Option<String>,
    expertise_tags: Option<Vec<String>>,
    #[serde(default)]
    domain_expertise: serde_json::Value,
}

impl RoleFile {
    /// Explicit `expertise_tags` win; otherwise fall back to
    /// `domain_expertise.technologies`.
    fn tags(&self) -> Vec<String> {
        if let Some(tags) = &self.expertise_tags {
            return tags.clone();
        }
        self.domain_expertise
            .get("technologies")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Immutable mapping from role name to definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCatalog {
    roles: BTreeMap<RoleName, RoleDefinition>,
}

impl RoleCatalog {
    /// Load every `*_rep.json` file in `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_suffix(dir, DEFAULT_REP_FILE_SUFFIX)
    }

    /// Load every file in `dir` whose name ends with `suffix`.
    ///
    /// A missing directory yields an empty catalog. Files are read in
    /// lexicographic order; when two files declare the same name the later
    /// one replaces the earlier.
    pub fn load_with_suffix(dir: impl AsRef<Path>, suffix: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "role directory not found, using empty catalog");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigurationError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigurationError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix));
            if matches && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::default();
        for path in paths {
            let definition = parse_role_file(&path)?;
            catalog.insert(definition);
        }

        obs::emit_catalog_loaded(dir, catalog.len());
        Ok(catalog)
    }

    /// Build a catalog from definitions already in memory. Last one wins on
    /// duplicate names, as with [`RoleCatalog::load`].
    pub fn from_definitions(definitions: impl IntoIterator<Item = RoleDefinition>) -> Self {
        let mut catalog = Self::default();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    fn insert(&mut self, definition: RoleDefinition) {
        let name = definition.name.clone();
        if let Some(previous) = self.roles.insert(name.clone(), definition) {
            obs::emit_duplicate_role(name.as_str(), previous.source.as_deref());
        }
    }

    pub fn get(&self, name: &str) -> Option<&RoleDefinition> {
        self.roles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Role names in sorted order.
    pub fn names(&self) -> Vec<&RoleName> {
        self.roles.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.values()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

fn parse_role_file(path: &Path) -> Result<RoleDefinition> {
    let bytes = fs::read(path).map_err(|source| ConfigurationError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RoleFile =
        serde_json::from_slice(&bytes).map_err(|source| ConfigurationError::ParseRoleFile {
            path: path.to_path_buf(),
            source,
        })?;

    let tags = file.tags();
    let name = required(file.name, path, "name")?;
    let archetype = required(file.archetype, path, "archetype")?;

    Ok(RoleDefinition {
        name: RoleName::new(name),
        expertise_tags: tags,
        archetype,
        source: Some(path.to_path_buf()),
    })
}

fn required(value: Option<String>, path: &Path, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigurationError::MissingField {
            path: path.to_path_buf(),
            field,
        }),
    }
}
