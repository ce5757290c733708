//! Property resolution: mapping filter property names onto storage columns
//!
//! The translator only depends on the [`PropertyResolver`] trait. The
//! [`PropertyRegistry`] here is a table-driven implementation that can be
//! loaded from YAML, which is enough for catalogues with a fixed schema and
//! for tests.

use geofilter_ir::{split_qualified_name, DataType, NamespaceContext};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Ambiguous binding for property {property}: {candidates:?}")]
    AmbiguousBinding {
        property: String,
        candidates: Vec<String>,
    },

    #[error("Namespace prefix '{prefix}' of property {property} is not bound")]
    UnboundPrefix { prefix: String, property: String },
}

#[derive(Debug, Error)]
pub enum RegistryLoadError {
    #[error("Failed to read property file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Column a property reference resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProperty {
    /// SQL expression reading the column, e.g. `buildings.geom`
    pub expression: String,
    pub table: String,
    pub column: String,
}

/// Maps a property reference onto a storage column.
///
/// Implementations are shared across concurrent translations and must only
/// need read access.
pub trait PropertyResolver: Send + Sync {
    fn resolve(
        &self,
        name: &str,
        namespace_context: &NamespaceContext,
        declared_type: DataType,
    ) -> Result<ResolvedProperty, ResolverError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBinding {
    pub name: String,

    /// Namespace URI the property lives in; `None` matches any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub table: String,
    pub column: String,

    /// Overrides the generated column expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Declared types this binding answers for; empty means any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<DataType>,
}

impl PropertyBinding {
    pub fn new(name: impl Into<String>, table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            table: table.into(),
            column: column.into(),
            expression: None,
            types: Vec::new(),
        }
    }

    pub fn in_namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespace = Some(uri.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_types(mut self, types: Vec<DataType>) -> Self {
        self.types = types;
        self
    }

    fn accepts(&self, namespace: Option<&str>, declared_type: DataType) -> bool {
        let namespace_ok = match (namespace, self.namespace.as_deref()) {
            (Some(wanted), Some(bound)) => wanted == bound,
            _ => true,
        };
        let type_ok = self.types.is_empty()
            || declared_type == DataType::Unknown
            || self.types.contains(&declared_type);
        namespace_ok && type_ok
    }

    fn qualified_column(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }

    fn expression_for(&self, declared_type: DataType) -> String {
        if let Some(expression) = &self.expression {
            return expression.clone();
        }
        match declared_type {
            DataType::Envelope => format!("Box2D({})", self.qualified_column()),
            _ => self.qualified_column(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    properties: Vec<PropertyBinding>,
}

/// In-memory property → column bindings
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    bindings: HashMap<String, Vec<PropertyBinding>>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, binding: PropertyBinding) {
        self.bindings
            .entry(binding.name.clone())
            .or_default()
            .push(binding);
    }

    pub fn with_binding(mut self, binding: PropertyBinding) -> Self {
        self.register(binding);
        self
    }

    /// Parse bindings from a YAML document with a top-level `properties` list
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryLoadError> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;
        let mut registry = Self::new();
        for binding in file.properties {
            registry.register(binding);
        }
        Ok(registry)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RegistryLoadError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let registry = Self::from_yaml_str(&contents)?;
        debug!(
            path = %path.as_ref().display(),
            bindings = registry.len(),
            "Loaded property registry"
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl PropertyResolver for PropertyRegistry {
    fn resolve(
        &self,
        name: &str,
        namespace_context: &NamespaceContext,
        declared_type: DataType,
    ) -> Result<ResolvedProperty, ResolverError> {
        let (prefix, local) = split_qualified_name(name);
        let namespace = match prefix {
            Some(prefix) => {
                let uri = namespace_context
                    .get(prefix)
                    .ok_or_else(|| ResolverError::UnboundPrefix {
                        prefix: prefix.to_string(),
                        property: name.to_string(),
                    })?;
                Some(uri.as_str())
            }
            None => None,
        };

        let overloads = self
            .bindings
            .get(local)
            .ok_or_else(|| ResolverError::UnknownProperty(name.to_string()))?;

        let candidates: Vec<&PropertyBinding> = overloads
            .iter()
            .filter(|binding| binding.accepts(namespace, declared_type))
            .collect();

        match candidates.as_slice() {
            [] => Err(ResolverError::UnknownProperty(name.to_string())),
            [binding] => Ok(ResolvedProperty {
                expression: binding.expression_for(declared_type),
                table: binding.table.clone(),
                column: binding.column.clone(),
            }),
            many => Err(ResolverError::AmbiguousBinding {
                property: name.to_string(),
                candidates: many.iter().map(|b| b.qualified_column()).collect(),
            }),
        }
    }
}
