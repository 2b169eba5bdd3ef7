//! Entity class definitions and the class registry.
//!
//! Definition data arrives already parsed (the server reads it from JSON)
//! as named classes with an optional base class and an ordered list of
//! component configurations. The registry resolves base chains once and
//! caches the flattened result, so `create` never re-walks the chain.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or resolving definition data.
///
/// All of these are fatal at startup: the server aborts rather than run
/// with partial definitions.
#[derive(Debug, thiserror::Error)]
pub enum DefError {
    /// A class name was not registered.
    #[error("unknown entity class `{0}`")]
    UnknownClass(String),

    /// A component type name has no registered factory.
    #[error("unknown component type `{0}`")]
    UnknownComponent(String),

    /// A class names a base class that is not registered.
    #[error("class `{0}` names missing base class `{1}`")]
    MissingBase(String, String),

    /// A class's base chain loops back on itself.
    #[error("class `{0}` has a cyclic base chain")]
    CyclicBase(String),

    /// A definition property has the wrong shape.
    #[error("property `{key}` must be {expected}")]
    BadProperty {
        /// The offending key.
        key: String,
        /// What the component expected to find there.
        expected: &'static str,
    },
}

/// A bag of named definition properties.
///
/// Components read their recognised keys with the typed getters and ignore
/// everything else. A present key with the wrong shape is a
/// [`DefError::BadProperty`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropBag(pub serde_json::Map<String, serde_json::Value>);

impl PropBag {
    /// Look up an integer property.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, DefError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| DefError::BadProperty {
                key: key.to_string(),
                expected: "an integer",
            }),
        }
    }

    /// Look up a string property.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, DefError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(v) => v.as_str().map(Some).ok_or_else(|| DefError::BadProperty {
                key: key.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Look up a single-character property.
    pub fn get_char(&self, key: &str) -> Result<Option<char>, DefError> {
        match self.get_str(key)? {
            None => Ok(None),
            Some(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Some(c)),
                    _ => Err(DefError::BadProperty {
                        key: key.to_string(),
                        expected: "a single character",
                    }),
                }
            }
        }
    }
}

/// One component entry of a class definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDef {
    /// The component type name, resolved against the world's component
    /// factories.
    #[serde(rename = "type")]
    pub kind: String,
    /// Configuration for the component.
    #[serde(default)]
    pub props: PropBag,
}

/// A named, constructible entity class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    /// The class name, e.g. `"rat"`.
    pub name: String,
    /// Optional base class. Creating an instance first applies the base
    /// chain's components, base-most first.
    #[serde(default)]
    pub base: Option<String>,
    /// Components this class adds or overrides, in order.
    #[serde(default)]
    pub components: Vec<ComponentDef>,
}

/// Registry of all entity classes known to the world.
///
/// Populated during the load-definitions phase, before the simulation loop
/// starts. Registering a name again overwrites the previous definition.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDef>,
    /// Cached base-first name chains, cleared on any registration.
    chains: HashMap<String, Vec<String>>,
}

impl ClassRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. Last write wins.
    pub fn register(&mut self, def: ClassDef) {
        self.chains.clear();
        self.classes.insert(def.name.clone(), def);
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no classes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate over the registered class names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Resolve a class into its definition chain, base-most first.
    pub fn resolve(&mut self, name: &str) -> Result<Vec<ClassDef>, DefError> {
        let chain = self.chain(name)?;
        Ok(chain
            .iter()
            .map(|n| self.classes[n].clone())
            .collect())
    }

    /// The union of component type names declared along a class's chain,
    /// base-most first, without duplicates.
    pub fn component_types(&mut self, name: &str) -> Result<Vec<String>, DefError> {
        let mut types = Vec::new();
        for def in self.resolve(name)? {
            for comp in &def.components {
                if !types.contains(&comp.kind) {
                    types.push(comp.kind.clone());
                }
            }
        }
        Ok(types)
    }

    fn chain(&mut self, name: &str) -> Result<Vec<String>, DefError> {
        if let Some(chain) = self.chains.get(name) {
            return Ok(chain.clone());
        }
        let mut chain = Vec::new();
        let mut current = name.to_string();
        loop {
            if chain.contains(&current) {
                return Err(DefError::CyclicBase(name.to_string()));
            }
            let def = self.classes.get(&current).ok_or_else(|| {
                if current == name {
                    DefError::UnknownClass(current.clone())
                } else {
                    DefError::MissingBase(chain.last().unwrap().clone(), current.clone())
                }
            })?;
            chain.push(current.clone());
            match &def.base {
                Some(base) => current = base.clone(),
                None => break,
            }
        }
        chain.reverse();
        self.chains.insert(name.to_string(), chain.clone());
        Ok(chain)
    }
}
