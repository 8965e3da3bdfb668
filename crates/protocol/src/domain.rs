use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Objects grouped by their declared type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeObjectMap(BTreeMap<String, Vec<String>>);

impl TypeObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one object of `type_name`. Duplicates are ignored.
    pub fn add(mut self, type_name: &str, object: &str) -> Self {
        self.insert(type_name, object);
        self
    }

    pub fn add_all<'a>(mut self, type_name: &str, objects: impl IntoIterator<Item = &'a str>) -> Self {
        for object in objects {
            self.insert(type_name, object);
        }
        self
    }

    fn insert(&mut self, type_name: &str, object: &str) {
        let objects = self.0.entry(type_name.to_string()).or_default();
        if !objects.iter().any(|o| o == object) {
            objects.push(object.to_string());
        }
    }

    /// Union of both maps; `self`'s objects come first within a type.
    pub fn merge(&self, other: &TypeObjectMap) -> TypeObjectMap {
        let mut merged = self.clone();
        for (type_name, objects) in &other.0 {
            for object in objects {
                merged.insert(type_name, object);
            }
        }
        merged
    }

    pub fn objects_of(&self, type_name: &str) -> Option<&[String]> {
        self.0.get(type_name).map(Vec::as_slice)
    }

    /// Objects of the type whose name matches `type_name` ignoring case.
    pub fn objects_of_case_insensitive(&self, type_name: &str) -> Option<&[String]> {
        self.objects_of(type_name).or_else(|| {
            self.0
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(type_name))
                .map(|(_, objects)| objects.as_slice())
        })
    }

    /// The type declaring `object` (compared ignoring case) and its objects.
    pub fn type_of(&self, object: &str) -> Option<(&str, &[String])> {
        self.0
            .iter()
            .find(|(_, objects)| objects.iter().any(|o| o.eq_ignore_ascii_case(object)))
            .map(|(name, objects)| (name.as_str(), objects.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A positional action parameter, e.g. `?loc-to - location`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// The parts of a planning domain the views need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainInfo {
    #[serde(default)]
    pub name: String,
    /// Declared types, in declaration order.
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub constants: TypeObjectMap,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

impl DomainInfo {
    /// Position of the action in the domain, compared ignoring case.
    pub fn action_index(&self, action_name: &str) -> Option<usize> {
        self.actions
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(action_name))
    }

    pub fn find_action(&self, action_name: &str) -> Option<&ActionDefinition> {
        self.action_index(action_name).map(|i| &self.actions[i])
    }
}

/// The parts of a planning problem the views need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain_name: String,
    #[serde(default)]
    pub objects: TypeObjectMap,
}
