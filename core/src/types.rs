//! Domain types exchanged with AwareDB.
//!
//! # Design
//! Nodes, relations and relation types are schema-free on the server, so a
//! `Record` is an arbitrary JSON value. Only the request shapes that carry
//! client-side defaults or shape rules get dedicated types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node, relation or relation type as stored by the server.
pub type Record = Value;

/// Filters for `AwareDb::query`.
///
/// `Query::default()` fetches every non-abstract node with all properties
/// from the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    /// Ids, uids or names of the nodes to fetch; `*` means all.
    pub nodes: Vec<String>,
    pub conditions: Vec<String>,
    /// Properties to return; empty means all.
    pub properties: Vec<String>,
    pub states: Vec<String>,
    pub show_abstract: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            nodes: vec!["*".to_string()],
            conditions: Vec::new(),
            properties: Vec::new(),
            states: Vec::new(),
            show_abstract: false,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the query to specific nodes. An empty list keeps the
    /// wildcard.
    pub fn nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes: Vec<String> = nodes.into_iter().map(Into::into).collect();
        if !nodes.is_empty() {
            self.nodes = nodes;
        }
        self
    }

    pub fn conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn show_abstract(mut self, show: bool) -> Self {
        self.show_abstract = show;
        self
    }
}

/// One formula or a batch of formulas for `AwareDb::calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Formula {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Formula {
    fn from(formula: &str) -> Self {
        Formula::One(formula.to_string())
    }
}

impl From<String> for Formula {
    fn from(formula: String) -> Self {
        Formula::One(formula)
    }
}

impl From<Vec<String>> for Formula {
    fn from(formulas: Vec<String>) -> Self {
        Formula::Many(formulas)
    }
}

impl From<Vec<&str>> for Formula {
    fn from(formulas: Vec<&str>) -> Self {
        Formula::Many(formulas.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Formula {
    fn from(formulas: [&str; N]) -> Self {
        Formula::Many(formulas.into_iter().map(str::to_string).collect())
    }
}

/// Result of `AwareDb::calculate`; mirrors the shape of the `Formula`.
#[derive(Debug, Clone, PartialEq)]
pub enum Calculation {
    Single(Value),
    Multiple(Vec<Value>),
}

impl Calculation {
    pub fn into_single(self) -> Option<Value> {
        match self {
            Calculation::Single(value) => Some(value),
            Calculation::Multiple(_) => None,
        }
    }

    pub fn into_multiple(self) -> Option<Vec<Value>> {
        match self {
            Calculation::Single(_) => None,
            Calculation::Multiple(values) => Some(values),
        }
    }
}

/// Options for `AwareDb::load`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Descend into sub-directories.
    pub recursive: bool,
    /// Empty the database before uploading.
    pub flush: bool,
}
