//! Database commands and their request bodies.
//!
//! Every builder here is pure: it turns typed arguments into the JSON body
//! posted to `/rest/db/<database>/<command>/`. Bodies are serialized straight
//! from the structs below, so field order is the key order on the wire.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{Formula, Query};

/// Commands understood by the `/rest/db/<database>/` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Check,
    Get,
    Query,
    Calculate,
    WhatIf,
    Update,
    Remove,
    Flush,
}

impl Command {
    /// Path segment of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Check => "check",
            Command::Get => "get",
            Command::Query => "query",
            Command::Calculate => "calculate",
            Command::WhatIf => "what-if",
            Command::Update => "update",
            Command::Remove => "remove",
            Command::Flush => "flush",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct GetPayload<'a, S: AsRef<str>> {
    path: &'a str,
    #[serde(serialize_with = "serialize_strs")]
    states: &'a [S],
}

#[derive(Serialize)]
struct CalculatePayload<'a, S: AsRef<str>> {
    formula: &'a Formula,
    #[serde(serialize_with = "serialize_strs")]
    states: &'a [S],
}

#[derive(Serialize)]
struct WhatIfPayload<'a, C: ?Sized, S: AsRef<str>> {
    changes: &'a C,
    #[serde(serialize_with = "serialize_strs")]
    states: &'a [S],
}

#[derive(Serialize)]
struct UpdatePayload<'a, D: ?Sized> {
    data: &'a D,
    partial: bool,
}

#[derive(Serialize)]
struct RemovePayload<'a, S: AsRef<str>> {
    #[serde(serialize_with = "serialize_strs")]
    ids: &'a [S],
}

fn serialize_strs<S, T>(items: &&[T], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: AsRef<str>,
{
    serializer.collect_seq(items.iter().map(AsRef::as_ref))
}

fn to_body<T: Serialize>(payload: T) -> Result<String> {
    serde_json::to_string(&payload).map_err(|e| Error::Serialization(e.to_string()))
}

/// Empty body shared by `check` and `flush`.
pub fn empty() -> String {
    "{}".to_string()
}

pub fn get<S: AsRef<str>>(path: &str, states: &[S]) -> Result<String> {
    to_body(GetPayload { path, states })
}

pub fn query(query: &Query) -> Result<String> {
    to_body(query)
}

pub fn calculate<S: AsRef<str>>(formula: &Formula, states: &[S]) -> Result<String> {
    to_body(CalculatePayload { formula, states })
}

/// `changes` maps node paths to proposed values.
pub fn what_if<C, S>(changes: &C, states: &[S]) -> Result<String>
where
    C: Serialize + ?Sized,
    S: AsRef<str>,
{
    to_body(WhatIfPayload { changes, states })
}

/// `data` is a single record or a list of records.
pub fn update<D: Serialize + ?Sized>(data: &D, partial: bool) -> Result<String> {
    to_body(UpdatePayload { data, partial })
}

pub fn remove<S: AsRef<str>>(ids: &[S]) -> Result<String> {
    to_body(RemovePayload { ids })
}
