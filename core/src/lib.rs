//! Blocking client for the AwareDB REST API.
//!
//! # Overview
//! `AwareDb` authenticates against one database (token, or username and
//! password exchanged for a token), verifies the connection, and exposes the
//! database commands as methods: `get`, `query`, `calculate`, `what_if`,
//! `update`, `remove`, `flush`, plus `load` for bulk-uploading JSON files.
//!
//! ```no_run
//! use awaredb::{AwareDb, ClientConfig, Query};
//!
//! # fn main() -> awaredb::Result<()> {
//! let db = AwareDb::connect(ClientConfig::new("inventory").with_token("my-token"))?;
//! let cars = db.query(&Query::new().nodes(["car"]))?;
//! let weight = db.get("car.weight", &["draft"])?;
//! # let _ = (cars, weight);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `payload` and `RequestBuilder` are pure: typed arguments in, plain-data
//!   `HttpRequest` out, `HttpResponse` in, typed result out.
//! - `Transport` performs the network round-trip, so the pure half is tested
//!   without I/O and the session is tested with scripted transports.
//! - No retries and no pooling: every failure is returned to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod loader;
pub mod payload;
pub mod request;
pub mod transport;
pub mod types;

pub use client::AwareDb;
pub use config::{ClientConfig, Credentials, DEFAULT_HOST};
pub use error::{Error, ErrorBody, Result};
pub use http::{HttpRequest, HttpResponse};
pub use payload::Command;
pub use request::RequestBuilder;
pub use transport::{Transport, UreqTransport};
pub use types::{Calculation, Formula, LoadOptions, Query, Record};
