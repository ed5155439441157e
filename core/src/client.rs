//! Authenticated session against one AwareDB database.
//!
//! # Design
//! `AwareDb` pairs a `RequestBuilder` with a `Transport` and the token
//! obtained while connecting. Every public operation builds its body with
//! `payload`, dispatches it through `request`, and converts the unwrapped
//! `data` into a typed result. Nothing in the session changes after
//! `connect` returns.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result};
use crate::loader;
use crate::payload::{self, Command};
use crate::request::RequestBuilder;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Calculation, Formula, LoadOptions, Query, Record};

/// Client bound to one database.
pub struct AwareDb<T: Transport = UreqTransport> {
    requests: RequestBuilder,
    token: String,
    transport: T,
}

impl AwareDb<UreqTransport> {
    /// Authenticate and verify the connection over HTTP.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> AwareDb<T> {
    /// Authenticate and verify the connection through `transport`.
    ///
    /// Logs in first when the configuration carries a username and password
    /// instead of a token, then runs the `check` command. Fails with
    /// `Error::Configuration` unless the server answers `{"connected": true}`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        if config.database.is_empty() {
            return Err(Error::Configuration("database name is required".to_string()));
        }
        let credentials = config.credentials().ok_or_else(|| {
            Error::Configuration("database token or username and password are required".to_string())
        })?;

        let requests = RequestBuilder::from_config(&config);
        let token = match credentials {
            Credentials::Token(token) => token,
            Credentials::Password { username, password } => {
                debug!(host = requests.host(), %username, "exchanging credentials for a token");
                let request = requests.build_login(&username, &password)?;
                requests.parse_login(transport.execute(request)?)?
            }
        };

        let client = Self {
            requests,
            token,
            transport,
        };
        client.check_connection()?;
        info!(host = client.host(), database = client.database(), "connected to AwareDB");
        Ok(client)
    }

    fn check_connection(&self) -> Result<()> {
        let data = match self.request(Command::Check, payload::empty()) {
            Ok(data) => data,
            Err(Error::InvalidRequest { status, body }) => {
                warn!(database = self.database(), status, "connection check rejected");
                return Err(Error::Configuration(format!(
                    "unable to connect to database (HTTP {status}): {body}"
                )));
            }
            Err(e) => return Err(e),
        };
        if data != json!({"connected": true}) {
            warn!(database = self.database(), response = %data, "connection check failed");
            return Err(Error::Configuration(format!(
                "unable to connect to database {}",
                self.database()
            )));
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        self.requests.host()
    }

    pub fn database(&self) -> &str {
        self.requests.database()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Run `command` with a prepared body and return the `data` it produced.
    pub fn request(&self, command: Command, body: String) -> Result<Value> {
        let request = self.requests.build_command(command, &self.token, body);
        let response = self.transport.execute(request)?;
        debug!(%command, status = response.status, "command dispatched");
        self.requests.parse_command(response)
    }

    // -- reads ---------------------------------------------------------------

    /// Value stored at `path`, optionally read from the given states.
    pub fn get<S: AsRef<str>>(&self, path: &str, states: &[S]) -> Result<Value> {
        self.request(Command::Get, payload::get(path, states)?)
    }

    /// Nodes matching `query`.
    pub fn query(&self, query: &Query) -> Result<Vec<Record>> {
        into_records(self.request(Command::Query, payload::query(query)?)?)
    }

    /// Evaluate one formula or a batch of them.
    ///
    /// `Formula::One` yields `Calculation::Single`; `Formula::Many` yields
    /// `Calculation::Multiple` with one value per formula.
    pub fn calculate<S: AsRef<str>>(
        &self,
        formula: impl Into<Formula>,
        states: &[S],
    ) -> Result<Calculation> {
        let formula = formula.into();
        let data = self.request(Command::Calculate, payload::calculate(&formula, states)?)?;
        match (formula, data) {
            (Formula::One(_), value) => Ok(Calculation::Single(value)),
            (Formula::Many(_), Value::Array(values)) => Ok(Calculation::Multiple(values)),
            (Formula::Many(_), other) => Err(Error::Deserialization(format!(
                "expected a list of results, got {other}"
            ))),
        }
    }

    /// Impact of `changes` (node path to proposed value) without persisting
    /// them.
    pub fn what_if<C, S>(&self, changes: &C, states: &[S]) -> Result<Value>
    where
        C: Serialize + ?Sized,
        S: AsRef<str>,
    {
        self.request(Command::WhatIf, payload::what_if(changes, states)?)
    }

    // -- writes --------------------------------------------------------------

    /// Create or update a record or a list of records.
    ///
    /// With `partial`, only the supplied fields of existing records change.
    pub fn update<D: Serialize + ?Sized>(&self, data: &D, partial: bool) -> Result<Vec<Record>> {
        into_records(self.request(Command::Update, payload::update(data, partial)?)?)
    }

    /// Delete the nodes, relations and relation types with the given ids.
    pub fn remove<S: AsRef<str>>(&self, ids: &[S]) -> Result<()> {
        self.request(Command::Remove, payload::remove(ids)?)?;
        Ok(())
    }

    /// Delete everything in the database. There is no undo.
    pub fn flush(&self) -> Result<()> {
        self.request(Command::Flush, payload::empty())?;
        Ok(())
    }

    // -- bulk load -----------------------------------------------------------

    /// Upload the records of a JSON file, or of every `.json` file in a
    /// folder, with a single non-partial `update`.
    ///
    /// A missing path fails before anything is sent. With `options.flush` the
    /// database is emptied before the files are read, so a broken file
    /// leaves it empty.
    pub fn load(&self, path: impl AsRef<Path>, options: LoadOptions) -> Result<Vec<Record>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        if options.flush {
            self.flush()?;
        }
        let records = loader::collect_records(path, options.recursive)?;
        info!(
            path = %path.display(),
            records = records.len(),
            recursive = options.recursive,
            flush = options.flush,
            "loading records"
        );
        self.update(&records, false)
    }
}

fn into_records(data: Value) -> Result<Vec<Record>> {
    match data {
        Value::Array(records) => Ok(records),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::Deserialization(format!(
            "expected a list of records, got {other}"
        ))),
    }
}
