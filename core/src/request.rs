//! Stateless request builder and response parser for the AwareDB REST API.
//!
//! # Design
//! `RequestBuilder` holds the host, database and timeouts and nothing that
//! changes between calls. Each endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the `Transport` executes the round-trip in between.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorBody, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::payload::Command;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Deserialize)]
struct CommandResponse {
    #[serde(default)]
    data: Value,
}

/// Builds requests for one database and parses what comes back.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    host: String,
    database: String,
    login_timeout: Duration,
    command_timeout: Duration,
}

impl RequestBuilder {
    pub fn new(host: &str, database: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            database: database.to_string(),
            login_timeout: crate::config::DEFAULT_LOGIN_TIMEOUT,
            command_timeout: crate::config::DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            login_timeout: config.login_timeout,
            command_timeout: config.command_timeout,
            ..Self::new(&config.host, &config.database)
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// `POST /rest/auth/token/login/` exchanging a username and password for
    /// a token.
    pub fn build_login(&self, username: &str, password: &str) -> Result<HttpRequest> {
        let body = serde_json::to_string(&LoginRequest { username, password })
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            url: format!("{}/rest/auth/token/login/", self.host),
            headers: vec![json_content_type()],
            body,
            timeout: self.login_timeout,
        })
    }

    /// `POST /rest/db/<database>/<command>/` carrying a body built by `payload`.
    pub fn build_command(&self, command: Command, token: &str, body: String) -> HttpRequest {
        HttpRequest {
            url: self.command_url(command),
            headers: vec![
                ("authorization".to_string(), format!("Token {token}")),
                json_content_type(),
            ],
            body,
            timeout: self.command_timeout,
        }
    }

    pub fn command_url(&self, command: Command) -> String {
        format!("{}/rest/db/{}/{}/", self.host, self.database, command)
    }

    /// Extract the token from a login response.
    pub fn parse_login(&self, response: HttpResponse) -> Result<String> {
        if response.status != 200 {
            return Err(Error::Configuration(format!(
                "login rejected (HTTP {}): {}",
                response.status, response.body
            )));
        }
        let login: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        login
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Configuration("login response did not include a token".to_string()))
    }

    /// Unwrap the `data` field of a command response.
    ///
    /// A missing `data` field yields `Value::Null`.
    pub fn parse_command(&self, response: HttpResponse) -> Result<Value> {
        check_status(&response)?;
        let parsed: CommandResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        Ok(parsed.data)
    }
}

fn json_content_type() -> (String, String) {
    ("content-type".to_string(), "application/json".to_string())
}

/// Map non-200 status codes to `Error::InvalidRequest`.
fn check_status(response: &HttpResponse) -> Result<()> {
    match response.status {
        200 => Ok(()),
        400 => {
            let body = serde_json::from_str(&response.body)
                .map(ErrorBody::Json)
                .unwrap_or_else(|_| ErrorBody::Raw(response.body.clone()));
            Err(Error::InvalidRequest { status: 400, body })
        }
        status => Err(Error::InvalidRequest {
            status,
            body: ErrorBody::Raw(response.body.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("http://localhost:3000", "inventory")
    }

    #[test]
    fn build_login_produces_correct_request() {
        let req = builder().build_login("alice", "secret").unwrap();
        assert_eq!(req.url, "http://localhost:3000/rest/auth/token/login/");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.header("authorization").is_none());
        assert_eq!(req.timeout, Duration::from_secs(30));
        let body: Value = serde_json::from_str(&req.body).unwrap();
        assert_eq!(body, json!({"username": "alice", "password": "secret"}));
    }

    #[test]
    fn build_command_produces_correct_request() {
        let req = builder().build_command(Command::WhatIf, "abc123", "{}".to_string());
        assert_eq!(req.url, "http://localhost:3000/rest/db/inventory/what-if/");
        assert_eq!(req.header("Authorization"), Some("Token abc123"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body, "{}");
        assert_eq!(req.timeout, Duration::from_secs(180));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let builder = RequestBuilder::new("http://localhost:3000/", "db");
        assert_eq!(builder.command_url(Command::Check), "http://localhost:3000/rest/db/db/check/");
    }

    #[test]
    fn timeouts_come_from_config() {
        let config = ClientConfig::new("db")
            .with_host("http://example.test")
            .with_login_timeout(Duration::from_secs(5))
            .with_command_timeout(Duration::from_secs(7));
        let builder = RequestBuilder::from_config(&config);
        assert_eq!(builder.build_login("u", "p").unwrap().timeout, Duration::from_secs(5));
        assert_eq!(
            builder.build_command(Command::Flush, "t", "{}".to_string()).timeout,
            Duration::from_secs(7)
        );
        assert_eq!(builder.host(), "http://example.test");
        assert_eq!(builder.database(), "db");
    }

    #[test]
    fn parse_login_success() {
        let token = builder()
            .parse_login(HttpResponse::new(200, r#"{"token":"abc"}"#))
            .unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn parse_login_without_token_is_configuration_error() {
        let err = builder()
            .parse_login(HttpResponse::new(200, r#"{"non_field_errors":["nope"]}"#))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn parse_login_rejected_is_configuration_error() {
        let err = builder()
            .parse_login(HttpResponse::new(400, r#"{"detail":"bad credentials"}"#))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn parse_command_unwraps_data() {
        let data = builder()
            .parse_command(HttpResponse::new(200, r#"{"data":{"connected":true}}"#))
            .unwrap();
        assert_eq!(data, json!({"connected": true}));
    }

    #[test]
    fn parse_command_missing_data_is_null() {
        let data = builder().parse_command(HttpResponse::new(200, "{}")).unwrap();
        assert_eq!(data, Value::Null);
    }

    #[test]
    fn parse_command_bad_request_keeps_parsed_body() {
        let err = builder()
            .parse_command(HttpResponse::new(400, r#"{"error":"unknown node"}"#))
            .unwrap_err();
        match err {
            Error::InvalidRequest { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, ErrorBody::Json(json!({"error": "unknown node"})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_command_bad_request_without_json_keeps_raw_body() {
        let err = builder()
            .parse_command(HttpResponse::new(400, "Bad Request"))
            .unwrap_err();
        match err {
            Error::InvalidRequest { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, ErrorBody::Raw("Bad Request".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_command_other_status_keeps_raw_body() {
        let err = builder()
            .parse_command(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        match err {
            Error::InvalidRequest { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, ErrorBody::Raw("internal error".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_command_bad_json() {
        let err = builder()
            .parse_command(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
