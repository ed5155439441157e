//! Client configuration.

use std::time::Duration;

/// Production AwareDB endpoint.
pub const DEFAULT_HOST: &str = "https://aware-db.com";

/// Timeout for the username/password exchange.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for every database command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(180);

/// How the client proves its identity.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A token issued earlier by the login endpoint.
    Token(String),
    /// Exchanged for a token while connecting.
    Password { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Everything `AwareDb::connect` needs.
///
/// A token and a username/password pair may both be set; the token wins and
/// no login call is made. Empty strings count as missing.
#[derive(Clone)]
pub struct ClientConfig {
    pub database: String,
    pub host: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub login_timeout: Duration,
    pub command_timeout: Duration,
}

impl ClientConfig {
    /// Configuration for `database` on the production host, without
    /// credentials.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            host: DEFAULT_HOST.to_string(),
            token: None,
            username: None,
            password: None,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_password(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Point the client at another server. A trailing `/` is ignored.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Resolve the credentials to use, or `None` when neither a token nor a
    /// complete username/password pair is present.
    pub fn credentials(&self) -> Option<Credentials> {
        if let Some(token) = non_empty(&self.token) {
            return Some(Credentials::Token(token.to_string()));
        }
        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Some(Credentials::Password {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("database", &self.database)
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("login_timeout", &self.login_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
