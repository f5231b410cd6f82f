//! # credentials
//!
//! Connection parameters supplied to every share browser call

/// Host and credentials used to reach a SMB server.
///
/// Values are never cached by the browser: they are supplied again on every call.
#[derive(Debug, Default, Clone)]
pub struct Credentials {
    pub(crate) host: String,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
}

impl Credentials {
    pub fn new<S: AsRef<str>>(host: S) -> Self {
        Self {
            host: host.as_ref().to_string(),
            ..Default::default()
        }
    }

    /// Construct Credentials with the provided username
    pub fn username<S: AsRef<str>>(mut self, username: S) -> Self {
        self.username = Some(username.as_ref().to_string());
        self
    }

    /// Construct Credentials with the provided password. An empty password is allowed.
    pub fn password<S: AsRef<str>>(mut self, password: S) -> Self {
        self.password = Some(password.as_ref().to_string());
        self
    }

    /// Get the host address
    pub fn host(&self) -> &str {
        &self.host
    }
}
