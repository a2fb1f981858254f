//! Authentication payloads.

use serde::{Deserialize, Serialize};

/// Login credentials, serialized as `{"username":…,"password":…}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The JSON payload sent to the login endpoint.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Template of the activation email the server sends after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activation {
    /// Activation link opens the Android app.
    AppAndroid,
    /// Activation link opens the iOS app.
    AppIos,
    /// Activation link opens the web application.
    Web,
}

/// A new account request, serialized as
/// `{"email":…,"password":…,"captcha":…,"template":…,"group":…}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub captcha: String,
    pub template: Activation,
    pub group: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        captcha: impl Into<String>,
        template: Activation,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            captcha: captcha.into(),
            template,
            group: String::new(),
        }
    }

    /// Sets the user group the new account joins.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// The JSON payload sent to the registration endpoint.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"***")
            .field("template", &self.template)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}
