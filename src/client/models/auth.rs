//! Authentication models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile record returned by the backend.
///
/// Only presence matters to the session layer; name and email are
/// lifted out for display and everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Best available human label for the user
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("unknown user")
    }
}

/// Credentials for `POST /api/auth/signin`
#[derive(Debug, Clone, Serialize)]
pub struct SignInFormData {
    pub email: String,
    pub password: String,
}

/// Registration form for `POST /api/auth/signup`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpFormData {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub country: String,
    pub investment_goals: String,
    pub risk_tolerance: String,
    pub preferred_industry: String,
}

/// Response body of sign-in and sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Token and user, when the response establishes a session
    pub fn credentials(&self) -> Option<(&str, &User)> {
        if !self.success {
            return None;
        }
        match (&self.token, &self.user) {
            (Some(token), Some(user)) if !token.is_empty() => Some((token.as_str(), user)),
            _ => None,
        }
    }
}
