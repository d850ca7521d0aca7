//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::{AuthResponse, SignInFormData, SignUpFormData, User};
use crate::error::Result;

/// Authentication operations for the OpenStock API
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// A well-formed `success: false` response is returned, not raised.
    async fn sign_in(&self, data: &SignInFormData) -> Result<AuthResponse>;

    /// Register a new account
    async fn sign_up(&self, data: &SignUpFormData) -> Result<AuthResponse>;

    /// Invalidate the current token on the backend
    async fn sign_out(&self) -> Result<()>;

    /// Fetch the profile of the token holder
    async fn current_user(&self) -> Result<User>;
}
