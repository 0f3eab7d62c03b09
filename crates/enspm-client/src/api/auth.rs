//! Authentication API.
//!
//! Login and logout are the only places besides the refresh protocol that
//! write the session store.

use crate::client::EnspmClient;
use crate::error::Result;
use crate::types::{EmailRequest, LoginRequest, LoginResponse, UserDetail};

/// Authentication API client.
pub struct AuthApi {
    client: EnspmClient,
}

impl AuthApi {
    pub(crate) fn new(client: EnspmClient) -> Self {
        Self { client }
    }

    /// Sign in with email and password.
    ///
    /// Stores the issued tokens, then fetches the full user record so the
    /// session carries a display snapshot. A failure of that second call is
    /// logged and does not fail the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.client.post("auth/login", &request).await?;

        self.client
            .session_store()
            .set_auth(
                None,
                response.access_token.clone(),
                response.refresh_token.clone(),
            )
            .await?;
        tracing::info!(user = %response.user.email, "Signed in");

        if let Err(e) = self.me().await {
            tracing::warn!(error = %e, "Signed in but could not load user profile");
        }

        Ok(response)
    }

    /// Sign out.
    ///
    /// The local session is cleared whatever the server answers. A 401 from
    /// the server means the tokens were already dead and is not an error.
    pub async fn logout(&self) -> Result<()> {
        let remote = self
            .client
            .post_no_content::<()>("auth/logout", None)
            .await;

        self.client.session_store().clear().await?;
        tracing::info!("Signed out");

        match remote {
            Err(e) if e.is_auth_error() => Ok(()),
            other => other,
        }
    }

    /// Fetch the signed-in user and refresh the stored snapshot.
    pub async fn me(&self) -> Result<UserDetail> {
        let user: UserDetail = self.client.get("auth/me").await?;
        self.client.session_store().set_user(user.clone()).await?;
        Ok(user)
    }

    /// Ask the server to email a temporary password.
    ///
    /// The server answers 204 whether or not the address is known.
    pub async fn recover_password(&self, email: &str) -> Result<()> {
        let request = EmailRequest {
            email: email.to_string(),
        };
        self.client
            .post_no_content("auth/recover-password", Some(&request))
            .await
    }
}
