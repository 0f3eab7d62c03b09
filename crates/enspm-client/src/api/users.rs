//! Users API.

use super::page_query;
use crate::client::EnspmClient;
use crate::error::Result;
use crate::request::Query;
use crate::types::{
    ChangePasswordRequest, CreateUserRequest, CreatedUser, MessageResponse, PageRequest,
    Paginated, PasswordResponse, ResetPasswordRequest, SocialLink, SocialLinkCreate,
    SocialLinkUpdate, ToggleStatusRequest, UpdateUserRequest, UserDetail, UserFilter,
    UserStatistics,
};

impl UserFilter {
    /// Encode as query pairs. Roles and statuses repeat their key.
    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push_opt("search", self.search.as_deref())
            .push_all("role_systeme", &self.roles)
            .push_all("statut_global", &self.statuses)
            .push_opt("est_actif", self.active);
        query
    }
}

/// Users API client.
pub struct UsersApi {
    client: EnspmClient,
}

impl UsersApi {
    pub(crate) fn new(client: EnspmClient) -> Self {
        Self { client }
    }

    /// List users matching a filter.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Paginated<UserDetail>> {
        let mut query = filter.to_query();
        page_query(&mut query, page);
        self.client.get_with_query("users/", query).await
    }

    /// Create an account with its profile (admin only).
    pub async fn create(&self, request: &CreateUserRequest) -> Result<CreatedUser> {
        self.client.post("users/", request).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> Result<UserDetail> {
        self.client.get(&format!("users/{}", id)).await
    }

    /// Get a user by profile slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<UserDetail> {
        self.client.get(&format!("users/slug/{}", slug)).await
    }

    /// Aggregate account counts (admin only).
    pub async fn statistics(&self) -> Result<UserStatistics> {
        self.client.get("users/statistics").await
    }

    /// Update a user.
    pub async fn update(&self, id: &str, request: &UpdateUserRequest) -> Result<UserDetail> {
        self.client.put(&format!("users/{}", id), request).await
    }

    /// Soft-delete a user.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("users/{}", id)).await
    }

    /// Restore a soft-deleted user.
    pub async fn restore(&self, id: &str) -> Result<UserDetail> {
        self.client
            .post(&format!("users/{}/restore", id), &serde_json::json!({}))
            .await
    }

    /// Activate or deactivate an account.
    pub async fn toggle_status(&self, id: &str, active: bool) -> Result<UserDetail> {
        let request = ToggleStatusRequest { est_actif: active };
        self.client
            .patch(&format!("users/{}/toggle-status", id), &request)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Social links
    // ─────────────────────────────────────────────────────────────────────────

    /// Active social links on a user's profile.
    pub async fn social_links(&self, id: &str) -> Result<Vec<SocialLink>> {
        self.client
            .get(&format!("users/{}/social-links", id))
            .await
    }

    /// Link a profile to a social network account.
    pub async fn add_social_link(
        &self,
        id: &str,
        network_id: &str,
        url: &str,
    ) -> Result<SocialLink> {
        let request = SocialLinkCreate {
            reseau_id: network_id.to_string(),
            url: url.to_string(),
        };
        self.client
            .post(&format!("users/{}/social-links", id), &request)
            .await
    }

    /// Change a link's URL or active flag.
    pub async fn update_social_link(
        &self,
        id: &str,
        link_id: &str,
        update: &SocialLinkUpdate,
    ) -> Result<SocialLink> {
        self.client
            .put(&format!("users/{}/social-links/{}", id, link_id), update)
            .await
    }

    /// Remove a social link.
    pub async fn delete_social_link(&self, id: &str, link_id: &str) -> Result<()> {
        self.client
            .delete(&format!("users/{}/social-links/{}", id, link_id))
            .await
    }

    /// Remove a user's profile photo.
    pub async fn delete_photo(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("users/{}/photo", id)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Passwords
    // ─────────────────────────────────────────────────────────────────────────

    /// Change a password, proving the old one.
    pub async fn change_password(
        &self,
        id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let request = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.client
            .post(&format!("users/{}/change-password", id), &request)
            .await
    }

    /// Reset a password (admin). The server generates one when `None`.
    pub async fn reset_password(
        &self,
        id: &str,
        new_password: Option<&str>,
    ) -> Result<PasswordResponse> {
        let request = ResetPasswordRequest {
            new_password: new_password.map(str::to_string),
        };
        self.client
            .post(&format!("users/{}/reset-password", id), &request)
            .await
    }
}
