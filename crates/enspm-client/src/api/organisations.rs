//! Organisations API.

use super::{limit_offset_query, page_query};
use crate::client::EnspmClient;
use crate::error::Result;
use crate::request::Query;
use crate::types::{
    AddMemberRequest, Member, Organisation, OrganisationFilter, OrganisationInput, PageBody,
    PageRequest, Paginated, Profile, StatusUpdateRequest, Subscription,
};

impl OrganisationFilter {
    /// Encode as query pairs.
    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push_opt("search", self.search.as_deref())
            .push_opt("type_organisation", self.type_organisation.as_deref())
            .push_opt("secteur_activite", self.secteur_activite.as_deref())
            .push_opt("ville", self.ville.as_deref())
            .push_opt("pays", self.pays.as_deref());
        query
    }
}

/// Organisations API client.
pub struct OrganisationsApi {
    client: EnspmClient,
}

impl OrganisationsApi {
    pub(crate) fn new(client: EnspmClient) -> Self {
        Self { client }
    }

    /// List active organisations.
    ///
    /// The page is sent both as `page`/`page_size` and as `limit`/`offset`,
    /// and either body shape is accepted.
    pub async fn list(
        &self,
        filter: &OrganisationFilter,
        page: PageRequest,
    ) -> Result<Paginated<Organisation>> {
        let mut query = filter.to_query();
        page_query(&mut query, page);
        limit_offset_query(&mut query, page);
        let body: PageBody<Organisation> =
            self.client.get_with_query("organisations/", query).await?;
        Ok(body.into_page(page))
    }

    /// List organisations awaiting moderation (admin only).
    pub async fn pending(&self) -> Result<Vec<Organisation>> {
        self.client.get("organisations/pending").await
    }

    /// Get an organisation by ID.
    pub async fn get(&self, id: &str) -> Result<Organisation> {
        self.client.get(&format!("organisations/{}", id)).await
    }

    /// Create an organisation. It starts in the pending state.
    pub async fn create(&self, input: &OrganisationInput) -> Result<Organisation> {
        self.client.post("organisations/", input).await
    }

    /// Replace an organisation's details.
    pub async fn update(&self, id: &str, input: &OrganisationInput) -> Result<Organisation> {
        self.client.put(&format!("organisations/{}", id), input).await
    }

    /// Moderate an organisation (`active`, `inactive`, `en_attente`).
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Organisation> {
        let request = StatusUpdateRequest {
            statut: status.to_string(),
        };
        self.client
            .patch(&format!("organisations/{}/status", id), &request)
            .await
    }

    /// Delete an organisation.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("organisations/{}", id)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Members
    // ─────────────────────────────────────────────────────────────────────────

    /// List an organisation's members.
    pub async fn members(&self, id: &str) -> Result<Vec<Member>> {
        self.client
            .get(&format!("organisations/{}/members", id))
            .await
    }

    /// Add a member.
    pub async fn add_member(&self, id: &str, request: &AddMemberRequest) -> Result<Member> {
        self.client
            .post(&format!("organisations/{}/members", id), request)
            .await
    }

    /// Remove a member by profile ID.
    pub async fn remove_member(&self, id: &str, profile_id: &str) -> Result<()> {
        self.client
            .delete(&format!("organisations/{}/members/{}", id, profile_id))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Subscriptions
    // ─────────────────────────────────────────────────────────────────────────

    /// Follow an organisation as the signed-in user.
    pub async fn follow(&self, id: &str) -> Result<Subscription> {
        self.client
            .post(&format!("organisations/{}/follow", id), &serde_json::json!({}))
            .await
    }

    /// Stop following an organisation.
    pub async fn unfollow(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("organisations/{}/follow", id))
            .await
    }

    /// Profiles following an organisation.
    pub async fn followers(&self, id: &str) -> Result<Vec<Profile>> {
        self.client
            .get(&format!("organisations/{}/followers", id))
            .await
    }

    /// Organisations the signed-in user follows.
    pub async fn following(&self) -> Result<Vec<Organisation>> {
        self.client.get("organisations/following/me").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organisation_filter_skips_unset_fields() {
        let filter = OrganisationFilter {
            search: Some("tech".to_string()),
            ville: Some("Maroua".to_string()),
            ..Default::default()
        };

        let query = filter.to_query();
        let pairs: Vec<(&str, &str)> = query
            .pairs()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        assert_eq!(pairs, vec![("search", "tech"), ("ville", "Maroua")]);
    }
}
