//! Opportunities API.
//!
//! Internships, jobs and trainings share one route layout under different
//! mount points, so a single client type serves all three boards.

use serde::Serialize;

use super::page_query;
use crate::client::EnspmClient;
use crate::error::Result;
use crate::request::Query;
use crate::types::{
    Extra, Opportunity, OpportunityFilter, OpportunityKind, PageRequest, Paginated,
    StatusUpdateRequest, ValidationRequest,
};

impl OpportunityFilter {
    pub(crate) fn to_query(&self, kind: OpportunityKind) -> Query {
        let mut query = Query::new();
        query
            .push_opt("search", self.search.as_deref())
            .push_opt(kind.type_filter_key(), self.kind_type.as_deref())
            .push_opt("ville", self.ville.as_deref())
            .push_opt("pays", self.pays.as_deref())
            .push_opt("statut", self.statut.as_deref());
        if kind == OpportunityKind::Training {
            query.push_opt("est_payante", self.paid);
        }
        query
    }
}

/// Opportunities API client for one board.
pub struct OpportunitiesApi {
    client: EnspmClient,
    kind: OpportunityKind,
}

impl OpportunitiesApi {
    pub(crate) fn new(client: EnspmClient, kind: OpportunityKind) -> Self {
        Self { client, kind }
    }

    /// Which board this client targets.
    pub fn kind(&self) -> OpportunityKind {
        self.kind
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}/{}", self.kind.path(), suffix)
    }

    /// List published opportunities.
    pub async fn list(
        &self,
        filter: &OpportunityFilter,
        page: PageRequest,
    ) -> Result<Paginated<Opportunity>> {
        let mut query = filter.to_query(self.kind);
        page_query(&mut query, page);
        self.client.get_with_query(&self.path(""), query).await
    }

    /// List opportunities awaiting validation (admin only).
    pub async fn pending(&self, page: PageRequest) -> Result<Paginated<Opportunity>> {
        let mut query = Query::new();
        page_query(&mut query, page);
        self.client
            .get_with_query(&self.path("pending"), query)
            .await
    }

    /// List opportunities created by the signed-in user.
    pub async fn mine(&self, page: PageRequest) -> Result<Paginated<Opportunity>> {
        let mut query = Query::new();
        page_query(&mut query, page);
        self.client.get_with_query(&self.path("me"), query).await
    }

    /// Board statistics. The shape differs per board.
    pub async fn statistics(&self) -> Result<Extra> {
        self.client.get(&self.path("statistics")).await
    }

    /// Get an opportunity by ID.
    pub async fn get(&self, id: &str) -> Result<Opportunity> {
        self.client.get(&self.path(id)).await
    }

    /// Get an opportunity by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Opportunity> {
        self.client.get(&self.path(&format!("slug/{}", slug))).await
    }

    /// Publish a new opportunity. It starts pending validation.
    pub async fn create<B: Serialize + ?Sized>(&self, input: &B) -> Result<Opportunity> {
        self.client.post(&self.path(""), input).await
    }

    /// Replace an opportunity's details.
    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, input: &B) -> Result<Opportunity> {
        self.client.put(&self.path(id), input).await
    }

    /// Approve or reject a pending opportunity.
    pub async fn validate(
        &self,
        id: &str,
        approved: bool,
        comment: Option<&str>,
    ) -> Result<Opportunity> {
        let request = ValidationRequest {
            approved,
            commentaire: comment.map(str::to_string),
        };
        self.client
            .post(&self.path(&format!("{}/validate", id)), &request)
            .await
    }

    /// Change the lifecycle status (`active`, `pourvue`, `annulee`, ...).
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Opportunity> {
        let request = StatusUpdateRequest {
            statut: status.to_string(),
        };
        self.client
            .patch(&self.path(&format!("{}/status", id)), &request)
            .await
    }

    /// Delete an opportunity.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&self.path(id)).await
    }
}
