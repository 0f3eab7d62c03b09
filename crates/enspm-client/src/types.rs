//! Request and response types for the ENSPM Hub API.
//!
//! These types mirror the server's API contract. Records the client never
//! interprets keep their less common fields in a flattened `extra` map so
//! they round-trip without loss.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Arbitrary extra JSON fields carried alongside a typed record.
pub type Extra = serde_json::Map<String, serde_json::Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page (the server caps this at 100).
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

/// Pagination metadata returned with every list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    /// Whether a page exists after this one.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page exists before this one.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// A page of items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

/// A list body in either page shape the server emits.
///
/// Custom list endpoints send `{items, meta}`. Endpoints using the
/// framework's limit/offset paginator send `{items, count}` and leave the
/// page position to the caller.
#[derive(Debug, Deserialize)]
pub(crate) struct PageBody<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub meta: Option<PaginationMeta>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl<T> PageBody<T> {
    /// Resolve into a page, deriving metadata from `requested` when the
    /// body only carries a total count.
    pub(crate) fn into_page(self, requested: PageRequest) -> Paginated<T> {
        let meta = match self.meta {
            Some(meta) => meta,
            None => {
                let total_items = self.count.unwrap_or(self.items.len() as u64);
                let page_size = requested.page_size.max(1);
                PaginationMeta {
                    page: requested.page,
                    page_size,
                    total_items,
                    total_pages: total_items.div_ceil(u64::from(page_size)) as u32,
                }
            }
        };
        Paginated {
            items: self.items,
            meta,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Credentials for `auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Tokens issued on login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Account summary (no profile).
    pub user: UserSummary,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Body for `auth/refresh`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Tokens returned by `auth/refresh`. The refresh token is only present
/// when the server rotates it.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body for operations keyed on an email address.
#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Account fields without the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub role_systeme: String,
    pub est_actif: bool,
    #[serde(default)]
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Public profile attached to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub nom_complet: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub matricule: Option<String>,
    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default)]
    pub statut_global: Option<String>,
    #[serde(default)]
    pub travailleur: Option<bool>,
    #[serde(default)]
    pub annee_sortie: Option<i32>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub domaine: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_profil: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A user with their profile, as returned by `auth/me` and `users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub account: UserSummary,
    pub profil: Profile,
}

impl UserDetail {
    /// Display name, falling back to the email address.
    pub fn display_name(&self) -> &str {
        if self.profil.nom_complet.is_empty() {
            &self.account.email
        } else {
            &self.profil.nom_complet
        }
    }
}

/// Filters for the admin user list.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Free-text search over name, email, matricule.
    pub search: Option<String>,
    /// Any of these system roles.
    pub roles: Vec<String>,
    /// Any of these global statuses.
    pub statuses: Vec<String>,
    pub active: Option<bool>,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom_complet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matricule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statut_global: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travailleur: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annee_sortie: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domaine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Partial user update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_systeme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profil: Option<ProfileUpdate>,
}

/// Profile fields required when an administrator creates an account.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileCreate {
    pub nom_complet: String,
    /// Server default is `etudiant`.
    pub statut_global: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matricule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titre_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annee_sortie_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ville: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pays: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domaine_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileCreate {
    pub fn new(nom_complet: impl Into<String>) -> Self {
        Self {
            nom_complet: nom_complet.into(),
            statut_global: "etudiant".to_string(),
            matricule: None,
            titre_id: None,
            annee_sortie_id: None,
            adresse: None,
            telephone: None,
            ville: None,
            pays: None,
            domaine_id: None,
            bio: None,
        }
    }
}

/// Body for creating an account (admin only).
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    /// The server generates a temporary password when `None`.
    pub password: Option<String>,
    pub role_systeme: String,
    pub est_actif: bool,
    pub profil: ProfileCreate,
}

impl CreateUserRequest {
    /// An active `user` account with a server-generated password.
    pub fn new(email: impl Into<String>, profil: ProfileCreate) -> Self {
        Self {
            email: email.into(),
            password: None,
            role_systeme: "user".to_string(),
            est_actif: true,
            profil,
        }
    }
}

/// Account echoed back by the create endpoint. It carries no ID, and any
/// password field in the echo is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUser {
    pub email: String,
    #[serde(default)]
    pub role_systeme: Option<String>,
    #[serde(default)]
    pub est_actif: Option<bool>,
    #[serde(default)]
    pub profil: Option<serde_json::Value>,
}

/// A social network known to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialNetwork {
    pub id: String,
    pub nom: String,
    pub code: String,
    #[serde(default)]
    pub url_base: Option<String>,
}

/// A link from a profile to a social network account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    pub reseau: SocialNetwork,
    pub url: String,
    pub est_actif: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SocialLinkCreate {
    pub reseau_id: String,
    pub url: String,
}

/// Partial social link update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SocialLinkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub est_actif: Option<bool>,
}

/// Aggregate counts over all accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub deleted_users: u64,
    #[serde(default)]
    pub by_role: HashMap<String, u64>,
    #[serde(default)]
    pub by_status: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ToggleStatusRequest {
    pub est_actif: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ResetPasswordRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

/// Outcome of a password change or reset.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResponse {
    pub message: String,
    /// Set when the server generated the new password.
    #[serde(default)]
    pub temporary_password: Option<String>,
}

/// Plain `{"detail": ...}` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub detail: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Organisations
// ─────────────────────────────────────────────────────────────────────────────

/// An organisation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: String,
    pub nom_organisation: String,
    pub slug: String,
    pub type_organisation: String,
    pub statut: String,
    #[serde(default)]
    pub ville: Option<String>,
    #[serde(default)]
    pub pays: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Fields for creating or replacing an organisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganisationInput {
    pub nom_organisation: String,
    pub type_organisation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secteur_activite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ville: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pays: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_general: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone_general: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_creation: Option<String>,
}

/// Filters for listing organisations. `None` fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct OrganisationFilter {
    pub search: Option<String>,
    pub type_organisation: Option<String>,
    pub secteur_activite: Option<String>,
    pub ville: Option<String>,
    pub pays: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusUpdateRequest {
    pub statut: String,
}

/// Membership of a profile in an organisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub profil_nom: String,
    pub organisation_nom: String,
    pub role_organisation: String,
    pub est_actif: bool,
    pub date_joindre: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Request to add a member.
#[derive(Debug, Clone, Serialize)]
pub struct AddMemberRequest {
    pub profil_id: String,
    pub role_organisation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poste: Option<String>,
}

/// A follow relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub profil: String,
    pub organisation: String,
    pub date_abonnement: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Opportunities
// ─────────────────────────────────────────────────────────────────────────────

/// The three opportunity boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpportunityKind {
    Internship,
    Job,
    Training,
}

impl OpportunityKind {
    /// API mount point. The trainings board is mounted at `trainigs/` on
    /// the server.
    pub fn path(self) -> &'static str {
        match self {
            OpportunityKind::Internship => "internships",
            OpportunityKind::Job => "jobs",
            OpportunityKind::Training => "trainigs",
        }
    }

    /// Query key for the kind-specific type filter.
    pub(crate) fn type_filter_key(self) -> &'static str {
        match self {
            OpportunityKind::Internship => "type_stage",
            OpportunityKind::Job => "type_emploi",
            OpportunityKind::Training => "type_formation",
        }
    }
}

impl std::fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OpportunityKind::Internship => "internship",
            OpportunityKind::Job => "job",
            OpportunityKind::Training => "training",
        };
        f.write_str(name)
    }
}

/// Fields shared by internships, jobs and trainings. Kind-specific fields
/// (dates, salary, price, links) stay in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub titre: String,
    pub slug: String,
    pub nom_structure: String,
    pub description: String,
    #[serde(default)]
    pub ville: Option<String>,
    #[serde(default)]
    pub pays: Option<String>,
    pub statut: String,
    pub est_valide: bool,
    pub date_publication: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Filters for opportunity lists.
#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub search: Option<String>,
    /// Kind-specific type (`type_stage`, `type_emploi` or `type_formation`).
    pub kind_type: Option<String>,
    pub ville: Option<String>,
    pub pays: Option<String>,
    pub statut: Option<String>,
    /// Trainings only.
    pub paid: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ValidationRequest {
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Info
// ─────────────────────────────────────────────────────────────────────────────

/// Welcome document served at the API root.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_detail_flattens_account() {
        let json = serde_json::json!({
            "id": "u1",
            "email": "ada@enspm.cm",
            "role_systeme": "user",
            "est_actif": true,
            "last_login": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
            "profil": {
                "id": "p1",
                "nom_complet": "Ada N.",
                "slug": "ada-n",
                "photo_profil": null,
                "linkedin": "ada"
            }
        });

        let user: UserDetail = serde_json::from_value(json).unwrap();
        assert_eq!(user.account.email, "ada@enspm.cm");
        assert_eq!(user.display_name(), "Ada N.");
        assert_eq!(user.profil.extra["linkedin"], "ada");
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let resp: RefreshResponse =
            serde_json::from_str(r#"{"access_token":"A2","token_type":"Bearer"}"#).unwrap();
        assert_eq!(resp.access_token, "A2");
        assert!(resp.refresh_token.is_none());
    }

    #[test]
    fn test_pagination_navigation() {
        let meta = PaginationMeta {
            page: 1,
            page_size: 20,
            total_items: 41,
            total_pages: 3,
        };
        assert!(meta.has_next());
        assert!(!meta.has_previous());

        let last = PaginationMeta { page: 3, ..meta };
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_page_body_from_limit_offset_count() {
        let body: PageBody<String> =
            serde_json::from_str(r#"{"items":["a","b"],"count":45}"#).unwrap();
        let page = body.into_page(PageRequest::new(2, 20));

        assert_eq!(page.items, vec!["a", "b"]);
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.total_items, 45);
        assert_eq!(page.meta.total_pages, 3);
        assert!(page.meta.has_next());
    }

    #[test]
    fn test_page_body_prefers_server_meta() {
        let body: PageBody<String> = serde_json::from_str(
            r#"{"items":[],"meta":{"page":4,"page_size":10,"total_items":31,"total_pages":4}}"#,
        )
        .unwrap();
        let page = body.into_page(PageRequest::default());

        assert_eq!(page.meta.page, 4);
        assert_eq!(page.meta.total_pages, 4);
        assert!(!page.meta.has_next());
    }

    #[test]
    fn test_page_body_empty_count() {
        let body: PageBody<String> = serde_json::from_str(r#"{"items":[],"count":0}"#).unwrap();
        let page = body.into_page(PageRequest::default());
        assert_eq!(page.meta.total_pages, 0);
        assert!(!page.meta.has_next());
    }

    #[test]
    fn test_opportunity_kind_paths() {
        assert_eq!(OpportunityKind::Internship.path(), "internships");
        assert_eq!(OpportunityKind::Job.path(), "jobs");
        assert_eq!(OpportunityKind::Training.path(), "trainigs");
        assert_eq!(OpportunityKind::Job.to_string(), "job");
    }
}
