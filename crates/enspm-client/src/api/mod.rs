//! API endpoint implementations.

mod auth;
mod info;
mod opportunities;
mod organisations;
mod users;

pub use auth::AuthApi;
pub use info::InfoApi;
pub use opportunities::OpportunitiesApi;
pub use organisations::OrganisationsApi;
pub use users::UsersApi;

use crate::request::Query;
use crate::types::PageRequest;

/// Append `page` and `page_size` to a query.
pub(crate) fn page_query(query: &mut Query, page: PageRequest) {
    query.push("page", page.page).push("page_size", page.page_size);
}

/// Append the same page as `limit` and `offset`, for endpoints behind the
/// framework's limit/offset paginator.
pub(crate) fn limit_offset_query(query: &mut Query, page: PageRequest) {
    let offset = u64::from(page.page.saturating_sub(1)) * u64::from(page.page_size);
    query.push("limit", page.page_size).push("offset", offset);
}
