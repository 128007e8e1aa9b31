//! Handlers for the feed, search, author pages, submission, voting, and
//! deletion.

use actix_web::{web, HttpResponse};
use pagination::parse_page;
use serde::Deserialize;

use super::error::ApiError;
use super::identity::Identity;
use super::{Catalogue, Ledger};
use crate::domain::ports::SortOrder;
use crate::domain::posts::PostForm;
use crate::domain::{PostId, VoteDirection};

/// Query string accepted by the listing endpoints. Both values are tolerant:
/// unparsable pages fall back to 1 and unknown orders to `created`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub order_by: Option<String>,
}

impl ListParams {
    fn page(&self) -> u64 {
        parse_page(self.page.as_deref())
    }

    fn order(&self) -> SortOrder {
        SortOrder::from_query(self.order_by.as_deref())
    }
}

/// Query string accepted by the search endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub page: Option<String>,
    pub order_by: Option<String>,
}

/// GET `/api/posts`
pub async fn front_page(
    catalogue: web::Data<Catalogue>,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, ApiError> {
    let page = catalogue.front_page(query.page(), query.order()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET `/api/search`
pub async fn search(
    catalogue: web::Data<Catalogue>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let page = catalogue
        .search(
            &query.q,
            parse_page(query.page.as_deref()),
            SortOrder::from_query(query.order_by.as_deref()),
        )
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET `/api/user/{name}`
pub async fn user_page(
    catalogue: web::Data<Catalogue>,
    name: web::Path<String>,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, ApiError> {
    let page = catalogue
        .by_author(name.as_str(), query.page(), query.order())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST `/api/auth/submit`
pub async fn submit(
    identity: Identity,
    catalogue: web::Data<Catalogue>,
    form: web::Json<PostForm>,
) -> Result<HttpResponse, ApiError> {
    let post = catalogue.submit(&identity.0, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT `/api/auth/upvote/{id}`
pub async fn upvote(
    identity: Identity,
    ledger: web::Data<Ledger>,
    id: web::Path<PostId>,
) -> Result<HttpResponse, ApiError> {
    ledger
        .apply(identity.0, *id, VoteDirection::Up)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT `/api/auth/downvote/{id}`
pub async fn downvote(
    identity: Identity,
    ledger: web::Data<Ledger>,
    id: web::Path<PostId>,
) -> Result<HttpResponse, ApiError> {
    ledger
        .apply(identity.0, *id, VoteDirection::Down)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE `/api/auth/{id}`
pub async fn delete_post(
    identity: Identity,
    catalogue: web::Data<Catalogue>,
    id: web::Path<PostId>,
) -> Result<HttpResponse, ApiError> {
    catalogue.delete(&identity.0, &id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
