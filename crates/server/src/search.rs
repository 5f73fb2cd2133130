//! Global search across customers, projects and inventory.

use api_types::search::{SearchParams, SearchResponse, SearchResult};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{SearchQuery, users};

use crate::{ServerError, server::ServerState};

pub async fn search(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ServerError> {
    let query = SearchQuery::parse(params.q.as_deref().unwrap_or_default())?;
    let hits = state.engine.search(&user.username, &query).await?;
    Ok(Json(SearchResponse {
        results: hits
            .into_iter()
            .map(|hit| SearchResult {
                kind: hit.kind.to_string(),
                id: hit.id,
                label: hit.label,
                subtitle: hit.subtitle,
                url: hit.url,
            })
            .collect(),
    }))
}
