//! KB proxy endpoints.
//!
//! Each handler runs the same pipeline: disabled check, rate limit, cache
//! slot, upstream call through the backoff executor, then either a cached
//! success or the endpoint class's failure policy (degraded 200 for status
//! endpoints, 503 for content endpoints).

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::health::retry_observer;
use crate::http::request::request_id;
use crate::http::response::{self, CacheStatus};
use crate::observability::metrics;
use crate::proxy::error::ApiError;
use crate::proxy::lookup::{candidate_ids, normalize_slug, resolve_first};
use crate::proxy::state::ProxyState;
use crate::resilience::retry_with_backoff;
use crate::security::ClientKey;

pub const INFO: &str = "info";
pub const LIST: &str = "list";
pub const DOCUMENT: &str = "document";

/// `GET /healthz`: the gateway's own liveness.
pub async fn healthz(State(state): State<Arc<ProxyState>>) -> Response {
    let upstream = if state.upstream().is_some() { "enabled" } else { "disabled" };
    response::json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": upstream,
    }))
}

/// `GET /api/kb/info`: cached system info, degraded on upstream failure.
pub async fn kb_info(
    State(state): State<Arc<ProxyState>>,
    client: ClientKey,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let result = info(&state, &client, request_id(&headers)).await;
    finish(INFO, start, result)
}

/// `GET /api/kb/list`: cached document listing, 503 on upstream failure.
pub async fn kb_list(
    State(state): State<Arc<ProxyState>>,
    client: ClientKey,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let result = list(&state, &client, request_id(&headers)).await;
    finish(LIST, start, result)
}

/// `GET /api/kb/doc/{*slug}`: resolve a document by path.
pub async fn kb_document(
    State(state): State<Arc<ProxyState>>,
    client: ClientKey,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Response {
    let start = Instant::now();
    let result = document(&state, &client, request_id(&headers), &slug).await;
    finish(DOCUMENT, start, result)
}

fn finish(endpoint: &'static str, start: Instant, result: Result<Response, ApiError>) -> Response {
    let res = result.into_response();
    metrics::record_request(endpoint, res.status().as_u16(), start);
    res
}

async fn info(state: &ProxyState, client: &ClientKey, request_id: &str) -> Result<Response, ApiError> {
    let Some(upstream) = state.upstream() else {
        return Ok(response::disabled());
    };
    state.admit(INFO, client, request_id)?;

    if let Some(info) = state.info_cache.get() {
        metrics::record_cache(INFO, true);
        return Ok(info_response(CacheStatus::Hit, info));
    }
    metrics::record_cache(INFO, false);

    let fetched = retry_with_backoff(
        &state.status_policy,
        || upstream.info(),
        retry_observer(upstream, INFO),
    )
    .await;

    match fetched {
        Ok(info) => {
            state.info_cache.set(info.clone());
            Ok(info_response(CacheStatus::Miss, info))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                endpoint = INFO,
                attempts = state.status_policy.attempts(),
                error = %e,
                "Upstream unavailable, answering degraded"
            );
            metrics::record_degraded(INFO);
            Ok(response::degraded("Knowledge base is unavailable", &e))
        }
    }
}

fn info_response(cache: CacheStatus, info: serde_json::Value) -> Response {
    let body = json!({
        "status": "ok",
        "cached": cache.is_hit(),
        "info": info,
    });
    response::with_cache_status(response::json(body), cache)
}

async fn list(state: &ProxyState, client: &ClientKey, request_id: &str) -> Result<Response, ApiError> {
    let Some(upstream) = state.upstream() else {
        return Ok(response::disabled());
    };
    state.admit(LIST, client, request_id)?;

    if let Some(documents) = state.list_cache.get() {
        metrics::record_cache(LIST, true);
        return Ok(list_response(state, CacheStatus::Hit, documents));
    }
    metrics::record_cache(LIST, false);

    let fetched = retry_with_backoff(
        &state.content_policy,
        || upstream.list(),
        retry_observer(upstream, LIST),
    )
    .await;

    match fetched {
        Ok(documents) => {
            state.list_cache.set(documents.clone());
            Ok(list_response(state, CacheStatus::Miss, documents))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                endpoint = LIST,
                attempts = state.content_policy.attempts(),
                error = %e,
                "Failed to fetch document list"
            );
            Err(ApiError::Unavailable("Knowledge base is unavailable".into()))
        }
    }
}

fn list_response(state: &ProxyState, cache: CacheStatus, documents: serde_json::Value) -> Response {
    let body = json!({
        "status": "ok",
        "cached": cache.is_hit(),
        "documents": documents,
    });
    let res = response::with_cache_status(response::json(body), cache);
    response::with_cache_control(res, &state.cache_control)
}

async fn document(
    state: &ProxyState,
    client: &ClientKey,
    request_id: &str,
    raw_slug: &str,
) -> Result<Response, ApiError> {
    let Some(upstream) = state.upstream() else {
        return Ok(response::disabled());
    };
    // Malformed paths are rejected without spending a rate limit slot.
    let slug = normalize_slug(raw_slug)
        .ok_or_else(|| ApiError::BadRequest("Document path is required".into()))?;
    state.admit(DOCUMENT, client, request_id)?;

    let policy = state.content_policy;
    let lookup = resolve_first(candidate_ids(slug), |id| async move {
        retry_with_backoff(
            &policy,
            || upstream.document(&id),
            retry_observer(upstream, DOCUMENT),
        )
        .await
    });

    let Ok(resolved) = tokio::time::timeout(state.document_deadline, lookup).await else {
        tracing::error!(
            request_id = %request_id,
            slug,
            deadline_ms = state.document_deadline.as_millis() as u64,
            "Document lookup exceeded its deadline"
        );
        return Err(ApiError::Unavailable("Knowledge base is unavailable".into()));
    };

    match resolved {
        Ok(Some((id, doc))) => {
            tracing::debug!(request_id = %request_id, slug, id = %id, "Document resolved");
            let body = json!({
                "status": "ok",
                "id": id,
                "document": doc,
            });
            Ok(response::with_cache_control(response::json(body), &state.cache_control))
        }
        Ok(None) => {
            tracing::warn!(request_id = %request_id, slug, "Document not found under any candidate id");
            Err(ApiError::NotFound(format!("Document '{slug}' not found")))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                slug,
                attempts = policy.attempts(),
                error = %e,
                "Failed to fetch document"
            );
            Err(ApiError::Unavailable("Knowledge base is unavailable".into()))
        }
    }
}
