//! End-to-end tests for the KB proxy endpoints.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{gateway_config, start_gateway, start_programmable_upstream};

#[tokio::test]
async fn test_info_miss_then_hit() {
    let (upstream, log) = start_programmable_upstream(|path| async move {
        match path.as_str() {
            "/info" => (200, r#"{"version":"1.2.3","documents":12}"#.to_string()),
            _ => (404, "{}".to_string()),
        }
    })
    .await;
    let gateway = start_gateway(gateway_config(upstream)).await;

    let first = gateway.get("/api/kb/info").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-cache"], "MISS");
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cached"], false);
    assert_eq!(body["info"]["version"], "1.2.3");
    assert_eq!(log.count("/info"), 1);

    let second = gateway.get("/api/kb/info").await;
    assert_eq!(second.headers()["x-cache"], "HIT");
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["cached"], true);
    assert_eq!(body["info"]["documents"], 12);
    assert_eq!(log.count("/info"), 1, "cache hit must not call upstream");

    let seen = log.all();
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer test-key"));
}

#[tokio::test]
async fn test_info_degraded_after_retries() {
    let (upstream, log) =
        start_programmable_upstream(|_| async { (500, r#"{"error":"boom"}"#.to_string()) }).await;
    let config = gateway_config(upstream);
    let max_retries = config.retries.status.max_retries as usize;
    let gateway = start_gateway(config).await;

    let res = gateway.get("/api/kb/info").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-cache").is_none());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "degraded");

    assert_eq!(log.count("/info"), max_retries + 1);
    // warm-up fires once, after the first failure
    assert_eq!(log.count("/health"), 1);
    assert_eq!(log.paths()[..2], ["/info".to_string(), "/health".to_string()]);

    let warm_up = log.all().into_iter().find(|r| r.path == "/health").unwrap();
    assert_eq!(warm_up.authorization.as_deref(), Some("Bearer test-key"));
}

#[tokio::test]
async fn test_info_recovers_after_transient_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let (upstream, log) = start_programmable_upstream(move |path| {
        let cc = cc.clone();
        async move {
            if path != "/info" {
                return (200, "{}".to_string());
            }
            if cc.fetch_add(1, Ordering::SeqCst) == 0 {
                (503, "{}".to_string())
            } else {
                (200, r#"{"ready":true}"#.to_string())
            }
        }
    })
    .await;
    let gateway = start_gateway(gateway_config(upstream)).await;

    let res = gateway.get("/api/kb/info").await;
    assert_eq!(res.headers()["x-cache"], "MISS");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["info"]["ready"], true);
    assert_eq!(log.count("/info"), 2);
}

#[tokio::test]
async fn test_rate_limit_rejects_201st_request() {
    let (upstream, log) =
        start_programmable_upstream(|_| async { (200, r#"{"ok":true}"#.to_string()) }).await;
    let mut config = gateway_config(upstream);
    config.rate_limit.max_requests = 200;
    let gateway = start_gateway(config).await;

    for i in 1..=200 {
        let res = gateway.get_as("/api/kb/info", "203.0.113.9").await;
        assert_eq!(res.status(), StatusCode::OK, "request {i} should pass");
    }

    let res = gateway.get_as("/api/kb/info", "203.0.113.9").await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "statusCode": 429, "statusMessage": "Too many requests" }));

    // other clients have their own window
    let res = gateway.get_as("/api/kb/info", "198.51.100.4").await;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(log.count("/info"), 1);
}

#[tokio::test]
async fn test_list_cached_with_cache_control() {
    let (upstream, log) = start_programmable_upstream(|path| async move {
        match path.as_str() {
            "/kb/list" => (200, r#"[{"id":"intro.md"}]"#.to_string()),
            _ => (404, "{}".to_string()),
        }
    })
    .await;
    let gateway = start_gateway(gateway_config(upstream)).await;

    let res = gateway.get("/api/kb/list").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-cache"], "MISS");
    assert_eq!(res.headers()["cache-control"], "public, max-age=300, s-maxage=300");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["documents"][0]["id"], "intro.md");

    let res = gateway.get("/api/kb/list").await;
    assert_eq!(res.headers()["x-cache"], "HIT");
    assert_eq!(log.count("/kb/list"), 1);
}

#[tokio::test]
async fn test_list_unavailable_after_retries() {
    let (upstream, log) = start_programmable_upstream(|_| async { (502, "{}".to_string()) }).await;
    let config = gateway_config(upstream);
    let attempts = config.retries.content.max_retries as usize + 1;
    let gateway = start_gateway(config).await;

    let res = gateway.get("/api/kb/list").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], 503);
    assert_eq!(log.count("/kb/list"), attempts);
}

#[tokio::test]
async fn test_document_candidates_in_order() {
    let (upstream, log) = start_programmable_upstream(|path| async move {
        match path.as_str() {
            "/kb/get/docs%2Fguide%2Fsetup" => (200, r#"{"title":"Setup"}"#.to_string()),
            "/kb/get/guide%2Fsetup.md" => (422, "{}".to_string()),
            _ => (404, "{}".to_string()),
        }
    })
    .await;
    let gateway = start_gateway(gateway_config(upstream)).await;

    let res = gateway.get("/api/kb/doc/guide/setup").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["cache-control"], "public, max-age=300, s-maxage=300");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], "docs/guide/setup");
    assert_eq!(body["document"]["title"], "Setup");

    assert_eq!(
        log.paths(),
        vec![
            "/kb/get/guide%2Fsetup",
            "/kb/get/guide%2Fsetup.md",
            "/kb/get/docs%2Fguide%2Fsetup",
        ]
    );
}

#[tokio::test]
async fn test_document_not_found_after_all_candidates() {
    let (upstream, log) = start_programmable_upstream(|_| async { (404, "{}".to_string()) }).await;
    let gateway = start_gateway(gateway_config(upstream)).await;

    let res = gateway.get("/api/kb/doc/missing").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], 404);

    // not-found is never retried and never triggers a warm-up
    assert_eq!(log.paths().len(), 4);
    assert_eq!(log.count("/health"), 0);
}

#[tokio::test]
async fn test_document_transient_failure_is_503() {
    let (upstream, log) = start_programmable_upstream(|path| async move {
        match path.as_str() {
            "/kb/get/intro" => (404, "{}".to_string()),
            "/health" => (200, "{}".to_string()),
            _ => (500, "{}".to_string()),
        }
    })
    .await;
    let config = gateway_config(upstream);
    let attempts = config.retries.content.max_retries as usize + 1;
    let gateway = start_gateway(config).await;

    let res = gateway.get("/api/kb/doc/intro").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    assert_eq!(log.count("/kb/get/intro"), 1);
    assert_eq!(log.count("/kb/get/intro.md"), attempts);
    assert_eq!(log.count("/kb/get/docs%2Fintro"), 0, "lookup stops on transient failure");
}

#[tokio::test]
async fn test_document_lookup_cut_off_at_deadline() {
    let (upstream, log) = start_programmable_upstream(|_| async {
        tokio::time::sleep(Duration::from_millis(400)).await;
        (404, "{}".to_string())
    })
    .await;
    let mut config = gateway_config(upstream);
    // one attempt per candidate at 1s each: the lookup is cut off after 1s
    config.upstream.request_timeout_secs = 1;
    config.retries.content.max_retries = 0;
    config.http.request_timeout_secs = 5;
    let gateway = start_gateway(config).await;

    let started = Instant::now();
    let res = gateway.get("/api/kb/doc/slow").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "statusCode": 503, "statusMessage": "Knowledge base is unavailable" })
    );
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(log.paths().len() < 4, "remaining candidates are abandoned");
}

#[tokio::test]
async fn test_malformed_document_path_does_not_consume_rate_limit() {
    let (upstream, log) =
        start_programmable_upstream(|_| async { (200, r#"{"title":"Intro"}"#.to_string()) }).await;
    let mut config = gateway_config(upstream);
    config.rate_limit.max_requests = 1;
    let gateway = start_gateway(config).await;

    let res = gateway.get_as("/api/kb/doc/%20", "192.0.2.7").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = gateway.get_as("/api/kb/doc/intro", "192.0.2.7").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = gateway.get_as("/api/kb/doc/intro", "192.0.2.7").await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(log.paths(), vec!["/kb/get/intro"]);
}

#[tokio::test]
async fn test_disabled_upstream() {
    let mut config = common::gateway_config("127.0.0.1:9".parse().unwrap());
    config.upstream.enabled = false;
    let gateway = start_gateway(config).await;

    for path in ["/api/kb/info", "/api/kb/list", "/api/kb/doc/intro"] {
        let res = gateway.get(path).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], "disabled");
    }

    let res = gateway.get("/healthz").await;
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["upstream"], "disabled");
}
