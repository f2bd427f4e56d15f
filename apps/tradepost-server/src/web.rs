use axum::response::{Html, Json};
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    let now = chrono::Utc::now().to_rfc3339();
    Json(json!({ "status": "healthy", "timestamp": now }))
}

/// Stoplight Elements page rendering `/openapi.json`, assets from the CDN.
pub async fn docs_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Tradepost API Docs</title>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css"/>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
