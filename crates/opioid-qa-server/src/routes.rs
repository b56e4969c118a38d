use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use opioid_qa_core::ServerDeps;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(deps: Arc<ServerDeps>) -> Router {
    let allowed_origins = &deps.config.allowed_origins;

    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(index_page))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .layer(cors)
        // Method and path only; question text stays out of request spans.
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(AppState { deps })
}

#[derive(Clone)]
pub struct AppState {
    deps: Arc<ServerDeps>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AskForm {
    question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Always 200 with an answer; a malformed form body counts as no question.
async fn ask(
    State(state): State<AppState>,
    form: Result<Form<AskForm>, FormRejection>,
) -> Json<AskResponse> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable ask form");
            AskForm::default()
        }
    };

    let answer = state
        .deps
        .orchestrator
        .handle_question(form.question.as_deref())
        .await;

    Json(AskResponse { answer })
}

async fn health() -> &'static str {
    "ok"
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Opioid Information Assistant</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #222; }
  h1 { font-size: 1.4rem; }
  form { display: flex; gap: .5rem; }
  input[type=text] { flex: 1; padding: .6rem; font-size: 1rem; }
  button { padding: .6rem 1rem; font-size: 1rem; }
  #log { margin-top: 1.5rem; }
  .q { font-weight: 600; margin-top: 1rem; }
  .a { white-space: pre-wrap; margin-top: .3rem; }
</style>
</head>
<body>
<h1>Opioid Information Assistant</h1>
<p>Ask about opioids, overdose, addiction, withdrawal, naloxone, or treatment.</p>
<form id="ask">
  <input type="text" name="question" placeholder="Type your question" autocomplete="off">
  <button type="submit">Ask</button>
</form>
<div id="log"></div>
<script>
const form = document.getElementById("ask");
const log = document.getElementById("log");
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const input = form.elements.question;
  const question = input.value;
  const q = document.createElement("div");
  q.className = "q";
  q.textContent = question;
  const a = document.createElement("div");
  a.className = "a";
  a.textContent = "...";
  log.prepend(a);
  log.prepend(q);
  input.value = "";
  try {
    const response = await fetch("/ask", { method: "POST", body: new URLSearchParams({ question }) });
    const data = await response.json();
    a.textContent = data.answer;
  } catch (err) {
    a.textContent = "Request failed: " + err;
  }
});
</script>
</body>
</html>
"#;
