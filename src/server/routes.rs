use std::env;

use crate::data::roster::DEFAULT_ROSTER_PATH;
use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

fn roster_path() -> String {
    env::var("METADEX_ROSTER").unwrap_or_else(|_| DEFAULT_ROSTER_PATH.to_string())
}

fn json_ok(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/candidates") => match api::candidates_payload(&roster_path()) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/ranking") => match api::ranking_payload(&roster_path()) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/matrix") => match api::matrix_payload(&roster_path()) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/team") => match api::team_payload(&roster_path(), body) {
            Ok(payload) => json_ok(payload),
            Err(api::TeamPayloadError::Parse(err)) => {
                error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
            }
            Err(api::TeamPayloadError::Validation(validation)) => {
                validation_error_response(400, "Bad Request", validation)
            }
            Err(api::TeamPayloadError::Data(err)) => {
                error_response(500, "Internal Server Error", &err.to_string())
            }
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Metadex API Console</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 860px; margin: 24px auto; padding: 0 12px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 160px; }
  </style>
</head>
<body>
  <h1>Metadex Local API</h1>
  <p>Matchup ranking and maximin team search over the configured roster.</p>

  <div class="card">
    <strong>Ranking</strong>
    <div><button id="ranking-btn">GET /api/ranking</button></div>
  </div>

  <div class="card">
    <strong>Team search</strong>
    <label for="size">Team size</label>
    <input id="size" type="number" min="1" max="12" value="3" />
    <label for="count">Teams to enumerate</label>
    <input id="count" type="number" min="1" max="20" value="5" />
    <label for="budget">Budget per round (ms)</label>
    <input id="budget" type="number" min="1" max="600000" value="30000" />
    <div><button id="team-btn">POST /api/team</button></div>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');

    async function request(path, options) {
      output.textContent = 'Loading…';
      const response = await fetch(path, options);
      const text = await response.text();
      output.textContent = 'HTTP ' + response.status + '\n' + text;
    }

    document.getElementById('ranking-btn').addEventListener('click', () => {
      request('/api/ranking', { method: 'GET' });
    });

    document.getElementById('team-btn').addEventListener('click', () => {
      const payload = {
        team_size: Math.max(1, Number(document.getElementById('size').value) || 3),
        count: Math.max(1, Number(document.getElementById('count').value) || 5),
        budget_ms: Math.max(1, Number(document.getElementById('budget').value) || 30000),
      };
      request('/api/team', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(payload),
      });
    });
  </script>
</body>
</html>
"#
    .to_string()
}
