//! REST API integration tests.
//!
//! The router is served on an ephemeral port with a fixture fetcher and a
//! wiremock model endpoint, and exercised over real HTTP.

use assert_json_diff::{assert_json_eq, assert_json_include};
use japa_runtime::config::LlmConfig;
use japa_runtime::fetch::fixture::FixtureFetcher;
use japa_runtime::requirements::dispatch::Dispatcher;
use japa_runtime::requirements::{uk, RenderTimings};
use japa_runtime::rest::{self, AppState};
use japa_runtime::roadmap::RoadmapClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UK_PAGE: &str = r#"
<main><ul>
  <li>a current passport or other valid travel document</li>
  <li>proof you have enough money to support yourself</li>
</ul></main>
"#;

fn llm_config(base: &str, api_key: Option<&str>) -> LlmConfig {
    LlmConfig {
        api_key: api_key.map(String::from),
        base_url: Url::parse(&format!("{base}/v1")).unwrap(),
        model: "gpt-4o-mini".to_string(),
    }
}

async fn spawn_api(fetcher: FixtureFetcher, llm: LlmConfig) -> String {
    let state = Arc::new(AppState {
        dispatcher: Dispatcher::new(RenderTimings::default()),
        fetcher: Arc::new(fetcher),
        roadmap: RoadmapClient::new(llm),
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(rest::serve(listener, state));
    format!("http://{addr}")
}

async fn offline_api() -> String {
    spawn_api(
        FixtureFetcher::new().without_browser(),
        llm_config("http://127.0.0.1:9", None),
    )
    .await
}

fn profile() -> Value {
    json!({
        "fullName": "Ada Obi",
        "degree": "BSc Computer Science",
        "workExperience": "2 years",
        "targetCountry": "Canada",
        "goal": "MSc in Data Science"
    })
}

async fn post_json(url: &str, body: &Value) -> Value {
    reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_welcome_and_health() {
    let base = offline_api().await;

    let welcome: Value = reqwest::get(&base).await.unwrap().json().await.unwrap();
    assert_json_eq!(welcome, json!({ "message": "Welcome to JapaAdvisor API!" }));

    let health: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_include!(actual: health, expected: json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_countries_listing() {
    let base = offline_api().await;
    let body: Value = reqwest::get(format!("{base}/api/countries"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(body, json!({ "countries": ["Canada", "UK", "USA", "Germany"] }));
}

#[tokio::test]
async fn test_requirements_for_uk() {
    let fetcher = FixtureFetcher::new().with_static(uk::SOURCE_URL, UK_PAGE);
    let base = spawn_api(fetcher, llm_config("http://127.0.0.1:9", None)).await;

    let body = post_json(
        &format!("{base}/api/requirements"),
        &json!({ "country": "uk", "nationality": "Ghana" }),
    )
    .await;
    assert_json_eq!(
        body,
        json!({
            "country": "UK",
            "visa_type": "Student Visa",
            "documents": [
                "a current passport or other valid travel document",
                "proof you have enough money to support yourself"
            ],
            "language_requirements": uk::LANGUAGE_REQUIREMENTS,
            "timeline": uk::TIMELINE,
            "official_links": ["https://www.gov.uk/student-visa"]
        })
    );
}

#[tokio::test]
async fn test_requirements_fallback_marks_canada() {
    let base = offline_api().await;
    let body = post_json(
        &format!("{base}/api/requirements"),
        &json!({ "country": "Canada" }),
    )
    .await;
    assert_json_include!(
        actual: body,
        expected: json!({ "country": "Canada", "visa_type": "Study Permit", "used_fallback": true })
    );
    assert!(body["last_updated"].is_string());
}

#[tokio::test]
async fn test_requirements_unsupported_country() {
    let base = offline_api().await;
    let body = post_json(
        &format!("{base}/api/requirements"),
        &json!({ "country": "France" }),
    )
    .await;
    assert_json_eq!(body, json!({ "error": "Scraper not available for 'France' yet." }));
}

#[tokio::test]
async fn test_generate_roadmap_passes_model_json_through() {
    let server = MockServer::start().await;
    let roadmap = json!({
        "roadmap": "Get admitted to a DLI, obtain a PAL, then apply for a study permit.",
        "checklist": ["Passport", "Letter of acceptance", "PAL", "Proof of funds", "IELTS"],
        "sop": "Statement of purpose...",
        "opportunities": [
            { "title": "Vanier", "url": "https://vanier.gc.ca", "type": "scholarship" },
            { "title": "UofT", "url": "https://www.utoronto.ca", "type": "university" },
            { "title": "IRCC", "url": "https://www.canada.ca", "type": "visa" }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": roadmap.to_string() } }]
        })))
        .mount(&server)
        .await;

    let base = spawn_api(
        FixtureFetcher::new(),
        llm_config(&server.uri(), Some("sk-test")),
    )
    .await;
    let body = post_json(&format!("{base}/generate-roadmap"), &profile()).await;
    assert_json_eq!(body, roadmap);
}

#[tokio::test]
async fn test_generate_roadmap_reports_unparsable_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "I cannot help with that." } }]
        })))
        .mount(&server)
        .await;

    let base = spawn_api(
        FixtureFetcher::new(),
        llm_config(&server.uri(), Some("sk-test")),
    )
    .await;
    let body = post_json(&format!("{base}/generate-roadmap"), &profile()).await;
    assert_json_eq!(
        body,
        json!({ "error": "Failed to parse GPT response", "raw": "I cannot help with that." })
    );
}

#[tokio::test]
async fn test_generate_roadmap_without_key() {
    let base = offline_api().await;
    let body = post_json(&format!("{base}/generate-roadmap"), &profile()).await;
    assert_json_eq!(body, json!({ "error": "OPENAI_API_KEY is not set" }));
}
