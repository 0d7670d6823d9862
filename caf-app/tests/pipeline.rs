use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use caf_app::run;
use caf_common::CafError;
use caf_config::{Mode, ScrapeConfig};
use caf_http::{HttpClient, HttpError, PageSource};
use serde_json::Value;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const SAMPLE: &str = include_str!("../../caf-extract/tests/fixtures/caf_sample.html");
const CAF_PATH: &str = "/collection/cyber-assessment-framework";

fn client() -> HttpClient {
    HttpClient::new("caf-scrape-tests", Duration::from_secs(2))
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}

fn config(source_url: String, tmp: &TempDir) -> ScrapeConfig {
    ScrapeConfig {
        source_url,
        output_stem: tmp.path().join("output"),
        ..ScrapeConfig::default()
    }
}

async fn serve(status: u16, body: &str) -> MockServer {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CAF_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn page_mode_writes_the_document() {
    let server = serve(200, SAMPLE).await;
    let tmp = TempDir::new().unwrap();
    let url = format!("{}{CAF_PATH}", server.uri());
    let cfg = config(url.clone(), &tmp);

    let summary = run(&cfg, &client()).await.unwrap();
    assert_eq!(summary.output, tmp.path().join("output.json"));
    assert_eq!(summary.counts.objectives, 2);
    assert_eq!(summary.counts.indicators, 15);

    let text = fs::read_to_string(&summary.output).unwrap();
    assert_eq!(text.len(), summary.bytes);
    assert!(text.ends_with('\n'));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["source"], url.as_str());
    assert_eq!(value["objectives"][0]["id"], "A");
    assert_eq!(value["objectives"][1]["principles"][0]["id"], "B1");
}

#[tokio::test]
async fn failed_fetch_writes_nothing() {
    let server = serve(404, "not here").await;
    let tmp = TempDir::new().unwrap();
    let cfg = config(format!("{}{CAF_PATH}", server.uri()), &tmp);

    let err = run(&cfg, &client()).await.unwrap_err();
    assert!(matches!(err, CafError::Network(_)), "{err}");
    assert_eq!(err.exit_code(), 2);
    assert!(!cfg.output_path().exists());
}

#[tokio::test]
async fn changed_markup_leaves_previous_output_alone() {
    let server = serve(200, "<html><body><main><h1>New look</h1></main></body></html>").await;
    let tmp = TempDir::new().unwrap();
    let cfg = config(format!("{}{CAF_PATH}", server.uri()), &tmp);
    fs::write(cfg.output_path(), "previous run\n").unwrap();

    let err = run(&cfg, &client()).await.unwrap_err();
    assert!(matches!(err, CafError::StructureMismatch(_)), "{err}");
    assert_eq!(err.exit_code(), 3);
    assert_eq!(fs::read_to_string(cfg.output_path()).unwrap(), "previous run\n");
}

#[tokio::test]
async fn unwritable_output_is_an_io_error() {
    let server = serve(200, SAMPLE).await;
    let tmp = TempDir::new().unwrap();
    // A directory where the JSON file should go.
    fs::create_dir(tmp.path().join("output.json")).unwrap();
    let cfg = config(format!("{}{CAF_PATH}", server.uri()), &tmp);

    let err = run(&cfg, &client()).await.unwrap_err();
    assert!(matches!(err, CafError::Io { .. }), "{err}");
    assert_eq!(err.exit_code(), 4);
}

// ==============================
// Crawl mode against canned pages
// ==============================

const BASE: &str = "https://caf.test";

struct CannedSite {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl CannedSite {
    fn new(pages: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requested_paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|u| Url::parse(u).unwrap().path().to_string())
            .collect()
    }
}

#[async_trait]
impl PageSource for CannedSite {
    async fn fetch_page(&self, url: &Url) -> Result<String, HttpError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| HttpError::Network {
                url: url.to_string(),
                message: "no such page".into(),
            })
    }
}

fn page(path: &str, html: String) -> (String, String) {
    (format!("{BASE}{path}"), html)
}

fn collection_page() -> String {
    format!(
        r#"<html><body>
        <a href="{CAF_PATH}/caf-objective-b">Objective B</a>
        <a href="{CAF_PATH}/caf-objective-a">Objective A</a>
        <a href="/about">About</a>
        </body></html>"#
    )
}

fn objective_page(heading: &str, principle_paths: &[&str]) -> String {
    let links: String = principle_paths
        .iter()
        .map(|p| format!(r#"<li><a href="{p}">{p}</a></li>"#))
        .collect();
    format!(
        r#"<html><body>
        <div class="hero"><h1 class="subHeading">{heading}</h1><p>Objective summary.</p></div>
        <ul>{links}</ul>
        </body></html>"#
    )
}

fn principle_page(heading: &str, outcome_heading: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="subHeading">{heading}</h1>
        <section><h2>Principle</h2><p>Principle statement for {heading}.</p></section>
        <section><h2>Description</h2><p>Why {heading} matters.</p></section>
        <div class="pcf-BodyText">
          <h3>{outcome_heading}</h3>
          <p><em>Outcome statement.</em></p>
          <table>
            <tr><th>Not Achieved</th><th>Achieved</th></tr>
            <tr><td>At least one of the following statements is true</td><td>All the following statements are true</td></tr>
            <tr><td><p>Bad practice.</p></td><td><p>Good practice.</p><p>More good practice.</p></td></tr>
          </table>
        </div>
        </body></html>"#
    )
}

fn canned_framework() -> CannedSite {
    CannedSite::new([
        page(CAF_PATH, collection_page()),
        page(
            &format!("{CAF_PATH}/caf-objective-a"),
            objective_page(
                "Objective A - Managing security risk",
                &[
                    "/caf/principle-a2-risk-management",
                    "/caf/principle-a1-governance",
                ],
            ),
        ),
        page(
            &format!("{CAF_PATH}/caf-objective-b"),
            objective_page(
                "Objective B - Protecting against cyber attack",
                &["/caf/principle-b1-service-protection"],
            ),
        ),
        page(
            "/caf/principle-a1-governance",
            principle_page("A1 Governance", "A1.a Board Direction"),
        ),
        page(
            "/caf/principle-a2-risk-management",
            principle_page("A2 Risk Management", "A2.a Risk Management Process"),
        ),
        page(
            "/caf/principle-b1-service-protection",
            principle_page(
                "B1 Service Protection Policies and Processes",
                "B1.a Policy and Process Development",
            ),
        ),
    ])
}

#[tokio::test]
async fn crawl_assembles_linked_pages_in_order() {
    common::init_test_tracing();
    let site = canned_framework();
    let tmp = TempDir::new().unwrap();
    let cfg = ScrapeConfig {
        mode: Mode::Crawl,
        ..config(format!("{BASE}{CAF_PATH}"), &tmp)
    };

    let summary = run(&cfg, &site).await.unwrap();
    assert_eq!(summary.counts.objectives, 2);
    assert_eq!(summary.counts.principles, 3);
    assert_eq!(summary.counts.outcomes, 3);
    assert_eq!(summary.counts.indicators, 9);

    assert_eq!(
        site.requested_paths(),
        [
            CAF_PATH.to_string(),
            format!("{CAF_PATH}/caf-objective-a"),
            "/caf/principle-a1-governance".to_string(),
            "/caf/principle-a2-risk-management".to_string(),
            format!("{CAF_PATH}/caf-objective-b"),
            "/caf/principle-b1-service-protection".to_string(),
        ]
    );

    let value: Value =
        serde_json::from_str(&fs::read_to_string(cfg.output_path()).unwrap()).unwrap();
    let a = &value["objectives"][0];
    assert_eq!(a["title"], "Managing security risk");
    assert_eq!(a["description"], "Objective summary.");
    assert_eq!(a["principles"][0]["id"], "A1");
    assert_eq!(a["principles"][1]["outcomes"][0]["id"], "A2.a");
    assert_eq!(
        a["principles"][0]["outcomes"][0]["description"],
        "Outcome statement."
    );
    assert_eq!(a["principles"][0]["detail"], "Why A1 Governance matters.");
    assert_eq!(
        a["principles"][0]["outcomes"][0]["levels"][1],
        serde_json::json!({ "level": "achieved", "qualifier": "All the following statements are true" })
    );
}

#[tokio::test]
async fn crawl_stops_at_first_missing_page() {
    let mut site = canned_framework();
    site.pages
        .remove(&format!("{BASE}/caf/principle-a2-risk-management"));
    let tmp = TempDir::new().unwrap();
    let cfg = ScrapeConfig {
        mode: Mode::Crawl,
        ..config(format!("{BASE}{CAF_PATH}"), &tmp)
    };

    let err = run(&cfg, &site).await.unwrap_err();
    assert!(matches!(err, CafError::Network(_)), "{err}");
    assert!(!cfg.output_path().exists());
    // Objective B was never visited.
    assert!(
        !site
            .requested_paths()
            .iter()
            .any(|p| p.ends_with("caf-objective-b"))
    );
}
