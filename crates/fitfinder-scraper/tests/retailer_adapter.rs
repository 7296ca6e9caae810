//! Integration tests for `RetailerAdapter` against a local `wiremock` server.
//!
//! Each test stands up its own mock storefront and points a profile at it,
//! so channel order, fallbacks, retries, and failure handling are exercised
//! over real HTTP without touching any retailer.

use std::sync::Arc;
use std::time::Duration;

use fitfinder_core::{AttributeQuery, Availability, RetailerProfile};
use fitfinder_scraper::{
    aggregate, BrowserlessSettings, ClientSettings, RetailerAdapter, SearchQuery, SourceAdapter,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A Zara-shaped profile whose endpoints live on `server`.
fn mock_profile(server: &MockServer, with_api: bool) -> RetailerProfile {
    let origin = server.uri();
    RetailerProfile {
        key: "mock".to_string(),
        label: "Mock".to_string(),
        base_origin: origin.clone(),
        api_search_url: with_api.then(|| format!("{origin}/api/search?q={{query}}")),
        page_search_url: format!("{origin}/search?q={{query}}"),
        seo_product_url: None,
        id_product_url: Some(format!("{origin}/product/{{id}}")),
        ..RetailerProfile::zara()
    }
}

/// No transport retries, short request timeout.
fn settings() -> ClientSettings {
    ClientSettings::new(5, "fitfinder-test/0.1", 0, 0)
}

fn adapter(server: &MockServer, with_api: bool) -> RetailerAdapter {
    RetailerAdapter::new(mock_profile(server, with_api), settings())
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><body>{body}</body></html>"))
}

const TILES: &str = r#"
    <article>
      <h2>Black Pleated Skirt</h2>
      <span class="money-amount__main">35,90 EUR</span>
      <a href="/product/111">view</a>
      <img data-src="https://cdn.example.com/111.jpg" src="blank.gif">
    </article>
    <article>
      <h2>Black Wrap Skirt</h2>
      <a href="/product/222">view</a>
    </article>
"#;

// ---------------------------------------------------------------------------
// Channel order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_channel_wins_and_page_is_never_fetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "black skirt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "productGroups": [{"elements": [{"commercialComponents": [
                {"id": 311, "name": "Black Pleated Skirt", "price": 3590, "availability": "in_stock"},
                {"id": 312, "name": "Black Satin Skirt", "price": 45}
            ]}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(TILES))
        .expect(0)
        .mount(&server)
        .await;

    let products = adapter(&server, true)
        .fetch(&SearchQuery::new("black skirt"))
        .await;

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Black Pleated Skirt");
    assert_eq!(products[0].brand, "Mock");
    assert_eq!(products[0].price, "€35.90");
    assert_eq!(products[0].availability, Availability::Available);
    assert_eq!(products[0].product_url, format!("{}/product/311", server.uri()));
    assert_eq!(products[0].attributes.color, "Black");
    assert_eq!(products[1].price, "€45.00");
}

#[tokio::test]
async fn empty_api_falls_back_to_structured_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(&format!(
            r#"<script type="application/ld+json">{}</script>{TILES}"#,
            json!({
                "@type": "ItemList",
                "itemListElement": [{
                    "@type": "ListItem",
                    "item": {
                        "@type": "Product",
                        "name": "Navy Midi Skirt",
                        "image": ["http://cdn.example.com/navy.jpg"],
                        "offers": {"price": "39.99"}
                    }
                }]
            })
        )))
        .mount(&server)
        .await;

    let products = adapter(&server, true)
        .fetch(&SearchQuery::new("navy skirt"))
        .await;

    assert_eq!(products.len(), 1, "structured data must not be merged with tiles");
    assert_eq!(products[0].name, "Navy Midi Skirt");
    assert_eq!(products[0].price, "€39.99");
    assert_eq!(products[0].image_url, "https://cdn.example.com/navy.jpg");
    assert_eq!(products[0].attributes.length, "Midi");
}

#[tokio::test]
async fn failing_api_falls_back_to_dom_tiles() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(TILES))
        .mount(&server)
        .await;

    let products = adapter(&server, true)
        .fetch(&SearchQuery::new("black skirt"))
        .await;

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Black Pleated Skirt");
    assert_eq!(products[0].price, "€35.90");
    assert_eq!(products[0].image_url, "https://cdn.example.com/111.jpg");
    assert_eq!(products[0].product_url, format!("{}/product/111", server.uri()));
    assert_eq!(products[1].price, "Price not available");
    assert_eq!(products[1].image_url, "");
}

// ---------------------------------------------------------------------------
// Simplification retry over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_search_is_retried_once_with_two_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "black pleated satin skirt"))
        .respond_with(html_page("<p>No results</p>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "black pleated"))
        .respond_with(html_page(TILES))
        .expect(1)
        .mount(&server)
        .await;

    let products = adapter(&server, false)
        .fetch(&SearchQuery::new("black pleated satin skirt"))
        .await;

    assert_eq!(products.len(), 2);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn still_empty_after_retry_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page("<p>No results</p>"))
        .expect(2)
        .mount(&server)
        .await;

    let products = adapter(&server, false)
        .fetch(&SearchQuery::new("black pleated satin skirt"))
        .await;

    assert!(products.is_empty());
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_page_yields_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let products = adapter(&server, false)
        .fetch(&SearchQuery::new("skirt"))
        .await;

    assert!(products.is_empty());
}

#[tokio::test]
async fn rate_limited_page_is_retried_at_transport_level() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(TILES))
        .mount(&server)
        .await;

    let adapter = RetailerAdapter::new(
        mock_profile(&server, false),
        ClientSettings::new(5, "fitfinder-test/0.1", 1, 0),
    );
    let products = adapter.fetch(&SearchQuery::new("skirt")).await;

    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn slow_retailer_times_out_to_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(TILES).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let adapter = adapter(&server, false).with_fetch_timeout(Duration::from_millis(200));
    let products = adapter.fetch(&SearchQuery::new("skirt")).await;

    assert!(products.is_empty());
}

// ---------------------------------------------------------------------------
// Browserless rendering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pages_are_rendered_through_browserless_when_configured() {
    let storefront = MockServer::start().await;
    let renderer = MockServer::start().await;
    let page_url = format!("{}/search?q=skirt", storefront.uri());

    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "secret"))
        .and(body_json(json!({"url": page_url})))
        .respond_with(html_page(TILES))
        .expect(1)
        .mount(&renderer)
        .await;

    let settings = settings().with_browserless(Some(BrowserlessSettings::new(
        &format!("{}/", renderer.uri()),
        Some("secret"),
    )));
    let adapter = RetailerAdapter::new(mock_profile(&storefront, false), settings);
    let products = adapter.fetch(&SearchQuery::new("skirt")).await;

    assert_eq!(products.len(), 2);
    let direct = storefront.received_requests().await.unwrap_or_default();
    assert!(direct.is_empty(), "storefront must not be hit directly");
}

// ---------------------------------------------------------------------------
// Aggregation over real adapters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn aggregate_isolates_a_broken_retailer() {
    let healthy = MockServer::start().await;
    let broken = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(TILES))
        .mount(&healthy)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    let broken_profile = RetailerProfile {
        key: "broken".to_string(),
        label: "Broken".to_string(),
        ..mock_profile(&broken, true)
    };
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(adapter(&healthy, false)),
        Arc::new(RetailerAdapter::new(broken_profile, settings())),
    ];
    let query = AttributeQuery::new("skirt").with_attribute("color", "black");

    let result = aggregate(&query, &adapters).await;

    assert_eq!(result.query, "black skirt");
    assert_eq!(result.items.len(), 2);
    assert!(result.items.iter().all(|p| p.retailer == "mock"));
    assert!(result.items.iter().all(|p| p.brand == "Mock"));
}
