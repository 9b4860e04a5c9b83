//! Content client and gallery helpers against a mock content service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gallery_auth::{AuthResolver, Credential, FetchedToken, TokenCache, TokenSource};
use gallery_config::ContentConfig;
use gallery_content::{
    CallContext, Category, ClientFactory, ContentClient, ContentMode, category_query, gallery,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const DELIVERY: &str = "/content/published/api/v1.1";

/// Hands out `Bearer t1`, `Bearer t2`, ... each living one second, so every
/// lookup is already inside the refresh window.
#[derive(Debug, Default)]
struct SequenceSource {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenSource for SequenceSource {
    async fn fetch_token(&self) -> gallery_auth::Result<FetchedToken> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(FetchedToken {
            credential: Credential::bearer(&format!("t{}", n)),
            expires_in: Duration::from_secs(1),
        })
    }
}

fn content_config(server: &MockServer) -> ContentConfig {
    ContentConfig {
        server_url: server.uri(),
        channel_token: "chan".to_string(),
        ..Default::default()
    }
}

fn client(server: &MockServer) -> ContentClient {
    ContentClient::builder()
        .base_url(server.uri())
        .channel_token("chan")
        .build()
        .unwrap()
}

fn item(id: &str) -> serde_json::Value {
    json!({"id": id, "name": format!("{}.jpg", id), "type": "DigitalAsset"})
}

fn category(id: &str) -> Category {
    Category {
        id: id.to_string(),
        name: id.to_string(),
        api_name: None,
        description: None,
    }
}

#[tokio::test]
async fn test_channel_token_on_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/taxonomies", DELIVERY)))
        .and(query_param("channelToken", "chan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "TAX1", "name": "Travel"}],
            "hasMore": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let taxonomies = client(&server).taxonomies().list().await.unwrap();
    assert_eq!(taxonomies.items.len(), 1);
    assert_eq!(taxonomies.items[0].name, "Travel");
}

#[tokio::test]
async fn test_preview_mode_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content/preview/api/v1.1/items/CONT1"))
        .and(query_param("fields", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item("CONT1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ContentClient::builder()
        .base_url(server.uri())
        .channel_token("chan")
        .mode(ContentMode::Preview)
        .build()
        .unwrap();

    let item = client.items().get("CONT1").await.unwrap();
    assert_eq!(item.id, "CONT1");
}

#[tokio::test]
async fn test_server_client_fresh_credential_per_request() {
    let server = MockServer::start().await;

    for token in ["Bearer t1", "Bearer t2"] {
        Mock::given(method("GET"))
            .and(path(format!("{}/taxonomies", DELIVERY)))
            .and(header("authorization", token))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let auth = Arc::new(AuthResolver::with_token_cache(TokenCache::new(
        SequenceSource::default(),
    )));
    let proxy = Url::parse("http://127.0.0.1:8080/api/").unwrap();
    let factory = ClientFactory::new(content_config(&server), proxy, auth);

    let client = factory.get_client(CallContext::Server).unwrap();
    client.taxonomies().list().await.unwrap();

    // Same memoized client, new credential.
    let client = factory.get_client(CallContext::Server).unwrap();
    client.taxonomies().list().await.unwrap();
}

#[tokio::test]
async fn test_browser_client_goes_through_proxy_without_credentials() {
    let upstream = MockServer::start().await;
    let proxy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api{}/taxonomies", DELIVERY)))
        .and(query_param("channelToken", "chan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&proxy)
        .await;

    let auth = Arc::new(AuthResolver::with_static("Basic dXNlcjpwYXNz"));
    let proxy_url = Url::parse(&format!("{}/api/", proxy.uri())).unwrap();
    let factory = ClientFactory::new(content_config(&upstream), proxy_url, auth);

    let client = factory.get_client(CallContext::Browser).unwrap();
    client.taxonomies().list().await.unwrap();

    let received = proxy.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_not_found_maps_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/items/MISSING", DELIVERY)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "title": "Not Found",
            "detail": "Item MISSING does not exist",
            "o:errorCode": "OCE-DELIVERY-ITEM-001"
        })))
        .mount(&server)
        .await;

    let err = client(&server).items().get("MISSING").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("MISSING"));

    assert!(gallery::fetch_item(&client(&server), "MISSING").await.is_none());
}

#[tokio::test]
async fn test_ids_are_escaped_in_paths() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/items/a%2F..%2Fb%3Fc", DELIVERY)))
        .and(query_param("fields", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item("a/../b?c")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/taxonomies/TAX%201/categories", DELIVERY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let fetched = client.items().get("a/../b?c").await.unwrap();
    assert_eq!(fetched.id, "a/../b?c");
    client.taxonomies().categories("TAX 1").await.unwrap();

    assert!(client.items().get("..").await.is_err());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_items_for_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/items", DELIVERY)))
        .and(query_param("q", category_query("CAT1")))
        .and(query_param("limit", "4"))
        .and(query_param("totalResults", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [item("a"), item("b")],
            "totalResults": 17
        })))
        .mount(&server)
        .await;

    let preview = gallery::fetch_items_for_category(&client(&server), "CAT1", 4)
        .await
        .unwrap();
    assert_eq!(preview.category_id, "CAT1");
    assert_eq!(preview.total_results, 17);
    assert_eq!(preview.items.len(), 2);
}

#[tokio::test]
async fn test_category_previews_keep_input_order() {
    let server = MockServer::start().await;

    // The first category answers last.
    let delays = [("CAT1", 300), ("CAT2", 100), ("CAT3", 0)];
    for (id, delay) in delays {
        Mock::given(method("GET"))
            .and(path(format!("{}/items", DELIVERY)))
            .and(query_param("q", category_query(id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"items": [item(id)], "totalResults": 1}))
                    .set_delay(Duration::from_millis(delay)),
            )
            .mount(&server)
            .await;
    }

    let categories: Vec<Category> = delays.iter().map(|(id, _)| category(id)).collect();
    let previews = gallery::fetch_category_previews(&client(&server), &categories, 4, 3).await;

    assert_eq!(previews.len(), 3);
    let ids: Vec<&str> = previews
        .iter()
        .map(|p| p.as_ref().unwrap().category_id.as_str())
        .collect();
    assert_eq!(ids, ["CAT1", "CAT2", "CAT3"]);
}

/// Records when each request arrives and answers after a fixed delay.
struct ArrivalLog {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for ArrivalLog {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_json(json!({"items": [], "totalResults": 0}))
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_category_previews_bound_in_flight_requests() {
    let server = MockServer::start().await;
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let delay = Duration::from_millis(200);

    Mock::given(method("GET"))
        .and(path(format!("{}/items", DELIVERY)))
        .respond_with(ArrivalLog {
            arrivals: arrivals.clone(),
            delay,
        })
        .expect(6)
        .mount(&server)
        .await;

    let categories: Vec<Category> = (1..=6).map(|n| category(&format!("CAT{}", n))).collect();
    let previews = gallery::fetch_category_previews(&client(&server), &categories, 4, 2).await;
    assert_eq!(previews.len(), 6);
    assert!(previews.iter().all(Option::is_some));

    // Every request stays open for `delay`, so any arrivals closer together
    // than that overlapped.
    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    let window = delay * 3 / 4;
    let max_overlapping = (0..arrivals.len())
        .map(|i| {
            arrivals[i..]
                .iter()
                .take_while(|at| at.duration_since(arrivals[i]) < window)
                .count()
        })
        .max()
        .unwrap();
    assert_eq!(max_overlapping, 2);
}

#[tokio::test]
async fn test_category_previews_failures_are_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/items", DELIVERY)))
        .and(query_param("q", category_query("OK")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [item("x")]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/items", DELIVERY)))
        .and(query_param("q", category_query("BROKEN")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let categories = [category("BROKEN"), category("OK")];
    let previews = gallery::fetch_category_previews(&client(&server), &categories, 4, 1).await;

    assert_eq!(previews.len(), 2);
    assert!(previews[0].is_none());
    let ok = previews[1].as_ref().unwrap();
    // No totalResults in the response: fall back to what arrived.
    assert_eq!(ok.total_results, 1);
}

#[tokio::test]
async fn test_all_categories_skip_failed_taxonomies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/taxonomies/TAX1/categories", DELIVERY)))
        .and(query_param("orderBy", "position:asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "C1", "name": "Beaches"}, {"id": "C2", "name": "Cities"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/taxonomies/TAX2/categories", DELIVERY)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let taxonomies = vec![
        gallery_content::Taxonomy {
            id: "TAX1".to_string(),
            name: "Travel".to_string(),
            short_name: None,
            description: None,
        },
        gallery_content::Taxonomy {
            id: "TAX2".to_string(),
            name: "Food".to_string(),
            short_name: None,
            description: None,
        },
    ];

    let categories = gallery::fetch_all_categories(&client(&server), &taxonomies, 2).await;
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Beaches", "Cities"]);
}
