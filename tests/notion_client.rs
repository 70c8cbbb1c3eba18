use notion_quiz::content::{flatten_blocks, page_title};
use notion_quiz::notion::{NotionApi, NotionError, NotionHttpClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VERSION: &str = "2022-06-28";

// Search goes out as a page-filtered POST with the user's token and API version.
#[tokio::test]
async fn search_sends_page_filter_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(header("Authorization", "Bearer ntn_abc"))
        .and(header("Notion-Version", VERSION))
        .and(body_json(json!({
            "query": "",
            "filter": { "property": "object", "value": "page" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{
                "object": "page",
                "id": "abc-123",
                "created_time": "2024-01-01T00:00:00.000Z",
                "properties": { "title": { "id": "title", "type": "title", "title": [
                    { "type": "text", "text": { "content": "Physics" }, "plain_text": "Physics" }
                ] } }
            }],
            "next_cursor": null,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionHttpClient::new(server.uri(), VERSION);
    let results = client.search_pages("ntn_abc").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "abc-123");
    assert_eq!(page_title(&results[0]), "Physics");
}

#[tokio::test]
async fn block_children_decodes_known_and_unknown_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/page-9/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [
                { "object": "block", "id": "b1", "has_children": false, "type": "heading_2",
                  "heading_2": { "rich_text": [{ "plain_text": "Laws" }], "is_toggleable": false } },
                { "object": "block", "id": "b1b", "has_children": false },
                { "object": "block", "id": "b2", "has_children": true, "type": "toggle",
                  "toggle": { "rich_text": [{ "plain_text": "hidden" }] } },
                { "object": "block", "id": "b3", "has_children": false, "type": "numbered_list_item",
                  "numbered_list_item": { "rich_text": [{ "plain_text": "Inertia" }] } },
                { "object": "block", "id": "b4", "has_children": false, "type": "numbered_list_item",
                  "numbered_list_item": { "rich_text": [{ "plain_text": "F = ma" }] } }
            ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let client = NotionHttpClient::new(server.uri(), VERSION);
    let blocks = client.block_children("tok", "page-9").await.expect("children");
    // the untyped entry is dropped, the toggle decodes as unsupported
    assert_eq!(blocks.len(), 4);
    assert_eq!(flatten_blocks(&blocks), "## Laws\n1. Inertia\n1. F = ma\n");
}

#[tokio::test]
async fn error_responses_surface_the_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error",
            "status": 401,
            "code": "unauthorized",
            "message": "API token is invalid."
        })))
        .mount(&server)
        .await;

    let client = NotionHttpClient::new(server.uri(), VERSION);
    match client.search_pages("bad").await {
        Err(NotionError::Api { status, code, message }) => {
            assert_eq!(status, 401);
            assert_eq!(code, "unauthorized");
            assert_eq!(message, "API token is invalid.");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_bodies_fall_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/x/children"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = NotionHttpClient::new(server.uri(), VERSION);
    let err = client.block_children("tok", "x").await.unwrap_err();
    assert!(matches!(err, NotionError::Api { status: 502, .. }));
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // nothing listens on port 9 (discard) in the test environment
    let client = NotionHttpClient::new("http://127.0.0.1:9", VERSION);
    let err = client.search_pages("tok").await.unwrap_err();
    assert!(matches!(err, NotionError::Http(_)));
}
