use immich_core::{BulkIdError, ImmichClient, ImmichError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ImmichClient {
    ImmichClient::new(&format!("{}/api", server.uri()), "test-key").unwrap()
}

#[tokio::test]
async fn list_libraries_includes_api_key_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/libraries"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "lib-1",
                "name": "Archive",
                "importPaths": ["/mnt/media/Projects", "/mnt/media/Other"],
                "ownerId": "user-1"
            },
            {
                "id": "lib-2",
                "name": "Phone"
            }
        ])))
        .mount(&server)
        .await;

    let libraries = client_for(&server).list_libraries().await.unwrap();

    assert_eq!(libraries.len(), 2);
    assert_eq!(libraries[0].name, "Archive");
    assert_eq!(
        libraries[0].import_paths.as_deref(),
        Some(&["/mnt/media/Projects".to_string(), "/mnt/media/Other".to_string()][..])
    );
    assert!(libraries[1].import_paths.is_none());
}

#[tokio::test]
async fn scan_library_accepts_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/libraries/lib-1/scan"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).scan_library("lib-1").await.unwrap();
}

#[tokio::test]
async fn create_album_posts_album_name() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/albums"))
        .and(body_json(json!({ "albumName": "Trip / Export" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "album-9",
            "albumName": "Trip / Export",
            "assetCount": 0
        })))
        .mount(&server)
        .await;

    let album = client_for(&server)
        .create_album("Trip / Export")
        .await
        .unwrap();

    assert_eq!(album.id, "album-9");
    assert_eq!(album.album_name, "Trip / Export");
}

#[tokio::test]
async fn get_album_info_returns_assets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/albums/album-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "album-1",
            "albumName": "Trip",
            "assets": [
                { "id": "a1", "originalPath": "/media/Trip/IMG_1.JPG", "type": "IMAGE" }
            ]
        })))
        .mount(&server)
        .await;

    let detail = client_for(&server).get_album_info("album-1").await.unwrap();

    assert_eq!(detail.album_name, "Trip");
    assert_eq!(detail.assets.len(), 1);
    assert_eq!(detail.assets[0].original_path, "/media/Trip/IMG_1.JPG");
}

#[tokio::test]
async fn search_metadata_follows_next_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search/metadata"))
        .and(body_json(json!({ "originalPath": "/media/A.JPG", "page": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "albums": { "items": [], "total": 0, "count": 0 },
            "assets": {
                "items": [{ "id": "a1", "originalPath": "/media/A.JPG" }],
                "total": 2,
                "count": 1,
                "nextPage": "2"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/search/metadata"))
        .and(body_json(json!({ "originalPath": "/media/A.JPG", "page": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "albums": { "items": [], "total": 0, "count": 0 },
            "assets": {
                "items": [{ "id": "a2", "originalPath": "/media/A.JPG" }],
                "total": 2,
                "count": 1,
                "nextPage": null
            }
        })))
        .mount(&server)
        .await;

    let assets = client_for(&server)
        .search_metadata_by_path("/media/A.JPG")
        .await
        .unwrap();

    let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2"]);
}

#[tokio::test]
async fn add_assets_to_album_parses_bulk_response() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/albums/album-1/assets"))
        .and(body_json(json!({ "ids": ["a1", "a2", "a3"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a1", "success": true },
            { "id": "a2", "success": false, "error": "duplicate" },
            { "id": "a3", "success": false, "error": "something_new" }
        ])))
        .mount(&server)
        .await;

    let ids = vec!["a1".to_string(), "a2".to_string(), "a3".to_string()];
    let results = client_for(&server)
        .add_assets_to_album("album-1", &ids)
        .await
        .unwrap();

    assert!(results[0].is_present());
    assert!(results[1].is_present());
    assert_eq!(results[1].error, Some(BulkIdError::Duplicate));
    assert!(!results[2].is_present());
    assert_eq!(results[2].error, Some(BulkIdError::Unknown));
}

#[tokio::test]
async fn add_assets_to_album_skips_request_for_empty_ids() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let results = client_for(&server)
        .add_assets_to_album("album-1", &[])
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn api_errors_carry_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/albums"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_albums().await.unwrap_err();

    assert!(matches!(
        err,
        ImmichError::Api { status, ref body }
            if status == reqwest::StatusCode::UNAUTHORIZED && body == "invalid api key"
    ));
}
