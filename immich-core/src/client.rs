use std::fmt;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum ImmichError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct ImmichClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl ImmichClient {
    /// `base_url` is the API root, e.g. `https://photos.example/api`.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ImmichError> {
        let mut base_url = Url::parse(base_url)?;
        // Keep relative joins under the API root.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_libraries(&self) -> Result<Vec<Library>, ImmichError> {
        let url = self.endpoint("libraries")?;
        let response = self.authorized(self.http.get(url)).send().await?;
        Self::handle_response(response).await
    }

    pub async fn scan_library(&self, library_id: &str) -> Result<(), ImmichError> {
        let url = self.endpoint(&format!("libraries/{library_id}/scan"))?;
        let response = self.authorized(self.http.post(url)).send().await?;
        Self::handle_empty_response(response).await
    }

    pub async fn list_albums(&self) -> Result<Vec<Album>, ImmichError> {
        let url = self.endpoint("albums")?;
        let response = self.authorized(self.http.get(url)).send().await?;
        Self::handle_response(response).await
    }

    pub async fn create_album(&self, album_name: &str) -> Result<Album, ImmichError> {
        let url = self.endpoint("albums")?;
        let response = self
            .authorized(self.http.post(url))
            .json(&CreateAlbumRequest { album_name })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn get_album_info(&self, album_id: &str) -> Result<AlbumDetail, ImmichError> {
        let url = self.endpoint(&format!("albums/{album_id}"))?;
        let response = self.authorized(self.http.get(url)).send().await?;
        Self::handle_response(response).await
    }

    /// Returns the assets the server matches against `original_path`,
    /// following result pages until the server stops handing out `nextPage`.
    /// The server's match is not exact equality; callers compare
    /// [`Asset::original_path`] themselves.
    pub async fn search_metadata_by_path(
        &self,
        original_path: &str,
    ) -> Result<Vec<Asset>, ImmichError> {
        let url = self.endpoint("search/metadata")?;
        let mut page = 1u32;
        let mut items = Vec::new();
        loop {
            let response = self
                .authorized(self.http.post(url.clone()))
                .json(&MetadataSearchRequest {
                    original_path,
                    page,
                })
                .send()
                .await?;
            let payload: SearchResponse = Self::handle_response(response).await?;
            let next_page = payload
                .assets
                .next_page
                .as_deref()
                .and_then(|value| value.parse::<u32>().ok());
            let fetched = payload.assets.items.len();
            items.extend(payload.assets.items);
            match next_page {
                Some(next) if next > page && fetched > 0 => page = next,
                _ => break,
            }
        }
        Ok(items)
    }

    /// Adds `asset_ids` to the album. The server reports assets that are
    /// already members as `duplicate`; see [`BulkIdResponse::is_present`].
    pub async fn add_assets_to_album(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<Vec<BulkIdResponse>, ImmichError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint(&format!("albums/{album_id}/assets"))?;
        let response = self
            .authorized(self.http.put(url))
            .json(&BulkIdsRequest { ids: asset_ids })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .header("Accept", "application/json")
    }

    fn endpoint(&self, path: &str) -> Result<Url, ImmichError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ImmichError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ImmichError::Api { status, body })
        }
    }

    async fn handle_empty_response(response: reqwest::Response) -> Result<(), ImmichError> {
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ImmichError::Api { status, body })
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub import_paths: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub album_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    pub id: String,
    pub album_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub original_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkIdError {
    Duplicate,
    NoPermission,
    NotFound,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BulkIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BulkIdError::Duplicate => "duplicate",
            BulkIdError::NoPermission => "no_permission",
            BulkIdError::NotFound => "not_found",
            BulkIdError::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BulkIdResponse {
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<BulkIdError>,
}

impl BulkIdResponse {
    /// True when the asset ended up in the album, whether added now or earlier.
    pub fn is_present(&self) -> bool {
        self.success || self.error == Some(BulkIdError::Duplicate)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAlbumRequest<'a> {
    album_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataSearchRequest<'a> {
    original_path: &'a str,
    page: u32,
}

#[derive(Debug, Serialize)]
struct BulkIdsRequest<'a> {
    ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    assets: SearchAssetPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchAssetPage {
    #[serde(default)]
    items: Vec<Asset>,
    #[serde(default)]
    next_page: Option<String>,
}
