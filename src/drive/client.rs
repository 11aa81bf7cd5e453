//! HTTP client wrapper for the Drive v3 files API.

use crate::config::get_config;
use crate::drive::{
    filters::FileFilter,
    pager::stream_files,
    source::FolderSource,
    types::{DriveError, FileDescriptor, FolderInfo},
};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::{Client, Method, StatusCode, Url};

pub(crate) const LIST_FIELDS: &str =
    "nextPageToken,files(id,name,mimeType,size,createdTime,modifiedTime)";
pub(crate) const FOLDER_FIELDS: &str = "id,name,mimeType,createdTime";
pub(crate) const PAGE_SIZE: usize = 100;

/// Lightweight HTTP client for the Drive files API.
pub struct DriveClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) access_token: String,
}

impl DriveClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, DriveError> {
        let config = get_config();
        Self::with_base_url(&config.drive_api_url, config.drive_access_token.clone())
    }

    /// Construct a client against an explicit base URL and bearer token.
    pub fn with_base_url(base_url: &str, access_token: String) -> Result<Self, DriveError> {
        let client = Client::builder()
            .user_agent("drivedigest/0.1")
            .build()?;
        let base_url = normalize_base_url(base_url).map_err(DriveError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_token = !access_token.is_empty(),
            "Initialized Drive HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// List every entry matching `filter`, following pagination to the end.
    pub async fn list_files(&self, filter: &FileFilter) -> Result<Vec<FileDescriptor>, DriveError> {
        let files: Vec<FileDescriptor> = stream_files(self, filter).try_collect().await?;
        tracing::debug!(
            folder = filter.folder_id(),
            count = files.len(),
            "Listed folder"
        );
        Ok(files)
    }

    /// Download a file's full content.
    pub async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        let response = self
            .file_request(Method::GET, file_id)?
            .query(&[("alt", "media")])
            .send()
            .await?;

        let response = self.check_status(response, file_id).await?;
        let bytes = response.bytes().await?;
        tracing::debug!(file_id, bytes = bytes.len(), "Downloaded file");
        Ok(bytes.to_vec())
    }

    /// Fetch display metadata for a folder.
    pub async fn folder_metadata(&self, folder_id: &str) -> Result<FolderInfo, DriveError> {
        let response = self
            .file_request(Method::GET, folder_id)?
            .query(&[("fields", FOLDER_FIELDS)])
            .send()
            .await?;

        let response = self.check_status(response, folder_id).await?;
        Ok(response.json().await?)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.authorized(self.client.request(method, url))
    }

    /// Request against `files/{id}`. The id travels as a single escaped path segment, so
    /// `/`, `?` and `..` inside it never leave the files collection.
    fn file_request(
        &self,
        method: Method,
        file_id: &str,
    ) -> Result<reqwest::RequestBuilder, DriveError> {
        // `push` drops dot segments, which would address the collection itself.
        if matches!(file_id, "" | "." | "..") {
            return Err(DriveError::NotFound(file_id.to_string()));
        }
        let endpoint = format_endpoint(&self.base_url, "files");
        let mut url =
            Url::parse(&endpoint).map_err(|err| DriveError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| DriveError::InvalidUrl(endpoint.clone()))?
            .push(file_id);
        Ok(self.authorized(self.client.request(method, url)))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.access_token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.access_token)
        }
    }

    pub(crate) async fn check_status(
        &self,
        response: reqwest::Response,
        item: &str,
    ) -> Result<reqwest::Response, DriveError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => {
                tracing::warn!(item, "Drive item not found");
                Err(DriveError::NotFound(item.to_string()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = DriveError::Transport(format!("unexpected status {status}: {body}"));
                tracing::error!(item, error = %error, "Drive request failed");
                Err(error)
            }
        }
    }
}

#[async_trait]
impl FolderSource for DriveClient {
    async fn list(&self, filter: &FileFilter) -> Result<Vec<FileDescriptor>, DriveError> {
        DriveClient::list_files(self, filter).await
    }

    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        DriveClient::download(self, file_id).await
    }

    async fn metadata(&self, folder_id: &str) -> Result<FolderInfo, DriveError> {
        DriveClient::folder_metadata(self, folder_id).await
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

pub(crate) fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::FileKind;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn client_for(server: &MockServer) -> DriveClient {
        DriveClient::with_base_url(&server.base_url(), "token-123".into()).expect("client")
    }

    #[tokio::test]
    async fn list_follows_page_tokens_and_keeps_order() {
        let server = MockServer::start_async().await;
        let filter = FileFilter::new("folder-1", &[FileKind::Txt]);

        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files")
                    .query_param("pageToken", "page-2")
                    .header("authorization", "Bearer token-123");
                then.status(200).json_body(json!({
                    "files": [
                        { "id": "3", "name": "c.txt", "mimeType": "text/plain", "size": "3" }
                    ]
                }));
            })
            .await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files")
                    .query_param("q", filter.query())
                    .query_param("pageSize", "100");
                then.status(200).json_body(json!({
                    "nextPageToken": "page-2",
                    "files": [
                        { "id": "1", "name": "a.txt", "mimeType": "text/plain", "size": "1" },
                        { "id": "2", "name": "b.pdf", "mimeType": "application/pdf", "size": "2" }
                    ]
                }));
            })
            .await;

        let client = client_for(&server);
        let files = client.list_files(&filter).await.expect("listing");

        first.assert_async().await;
        second.assert_async().await;
        let ids: Vec<_> = files.iter().map(|file| file.id.as_str()).collect();
        // b.pdf is outside the requested kinds and is dropped by the local predicate.
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn list_surfaces_auth_failures_as_transport_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files");
                then.status(401).body("invalid credentials");
            })
            .await;

        let error = client_for(&server)
            .list_files(&FileFilter::new("folder-1", &[]))
            .await
            .expect_err("auth failure");

        assert!(matches!(error, DriveError::Transport(message) if message.contains("401")));
    }

    #[tokio::test]
    async fn download_returns_full_body_and_maps_missing_ids() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/known").query_param("alt", "media");
                then.status(200).body("file contents");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/missing");
                then.status(404).body("not found");
            })
            .await;

        let client = client_for(&server);
        let bytes = client.download("known").await.expect("download");
        assert_eq!(bytes, b"file contents");

        let error = client.download("missing").await.expect_err("missing file");
        assert!(matches!(error, DriveError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn folder_metadata_parses_display_fields() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files/folder-1")
                    .query_param("fields", FOLDER_FIELDS);
                then.status(200).json_body(json!({
                    "id": "folder-1",
                    "name": "Reports",
                    "mimeType": "application/vnd.google-apps.folder",
                    "createdTime": "2024-03-01T10:00:00.000Z"
                }));
            })
            .await;

        let info = client_for(&server)
            .folder_metadata("folder-1")
            .await
            .expect("metadata");

        assert_eq!(info.name, "Reports");
        assert_eq!(info.created_time.as_deref(), Some("2024-03-01T10:00:00.000Z"));
    }

    #[tokio::test]
    async fn ids_with_path_characters_stay_inside_files() {
        let server = MockServer::start_async().await;
        let about = server
            .mock_async(|when, then| {
                when.method(GET).path("/about");
                then.status(200).json_body(json!({
                    "id": "leak",
                    "name": "not a folder",
                    "mimeType": "x"
                }));
            })
            .await;
        let sibling = server
            .mock_async(|when, then| {
                when.method(GET).path("/files/a").query_param("alt", "media");
                then.status(200).body("wrong file");
            })
            .await;

        let client = client_for(&server);
        let error = client
            .folder_metadata("../about")
            .await
            .expect_err("escaped id is not a known folder");
        assert!(matches!(error, DriveError::NotFound(id) if id == "../about"));
        assert!(client.download("a?alt=x").await.is_err());
        let error = client.folder_metadata("..").await.expect_err("dot id");
        assert!(matches!(error, DriveError::NotFound(id) if id == ".."));

        assert_eq!(about.hits_async().await, 0);
        assert_eq!(sibling.hits_async().await, 0);
    }
}
