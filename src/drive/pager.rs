//! Streaming helper that walks the paginated files listing without manual loops.

use async_stream::try_stream;
use futures_core::Stream;
use reqwest::Method;

use super::client::{DriveClient, LIST_FIELDS, PAGE_SIZE};
use super::filters::FileFilter;
use super::types::{DriveError, FileDescriptor, FileListResponse};

/// Stream every descriptor matching `filter`, one page request at a time.
///
/// Entries the backend returns that fail [`FileFilter::matches`] are skipped.
pub fn stream_files<'a>(
    client: &'a DriveClient,
    filter: &'a FileFilter,
) -> impl Stream<Item = Result<FileDescriptor, DriveError>> + 'a {
    try_stream! {
        let query = filter.query();
        let page_size = PAGE_SIZE.to_string();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = vec![
                ("q", query.as_str()),
                ("fields", LIST_FIELDS),
                ("pageSize", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response = client
                .request(Method::GET, "files")
                .query(&params)
                .send()
                .await?;
            let response = client.check_status(response, filter.folder_id()).await?;
            let FileListResponse { files, next_page_token } = response.json().await?;

            for file in files {
                if filter.matches(&file) {
                    yield file;
                } else {
                    tracing::debug!(name = %file.name, mime_type = %file.mime_type, "Skipping entry outside filter");
                }
            }

            match next_page_token.filter(|token| !token.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
    }
}
