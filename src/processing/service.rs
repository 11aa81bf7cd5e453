//! Batch orchestrator coordinating listing, download, extraction, and summarization.

use crate::{
    config::{Config, SummarizationProvider, get_config},
    drive::{DriveClient, DriveError, FileDescriptor, FileFilter, FileKind, FolderInfo, FolderSource, view_url},
    extraction::{self, ExtractionError},
    metrics::{BatchMetrics, MetricsSnapshot},
    processing::{
        staging::StagedFile,
        types::{BatchError, FileError, ResultSet, SummaryResult},
    },
    summarization::Summarizer,
};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

/// Knobs that shape the per-file pipeline.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Directory where downloads are staged.
    pub download_dir: PathBuf,
    /// Minimum trimmed length extracted text must reach to be summarized.
    pub min_text_length: usize,
}

impl BatchSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        Self {
            download_dir: config.download_dir.clone(),
            min_text_length: config.min_text_length,
        }
    }
}

/// Credential presence for the collaborators a batch depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    /// Whether a Drive access token is configured.
    pub google_drive: bool,
    /// Whether the selected summarization provider has what it needs to be called.
    pub summarizer: bool,
    /// Label of the selected summarization provider.
    pub provider: String,
}

impl ServiceHealth {
    /// Derive credential presence from `config` without contacting any backend.
    pub fn from_config(config: &Config) -> Self {
        let summarizer = match config.summarization_provider {
            SummarizationProvider::OpenAI => config
                .openai_api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty()),
            SummarizationProvider::Ollama => !config.ollama_url.trim().is_empty(),
        };
        Self {
            google_drive: !config.drive_access_token.trim().is_empty(),
            summarizer,
            provider: config.summarization_provider.as_str().to_string(),
        }
    }
}

/// Runs one batch at a time: list, then for each file download, extract, and summarize.
///
/// Files are processed strictly sequentially in listing order, with at most one staged
/// download on disk. A failure in any per-file stage becomes an `error` row and never aborts
/// the batch; only a listing failure does. Construct it once and share it through an `Arc`.
pub struct BatchOrchestrator {
    source: Arc<dyn FolderSource>,
    summarizer: Summarizer,
    settings: BatchSettings,
    metrics: Arc<BatchMetrics>,
    health: ServiceHealth,
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait BatchApi: Send + Sync {
    /// Run a batch over `folder_id`, restricted to `kinds` when non-empty.
    async fn run_batch(&self, folder_id: &str, kinds: &[FileKind]) -> Result<ResultSet, BatchError>;

    /// Fetch display metadata for a folder.
    async fn folder_metadata(&self, folder_id: &str) -> Result<FolderInfo, BatchError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;

    /// Report credential presence for the Drive backend and the summarization provider.
    fn health(&self) -> ServiceHealth;
}

impl BatchOrchestrator {
    /// Wire an orchestrator from explicit collaborators.
    pub fn new(source: Arc<dyn FolderSource>, summarizer: Summarizer, settings: BatchSettings) -> Self {
        let health = ServiceHealth {
            google_drive: true,
            summarizer: true,
            provider: summarizer.provider_name().to_string(),
        };
        Self {
            source,
            summarizer,
            settings,
            metrics: Arc::new(BatchMetrics::new()),
            health,
        }
    }

    /// Replace the reported credential status.
    pub fn with_health(mut self, health: ServiceHealth) -> Self {
        self.health = health;
        self
    }

    /// Build an orchestrator backed by the Drive API and the configured summarization provider.
    pub fn from_config() -> Result<Self, DriveError> {
        tracing::info!("Initializing Drive client");
        let drive = DriveClient::new()?;
        let summarizer = Summarizer::from_config();
        tracing::info!(
            model = %summarizer.settings().model,
            "Summarizer initialized"
        );
        Ok(Self::new(Arc::new(drive), summarizer, BatchSettings::from_config())
            .with_health(ServiceHealth::from_config(get_config())))
    }

    /// Process every file in `folder_id` matching `kinds` and return the ordered results.
    pub async fn run(&self, folder_id: &str, kinds: &[FileKind]) -> Result<ResultSet, BatchError> {
        let batch_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("batch", %batch_id, folder = folder_id);
        self.run_inner(folder_id, kinds).instrument(span).await
    }

    async fn run_inner(&self, folder_id: &str, kinds: &[FileKind]) -> Result<ResultSet, BatchError> {
        let filter = FileFilter::new(folder_id, kinds);
        let files = self.source.list(&filter).await.map_err(|error| {
            tracing::error!(error = %error, "Listing failed; aborting batch");
            BatchError::Listing(error)
        })?;

        if files.is_empty() {
            tracing::info!("No matching files");
            self.metrics.record_batch(0, 0);
            return Ok(ResultSet::empty());
        }

        tracing::info!(files = files.len(), "Processing batch");
        let mut results = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let url = Some(view_url(&file.id));
            let row = match self.process_file(file).await {
                Ok(summary) => {
                    tracing::info!(index, name = %file.name, "File summarized");
                    SummaryResult::success(file, summary, url)
                }
                Err(error) => {
                    tracing::warn!(index, name = %file.name, error = %error, "File failed");
                    SummaryResult::failure(file, &error, url)
                }
            };
            results.push(row);
        }

        debug_assert_eq!(results.len(), files.len());
        let result_set = ResultSet::from_results(results);
        self.metrics.record_batch(
            result_set.success_count() as u64,
            result_set.error_count() as u64,
        );
        tracing::info!(
            total = result_set.total_files,
            succeeded = result_set.success_count(),
            failed = result_set.error_count(),
            "Batch completed"
        );
        Ok(result_set)
    }

    /// Download, stage, extract, gate, and summarize one file.
    async fn process_file(&self, file: &FileDescriptor) -> Result<String, FileError> {
        let bytes = self.source.fetch(&file.id).await?;
        let staged = StagedFile::write(&self.settings.download_dir, &file.name, &bytes)?;
        drop(bytes);

        let extracted = extract_staged(staged.path_buf(), file.name.clone()).await;
        staged.remove();
        let text = extracted?;

        if !extraction::is_valid(&text, self.settings.min_text_length) {
            return Err(FileError::InsufficientText {
                min_length: self.settings.min_text_length,
            });
        }

        Ok(self.summarizer.summarize(&text, &file.name).await?)
    }

    /// Fetch display metadata for a folder.
    pub async fn folder_metadata(&self, folder_id: &str) -> Result<FolderInfo, BatchError> {
        self.source
            .metadata(folder_id)
            .await
            .map_err(BatchError::Metadata)
    }

    /// Return the current batch metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

async fn extract_staged(path: PathBuf, name: String) -> Result<String, FileError> {
    let outcome: Result<String, ExtractionError> =
        tokio::task::spawn_blocking(move || extraction::extract_file_as(&path, &name))
            .await
            .map_err(|error| FileError::Worker(error.to_string()))?;
    Ok(outcome?)
}

#[async_trait]
impl BatchApi for BatchOrchestrator {
    async fn run_batch(&self, folder_id: &str, kinds: &[FileKind]) -> Result<ResultSet, BatchError> {
        BatchOrchestrator::run(self, folder_id, kinds).await
    }

    async fn folder_metadata(&self, folder_id: &str) -> Result<FolderInfo, BatchError> {
        BatchOrchestrator::folder_metadata(self, folder_id).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        BatchOrchestrator::metrics_snapshot(self)
    }

    fn health(&self) -> ServiceHealth {
        self.health.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fixtures::{docx_with_paragraphs, pdf_with_pages};
    use crate::processing::types::FileStatus;
    use crate::summarization::Summarizer;
    use crate::summarization::summarizer::testing::{ScriptedClient, settings};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory folder backend that applies the same filter predicate as the Drive client.
    struct FakeFolder {
        files: Vec<FileDescriptor>,
        contents: HashMap<String, Vec<u8>>,
        list_error: Option<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeFolder {
        fn new(entries: Vec<(&str, &str, Vec<u8>)>) -> Self {
            let mut files = Vec::new();
            let mut contents = HashMap::new();
            for (index, (name, mime_type, bytes)) in entries.into_iter().enumerate() {
                let id = format!("id-{index}");
                files.push(FileDescriptor {
                    id: id.clone(),
                    name: name.into(),
                    mime_type: mime_type.into(),
                    size: Some(bytes.len().to_string()),
                    created_time: None,
                    modified_time: None,
                });
                contents.insert(id, bytes);
            }
            Self {
                files,
                contents,
                list_error: None,
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FolderSource for FakeFolder {
        async fn list(&self, filter: &FileFilter) -> Result<Vec<FileDescriptor>, DriveError> {
            if let Some(message) = &self.list_error {
                return Err(DriveError::Transport(message.clone()));
            }
            Ok(self
                .files
                .iter()
                .filter(|file| filter.matches(file))
                .cloned()
                .collect())
        }

        async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
            self.fetched.lock().expect("fetched lock").push(file_id.to_string());
            self.contents
                .get(file_id)
                .cloned()
                .ok_or_else(|| DriveError::NotFound(file_id.to_string()))
        }

        async fn metadata(&self, folder_id: &str) -> Result<FolderInfo, DriveError> {
            Ok(FolderInfo {
                id: folder_id.into(),
                name: "Fake".into(),
                mime_type: crate::drive::FOLDER_MIME_TYPE.into(),
                created_time: None,
            })
        }
    }

    fn orchestrator(
        folder: FakeFolder,
        client: ScriptedClient,
        download_dir: &std::path::Path,
    ) -> (BatchOrchestrator, Arc<FakeFolder>) {
        let folder = Arc::new(folder);
        let orchestrator = BatchOrchestrator::new(
            folder.clone(),
            Summarizer::new(Box::new(client), settings(12_000)),
            BatchSettings {
                download_dir: download_dir.to_path_buf(),
                min_text_length: 1,
            },
        );
        (orchestrator, folder)
    }

    fn staged_entries(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn mixed_folder_isolates_the_empty_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = FakeFolder::new(vec![
            ("a.pdf", FileKind::Pdf.mime_type(), pdf_with_pages(&["Hello"])),
            ("b.docx", FileKind::Docx.mime_type(), docx_with_paragraphs(&[""])),
            ("c.txt", FileKind::Txt.mime_type(), b"World".to_vec()),
        ]);
        let client = ScriptedClient::default();
        let (orchestrator, _) = orchestrator(folder, client.clone(), dir.path());

        let result = orchestrator.run("folder", &[]).await.expect("batch");

        assert_eq!(result.total_files, 3);
        assert_eq!(result.files.len(), 3);
        let names: Vec<_> = result.files.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.docx", "c.txt"]);
        assert_eq!(result.files[0].status, FileStatus::Success);
        assert_eq!(result.files[1].status, FileStatus::Error);
        assert!(result.files[1].summary.contains("No usable text"));
        assert_eq!(result.files[2].status, FileStatus::Success);

        let requests = client.recorded();
        assert_eq!(requests.len(), 2, "empty document never reaches the model");
        assert!(requests[0].prompt.contains("Hello"));
        assert!(requests[1].prompt.contains("Content:\nWorld\n"));
        assert_eq!(staged_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn per_file_failures_do_not_abort_the_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut folder = FakeFolder::new(vec![
            ("gone.txt", FileKind::Txt.mime_type(), b"never fetched".to_vec()),
            ("broken.pdf", FileKind::Pdf.mime_type(), b"not a pdf".to_vec()),
            ("odd.xyz", FileKind::Txt.mime_type(), b"some text".to_vec()),
            ("quota.txt", FileKind::Txt.mime_type(), b"model fails".to_vec()),
            ("fine.txt", FileKind::Txt.mime_type(), b"all good".to_vec()),
        ]);
        folder.contents.remove("id-0");
        let client = ScriptedClient::answering(vec![Err("quota exceeded".into()), Ok("fine".into())]);
        let (orchestrator, folder) = orchestrator(folder, client, dir.path());

        let result = orchestrator.run("folder", &FileKind::ALL).await.expect("batch");

        assert_eq!(result.total_files, 5);
        let statuses: Vec<_> = result.files.iter().map(|row| row.status).collect();
        assert_eq!(
            statuses,
            vec![
                FileStatus::Error,
                FileStatus::Error,
                FileStatus::Error,
                FileStatus::Error,
                FileStatus::Success
            ]
        );
        assert!(result.files[0].summary.contains("Error downloading file"));
        assert!(
            result.files[1]
                .summary
                .contains("Error extracting text from PDF file broken.pdf")
        );
        assert!(!result.files[1].summary.contains("drivedigest-"));
        assert!(result.files[2].summary.contains("Unsupported file type: .xyz"));
        assert!(result.files[3].summary.contains("Error generating summary"));
        assert_eq!(result.files[4].summary, "fine");
        for row in &result.files {
            assert!(!row.summary.is_empty());
            assert!(row.url.as_deref().is_some_and(|url| url.contains("drive.google.com")));
        }

        let fetched = folder.fetched.lock().expect("fetched lock").clone();
        assert_eq!(fetched, vec!["id-0", "id-1", "id-2", "id-3", "id-4"]);
        assert_eq!(staged_entries(dir.path()), 0);

        let snapshot = orchestrator.metrics_snapshot();
        assert_eq!(snapshot.batches_run, 1);
        assert_eq!(snapshot.files_succeeded, 1);
        assert_eq!(snapshot.files_failed, 4);
    }

    #[tokio::test]
    async fn type_filter_restricts_processed_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = FakeFolder::new(vec![
            ("a.pdf", FileKind::Pdf.mime_type(), pdf_with_pages(&["Hello"])),
            ("native", "application/vnd.google-apps.document", Vec::new()),
            ("c.txt", FileKind::Txt.mime_type(), b"World".to_vec()),
        ]);
        let (orchestrator, _) = orchestrator(folder, ScriptedClient::default(), dir.path());

        let result = orchestrator.run("folder", &[FileKind::Txt]).await.expect("batch");

        assert_eq!(result.total_files, 1);
        assert_eq!(result.files[0].name, "c.txt");
    }

    #[tokio::test]
    async fn empty_listing_returns_empty_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = FakeFolder::new(vec![]);
        let client = ScriptedClient::default();
        let (orchestrator, _) = orchestrator(folder, client.clone(), dir.path());

        let result = orchestrator.run("folder", &[]).await.expect("batch");

        assert_eq!(result, ResultSet::empty());
        assert!(client.recorded().is_empty());
    }

    #[tokio::test]
    async fn listing_failure_aborts_the_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut folder = FakeFolder::new(vec![("c.txt", FileKind::Txt.mime_type(), b"x".to_vec())]);
        folder.list_error = Some("connection refused".into());
        let (orchestrator, _) = orchestrator(folder, ScriptedClient::default(), dir.path());

        let error = orchestrator.run("folder", &[]).await.expect_err("listing failure");

        assert!(matches!(error, BatchError::Listing(DriveError::Transport(_))));
        assert_eq!(orchestrator.metrics_snapshot().batches_run, 0);
    }

    #[tokio::test]
    async fn stricter_validity_gate_rejects_short_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = Arc::new(FakeFolder::new(vec![
            ("short.txt", FileKind::Txt.mime_type(), b"Hi".to_vec()),
        ]));
        let orchestrator = BatchOrchestrator::new(
            folder,
            Summarizer::new(Box::new(ScriptedClient::default()), settings(100)),
            BatchSettings {
                download_dir: dir.path().to_path_buf(),
                min_text_length: crate::extraction::DEFAULT_MIN_TEXT_LENGTH,
            },
        );

        let result = orchestrator.run("folder", &[]).await.expect("batch");

        assert_eq!(result.files[0].status, FileStatus::Error);
        assert!(result.files[0].summary.contains("minimum 10 characters"));
    }
}
