//! Listing filters: the backend query string and the matching local predicate.

use super::types::{FileDescriptor, FileKind};

/// Media type the backend assigns to folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Conjunction of "inside this folder, not trashed, not a folder" and an optional
/// "media type is one of the requested kinds" restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    folder_id: String,
    kinds: Vec<FileKind>,
}

impl FileFilter {
    /// Build a filter for `folder_id`. An empty `kinds` slice means no type restriction.
    pub fn new(folder_id: impl Into<String>, kinds: &[FileKind]) -> Self {
        let mut deduped = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !deduped.contains(kind) {
                deduped.push(*kind);
            }
        }
        Self {
            folder_id: folder_id.into(),
            kinds: deduped,
        }
    }

    /// Folder whose direct children are listed.
    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    /// Requested kinds, deduplicated, in request order.
    pub fn kinds(&self) -> &[FileKind] {
        &self.kinds
    }

    /// Render the backend `q` parameter.
    pub fn query(&self) -> String {
        let mut query = format!(
            "'{}' in parents and trashed=false and mimeType!='{FOLDER_MIME_TYPE}'",
            escape_literal(&self.folder_id)
        );

        if !self.kinds.is_empty() {
            let clauses: Vec<String> = self
                .kinds
                .iter()
                .map(|kind| format!("mimeType='{}'", kind.mime_type()))
                .collect();
            query.push_str(" and (");
            query.push_str(&clauses.join(" or "));
            query.push(')');
        }

        query
    }

    /// Local predicate mirroring the type half of [`FileFilter::query`].
    pub fn matches(&self, file: &FileDescriptor) -> bool {
        if file.mime_type == FOLDER_MIME_TYPE {
            return false;
        }
        if self.kinds.is_empty() {
            return true;
        }
        FileKind::from_mime_type(&file.mime_type)
            .map(|kind| self.kinds.contains(&kind))
            .unwrap_or(false)
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(mime_type: &str) -> FileDescriptor {
        FileDescriptor {
            id: "id".into(),
            name: "name".into(),
            mime_type: mime_type.into(),
            size: None,
            created_time: None,
            modified_time: None,
        }
    }

    #[test]
    fn query_without_kinds_only_scopes_folder() {
        let filter = FileFilter::new("folder-1", &[]);
        assert_eq!(
            filter.query(),
            "'folder-1' in parents and trashed=false and mimeType!='application/vnd.google-apps.folder'"
        );
    }

    #[test]
    fn query_with_kinds_appends_mime_disjunction() {
        let filter = FileFilter::new("folder-1", &[FileKind::Pdf, FileKind::Txt, FileKind::Pdf]);
        assert_eq!(filter.kinds(), &[FileKind::Pdf, FileKind::Txt]);
        assert!(
            filter
                .query()
                .ends_with(" and (mimeType='application/pdf' or mimeType='text/plain')")
        );
    }

    #[test]
    fn query_escapes_quotes_in_folder_id() {
        let filter = FileFilter::new("it's", &[]);
        assert!(filter.query().starts_with("'it\\'s' in parents"));
    }

    #[test]
    fn matches_excludes_unknown_types_only_when_filtered() {
        let native = descriptor("application/vnd.google-apps.document");
        let unfiltered = FileFilter::new("f", &[]);
        let filtered = FileFilter::new("f", &[FileKind::Docx]);

        assert!(unfiltered.matches(&native));
        assert!(!filtered.matches(&native));
        assert!(filtered.matches(&descriptor(FileKind::Docx.mime_type())));
        assert!(!filtered.matches(&descriptor(FileKind::Pdf.mime_type())));
        assert!(!unfiltered.matches(&descriptor(FOLDER_MIME_TYPE)));
    }
}
