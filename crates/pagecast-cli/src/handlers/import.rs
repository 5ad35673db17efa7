//! Import command handler.
//!
//! Reads a document from disk, extracts and segments it, and stores it in
//! the library.

use std::path::Path;

use anyhow::{Context, Result};
use pagecast_core::Document;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the import command.
pub async fn execute(
    ctx: &CliContext,
    file: &Path,
    title: Option<String>,
    no_fallback: bool,
) -> Result<()> {
    let document = import_file(ctx, file, title, no_fallback).await?;

    println!("Imported '{}' (ID {})", document.title, document.id);
    println!(
        "  {} segments across {} page(s)",
        document.total_segments, document.total_pages
    );
    println!("Use 'pagecast play {}' to start listening.", document.id);
    Ok(())
}

/// Import `file` and return the stored document.
pub async fn import_file(
    ctx: &CliContext,
    file: &Path,
    title: Option<String>,
    no_fallback: bool,
) -> Result<Document> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(CliError::from)
        .with_context(|| format!("reading {}", file.display()))?;

    let title = title.unwrap_or_else(|| title_from_path(file));
    let library = if no_fallback || ctx.speech.is_none() {
        &ctx.local_library
    } else {
        &ctx.library
    };

    tracing::debug!(path = %file.display(), bytes = bytes.len(), "Importing document");
    let document = library.import(&title, &bytes).await.map_err(CliError::from)?;
    Ok(document)
}

/// Title derived from the file name without its extension.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{BOOK, context};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path(Path::new("/books/Moby Dick.pdf")), "Moby Dick");
        assert_eq!(title_from_path(Path::new("notes.v2.txt")), "notes.v2");
        assert_eq!(title_from_path(Path::new("/")), "Untitled");
    }

    #[tokio::test]
    async fn test_import_file_stores_segments() {
        let ctx = context().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("Short Story.txt");
        std::fs::write(&path, BOOK).unwrap();

        let document = import_file(&ctx, &path, None, false).await.unwrap();

        assert_eq!(document.title, "Short Story");
        assert_eq!(document.total_segments, 4);
        assert_eq!(document.total_pages, 2);
        assert_eq!(document.segments[2].page_number, 2);

        let stored = ctx.library.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, document.id);
    }

    #[tokio::test]
    async fn test_import_uses_explicit_title() {
        let ctx = context().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.txt");
        std::fs::write(&path, BOOK).unwrap();

        let document = import_file(&ctx, &path, Some("Renamed".into()), true)
            .await
            .unwrap();
        assert_eq!(document.title, "Renamed");
    }

    #[tokio::test]
    async fn test_import_empty_file_fails_extraction() {
        let ctx = context().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n").unwrap();

        let err = import_file(&ctx, &path, None, false).await.unwrap_err();
        let cli = err.downcast_ref::<CliError>().unwrap();
        assert!(matches!(cli, CliError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_import_missing_file_is_io_error() {
        let ctx = context().await;
        let err = import_file(&ctx, &PathBuf::from("/nonexistent/book.pdf"), None, false)
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::Io(_))));
    }
}
