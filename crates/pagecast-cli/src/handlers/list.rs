//! List command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_library;

/// Execute the list command.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let documents = ctx.library.list().await.map_err(CliError::from)?;

    if documents.is_empty() {
        println!("The library is empty.");
        println!("Use 'pagecast import <file>' to add your first document.");
        return Ok(());
    }

    println!("{} document(s) in the library:\n", documents.len());
    print_library(&documents);
    Ok(())
}
