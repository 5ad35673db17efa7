//! Remove command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::find_document;
use crate::utils::input;

/// Execute the remove command.
///
/// Asks for confirmation unless `force` is set.
pub async fn execute(ctx: &CliContext, identifier: &str, force: bool) -> Result<()> {
    let document = find_document(ctx, identifier).await?;

    if !force {
        println!(
            "'{}' (ID {}), {} segments, {:.0}% read",
            document.title,
            document.id,
            document.total_segments,
            document.progress_percent()
        );
        if !input::prompt_confirmation("Remove this document from the library?")? {
            println!("Remove cancelled.");
            return Ok(());
        }
    }

    let remaining = ctx
        .library
        .delete(&document.id)
        .await
        .map_err(CliError::from)?;

    println!(
        "Removed '{}'. {} document(s) left in the library.",
        document.title,
        remaining.len()
    );
    Ok(())
}
