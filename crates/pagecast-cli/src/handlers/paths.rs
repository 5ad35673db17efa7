//! Paths command handler.
//!
//! Displays resolved paths for diagnostics.

use crate::bootstrap::CliContext;

/// Print resolved paths in `key = value` format.
pub fn execute(ctx: &CliContext) {
    println!("data_root = {}", ctx.data_root.display());
    println!("database = {}", ctx.database_path.display());
}
