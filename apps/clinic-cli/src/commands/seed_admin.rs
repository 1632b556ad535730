//! Administrative entry seeding command

use crate::context::AppContext;
use crate::error::CliResult;

/// Execute the seed-admin command
pub async fn execute(ctx: &AppContext) -> CliResult<()> {
    let service = ctx.service();
    if service.seed_admin().await? {
        println!(
            "✓ Created administrative entry '{}'",
            service.config().protected_id
        );
    } else {
        println!(
            "Administrative entry '{}' already exists",
            service.config().protected_id
        );
    }
    Ok(())
}
