use anyhow::Result;

use super::{print_json, CommandContext, RegistryCommand};
use crate::query::RecordFilter;

pub struct ListCommand {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl RegistryCommand for ListCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let page = ctx
            .service
            .list(&ctx.caller, self.limit.as_deref(), self.offset.as_deref())
            .await?;
        print_json(&page)
    }
}

pub struct FindCommand {
    pub filter: RecordFilter,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl RegistryCommand for FindCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let page = ctx
            .service
            .find(
                &ctx.caller,
                &self.filter,
                self.limit.as_deref(),
                self.offset.as_deref(),
            )
            .await?;
        print_json(&page)
    }
}

pub struct SummaryCommand;

impl RegistryCommand for SummaryCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let summary = ctx.service.summary(&ctx.caller).await?;
        print_json(&summary)
    }
}
