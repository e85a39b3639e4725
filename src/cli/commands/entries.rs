// Pending-entry commands: submit, approve, reject

use anyhow::Result;

use super::{read_payload, report_job, CommandContext, RegistryCommand};
use crate::model::{Category, Resolution};

pub struct SubmitCommand {
    pub id: String,
    pub category: Category,
    pub payload: String,
}

impl SubmitCommand {
    pub fn deed(id: String, payload: String) -> Self {
        Self {
            id,
            category: Category::Deed,
            payload,
        }
    }

    pub fn incumbrance(id: String, payload: String) -> Self {
        Self {
            id,
            category: Category::Incumbrance,
            payload,
        }
    }
}

impl RegistryCommand for SubmitCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let payload = read_payload(&self.payload)?;
        let handle = match self.category {
            Category::Deed => ctx.service.submit_deed(&ctx.caller, &self.id, &payload).await?,
            Category::Incumbrance => {
                ctx.service
                    .submit_incumbrance(&ctx.caller, &self.id, &payload)
                    .await?
            }
        };
        if let Some(entry_id) = handle.entry_id {
            println!("📝 Pending {} entry {entry_id}", self.category);
        }
        report_job(&ctx.service, handle).await
    }
}

pub struct ResolveCommand {
    pub id: String,
    pub category: Category,
    pub selector: String,
    pub resolution: Resolution,
}

impl RegistryCommand for ResolveCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let handle = ctx
            .service
            .resolve(
                &ctx.caller,
                &self.id,
                self.category,
                &self.selector,
                self.resolution,
            )
            .await?;
        report_job(&ctx.service, handle).await
    }
}
