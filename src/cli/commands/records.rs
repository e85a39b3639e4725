use anyhow::Result;

use super::{print_json, read_payload, report_job, CommandContext, RegistryCommand};

pub struct SeedCommand;

impl RegistryCommand for SeedCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let inserted = ctx.service.seed().await?;
        let skipped = crate::ledger::sample_documents(chrono::Utc::now()).len() - inserted;
        println!("🌱 Seeded {inserted} sample assets ({skipped} already present)");
        Ok(())
    }
}

pub struct CreateCommand {
    pub payload: String,
}

impl RegistryCommand for CreateCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let payload = read_payload(&self.payload)?;
        let handle = ctx.service.create(&ctx.caller, &payload).await?;
        report_job(&ctx.service, handle).await
    }
}

pub struct GetCommand {
    pub id: String,
}

impl RegistryCommand for GetCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let record = ctx.service.get(&ctx.caller, &self.id).await?;
        print_json(&record)
    }
}

pub struct UpdateCommand {
    pub id: String,
    pub payload: String,
}

impl RegistryCommand for UpdateCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let payload = read_payload(&self.payload)?;
        let handle = ctx.service.update(&ctx.caller, &self.id, &payload).await?;
        report_job(&ctx.service, handle).await
    }
}

pub struct DeleteCommand {
    pub id: String,
}

impl RegistryCommand for DeleteCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let handle = ctx.service.delete(&ctx.caller, &self.id).await?;
        report_job(&ctx.service, handle).await
    }
}
