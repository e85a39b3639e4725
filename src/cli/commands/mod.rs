use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::cli::Commands;
use crate::config::LandRegistryConfig;
use crate::jobs::{JobHandle, JobStatus};
use crate::model::{Caller, Resolution};
use crate::query::RecordFilter;
use crate::service::RegistryService;
use crate::shutdown::ShutdownCoordinator;

pub mod entries;
pub mod init;
pub mod query;
pub mod records;

/// What every ledger command runs against
pub struct CommandContext {
    pub service: RegistryService,
    pub caller: Caller,
}

#[allow(async_fn_in_trait)]
pub trait RegistryCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Open the ledger, run one command and drain the job queue
pub async fn dispatch(
    command: Commands,
    identity: Option<String>,
    config: &LandRegistryConfig,
) -> Result<()> {
    let identity = identity.unwrap_or_else(|| config.authority.default_identity.clone());
    let caller = Caller::new(identity)?;
    let service = RegistryService::from_config(config).context("failed to open the ledger")?;
    let ctx = CommandContext { service, caller };

    let coordinator = ShutdownCoordinator::new(config.drain_timeout());
    let outcome = coordinator
        .run_until_signal(&ctx.service, run_command(&ctx, command))
        .await?;
    if outcome.is_none() {
        println!("⚠️  Interrupted; accepted jobs were drained before exit");
    }
    Ok(())
}

async fn run_command(ctx: &CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Init { .. } => bail!("init writes configuration only; run it on its own"),
        Commands::Seed => records::SeedCommand.execute(ctx).await,
        Commands::Create { payload } => records::CreateCommand { payload }.execute(ctx).await,
        Commands::Get { id } => records::GetCommand { id }.execute(ctx).await,
        Commands::Update { id, payload } => records::UpdateCommand { id, payload }.execute(ctx).await,
        Commands::Delete { id } => records::DeleteCommand { id }.execute(ctx).await,
        Commands::SubmitDeed { id, payload } => {
            entries::SubmitCommand::deed(id, payload).execute(ctx).await
        }
        Commands::SubmitIncumbrance { id, payload } => {
            entries::SubmitCommand::incumbrance(id, payload)
                .execute(ctx)
                .await
        }
        Commands::Approve {
            id,
            category,
            selector,
        } => {
            entries::ResolveCommand {
                id,
                category,
                selector,
                resolution: Resolution::Approve,
            }
            .execute(ctx)
            .await
        }
        Commands::Reject {
            id,
            category,
            selector,
        } => {
            entries::ResolveCommand {
                id,
                category,
                selector,
                resolution: Resolution::Reject,
            }
            .execute(ctx)
            .await
        }
        Commands::List { limit, offset } => query::ListCommand { limit, offset }.execute(ctx).await,
        Commands::Find {
            reference,
            address,
            limit,
            offset,
        } => {
            query::FindCommand {
                filter: RecordFilter::new(reference, address),
                limit,
                offset,
            }
            .execute(ctx)
            .await
        }
        Commands::Summary => query::SummaryCommand.execute(ctx).await,
    }
}

/// Parse a payload given inline or as `@path`
pub fn read_payload(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload file {path}"))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("payload is not valid JSON")
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the accepted handle, wait for the write to land and report the outcome
pub async fn report_job(service: &RegistryService, handle: JobHandle) -> Result<()> {
    println!("📨 {} accepted for {}", handle.operation, handle.record_id);
    print_json(&handle)?;

    match service.wait(&handle.job_id).await {
        Some(JobStatus::Completed {
            version: Some(version),
        }) => {
            println!("✅ {} completed: {} is at version {version}", handle.job_id, handle.record_id);
            Ok(())
        }
        Some(JobStatus::Completed { version: None }) => {
            println!("✅ {} completed: {} removed", handle.job_id, handle.record_id);
            Ok(())
        }
        Some(JobStatus::Failed { reason }) => {
            println!("❌ {} failed: {reason}", handle.job_id);
            bail!("job {} failed: {reason}", handle.job_id)
        }
        other => bail!("job {} ended without a final status ({other:?})", handle.job_id),
    }
}
