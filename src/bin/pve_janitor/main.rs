mod cli;
mod telemetry;

use clap::Parser;
use cli::{CleanupArgs, Cli, Commands, OutputArgs, PlanArgs};
use pve_janitor::{
    ApiClient, CleanupOptions, CleanupPlan, CleanupService, InventoryService, PlannerService,
    ProxmoxResult, config,
    report::{self, DocumentKind, write_document},
};
use std::process::ExitCode;
use std::time::{Duration, SystemTime};
use tracing::{Level, error, info, warn};

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = config::load_dotenv();
    let subscriber = telemetry::get_subscriber(Level::INFO, std::io::stderr);
    if let Err(e) = telemetry::init_subscriber(subscriber) {
        eprintln!("failed to initialise logging: {e}");
    }
    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let cli = Cli::parse();
    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "run failed");
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; requests already sent may still complete on the server");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(cli: Cli) -> ProxmoxResult<()> {
    let client = cli.settings.client()?;
    let api = client.open_session().await?;
    let node = InventoryService::new(&api)
        .discover_node(cli.settings.node.as_deref())
        .await?;
    info!(%node, "using node");

    match cli.command {
        Commands::Assess(args) => assess(&api, &node, args).await,
        Commands::Storage(args) => storage(&api, &node, args).await,
        Commands::Plan(args) => plan(&api, &node, args).await,
        Commands::Cleanup(args) => cleanup(&api, &node, args).await,
    }
}

async fn assess(api: &ApiClient, node: &str, args: OutputArgs) -> ProxmoxResult<()> {
    let inventory = InventoryService::new(api).build(node).await;
    let findings = report::assess_health(&inventory);
    print!("{}", report::text::render_inventory(&inventory, &findings));
    if let Some(path) = args.output {
        write_document(&path, DocumentKind::Inventory, &inventory).await?;
    }
    Ok(())
}

async fn storage(api: &ApiClient, node: &str, args: OutputArgs) -> ProxmoxResult<()> {
    let inventory = InventoryService::new(api).build(node).await;
    let rows = report::storage_rows(&inventory);
    print!("{}", report::text::render_storage(node, &rows));
    if let Some(path) = args.output {
        write_document(&path, DocumentKind::StorageReport, &rows).await?;
    }
    Ok(())
}

async fn plan(api: &ApiClient, node: &str, args: PlanArgs) -> ProxmoxResult<()> {
    let inventory = InventoryService::new(api).build(node).await;
    let plan = PlannerService::new(args.policy.policy()).plan(&inventory, SystemTime::now());
    print!("{}", report::text::render_plan(&plan));
    if let Some(path) = args.output.output {
        plan.save(&path).await?;
    }
    Ok(())
}

async fn cleanup(api: &ApiClient, node: &str, args: CleanupArgs) -> ProxmoxResult<()> {
    let plan = match &args.plan {
        Some(path) => {
            let plan = CleanupPlan::load(path).await?;
            if plan.node != node {
                warn!(plan_node = %plan.node, %node, "plan was made for another node");
            }
            plan
        }
        None => {
            let inventory = InventoryService::new(api).build(node).await;
            PlannerService::new(args.policy.policy()).plan(&inventory, SystemTime::now())
        }
    };
    let requests = plan.requests()?;
    print!("{}", report::text::render_plan(&plan));

    if args.dry_run {
        println!("\nDry run: {} snapshot(s) would be deleted.", requests.len());
        return Ok(());
    }
    if plan.is_empty() {
        println!("\nNothing to delete.");
        return Ok(());
    }

    let options = CleanupOptions {
        pacing: Duration::from_millis(args.pacing_ms),
        watched_storage: args
            .storage
            .map(|storage| (plan.node.clone(), storage)),
        settle: Duration::from_secs(args.settle_secs),
    };
    let summary = CleanupService::new(api, options).execute(requests).await;
    print!("\n{}", report::text::render_run_summary(&summary));
    if let Some(path) = args.output.output {
        write_document(&path, DocumentKind::RunSummary, &summary).await?;
    }
    Ok(())
}
