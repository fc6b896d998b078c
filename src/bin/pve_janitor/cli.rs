use clap::{Args, Parser, Subcommand};
use pve_janitor::{PlanPolicy, Risk, config::Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pve-janitor",
    version,
    about = "Audit a Proxmox VE node and clean up guest snapshots."
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inventory guests, storage and snapshots and report health findings.
    Assess(OutputArgs),
    /// Report storage pool usage with severities.
    Storage(OutputArgs),
    /// Build a reviewable snapshot cleanup plan.
    Plan(PlanArgs),
    /// Delete the snapshots of a plan, one at a time.
    Cleanup(CleanupArgs),
}

#[derive(Args)]
pub struct OutputArgs {
    /// Also write the result as a JSON document
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PolicyArgs {
    /// Leave out snapshots younger than this many days
    #[arg(long, default_value_t = 0)]
    pub min_age_days: u64,

    /// Highest risk to include: low, medium or high
    #[arg(long, default_value = "high")]
    pub max_risk: Risk,

    /// Restrict to a guest (`qemu/100`, `lxc/101` or a vmid); repeatable
    #[arg(long = "resource")]
    pub resources: Vec<String>,
}

impl PolicyArgs {
    pub fn policy(&self) -> PlanPolicy {
        PlanPolicy {
            min_age_days: self.min_age_days,
            max_risk: self.max_risk,
            resources: self.resources.clone(),
        }
    }
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct CleanupArgs {
    /// Plan written by `plan --output`; without it a plan is built now
    #[arg(long, conflicts_with_all = ["min_age_days", "max_risk", "resources"])]
    pub plan: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Print what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Pause between deletions in milliseconds
    #[arg(long, default_value_t = 500)]
    pub pacing_ms: u64,

    /// Storage pool to measure before and after the run
    #[arg(long)]
    pub storage: Option<String>,

    /// Wait before the final storage measurement, in seconds
    #[arg(long, default_value_t = 15)]
    pub settle_secs: u64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECTION: [&str; 11] = [
        "pve-janitor",
        "--host",
        "pve.lab.local",
        "--username",
        "root",
        "--password",
        "secret",
        "--verify-ssl",
        "false",
        "--timeout",
        "30",
    ];

    fn parse(args: &[&str]) -> Cli {
        let mut argv = CONNECTION.to_vec();
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cleanup_defaults() {
        let cli = parse(&["cleanup", "--dry-run", "--storage", "local-lvm"]);
        let Commands::Cleanup(args) = cli.command else {
            panic!("expected cleanup");
        };
        assert!(args.dry_run);
        assert_eq!(args.pacing_ms, 500);
        assert_eq!(args.settle_secs, 15);
        assert_eq!(args.storage.as_deref(), Some("local-lvm"));
        assert_eq!(args.policy.policy(), PlanPolicy::default());
    }

    #[test]
    fn test_plan_policy_flags() {
        let cli = parse(&[
            "plan", "--min-age-days", "7", "--max-risk", "medium", "--resource", "qemu/100",
            "--resource", "101", "-o", "plan.json",
        ]);
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        let policy = args.policy.policy();
        assert_eq!(policy.min_age_days, 7);
        assert_eq!(policy.max_risk, Risk::Medium);
        assert_eq!(policy.resources, vec!["qemu/100", "101"]);
        assert_eq!(args.output.output, Some(PathBuf::from("plan.json")));
    }

    #[test]
    fn test_plan_file_conflicts_with_policy_flags() {
        let mut argv = CONNECTION.to_vec();
        argv.extend_from_slice(&["cleanup", "--plan", "plan.json", "--max-risk", "low"]);
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
