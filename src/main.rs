use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mono_release::cli::orchestration;
use mono_release::config;
use mono_release::conventional;
use mono_release::git::Git2History;
use mono_release::ui;
use mono_release::workspace::PackageGraph;

#[derive(Parser)]
#[command(
    name = "mono-release",
    about = "Version, changelog, and affected-package automation for monorepos"
)]
struct Cli {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve next versions and stage changelogs for release
    Prepare {
        #[arg(long, help = "Preview the plan without writing anything")]
        dry_run: bool,
    },
    /// Commit and tag the staged release
    Apply,
    /// List packages affected by a change set
    Affected {
        #[arg(long, help = "Resolve changed paths from commits since this ref")]
        since: Option<String>,

        #[arg(long = "path", help = "Explicit changed path (repeatable)")]
        paths: Vec<String>,

        #[arg(long, help = "Emit JSON instead of plain text")]
        json: bool,
    },
    /// Validate commit messages and branch names
    Check {
        #[arg(long, help = "Validate a single message instead of history")]
        message: Option<String>,

        #[arg(long, help = "Validate commits since this ref")]
        since: Option<String>,

        #[arg(long, help = "Check a branch name against configured prefixes")]
        branch: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let graph = match PackageGraph::build(config.workspace.packages.clone()) {
        Ok(graph) => graph,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Prepare { dry_run } => {
            let history = Git2History::open(".")?;
            let root = PathBuf::from(".");
            let today = Local::now().date_naive();

            let plan =
                orchestration::plan_releases(&history, &config, &graph, today, &root)?;
            if plan.is_empty() {
                ui::display_status("No release needed");
                return Ok(());
            }

            ui::display_plan(&plan);
            if dry_run {
                ui::display_status("Dry run: nothing written");
                return Ok(());
            }

            orchestration::stage_plan(&plan, &root)?;
            ui::display_success(&format!(
                "Staged {} release(s); review and run `apply`",
                plan.len()
            ));
        }

        Command::Apply => {
            let history = Git2History::open(".")?;
            let applied = orchestration::apply_plan(&history, &PathBuf::from("."))?;
            for tag in &applied.tags {
                ui::display_success(&format!("Created tag {}", tag));
            }
            ui::display_success(&format!("Release commit {}", &applied.commit_hash[..7]));
        }

        Command::Affected { since, paths, json } => {
            let history = Git2History::open(".")?;
            let set =
                orchestration::affected_packages(&history, &graph, since.as_deref(), &paths)?;

            if json {
                let packages: Vec<_> = set
                    .iter()
                    .map(|(name, reason)| serde_json::json!({ "name": name, "reason": reason }))
                    .collect();
                let output = serde_json::json!({
                    "packages": packages,
                    "unclaimed_paths": set.unclaimed_paths(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                ui::display_affected(&set);
            }
        }

        Command::Check {
            message,
            since,
            branch,
        } => {
            if message.is_none() && since.is_none() && branch.is_none() {
                ui::display_error("Nothing to check: pass --message, --since, or --branch");
                std::process::exit(1);
            }

            let mut failed = false;

            if let Some(branch) = branch {
                if !conventional::branch_has_valid_prefix(&branch, &config.commits.branch_prefixes)
                {
                    ui::display_error(&format!(
                        "Branch '{}' does not start with a configured prefix",
                        branch
                    ));
                    failed = true;
                }
            }

            if let Some(message) = message {
                let violations =
                    conventional::validate(&message, &config.commits, &graph.package_names());
                if !violations.is_empty() {
                    ui::display_violations("commit message", &violations);
                    failed = true;
                }
            } else if since.is_some() {
                let history = Git2History::open(".")?;
                let offenders =
                    orchestration::check_commits(&history, &config, &graph, since.as_deref())?;
                for (hash, violations) in &offenders {
                    ui::display_violations(&format!("commit {}", &hash[..7.min(hash.len())]), violations);
                }
                failed = failed || !offenders.is_empty();
            }

            if failed {
                std::process::exit(1);
            }
            ui::display_success("All checks passed");
        }
    }

    Ok(())
}
