//! Terminal output helpers.

use console::style;
use semver::Version;

use crate::cli::orchestration::PreparedRelease;
use crate::conventional::Violation;
use crate::workspace::{AffectedReason, AffectedSet};

/// Print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a non-fatal warning to stderr.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Print the staged release plan, one line per package.
pub fn display_plan(plan: &[PreparedRelease]) {
    println!("{}", style("Staged releases:").bold());
    for release in plan {
        let from = release
            .previous_version
            .as_ref()
            .map(Version::to_string)
            .unwrap_or_else(|| "unreleased".to_string());
        println!(
            "  {} {} {} {} ({})",
            style(&release.package).cyan(),
            style(from).red(),
            style("->").dim(),
            style(release.next_version.to_string()).green(),
            release.bump
        );
    }
}

/// Print the affected set with reasons, in its stable order.
pub fn display_affected(set: &AffectedSet) {
    for (name, reason) in set.iter() {
        let reason = match reason {
            AffectedReason::DirectlyChanged => style("directly changed").green(),
            AffectedReason::TransitivelyAffected => style("transitively affected").yellow(),
        };
        println!("{}\t{}", name, reason);
    }
    for path in set.unclaimed_paths() {
        display_warning(&format!("path '{}' matches no package", path));
    }
}

/// Print the violations found in one commit message.
pub fn display_violations(context: &str, violations: &[Violation]) {
    display_error(&format!("{}:", context));
    for violation in violations {
        eprintln!("  - {}", violation);
    }
}
