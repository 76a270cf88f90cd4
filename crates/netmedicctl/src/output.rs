//! Terminal output - ASCII-only, colored status tags

use netmedic_common::report::{RepairSummary, ReportSummary};
use netmedic_common::tools::{PortCheck, ToolStep};
use netmedic_common::{CommandResult, DiagnosticResult, DiagnosticStatus, RepairResult};
use owo_colors::OwoColorize;
use serde::Serialize;

pub const SEPARATOR: &str = "------------------------------------------------------------";

fn status_tag(status: DiagnosticStatus) -> String {
    match status {
        DiagnosticStatus::Ok => "[OK]".bright_green().to_string(),
        DiagnosticStatus::Warning => "[WARN]".yellow().to_string(),
        DiagnosticStatus::Error => "[FAIL]".bright_red().to_string(),
    }
}

fn success_tag(success: bool) -> String {
    if success {
        "[OK]".bright_green().to_string()
    } else {
        "[FAIL]".bright_red().to_string()
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_registry(title: &str, entries: &[(String, String, Option<bool>)]) {
    println!("{}", title.bold());
    for (id, name, admin) in entries {
        let marker = match admin {
            Some(true) => " (admin)".dimmed().to_string(),
            _ => String::new(),
        };
        println!("  {:<14} {}{}", id.cyan(), name, marker);
    }
}

pub fn print_diagnostic(result: &DiagnosticResult) {
    println!("{} {} - {}", status_tag(result.status), result.name.bold(), result.message);
    for (key, value) in &result.details {
        // Nested details (adapter lists, target lists) are only useful in JSON
        if value.is_array() || value.is_object() {
            continue;
        }
        println!("       {}: {}", key.dimmed(), value);
    }
    if result.repairable && result.status != DiagnosticStatus::Ok {
        println!("       {}", "repairable".cyan());
    }
}

pub fn print_diagnostic_summary(summary: &ReportSummary) {
    println!("{}", SEPARATOR);
    println!(
        "{} checks: {} ok, {} warning, {} failed",
        summary.total_checks,
        summary.passed_checks.bright_green(),
        summary.warning_checks.yellow(),
        summary.failed_checks.bright_red()
    );
}

pub fn print_repair(result: &RepairResult) {
    println!("{} {} - {}", success_tag(result.success), result.name.bold(), result.message);
    if let Some(path) = &result.backup_path {
        println!("       backup: {}", path);
    }
}

pub fn print_repair_summary(summary: &RepairSummary) {
    println!("{}", SEPARATOR);
    println!(
        "{} repairs: {} succeeded, {} failed",
        summary.total_repairs,
        summary.successful_repairs.bright_green(),
        summary.failed_repairs.bright_red()
    );
    if summary.requires_reboot {
        println!("{}", "[NOTE] Restart the computer to finish the repair".yellow());
    }
}

pub fn print_command(result: &CommandResult) {
    if !result.stdout().is_empty() {
        println!("{}", result.stdout());
    }
    if !result.is_success() {
        eprintln!("{} {}", "[FAIL]".bright_red(), result.failure_detail());
    }
}

pub fn print_port(check: &PortCheck) {
    if check.open {
        println!("{} {} open ({} ms)", "[OK]".bright_green(), check.target, check.latency_ms);
    } else {
        println!(
            "{} {} closed: {}",
            "[FAIL]".bright_red(),
            check.target,
            check.error.as_deref().unwrap_or("unreachable")
        );
    }
}

pub fn print_steps(steps: &[ToolStep]) {
    for step in steps {
        match &step.error {
            None => println!("{} {}", success_tag(step.success), step.name),
            Some(error) => println!("{} {}: {}", success_tag(step.success), step.name, error),
        }
    }
}

pub fn warn(message: &str) {
    eprintln!("{} {}", "[WARNING]".yellow(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "[ERROR]".bright_red(), message);
}
