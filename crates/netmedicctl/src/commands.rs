//! Subcommand handlers. Each returns the process exit code.

use crate::errors::{EXIT_CANCELLED, EXIT_FAILURES, EXIT_GENERAL_ERROR, EXIT_SUCCESS, EXIT_WARNINGS};
use crate::output;
use crate::ToolCommands;
use anyhow::{Context, Result};
use netmedic_common::privilege::is_elevated;
use netmedic_common::report::default_report_dir;
use netmedic_common::tools::{dns_preset, NetworkTools, PUBLIC_DNS_SERVERS};
use netmedic_common::{
    DiagnosticEngine, DiagnosticReport, DiagnosticStatus, NetmedicConfig, RepairEngine,
    RepairReport, SystemContext, SystemInfo,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn list(config: NetmedicConfig) -> Result<i32> {
    let ctx = SystemContext::system(config);
    let diagnostics = DiagnosticEngine::standard(&ctx);
    let repairs = RepairEngine::standard(&ctx);

    let checks: Vec<_> = diagnostics
        .entries()
        .into_iter()
        .map(|(id, name)| (id, name, None))
        .collect();
    let actions: Vec<_> = repairs
        .entries()
        .into_iter()
        .map(|(id, name)| {
            let admin = repairs.info(&id).map(|(_, admin)| admin);
            (id, name, admin)
        })
        .collect();

    output::print_registry("Checks", &checks);
    println!();
    output::print_registry("Repairs", &actions);
    Ok(EXIT_SUCCESS)
}

pub async fn diagnose(
    config: NetmedicConfig,
    id: Option<String>,
    json: bool,
    cancel: &CancellationToken,
) -> Result<i32> {
    let ctx = SystemContext::system(config);
    let engine = DiagnosticEngine::standard(&ctx);

    let results = match id {
        Some(id) => {
            if !engine.ids().contains(&id) {
                output::error(&format!("Unknown check '{}'", id));
                return Ok(EXIT_GENERAL_ERROR);
            }
            vec![engine.run_single(&id, cancel).await]
        }
        None => engine.run_all(cancel).await,
    };

    let report = DiagnosticReport::new(results, SystemInfo::collect());
    if json {
        output::print_json(&report)?;
    } else {
        for result in &report.results {
            output::print_diagnostic(result);
        }
        output::print_diagnostic_summary(&report.summary);
        let repairable = report.repairable_ids();
        if !repairable.is_empty() {
            println!("Suggested: netmedicctl repair <id> for {}", repairable.join(", "));
        }
    }

    if cancel.is_cancelled() {
        return Ok(EXIT_CANCELLED);
    }
    Ok(match report.summary.overall() {
        DiagnosticStatus::Ok => EXIT_SUCCESS,
        DiagnosticStatus::Warning => EXIT_WARNINGS,
        DiagnosticStatus::Error => EXIT_FAILURES,
    })
}

pub async fn repair(
    config: NetmedicConfig,
    id: Option<String>,
    json: bool,
    cancel: &CancellationToken,
) -> Result<i32> {
    let ctx = SystemContext::system(config);
    let engine = RepairEngine::standard(&ctx);
    let elevated = is_elevated(ctx.runner.as_ref()).await;

    let results = match id {
        Some(id) => {
            let Some((name, requires_admin)) = engine.info(&id) else {
                output::error(&format!("Unknown repair '{}'", id));
                return Ok(EXIT_GENERAL_ERROR);
            };
            if requires_admin && !elevated {
                output::warn(&format!(
                    "'{}' needs administrator rights; run netmedicctl from an elevated prompt",
                    name
                ));
            }
            vec![engine.run_single(&id, cancel).await]
        }
        None => {
            if !elevated {
                output::warn("Not elevated; admin-only repairs will likely fail");
            }
            engine.run_all(cancel).await
        }
    };

    let report = RepairReport::new(results);
    if json {
        output::print_json(&report)?;
    } else {
        for result in &report.results {
            output::print_repair(result);
        }
        output::print_repair_summary(&report.summary);
    }

    if cancel.is_cancelled() {
        return Ok(EXIT_CANCELLED);
    }
    Ok(if report.summary.failed_repairs > 0 {
        EXIT_FAILURES
    } else {
        EXIT_SUCCESS
    })
}

pub async fn report(
    config: NetmedicConfig,
    out: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<i32> {
    let ctx = SystemContext::system(config);
    let engine = DiagnosticEngine::standard(&ctx);
    let results = engine.run_all(cancel).await;

    let report = DiagnosticReport::new(results, SystemInfo::collect());
    let dir = out.unwrap_or_else(default_report_dir);
    let path = report
        .write_json(&dir)
        .with_context(|| format!("Failed to write report to {}", dir.display()))?;

    info!("Report written to {}", path.display());
    output::print_diagnostic_summary(&report.summary);
    println!("Report: {}", path.display());

    Ok(if cancel.is_cancelled() {
        EXIT_CANCELLED
    } else {
        EXIT_SUCCESS
    })
}

pub async fn tool(
    config: NetmedicConfig,
    tool: ToolCommands,
    cancel: &CancellationToken,
) -> Result<i32> {
    let tools = NetworkTools::new(SystemContext::system(config));

    let success = match tool {
        ToolCommands::Ping { target } => {
            let result = tools.ping(&target, cancel).await.context("ping")?;
            output::print_command(&result);
            result.is_success()
        }
        ToolCommands::Trace { target } => {
            let result = tools.traceroute(&target, cancel).await.context("traceroute")?;
            output::print_command(&result);
            result.is_success()
        }
        ToolCommands::Port { host, port } => {
            let check = tools.check_port(&host, port).await.context("port check")?;
            output::print_port(&check);
            check.open
        }
        ToolCommands::Info => {
            let result = tools.network_info(cancel).await;
            output::print_command(&result);
            result.is_success()
        }
        ToolCommands::Firewall => {
            let result = tools.firewall_status(cancel).await;
            output::print_command(&result);
            result.is_success()
        }
        ToolCommands::SwitchDns {
            preset,
            primary,
            secondary,
        } => {
            let (primary, secondary) = match preset {
                Some(name) => match dns_preset(&name) {
                    Some(preset) => (preset.primary.to_string(), preset.secondary.to_string()),
                    None => {
                        let known: Vec<&str> = PUBLIC_DNS_SERVERS.iter().map(|p| p.name).collect();
                        output::error(&format!(
                            "Unknown DNS preset '{}' (known: {})",
                            name,
                            known.join(", ")
                        ));
                        return Ok(EXIT_GENERAL_ERROR);
                    }
                },
                None => (primary.unwrap_or_default(), secondary.unwrap_or_default()),
            };
            let steps = tools
                .switch_dns(&primary, &secondary, cancel)
                .await
                .context("DNS switch")?;
            if steps.is_empty() {
                output::warn("No connected adapter found");
            }
            output::print_steps(&steps);
            !steps.is_empty() && steps.iter().all(|step| step.success)
        }
        ToolCommands::RestartServices => {
            let steps = tools.restart_services(cancel).await;
            output::print_steps(&steps);
            steps.iter().all(|step| step.success)
        }
    };

    Ok(if cancel.is_cancelled() {
        EXIT_CANCELLED
    } else if success {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURES
    })
}
