//! Diagnostic and repair reports
//!
//! Reports wrap a run's results with a summary and host information. They are
//! written as pretty JSON to `report_YYYYMMDD_HHMMSS.json` in the report directory.

use crate::error::Result;
use crate::types::{DiagnosticResult, DiagnosticStatus, RepairResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::System;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os_version: String,
    pub computer_name: String,
    pub username: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        Self {
            os_version: System::long_os_version()
                .unwrap_or_else(|| std::env::consts::OS.to_string()),
            computer_name: System::host_name().unwrap_or_default(),
            username: std::env::var("USERNAME")
                .or_else(|_| std::env::var("USER"))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub warning_checks: usize,
    pub failed_checks: usize,
}

impl ReportSummary {
    pub fn from_results(results: &[DiagnosticResult]) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        Self {
            total_checks: results.len(),
            passed_checks: count(DiagnosticStatus::Ok),
            warning_checks: count(DiagnosticStatus::Warning),
            failed_checks: count(DiagnosticStatus::Error),
        }
    }

    /// Worst status across the run; Ok for an empty run
    pub fn overall(&self) -> DiagnosticStatus {
        if self.failed_checks > 0 {
            DiagnosticStatus::Error
        } else if self.warning_checks > 0 {
            DiagnosticStatus::Warning
        } else {
            DiagnosticStatus::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub generated_at: DateTime<Local>,
    pub system_info: SystemInfo,
    pub results: Vec<DiagnosticResult>,
    pub summary: ReportSummary,
}

impl DiagnosticReport {
    pub fn new(results: Vec<DiagnosticResult>, system_info: SystemInfo) -> Self {
        Self {
            generated_at: Local::now(),
            system_info,
            summary: ReportSummary::from_results(&results),
            results,
        }
    }

    /// Ids of results a repair could address
    pub fn repairable_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.repairable && r.status != DiagnosticStatus::Ok)
            .map(|r| r.id.as_str())
            .collect()
    }

    /// Write as JSON into `dir`, creating it if needed. Returns the file path.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        write_report(self, dir, self.generated_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepairSummary {
    pub total_repairs: usize,
    pub successful_repairs: usize,
    pub failed_repairs: usize,
    pub requires_reboot: bool,
}

impl RepairSummary {
    pub fn from_results(results: &[RepairResult]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total_repairs: results.len(),
            successful_repairs: successful,
            failed_repairs: results.len() - successful,
            requires_reboot: results.iter().any(|r| r.require_reboot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    pub generated_at: DateTime<Local>,
    pub results: Vec<RepairResult>,
    pub summary: RepairSummary,
}

impl RepairReport {
    pub fn new(results: Vec<RepairResult>) -> Self {
        Self {
            generated_at: Local::now(),
            summary: RepairSummary::from_results(&results),
            results,
        }
    }
}

/// `<home>/.netmedic/reports`, or a relative `reports` directory without a home
pub fn default_report_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".netmedic").join("reports"))
        .unwrap_or_else(|| PathBuf::from("reports"))
}

fn write_report<T: Serialize>(report: &T, dir: &Path, at: DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("report_{}.json", at.format("%Y%m%d_%H%M%S")));
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;
    info!("Report written to {}", path.display());
    Ok(path)
}
