//! End-to-end runs of the standard engines against scripted collaborators

use netmedic_common::command_exec::FakeCommandRunner;
use netmedic_common::interfaces::{RawInterface, StaticInterfaceSource};
use netmedic_common::proxy_store::{MemoryProxyStore, ProxyStore};
use netmedic_common::reachability::FakeReachability;
use netmedic_common::report::{DiagnosticReport, RepairReport, SystemInfo};
use netmedic_common::{
    DiagnosticEngine, DiagnosticStatus, NetmedicConfig, ProxyConfig, RepairEngine, SystemContext,
};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const IPCONFIG: &str = "\
Windows IP Configuration

Ethernet adapter Ethernet:

   DHCP Enabled. . . . . . . . . . . : Yes
   IPv4 Address. . . . . . . . . . . : 192.168.1.10(Preferred)
   Subnet Mask . . . . . . . . . . . : 255.255.255.0
   Default Gateway . . . . . . . . . : 192.168.1.1
   DNS Servers . . . . . . . . . . . : 192.168.1.1
";

struct Fixture {
    _dir: tempfile::TempDir,
    ctx: SystemContext,
    runner: Arc<FakeCommandRunner>,
    proxy: Arc<MemoryProxyStore>,
}

fn fixture(hosts: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let hosts_path = dir.path().join("hosts");
    std::fs::write(&hosts_path, hosts).unwrap();

    let mut config = NetmedicConfig::default();
    config.hosts.path = hosts_path;
    config.ip_renew.pause_ms = 0;
    config.adapter_reset.pause_ms = 0;

    let runner = Arc::new(
        FakeCommandRunner::new()
            .succeed("ipconfig /all", IPCONFIG)
            .succeed("ipconfig /flushdns", "Successfully flushed the DNS Resolver Cache.")
            .succeed("netsh winsock reset", "Successfully reset the Winsock Catalog.")
            .fail("netsh int ip reset", "Access is denied."),
    );
    let proxy = Arc::new(MemoryProxyStore::new(ProxyConfig {
        enabled: true,
        server: "127.0.0.1:7890".to_string(),
        port: 7890,
        ..Default::default()
    }));
    let interfaces = StaticInterfaceSource::new(vec![RawInterface {
        name: "Ethernet".to_string(),
        mac_address: "00-15-5D-01-02-03".to_string(),
        is_up: true,
        ..Default::default()
    }]);
    let ip = IpAddr::V4(Ipv4Addr::new(110, 242, 68, 66));
    let reach = FakeReachability::new()
        .with_http("https://www.baidu.com", 200)
        .with_http("https://www.qq.com", 302)
        .with_dns("www.baidu.com", ip)
        .with_dns("www.qq.com", ip);

    let ctx = SystemContext::new(
        runner.clone(),
        Arc::new(interfaces),
        proxy.clone(),
        Arc::new(reach),
        config,
    );
    Fixture {
        _dir: dir,
        ctx,
        runner,
        proxy,
    }
}

#[tokio::test]
async fn diagnose_all_produces_one_result_per_probe() {
    let fx = fixture("127.0.0.1 localhost\n1.2.3.4 www.baidu.com\n");
    let engine = DiagnosticEngine::standard(&fx.ctx);

    let results = engine.run_all(&CancellationToken::new()).await;
    let statuses: Vec<(&str, DiagnosticStatus)> =
        results.iter().map(|r| (r.id.as_str(), r.status)).collect();

    assert_eq!(
        statuses,
        [
            ("adapter", DiagnosticStatus::Ok),
            ("ip", DiagnosticStatus::Ok),
            ("dns", DiagnosticStatus::Ok),
            ("hosts", DiagnosticStatus::Warning),
            ("proxy", DiagnosticStatus::Warning),
            ("connectivity", DiagnosticStatus::Ok),
        ]
    );
    assert!(results.iter().all(|r| !r.message.is_empty()));
    assert_eq!(engine.results().len(), 6);

    let report = DiagnosticReport::new(results, SystemInfo::default());
    assert_eq!(report.summary.passed_checks, 4);
    assert_eq!(report.summary.warning_checks, 2);
    assert_eq!(report.repairable_ids(), ["hosts", "proxy"]);
}

#[tokio::test]
async fn repairs_for_flagged_probes_fix_them() {
    let fx = fixture("1.2.3.4 www.baidu.com\n");
    let diagnostics = DiagnosticEngine::standard(&fx.ctx);
    let repairs = RepairEngine::standard(&fx.ctx);
    let cancel = CancellationToken::new();

    for id in ["hosts", "proxy"] {
        let result = repairs.run_single(id, &cancel).await;
        assert!(result.success, "{}: {}", id, result.message);
    }

    let hosts = diagnostics.run_single("hosts", &cancel).await;
    assert_eq!(hosts.status, DiagnosticStatus::Ok);
    let proxy = diagnostics.run_single("proxy", &cancel).await;
    assert_eq!(proxy.status, DiagnosticStatus::Ok);
    assert!(!fx.proxy.read_proxy(&cancel).await.unwrap().enabled);
}

#[tokio::test]
async fn repair_all_reports_mixed_outcomes() {
    let fx = fixture("127.0.0.1 localhost\n");
    let engine = RepairEngine::standard(&fx.ctx);

    let results = engine.run_all(&CancellationToken::new()).await;
    assert_eq!(results.len(), 7);

    let report = RepairReport::new(results);
    // winsock, dns, hosts and proxy succeed; tcpip, ip and adapter are unscripted or denied
    assert_eq!(report.summary.successful_repairs, 4);
    assert_eq!(report.summary.failed_repairs, 3);
    assert!(report.summary.requires_reboot);

    let calls = fx.runner.calls();
    assert_eq!(calls[0], "netsh winsock reset");
    assert_eq!(calls[1], "netsh int ip reset");
}

#[tokio::test]
async fn unknown_ids_yield_synthetic_failures() {
    let fx = fixture("");
    let cancel = CancellationToken::new();

    let diag = DiagnosticEngine::standard(&fx.ctx)
        .run_single("nonexistent-id", &cancel)
        .await;
    assert_eq!(diag.status, DiagnosticStatus::Error);
    assert!(!diag.repairable);

    let repair = RepairEngine::standard(&fx.ctx)
        .run_single("nonexistent-id", &cancel)
        .await;
    assert!(!repair.success);
    assert!(fx.runner.calls().is_empty());
}

#[tokio::test]
async fn repair_info_lists_admin_requirements() {
    let fx = fixture("");
    let engine = RepairEngine::standard(&fx.ctx);

    assert_eq!(engine.info("dns").map(|(_, admin)| admin), Some(false));
    assert_eq!(engine.info("winsock").map(|(_, admin)| admin), Some(true));
    assert_eq!(engine.ids().len(), 7);
}
