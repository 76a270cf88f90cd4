//! Shared collaborators handed to every probe and repair

use crate::command_exec::{CommandRunner, CommandSpec, SystemCommandRunner};
use crate::config::NetmedicConfig;
use crate::interfaces::{default_interface_source, InterfaceSource};
use crate::proxy_store::{ProxyStore, RegProxyStore};
use crate::reachability::{Reachability, SystemReachability};
use std::sync::Arc;

#[derive(Clone)]
pub struct SystemContext {
    pub runner: Arc<dyn CommandRunner>,
    pub interfaces: Arc<dyn InterfaceSource>,
    pub proxy: Arc<dyn ProxyStore>,
    pub reachability: Arc<dyn Reachability>,
    pub config: Arc<NetmedicConfig>,
}

impl SystemContext {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        interfaces: Arc<dyn InterfaceSource>,
        proxy: Arc<dyn ProxyStore>,
        reachability: Arc<dyn Reachability>,
        config: NetmedicConfig,
    ) -> Self {
        Self {
            runner,
            interfaces,
            proxy,
            reachability,
            config: Arc::new(config),
        }
    }

    /// Real OS collaborators for this platform
    pub fn system(config: NetmedicConfig) -> Self {
        let timeout = config.commands.effective_timeout();
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
        Self::new(
            runner.clone(),
            default_interface_source(runner.clone(), timeout),
            Arc::new(RegProxyStore::new(runner, timeout)),
            Arc::new(SystemReachability::new()),
            config,
        )
    }

    /// A command spec carrying the configured timeout
    pub fn command<I, S>(&self, program: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(program, args).with_timeout(self.config.commands.effective_timeout())
    }
}

impl std::fmt::Debug for SystemContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
