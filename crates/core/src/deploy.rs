//! Remote deployment over ssh.
//!
//! Deployment is a single composed remote command: update the checkout,
//! make sure the serving container is up, then purge its cache.

use std::process::{Command, Stdio};

use log::warn;
use which::which;

use crate::{
    config::BuildConfig,
    error::{Error, Result},
};

/// True when ssh is installed and the deployment host answers.
pub fn ssh_available(config: &BuildConfig) -> bool {
    if which("ssh").is_err() {
        warn!("ssh is not installed");
        return false;
    }
    Command::new("ssh")
        .arg(&config.remote_host)
        .arg("echo ok")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// The command executed on the deployment host: pull the latest revision,
/// start the serving container if it is not running, purge its cache.
pub fn remote_command(config: &BuildConfig) -> String {
    let path = &config.remote_project_path;
    let name = &config.remote_container;
    let ctl = &config.remote_container_ctl;
    let purge = &config.remote_purge_cmd;
    format!(
        "echo cd into project && \
         cd \"{path}\" && \
         echo git pull && \
         git pull origin main && \
         echo check/start container \"{name}\" && \
         (docker ps -q -f name=\"{name}\" | grep -q . || {ctl} \"{name}\") && \
         echo run purge script && \
         docker exec \"{name}\" {purge}"
    )
}

/// Deploy to the remote host. [`Error::ToolUnavailable`] when the host is
/// unreachable; the caller decides whether that is fatal.
pub fn deploy(config: &BuildConfig) -> Result<()> {
    if !ssh_available(config) {
        return Err(Error::ToolUnavailable {
            tool: "ssh".to_string(),
            reason: format!("remote host {} is not accessible", config.remote_host),
        });
    }

    println!("Deploying to {}...", config.remote_host);
    let command = remote_command(config);
    let status = Command::new("ssh")
        .arg(&config.remote_host)
        .arg(&command)
        .status()
        .map_err(|e| Error::ToolUnavailable { tool: "ssh".to_string(), reason: e.to_string() })?;

    if !status.success() {
        return Err(Error::Command { command: format!("ssh {}", config.remote_host), status });
    }

    println!("Deployment completed successfully!");
    Ok(())
}
