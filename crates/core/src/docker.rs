//! Multi-arch container image build and push.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use log::warn;
use which::which;

use crate::{
    config::BuildConfig,
    error::{Error, Result},
};

/// True when the docker daemon is reachable and buildx is installed.
pub fn docker_available() -> bool {
    if which("docker").is_err() {
        warn!("docker is not installed");
        return false;
    }
    if !probe(&["info"]) {
        warn!("docker daemon is not running");
        return false;
    }
    if !probe(&["buildx", "version"]) {
        warn!("docker buildx is not available");
        return false;
    }
    true
}

/// Build and push the image for the `latest` and version tags across the
/// configured platforms. [`Error::ToolUnavailable`] when docker/buildx is
/// missing; the caller decides whether that is fatal.
pub fn build_images(root: &Path, config: &BuildConfig, version: &str) -> Result<()> {
    if !docker_available() {
        return Err(Error::ToolUnavailable {
            tool: "docker".to_string(),
            reason: "daemon not running or buildx missing".to_string(),
        });
    }

    // Cross-building needs QEMU emulation; only Linux hosts set it up.
    if cfg!(target_os = "linux") {
        ensure_multiarch_builder(config)?;
    }

    println!("Building container image...");
    for tag in ["latest", version] {
        println!("Building {}:{tag}...", config.docker_image);
        run_docker(
            &[
                "buildx",
                "build",
                "--platform",
                &config.docker_platforms,
                "-t",
                &format!("{}:{tag}", config.docker_image),
                "--push",
                ".",
            ],
            Some(root),
        )?;
    }

    println!("Built container image successfully!");
    Ok(())
}

/// Make sure a named buildx builder with cross-arch support exists and is
/// active.
pub fn ensure_multiarch_builder(config: &BuildConfig) -> Result<()> {
    println!("Setting up multi-arch buildx builder...");

    // QEMU binfmt handlers; may already be installed.
    let binfmt = Command::new("docker")
        .args(["run", "--privileged", "--rm", "tonistiigi/binfmt", "--install", "all"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if !binfmt.map(|s| s.success()).unwrap_or(false) {
        warn!("QEMU binfmt install may have failed or is already installed, continuing");
    }

    let builder = config.buildx_builder.as_str();
    let listing = Command::new("docker")
        .args(["buildx", "ls"])
        .output()
        .map_err(|e| spawn_failure(e))?;
    if String::from_utf8_lossy(&listing.stdout).contains(builder) {
        run_docker(&["buildx", "use", builder], None)?;
    } else {
        run_docker(&["buildx", "create", "--name", builder, "--use"], None)?;
    }

    run_docker(&["buildx", "inspect", builder, "--bootstrap"], None)
}

fn probe(args: &[&str]) -> bool {
    Command::new("docker")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn run_docker(args: &[&str], cwd: Option<&Path>) -> Result<()> {
    let mut command = Command::new("docker");
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let status = command.status().map_err(|e| spawn_failure(e))?;
    if !status.success() {
        return Err(Error::Command { command: format!("docker {}", args.join(" ")), status });
    }
    Ok(())
}

fn spawn_failure(source: std::io::Error) -> Error {
    Error::ToolUnavailable { tool: "docker".to_string(), reason: source.to_string() }
}
