//! Dev launcher: start the backend, give it a head start, start the
//! frontend, and keep the pair alive together. Ctrl-C or either process
//! exiting tears the other one down.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tasklane_config::LauncherConfig;
use tokio::process::{Child, Command};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tasklane-launcher", version, about)]
struct Args {
    /// Path to a configuration file. Falls back to the `TASKLANE_CONFIG`
    /// environment variable and the default search locations.
    #[arg(long, env = "TASKLANE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let args = Args::parse();
    let config = tasklane_config::load_from(args.config).context("loading configuration")?;

    run(config.launcher).await
}

async fn run(config: LauncherConfig) -> anyhow::Result<()> {
    let mut backend = spawn(&config.backend_command).context("starting backend")?;
    info!(command = %config.backend_command, "backend started");

    info!(
        seconds = config.startup_delay_seconds,
        "waiting before starting frontend"
    );
    tokio::time::sleep(Duration::from_secs(config.startup_delay_seconds)).await;

    let mut frontend = match spawn(&config.frontend_command).context("starting frontend") {
        Ok(child) => child,
        Err(err) => {
            shutdown("backend", &mut backend).await;
            return Err(err);
        }
    };
    info!(command = %config.frontend_command, "frontend started");

    tokio::select! {
        status = backend.wait() => {
            warn!(?status, "backend exited, stopping frontend");
            shutdown("frontend", &mut frontend).await;
        }
        status = frontend.wait() => {
            warn!(?status, "frontend exited, stopping backend");
            shutdown("backend", &mut backend).await;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, stopping both processes");
            shutdown("frontend", &mut frontend).await;
            shutdown("backend", &mut backend).await;
        }
    }

    Ok(())
}

fn spawn(command_line: &str) -> anyhow::Result<Child> {
    let (program, args) = split_command(command_line)?;
    Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning `{command_line}`"))
}

async fn shutdown(name: &str, child: &mut Child) {
    if let Err(err) = child.start_kill() {
        // Already gone is the usual reason.
        warn!(%name, error = %err, "could not signal process");
    }
    match child.wait().await {
        Ok(status) => info!(%name, ?status, "process stopped"),
        Err(err) => warn!(%name, error = %err, "could not reap process"),
    }
}

/// Split a command line on whitespace. Quoting is not supported; the
/// launcher only runs simple dev commands.
fn split_command(command_line: &str) -> anyhow::Result<(String, Vec<String>)> {
    let mut parts = command_line.split_whitespace().map(str::to_string);
    let Some(program) = parts.next() else {
        bail!("empty command");
    };
    Ok((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_program_and_arguments() {
        let (program, args) = split_command("cargo run -p tasklane-server").unwrap();
        assert_eq!(program, "cargo");
        assert_eq!(args, vec!["run", "-p", "tasklane-server"]);
    }

    #[test]
    fn single_word_commands_have_no_arguments() {
        let (program, args) = split_command("ls").unwrap();
        assert_eq!(program, "ls");
        assert!(args.is_empty());
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(split_command("   ").is_err());
    }

    #[tokio::test]
    async fn frontend_exit_stops_the_backend() {
        let config = LauncherConfig {
            backend_command: "sleep 30".to_string(),
            frontend_command: "true".to_string(),
            startup_delay_seconds: 0,
        };

        // `true` exits immediately, so run() must return instead of
        // waiting out the 30-second sleep.
        tokio::time::timeout(Duration::from_secs(5), run(config))
            .await
            .expect("launcher should tear down within the timeout")
            .unwrap();
    }
}
