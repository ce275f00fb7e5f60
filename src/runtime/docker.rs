//! Docker CLI binding of the container runtime adapter

use std::path::PathBuf;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{ContainerRuntime, RuntimeError, RuntimeResult};

/// Default shell used to interpret exec commands inside the container.
pub const DEFAULT_EXEC_SHELL: &str = "/bin/sh";

/// `docker exec` statuses that come from the engine rather than the command:
/// 125 for daemon errors, 126 when the exec shell cannot be invoked.
const ENGINE_EXEC_FAILURES: [i32; 2] = [125, 126];

/// Runs container operations through a docker-compatible CLI.
///
/// Every invocation passes an argument vector straight to the binary; no
/// host shell is involved, so caller-supplied text can only ever reach the
/// shell *inside* the container.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    build_context: PathBuf,
    exec_shell: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            build_context: PathBuf::from("."),
            exec_shell: DEFAULT_EXEC_SHELL.to_string(),
        }
    }

    /// Directory passed as the build context of `image build`.
    pub fn with_build_context(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_context = dir.into();
        self
    }

    /// Shell used as `<shell> -c <command>` for exec.
    pub fn with_exec_shell(mut self, shell: impl Into<String>) -> Self {
        self.exec_shell = shell.into();
        self
    }

    async fn output(&self, op: &str, args: &[&str]) -> RuntimeResult<Output> {
        debug!(binary = %self.binary, ?args, "invoking container runtime");
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RuntimeError::CommandFailed {
                command: op.to_string(),
                message: e.to_string(),
            })
    }

    /// Run and require a zero exit status.
    async fn checked(&self, op: &str, args: &[&str]) -> RuntimeResult<String> {
        let output = self.output(op, args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RuntimeError::CommandFailed {
                command: op.to_string(),
                message: stderr.trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn ids(&self, filter: &str, all: bool) -> RuntimeResult<Vec<String>> {
        validate_filter(filter)?;

        let mut args = vec!["container", "ls", "-q"];
        if all {
            args.push("-a");
        }
        args.extend(["--filter", filter]);

        let stdout = self.checked("ls", &args).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

fn validate_filter(filter: &str) -> RuntimeResult<()> {
    if filter.trim().is_empty() {
        return Err(RuntimeError::InvalidInput(
            "filter expression cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn build(&self, dockerfile: &str, image: &str, tag: &str) -> RuntimeResult<()> {
        let reference = format!("{}:{}", image, tag);
        let context = self.build_context.to_string_lossy();
        self.checked(
            "build",
            &["image", "build", &context, "-t", &reference, "-f", dockerfile],
        )
        .await?;
        Ok(())
    }

    async fn run(&self, container_name: &str, image: &str, tag: &str) -> RuntimeResult<()> {
        let reference = format!("{}:{}", image, tag);
        self.checked(
            "run",
            &["container", "run", "--name", container_name, "-d", &reference],
        )
        .await?;
        Ok(())
    }

    async fn list(&self, filter: &str) -> RuntimeResult<Vec<String>> {
        self.ids(filter, false).await
    }

    async fn stop(&self, filter: &str) -> RuntimeResult<()> {
        let ids = self.ids(filter, false).await?;
        if ids.is_empty() {
            return Ok(());
        }
        let mut args = vec!["container", "stop"];
        args.extend(ids.iter().map(String::as_str));
        self.checked("stop", &args).await?;
        Ok(())
    }

    async fn remove(&self, filter: &str) -> RuntimeResult<()> {
        // Stopped containers no longer show up in the running list.
        let ids = self.ids(filter, true).await?;
        if ids.is_empty() {
            return Ok(());
        }
        let mut args = vec!["container", "rm"];
        args.extend(ids.iter().map(String::as_str));
        self.checked("rm", &args).await?;
        Ok(())
    }

    async fn remove_image(&self, image: &str, tag: &str) -> RuntimeResult<()> {
        let reference = format!("{}:{}", image, tag);
        self.checked("rmi", &["image", "rm", "-f", &reference]).await?;
        Ok(())
    }

    async fn exec(&self, filter: &str, command: &str) -> RuntimeResult<String> {
        let id = self
            .ids(filter, false)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RuntimeError::ContainerNotFound(filter.to_string()))?;

        // No timeout: a command that never exits holds this request open.
        let output = self
            .output("exec", &["container", "exec", &id, &self.exec_shell, "-c", command])
            .await?;

        match output.status.code() {
            Some(code) if ENGINE_EXEC_FAILURES.contains(&code) => {
                return Err(RuntimeError::CommandFailed {
                    command: "exec".to_string(),
                    message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
            // Any other status belongs to the user's command; its output is the reply.
            Some(code) if code != 0 => debug!(code, "exec finished with non-zero status"),
            _ => {}
        }

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
