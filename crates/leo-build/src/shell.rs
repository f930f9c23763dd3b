/// Abstraction over local process execution for testability.
///
/// Production code uses [`RealShell`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ShellExecutor: Send + Sync {
    /// Run `program` with `args` to completion and capture its stdout.
    async fn run(&self, program: &str, args: &[String]) -> Result<String, ShellError>;
}

/// Spawns real processes through tokio.
pub struct RealShell;

impl ShellExecutor for RealShell {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, ShellError> {
        use std::process::Stdio;

        tracing::debug!(program, ?args, "running");

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ShellError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            Ok(stdout)
        } else {
            Err(ShellError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("failed to spawn {program}")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} {args:?} failed: {stderr}")]
    CommandFailed {
        program: String,
        args: Vec<String>,
        stderr: String,
    },
}
