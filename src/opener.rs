use crate::config::Settings;
use std::process::{ExitStatus, Stdio};

/// Opener errors
#[derive(Debug, thiserror::Error)]
pub enum OpenerError {
    #[error("failed to go to {link}: could not run `{command}`: {source}. Check FERRET_GOTO_CMD environment variable")]
    Spawn {
        command: String,
        link: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to go to {link}: `{command}` exited with {status}{}. Check FERRET_GOTO_CMD environment variable", stderr_suffix(.stderr))]
    Failed {
        command: String,
        link: String,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(" ({stderr})")
    }
}

/// Launches the external URL opener for `goto`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opener {
    command: String,
}

impl Opener {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.goto_cmd.clone())
    }

    /// Run the opener with `link` as its sole argument and wait for it to exit
    pub async fn open(&self, link: &str) -> Result<(), OpenerError> {
        tracing::debug!(command = %self.command, link = %link, "opening result");

        let output = tokio::process::Command::new(&self.command)
            .arg(link)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| OpenerError::Spawn {
                command: self.command.clone(),
                link: link.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(OpenerError::Failed {
                command: self.command.clone(),
                link: link.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
