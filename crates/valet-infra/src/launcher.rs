//! Process-spawning app launcher.

use std::future::Future;
use std::pin::Pin;

use tokio::process::Command;

use valet_core::platform::{AppLauncher, LaunchCommand, LaunchError};

/// Launches applications by spawning the platform open primitive and
/// waiting for it to exit. The primitives (`open`, `cmd /C start`,
/// `xdg-open`) hand off to the target application and return promptly.
pub struct ProcessLauncher;

impl AppLauncher for ProcessLauncher {
    fn launch<'a>(
        &'a self,
        command: &'a LaunchCommand,
    ) -> Pin<Box<dyn Future<Output = Result<(), LaunchError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!(program = %command.program, args = ?command.args, "spawning launcher");

            let status = Command::new(&command.program)
                .args(&command.args)
                .status()
                .await
                .map_err(|e| LaunchError::Spawn(e.to_string()))?;

            if status.success() {
                Ok(())
            } else {
                Err(LaunchError::Status(status.code().unwrap_or(-1)))
            }
        })
    }
}
