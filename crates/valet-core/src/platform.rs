//! Platform-open fallback.
//!
//! Maps a free-text application hint to a host-specific "launch
//! application" call. The hint is classified by keyword into a small set of
//! well-known categories, each mapped per platform family to a concrete
//! open invocation. Unsupported platform/category combinations return
//! guidance strings; launch failures are caught and rendered as a result
//! string containing the literal [`FAILURE_MARKER`], never an unhandled
//! fault.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// Literal marker the engine looks for to flag a failed open.
pub const FAILURE_MARKER: &str = "Failed to open";

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// The three recognized host platform families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// Detect the platform family of the build host.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Resolve the platform from an optional config override, falling back
    /// to detection. Unrecognized overrides are logged and ignored.
    pub fn from_override(value: Option<&str>) -> Self {
        match value {
            Some(s) => s.parse().unwrap_or_else(|_| {
                tracing::warn!(platform = s, "unrecognized platform override, detecting");
                Platform::detect()
            }),
            None => Platform::detect(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macOS"),
            Platform::Windows => write!(f, "Windows"),
            Platform::Linux => write!(f, "Linux"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "macos" | "darwin" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            other => Err(format!("unknown platform: '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Launcher collaborator
// ---------------------------------------------------------------------------

/// A concrete platform-open invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// The platform-level "open application" primitive for `app`.
    pub fn open_app(platform: Platform, app: &str) -> Self {
        match platform {
            Platform::MacOs => LaunchCommand {
                program: "open".to_string(),
                args: vec!["-a".to_string(), app.to_string()],
            },
            Platform::Windows => LaunchCommand {
                program: "cmd".to_string(),
                args: vec![
                    "/C".to_string(),
                    "start".to_string(),
                    String::new(),
                    app.to_string(),
                ],
            },
            Platform::Linux => LaunchCommand {
                program: "xdg-open".to_string(),
                args: vec![app.to_string()],
            },
        }
    }

    /// The platform-level "open URL in default browser" primitive.
    pub fn open_url(platform: Platform, url: &str) -> Self {
        match platform {
            Platform::MacOs => LaunchCommand {
                program: "open".to_string(),
                args: vec![url.to_string()],
            },
            Platform::Windows => LaunchCommand {
                program: "cmd".to_string(),
                args: vec![
                    "/C".to_string(),
                    "start".to_string(),
                    String::new(),
                    url.to_string(),
                ],
            },
            Platform::Linux => LaunchCommand {
                program: "xdg-open".to_string(),
                args: vec![url.to_string()],
            },
        }
    }
}

/// Launch failure, rendered into the failure-marker result string.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{0}")]
    Spawn(String),

    #[error("exited with status {0}")]
    Status(i32),
}

/// The side-effecting "open application" primitive. Infra spawns a process;
/// tests record the command instead.
pub trait AppLauncher: Send + Sync {
    fn launch<'a>(
        &'a self,
        command: &'a LaunchCommand,
    ) -> Pin<Box<dyn Future<Output = Result<(), LaunchError>> + Send + 'a>>;
}

// ---------------------------------------------------------------------------
// Category classification
// ---------------------------------------------------------------------------

/// Well-known application categories the fallback recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCategory {
    Camera,
    Reminders,
    Browser,
    Terminal,
    Settings,
}

impl AppCategory {
    /// Classify a hint (plus the step subject, when present) by substring.
    pub fn classify(hint: &str, subject: Option<&str>) -> Option<Self> {
        let hint = hint.to_lowercase();
        let subject = subject.map(|s| s.to_lowercase()).unwrap_or_default();

        if hint.contains("camera")
            || hint.contains("photo booth")
            || subject.contains("camera")
            || subject.contains("photo booth")
        {
            Some(AppCategory::Camera)
        } else if hint.contains("reminder") || subject.contains("reminder") {
            Some(AppCategory::Reminders)
        } else if hint.contains("safari")
            || hint.contains("browser")
            || hint.contains("web")
            || subject.contains("safari")
        {
            Some(AppCategory::Browser)
        } else if hint.contains("terminal")
            || hint.contains("shell")
            || subject.contains("terminal")
        {
            Some(AppCategory::Terminal)
        } else if hint.contains("settings")
            || hint.contains("preferences")
            || subject.contains("system preferences")
        {
            Some(AppCategory::Settings)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// PlatformOpener
// ---------------------------------------------------------------------------

/// Maps application hints to launch invocations and renders every outcome
/// as a user-facing result string.
pub struct PlatformOpener {
    platform: Platform,
    launcher: Arc<dyn AppLauncher>,
}

impl PlatformOpener {
    pub fn new(platform: Platform, launcher: Arc<dyn AppLauncher>) -> Self {
        PlatformOpener { platform, launcher }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Open the application named by `hint`, consulting `subject` for
    /// category classification. Always returns a result string.
    pub async fn open(&self, hint: &str, subject: Option<&str>) -> String {
        let hint_lower = hint.to_lowercase();
        tracing::info!(hint = %hint, platform = %self.platform, "platform-open fallback");

        match AppCategory::classify(&hint_lower, subject) {
            Some(category) => self.open_category(category).await,
            None => {
                if hint_lower.contains("open")
                    || hint_lower.contains("launch")
                    || hint_lower.contains("start")
                {
                    "I see you want to open or launch an app, but I need to know the exact \
                     app name. Please specify the application you want to open (e.g., \
                     'open Safari', 'open Terminal', 'open Camera')."
                        .to_string()
                } else {
                    format!(
                        "Unknown action: {hint}. Valet could not execute this step directly. \
                         If this is a system-level task, please specify your OS and the app \
                         you want to use, or ask for a step-by-step guide."
                    )
                }
            }
        }
    }

    async fn open_category(&self, category: AppCategory) -> String {
        match (category, self.platform) {
            (AppCategory::Camera, Platform::MacOs) => {
                self.try_open("Photo Booth", "Photo Booth (camera)").await
            }
            (AppCategory::Camera, Platform::Windows) => {
                self.try_open("Camera", "Camera app").await
            }
            (AppCategory::Camera, Platform::Linux) => {
                self.try_open("cheese", "Cheese (camera app)").await
            }

            (AppCategory::Reminders, Platform::MacOs) => {
                self.try_open("Reminders", "Reminders app").await
            }
            (AppCategory::Reminders, Platform::Windows) => {
                "Please use the Windows 'Alarms & Clock' or 'Cortana' to set reminders."
                    .to_string()
            }
            (AppCategory::Reminders, Platform::Linux) => {
                "Please use your preferred calendar/reminder app on Linux.".to_string()
            }

            (AppCategory::Browser, Platform::MacOs) => {
                self.try_open("Safari", "Safari (web browser)").await
            }
            (AppCategory::Browser, Platform::Windows) => {
                self.try_open("chrome", "Chrome browser").await
            }
            (AppCategory::Browser, Platform::Linux) => {
                self.try_open("firefox", "Firefox browser").await
            }

            (AppCategory::Terminal, Platform::MacOs) => {
                self.try_open("Terminal", "Terminal").await
            }
            (AppCategory::Terminal, Platform::Windows) => {
                self.try_open("cmd", "Command Prompt").await
            }
            (AppCategory::Terminal, Platform::Linux) => {
                self.try_open("gnome-terminal", "Terminal").await
            }

            (AppCategory::Settings, Platform::MacOs) => {
                self.try_open("System Settings", "System Settings").await
            }
            (AppCategory::Settings, Platform::Windows) => {
                self.try_open("ms-settings:", "Windows Settings").await
            }
            (AppCategory::Settings, Platform::Linux) => {
                self.try_open("gnome-control-center", "Settings").await
            }
        }
    }

    async fn try_open(&self, app: &str, friendly: &str) -> String {
        let command = LaunchCommand::open_app(self.platform, app);
        match self.launcher.launch(&command).await {
            Ok(()) => {
                tracing::info!(app, platform = %self.platform, "opened application");
                format!("Opened {friendly} on your {} system.", self.platform)
            }
            Err(e) => {
                tracing::error!(app, error = %e, "platform open failed");
                format!("{FAILURE_MARKER} {friendly}: {e}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
