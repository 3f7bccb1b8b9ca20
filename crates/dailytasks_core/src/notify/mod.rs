use crate::config::{NotificationMode, Palette};
use crate::error::AppError;
use std::time::Duration;
use tracing::debug;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

pub const DISABLE_ENV_VAR: &str = "DAILYTASKS_DISABLE_NOTIFICATIONS";

/// How long a notice stays on screen. Purely cosmetic.
pub const NOTICE_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn label(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }
}

pub trait Notifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) -> Result<(), AppError> {
        Ok(())
    }
}

/// Prints notices on stderr so they never mix with command output.
pub struct TerminalNotifier {
    palette: Palette,
}

impl TerminalNotifier {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn format(&self, notice: &Notice) -> String {
        match notice.kind {
            NoticeKind::Success | NoticeKind::Info => self.palette.accentize(&notice.message),
            NoticeKind::Warning | NoticeKind::Error => format!(
                "{} {}",
                self.palette.mutedize(&format!("[{}]", notice.kind.label())),
                notice.message
            ),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        eprintln!("{}", self.format(notice));
        Ok(())
    }
}

pub fn notifier_for(mode: NotificationMode, palette: Palette) -> Box<dyn Notifier> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Box::new(NoopNotifier);
    }

    match mode {
        NotificationMode::Off => Box::new(NoopNotifier),
        NotificationMode::Terminal => Box::new(TerminalNotifier::new(palette)),
        NotificationMode::Desktop => match platform_notifier() {
            Ok(notifier) => notifier,
            Err(err) => {
                debug!(%err, "desktop notifications unavailable, using terminal");
                Box::new(TerminalNotifier::new(palette))
            }
        },
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
