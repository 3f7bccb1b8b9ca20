use crate::error::AppError;
use crate::notify::{NOTICE_DURATION, Notice, Notifier};
use notify_rust::{Notification, Timeout};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        Notification::new()
            .summary("dailytasks")
            .body(&notice.message)
            .timeout(Timeout::Milliseconds(NOTICE_DURATION.as_millis() as u32))
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
