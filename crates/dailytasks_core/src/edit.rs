use crate::model::Task;

/// An in-progress inline edit of one task.
///
/// The presentation layer owns the session between `begin_edit` and either
/// `commit_edit` or `cancel_edit`; the store only sees the final outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    task_id: u64,
    seed: String,
    buffer: String,
}

impl EditSession {
    pub(crate) fn new(task: &Task) -> Self {
        Self {
            task_id: task.id,
            seed: task.text.clone(),
            buffer: task.text.clone(),
        }
    }

    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    /// Text of the task when editing began.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// True when committing would change the stored text.
    pub fn is_modified(&self) -> bool {
        let trimmed = self.buffer.trim();
        !trimmed.is_empty() && trimmed != self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::EditSession;
    use crate::model::Task;

    #[test]
    fn session_starts_from_seed() {
        let session = EditSession::new(&Task::new(7, "Walk dog"));

        assert_eq!(session.task_id(), 7);
        assert_eq!(session.seed(), "Walk dog");
        assert_eq!(session.text(), "Walk dog");
        assert!(!session.is_modified());
    }

    #[test]
    fn blank_or_padded_seed_is_not_a_modification() {
        let mut session = EditSession::new(&Task::new(1, "Read"));

        session.set_text("   ");
        assert!(!session.is_modified());

        session.set_text("  Read  ");
        assert!(!session.is_modified());

        session.set_text("Read a book");
        assert!(session.is_modified());
    }
}
