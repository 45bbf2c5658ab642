//! Dialogue state for each user in each chat.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::screen::Participant;
use crate::domain::{InterviewDraft, InterviewType, NewRecruiter};

/// Field the add-interview dialogue is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStep {
    Company,
    Position,
    VacancyUrl,
    Recruiter,
    Date,
    Platform,
    PlatformUrl,
    Camera,
    Type,
    Confirm,
}

/// Field the use-template dialogue is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateUseStep {
    Company,
    Position,
    Recruiter,
    Date,
    VacancyUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecruiterStep {
    Name,
    Company,
    Email,
    Phone,
    Telegram,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStep {
    Name,
    Platform,
    PlatformUrl,
    Camera,
    Type,
}

/// Template fields collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDraft {
    pub name: Option<String>,
    pub platform_name: Option<String>,
    pub platform_url: Option<String>,
    pub camera_required: Option<bool>,
    pub interview_type: Option<InterviewType>,
}

/// What the bot is waiting for in a chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Dialogue {
    #[default]
    Idle,
    AddInterview {
        step: InterviewStep,
        draft: InterviewDraft,
    },
    UseTemplate {
        template_id: i32,
        step: TemplateUseStep,
        draft: InterviewDraft,
    },
    AddRecruiter {
        step: RecruiterStep,
        draft: NewRecruiter,
    },
    AddTemplate {
        step: TemplateStep,
        draft: TemplateDraft,
    },
    NotificationTimes,
    QuietHours,
    Timezone,
}

impl Dialogue {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// In-memory dialogue state, one slot per user per chat.
///
/// State is lost on restart; an interrupted dialogue simply starts over.
#[derive(Debug, Default)]
pub struct DialogueStorage {
    dialogues: Mutex<HashMap<Participant, Dialogue>>,
}

impl DialogueStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, who: Participant) -> Dialogue {
        self.dialogues
            .lock()
            .get(&who)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set(&self, who: Participant, dialogue: Dialogue) {
        let mut dialogues = self.dialogues.lock();
        if dialogue.is_idle() {
            dialogues.remove(&who);
        } else {
            dialogues.insert(who, dialogue);
        }
    }

    pub fn reset(&self, who: Participant) {
        self.dialogues.lock().remove(&who);
    }

    /// Number of unfinished dialogues.
    #[must_use]
    pub fn active(&self) -> usize {
        self.dialogues.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_participant_is_idle() {
        let storage = DialogueStorage::new();
        assert_eq!(storage.get(Participant::private(1)), Dialogue::Idle);
    }

    #[test]
    fn set_and_reset() {
        let storage = DialogueStorage::new();
        storage.set(Participant::private(1), Dialogue::Timezone);
        storage.set(Participant::private(2), Dialogue::QuietHours);
        assert_eq!(storage.get(Participant::private(1)), Dialogue::Timezone);
        assert_eq!(storage.active(), 2);

        storage.reset(Participant::private(1));
        assert_eq!(storage.get(Participant::private(1)), Dialogue::Idle);
        assert_eq!(storage.get(Participant::private(2)), Dialogue::QuietHours);
    }

    #[test]
    fn group_members_have_separate_dialogues() {
        let storage = DialogueStorage::new();
        storage.set(Participant::new(-100, 1), Dialogue::Timezone);
        assert_eq!(storage.get(Participant::new(-100, 2)), Dialogue::Idle);
        assert_eq!(storage.get(Participant::private(1)), Dialogue::Idle);
    }

    #[test]
    fn setting_idle_frees_the_slot() {
        let storage = DialogueStorage::new();
        storage.set(Participant::private(5), Dialogue::NotificationTimes);
        storage.set(Participant::private(5), Dialogue::Idle);
        assert_eq!(storage.active(), 0);
    }
}
