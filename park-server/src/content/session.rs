//! Per-section edit sessions
//!
//! Each editable settings section runs an independent draft-vs-committed
//! state machine:
//!
//! ```text
//! Viewing ──start──▶ Editing(draft) ──take_draft──▶ (saving)
//!    ▲                   │    ▲                        │
//!    └──────cancel───────┘    └───restore (save failed)┘
//! ```
//!
//! While a save is in flight the draft has been taken, so no second save
//! can be issued for that section; on failure the draft is restored and
//! the session is editable again.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use shared::models::{Facilities, ParkSettings, ParkSettingsUpdate, Prices, Timings};

/// Editable settings sections; each runs its own session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Timings,
    Prices,
    Facilities,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timings => "timings",
            Self::Prices => "prices",
            Self::Facilities => "facilities",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "timings" => Some(Self::Timings),
            "prices" => Some(Self::Prices),
            "facilities" => Some(Self::Facilities),
            _ => None,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draft payload for one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "draft", rename_all = "lowercase")]
pub enum SectionDraft {
    Timings(Timings),
    Prices(Prices),
    Facilities(Facilities),
}

impl SectionDraft {
    pub fn section(&self) -> Section {
        match self {
            Self::Timings(_) => Section::Timings,
            Self::Prices(_) => Section::Prices,
            Self::Facilities(_) => Section::Facilities,
        }
    }

    /// Seed a draft from the committed settings
    pub fn from_settings(section: Section, settings: &ParkSettings) -> Self {
        match section {
            Section::Timings => Self::Timings(settings.timings.clone()),
            Section::Prices => Self::Prices(settings.prices),
            Section::Facilities => Self::Facilities(settings.facilities),
        }
    }

    /// Convert the draft into a partial update touching only its section
    pub fn into_update(self) -> ParkSettingsUpdate {
        match self {
            Self::Timings(timings) => ParkSettingsUpdate {
                timings: Some(timings),
                ..Default::default()
            },
            Self::Prices(prices) => ParkSettingsUpdate {
                prices: Some(prices),
                ..Default::default()
            },
            Self::Facilities(facilities) => ParkSettingsUpdate {
                facilities: Some(facilities),
                ..Default::default()
            },
        }
    }
}

/// Draft-vs-committed state machine for one section
#[derive(Debug, Clone)]
pub struct EditSession<T: Clone> {
    draft: Option<T>,
}

impl<T: Clone> Default for EditSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> EditSession<T> {
    pub fn new() -> Self {
        Self { draft: None }
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Enter editing, seeding the draft from committed data.
    ///
    /// Any stale draft from an abandoned session is overwritten.
    pub fn start(&mut self, committed: T) {
        self.draft = Some(committed);
    }

    /// Replace the draft; returns false when not editing
    pub fn set_draft(&mut self, draft: T) -> bool {
        if self.draft.is_some() {
            self.draft = Some(draft);
            true
        } else {
            false
        }
    }

    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    /// Discard the draft and return to viewing
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Take the draft for saving, leaving the session out of editing.
    ///
    /// This is the mutual exclusion for saves: a second save finds no
    /// draft. The caller restores the draft when the save fails.
    pub fn take_draft(&mut self) -> Option<T> {
        self.draft.take()
    }

    /// Re-enter editing with a draft whose save failed
    pub fn restore(&mut self, draft: T) {
        self.draft = Some(draft);
    }
}

/// Independent edit sessions for all settings sections
#[derive(Debug, Default)]
pub struct SectionSessions {
    sessions: HashMap<Section, EditSession<SectionDraft>>,
}

impl SectionSessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&mut self, section: Section) -> &mut EditSession<SectionDraft> {
        self.sessions.entry(section).or_default()
    }

    pub fn is_editing(&self, section: Section) -> bool {
        self.sessions
            .get(&section)
            .is_some_and(|session| session.is_editing())
    }

    /// Start editing a section, seeding its draft from committed settings
    pub fn start(&mut self, section: Section, committed: &ParkSettings) -> SectionDraft {
        let draft = SectionDraft::from_settings(section, committed);
        self.session(section).start(draft.clone());
        draft
    }

    /// Replace a section's draft; the payload section must match
    pub fn set_draft(&mut self, section: Section, draft: SectionDraft) -> Result<(), String> {
        if draft.section() != section {
            return Err(format!(
                "Draft payload is for section '{}', expected '{}'",
                draft.section(),
                section
            ));
        }
        if self.session(section).set_draft(draft) {
            Ok(())
        } else {
            Err(format!("Section '{}' is not being edited", section))
        }
    }

    pub fn draft(&self, section: Section) -> Option<SectionDraft> {
        self.sessions
            .get(&section)
            .and_then(|session| session.draft().cloned())
    }

    pub fn cancel(&mut self, section: Section) {
        self.session(section).cancel();
    }

    pub fn take_draft(&mut self, section: Section) -> Option<SectionDraft> {
        self.session(section).take_draft()
    }

    pub fn restore(&mut self, section: Section, draft: SectionDraft) {
        self.session(section).restore(draft);
    }

    /// Drop every draft (admin logout)
    pub fn reset_all(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed() -> ParkSettings {
        ParkSettings::with_defaults(1000)
    }

    #[test]
    fn test_start_seeds_draft_from_committed() {
        let mut sessions = SectionSessions::new();
        let draft = sessions.start(Section::Prices, &committed());
        assert_eq!(draft, SectionDraft::Prices(Prices::default()));
        assert!(sessions.is_editing(Section::Prices));
        assert!(!sessions.is_editing(Section::Timings));
    }

    #[test]
    fn test_cancel_discards_draft_and_restart_reseeds() {
        let mut sessions = SectionSessions::new();
        let settings = committed();

        sessions.start(Section::Prices, &settings);
        sessions
            .set_draft(
                Section::Prices,
                SectionDraft::Prices(Prices {
                    weekday: 9999,
                    weekend: 9999,
                }),
            )
            .unwrap();
        sessions.cancel(Section::Prices);
        assert!(!sessions.is_editing(Section::Prices));

        // A later session must not see the abandoned draft
        let draft = sessions.start(Section::Prices, &settings);
        assert_eq!(draft, SectionDraft::Prices(settings.prices));
    }

    #[test]
    fn test_set_draft_requires_editing_state() {
        let mut sessions = SectionSessions::new();
        let err = sessions
            .set_draft(Section::Timings, SectionDraft::Timings(Timings::default()))
            .unwrap_err();
        assert!(err.contains("not being edited"));
    }

    #[test]
    fn test_set_draft_rejects_mismatched_section() {
        let mut sessions = SectionSessions::new();
        sessions.start(Section::Timings, &committed());
        let err = sessions
            .set_draft(Section::Timings, SectionDraft::Prices(Prices::default()))
            .unwrap_err();
        assert!(err.contains("expected 'timings'"));
    }

    #[test]
    fn test_sections_are_independent() {
        let mut sessions = SectionSessions::new();
        let settings = committed();

        sessions.start(Section::Timings, &settings);
        sessions.start(Section::Prices, &settings);
        sessions.cancel(Section::Prices);

        assert!(sessions.is_editing(Section::Timings));
        assert!(!sessions.is_editing(Section::Prices));
    }

    #[test]
    fn test_take_draft_blocks_second_save_until_restore() {
        let mut sessions = SectionSessions::new();
        sessions.start(Section::Facilities, &committed());

        let draft = sessions.take_draft(Section::Facilities).unwrap();
        // While the save is in flight there is nothing left to take
        assert!(sessions.take_draft(Section::Facilities).is_none());

        sessions.restore(Section::Facilities, draft.clone());
        assert_eq!(sessions.take_draft(Section::Facilities), Some(draft));
    }

    #[test]
    fn test_draft_serde_shape() {
        let draft = SectionDraft::Prices(Prices {
            weekday: 350,
            weekend: 500,
        });
        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains("\"section\":\"prices\""));

        let parsed: SectionDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, draft);
    }
}
