//! Application list operations behind the main form and list views.
//!
//! All functions work on the caller-held list; persisting it afterwards with
//! [`RecordStore::save`](crate::core::store::RecordStore::save) is the caller's job.
//! Status edits made here are direct edits and do not go through the transition rules.

use crate::entities::{ApplicationRecord, ApplicationStatus, DATE_FORMAT};
use crate::errors::{Error, Result};
use mockable::Clock;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Format of freshly generated record ids.
pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// User-entered fields of an application, before an id and date are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDraft {
    /// Company applied to
    pub company: String,
    /// Position applied for
    pub position: String,
    /// Chosen status
    pub status: ApplicationStatus,
    /// Country of the position
    pub country: String,
    /// State or region
    pub state: String,
    /// Posting link
    pub link: String,
    /// Job description
    pub description: String,
    /// Notes
    pub comments: String,
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self {
            company: String::new(),
            position: String::new(),
            status: ApplicationStatus::NotApplied,
            country: String::new(),
            state: String::new(),
            link: String::new(),
            description: String::new(),
            comments: String::new(),
        }
    }
}

impl ApplicationDraft {
    /// Pre-fills a draft from an existing record for editing.
    #[must_use]
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            company: record.company.clone(),
            position: record.position.clone(),
            status: record.status,
            country: record.country.clone(),
            state: record.state.clone(),
            link: record.link.clone(),
            description: record.description.clone(),
            comments: record.comments.clone(),
        }
    }

    fn into_record(self, id: String, date: String) -> ApplicationRecord {
        ApplicationRecord {
            id,
            company: self.company.trim().to_string(),
            position: self.position.trim().to_string(),
            status: self.status,
            date,
            country: self.country.trim().to_string(),
            state: self.state.trim().to_string(),
            link: self.link.trim().to_string(),
            description: self.description.trim().to_string(),
            comments: self.comments.trim().to_string(),
        }
    }
}

/// Checks the fields the form requires.
///
/// # Errors
/// Returns [`Error::Validation`] if company or position is blank.
pub fn validate_draft(draft: &ApplicationDraft) -> Result<()> {
    if draft.company.trim().is_empty() {
        return Err(Error::Validation {
            message: "Company name is required".to_string(),
        });
    }
    if draft.position.trim().is_empty() {
        return Err(Error::Validation {
            message: "Position is required".to_string(),
        });
    }
    Ok(())
}

/// Turns a draft into a new record with a timestamp id and today's date.
///
/// # Errors
/// Returns [`Error::Validation`] if the draft is incomplete.
pub fn create_application(draft: ApplicationDraft, clock: &dyn Clock) -> Result<ApplicationRecord> {
    validate_draft(&draft)?;
    let now = clock.local();
    Ok(draft.into_record(
        now.format(ID_FORMAT).to_string(),
        now.format(DATE_FORMAT).to_string(),
    ))
}

/// Applies a draft to an existing record, keeping its id and date.
///
/// # Errors
/// Returns [`Error::Validation`] if the draft is incomplete.
pub fn edit_application(
    existing: &ApplicationRecord,
    draft: ApplicationDraft,
) -> Result<ApplicationRecord> {
    validate_draft(&draft)?;
    Ok(draft.into_record(existing.id.clone(), existing.date.clone()))
}

/// Replaces the record with the same id, or adds it. The record ends up last.
pub fn upsert(records: &mut Vec<ApplicationRecord>, record: ApplicationRecord) {
    records.retain(|r| r.id != record.id);
    records.push(record);
}

/// Deletes the record with `id`, returning it.
///
/// # Errors
/// Returns [`Error::ApplicationNotFound`] if no record has that id.
pub fn remove(records: &mut Vec<ApplicationRecord>, id: &str) -> Result<ApplicationRecord> {
    let index = records
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| Error::ApplicationNotFound { id: id.to_string() })?;
    Ok(records.remove(index))
}

fn find_mut<'a>(records: &'a mut [ApplicationRecord], id: &str) -> Result<&'a mut ApplicationRecord> {
    records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| Error::ApplicationNotFound { id: id.to_string() })
}

/// Sets the status of `id` directly, without transition checks.
///
/// # Errors
/// Returns [`Error::ApplicationNotFound`] if no record has that id.
pub fn set_status(
    records: &mut [ApplicationRecord],
    id: &str,
    status: ApplicationStatus,
) -> Result<()> {
    find_mut(records, id)?.status = status;
    Ok(())
}

/// Replaces the comments of `id` with the trimmed text.
///
/// # Errors
/// Returns [`Error::ApplicationNotFound`] if no record has that id.
pub fn set_comments(records: &mut [ApplicationRecord], id: &str, comments: &str) -> Result<()> {
    find_mut(records, id)?.comments = comments.trim().to_string();
    Ok(())
}

/// Distinct non-empty countries, sorted.
#[must_use]
pub fn countries(records: &[ApplicationRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| !r.country.is_empty())
        .map(|r| r.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Column the list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Company name
    Company,
    /// Position title
    Position,
    /// Submission date
    Date,
    /// Status wire name
    Status,
    /// Country
    Country,
}

impl SortKey {
    fn compare(self, a: &ApplicationRecord, b: &ApplicationRecord) -> Ordering {
        match self {
            Self::Company => a.company.cmp(&b.company),
            Self::Position => a.position.cmp(&b.position),
            Self::Date => a.date.cmp(&b.date),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::Country => a.country.cmp(&b.country),
        }
    }
}

/// Filter and ordering of the main list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Whether rejected applications are listed
    pub show_rejected: bool,
    /// Only list this country; `None` lists all
    pub country: Option<String>,
    /// Sort column
    pub sort_key: SortKey,
    /// Sort direction
    pub descending: bool,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            show_rejected: true,
            country: None,
            sort_key: SortKey::Date,
            descending: true,
        }
    }
}

impl ListView {
    /// Clicking the current column flips direction; a new column sorts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.descending = !self.descending;
        } else {
            self.sort_key = key;
            self.descending = false;
        }
    }
}

/// Records visible under `view`, in display order.
#[must_use]
pub fn visible<'a>(records: &'a [ApplicationRecord], view: &ListView) -> Vec<&'a ApplicationRecord> {
    let mut shown: Vec<&ApplicationRecord> = records
        .iter()
        .filter(|r| view.show_rejected || r.status != ApplicationStatus::Rejected)
        .filter(|r| view.country.as_ref().is_none_or(|c| &r.country == c))
        .collect();

    shown.sort_by(|a, b| {
        let ordering = view.sort_key.compare(a, b);
        if view.descending { ordering.reverse() } else { ordering }
    });
    shown
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{MutableClock, application};
    use crate::entities::ApplicationStatus::{Applied, Approved, NotApplied, Rejected};

    fn draft(company: &str, position: &str) -> ApplicationDraft {
        ApplicationDraft {
            company: company.to_string(),
            position: position.to_string(),
            ..ApplicationDraft::default()
        }
    }

    #[test]
    fn test_create_application_assigns_timestamp_id_and_date() -> Result<()> {
        let clock = MutableClock::shared();
        let mut input = draft("  Acme  ", "Engineer");
        input.comments = "  referral \n".to_string();

        let record = create_application(input, clock.as_ref())?;

        assert_eq!(record.id, "20240110090000");
        assert_eq!(record.date, "2024-01-10");
        assert_eq!(record.company, "Acme");
        assert_eq!(record.comments, "referral");
        assert_eq!(record.status, NotApplied);
        assert!(record.is_valid());
        Ok(())
    }

    #[test]
    fn test_create_application_requires_company_and_position() {
        let clock = MutableClock::shared();
        for input in [draft("", "Engineer"), draft("Acme", "   ")] {
            let result = create_application(input, clock.as_ref());
            assert!(matches!(result, Err(Error::Validation { .. })));
        }
    }

    #[test]
    fn test_edit_application_keeps_id_and_date() -> Result<()> {
        let existing = application("1", Applied, "2023-12-24");
        let mut input = ApplicationDraft::from_record(&existing);
        input.position = "Staff Engineer".to_string();
        input.status = Approved;

        let edited = edit_application(&existing, input)?;
        assert_eq!(edited.id, "1");
        assert_eq!(edited.date, "2023-12-24");
        assert_eq!(edited.position, "Staff Engineer");
        assert_eq!(edited.status, Approved);
        Ok(())
    }

    #[test]
    fn test_upsert_replaces_and_moves_to_end() {
        let mut records = vec![
            application("1", Applied, "2024-01-01"),
            application("2", Applied, "2024-01-02"),
        ];
        let mut edited = records[0].clone();
        edited.comments = "called back".to_string();

        upsert(&mut records, edited);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "1");
        assert_eq!(records[1].comments, "called back");

        upsert(&mut records, application("3", NotApplied, "2024-01-03"));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_remove_and_direct_edits() -> Result<()> {
        let mut records = vec![
            application("1", NotApplied, "2024-01-01"),
            application("2", Applied, "2024-01-02"),
        ];

        // Direct edits may go anywhere, even backwards.
        set_status(&mut records, "2", NotApplied)?;
        assert_eq!(records[1].status, NotApplied);

        set_comments(&mut records, "1", "  ping HR  ")?;
        assert_eq!(records[0].comments, "ping HR");

        let removed = remove(&mut records, "1")?;
        assert_eq!(removed.id, "1");
        assert_eq!(records.len(), 1);

        assert!(matches!(
            remove(&mut records, "1"),
            Err(Error::ApplicationNotFound { .. })
        ));
        assert!(matches!(
            set_status(&mut records, "9", Applied),
            Err(Error::ApplicationNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_countries_are_distinct_and_sorted() {
        let mut a = application("1", Applied, "2024-01-01");
        a.country = "Spain".to_string();
        let mut b = application("2", Applied, "2024-01-01");
        b.country = "Canada".to_string();
        let mut c = application("3", Applied, "2024-01-01");
        c.country = "Spain".to_string();
        let d = application("4", Applied, "2024-01-01");

        assert_eq!(countries(&[a, b, c, d]), ["Canada", "Spain"]);
    }

    #[test]
    fn test_visible_filters_and_sorts() {
        let mut records = vec![
            application("1", Applied, "2024-01-02"),
            application("2", Rejected, "2024-01-03"),
            application("3", NotApplied, "2024-01-01"),
        ];
        records[0].country = "NL".to_string();
        records[1].country = "NL".to_string();
        records[2].country = "BE".to_string();
        records[0].company = "Beta".to_string();
        records[2].company = "Alpha".to_string();

        let ids = |view: &ListView| -> Vec<String> {
            visible(&records, view).iter().map(|r| r.id.clone()).collect()
        };

        let mut view = ListView::default();
        assert_eq!(ids(&view), ["2", "1", "3"]);

        view.show_rejected = false;
        assert_eq!(ids(&view), ["1", "3"]);

        view.country = Some("NL".to_string());
        assert_eq!(ids(&view), ["1"]);

        view.country = None;
        view.toggle_sort(SortKey::Company);
        assert_eq!(view.sort_key, SortKey::Company);
        assert!(!view.descending);
        assert_eq!(ids(&view), ["3", "1"]);

        view.toggle_sort(SortKey::Company);
        assert!(view.descending);
        assert_eq!(ids(&view), ["1", "3"]);
    }
}
