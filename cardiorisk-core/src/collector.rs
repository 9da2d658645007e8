//! Input collector: live form state plus the explicitly submitted record.
//!
//! Every edit is validated against its column's domain before it is
//! accepted. A rejected edit leaves the previous value in place, so the
//! current record is always constructible and always in-domain.

use crate::encoding;
use crate::error::ValidationRejection;
use crate::record::{FeatureRecord, FeatureValue};
use crate::schema::FeatureKey;
use tracing::debug;

/// Form state for one user session.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    current: FeatureRecord,
    submitted: Option<FeatureRecord>,
    submissions: u64,
}

impl InputCollector {
    /// Collector initialised to the schema defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a typed value.
    pub fn set(&mut self, key: FeatureKey, value: FeatureValue) -> Result<(), ValidationRejection> {
        self.current = self.current.with(key, value)?;
        Ok(())
    }

    /// Set a value from raw user text (numbers, codes or choice labels).
    pub fn set_from_str(&mut self, key: FeatureKey, raw: &str) -> Result<(), ValidationRejection> {
        let value = key.spec().parse(raw)?;
        self.set(key, value)
    }

    /// Pick a human-readable choice, e.g. "Male" for `sex`.
    pub fn select(&mut self, key: FeatureKey, label: &str) -> Result<(), ValidationRejection> {
        let table = encoding::choice_table(key).ok_or(ValidationRejection::WrongType {
            field: key.as_str(),
            expected: "a number",
        })?;
        let code = table
            .encode(label)
            .ok_or_else(|| ValidationRejection::UnknownChoice {
                field: key.as_str(),
                value: label.to_string(),
                expected: table.describe(),
            })?;
        self.set(key, FeatureValue::Int(code))
    }

    /// Set a field by its column name.
    pub fn set_by_name(&mut self, name: &str, raw: &str) -> Result<(), ValidationRejection> {
        let key = FeatureKey::from_name(name).ok_or_else(|| ValidationRejection::UnknownField {
            name: name.to_string(),
        })?;
        self.set_from_str(key, raw)
    }

    /// Apply several raw edits, collecting every rejection instead of stopping
    /// at the first. Accepted edits stay applied.
    pub fn apply<'a, I>(&mut self, entries: I) -> Vec<ValidationRejection>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        entries
            .into_iter()
            .filter_map(|(name, raw)| self.set_by_name(name, raw).err())
            .collect()
    }

    /// Like [`apply`](Self::apply), but every one of the 13 fields must be
    /// present among the entries. Absent fields are reported as
    /// [`ValidationRejection::MissingField`] and keep their current value.
    pub fn apply_complete<'a, I>(&mut self, entries: I) -> Vec<ValidationRejection>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut seen = [false; FeatureKey::COUNT];
        let entries: Vec<(&str, &str)> = entries.into_iter().collect();
        for (name, _) in &entries {
            if let Some(key) = FeatureKey::from_name(name) {
                seen[key.index()] = true;
            }
        }
        let mut rejections = self.apply(entries);
        rejections.extend(
            FeatureKey::ALL
                .into_iter()
                .filter(|key| !seen[key.index()])
                .map(|key| ValidationRejection::MissingField {
                    field: key.as_str(),
                }),
        );
        rejections
    }

    pub fn get(&self, key: FeatureKey) -> FeatureValue {
        self.current.get(key)
    }

    /// Record reflecting the live form state.
    pub fn current_record(&self) -> &FeatureRecord {
        &self.current
    }

    /// Explicit submission: snapshot the live state as the submitted record.
    pub fn submit(&mut self) -> &FeatureRecord {
        self.submissions += 1;
        debug!(submission = self.submissions, "Form submitted");
        self.submitted.insert(self.current.clone())
    }

    /// The record of the latest submission, unaffected by later edits.
    pub fn submitted_record(&self) -> Option<&FeatureRecord> {
        self.submitted.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted.is_some()
    }

    pub fn submission_count(&self) -> u64 {
        self.submissions
    }

    /// Restore every field to its default. The submitted record is kept.
    pub fn reset(&mut self) {
        self.current = FeatureRecord::defaults();
    }
}
