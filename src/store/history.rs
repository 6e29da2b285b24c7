use chrono::{DateTime, Months, Utc};

use super::{KeyValueStore, StoreError};
use crate::config;
use crate::models::VerificationResult;

/// Verification history, persisted whole under one key with an age-based
/// retention policy: entries older than one calendar month are dropped on
/// every append.
pub struct HistoryStore<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> HistoryStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<VerificationResult>, StoreError> {
        match self.store.get(config::HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(vec![]),
        }
    }

    pub fn append(&self, result: VerificationResult) -> Result<(), StoreError> {
        self.append_at(result, Utc::now())
    }

    /// Append with an explicit clock. Retention uses calendar-month
    /// subtraction (clamped near month end, so Mar 31 cuts off at
    /// Feb 28/29), not a fixed 30-day window. Only entries strictly newer
    /// than the cutoff survive.
    pub fn append_at(
        &self,
        result: VerificationResult,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let cutoff = now
            .checked_sub_months(Months::new(1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut entries = self.list()?;
        let before = entries.len();
        entries.retain(|e| e.timestamp > cutoff);
        if entries.len() < before {
            tracing::debug!(
                dropped = before - entries.len(),
                "Expired verification history entries removed"
            );
        }

        entries.push(result);
        let raw = serde_json::to_string(&entries)?;
        self.store.set(config::HISTORY_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, ComparisonMetadata, DocumentMetadata};
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn result_at(timestamp: DateTime<Utc>) -> VerificationResult {
        VerificationResult {
            id: Uuid::new_v4(),
            file_name: "check.pdf".into(),
            check_number: 1,
            bank_name: "Alpha Bank".into(),
            check_pdf: String::new(),
            template_pdf: String::new(),
            timestamp,
            score: 80.0,
            metadata: ComparisonMetadata {
                template: DocumentMetadata::unknown(),
                verified: DocumentMetadata::unknown(),
            },
            details: AnalysisResult {
                score: 80.0,
                field_comparison: BTreeMap::new(),
                layout_match: "ok".into(),
                security_features: "ok".into(),
                stamp_signature: "ok".into(),
                metadata_comparison: "ok".into(),
                overall_assessment: "ok".into(),
                missing_fields: vec![],
            },
        }
    }

    #[test]
    fn empty_store_lists_nothing() {
        let backend = MemoryStore::new();
        let history = HistoryStore::new(&backend);
        assert!(history.list().unwrap().is_empty());
    }

    #[test]
    fn append_drops_entries_older_than_a_month() {
        let backend = MemoryStore::new();
        let history = HistoryStore::new(&backend);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap();

        let old = result_at(now - chrono::Duration::days(40));
        let recent = result_at(now - chrono::Duration::days(10));
        history.append_at(old, now).unwrap();
        history.append_at(recent.clone(), now).unwrap();

        let fresh = result_at(now);
        history.append_at(fresh.clone(), now).unwrap();

        let entries = history.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, recent.id);
        assert_eq!(entries[1].id, fresh.id);
    }

    #[test]
    fn retention_uses_calendar_month_not_thirty_days() {
        let backend = MemoryStore::new();
        let history = HistoryStore::new(&backend);
        // Mar 31 minus one month clamps to Feb 28 (2026 is not a leap year).
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();

        let mar_first = result_at(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        let feb_27 = result_at(Utc.with_ymd_and_hms(2026, 2, 27, 0, 0, 0).unwrap());
        history.append_at(feb_27, now).unwrap();
        history.append_at(mar_first.clone(), now).unwrap();

        history.append_at(result_at(now), now).unwrap();

        let entries = history.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, mar_first.id);
    }

    #[test]
    fn entry_exactly_at_cutoff_is_dropped() {
        let backend = MemoryStore::new();
        let history = HistoryStore::new(&backend);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap();
        let cutoff = now.checked_sub_months(Months::new(1)).unwrap();

        history.append_at(result_at(cutoff), now).unwrap();
        history.append_at(result_at(now), now).unwrap();

        assert_eq!(history.list().unwrap().len(), 1);
    }
}
