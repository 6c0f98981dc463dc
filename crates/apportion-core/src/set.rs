//! The allocation set: an ordered table of bounded percentage records.
//!
//! Every mutation is validated against the set's [`AllocationPolicy`] before
//! anything changes. A rejected edit returns a [`Rejection`] and leaves the
//! set exactly as it was.
//!
//! Sets built from an external snapshot are not checked on construction and
//! may already break invariants; call [`AllocationSet::validate`] once after
//! loading and surface the result before allowing a submit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::error::{EditResult, Rejection};
use crate::policy::AllocationPolicy;
use crate::types::{AllocationPatch, AllocationRecord, Category, PartitionKey, RecordId};
use crate::violation::Violation;

/// Report of a percentage that was reduced to fit its partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClampNotice {
    /// The clamped record.
    pub id: RecordId,
    /// Its partition.
    pub partition: PartitionKey,
    /// Percentage asked for.
    pub requested: Decimal,
    /// Percentage stored.
    pub applied: Decimal,
}

impl fmt::Display for ClampNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Maximum allowed percentage for this entry is {}% ({}% requested)",
            self.applied, self.requested
        )
    }
}

/// Which checks an edit must pass.
#[derive(Debug, Clone, Copy)]
struct Checks {
    category: bool,
    capacity: bool,
    percentage: bool,
}

impl Checks {
    const ALL: Self = Self {
        category: true,
        capacity: true,
        percentage: true,
    };
}

/// An ordered set of allocation records under one policy.
///
/// # Examples
///
/// ```
/// use apportion_core::prelude::*;
///
/// let mut set = AllocationSet::new(AllocationPolicy::sector_diversification());
/// set.add(AllocationRecord::new("a", Sector::Technology, dec!(60))).unwrap();
///
/// let err = set
///     .add(AllocationRecord::new("b", Sector::Energy, dec!(50)))
///     .unwrap_err();
/// assert_eq!(err.max_allowed(), Some(dec!(40)));
/// assert_eq!(set.total_for(&PartitionKey::All), dec!(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSet<C> {
    policy: AllocationPolicy,
    records: Vec<AllocationRecord<C>>,
}

impl<C: Category> AllocationSet<C> {
    /// Creates an empty set.
    #[must_use]
    pub fn new(policy: AllocationPolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
        }
    }

    /// Creates a set from existing records without checking them.
    ///
    /// Use [`validate`](Self::validate) afterwards.
    pub fn from_records(
        policy: AllocationPolicy,
        records: impl IntoIterator<Item = AllocationRecord<C>>,
    ) -> Self {
        Self {
            policy,
            records: records.into_iter().collect(),
        }
    }

    /// Returns the policy.
    #[must_use]
    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    /// Returns the records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[AllocationRecord<C>] {
        &self.records
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AllocationRecord<C>> {
        self.records.iter()
    }

    /// Consumes the set, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<AllocationRecord<C>> {
        self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the set has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record with the given ID.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&AllocationRecord<C>> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Returns true if a record with the given ID exists.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the partition a record belongs to under this set's policy.
    #[must_use]
    pub fn partition_of(&self, record: &AllocationRecord<C>) -> PartitionKey {
        self.policy.partition_by.key_of(record)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Checked in order: `InvalidPercentage`, `DuplicateId`,
    /// `NoCategoriesAvailable`, `DuplicateCategory`, `RecordCapExceeded`,
    /// `PercentageCapExceeded`.
    pub fn add(&mut self, record: AllocationRecord<C>) -> EditResult<(), C> {
        if record.percentage < Decimal::ZERO {
            return Err(Rejection::InvalidPercentage {
                value: record.percentage,
            });
        }
        if self.contains(&record.id) {
            return Err(Rejection::DuplicateId { id: record.id });
        }
        if self.policy.require_unique_category && self.available_categories(None).is_empty() {
            return Err(Rejection::NoCategoriesAvailable);
        }

        self.check(&record, None, Checks::ALL)?;
        self.records.push(record);
        Ok(())
    }

    /// Appends a record using the first unclaimed category in catalog order.
    ///
    /// Returns the chosen category.
    ///
    /// # Errors
    ///
    /// `NoCategoriesAvailable` when the catalog is exhausted, otherwise as
    /// [`add`](Self::add).
    pub fn add_next_available(
        &mut self,
        id: impl Into<RecordId>,
        percentage: Decimal,
    ) -> EditResult<C, C> {
        let category = self
            .available_categories(None)
            .into_iter()
            .next()
            .ok_or(Rejection::NoCategoriesAvailable)?;
        self.add(AllocationRecord::new(id, category, percentage))?;
        Ok(category)
    }

    /// Appends a record, reducing its percentage to the largest value that fits.
    ///
    /// # Errors
    ///
    /// Any rejection of [`add`](Self::add) other than `PercentageCapExceeded`.
    pub fn add_clamped(
        &mut self,
        mut record: AllocationRecord<C>,
    ) -> EditResult<Option<ClampNotice>, C> {
        match self.add(record.clone()) {
            Ok(()) => Ok(None),
            Err(Rejection::PercentageCapExceeded {
                partition,
                requested,
                max_allowed,
            }) => {
                record.percentage = max_allowed;
                let id = record.id.clone();
                self.add(record)?;
                Ok(Some(ClampNotice {
                    id,
                    partition,
                    requested,
                    applied: max_allowed,
                }))
            }
            Err(other) => Err(other),
        }
    }

    /// Applies a partial edit to one record.
    ///
    /// The record's own previous value is excluded when re-checking its
    /// partition, so the reported `max_allowed` is the cap minus the other
    /// records in the target partition.
    ///
    /// # Errors
    ///
    /// `UnknownRecord`, `InvalidPercentage`, `DuplicateCategory` (when the
    /// patch sets a category), `RecordCapExceeded` (when the record moves to
    /// another partition), `PercentageCapExceeded`.
    pub fn update(&mut self, id: &RecordId, patch: &AllocationPatch<C>) -> EditResult<(), C> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Rejection::UnknownRecord { id: id.clone() })?;

        let current = &self.records[index];
        let candidate = patch.apply_to(current);
        let moved = self.partition_of(current) != self.partition_of(&candidate);
        let checks = Checks {
            category: patch.category.is_some(),
            capacity: moved,
            percentage: patch.percentage.is_some() || moved,
        };

        self.check(&candidate, Some(index), checks)?;
        self.records[index] = candidate;
        Ok(())
    }

    /// Applies a partial edit, reducing the percentage to the largest value
    /// that fits instead of rejecting.
    ///
    /// # Errors
    ///
    /// Any rejection of [`update`](Self::update) other than
    /// `PercentageCapExceeded`.
    pub fn update_clamped(
        &mut self,
        id: &RecordId,
        patch: &AllocationPatch<C>,
    ) -> EditResult<Option<ClampNotice>, C> {
        match self.update(id, patch) {
            Ok(()) => Ok(None),
            Err(Rejection::PercentageCapExceeded {
                partition,
                requested,
                max_allowed,
            }) => {
                let clamped = patch.clone().percentage(max_allowed);
                self.update(id, &clamped)?;
                Ok(Some(ClampNotice {
                    id: id.clone(),
                    partition,
                    requested,
                    applied: max_allowed,
                }))
            }
            Err(other) => Err(other),
        }
    }

    /// Removes a record. Unknown IDs are a no-op.
    pub fn remove(&mut self, id: &RecordId) -> Option<AllocationRecord<C>> {
        let index = self.index_of(id)?;
        Some(self.records.remove(index))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Sums percentages per partition.
    ///
    /// Under a global rule the `All` partition is always present. Sums
    /// saturate at the `Decimal` bounds, so an out-of-range snapshot reports
    /// an over-allocated total instead of overflowing.
    #[must_use]
    pub fn totals_by_partition(&self) -> BTreeMap<PartitionKey, Decimal> {
        let mut totals = BTreeMap::new();
        if self.policy.partition_by.admits(&PartitionKey::All) {
            totals.insert(PartitionKey::All, Decimal::ZERO);
        }
        for record in &self.records {
            let total = totals
                .entry(self.partition_of(record))
                .or_insert(Decimal::ZERO);
            *total = total.saturating_add(record.percentage);
        }
        totals
    }

    /// Returns the total of one partition (zero if it has no records).
    #[must_use]
    pub fn total_for(&self, key: &PartitionKey) -> Decimal {
        self.records
            .iter()
            .filter(|r| &self.partition_of(r) == key)
            .fold(Decimal::ZERO, |sum, r| sum.saturating_add(r.percentage))
    }

    /// Returns the headroom left in one partition, never negative.
    #[must_use]
    pub fn remaining_for(&self, key: &PartitionKey) -> Decimal {
        self.policy
            .max_percentage
            .saturating_sub(self.total_for(key))
            .max(Decimal::ZERO)
            .normalize()
    }

    /// Returns categories still free to use.
    ///
    /// Under a unique-category policy this is the catalog minus categories
    /// held by any record other than `excluding`, so a record being edited
    /// may keep its own category. Otherwise it is the whole catalog.
    #[must_use]
    pub fn available_categories(&self, excluding: Option<&RecordId>) -> BTreeSet<C> {
        let mut available: BTreeSet<C> = C::all().iter().copied().collect();
        if self.policy.require_unique_category {
            for record in &self.records {
                if Some(&record.id) != excluding {
                    available.remove(&record.category);
                }
            }
        }
        available
    }

    /// Re-checks every invariant without mutating.
    #[must_use]
    pub fn validate(&self) -> Vec<Violation<C>> {
        let mut violations = Vec::new();
        let max = self.policy.max_percentage;

        let mut id_counts: HashMap<&RecordId, usize> = HashMap::new();
        let mut id_order: Vec<&RecordId> = Vec::new();
        for record in &self.records {
            let count = id_counts.entry(&record.id).or_insert(0);
            if *count == 0 {
                id_order.push(&record.id);
            }
            *count += 1;
        }
        for id in id_order {
            let count = id_counts[id];
            if count > 1 {
                violations.push(Violation::DuplicateId {
                    id: id.clone(),
                    count,
                });
            }
        }

        if self.policy.require_unique_category {
            let mut by_category: BTreeMap<C, Vec<RecordId>> = BTreeMap::new();
            for record in &self.records {
                by_category
                    .entry(record.category)
                    .or_default()
                    .push(record.id.clone());
            }
            for (category, ids) in by_category {
                if ids.len() > 1 {
                    violations.push(Violation::DuplicateCategory { category, ids });
                }
            }
        }

        for record in &self.records {
            if record.percentage < Decimal::ZERO || record.percentage > max {
                violations.push(Violation::PercentageOutOfRange {
                    id: record.id.clone(),
                    value: record.percentage,
                    max,
                });
            }
        }

        for (partition, total) in self.totals_by_partition() {
            if total > max {
                violations.push(Violation::PartitionOverAllocated {
                    partition,
                    total,
                    cap: max,
                });
            }
        }

        let mut counts: BTreeMap<PartitionKey, usize> = BTreeMap::new();
        for record in &self.records {
            *counts.entry(self.partition_of(record)).or_insert(0) += 1;
        }
        for (partition, count) in counts {
            if let Some(cap) = self.policy.record_caps.cap_for(&partition) {
                if count > cap {
                    violations.push(Violation::PartitionOverCapacity {
                        partition,
                        count,
                        cap,
                    });
                }
            }
        }

        violations
    }

    /// Returns true if [`validate`](Self::validate) finds nothing.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn index_of(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    /// Checks `candidate` against every record except the one at `replacing`.
    fn check(
        &self,
        candidate: &AllocationRecord<C>,
        replacing: Option<usize>,
        checks: Checks,
    ) -> EditResult<(), C> {
        if candidate.percentage < Decimal::ZERO {
            return Err(Rejection::InvalidPercentage {
                value: candidate.percentage,
            });
        }

        let others = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replacing)
            .map(|(_, r)| r);

        let key = self.partition_of(candidate);
        let mut peer_count = 0usize;
        let mut peer_sum = Decimal::ZERO;
        let mut category_taken = false;
        for other in others {
            if other.category == candidate.category {
                category_taken = true;
            }
            if self.partition_of(other) == key {
                peer_count += 1;
                peer_sum = peer_sum.saturating_add(other.percentage);
            }
        }

        if checks.category && self.policy.require_unique_category && category_taken {
            return Err(Rejection::DuplicateCategory {
                category: candidate.category,
            });
        }

        if checks.capacity {
            if let Some(cap) = self.policy.record_caps.cap_for(&key) {
                if peer_count >= cap {
                    return Err(Rejection::RecordCapExceeded {
                        partition: key,
                        cap,
                    });
                }
            }
        }

        if checks.percentage {
            let max = self.policy.max_percentage;
            let max_allowed = max
                .saturating_sub(peer_sum)
                .min(max)
                .max(Decimal::ZERO)
                .normalize();
            if candidate.percentage > max_allowed {
                return Err(Rejection::PercentageCapExceeded {
                    partition: key,
                    requested: candidate.percentage,
                    max_allowed,
                });
            }
        }

        Ok(())
    }
}

impl<'a, C> IntoIterator for &'a AllocationSet<C> {
    type Item = &'a AllocationRecord<C>;
    type IntoIter = std::slice::Iter<'a, AllocationRecord<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetClass, PositionType, Sector};
    use rust_decimal_macros::dec;

    fn sectors() -> AllocationSet<Sector> {
        AllocationSet::new(AllocationPolicy::sector_diversification())
    }

    fn scaling() -> AllocationSet<AssetClass> {
        AllocationSet::new(AllocationPolicy::position_scaling())
    }

    fn long(id: &str, class: AssetClass, pct: Decimal) -> AllocationRecord<AssetClass> {
        AllocationRecord::new(id, class, pct).with_position_type(PositionType::Long)
    }

    fn short(id: &str, class: AssetClass, pct: Decimal) -> AllocationRecord<AssetClass> {
        AllocationRecord::new(id, class, pct).with_position_type(PositionType::Short)
    }

    #[test]
    fn test_add_preserves_order() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Utilities, dec!(10)))
            .unwrap();
        set.add(AllocationRecord::new("b", Sector::Energy, dec!(10)))
            .unwrap();
        set.add(AllocationRecord::new("c", Sector::Financials, dec!(10)))
            .unwrap();

        let ids: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_add_zero_percentage() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(100)))
            .unwrap();
        // A full partition still accepts a zero row.
        set.add(AllocationRecord::new("b", Sector::Energy, dec!(0)))
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_add_negative_rejected() {
        let mut set = sectors();
        let err = set
            .add(AllocationRecord::new("a", Sector::Technology, dec!(-5)))
            .unwrap_err();
        assert_eq!(err, Rejection::InvalidPercentage { value: dec!(-5) });
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_duplicate_id() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(10)))
            .unwrap();
        let err = set
            .add(AllocationRecord::new("a", Sector::Energy, dec!(10)))
            .unwrap_err();
        assert_eq!(err, Rejection::DuplicateId { id: "a".into() });
    }

    #[test]
    fn test_single_record_above_max() {
        let mut set = sectors();
        let err = set
            .add(AllocationRecord::new("a", Sector::Technology, dec!(120)))
            .unwrap_err();
        assert_eq!(err.max_allowed(), Some(dec!(100)));
    }

    #[test]
    fn test_no_categories_available() {
        let mut set = sectors();
        for (i, sector) in Sector::all().iter().enumerate() {
            set.add(AllocationRecord::new(format!("r{i}"), *sector, dec!(1)))
                .unwrap();
        }
        let err = set
            .add(AllocationRecord::new("extra", Sector::Energy, dec!(0)))
            .unwrap_err();
        assert_eq!(err, Rejection::NoCategoriesAvailable);

        let err = set.add_next_available("extra", dec!(0)).unwrap_err();
        assert_eq!(err, Rejection::NoCategoriesAvailable);
    }

    #[test]
    fn test_add_next_available_picks_catalog_order() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Energy, dec!(10)))
            .unwrap();
        let chosen = set.add_next_available("b", dec!(0)).unwrap();
        assert_eq!(chosen, Sector::Materials);
        assert_eq!(set.get(&"b".into()).unwrap().category, Sector::Materials);
    }

    #[test]
    fn test_non_unique_allows_repeats() {
        let mut set = scaling();
        set.add(long("a", AssetClass::Equity, dec!(30))).unwrap();
        set.add(long("b", AssetClass::Equity, dec!(30))).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.available_categories(None).len(), AssetClass::all().len());
    }

    #[test]
    fn test_update_excludes_own_value() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(70)))
            .unwrap();
        set.add(AllocationRecord::new("b", Sector::Energy, dec!(30)))
            .unwrap();

        // 70 -> 60 lowers the total; 70 -> 70 is a no-op.
        set.update(&"a".into(), &AllocationPatch::new().percentage(dec!(60)))
            .unwrap();
        set.update(&"a".into(), &AllocationPatch::new().percentage(dec!(70)))
            .unwrap();

        let err = set
            .update(&"a".into(), &AllocationPatch::new().percentage(dec!(80)))
            .unwrap_err();
        assert_eq!(err.max_allowed(), Some(dec!(70)));
        assert_eq!(set.get(&"a".into()).unwrap().percentage, dec!(70));
    }

    #[test]
    fn test_update_unknown_record() {
        let mut set = sectors();
        let err = set
            .update(&"ghost".into(), &AllocationPatch::new().percentage(dec!(1)))
            .unwrap_err();
        assert_eq!(err, Rejection::UnknownRecord { id: "ghost".into() });
    }

    #[test]
    fn test_update_duplicate_category() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(10)))
            .unwrap();
        set.add(AllocationRecord::new("b", Sector::Energy, dec!(10)))
            .unwrap();

        let err = set
            .update(&"b".into(), &AllocationPatch::new().category(Sector::Technology))
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::DuplicateCategory {
                category: Sector::Technology
            }
        );

        // Keeping its own category is fine.
        set.update(&"a".into(), &AllocationPatch::new().category(Sector::Technology))
            .unwrap();
    }

    #[test]
    fn test_update_moving_partition_checks_caps() {
        let policy = AllocationPolicy::position_scaling()
            .with_partition_cap(PartitionKey::Side(PositionType::Short), 1);
        let mut set = AllocationSet::new(policy);
        set.add(long("a", AssetClass::Equity, dec!(50))).unwrap();
        set.add(short("b", AssetClass::Equity, dec!(80))).unwrap();

        let err = set
            .update(
                &"a".into(),
                &AllocationPatch::new().position_type(PositionType::Short),
            )
            .unwrap_err();
        assert!(matches!(err, Rejection::RecordCapExceeded { cap: 1, .. }));
    }

    #[test]
    fn test_update_clearing_side_moves_to_unassigned() {
        let mut set = scaling();
        set.add(long("a", AssetClass::Equity, dec!(50))).unwrap();
        set.add(AllocationRecord::new("u", AssetClass::Bond, dec!(70)))
            .unwrap();

        let clear = AllocationPatch::new().clear_position_type();
        let err = set.update(&"a".into(), &clear).unwrap_err();
        assert_eq!(err.max_allowed(), Some(dec!(30)));

        set.update(&"a".into(), &clear.percentage(dec!(30))).unwrap();
        assert_eq!(set.get(&"a".into()).unwrap().position_type, None);
        assert_eq!(set.total_for(&PartitionKey::Unassigned), dec!(100));
        assert_eq!(set.total_for(&PartitionKey::Side(PositionType::Long)), dec!(0));
    }

    #[test]
    fn test_update_moving_partition_checks_sum() {
        let mut set = scaling();
        set.add(long("a", AssetClass::Equity, dec!(50))).unwrap();
        set.add(short("b", AssetClass::Equity, dec!(80))).unwrap();

        let err = set
            .update(
                &"a".into(),
                &AllocationPatch::new().position_type(PositionType::Short),
            )
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::PercentageCapExceeded {
                partition: PartitionKey::Side(PositionType::Short),
                requested: dec!(50),
                max_allowed: dec!(20),
            }
        );
    }

    #[test]
    fn test_update_clamped() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(63)))
            .unwrap();
        set.add(AllocationRecord::new("b", Sector::Energy, dec!(10)))
            .unwrap();

        let notice = set
            .update_clamped(&"b".into(), &AllocationPatch::new().percentage(dec!(50)))
            .unwrap()
            .unwrap();
        assert_eq!(notice.applied, dec!(37));
        assert_eq!(notice.requested, dec!(50));
        assert_eq!(set.get(&"b".into()).unwrap().percentage, dec!(37));
        assert!(notice.to_string().contains("37%"));

        let none = set
            .update_clamped(&"b".into(), &AllocationPatch::new().percentage(dec!(5)))
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_add_clamped() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(90)))
            .unwrap();
        let notice = set
            .add_clamped(AllocationRecord::new("b", Sector::Energy, dec!(25)))
            .unwrap()
            .unwrap();
        assert_eq!(notice.applied, dec!(10));
        assert_eq!(set.total_for(&PartitionKey::All), dec!(100));

        // Non-percentage rejections pass through.
        let err = set
            .add_clamped(AllocationRecord::new("c", Sector::Energy, dec!(0)))
            .unwrap_err();
        assert!(matches!(err, Rejection::DuplicateCategory { .. }));
    }

    #[test]
    fn test_remove() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(60)))
            .unwrap();
        let removed = set.remove(&"a".into()).unwrap();
        assert_eq!(removed.category, Sector::Technology);
        assert!(set.remove(&"a".into()).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_totals_by_partition() {
        let mut set = scaling();
        set.add(long("a", AssetClass::Equity, dec!(60))).unwrap();
        set.add(short("b", AssetClass::Etf, dec!(70))).unwrap();
        set.add(AllocationRecord::new("c", AssetClass::Bond, dec!(5)))
            .unwrap();

        let totals = set.totals_by_partition();
        assert_eq!(totals[&PartitionKey::Side(PositionType::Long)], dec!(60));
        assert_eq!(totals[&PartitionKey::Side(PositionType::Short)], dec!(70));
        assert_eq!(totals[&PartitionKey::Unassigned], dec!(5));
        assert!(!totals.contains_key(&PartitionKey::All));
    }

    #[test]
    fn test_totals_global_always_present() {
        let set = sectors();
        let totals = set.totals_by_partition();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&PartitionKey::All], Decimal::ZERO);
        assert_eq!(set.remaining_for(&PartitionKey::All), dec!(100));
    }

    #[test]
    fn test_available_categories_excluding() {
        let mut set = sectors();
        set.add(AllocationRecord::new("a", Sector::Technology, dec!(10)))
            .unwrap();
        set.add(AllocationRecord::new("b", Sector::Energy, dec!(10)))
            .unwrap();

        let all = set.available_categories(None);
        assert!(!all.contains(&Sector::Technology));
        assert!(!all.contains(&Sector::Energy));
        assert_eq!(all.len(), Sector::all().len() - 2);

        let for_a = set.available_categories(Some(&"a".into()));
        assert!(for_a.contains(&Sector::Technology));
        assert!(!for_a.contains(&Sector::Energy));
    }

    #[test]
    fn test_validate_bulk_loaded() {
        let set = AllocationSet::from_records(
            AllocationPolicy::sector_diversification().with_default_cap(2),
            vec![
                AllocationRecord::new("a", Sector::Energy, dec!(50)),
                AllocationRecord::new("b", Sector::Energy, dec!(50)),
                AllocationRecord::new("c", Sector::Technology, dec!(-10)),
                AllocationRecord::new("a", Sector::Utilities, dec!(40)),
            ],
        );

        let violations = set.validate();
        let rules: Vec<&str> = violations.iter().map(Violation::rule).collect();
        assert_eq!(
            rules,
            vec![
                "duplicate_id",
                "duplicate_category",
                "percentage_out_of_range",
                "partition_over_allocated",
                "partition_over_capacity",
            ]
        );
        assert!(!set.is_valid());
    }

    #[test]
    fn test_validate_clean() {
        let mut set = scaling();
        set.add(long("a", AssetClass::Equity, dec!(100))).unwrap();
        set.add(short("b", AssetClass::Equity, dec!(100))).unwrap();
        assert!(set.validate().is_empty());
    }

    #[test]
    fn test_category_partition_rule() {
        let policy = AllocationPolicy::new()
            .with_partition_rule(crate::types::PartitionRule::Category)
            .with_max_percentage(dec!(50));
        let mut set = AllocationSet::new(policy);
        set.add(AllocationRecord::new("a", Sector::Energy, dec!(30)))
            .unwrap();
        set.add(AllocationRecord::new("b", Sector::Technology, dec!(50)))
            .unwrap();
        let err = set
            .add(AllocationRecord::new("c", Sector::Energy, dec!(30)))
            .unwrap_err();
        assert_eq!(err.max_allowed(), Some(dec!(20)));
    }

    #[test]
    fn test_validate_saturates_extreme_totals() {
        let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
        let set = AllocationSet::from_records(
            AllocationPolicy::sector_diversification(),
            vec![
                AllocationRecord::new("a", Sector::Energy, huge),
                AllocationRecord::new("b", Sector::Materials, huge),
            ],
        );

        let violations = set.validate();
        let rules: Vec<&str> = violations.iter().map(Violation::rule).collect();
        assert_eq!(
            rules,
            vec![
                "percentage_out_of_range",
                "percentage_out_of_range",
                "partition_over_allocated",
            ]
        );
        assert_eq!(set.total_for(&PartitionKey::All), Decimal::MAX);
        assert_eq!(set.remaining_for(&PartitionKey::All), Decimal::ZERO);

        let mut set = set;
        let err = set
            .add(AllocationRecord::new("c", Sector::Utilities, dec!(1)))
            .unwrap_err();
        assert_eq!(err.max_allowed(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_validate_saturates_negative_totals() {
        let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
        let set = AllocationSet::from_records(
            AllocationPolicy::sector_diversification(),
            vec![
                AllocationRecord::new("a", Sector::Energy, -huge),
                AllocationRecord::new("b", Sector::Materials, -huge),
            ],
        );

        let rules: Vec<&str> = set.validate().iter().map(Violation::rule).collect();
        assert_eq!(rules, vec!["percentage_out_of_range", "percentage_out_of_range"]);
        assert_eq!(set.total_for(&PartitionKey::All), Decimal::MIN);
        assert_eq!(set.remaining_for(&PartitionKey::All), Decimal::MAX);
    }
}
