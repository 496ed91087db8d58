// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Append-only event ledger.
//!
//! Every point-affecting event is recorded as an immutable [`LedgerEntry`].
//! The ledger is the source of truth for a user's balance: the cached total
//! on the account can be rebuilt from it at any time via
//! [`Ledger::recompute_balance`].

use crate::action::ActionKind;
use crate::base::{EntryId, UserId};
use crate::error::PointError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// An immutable record of one point-affecting event.
///
/// Once written, an entry is never mutated or deleted; it is the permanent
/// audit record for the event.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub action: ActionKind,
    /// Point delta captured at event time. Deliberately a snapshot, not a
    /// rule reference, so later rule edits cannot rewrite history.
    pub points_applied: i64,
    pub created_at: DateTime<Utc>,
}

/// Durable append-only storage for ledger entries.
///
/// The storage medium is a collaborator of the ledger, not part of it: the
/// default [`MemoryStore`] keeps everything in process, while deployments
/// can back the trait with something durable. A failed [`insert`] must
/// leave no trace of the entry.
///
/// [`insert`]: LedgerStore::insert
pub trait LedgerStore: Send + Sync + fmt::Debug {
    /// Persists an entry.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Persistence`] if the write is rejected.
    fn insert(&self, entry: Arc<LedgerEntry>) -> Result<(), PointError>;

    /// All entries for a user, in append order.
    fn entries_for(&self, user_id: UserId) -> Vec<Arc<LedgerEntry>>;

    /// All entries across users, in no particular order.
    fn all(&self) -> Vec<Arc<LedgerEntry>>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`LedgerStore`] keeping per-user entry lists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    by_user: DashMap<UserId, Vec<Arc<LedgerEntry>>>,
    count: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn insert(&self, entry: Arc<LedgerEntry>) -> Result<(), PointError> {
        self.by_user.entry(entry.user_id).or_default().push(entry);
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn entries_for(&self, user_id: UserId) -> Vec<Arc<LedgerEntry>> {
        self.by_user
            .get(&user_id)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn all(&self) -> Vec<Arc<LedgerEntry>> {
        self.by_user
            .iter()
            .flat_map(|entries| entries.value().clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

/// Append-only event ledger with monotonically increasing entry IDs.
#[derive(Debug)]
pub struct Ledger {
    store: Box<dyn LedgerStore>,
    next_id: AtomicU64,
}

impl Ledger {
    /// Creates a ledger backed by an in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Creates a ledger backed by a caller-provided store.
    pub fn with_store(store: impl LedgerStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends an entry for an already-resolved point delta.
    ///
    /// The ledger trusts the caller's snapshot and never re-resolves rules.
    /// The returned entry carries a fresh ID and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Persistence`] if the store rejects the write.
    /// Nothing is recorded in that case; the ID allocated for the attempt
    /// is burned, leaving a gap but preserving monotonicity.
    pub fn append(
        &self,
        user_id: UserId,
        action: ActionKind,
        points_applied: i64,
    ) -> Result<Arc<LedgerEntry>, PointError> {
        let id = EntryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(LedgerEntry {
            id,
            user_id,
            action,
            points_applied,
            created_at: Utc::now(),
        });
        self.store.insert(Arc::clone(&entry))?;
        Ok(entry)
    }

    /// Sums all of a user's entries; the authoritative balance.
    pub fn recompute_balance(&self, user_id: UserId) -> i64 {
        self.store
            .entries_for(user_id)
            .iter()
            .map(|entry| entry.points_applied)
            .sum()
    }

    /// All entries for a user, in append order.
    pub fn entries_for(&self, user_id: UserId) -> Vec<Arc<LedgerEntry>> {
        self.store.entries_for(user_id)
    }

    /// All entries across users, in ID order. Audit output.
    pub fn entries(&self) -> Vec<Arc<LedgerEntry>> {
        let mut entries = self.store.all();
        entries.sort_by_key(|entry| entry.id);
        entries
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
