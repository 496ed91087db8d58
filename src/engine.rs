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

//! Point application engine.
//!
//! The [`Engine`] is the applier: it resolves an action's point value
//! against the injected rule registry, records the event in the ledger,
//! and increments the user's cached balance as one unit of work.
//!
//! # Concurrency
//!
//! Accounts live in a [`DashMap`], so applications for different users run
//! in parallel. For a single user, the ledger append and the balance
//! increment happen inside that account's critical section: concurrent
//! applies cannot lose updates, and a reconcile cannot slip between an
//! append and its increment.

use crate::account::Account;
use crate::action::ActionKind;
use crate::base::UserId;
use crate::error::PointError;
use crate::ledger::{Ledger, LedgerEntry};
use crate::rules::RuleRegistry;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Result of one successful point application.
#[derive(Debug, Clone)]
pub struct Applied {
    /// The immutable audit record written for the event.
    pub entry: Arc<LedgerEntry>,
    /// The user's cached balance after the increment.
    pub total_points: i64,
}

/// Point application engine managing user accounts and the event ledger.
///
/// # Invariants
///
/// - A user's cached `total_points` equals the sum of their ledger entries;
///   [`Engine::reconcile`] rebuilds the cache from the ledger on drift.
/// - Ledger entries are append-only; nothing the engine does mutates one.
/// - Rule lookups go through the injected [`RuleRegistry`] only, so point
///   values can be tuned without touching the engine.
pub struct Engine {
    /// User accounts indexed by user ID.
    accounts: DashMap<UserId, Account>,
    ledger: Ledger,
    rules: Arc<RuleRegistry>,
}

impl Engine {
    /// Creates an engine with an empty account directory and ledger.
    pub fn new(rules: Arc<RuleRegistry>) -> Self {
        Self::with_ledger(rules, Ledger::new())
    }

    /// Creates an engine around a caller-provided ledger, e.g. one backed
    /// by a custom [`LedgerStore`](crate::ledger::LedgerStore).
    pub fn with_ledger(rules: Arc<RuleRegistry>, ledger: Ledger) -> Self {
        Self {
            accounts: DashMap::new(),
            ledger,
            rules,
        }
    }

    /// Registers a new user and applies the signup rule.
    ///
    /// # Errors
    ///
    /// - [`PointError::DuplicateUser`] - The user already has an account.
    /// - [`PointError::Persistence`] - The ledger write failed; no account
    ///   is created, so the call is safe to retry.
    pub fn signup(&self, user_id: UserId) -> Result<Applied, PointError> {
        match self.accounts.entry(user_id) {
            Entry::Occupied(_) => Err(PointError::DuplicateUser),
            Entry::Vacant(slot) => {
                let points = self.rules.resolve(ActionKind::Signup);

                // Append before creating the account: a storage failure must
                // not leave a half-registered user behind.
                let entry = self.ledger.append(user_id, ActionKind::Signup, points)?;

                let account = slot.insert(Account::new(user_id));
                let mut data = account.lock();
                data.total_points += points;
                Ok(Applied {
                    entry,
                    total_points: data.total_points,
                })
            }
        }
    }

    /// Applies an action to a user's balance.
    ///
    /// Resolves the rule, appends a ledger entry carrying the resolved
    /// delta, and increments the cached balance - all inside the account's
    /// critical section. A failed append leaves neither effect visible.
    ///
    /// The engine has no notion of event identity: callers trigger this at
    /// most once per logical event.
    ///
    /// # Errors
    ///
    /// - [`PointError::UserNotFound`] - No account exists for `user_id`.
    /// - [`PointError::Persistence`] - The ledger write failed; the balance
    ///   is untouched and the call is safe to retry.
    pub fn apply(&self, user_id: UserId, action: ActionKind) -> Result<Applied, PointError> {
        let points = self.rules.resolve(action);
        let account = self
            .accounts
            .get(&user_id)
            .ok_or(PointError::UserNotFound)?;

        let mut data = account.lock();
        let entry = self.ledger.append(user_id, action, points)?;
        data.total_points += points;
        Ok(Applied {
            entry,
            total_points: data.total_points,
        })
    }

    /// Previews the point value for an action without committing anything.
    pub fn resolve_rule(&self, action: ActionKind) -> i64 {
        self.rules.resolve(action)
    }

    /// The user's cached balance.
    pub fn balance(&self, user_id: UserId) -> Result<i64, PointError> {
        self.accounts
            .get(&user_id)
            .map(|account| account.total_points())
            .ok_or(PointError::UserNotFound)
    }

    /// Recomputes the balance from the ledger without touching the cache.
    ///
    /// Holds the account's critical section while summing, so an in-flight
    /// apply is either fully counted or not at all.
    pub fn recompute_balance(&self, user_id: UserId) -> Result<i64, PointError> {
        let account = self
            .accounts
            .get(&user_id)
            .ok_or(PointError::UserNotFound)?;

        let _data = account.lock();
        Ok(self.ledger.recompute_balance(user_id))
    }

    /// Rebuilds the cached balance from the ledger and returns it.
    ///
    /// The recovery path after detected drift between cache and ledger.
    pub fn reconcile(&self, user_id: UserId) -> Result<i64, PointError> {
        let account = self
            .accounts
            .get(&user_id)
            .ok_or(PointError::UserNotFound)?;

        let mut data = account.lock();
        data.total_points = self.ledger.recompute_balance(user_id);
        Ok(data.total_points)
    }

    /// Returns an iterator over all user accounts.
    ///
    /// Useful for generating balance reports.
    pub fn accounts(
        &self,
    ) -> impl Iterator<Item = dashmap::mapref::multiple::RefMulti<'_, UserId, Account>> {
        self.accounts.iter()
    }

    /// Retrieves a user account by ID.
    pub fn get_account(
        &self,
        user_id: &UserId,
    ) -> Option<dashmap::mapref::one::Ref<'_, UserId, Account>> {
        self.accounts.get(user_id)
    }

    /// Read access to the event ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The injected rule registry.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }
}
