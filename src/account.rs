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

//! User accounts.
//!
//! An account caches the user's point balance. The cache is mutated only by
//! the engine, inside the account's critical section, and must always equal
//! the sum of the user's ledger entries; the ledger is the recovery path
//! when the two disagree.

use crate::base::UserId;
use parking_lot::{Mutex, MutexGuard};
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug)]
pub(crate) struct AccountData {
    pub(crate) user_id: UserId,
    pub(crate) total_points: i64,
}

/// A user account with its cached point balance.
///
/// Balances are signed: actions like deleting a report carry negative
/// deltas, so a total below zero is a valid state.
#[derive(Debug)]
pub struct Account {
    inner: Mutex<AccountData>,
}

impl Account {
    pub fn new(user_id: UserId) -> Self {
        Self {
            inner: Mutex::new(AccountData {
                user_id,
                total_points: 0,
            }),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.inner.lock().user_id
    }

    /// Cached point total. Reconciliation target: the sum of the user's
    /// ledger entries.
    pub fn total_points(&self) -> i64 {
        self.inner.lock().total_points
    }

    /// Per-account critical section. The engine holds this across the
    /// ledger append and the balance increment so the two stay together.
    pub(crate) fn lock(&self) -> MutexGuard<'_, AccountData> {
        self.inner.lock()
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Account", 2)?;
        state.serialize_field("user", &data.user_id)?;
        state.serialize_field("total_points", &data.total_points)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_at_zero() {
        let account = Account::new(UserId(1));
        assert_eq!(account.user_id(), UserId(1));
        assert_eq!(account.total_points(), 0);
    }

    #[test]
    fn balance_can_go_negative() {
        let account = Account::new(UserId(1));
        account.lock().total_points += -5;
        assert_eq!(account.total_points(), -5);
    }

    #[test]
    fn serializes_as_flat_row() {
        let account = Account::new(UserId(42));
        account.lock().total_points = 30;

        let json = serde_json::to_string(&account).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["user"], 42);
        assert_eq!(parsed["total_points"], 30);
    }
}
