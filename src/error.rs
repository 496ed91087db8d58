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

//! Error types for point application.

use thiserror::Error;

/// Point application errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    /// Action name is not in the closed enumeration
    #[error("unrecognized action kind")]
    InvalidActionKind,

    /// Referenced user does not exist
    #[error("user not found")]
    UserNotFound,

    /// Signup for a user that already has an account
    #[error("user already registered")]
    DuplicateUser,

    /// Ledger storage rejected the write; nothing was applied
    #[error("ledger storage unavailable")]
    Persistence,
}

#[cfg(test)]
mod tests {
    use super::PointError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            PointError::InvalidActionKind.to_string(),
            "unrecognized action kind"
        );
        assert_eq!(PointError::UserNotFound.to_string(), "user not found");
        assert_eq!(
            PointError::DuplicateUser.to_string(),
            "user already registered"
        );
        assert_eq!(
            PointError::Persistence.to_string(),
            "ledger storage unavailable"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = PointError::UserNotFound;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
