//! Action types gated by one-shot tokens, as independent bit flags.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::AppError;

/// One account-state transition an action token can authorize.
///
/// Action types are independent bit flags so a single token can
/// simultaneously authorize a combination (e.g. an invitation that also
/// pre-validates the email address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Accept an invitation and create the account.
    Invite,
    /// Prove control of the email address.
    ValidateEmail,
    /// Accept the terms of service.
    AcceptTerms,
    /// Accept the privacy policy.
    AcceptPrivacyPolicy,
    /// Change the password (forced-change flow).
    ChangePassword,
    /// Reset a forgotten password.
    ResetPassword,
    /// Confirm a change of email address.
    ChangeEmail,
}

impl ActionType {
    /// All action types, in bit order.
    pub const ALL: [ActionType; 7] = [
        Self::Invite,
        Self::ValidateEmail,
        Self::AcceptTerms,
        Self::AcceptPrivacyPolicy,
        Self::ChangePassword,
        Self::ResetPassword,
        Self::ChangeEmail,
    ];

    /// The bit flag for this action type.
    pub fn bit(&self) -> i32 {
        match self {
            Self::Invite => 1 << 0,
            Self::ValidateEmail => 1 << 1,
            Self::AcceptTerms => 1 << 2,
            Self::AcceptPrivacyPolicy => 1 << 3,
            Self::ChangePassword => 1 << 4,
            Self::ResetPassword => 1 << 5,
            Self::ChangeEmail => 1 << 6,
        }
    }

    /// Return the action type as a snake_case string (the key used in
    /// configuration maps).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invite => "invite",
            Self::ValidateEmail => "validate_email",
            Self::AcceptTerms => "accept_terms",
            Self::AcceptPrivacyPolicy => "accept_privacy_policy",
            Self::ChangePassword => "change_password",
            Self::ResetPassword => "reset_password",
            Self::ChangeEmail => "change_email",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invite" => Ok(Self::Invite),
            "validate_email" => Ok(Self::ValidateEmail),
            "accept_terms" => Ok(Self::AcceptTerms),
            "accept_privacy_policy" => Ok(Self::AcceptPrivacyPolicy),
            "change_password" => Ok(Self::ChangePassword),
            "reset_password" => Ok(Self::ResetPassword),
            "change_email" => Ok(Self::ChangeEmail),
            _ => Err(AppError::validation(format!("Invalid action type: '{s}'"))),
        }
    }
}

impl BitOr for ActionType {
    type Output = ActionTypeSet;

    fn bitor(self, rhs: Self) -> ActionTypeSet {
        ActionTypeSet::from_bits(self.bit() | rhs.bit())
    }
}

impl BitOr<ActionType> for ActionTypeSet {
    type Output = ActionTypeSet;

    fn bitor(self, rhs: ActionType) -> ActionTypeSet {
        ActionTypeSet::from_bits(self.bits() | rhs.bit())
    }
}

/// A set of [`ActionType`] flags, stored as an integer bit mask.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActionTypeSet(i32);

impl ActionTypeSet {
    /// The empty set.
    pub const EMPTY: ActionTypeSet = ActionTypeSet(0);

    /// Build a set containing one action type.
    pub fn only(action: ActionType) -> Self {
        Self(action.bit())
    }

    /// Build a set from a raw bit mask, keeping only recognized bits.
    pub fn from_bits(bits: i32) -> Self {
        let known: i32 = ActionType::ALL.iter().map(|t| t.bit()).sum();
        Self(bits & known)
    }

    /// The raw bit mask.
    pub fn bits(&self) -> i32 {
        self.0
    }

    /// Whether the set contains no action types.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether this set contains the given action type.
    pub fn contains(&self, action: ActionType) -> bool {
        self.0 & action.bit() != 0
    }

    /// Whether this set contains **every** bit of `required`.
    pub fn contains_all(&self, required: ActionTypeSet) -> bool {
        self.0 & required.0 == required.0
    }

    /// Iterate over the action types present in the set, in bit order.
    pub fn iter(&self) -> impl Iterator<Item = ActionType> + '_ {
        ActionType::ALL.into_iter().filter(|t| self.contains(*t))
    }
}

impl From<ActionType> for ActionTypeSet {
    fn from(action: ActionType) -> Self {
        Self::only(action)
    }
}

impl FromIterator<ActionType> for ActionTypeSet {
    fn from_iter<I: IntoIterator<Item = ActionType>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0, |bits, t| bits | t.bit()))
    }
}

impl fmt::Display for ActionTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for action in self.iter() {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{action}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_independent() {
        for (i, a) in ActionType::ALL.iter().enumerate() {
            for b in &ActionType::ALL[i + 1..] {
                assert_eq!(a.bit() & b.bit(), 0, "{a} and {b} share bits");
            }
        }
    }

    #[test]
    fn test_contains_all() {
        let mask = ActionType::Invite | ActionType::ValidateEmail;
        assert!(mask.contains_all(ActionTypeSet::only(ActionType::Invite)));
        assert!(mask.contains_all(mask));
        assert!(!mask.contains_all(ActionTypeSet::only(ActionType::ResetPassword)));
        assert!(!ActionTypeSet::only(ActionType::Invite).contains_all(mask));
    }

    #[test]
    fn test_from_bits_drops_unknown() {
        let set = ActionTypeSet::from_bits(ActionType::Invite.bit() | (1 << 20));
        assert_eq!(set.bits(), ActionType::Invite.bit());
    }

    #[test]
    fn test_display_joins_names() {
        let mask = ActionType::Invite | ActionType::ResetPassword;
        assert_eq!(mask.to_string(), "invite|reset_password");
        assert_eq!(ActionTypeSet::EMPTY.to_string(), "");
    }

    #[test]
    fn test_collect_from_iterator() {
        let mask: ActionTypeSet = [ActionType::AcceptTerms, ActionType::AcceptPrivacyPolicy]
            .into_iter()
            .collect();
        assert!(mask.contains(ActionType::AcceptTerms));
        assert!(mask.contains(ActionType::AcceptPrivacyPolicy));
        assert!(!mask.contains(ActionType::Invite));
    }
}
