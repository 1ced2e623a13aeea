//! Reward center: the grant side of the energy economy
//!
//! Daily check-in, rewarded ads, and friend invites all feed the same
//! `grant` operation the refund path uses. The last check-in date is the
//! one piece of persisted UI state, kept through the session store.

use std::sync::Arc;

use chrono::NaiveDate;
use relume_common::{SessionStore, LAST_CHECK_IN_DATE};

use crate::domain::entities::CreditLedger;

const CHECK_IN_DATE_FORMAT: &str = "%Y-%m-%d";

/// The ways a user earns energy outside of refunds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardKind {
    DailyCheckIn,
    RewardedAd,
    InviteFriend,
}

impl RewardKind {
    /// Energy granted for this reward
    pub fn amount(&self) -> u32 {
        match self {
            RewardKind::DailyCheckIn => 2,
            RewardKind::RewardedAd => 5,
            RewardKind::InviteFriend => 10,
        }
    }
}

/// Grants rewards into the ledger, enforcing the once-per-day check-in rule
pub struct RewardCenter {
    ledger: Arc<CreditLedger>,
    session: Arc<dyn SessionStore>,
}

impl RewardCenter {
    pub fn new(ledger: Arc<CreditLedger>, session: Arc<dyn SessionStore>) -> Self {
        Self { ledger, session }
    }

    /// Whether the user already checked in on `today`
    pub fn checked_in_on(&self, today: NaiveDate) -> bool {
        self.session.get(LAST_CHECK_IN_DATE).as_deref()
            == Some(today.format(CHECK_IN_DATE_FORMAT).to_string().as_str())
    }

    /// Daily check-in: grants at most once per calendar day.
    /// Returns whether the grant happened.
    pub fn check_in(&self, today: NaiveDate) -> bool {
        if self.checked_in_on(today) {
            tracing::debug!(%today, "Check-in already claimed today");
            return false;
        }

        self.session.put(
            LAST_CHECK_IN_DATE,
            today.format(CHECK_IN_DATE_FORMAT).to_string(),
        );
        self.grant(RewardKind::DailyCheckIn);
        true
    }

    /// Claim an unrestricted reward (rewarded ad, friend invite)
    pub fn claim(&self, kind: RewardKind) {
        debug_assert!(kind != RewardKind::DailyCheckIn, "use check_in");
        self.grant(kind);
    }

    fn grant(&self, kind: RewardKind) {
        tracing::info!(?kind, amount = kind.amount(), "Reward granted");
        self.ledger.grant(kind.amount());
    }
}
