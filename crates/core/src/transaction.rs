use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::money::Rupiah;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "INCOME"),
            TransactionKind::Expense => write!(f, "EXPENSE"),
            TransactionKind::Transfer => write!(f, "TRANSFER"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INCOME" => Ok(TransactionKind::Income),
            "EXPENSE" => Ok(TransactionKind::Expense),
            "TRANSFER" => Ok(TransactionKind::Transfer),
            other => Err(format!("Unknown transaction kind: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Rupiah),
    #[error("Transfer requires a target wallet")]
    MissingTargetWallet,
    #[error("Transfer source and target wallet are the same ({0})")]
    SameWallet(i64),
    #[error("Only transfers may carry a target wallet")]
    UnexpectedTargetWallet,
}

/// A transaction the user has not saved yet, e.g. one pre-filled from a
/// scanned receipt. Persistence and balance updates happen elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub wallet_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Rupiah,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub target_wallet_id: Option<i64>,
}

impl TransactionDraft {
    pub fn expense(amount: Rupiah, date: NaiveDate, description: Option<String>) -> Self {
        TransactionDraft {
            wallet_id: None,
            kind: TransactionKind::Expense,
            amount,
            date,
            description,
            category_id: None,
            target_wallet_id: None,
        }
    }

    pub fn validate(self) -> Result<TransactionDraft, DraftError> {
        if !self.amount.is_positive() {
            return Err(DraftError::NonPositiveAmount(self.amount));
        }

        match (self.kind, self.target_wallet_id) {
            (TransactionKind::Transfer, None) => Err(DraftError::MissingTargetWallet),
            (TransactionKind::Transfer, Some(target)) if self.wallet_id == Some(target) => {
                Err(DraftError::SameWallet(target))
            }
            (TransactionKind::Transfer, Some(_)) => Ok(self),
            (_, Some(_)) => Err(DraftError::UnexpectedTargetWallet),
            (_, None) => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(units: i64) -> TransactionDraft {
        TransactionDraft::expense(
            Rupiah::from_units(units),
            date(2026, 3, 14),
            Some("INDOMARET".to_string()),
        )
    }

    #[test]
    fn expense_draft_validates() {
        let draft = expense(25_000).validate().unwrap();
        assert_eq!(draft.kind, TransactionKind::Expense);
        assert_eq!(draft.amount.units(), 25_000);
        assert_eq!(draft.wallet_id, None);
    }

    #[test]
    fn validate_rejects_zero_amount() {
        assert_eq!(
            expense(0).validate(),
            Err(DraftError::NonPositiveAmount(Rupiah::zero()))
        );
    }

    #[test]
    fn transfer_needs_distinct_target() {
        let mut draft = expense(100_000);
        draft.kind = TransactionKind::Transfer;
        draft.wallet_id = Some(1);
        assert_eq!(draft.clone().validate(), Err(DraftError::MissingTargetWallet));

        draft.target_wallet_id = Some(1);
        assert_eq!(draft.clone().validate(), Err(DraftError::SameWallet(1)));

        draft.target_wallet_id = Some(2);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn expense_rejects_target_wallet() {
        let mut draft = expense(10_000);
        draft.target_wallet_id = Some(3);
        assert_eq!(draft.validate(), Err(DraftError::UnexpectedTargetWallet));
    }

    #[test]
    fn kind_roundtrip() {
        use std::str::FromStr;
        for kind in [TransactionKind::Income, TransactionKind::Expense, TransactionKind::Transfer] {
            assert_eq!(TransactionKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert_eq!(TransactionKind::from_str("expense").unwrap(), TransactionKind::Expense);
        assert!(TransactionKind::from_str("refund").is_err());
    }

    #[test]
    fn draft_serializes_with_type_field() {
        let json = serde_json::to_value(expense(45_000)).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["amount"], 45_000);
        assert_eq!(json["date"], "2026-03-14");
    }
}
