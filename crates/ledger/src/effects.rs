//! Balance-effect calculator.
//!
//! Maps a transaction to the signed balance deltas it causes, one per
//! affected balance target. The mapping is pure and deterministic: update
//! and delete rely on computing it twice (stored image, new image) and
//! negating, so the same transaction must always produce the same effects.

use crate::{Amount, BalanceTarget, Transaction, TransactionDetail};

/// A signed balance delta attributed to one balance target by one
/// transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Effect {
    pub target: BalanceTarget,
    pub amount: Amount,
}

impl Effect {
    /// The inverse effect, used to reverse a transaction before applying its
    /// updated image or deleting it.
    #[must_use]
    pub fn negated(self) -> Effect {
        Effect {
            target: self.target,
            amount: -self.amount,
        }
    }
}

/// Computes the balance effects of a transaction:
///
/// - expense: `-amount` on the target
/// - income: `+amount` on the target
/// - transfer: `-amount` on `from`, `+amount` on `to`
pub fn effects_of(tx: &Transaction) -> Vec<Effect> {
    match tx.detail {
        TransactionDetail::Expense { target, .. } => vec![Effect {
            target,
            amount: -tx.amount,
        }],
        TransactionDetail::Income { target, .. } => vec![Effect {
            target,
            amount: tx.amount,
        }],
        TransactionDetail::Transfer { from, to } => vec![
            Effect {
                target: from,
                amount: -tx.amount,
            },
            Effect {
                target: to,
                amount: tx.amount,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{TransactionKind, transactions::TransactionDetail};

    fn transaction(detail: TransactionDetail, cents: i64) -> Transaction {
        Transaction::new(
            "alice".to_string(),
            detail,
            Amount::new(cents),
            Utc.timestamp_opt(0, 0).unwrap(),
            true,
            None,
        )
        .unwrap()
    }

    #[test]
    fn expense_debits_the_target() {
        let account_id = Uuid::new_v4();
        let tx = transaction(
            TransactionDetail::Expense {
                target: BalanceTarget::account(account_id),
                category_id: Uuid::new_v4(),
            },
            1250,
        );

        let effects = effects_of(&tx);
        assert_eq!(
            effects,
            vec![Effect {
                target: BalanceTarget::account(account_id),
                amount: Amount::new(-1250),
            }]
        );
    }

    #[test]
    fn income_credits_the_target() {
        let card_id = Uuid::new_v4();
        let tx = transaction(
            TransactionDetail::Income {
                target: BalanceTarget::card(card_id),
                category_id: Uuid::new_v4(),
            },
            900,
        );

        let effects = effects_of(&tx);
        assert_eq!(effects[0].amount, Amount::new(900));
        assert_eq!(effects[0].target, BalanceTarget::card(card_id));
    }

    #[test]
    fn transfer_debits_from_and_credits_to() {
        let from = BalanceTarget::account(Uuid::new_v4());
        let to = BalanceTarget::account(Uuid::new_v4());
        let tx = transaction(TransactionDetail::Transfer { from, to }, 4000);

        let effects = effects_of(&tx);
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], Effect { target: from, amount: Amount::new(-4000) });
        assert_eq!(effects[1], Effect { target: to, amount: Amount::new(4000) });
    }

    #[test]
    fn negation_cancels_the_effect() {
        let from = BalanceTarget::account(Uuid::new_v4());
        let to = BalanceTarget::card(Uuid::new_v4());
        let tx = transaction(TransactionDetail::Transfer { from, to }, 100);

        for effect in effects_of(&tx) {
            assert_eq!(effect.amount + effect.negated().amount, Amount::ZERO);
            assert_eq!(effect.negated().target, effect.target);
        }
    }

    #[test]
    fn same_image_yields_same_effects() {
        let tx = transaction(
            TransactionDetail::Expense {
                target: BalanceTarget::account(Uuid::new_v4()),
                category_id: Uuid::new_v4(),
            },
            333,
        );
        assert_eq!(effects_of(&tx), effects_of(&tx));
    }

    #[test]
    fn shape_rules_are_enforced_when_assembling() {
        let account = BalanceTarget::account(Uuid::new_v4());
        let category = Uuid::new_v4();

        let err = TransactionDetail::from_refs(
            TransactionKind::Transfer,
            Some(account),
            None,
            Some(account),
        )
        .unwrap_err();
        assert!(matches!(err, crate::LedgerError::InvalidTransferTarget(_)));

        let err = TransactionDetail::from_refs(
            TransactionKind::Expense,
            Some(account),
            Some(category),
            Some(BalanceTarget::account(Uuid::new_v4())),
        )
        .unwrap_err();
        assert!(matches!(err, crate::LedgerError::UnexpectedReference(_)));

        let err =
            TransactionDetail::from_refs(TransactionKind::Income, Some(account), None, None)
                .unwrap_err();
        assert!(matches!(err, crate::LedgerError::ReferenceNotFound(_)));
    }
}
