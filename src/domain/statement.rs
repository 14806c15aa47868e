use super::customer::{Customer, CustomerId};
use super::money::Money;
use super::payment::PaymentMethod;
use super::rates::{BreakdownLine, RateTable};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Totals block of a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub total_due: Money,
    pub total_paid: Money,
    pub balance: Money,
    pub paid_percent: Decimal,
    pub pending_percent: Decimal,
}

/// One payment in the history, with the balance left after it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub number: usize,
    pub date: NaiveDate,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: String,
    pub running_balance: Money,
    pub notes: String,
}

/// A customer's kardex: everything needed to render the statement document
/// and the statement workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub trip_title: String,
    pub generated_at: NaiveDateTime,
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub registered_at: NaiveDateTime,
    pub lines: Vec<BreakdownLine>,
    pub account: AccountSummary,
    pub history: Vec<StatementRow>,
    pub notes: String,
}

impl Statement {
    /// Builds the statement for `customer`, walking its payments in recorded
    /// order. The running balance starts at the total due.
    pub fn build(
        customer: &Customer,
        rates: &RateTable,
        trip_title: &str,
        generated_at: NaiveDateTime,
    ) -> Self {
        let mut running = customer.total_due;
        let history = customer
            .payments
            .iter()
            .enumerate()
            .map(|(i, payment)| {
                running -= payment.amount;
                StatementRow {
                    number: i + 1,
                    date: payment.date,
                    amount: payment.amount,
                    method: payment.method,
                    reference: payment.reference_or_dash().to_string(),
                    running_balance: running,
                    notes: payment.notes.clone(),
                }
            })
            .collect();

        Self {
            trip_title: trip_title.to_string(),
            generated_at,
            customer_id: customer.id.clone(),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            registered_at: customer.registered_at,
            lines: rates.breakdown(&customer.reservation),
            account: AccountSummary {
                total_due: customer.total_due,
                total_paid: customer.total_paid,
                balance: customer.balance,
                paid_percent: customer.total_paid.percent_of(customer.total_due),
                pending_percent: customer.balance.percent_of(customer.total_due),
            },
            history,
            notes: customer.notes.clone(),
        }
    }

    /// Balance after the last payment, or the total due with no payments.
    pub fn final_balance(&self) -> Money {
        self.history
            .last()
            .map(|row| row.running_balance)
            .unwrap_or(self.account.total_due)
    }

    /// True when the payment history accounts for the stored balance.
    pub fn is_consistent(&self) -> bool {
        self.final_balance() == self.account.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerDetails;
    use crate::domain::payment::Payment;
    use crate::domain::rates::Reservation;
    use rust_decimal_macros::dec;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn customer_with_payments(amounts: &[Decimal]) -> Customer {
        let rates = RateTable::default();
        let reservation = Reservation::new(2, 1, 0, 1);
        let details = CustomerDetails {
            name: "Ana López".to_string(),
            reservation,
            ..Default::default()
        };
        let mut customer = Customer::register(
            CustomerId::new("CLI002"),
            details,
            rates.total_for(&reservation),
            at(),
        );
        for amount in amounts {
            customer
                .apply_payment(Payment {
                    date: at().date(),
                    amount: Money::new(*amount),
                    method: PaymentMethod::Transfer,
                    reference: "F-1".to_string(),
                    notes: String::new(),
                    recorded_at: at(),
                })
                .unwrap();
        }
        customer
    }

    #[test]
    fn test_running_balance_sequence() {
        let customer = customer_with_payments(&[dec!(1000), dec!(400), dec!(600)]);
        let statement = Statement::build(&customer, &RateTable::default(), "Viaje", at());

        let balances: Vec<Money> = statement
            .history
            .iter()
            .map(|row| row.running_balance)
            .collect();
        assert_eq!(
            balances,
            vec![
                Money::new(dec!(1400)),
                Money::new(dec!(1000)),
                Money::new(dec!(400)),
            ]
        );
        assert_eq!(statement.history[0].number, 1);
        assert_eq!(statement.final_balance(), customer.balance);
        assert!(statement.is_consistent());
    }

    #[test]
    fn test_no_payments_ends_at_total() {
        let customer = customer_with_payments(&[]);
        let statement = Statement::build(&customer, &RateTable::default(), "Viaje", at());
        assert!(statement.history.is_empty());
        assert_eq!(statement.final_balance(), Money::new(dec!(2400)));
        assert!(statement.is_consistent());
        assert_eq!(statement.account.paid_percent, dec!(0));
        assert_eq!(statement.account.pending_percent, dec!(100));
    }

    #[test]
    fn test_detects_desynchronized_balance() {
        let mut customer = customer_with_payments(&[dec!(1000)]);
        customer.balance = Money::new(dec!(10));
        let statement = Statement::build(&customer, &RateTable::default(), "Viaje", at());
        assert!(!statement.is_consistent());
    }

    #[test]
    fn test_account_percentages() {
        let customer = customer_with_payments(&[dec!(600)]);
        let statement = Statement::build(&customer, &RateTable::default(), "Viaje", at());
        assert_eq!(statement.account.paid_percent, dec!(25.0));
        assert_eq!(statement.account.pending_percent, dec!(75.0));
        assert_eq!(statement.lines.len(), 4);
    }
}
