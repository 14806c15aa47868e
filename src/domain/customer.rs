use super::dates;
use super::money::Money;
use super::payment::Payment;
use super::rates::Reservation;
use crate::error::{LedgerError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

const ID_PREFIX: &str = "CLI";
const ID_WIDTH: usize = 3;

/// Upper bound for each seat or room count on one customer.
pub const MAX_UNITS: u32 = 999;

/// Sequential, human-readable customer identifier such as `CLI007`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of a well-formed id (`CLI012` -> 12).
    pub fn sequence(&self) -> Option<u32> {
        self.0
            .strip_prefix(ID_PREFIX)
            .and_then(|digits| digits.parse().ok())
    }

    /// The id following the highest sequence among `existing`.
    ///
    /// Ids that do not follow the `CLI<digits>` shape are ignored.
    pub fn next_after<'a, I>(existing: I) -> Self
    where
        I: IntoIterator<Item = &'a CustomerId>,
    {
        let last = existing
            .into_iter()
            .filter_map(CustomerId::sequence)
            .max()
            .unwrap_or(0);
        Self(format!("{}{:0width$}", ID_PREFIX, last + 1, width = ID_WIDTH))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Whether a customer still owes money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Settled,
    Pending,
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountState::Settled => f.write_str("Liquidado"),
            AccountState::Pending => f.write_str("Pendiente"),
        }
    }
}

/// Contact data and reservation, as captured by the create and edit forms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub reservation: Reservation,
    pub notes: String,
}

impl CustomerDetails {
    pub fn validate(&self, total_due: Money) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::ValidationError(
                "Customer name is required".to_string(),
            ));
        }
        let r = &self.reservation;
        if [r.seats, r.rooms.singles, r.rooms.doubles, r.rooms.triples]
            .iter()
            .any(|n| *n > MAX_UNITS)
        {
            return Err(LedgerError::ValidationError(format!(
                "At most {} seats or rooms of each kind per customer",
                MAX_UNITS
            )));
        }
        if total_due.is_zero() {
            return Err(LedgerError::ValidationError(
                "Select at least one seat or room".to_string(),
            ));
        }
        Ok(())
    }
}

/// A registered traveller and their account.
///
/// `id` is the key under which the record is stored, so it is not part of the
/// serialized body. `payments` are kept in the order they were recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(skip, default)]
    pub id: CustomerId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub reservation: Reservation,
    #[serde(rename = "total_a_pagar")]
    pub total_due: Money,
    #[serde(rename = "total_pagado", default)]
    pub total_paid: Money,
    #[serde(rename = "saldo_pendiente")]
    pub balance: Money,
    #[serde(rename = "notas", default)]
    pub notes: String,
    #[serde(rename = "fecha_registro", with = "dates::timestamp")]
    pub registered_at: NaiveDateTime,
    #[serde(rename = "pagos", default)]
    pub payments: Vec<Payment>,
}

impl Customer {
    pub fn register(
        id: CustomerId,
        details: CustomerDetails,
        total_due: Money,
        registered_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            name: details.name.trim().to_string(),
            phone: details.phone,
            email: details.email,
            reservation: details.reservation,
            total_due,
            total_paid: Money::ZERO,
            balance: total_due,
            notes: details.notes,
            registered_at,
            payments: Vec::new(),
        }
    }

    /// Only an exact zero balance is settled; a negative balance left by an
    /// edit still needs attention.
    pub fn state(&self) -> AccountState {
        if self.balance.is_zero() {
            AccountState::Settled
        } else {
            AccountState::Pending
        }
    }

    pub fn paid_percent(&self) -> rust_decimal::Decimal {
        self.total_paid.percent_of(self.total_due)
    }

    /// Replaces contact data and reservation.
    ///
    /// The balance is re-derived from the new total and the amount already
    /// paid; payments recorded against the previous total are left as they are.
    pub fn apply_details(&mut self, details: CustomerDetails, total_due: Money) {
        self.name = details.name.trim().to_string();
        self.phone = details.phone;
        self.email = details.email;
        self.reservation = details.reservation;
        self.notes = details.notes;
        self.total_due = total_due;
        self.balance = total_due - self.total_paid;
    }

    /// Records a payment. The amount must be positive and within the balance.
    pub fn apply_payment(&mut self, payment: Payment) -> Result<()> {
        if !payment.amount.is_positive() {
            return Err(LedgerError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }
        if payment.amount > self.balance {
            return Err(LedgerError::ValidationError(format!(
                "Payment of {} exceeds the pending balance of {}",
                payment.amount, self.balance
            )));
        }
        self.total_paid += payment.amount;
        self.balance = self.total_due - self.total_paid;
        self.payments.push(payment);
        Ok(())
    }

    /// Removes the payment at 1-based position `number` and restores its
    /// amount to the balance.
    pub fn remove_payment(&mut self, number: usize) -> Result<Payment> {
        if number == 0 || number > self.payments.len() {
            return Err(LedgerError::PaymentNotFound {
                customer: self.id.clone(),
                number,
            });
        }
        let payment = self.payments.remove(number - 1);
        self.total_paid -= payment.amount;
        self.balance = self.total_due - self.total_paid;
        Ok(payment)
    }

    /// Case-insensitive match on name or id, plain substring match on phone.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let lowered = query.to_lowercase();
        self.name.to_lowercase().contains(&lowered)
            || self.id.as_str().to_lowercase().contains(&lowered)
            || self.phone.contains(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentMethod;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn payment(amount: rust_decimal::Decimal) -> Payment {
        Payment {
            date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            amount: Money::new(amount),
            method: PaymentMethod::Cash,
            reference: String::new(),
            notes: String::new(),
            recorded_at: at(),
        }
    }

    fn customer(total: rust_decimal::Decimal) -> Customer {
        let details = CustomerDetails {
            name: "Juan Pérez".to_string(),
            phone: "3331234567".to_string(),
            reservation: Reservation::new(1, 0, 0, 0),
            ..Default::default()
        };
        Customer::register(CustomerId::new("CLI001"), details, Money::new(total), at())
    }

    #[test]
    fn test_next_id_sequence() {
        assert_eq!(CustomerId::next_after([]).as_str(), "CLI001");

        let ids = [CustomerId::new("CLI001"), CustomerId::new("CLI009")];
        assert_eq!(CustomerId::next_after(&ids).as_str(), "CLI010");

        let gaps = [CustomerId::new("CLI003"), CustomerId::new("BOGUS")];
        assert_eq!(CustomerId::next_after(&gaps).as_str(), "CLI004");

        let wide = [CustomerId::new("CLI999")];
        assert_eq!(CustomerId::next_after(&wide).as_str(), "CLI1000");
    }

    #[test]
    fn test_register_starts_with_full_balance() {
        let c = customer(dec!(2400));
        assert_eq!(c.total_paid, Money::ZERO);
        assert_eq!(c.balance, Money::new(dec!(2400)));
        assert_eq!(c.state(), AccountState::Pending);
    }

    #[test]
    fn test_validate_details() {
        let mut details = CustomerDetails {
            name: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            details.validate(Money::new(dec!(400))),
            Err(LedgerError::ValidationError(_))
        ));
        details.name = "Ana".to_string();
        assert!(matches!(
            details.validate(Money::ZERO),
            Err(LedgerError::ValidationError(_))
        ));
        assert!(details.validate(Money::new(dec!(400))).is_ok());
    }

    #[test]
    fn test_validate_caps_counts() {
        let mut details = CustomerDetails {
            name: "Ana".to_string(),
            reservation: Reservation::new(MAX_UNITS, 0, 0, 0),
            ..Default::default()
        };
        assert!(details.validate(Money::new(dec!(400))).is_ok());
        details.reservation = Reservation::new(1, 0, u32::MAX, 0);
        assert!(matches!(
            details.validate(Money::new(dec!(400))),
            Err(LedgerError::ValidationError(_))
        ));
    }

    #[test]
    fn test_apply_payment_reduces_balance() {
        let mut c = customer(dec!(2400));
        c.apply_payment(payment(dec!(1000))).unwrap();
        assert_eq!(c.total_paid, Money::new(dec!(1000)));
        assert_eq!(c.balance, Money::new(dec!(1400)));
        assert_eq!(c.payments.len(), 1);
    }

    #[test]
    fn test_apply_payment_rejects_overpayment() {
        let mut c = customer(dec!(400));
        let result = c.apply_payment(payment(dec!(400.01)));
        assert!(matches!(result, Err(LedgerError::ValidationError(_))));
        assert_eq!(c.balance, Money::new(dec!(400)));
        assert!(c.payments.is_empty());
    }

    #[test]
    fn test_settling_payment() {
        let mut c = customer(dec!(400));
        c.apply_payment(payment(dec!(400))).unwrap();
        assert_eq!(c.balance, Money::ZERO);
        assert_eq!(c.state(), AccountState::Settled);
    }

    #[test]
    fn test_negative_balance_is_pending() {
        let mut c = customer(dec!(800));
        c.apply_payment(payment(dec!(800))).unwrap();
        c.balance = Money::new(dec!(-400));
        assert_eq!(c.state(), AccountState::Pending);
        assert_eq!(c.state().to_string(), "Pendiente");
    }

    #[test]
    fn test_remove_payment_restores_balance() {
        let mut c = customer(dec!(2400));
        c.apply_payment(payment(dec!(500))).unwrap();
        c.apply_payment(payment(dec!(700))).unwrap();

        let removed = c.remove_payment(1).unwrap();
        assert_eq!(removed.amount, Money::new(dec!(500)));
        assert_eq!(c.balance, Money::new(dec!(1700)));
        assert_eq!(c.total_paid, Money::new(dec!(700)));

        assert!(matches!(
            c.remove_payment(2),
            Err(LedgerError::PaymentNotFound { number: 2, .. })
        ));
        assert!(matches!(
            c.remove_payment(0),
            Err(LedgerError::PaymentNotFound { .. })
        ));
    }

    #[test]
    fn test_apply_details_keeps_paid_amount() {
        let mut c = customer(dec!(2400));
        c.apply_payment(payment(dec!(1000))).unwrap();

        let details = CustomerDetails {
            name: "Juan Pérez".to_string(),
            reservation: Reservation::new(1, 0, 0, 0),
            ..Default::default()
        };
        c.apply_details(details, Money::new(dec!(400)));
        assert_eq!(c.total_due, Money::new(dec!(400)));
        assert_eq!(c.total_paid, Money::new(dec!(1000)));
        assert_eq!(c.balance, Money::new(dec!(-600)));
    }

    #[test]
    fn test_matches_query() {
        let c = customer(dec!(400));
        assert!(c.matches("juan"));
        assert!(c.matches("cli001"));
        assert!(c.matches("3331"));
        assert!(c.matches(""));
        assert!(!c.matches("maria"));
    }

    #[test]
    fn test_customer_json_layout() {
        let json = r#"{
            "nombre": "Ana López",
            "telefono": "3330000000",
            "email": "ana@example.com",
            "asientos": 2,
            "habitaciones": {"sencillas": 1, "dobles": 0, "triples": 1},
            "total_a_pagar": 2400,
            "total_pagado": 0,
            "saldo_pendiente": 2400,
            "pagos": [],
            "notas": "",
            "fecha_registro": "15/01/2026 10:00:00"
        }"#;
        let c: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(c.reservation, Reservation::new(2, 1, 0, 1));
        assert_eq!(c.balance, Money::new(dec!(2400)));
        assert_eq!(c.id, CustomerId::default());

        let back = serde_json::to_value(&c).unwrap();
        assert_eq!(back["asientos"], 2);
        assert_eq!(back["habitaciones"]["triples"], 1);
        assert!(back.get("id").is_none());
    }
}
