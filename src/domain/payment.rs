use super::dates;
use super::money::{Amount, Money};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a payment was made. Persisted with the labels staff already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Efectivo")]
    Cash,
    #[serde(rename = "Transferencia")]
    Transfer,
    #[serde(rename = "Tarjeta Débito")]
    DebitCard,
    #[serde(rename = "Tarjeta Crédito")]
    CreditCard,
    #[serde(rename = "Depósito")]
    Deposit,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::DebitCard,
        PaymentMethod::CreditCard,
        PaymentMethod::Deposit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::DebitCard => "Tarjeta Débito",
            PaymentMethod::CreditCard => "Tarjeta Crédito",
            PaymentMethod::Deposit => "Depósito",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the stored label or a short English keyword (`cash`, `transfer`,
/// `debit`, `credit`, `deposit`).
impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        if let Some(method) = Self::ALL
            .iter()
            .find(|m| m.label().eq_ignore_ascii_case(needle))
        {
            return Ok(*method);
        }
        match needle.to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            "debit" => Ok(PaymentMethod::DebitCard),
            "credit" => Ok(PaymentMethod::CreditCard),
            "deposit" => Ok(PaymentMethod::Deposit),
            _ => Err(format!("unknown payment method '{}'", s)),
        }
    }
}

/// A single installment recorded against a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "fecha", with = "dates::day")]
    pub date: NaiveDate,
    #[serde(rename = "monto")]
    pub amount: Money,
    #[serde(rename = "metodo")]
    pub method: PaymentMethod,
    #[serde(rename = "referencia", default)]
    pub reference: String,
    #[serde(rename = "notas", default)]
    pub notes: String,
    #[serde(rename = "timestamp", with = "dates::timestamp")]
    pub recorded_at: NaiveDateTime,
}

impl Payment {
    pub fn reference_or_dash(&self) -> &str {
        if self.reference.trim().is_empty() {
            "-"
        } else {
            &self.reference
        }
    }
}

/// Input of the payment registration flow.
///
/// `amount: None` pays off the whole remaining balance.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Option<Amount>,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: String,
    pub notes: String,
}
