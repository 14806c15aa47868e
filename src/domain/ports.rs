use super::customer::{Customer, CustomerId};
use super::payment::Payment;
use super::rates::TripSettings;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Payments grouped by owner, each list in recorded order.
pub type PaymentBook = HashMap<CustomerId, Vec<Payment>>;

/// Data access shared by every storage backend.
///
/// Customer records and payments are stored separately: `load_customers`
/// returns records with an empty `payments` list and `save_customer` ignores
/// it. Callers attach payments from `load_payments`.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn load_customers(&self) -> Result<Vec<Customer>>;
    /// Inserts or replaces the record with the same id.
    async fn save_customer(&self, customer: &Customer) -> Result<()>;
    /// Removes the record and all of its payments. Returns false if absent.
    async fn delete_customer(&self, id: &CustomerId) -> Result<bool>;
    async fn load_payments(&self) -> Result<PaymentBook>;
    async fn append_payment(&self, id: &CustomerId, payment: &Payment) -> Result<()>;
    /// Removes the payment at 0-based `index` among the customer's payments.
    async fn delete_payment(&self, id: &CustomerId, index: usize) -> Result<Option<Payment>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_settings(&self) -> Result<Option<TripSettings>>;
    async fn save_settings(&self, settings: &TripSettings) -> Result<()>;
}

pub type CustomerStoreBox = Box<dyn CustomerStore>;
pub type SettingsStoreBox = Box<dyn SettingsStore>;
