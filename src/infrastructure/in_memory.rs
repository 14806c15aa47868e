use crate::domain::customer::{Customer, CustomerId};
use crate::domain::payment::Payment;
use crate::domain::ports::{CustomerStore, PaymentBook, SettingsStore};
use crate::domain::rates::TripSettings;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    customers: BTreeMap<CustomerId, Customer>,
    payments: PaymentBook,
    settings: Option<TripSettings>,
}

/// A thread-safe in-memory store.
///
/// Uses `Arc<RwLock<..>>` so clones share the same data. Ideal for tests
/// and dry runs where nothing should touch the disk.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn load_customers(&self) -> Result<Vec<Customer>> {
        let state = self.state.read().await;
        Ok(state.customers.values().cloned().collect())
    }

    async fn save_customer(&self, customer: &Customer) -> Result<()> {
        let mut record = customer.clone();
        record.payments.clear();
        let mut state = self.state.write().await;
        state.customers.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<bool> {
        let mut state = self.state.write().await;
        state.payments.remove(id);
        Ok(state.customers.remove(id).is_some())
    }

    async fn load_payments(&self) -> Result<PaymentBook> {
        let state = self.state.read().await;
        Ok(state.payments.clone())
    }

    async fn append_payment(&self, id: &CustomerId, payment: &Payment) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .payments
            .entry(id.clone())
            .or_default()
            .push(payment.clone());
        Ok(())
    }

    async fn delete_payment(&self, id: &CustomerId, index: usize) -> Result<Option<Payment>> {
        let mut state = self.state.write().await;
        Ok(state
            .payments
            .get_mut(id)
            .filter(|payments| index < payments.len())
            .map(|payments| payments.remove(index)))
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn load_settings(&self) -> Result<Option<TripSettings>> {
        let state = self.state.read().await;
        Ok(state.settings.clone())
    }

    async fn save_settings(&self, settings: &TripSettings) -> Result<()> {
        let mut state = self.state.write().await;
        state.settings = Some(settings.clone());
        Ok(())
    }
}
