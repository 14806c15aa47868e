use crate::domain::customer::{Customer, CustomerId};
use crate::domain::payment::Payment;
use crate::domain::ports::{CustomerStore, PaymentBook};
use crate::error::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Default time a cached read stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

impl<T: Clone> Entry<T> {
    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.fetched_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

/// Read-through cache in front of a slow [`CustomerStore`].
///
/// Full customer and payment listings are reused for `ttl`. Any write through
/// this store drops both entries, so the next read goes to the backend.
/// Changes made by other clients of the backend may stay invisible for up to
/// `ttl`.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    customers: Mutex<Option<Entry<Vec<Customer>>>>,
    payments: Mutex<Option<Entry<PaymentBook>>>,
}

impl<S: CustomerStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            customers: Mutex::new(None),
            payments: Mutex::new(None),
        }
    }

    pub async fn invalidate(&self) {
        *self.customers.lock().await = None;
        *self.payments.lock().await = None;
        debug!("Read cache cleared");
    }
}

#[async_trait]
impl<S: CustomerStore> CustomerStore for CachedStore<S> {
    async fn load_customers(&self) -> Result<Vec<Customer>> {
        let mut slot = self.customers.lock().await;
        if let Some(value) = slot.as_ref().and_then(|e| e.fresh(self.ttl)) {
            debug!("Customer listing served from cache");
            return Ok(value);
        }
        let value = self.inner.load_customers().await?;
        *slot = Some(Entry {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn save_customer(&self, customer: &Customer) -> Result<()> {
        let result = self.inner.save_customer(customer).await;
        self.invalidate().await;
        result
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<bool> {
        let result = self.inner.delete_customer(id).await;
        self.invalidate().await;
        result
    }

    async fn load_payments(&self) -> Result<PaymentBook> {
        let mut slot = self.payments.lock().await;
        if let Some(value) = slot.as_ref().and_then(|e| e.fresh(self.ttl)) {
            debug!("Payment listing served from cache");
            return Ok(value);
        }
        let value = self.inner.load_payments().await?;
        *slot = Some(Entry {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn append_payment(&self, id: &CustomerId, payment: &Payment) -> Result<()> {
        let result = self.inner.append_payment(id, payment).await;
        self.invalidate().await;
        result
    }

    async fn delete_payment(&self, id: &CustomerId, index: usize) -> Result<Option<Payment>> {
        let result = self.inner.delete_payment(id, index).await;
        self.invalidate().await;
        result
    }
}
