use crate::domain::customer::{Customer, CustomerId};
use crate::domain::payment::Payment;
use crate::domain::ports::{CustomerStore, PaymentBook, SettingsStore};
use crate::domain::rates::TripSettings;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for customer records, keyed by customer id.
pub const CF_CUSTOMERS: &str = "customers";
/// Column Family for payment histories, one JSON array per customer id.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family holding the single trip settings record.
pub const CF_SETTINGS: &str = "settings";

const SETTINGS_KEY: &[u8] = b"trip";

/// A persistent store implementation using RocksDB.
///
/// Customers, payments and settings live in separate Column Families. Values
/// are serde_json documents using the same field names as the JSON file.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_CUSTOMERS, CF_PAYMENTS, CF_SETTINGS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::StorageError(format!("{} column family not found", name)))
    }

    fn payments_of(&self, id: &CustomerId) -> Result<Vec<Payment>> {
        let cf = self.cf(CF_PAYMENTS)?;
        match self.db.get_cf(cf, id.as_str())? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn put_payments(&self, id: &CustomerId, payments: &[Payment]) -> Result<()> {
        let cf = self.cf(CF_PAYMENTS)?;
        if payments.is_empty() {
            self.db.delete_cf(cf, id.as_str())?;
        } else {
            self.db.put_cf(cf, id.as_str(), serde_json::to_vec(payments)?)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for RocksDBStore {
    async fn load_customers(&self) -> Result<Vec<Customer>> {
        let cf = self.cf(CF_CUSTOMERS)?;
        let mut customers = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let mut customer: Customer = serde_json::from_slice(&value)?;
            customer.id = CustomerId::new(String::from_utf8_lossy(&key));
            customer.payments.clear();
            customers.push(customer);
        }
        Ok(customers)
    }

    async fn save_customer(&self, customer: &Customer) -> Result<()> {
        let cf = self.cf(CF_CUSTOMERS)?;
        let record = Customer {
            payments: Vec::new(),
            ..customer.clone()
        };
        self.db
            .put_cf(cf, customer.id.as_str(), serde_json::to_vec(&record)?)?;
        Ok(())
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<bool> {
        let cf = self.cf(CF_CUSTOMERS)?;
        // Check if the key exists without retrieving the value
        if self.db.get_pinned_cf(cf, id.as_str())?.is_none() {
            return Ok(false);
        }
        self.db.delete_cf(cf, id.as_str())?;
        self.db.delete_cf(self.cf(CF_PAYMENTS)?, id.as_str())?;
        Ok(true)
    }

    async fn load_payments(&self) -> Result<PaymentBook> {
        let cf = self.cf(CF_PAYMENTS)?;
        let mut book = PaymentBook::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let payments: Vec<Payment> = serde_json::from_slice(&value)?;
            book.insert(CustomerId::new(String::from_utf8_lossy(&key)), payments);
        }
        Ok(book)
    }

    async fn append_payment(&self, id: &CustomerId, payment: &Payment) -> Result<()> {
        let mut payments = self.payments_of(id)?;
        payments.push(payment.clone());
        self.put_payments(id, &payments)
    }

    async fn delete_payment(&self, id: &CustomerId, index: usize) -> Result<Option<Payment>> {
        let mut payments = self.payments_of(id)?;
        if index >= payments.len() {
            return Ok(None);
        }
        let removed = payments.remove(index);
        self.put_payments(id, &payments)?;
        Ok(Some(removed))
    }
}

#[async_trait]
impl SettingsStore for RocksDBStore {
    async fn load_settings(&self) -> Result<Option<TripSettings>> {
        let cf = self.cf(CF_SETTINGS)?;
        match self.db.get_cf(cf, SETTINGS_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save_settings(&self, settings: &TripSettings) -> Result<()> {
        let cf = self.cf(CF_SETTINGS)?;
        self.db.put_cf(cf, SETTINGS_KEY, serde_json::to_vec(settings)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerDetails;
    use crate::domain::money::Money;
    use crate::domain::payment::PaymentMethod;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn customer(id: &str) -> Customer {
        let at = NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let details = CustomerDetails {
            name: "Rosa".to_string(),
            ..Default::default()
        };
        Customer::register(CustomerId::new(id), details, Money::new(dec!(1000)), at)
    }

    fn payment() -> Payment {
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        Payment {
            date,
            amount: Money::new(dec!(250)),
            method: PaymentMethod::Transfer,
            reference: "SPEI-1".to_string(),
            notes: String::new(),
            recorded_at: date.and_hms_opt(11, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_CUSTOMERS).is_some());
        assert!(store.db.cf_handle(CF_PAYMENTS).is_some());
        assert!(store.db.cf_handle(CF_SETTINGS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_customers_and_payments() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let c = customer("CLI001");

        store.save_customer(&c).await.unwrap();
        store.append_payment(&c.id, &payment()).await.unwrap();
        store.append_payment(&c.id, &payment()).await.unwrap();

        let all = store.load_customers().await.unwrap();
        assert_eq!(all, vec![c.clone()]);

        assert!(store.delete_payment(&c.id, 1).await.unwrap().is_some());
        assert!(store.delete_payment(&c.id, 1).await.unwrap().is_none());
        assert_eq!(store.load_payments().await.unwrap()[&c.id].len(), 1);

        assert!(store.delete_customer(&c.id).await.unwrap());
        assert!(store.load_payments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rocksdb_settings() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert!(store.load_settings().await.unwrap().is_none());

        let settings = TripSettings::default();
        store.save_settings(&settings).await.unwrap();
        assert_eq!(store.load_settings().await.unwrap(), Some(settings));
    }
}
