use crate::domain::customer::{Customer, CustomerId};
use crate::domain::payment::Payment;
use crate::domain::ports::{CustomerStore, PaymentBook, SettingsStore};
use crate::domain::rates::TripSettings;
use crate::domain::snapshot::TripSnapshot;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Local variant: the whole trip lives in one JSON document.
///
/// The document is read once when the store is opened and rewritten after
/// every change. Writes go to a temporary file in the same directory which
/// is then renamed over the original, so a crash never leaves half a file.
/// There is no coordination between processes sharing the same file.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    snapshot: Arc<RwLock<TripSnapshot>>,
}

impl JsonFileStore {
    /// Opens the document at `path`, starting empty if it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let bytes = std::fs::read(&path)?;
            let snapshot = TripSnapshot::from_json(&bytes)?;
            debug!(path = %path.display(), customers = snapshot.customers.len(), "Loaded trip document");
            snapshot
        } else {
            info!(path = %path.display(), "Trip document not found, starting empty");
            TripSnapshot::default()
        };
        Ok(Self {
            path,
            snapshot: Arc::new(RwLock::new(snapshot)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, snapshot: &TripSnapshot) -> Result<()> {
        write_atomically(&self.path, &snapshot.to_json()?)
    }
}

/// Writes `bytes` to `path` through a sibling temp file and a rename.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| LedgerError::IoError(e.error))?;
    Ok(())
}

#[async_trait]
impl CustomerStore for JsonFileStore {
    async fn load_customers(&self) -> Result<Vec<Customer>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .customers
            .values()
            .map(|c| Customer {
                payments: Vec::new(),
                ..c.clone()
            })
            .collect())
    }

    async fn save_customer(&self, customer: &Customer) -> Result<()> {
        let mut snapshot = self.snapshot.write().await;
        let payments = snapshot
            .customers
            .get(&customer.id)
            .map(|existing| existing.payments.clone())
            .unwrap_or_default();
        snapshot.customers.insert(
            customer.id.clone(),
            Customer {
                payments,
                ..customer.clone()
            },
        );
        self.flush(&snapshot)
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<bool> {
        let mut snapshot = self.snapshot.write().await;
        if snapshot.customers.remove(id).is_none() {
            return Ok(false);
        }
        self.flush(&snapshot)?;
        Ok(true)
    }

    async fn load_payments(&self) -> Result<PaymentBook> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .customers
            .iter()
            .filter(|(_, c)| !c.payments.is_empty())
            .map(|(id, c)| (id.clone(), c.payments.clone()))
            .collect())
    }

    async fn append_payment(&self, id: &CustomerId, payment: &Payment) -> Result<()> {
        let mut snapshot = self.snapshot.write().await;
        let customer = snapshot
            .customers
            .get_mut(id)
            .ok_or_else(|| LedgerError::CustomerNotFound(id.clone()))?;
        customer.payments.push(payment.clone());
        self.flush(&snapshot)
    }

    async fn delete_payment(&self, id: &CustomerId, index: usize) -> Result<Option<Payment>> {
        let mut snapshot = self.snapshot.write().await;
        let removed = match snapshot.customers.get_mut(id) {
            Some(customer) if index < customer.payments.len() => {
                Some(customer.payments.remove(index))
            }
            _ => None,
        };
        if removed.is_some() {
            self.flush(&snapshot)?;
        }
        Ok(removed)
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn load_settings(&self) -> Result<Option<TripSettings>> {
        let snapshot = self.snapshot.read().await;
        Ok(Some(snapshot.settings.clone()))
    }

    async fn save_settings(&self, settings: &TripSettings) -> Result<()> {
        let mut snapshot = self.snapshot.write().await;
        snapshot.settings = settings.clone();
        self.flush(&snapshot)
    }
}
