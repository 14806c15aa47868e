use crate::domain::access::{Screen, Session};
use crate::domain::customer::{Customer, CustomerDetails, CustomerId};
use crate::domain::money::Money;
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::ports::{CustomerStoreBox, SettingsStoreBox};
use crate::domain::rates::{RateTable, TripSettings};
use crate::domain::report::{
    Dashboard, FinancialReport, LedgerExport, Occupancy, SeatAvailability,
};
use crate::domain::snapshot::TripSnapshot;
use crate::domain::statement::Statement;
use crate::error::{LedgerError, Result};
use crate::infrastructure::json_file::write_atomically;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const DEFAULT_TRIP_TITLE: &str = "Viaje a San Juan de los Lagos";
pub const DEFAULT_BUS_CAPACITY: u32 = 50;

/// Which customers a listing keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    /// Nothing left to pay.
    Settled,
    /// Balance above zero.
    Pending,
}

impl StatusFilter {
    pub fn keeps(&self, customer: &Customer) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Settled => customer.balance.is_zero(),
            StatusFilter::Pending => customer.balance.is_positive(),
        }
    }
}

/// Seat availability plus the room counts shown next to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyReport {
    pub seats: SeatAvailability,
    pub rooms: Occupancy,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Every screen's operation, for one user, over the configured storage.
///
/// Each call loads what it needs from the stores and writes changes back
/// before returning; nothing is kept between calls.
pub struct TripService {
    customer_store: CustomerStoreBox,
    settings_store: SettingsStoreBox,
    session: Session,
    trip_title: String,
    bus_capacity: u32,
    clock: fn() -> NaiveDateTime,
}

impl TripService {
    pub fn new(
        customer_store: CustomerStoreBox,
        settings_store: SettingsStoreBox,
        session: Session,
    ) -> Self {
        Self {
            customer_store,
            settings_store,
            session,
            trip_title: DEFAULT_TRIP_TITLE.to_string(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
            clock: local_now,
        }
    }

    pub fn with_trip_title(mut self, title: impl Into<String>) -> Self {
        self.trip_title = title.into();
        self
    }

    pub fn with_bus_capacity(mut self, capacity: u32) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Replaces the wall clock, for reproducible timestamps.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn trip_title(&self) -> &str {
        &self.trip_title
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub fn menu(&self) -> Vec<Screen> {
        self.session.role.menu()
    }

    // ---- storage helpers ----

    async fn load_settings(&self) -> Result<TripSettings> {
        Ok(self
            .settings_store
            .load_settings()
            .await?
            .unwrap_or_default())
    }

    async fn rates(&self) -> Result<RateTable> {
        Ok(self.load_settings().await?.rates)
    }

    /// Customers in id order with their payments attached.
    async fn load_all(&self) -> Result<Vec<Customer>> {
        let mut customers = self.customer_store.load_customers().await?;
        let mut book = self.customer_store.load_payments().await?;
        for customer in customers.iter_mut() {
            customer.payments = book.remove(&customer.id).unwrap_or_default();
        }
        customers.sort_by(|a, b| {
            (a.id.sequence(), a.id.as_str()).cmp(&(b.id.sequence(), b.id.as_str()))
        });
        Ok(customers)
    }

    /// Read-only screens show an empty result instead of failing when the
    /// backend cannot be read.
    async fn load_for_display(&self) -> Vec<Customer> {
        match self.load_all().await {
            Ok(customers) => customers,
            Err(e) => {
                error!(error = %e, "Could not load customers, showing empty result");
                Vec::new()
            }
        }
    }

    async fn find(&self, id: &CustomerId) -> Result<Customer> {
        self.load_all()
            .await?
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| LedgerError::CustomerNotFound(id.clone()))
    }

    // ---- customers ----

    pub async fn register_customer(&self, details: CustomerDetails) -> Result<Customer> {
        self.session.require(Screen::NewCustomer)?;
        let total_due = self.rates().await?.total_for(&details.reservation);
        details.validate(total_due)?;

        let existing = self.customer_store.load_customers().await?;
        let id = CustomerId::next_after(existing.iter().map(|c| &c.id));
        let customer = Customer::register(id, details, total_due, self.now());
        self.customer_store.save_customer(&customer).await?;

        info!(
            customer = %customer.id,
            name = %customer.name,
            total_due = %customer.total_due,
            user = %self.session.username,
            "Customer registered"
        );
        Ok(customer)
    }

    /// Replaces the customer's data and recomputes the total at the current
    /// rates. The balance becomes `new total - paid`, even if that is negative.
    pub async fn edit_customer(&self, id: &CustomerId, details: CustomerDetails) -> Result<Customer> {
        self.session.require(Screen::EditCustomer)?;
        let mut customer = self.find(id).await?;
        let total_due = self.rates().await?.total_for(&details.reservation);
        details.validate(total_due)?;

        let previous_total = customer.total_due;
        customer.apply_details(details, total_due);
        if previous_total != total_due && !customer.payments.is_empty() {
            warn!(
                customer = %id,
                previous = %previous_total,
                current = %total_due,
                "Total changed on a customer with recorded payments"
            );
        }
        if customer.balance < Money::ZERO {
            warn!(customer = %id, balance = %customer.balance, "Balance is negative after edit");
        }
        self.customer_store.save_customer(&customer).await?;
        info!(customer = %id, user = %self.session.username, "Customer updated");
        Ok(customer)
    }

    /// Deletes the customer and every payment recorded for them.
    pub async fn delete_customer(&self, id: &CustomerId, confirmed: bool) -> Result<Customer> {
        self.session.require(Screen::EditCustomer)?;
        let customer = self.find(id).await?;
        if !confirmed {
            return Err(LedgerError::ConfirmationRequired(format!(
                "deleting {} ({}) and {} payment(s) cannot be undone",
                customer.id,
                customer.name,
                customer.payments.len()
            )));
        }
        if !self.customer_store.delete_customer(id).await? {
            return Err(LedgerError::CustomerNotFound(id.clone()));
        }
        info!(
            customer = %id,
            payments = customer.payments.len(),
            user = %self.session.username,
            "Customer deleted"
        );
        Ok(customer)
    }

    pub async fn customer(&self, id: &CustomerId) -> Result<Customer> {
        self.session.require(Screen::ListCustomers)?;
        self.find(id).await
    }

    pub async fn customers(&self) -> Result<Vec<Customer>> {
        self.session.require(Screen::ListCustomers)?;
        Ok(self.load_for_display().await)
    }

    pub async fn search_customers(&self, query: &str, filter: StatusFilter) -> Result<Vec<Customer>> {
        self.session.require(Screen::ListCustomers)?;
        Ok(self
            .load_for_display()
            .await
            .into_iter()
            .filter(|c| c.matches(query) && filter.keeps(c))
            .collect())
    }

    // ---- payments ----

    /// Records a payment. Without an amount the whole pending balance is paid.
    pub async fn register_payment(&self, id: &CustomerId, new: NewPayment) -> Result<(Customer, Payment)> {
        self.session.require(Screen::RegisterPayment)?;
        let mut customer = self.find(id).await?;
        if !customer.balance.is_positive() {
            return Err(LedgerError::ValidationError(format!(
                "Customer {} has no pending balance",
                id
            )));
        }
        let amount = new.amount.map(Money::from).unwrap_or(customer.balance);
        let payment = Payment {
            date: new.date,
            amount,
            method: new.method,
            reference: new.reference.trim().to_string(),
            notes: new.notes,
            recorded_at: self.now(),
        };
        customer.apply_payment(payment.clone())?;

        self.customer_store.append_payment(id, &payment).await?;
        self.customer_store.save_customer(&customer).await?;

        info!(
            customer = %id,
            amount = %payment.amount,
            method = %payment.method,
            balance = %customer.balance,
            user = %self.session.username,
            "Payment registered"
        );
        if customer.balance.is_zero() {
            info!(customer = %id, "Account settled");
        }
        Ok((customer, payment))
    }

    /// Deletes payment `number` (1-based, recorded order) and gives its
    /// amount back to the balance.
    pub async fn delete_payment(
        &self,
        id: &CustomerId,
        number: usize,
        confirmed: bool,
    ) -> Result<(Customer, Payment)> {
        self.session.require(Screen::DeletePayment)?;
        let mut customer = self.find(id).await?;
        let payment = customer.remove_payment(number)?;
        if !confirmed {
            return Err(LedgerError::ConfirmationRequired(format!(
                "deleting payment #{} of {} for {}",
                number, payment.amount, id
            )));
        }

        if self
            .customer_store
            .delete_payment(id, number - 1)
            .await?
            .is_none()
        {
            warn!(customer = %id, number, "Payment row was already gone in storage");
        }
        self.customer_store.save_customer(&customer).await?;

        info!(
            customer = %id,
            number,
            amount = %payment.amount,
            balance = %customer.balance,
            user = %self.session.username,
            "Payment deleted"
        );
        Ok((customer, payment))
    }

    /// Customers that can still receive a payment.
    pub async fn customers_with_balance(&self) -> Result<Vec<Customer>> {
        self.session.require(Screen::RegisterPayment)?;
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|c| c.balance.is_positive())
            .collect())
    }

    /// Customers with at least one payment to delete.
    pub async fn customers_with_payments(&self) -> Result<Vec<Customer>> {
        self.session.require(Screen::DeletePayment)?;
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|c| !c.payments.is_empty())
            .collect())
    }

    // ---- reports ----

    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.session.require(Screen::Dashboard)?;
        Ok(Dashboard::from_customers(&self.load_for_display().await))
    }

    pub async fn summary(&self) -> Result<Occupancy> {
        self.session.require(Screen::Reports)?;
        Ok(Occupancy::from_customers(&self.load_for_display().await))
    }

    pub async fn financial(&self) -> Result<FinancialReport> {
        self.session.require(Screen::Reports)?;
        let customers = self.load_for_display().await;
        Ok(FinancialReport::build(&customers, &self.rates().await?))
    }

    pub async fn occupancy(&self) -> Result<OccupancyReport> {
        self.session.require(Screen::Reports)?;
        let rooms = Occupancy::from_customers(&self.load_for_display().await);
        Ok(OccupancyReport {
            seats: SeatAvailability {
                capacity: self.bus_capacity,
                occupied: rooms.seats,
            },
            rooms,
        })
    }

    pub async fn ledger_export(&self) -> Result<LedgerExport> {
        self.session.require(Screen::Reports)?;
        let rates = self.rates().await?;
        Ok(LedgerExport::build(self.load_all().await?, &rates))
    }

    pub async fn statement(&self, id: &CustomerId) -> Result<Statement> {
        self.session.require(Screen::Statement)?;
        let customer = self.find(id).await?;
        let statement = Statement::build(&customer, &self.rates().await?, &self.trip_title, self.now());
        if !statement.is_consistent() {
            warn!(
                customer = %id,
                stored = %statement.account.balance,
                computed = %statement.final_balance(),
                "Payment history does not add up to the stored balance"
            );
        }
        Ok(statement)
    }

    // ---- configuration and maintenance ----

    pub async fn settings(&self) -> Result<TripSettings> {
        self.session.require(Screen::Configuration)?;
        self.load_settings().await
    }

    /// Stores new rates and trip date. Existing totals keep the rates they
    /// were computed with.
    pub async fn update_settings(&self, settings: TripSettings) -> Result<TripSettings> {
        self.session.require(Screen::Configuration)?;
        self.settings_store.save_settings(&settings).await?;
        info!(
            seat = %settings.rates.seat,
            single = %settings.rates.single_room,
            double = %settings.rates.double_room,
            triple = %settings.rates.triple_room,
            user = %self.session.username,
            "Trip settings updated"
        );
        Ok(settings)
    }

    /// Deletes every customer and payment; settings stay.
    pub async fn reset_data(&self, confirmed: bool) -> Result<usize> {
        self.session.require(Screen::Configuration)?;
        if !confirmed {
            return Err(LedgerError::ConfirmationRequired(
                "resetting deletes every customer and payment".to_string(),
            ));
        }
        let customers = self.customer_store.load_customers().await?;
        for customer in &customers {
            self.customer_store.delete_customer(&customer.id).await?;
        }
        warn!(customers = customers.len(), user = %self.session.username, "All trip data deleted");
        Ok(customers.len())
    }

    /// Writes the whole trip as a JSON document into `dir`.
    pub async fn backup(&self, dir: &Path) -> Result<PathBuf> {
        self.session.require(Screen::Configuration)?;
        let snapshot = TripSnapshot::new(self.load_all().await?, self.load_settings().await?);
        let path = dir.join(format!(
            "backup_viaje_{}.json",
            self.now().format("%d-%m-%Y_%H%M%S")
        ));
        write_atomically(&path, &snapshot.to_json()?)?;
        info!(path = %path.display(), customers = snapshot.customers.len(), "Backup written");
        Ok(path)
    }
}
