//! Aggregates over the whole customer population.
//!
//! Every figure here is derived from the stored customer totals, so a deleted
//! customer (and its payments) disappears from all of them.

use super::customer::{AccountState, Customer, CustomerId};
use super::money::Money;
use super::payment::Payment;
use super::rates::{Concept, RateTable};
use rust_decimal::Decimal;

/// Budget versus collected money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collection {
    pub budget: Money,
    pub collected: Money,
    pub pending: Money,
}

impl Collection {
    pub fn from_customers(customers: &[Customer]) -> Self {
        let budget: Money = customers.iter().map(|c| c.total_due).sum();
        let collected: Money = customers.iter().map(|c| c.total_paid).sum();
        Self {
            budget,
            collected,
            pending: budget - collected,
        }
    }

    pub fn collected_percent(&self) -> Decimal {
        self.collected.percent_of(self.budget)
    }
}

/// Seats and rooms booked across all customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occupancy {
    pub customers: usize,
    pub seats: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
}

impl Occupancy {
    pub fn from_customers(customers: &[Customer]) -> Self {
        customers.iter().fold(
            Self {
                customers: customers.len(),
                ..Default::default()
            },
            |mut acc, c| {
                acc.seats = acc.seats.saturating_add(c.reservation.seats);
                acc.singles = acc.singles.saturating_add(c.reservation.rooms.singles);
                acc.doubles = acc.doubles.saturating_add(c.reservation.rooms.doubles);
                acc.triples = acc.triples.saturating_add(c.reservation.rooms.triples);
                acc
            },
        )
    }

    pub fn rooms(&self) -> u32 {
        self.singles
            .saturating_add(self.doubles)
            .saturating_add(self.triples)
    }

    pub fn quantity(&self, concept: Concept) -> u32 {
        match concept {
            Concept::Seat => self.seats,
            Concept::SingleRoom => self.singles,
            Concept::DoubleRoom => self.doubles,
            Concept::TripleRoom => self.triples,
        }
    }
}

/// A customer's line on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStatus {
    pub id: CustomerId,
    pub name: String,
    pub total_due: Money,
    pub total_paid: Money,
    pub balance: Money,
    pub paid_percent: Decimal,
    pub state: AccountState,
}

impl From<&Customer> for CustomerStatus {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            total_due: c.total_due,
            total_paid: c.total_paid,
            balance: c.balance,
            paid_percent: c.paid_percent(),
            state: c.state(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub occupancy: Occupancy,
    pub collection: Collection,
    pub statuses: Vec<CustomerStatus>,
}

impl Dashboard {
    pub fn from_customers(customers: &[Customer]) -> Self {
        Self {
            occupancy: Occupancy::from_customers(customers),
            collection: Collection::from_customers(customers),
            statuses: customers.iter().map(CustomerStatus::from).collect(),
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &CustomerStatus> {
        self.statuses
            .iter()
            .filter(|s| s.state == AccountState::Pending)
    }
}

/// Revenue per concept at the current rates.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueLine {
    pub concept: Concept,
    pub quantity: u32,
    pub rate: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinancialReport {
    pub collection: Collection,
    pub revenue: Vec<RevenueLine>,
}

impl FinancialReport {
    pub fn build(customers: &[Customer], rates: &RateTable) -> Self {
        let occupancy = Occupancy::from_customers(customers);
        let revenue = Concept::ALL
            .iter()
            .map(|&concept| {
                let quantity = occupancy.quantity(concept);
                let rate = rates.rate(concept);
                RevenueLine {
                    concept,
                    quantity,
                    rate,
                    total: rate * quantity,
                }
            })
            .collect();
        Self {
            collection: Collection::from_customers(customers),
            revenue,
        }
    }
}

/// Bus seat availability against a fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatAvailability {
    pub capacity: u32,
    pub occupied: u32,
}

impl SeatAvailability {
    /// Negative when the bus is overbooked.
    pub fn available(&self) -> i64 {
        i64::from(self.capacity) - i64::from(self.occupied)
    }

    pub fn occupied_percent(&self) -> Decimal {
        if self.capacity == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(self.occupied) / Decimal::from(self.capacity) * Decimal::ONE_HUNDRED)
                .round_dp(1)
        }
    }
}

/// Every payment of every customer, flattened for the ledger export.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPayment {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub payment: Payment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerExport {
    pub customers: Vec<Customer>,
    pub payments: Vec<LedgerPayment>,
    pub financial: FinancialReport,
}

impl LedgerExport {
    pub fn build(customers: Vec<Customer>, rates: &RateTable) -> Self {
        let payments = customers
            .iter()
            .flat_map(|c| {
                c.payments.iter().map(move |p| LedgerPayment {
                    customer_id: c.id.clone(),
                    customer_name: c.name.clone(),
                    payment: p.clone(),
                })
            })
            .collect();
        let financial = FinancialReport::build(&customers, rates);
        Self {
            customers,
            payments,
            financial,
        }
    }
}
