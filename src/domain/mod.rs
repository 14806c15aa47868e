//! Domain types and rules: money, rates, customers, payments, statements,
//! reports, access control and the storage ports.

pub mod access;
pub mod customer;
pub mod dates;
pub mod money;
pub mod payment;
pub mod ports;
pub mod rates;
pub mod report;
pub mod snapshot;
pub mod statement;
