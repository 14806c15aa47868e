//! Remote variant: customers, payments and configuration kept as three
//! tables of a spreadsheet service, keyed by customer id.
//!
//! The store only needs "read every row", "append a row" and "replace the
//! table" from the service, which is what [`SheetClient`] captures. The
//! bundled [`CsvSheetClient`] keeps each table as a CSV file in a directory.

use super::json_file::write_atomically;
use crate::domain::customer::{Customer, CustomerId};
use crate::domain::dates::{self, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::domain::money::Money;
use crate::domain::payment::{Payment, PaymentMethod};
use crate::domain::ports::{CustomerStore, PaymentBook, SettingsStore};
use crate::domain::rates::{RateTable, Reservation, TripSettings};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CUSTOMERS_SHEET: &str = "Clientes";
pub const PAYMENTS_SHEET: &str = "Pagos";
pub const SETTINGS_SHEET: &str = "Configuracion";

pub const CUSTOMER_HEADERS: [&str; 13] = [
    "ID",
    "Nombre",
    "Telefono",
    "Email",
    "Asientos",
    "Hab_Sencillas",
    "Hab_Dobles",
    "Hab_Triples",
    "Total_Pagar",
    "Total_Pagado",
    "Saldo_Pendiente",
    "Notas",
    "Fecha_Registro",
];

pub const PAYMENT_HEADERS: [&str; 7] = [
    "Cliente_ID",
    "Fecha",
    "Monto",
    "Metodo",
    "Referencia",
    "Notas",
    "Timestamp",
];

pub const SETTINGS_HEADERS: [&str; 2] = ["Clave", "Valor"];

pub type Row = Vec<String>;

/// Minimal table access offered by a spreadsheet service.
///
/// `get_all_values` returns every row including the header row; an empty
/// vector means the table has never been written.
#[async_trait]
pub trait SheetClient: Send + Sync {
    async fn get_all_values(&self, sheet: &str) -> Result<Vec<Row>>;
    async fn append_row(&self, sheet: &str, row: Row) -> Result<()>;
    async fn replace_all(&self, sheet: &str, rows: Vec<Row>) -> Result<()>;
}

/// Keeps each table as `<dir>/<sheet>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSheetClient {
    dir: PathBuf,
}

impl CsvSheetClient {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet))
    }
}

#[async_trait]
impl SheetClient for CsvSheetClient {
    async fn get_all_values(&self, sheet: &str) -> Result<Vec<Row>> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    async fn append_row(&self, sheet: &str, row: Row) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.sheet_path(sheet))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        writer.write_record(&row)?;
        writer.flush()?;
        Ok(())
    }

    async fn replace_all(&self, sheet: &str, rows: Vec<Row>) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());
        for row in &rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| LedgerError::IoError(e.into_error()))?;
        write_atomically(&self.sheet_path(sheet), &bytes)
    }
}

/// A table read as records: header names mapped to column positions.
struct Table {
    columns: HashMap<String, usize>,
    rows: Vec<Row>,
}

impl Table {
    fn from_values(mut values: Vec<Row>) -> Self {
        if values.is_empty() {
            return Self {
                columns: HashMap::new(),
                rows: Vec::new(),
            };
        }
        let header = values.remove(0);
        let columns = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self {
            columns,
            rows: values,
        }
    }

    fn get<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&i| row.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

fn header_row(headers: &[&str]) -> Row {
    headers.iter().map(|h| h.to_string()).collect()
}

fn parse_count(value: &str, column: &str) -> Result<u32> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| LedgerError::StorageError(format!("invalid {} '{}'", column, value)))
}

fn parse_money(value: &str, column: &str) -> Result<Money> {
    if value.is_empty() {
        return Ok(Money::ZERO);
    }
    value
        .parse::<Decimal>()
        .map(|d| Money::new(d.normalize()))
        .map_err(|_| LedgerError::StorageError(format!("invalid {} '{}'", column, value)))
}

fn customer_from_row(table: &Table, row: &[String]) -> Result<Option<Customer>> {
    let id = table.get(row, "ID");
    if id.is_empty() {
        return Ok(None);
    }
    let registered = table.get(row, "Fecha_Registro");
    let registered_at = dates::parse_timestamp(registered).ok_or_else(|| {
        LedgerError::StorageError(format!("invalid Fecha_Registro '{}' for {}", registered, id))
    })?;
    Ok(Some(Customer {
        id: CustomerId::new(id),
        name: table.get(row, "Nombre").to_string(),
        phone: table.get(row, "Telefono").to_string(),
        email: table.get(row, "Email").to_string(),
        reservation: Reservation::new(
            parse_count(table.get(row, "Asientos"), "Asientos")?,
            parse_count(table.get(row, "Hab_Sencillas"), "Hab_Sencillas")?,
            parse_count(table.get(row, "Hab_Dobles"), "Hab_Dobles")?,
            parse_count(table.get(row, "Hab_Triples"), "Hab_Triples")?,
        ),
        total_due: parse_money(table.get(row, "Total_Pagar"), "Total_Pagar")?,
        total_paid: parse_money(table.get(row, "Total_Pagado"), "Total_Pagado")?,
        balance: parse_money(table.get(row, "Saldo_Pendiente"), "Saldo_Pendiente")?,
        notes: table.get(row, "Notas").to_string(),
        registered_at,
        payments: Vec::new(),
    }))
}

fn customer_to_row(c: &Customer) -> Row {
    vec![
        c.id.to_string(),
        c.name.clone(),
        c.phone.clone(),
        c.email.clone(),
        c.reservation.seats.to_string(),
        c.reservation.rooms.singles.to_string(),
        c.reservation.rooms.doubles.to_string(),
        c.reservation.rooms.triples.to_string(),
        c.total_due.value().to_string(),
        c.total_paid.value().to_string(),
        c.balance.value().to_string(),
        c.notes.clone(),
        c.registered_at.format(TIMESTAMP_FORMAT).to_string(),
    ]
}

fn payment_from_row(table: &Table, row: &[String]) -> Result<Option<(CustomerId, Payment)>> {
    let id = table.get(row, "Cliente_ID");
    if id.is_empty() {
        return Ok(None);
    }
    let invalid = |column: &str, value: &str| {
        LedgerError::StorageError(format!("invalid {} '{}' for {}", column, value, id))
    };
    let date = table.get(row, "Fecha");
    let method = table.get(row, "Metodo");
    let recorded = table.get(row, "Timestamp");
    let payment = Payment {
        date: dates::parse_date(date).ok_or_else(|| invalid("Fecha", date))?,
        amount: parse_money(table.get(row, "Monto"), "Monto")?,
        method: method.parse::<PaymentMethod>().map_err(|_| invalid("Metodo", method))?,
        reference: table.get(row, "Referencia").to_string(),
        notes: table.get(row, "Notas").to_string(),
        recorded_at: dates::parse_timestamp(recorded).ok_or_else(|| invalid("Timestamp", recorded))?,
    };
    Ok(Some((CustomerId::new(id), payment)))
}

fn payment_to_row(id: &CustomerId, p: &Payment) -> Row {
    vec![
        id.to_string(),
        p.date.format(DATE_FORMAT).to_string(),
        p.amount.value().to_string(),
        p.method.label().to_string(),
        p.reference.clone(),
        p.notes.clone(),
        p.recorded_at.format(TIMESTAMP_FORMAT).to_string(),
    ]
}

/// Customer, payment and settings tables behind a [`SheetClient`].
///
/// Every write is read-modify-write of a whole table; two people editing the
/// same sheet at once can overwrite each other.
#[derive(Debug, Clone)]
pub struct SheetStore<C> {
    client: C,
}

impl<C: SheetClient> SheetStore<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    async fn append_with_header(&self, sheet: &str, headers: &[&str], row: Row) -> Result<()> {
        if self.client.get_all_values(sheet).await?.is_empty() {
            self.client.append_row(sheet, header_row(headers)).await?;
        }
        self.client.append_row(sheet, row).await
    }
}

#[async_trait]
impl<C: SheetClient> CustomerStore for SheetStore<C> {
    async fn load_customers(&self) -> Result<Vec<Customer>> {
        let table = Table::from_values(self.client.get_all_values(CUSTOMERS_SHEET).await?);
        let mut customers = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            if let Some(customer) = customer_from_row(&table, row)? {
                customers.push(customer);
            }
        }
        debug!(count = customers.len(), "Loaded customers sheet");
        Ok(customers)
    }

    async fn save_customer(&self, customer: &Customer) -> Result<()> {
        let mut values = self.client.get_all_values(CUSTOMERS_SHEET).await?;
        let row = customer_to_row(customer);
        if values.is_empty() {
            values.push(header_row(&CUSTOMER_HEADERS));
            values.push(row);
            return self.client.replace_all(CUSTOMERS_SHEET, values).await;
        }
        let existing = values
            .iter()
            .skip(1)
            .position(|r| r.first().map(|s| s.trim()) == Some(customer.id.as_str()));
        match existing {
            Some(pos) => {
                values[pos + 1] = row;
                self.client.replace_all(CUSTOMERS_SHEET, values).await
            }
            None => self.client.append_row(CUSTOMERS_SHEET, row).await,
        }
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<bool> {
        let values = self.client.get_all_values(CUSTOMERS_SHEET).await?;
        let before = values.len();
        let kept: Vec<Row> = values
            .into_iter()
            .enumerate()
            .filter(|(i, r)| *i == 0 || r.first().map(|s| s.trim()) != Some(id.as_str()))
            .map(|(_, r)| r)
            .collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.client.replace_all(CUSTOMERS_SHEET, kept).await?;

        let table = Table::from_values(self.client.get_all_values(PAYMENTS_SHEET).await?);
        let orphaned = table
            .rows
            .iter()
            .filter(|r| table.get(r, "Cliente_ID") == id.as_str())
            .count();
        if orphaned > 0 {
            let mut rows = vec![header_row(&PAYMENT_HEADERS)];
            rows.extend(
                table
                    .rows
                    .iter()
                    .filter(|r| table.get(r, "Cliente_ID") != id.as_str())
                    .cloned(),
            );
            self.client.replace_all(PAYMENTS_SHEET, rows).await?;
            info!(customer = %id, payments = orphaned, "Removed payments of deleted customer");
        }
        Ok(true)
    }

    async fn load_payments(&self) -> Result<PaymentBook> {
        let table = Table::from_values(self.client.get_all_values(PAYMENTS_SHEET).await?);
        let mut book = PaymentBook::new();
        for row in &table.rows {
            if let Some((id, payment)) = payment_from_row(&table, row)? {
                book.entry(id).or_default().push(payment);
            }
        }
        Ok(book)
    }

    async fn append_payment(&self, id: &CustomerId, payment: &Payment) -> Result<()> {
        self.append_with_header(PAYMENTS_SHEET, &PAYMENT_HEADERS, payment_to_row(id, payment))
            .await
    }

    async fn delete_payment(&self, id: &CustomerId, index: usize) -> Result<Option<Payment>> {
        let table = Table::from_values(self.client.get_all_values(PAYMENTS_SHEET).await?);
        let target = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| table.get(r, "Cliente_ID") == id.as_str())
            .nth(index)
            .map(|(pos, _)| pos);
        let Some(pos) = target else {
            return Ok(None);
        };
        let removed = payment_from_row(&table, &table.rows[pos])?.map(|(_, p)| p);

        let mut rows = vec![header_row(&PAYMENT_HEADERS)];
        rows.extend(
            table
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != pos)
                .map(|(_, r)| r.clone()),
        );
        self.client.replace_all(PAYMENTS_SHEET, rows).await?;
        Ok(removed)
    }
}

const KEY_SEAT: &str = "transporte";
const KEY_SINGLE: &str = "habitacion_sencilla";
const KEY_DOUBLE: &str = "habitacion_doble";
const KEY_TRIPLE: &str = "habitacion_triple";
const KEY_TRIP_DATE: &str = "fecha_viaje";

#[async_trait]
impl<C: SheetClient> SettingsStore for SheetStore<C> {
    async fn load_settings(&self) -> Result<Option<TripSettings>> {
        let table = Table::from_values(self.client.get_all_values(SETTINGS_SHEET).await?);
        if table.rows.is_empty() {
            return Ok(None);
        }
        let values: HashMap<&str, &str> = table
            .rows
            .iter()
            .map(|r| (table.get(r, "Clave"), table.get(r, "Valor")))
            .collect();
        let defaults = RateTable::default();
        let rate = |key: &str, fallback: Money| -> Result<Money> {
            match values.get(key) {
                Some(v) if !v.is_empty() => parse_money(v, key),
                _ => Ok(fallback),
            }
        };
        Ok(Some(TripSettings {
            rates: RateTable {
                seat: rate(KEY_SEAT, defaults.seat)?,
                single_room: rate(KEY_SINGLE, defaults.single_room)?,
                double_room: rate(KEY_DOUBLE, defaults.double_room)?,
                triple_room: rate(KEY_TRIPLE, defaults.triple_room)?,
            },
            trip_date: values.get(KEY_TRIP_DATE).and_then(|v| dates::parse_date(v)),
        }))
    }

    async fn save_settings(&self, settings: &TripSettings) -> Result<()> {
        let rates = &settings.rates;
        let rows = vec![
            header_row(&SETTINGS_HEADERS),
            vec![KEY_SEAT.to_string(), rates.seat.value().to_string()],
            vec![KEY_SINGLE.to_string(), rates.single_room.value().to_string()],
            vec![KEY_DOUBLE.to_string(), rates.double_room.value().to_string()],
            vec![KEY_TRIPLE.to_string(), rates.triple_room.value().to_string()],
            vec![
                KEY_TRIP_DATE.to_string(),
                settings
                    .trip_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            ],
        ];
        self.client.replace_all(SETTINGS_SHEET, rows).await
    }
}
