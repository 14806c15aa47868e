//! Tabular views of statements and reports, independent of how they are
//! written out.

use crate::domain::customer::Customer;
use crate::domain::dates::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::domain::money::Money;
use crate::domain::report::{FinancialReport, LedgerExport};
use crate::domain::statement::Statement;
use rust_decimal::Decimal;

pub const INFO_SHEET: &str = "Información General";
pub const RESERVATIONS_SHEET: &str = "Reservas y Costos";
pub const ACCOUNT_SHEET: &str = "Estado de Cuenta";
pub const HISTORY_SHEET: &str = "Historial de Pagos";
pub const NOTES_SHEET: &str = "Notas";

pub const LEDGER_CUSTOMERS_SHEET: &str = "Clientes";
pub const LEDGER_PAYMENTS_SHEET: &str = "Pagos";
pub const LEDGER_SUMMARY_SHEET: &str = "Resumen Financiero";

/// A titled table: one header row and any number of data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: &str, header: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }
}

/// Ordered sheets making up one export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

pub fn percent(value: Decimal) -> String {
    format!("{:.1}%", value)
}

/// Plain number with two decimals, for columns meant to be summed.
pub fn amount(value: Money) -> String {
    format!("{:.2}", value.value())
}

impl From<&Statement> for Workbook {
    fn from(statement: &Statement) -> Self {
        let mut info = Sheet::new(INFO_SHEET, &["Campo", "Valor"]);
        info.push(["ID Cliente", statement.customer_id.as_str()]);
        info.push(["Nombre", statement.name.as_str()]);
        info.push(["Teléfono", statement.phone.as_str()]);
        info.push(["Email", statement.email.as_str()]);
        info.push([
            "Fecha de Registro".to_string(),
            statement.registered_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);

        let mut reservations = Sheet::new(
            RESERVATIONS_SHEET,
            &["Concepto", "Cantidad", "Precio Unitario", "Subtotal"],
        );
        for line in &statement.lines {
            reservations.push([
                line.concept.statement_label().to_string(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.subtotal.to_string(),
            ]);
        }

        let account = &statement.account;
        let mut status = Sheet::new(ACCOUNT_SHEET, &["Concepto", "Monto", "Porcentaje"]);
        status.push([
            "Total a Pagar".to_string(),
            account.total_due.to_string(),
            "100%".to_string(),
        ]);
        status.push([
            "Total Pagado".to_string(),
            account.total_paid.to_string(),
            percent(account.paid_percent),
        ]);
        status.push([
            "Saldo Pendiente".to_string(),
            account.balance.to_string(),
            percent(account.pending_percent),
        ]);

        let mut sheets = vec![info, reservations, status];

        if !statement.history.is_empty() {
            let mut history = Sheet::new(
                HISTORY_SHEET,
                &[
                    "No.",
                    "Fecha",
                    "Monto Pagado",
                    "Método",
                    "Referencia",
                    "Saldo Restante",
                    "Notas",
                ],
            );
            for row in &statement.history {
                history.push([
                    row.number.to_string(),
                    row.date.format(DATE_FORMAT).to_string(),
                    row.amount.to_string(),
                    row.method.label().to_string(),
                    row.reference.clone(),
                    row.running_balance.to_string(),
                    row.notes.clone(),
                ]);
            }
            sheets.push(history);
        }

        if !statement.notes.trim().is_empty() {
            let mut notes = Sheet::new(NOTES_SHEET, &["Notas del Cliente"]);
            notes.push([statement.notes.as_str()]);
            sheets.push(notes);
        }

        Self { sheets }
    }
}

/// Revenue breakdown by concept, closed by a TOTAL row equal to the budget.
pub fn revenue_sheet(report: &FinancialReport) -> Sheet {
    let mut sheet = Sheet::new(
        LEDGER_SUMMARY_SHEET,
        &["Concepto", "Cantidad", "Tarifa", "Total"],
    );
    for line in &report.revenue {
        sheet.push([
            line.concept.revenue_label().to_string(),
            line.quantity.to_string(),
            line.rate.to_string(),
            line.total.to_string(),
        ]);
    }
    sheet.push([
        "TOTAL".to_string(),
        "-".to_string(),
        "-".to_string(),
        report.collection.budget.to_string(),
    ]);
    sheet
}

fn customer_row(c: &Customer) -> Vec<String> {
    vec![
        c.id.to_string(),
        c.name.clone(),
        c.phone.clone(),
        c.email.clone(),
        c.reservation.seats.to_string(),
        c.reservation.rooms.singles.to_string(),
        c.reservation.rooms.doubles.to_string(),
        c.reservation.rooms.triples.to_string(),
        amount(c.total_due),
        amount(c.total_paid),
        amount(c.balance),
        c.registered_at.format(TIMESTAMP_FORMAT).to_string(),
    ]
}

impl From<&LedgerExport> for Workbook {
    fn from(ledger: &LedgerExport) -> Self {
        let mut customers = Sheet::new(
            LEDGER_CUSTOMERS_SHEET,
            &[
                "ID",
                "Nombre",
                "Teléfono",
                "Email",
                "Asientos",
                "Hab. Sencillas",
                "Hab. Dobles",
                "Hab. Triples",
                "Total a Pagar",
                "Total Pagado",
                "Saldo Pendiente",
                "Fecha Registro",
            ],
        );
        for c in &ledger.customers {
            customers.push(customer_row(c));
        }

        let mut sheets = vec![customers];

        if !ledger.payments.is_empty() {
            let mut payments = Sheet::new(
                LEDGER_PAYMENTS_SHEET,
                &[
                    "Cliente ID",
                    "Cliente",
                    "Fecha",
                    "Monto",
                    "Método",
                    "Referencia",
                    "Notas",
                    "Timestamp",
                ],
            );
            for entry in &ledger.payments {
                let p = &entry.payment;
                payments.push([
                    entry.customer_id.to_string(),
                    entry.customer_name.clone(),
                    p.date.format(DATE_FORMAT).to_string(),
                    amount(p.amount),
                    p.method.label().to_string(),
                    p.reference.clone(),
                    p.notes.clone(),
                    p.recorded_at.format(TIMESTAMP_FORMAT).to_string(),
                ]);
            }
            sheets.push(payments);
        }

        sheets.push(revenue_sheet(&ledger.financial));
        Self { sheets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{CustomerDetails, CustomerId};
    use crate::domain::payment::{Payment, PaymentMethod};
    use crate::domain::rates::{RateTable, Reservation};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn customer(notes: &str, payments: &[Decimal]) -> Customer {
        let at = NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let details = CustomerDetails {
            name: "Juan Pérez".to_string(),
            reservation: Reservation::new(2, 1, 0, 1),
            notes: notes.to_string(),
            ..Default::default()
        };
        let mut c = Customer::register(
            CustomerId::new("CLI001"),
            details,
            Money::new(dec!(2400)),
            at,
        );
        for amount in payments {
            c.apply_payment(Payment {
                date: at.date(),
                amount: Money::new(*amount),
                method: PaymentMethod::Transfer,
                reference: String::new(),
                notes: String::new(),
                recorded_at: at,
            })
            .unwrap();
        }
        c
    }

    fn statement(c: &Customer) -> Statement {
        Statement::build(c, &RateTable::default(), "Viaje", c.registered_at)
    }

    #[test]
    fn test_statement_workbook_sections() {
        let c = customer("Prefiere ventana", &[dec!(600), dec!(400)]);
        let book = Workbook::from(&statement(&c));
        let names: Vec<&str> = book.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![INFO_SHEET, RESERVATIONS_SHEET, ACCOUNT_SHEET, HISTORY_SHEET, NOTES_SHEET]
        );

        let status = book.sheet(ACCOUNT_SHEET).unwrap();
        assert_eq!(status.rows[1], vec!["Total Pagado", "$1,000.00", "41.7%"]);

        let history = book.sheet(HISTORY_SHEET).unwrap();
        assert_eq!(history.rows[0][4], "-");
        assert_eq!(history.rows[1][5], "$1,400.00");
    }

    #[test]
    fn test_statement_workbook_omits_empty_sections() {
        let c = customer("", &[]);
        let book = Workbook::from(&statement(&c));
        assert_eq!(book.sheets.len(), 3);
        assert!(book.sheet(HISTORY_SHEET).is_none());
        assert!(book.sheet(NOTES_SHEET).is_none());
    }

    #[test]
    fn test_ledger_workbook_total_row() {
        let ledger = LedgerExport::build(vec![customer("", &[dec!(100)])], &RateTable::default());
        let book = Workbook::from(&ledger);
        assert_eq!(book.sheets.len(), 3);

        let summary = book.sheet(LEDGER_SUMMARY_SHEET).unwrap();
        assert_eq!(summary.rows[0][0], "Transporte");
        assert_eq!(
            summary.rows.last().unwrap(),
            &vec!["TOTAL", "-", "-", "$2,400.00"]
        );
        assert_eq!(book.sheet(LEDGER_PAYMENTS_SHEET).unwrap().rows[0][3], "100.00");
    }

    #[test]
    fn test_ledger_workbook_without_payments() {
        let ledger = LedgerExport::build(vec![customer("", &[])], &RateTable::default());
        let book = Workbook::from(&ledger);
        assert!(book.sheet(LEDGER_PAYMENTS_SHEET).is_none());
        assert_eq!(book.sheet(LEDGER_CUSTOMERS_SHEET).unwrap().rows[0][8], "2400.00");
    }
}
