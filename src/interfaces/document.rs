//! Printable statement: a plain-text document with one boxed table per
//! section.

use crate::domain::dates::TIMESTAMP_FORMAT;
use crate::domain::statement::Statement;
use crate::interfaces::sheet::{
    ACCOUNT_SHEET, HISTORY_SHEET, INFO_SHEET, NOTES_SHEET, RESERVATIONS_SHEET, Sheet, Workbook,
};
use std::fmt;

const RULE_WIDTH: usize = 72;
const FOOTER: &str = "Sistema de Gestión de Viajes";

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, len: usize) -> String {
    format!("{}{}", text, " ".repeat(len.saturating_sub(width(text))))
}

fn centered(text: &str) -> String {
    let left = RULE_WIDTH.saturating_sub(width(text)) / 2;
    format!("{}{}", " ".repeat(left), text)
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            line.push(mid);
        }
        line.push_str(&"─".repeat(w + 2));
    }
    line.push(right);
    line
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (cell, w) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(&pad(cell, *w));
        line.push_str(" │");
    }
    line
}

/// Draws a sheet as a box-drawn table.
pub fn boxed_table(sheet: &Sheet) -> String {
    let columns = sheet.header.len();
    let mut widths: Vec<usize> = sheet.header.iter().map(|h| width(h)).collect();
    for row in &sheet.rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(width(cell));
        }
    }

    let mut out = String::new();
    out.push_str(&border(&widths, '┌', '┬', '┐'));
    out.push('\n');
    out.push_str(&row_line(&sheet.header, &widths));
    out.push('\n');
    out.push_str(&border(&widths, '├', '┼', '┤'));
    out.push('\n');
    for row in &sheet.rows {
        let mut cells = row.clone();
        cells.resize(columns, String::new());
        out.push_str(&row_line(&cells, &widths));
        out.push('\n');
    }
    out.push_str(&border(&widths, '└', '┴', '┘'));
    out.push('\n');
    out
}

fn section_title(name: &str) -> &'static str {
    match name {
        INFO_SHEET => "INFORMACIÓN DEL CLIENTE",
        RESERVATIONS_SHEET => "RESERVAS Y COSTOS",
        ACCOUNT_SHEET => "ESTADO DE CUENTA",
        HISTORY_SHEET => "HISTORIAL DE PAGOS",
        NOTES_SHEET => "NOTAS DEL CLIENTE",
        _ => "",
    }
}

/// The statement laid out as a text document.
///
/// Sections come from the same tables as the workbook export, so both
/// formats always agree. Notes are printed as a paragraph.
pub struct StatementDocument<'a>(pub &'a Statement);

impl fmt::Display for StatementDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let statement = self.0;
        let rule = "═".repeat(RULE_WIDTH);

        writeln!(f, "{}", rule)?;
        writeln!(f, "{}", centered("KARDEX DE CLIENTE"))?;
        writeln!(f, "{}", centered(&statement.trip_title))?;
        let generated = format!(
            "Generado: {}",
            statement.generated_at.format(TIMESTAMP_FORMAT)
        );
        writeln!(f, "{}", centered(&generated))?;
        writeln!(f, "{}", rule)?;

        for sheet in &Workbook::from(statement).sheets {
            writeln!(f)?;
            writeln!(f, "{}", section_title(&sheet.name))?;
            if sheet.name == NOTES_SHEET {
                writeln!(f, "{}", statement.notes.trim())?;
            } else {
                f.write_str(&boxed_table(sheet))?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{}", "_".repeat(47))?;
        writeln!(f, "{}", centered(&format!("{} - {}", FOOTER, statement.trip_title)))
    }
}

pub fn render_statement(statement: &Statement) -> String {
    StatementDocument(statement).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{Customer, CustomerDetails, CustomerId};
    use crate::domain::money::Money;
    use crate::domain::payment::{Payment, PaymentMethod};
    use crate::domain::rates::{RateTable, Reservation};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn statement(with_payment: bool, notes: &str) -> Statement {
        let at = NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let details = CustomerDetails {
            name: "María José".to_string(),
            reservation: Reservation::new(1, 0, 0, 0),
            notes: notes.to_string(),
            ..Default::default()
        };
        let mut c = Customer::register(CustomerId::new("CLI003"), details, Money::new(dec!(400)), at);
        if with_payment {
            c.apply_payment(Payment {
                date: at.date(),
                amount: Money::new(dec!(150)),
                method: PaymentMethod::Cash,
                reference: "A-1".to_string(),
                notes: String::new(),
                recorded_at: at,
            })
            .unwrap();
        }
        Statement::build(&c, &RateTable::default(), "Viaje a San Juan", at)
    }

    #[test]
    fn test_boxed_table_aligns_columns() {
        let mut sheet = Sheet::new("T", &["Campo", "Valor"]);
        sheet.push(["Nombre", "María"]);
        let table = boxed_table(&sheet);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "│ Campo  │ Valor │");
        assert_eq!(lines[3], "│ Nombre │ María │");
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_document_contains_sections() {
        let doc = render_statement(&statement(true, "Viaja con su mamá"));
        assert!(doc.contains("KARDEX DE CLIENTE"));
        assert!(doc.contains("Generado: 10/01/2026 10:00:00"));
        assert!(doc.contains("HISTORIAL DE PAGOS"));
        assert!(doc.contains("$250.00"));
        assert!(doc.contains("Viaja con su mamá"));
    }

    #[test]
    fn test_document_skips_empty_sections() {
        let doc = render_statement(&statement(false, ""));
        assert!(doc.contains("ESTADO DE CUENTA"));
        assert!(!doc.contains("HISTORIAL DE PAGOS"));
        assert!(!doc.contains("NOTAS DEL CLIENTE"));
    }
}
