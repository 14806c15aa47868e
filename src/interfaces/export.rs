use crate::domain::dates::FILE_DATE_FORMAT;
use crate::domain::report::LedgerExport;
use crate::domain::statement::Statement;
use crate::error::Result;
use crate::infrastructure::json_file::write_atomically;
use crate::interfaces::csv::workbook_writer::write_workbook;
use crate::interfaces::document::render_statement;
use crate::interfaces::sheet::Workbook;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFormat {
    Document,
    Workbook,
    Both,
}

/// Keeps a free-text value inside one path component.
fn file_part(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `kardex_<ID>_<Name_With_Underscores>_<dd-mm-YYYY>`
pub fn statement_file_stem(statement: &Statement) -> String {
    format!(
        "kardex_{}_{}_{}",
        file_part(statement.customer_id.as_str()),
        file_part(&statement.name),
        statement.generated_at.format(FILE_DATE_FORMAT)
    )
}

pub fn ledger_dir_name(date: NaiveDate) -> String {
    format!("reporte_viaje_{}", date.format(FILE_DATE_FORMAT))
}

/// Writes the statement into `dir`: `<stem>.txt` for the document and a
/// `<stem>/` directory for the workbook.
pub fn export_statement(
    statement: &Statement,
    format: StatementFormat,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let stem = statement_file_stem(statement);
    let mut written = Vec::new();

    if matches!(format, StatementFormat::Document | StatementFormat::Both) {
        let path = dir.join(format!("{}.txt", stem));
        write_atomically(&path, render_statement(statement).as_bytes())?;
        written.push(path);
    }
    if matches!(format, StatementFormat::Workbook | StatementFormat::Both) {
        let book_dir = dir.join(&stem);
        write_workbook(&Workbook::from(statement), &book_dir)?;
        written.push(book_dir);
    }

    info!(customer = %statement.customer_id, files = written.len(), "Statement exported");
    Ok(written)
}

/// Writes the full ledger workbook into `dir/reporte_viaje_<date>/`.
pub fn export_ledger(ledger: &LedgerExport, date: NaiveDate, dir: &Path) -> Result<PathBuf> {
    let book_dir = dir.join(ledger_dir_name(date));
    let files = write_workbook(&Workbook::from(ledger), &book_dir)?;
    info!(
        path = %book_dir.display(),
        sheets = files.len(),
        customers = ledger.customers.len(),
        "Ledger exported"
    );
    Ok(book_dir)
}
