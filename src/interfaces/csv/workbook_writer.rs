use super::table_writer::TableWriter;
use crate::error::Result;
use crate::interfaces::sheet::Workbook;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes a workbook as a directory holding one `<sheet>.csv` per sheet.
///
/// Existing files with the same names are replaced. Returns the written
/// paths in sheet order.
pub fn write_workbook(workbook: &Workbook, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        let path = dir.join(format!("{}.csv", sheet.name));
        let mut writer = TableWriter::new(File::create(&path)?);
        writer.write_sheet(sheet)?;
        debug!(path = %path.display(), rows = sheet.rows.len(), "Sheet written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::sheet::Sheet;
    use tempfile::tempdir;

    #[test]
    fn test_one_file_per_sheet() {
        let mut first = Sheet::new("Clientes", &["ID", "Nombre"]);
        first.push(["CLI001", "Ana"]);
        let second = Sheet::new("Resumen Financiero", &["Concepto"]);
        let workbook = Workbook {
            sheets: vec![first, second],
        };

        let dir = tempdir().unwrap();
        let out = dir.path().join("reporte");
        let paths = write_workbook(&workbook, &out).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(
            std::fs::read_to_string(out.join("Clientes.csv")).unwrap(),
            "ID,Nombre\nCLI001,Ana\n"
        );
        assert!(out.join("Resumen Financiero.csv").exists());
    }
}
