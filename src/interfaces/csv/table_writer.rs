use crate::error::Result;
use crate::interfaces::sheet::Sheet;
use std::io::Write;

/// Writes tables as CSV to any `Write` sink (stdout, a file).
///
/// Each table gets its own `csv::Writer` with flexible record lengths over
/// the borrowed sink, so plain lines can go between tables.
pub struct TableWriter<W: Write> {
    sink: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Header row followed by every data row.
    pub fn write_sheet(&mut self, sheet: &Sheet) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(&mut self.sink);
        writer.write_record(&sheet.header)?;
        for row in &sheet.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Several tables one after another, separated by an empty line.
    pub fn write_sheets<'a, I>(&mut self, sheets: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Sheet>,
    {
        for (i, sheet) in sheets.into_iter().enumerate() {
            if i > 0 {
                self.sink.write_all(b"\n")?;
            }
            self.write_sheet(sheet)?;
        }
        Ok(())
    }

    /// The underlying sink, for plain lines between tables.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
        let mut sheet = Sheet::new(name, &["Concepto", "Monto"]);
        for row in rows {
            sheet.push(row.iter().copied());
        }
        sheet
    }

    #[test]
    fn test_writes_header_and_rows() {
        let mut writer = TableWriter::new(Vec::new());
        writer
            .write_sheet(&sheet("Resumen", &[&["Total", "$1,600.00"]]))
            .unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, "Concepto,Monto\nTotal,\"$1,600.00\"\n");
    }

    #[test]
    fn test_separates_consecutive_tables() {
        let a = sheet("A", &[&["x", "1"]]);
        let b = sheet("B", &[]);
        let mut writer = TableWriter::new(Vec::new());
        writer.write_sheets([&a, &b]).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, "Concepto,Monto\nx,1\n\nConcepto,Monto\n");
    }

    #[test]
    fn test_plain_lines_between_tables() {
        let mut writer = TableWriter::new(Vec::new());
        writer
            .write_sheet(&sheet("Resumen", &[&["Total", "10"]]))
            .unwrap();
        writeln!(writer.get_mut(), "reporte_viaje_01-02-2026").unwrap();
        writer.write_sheet(&sheet("Resumen", &[])).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            output,
            "Concepto,Monto\nTotal,10\nreporte_viaje_01-02-2026\nConcepto,Monto\n"
        );
    }
}
