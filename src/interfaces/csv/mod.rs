pub mod table_writer;
pub mod workbook_writer;
