//! Workbook renderer: one worksheet per section, general statistics first.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::ReportError;
use crate::sections::{Cell, ReportBundle, ReportRow, SectionInfo, SectionSink};

struct WorkbookSink {
    workbook: Workbook,
    header: Format,
    decimal: Format,
}

impl SectionSink for WorkbookSink {
    type Error = XlsxError;

    fn section<R, const N: usize>(
        &mut self,
        info: &SectionInfo,
        rows: &[R],
    ) -> Result<(), Self::Error>
    where
        R: ReportRow<N>,
    {
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(info.sheet)?;

        for (col, title) in R::COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &self.header)?;
        }
        sheet.set_freeze_panes(1, 0)?;

        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            for (col, cell) in row.cells().iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(text) => {
                        sheet.write_string(r, col, text)?;
                    }
                    Cell::Integer(n) => {
                        sheet.write_number(r, col, *n as f64)?;
                    }
                    Cell::Rating(Some(avg)) => {
                        sheet.write_number_with_format(r, col, *avg, &self.decimal)?;
                    }
                    Cell::Rating(None) => {
                        sheet.write_string(r, col, cell.display())?;
                    }
                }
            }
        }

        sheet.autofit();
        Ok(())
    }
}

pub(super) fn render(bundle: &ReportBundle) -> Result<Vec<u8>, ReportError> {
    let mut sink = WorkbookSink {
        workbook: Workbook::new(),
        header: Format::new().set_bold(),
        decimal: Format::new().set_num_format("0.00"),
    };

    bundle.write_sections(&mut sink)?;
    Ok(sink.workbook.save_to_buffer()?)
}
