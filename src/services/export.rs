use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, Workbook};

use crate::models::{Booking, Service, ServiceLookup};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXPORT_FILE_NAME: &str = "bookings.xlsx";

const SHEET_NAME: &str = "Bookings";
const HEADER_FILL: u32 = 0xFFB3D1;

const COLUMNS: [(&str, f64); 8] = [
    ("ID", 15.0),
    ("Booking date", 15.0),
    ("Time", 10.0),
    ("Name", 20.0),
    ("Phone", 15.0),
    ("Service", 30.0),
    ("Comment", 40.0),
    ("Created at", 20.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub id: String,
    pub date: String,
    pub time: String,
    pub name: String,
    pub phone: String,
    pub service: String,
    pub comment: String,
    pub created_at: String,
}

impl ExportRow {
    fn cells(&self) -> [&str; 8] {
        [
            &self.id,
            &self.date,
            &self.time,
            &self.name,
            &self.phone,
            &self.service,
            &self.comment,
            &self.created_at,
        ]
    }
}

/// One row per booking, in collection order, with service names joined in.
pub fn export_rows(bookings: &[Booking], services: &[Service]) -> Vec<ExportRow> {
    bookings
        .iter()
        .map(|b| ExportRow {
            id: b.id.clone(),
            date: b.date.clone(),
            time: b.time.clone(),
            name: b.name.clone(),
            phone: b.phone.clone(),
            service: ServiceLookup::resolve(services, &b.service_id)
                .display_name()
                .to_string(),
            comment: b.comment.clone().unwrap_or_default(),
            created_at: format_created_at(&b.created_at),
        })
        .collect()
}

fn format_created_at(ts: &DateTime<Utc>) -> String {
    ts.format("%d.%m.%Y, %H:%M:%S").to_string()
}

pub fn build_workbook(bookings: &[Booking], services: &[Service]) -> anyhow::Result<Vec<u8>> {
    let rows = export_rows(bookings, services);

    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(0, col, *title, &header)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, value) in row.cells().iter().enumerate() {
            worksheet.write_string(row_num, col as u16, *value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
