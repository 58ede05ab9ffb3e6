//! Fault export rendering (xlsx and PDF)
//!
//! Pure projections of the filtered fault list; all business logic runs
//! in the shared fetch path. Ticket number falls back to the internal id
//! when unset.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::{TimeZone, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::Workbook;
use shared::models::FaultWithRefs;

use super::handler::{FaultListQuery, fetch_filtered};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn ticket_label(f: &FaultWithRefs) -> String {
    f.fault
        .ticket_number
        .clone()
        .unwrap_or_else(|| f.fault.id.to_string())
}

fn format_millis(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// GET /api/faults/export - spreadsheet download
pub async fn export_xlsx(
    State(state): State<ServerState>,
    Query(query): Query<FaultListQuery>,
) -> AppResult<impl IntoResponse> {
    let faults = fetch_filtered(&state, &query).await?;
    let bytes = render_xlsx(&faults)?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"faults_export.xlsx\"",
            ),
        ],
        bytes,
    ))
}

/// POST /api/faults/export/pdf - paginated print download
pub async fn export_pdf(
    State(state): State<ServerState>,
    Json(query): Json<FaultListQuery>,
) -> AppResult<impl IntoResponse> {
    let faults = fetch_filtered(&state, &query).await?;
    let bytes = render_pdf(&faults)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"fault_report.pdf\"",
            ),
        ],
        bytes,
    ))
}

const XLSX_HEADERS: [&str; 12] = [
    "Ticket",
    "Description",
    "Type",
    "Location",
    "Owner",
    "Status",
    "Severity",
    "Pending Hours",
    "Department",
    "Customer",
    "Circuit ID",
    "Logged At",
];

fn render_xlsx(faults: &[FaultWithRefs]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let xlsx_err = |e: rust_xlsxwriter::XlsxError| {
        AppError::internal(format!("Spreadsheet rendering failed: {e}"))
    };

    for (col, title) in XLSX_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *title)
            .map_err(xlsx_err)?;
    }

    for (i, f) in faults.iter().enumerate() {
        let row = (i + 1) as u32;
        let text_cells = [
            ticket_label(f),
            f.fault.description.clone(),
            f.fault.fault_type.clone().unwrap_or_default(),
            f.fault.location.clone().unwrap_or_default(),
            f.fault.owner.clone().unwrap_or_default(),
            f.fault.status.to_string(),
            f.fault.severity.to_string(),
        ];
        for (col, value) in text_cells.iter().enumerate() {
            worksheet
                .write_string(row, col as u16, value)
                .map_err(xlsx_err)?;
        }
        worksheet
            .write_number(row, 7, f.fault.pending_hours.unwrap_or(0.0))
            .map_err(xlsx_err)?;
        worksheet
            .write_string(
                row,
                8,
                f.department_name.clone().unwrap_or_else(|| "Unassigned".into()),
            )
            .map_err(xlsx_err)?;
        worksheet
            .write_string(row, 9, f.customer_company.clone().unwrap_or_default())
            .map_err(xlsx_err)?;
        worksheet
            .write_string(row, 10, f.customer_circuit_id.clone().unwrap_or_default())
            .map_err(xlsx_err)?;
        worksheet
            .write_string(row, 11, format_millis(f.fault.created_at))
            .map_err(xlsx_err)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::internal(format!("Spreadsheet save failed: {e}")))
}

// A4 portrait with ~40 table rows per page
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const ROWS_PER_PAGE: usize = 40;
const ROW_STEP_MM: f32 = 6.0;
const TOP_MM: f32 = 277.0;

fn render_pdf(faults: &[FaultWithRefs]) -> Result<Vec<u8>, AppError> {
    let pdf_err = |e: printpdf::Error| AppError::internal(format!("PDF rendering failed: {e}"));

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Fault Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    // column x positions: ticket, company, status, severity, created
    let columns: [f32; 5] = [15.0, 55.0, 115.0, 145.0, 172.0];
    let headers: [&str; 5] = ["Ticket", "Customer", "Status", "Severity", "Created"];

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = TOP_MM;

    layer.use_text("Fault Report", 16.0, Mm(15.0), Mm(y + 8.0), &bold);
    for (x, title) in columns.iter().zip(headers) {
        layer.use_text(title, 10.0, Mm(*x), Mm(y), &bold);
    }
    y -= ROW_STEP_MM;

    for (i, f) in faults.iter().enumerate() {
        if i > 0 && i % ROWS_PER_PAGE == 0 {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = TOP_MM;
            for (x, title) in columns.iter().zip(headers) {
                layer.use_text(title, 10.0, Mm(*x), Mm(y), &bold);
            }
            y -= ROW_STEP_MM;
        }

        let cells = [
            truncate(&ticket_label(f), 18),
            truncate(&f.customer_company.clone().unwrap_or_default(), 28),
            f.fault.status.to_string(),
            f.fault.severity.to_string(),
            format_millis(f.fault.created_at),
        ];
        for (x, value) in columns.iter().zip(&cells) {
            layer.use_text(value, 9.0, Mm(*x), Mm(y), &font);
        }
        y -= ROW_STEP_MM;
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::internal(format!("PDF save failed: {e}")))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
