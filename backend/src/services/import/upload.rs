use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{Datelike, Local};
use common::model::order::ImportReport;
use futures_util::StreamExt;
use log::{error, info};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::workbook::{self, ImportError};
use super::reconcile;
use crate::db::OrderStore;
use crate::sessions::require_auth;
use crate::state::AppState;

/// HTTP handler for the workbook import.
///
/// Spools the uploaded file to disk, then runs the whole batch on a blocking
/// thread so the executor is never held up by file and database I/O. The
/// response is either the three batch counters or, for structural workbook
/// problems, a 400 before any row was touched.
pub(crate) async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    if let Err(resp) = require_auth(&req, state.sessions.as_ref()) {
        return resp;
    }

    let spooled = match spool_workbook(payload).await {
        Ok(file) => file,
        Err(e) => return HttpResponse::BadRequest().body(format!("Error: {}", e)),
    };

    let db_path = state.config.database_path.clone();
    let handle =
        tokio::task::spawn_blocking(move || run_import(&db_path, spooled.path()));

    match handle.await {
        Ok(Ok(report)) => {
            info!(
                "import finished: {} inserted, {} updated, {} skipped",
                report.inserted, report.updated, report.skipped
            );
            HttpResponse::Ok().json(report)
        }
        Ok(Err(e)) if e.is_client_error() => {
            HttpResponse::BadRequest().body(format!("Error: {}", e))
        }
        Ok(Err(e)) => {
            error!("import aborted: {}", e);
            HttpResponse::InternalServerError().body("Error saving imported orders")
        }
        Err(e) => {
            error!("import task join error: {}", e);
            HttpResponse::InternalServerError().body("Import task failed")
        }
    }
}

/// Streams the multipart `file` field into a temp file the workbook reader
/// can open. The temp file disappears when the import is done with it.
async fn spool_workbook(
    mut payload: Multipart,
) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !(filename.ends_with(".xlsx") || filename.ends_with(".xls")) {
            return Err("The file must end with .xlsx or .xls".into());
        }

        let mut file = NamedTempFile::new()?;
        while let Some(chunk) = field.next().await {
            file.write_all(&chunk?)?;
        }
        file.flush()?;
        return Ok(file);
    }
    Err("Missing file upload".into())
}

/// The synchronous batch: read rows, then reconcile them sequentially.
fn run_import(db_path: &Path, workbook_path: &Path) -> Result<ImportReport, ImportError> {
    let rows = workbook::load_data_rows(workbook_path, Local::now().year())?;
    let store = OrderStore::open(db_path)?;
    Ok(reconcile::reconcile_batch(&store, &rows))
}
