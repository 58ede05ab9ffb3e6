//! Fault API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    Fault, FaultCreate, FaultGeneralCreate, FaultHistoryEntry, FaultNote, FaultNoteCreate,
    FaultStatus, FaultTransfer, FaultUpdate, FaultWithRefs, Severity,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::fault::FaultListFilter;
use crate::db::repository::{customer, department, fault, fault_history, fault_note};
use crate::faults::report::{
    DepartmentStatusCounts, FaultCharts, FaultMetrics, SeverityCounts, TrendPoint,
};
use crate::faults::{self, classify_severity, enrich, enrich_all, live_severity, report};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Query params shared by list, metrics, charts, dashboard and exports.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FaultListQuery {
    pub status: Option<String>,
    pub department_id: Option<String>,
    pub severity: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "timeRange")]
    pub time_range: Option<String>,
    #[serde(rename = "customStart")]
    pub custom_start: Option<String>,
    #[serde(rename = "customEnd")]
    pub custom_end: Option<String>,
}

fn is_all(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

/// Compile query params into the store filter plus the post-enrichment
/// severity filter.
async fn build_filter(
    state: &ServerState,
    query: &FaultListQuery,
) -> AppResult<(FaultListFilter, Option<Severity>)> {
    let status = match query.status.as_deref() {
        Some(s) if !is_all(s) => Some(
            FaultStatus::parse(s)
                .ok_or_else(|| AppError::validation(format!("Unknown status '{s}'")))?,
        ),
        _ => None,
    };

    let severity = match query.severity.as_deref() {
        Some(s) if !is_all(s) => Some(
            Severity::parse(s)
                .ok_or_else(|| AppError::validation(format!("Unknown severity '{s}'")))?,
        ),
        _ => None,
    };

    let department_id = match query.department_id.as_deref() {
        Some(s) if !is_all(s) => Some(
            s.parse::<i64>()
                .map_err(|_| AppError::validation(format!("Invalid department id '{s}'")))?,
        ),
        _ => None,
    };

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let search_customer_ids = match &search {
        Some(term) => customer::find_ids_matching(&state.pool, term).await?,
        None => Vec::new(),
    };

    let window = faults::resolve_window(
        query.time_range.as_deref(),
        query.custom_start.as_deref(),
        query.custom_end.as_deref(),
        shared::util::now_millis(),
    );

    Ok((
        FaultListFilter {
            status,
            department_id,
            search,
            search_customer_ids,
            window,
        },
        severity,
    ))
}

/// Filtered, enriched fault set. Severity filtering happens here, after
/// enrichment, because severity is derived for active faults.
pub(super) async fn fetch_filtered(
    state: &ServerState,
    query: &FaultListQuery,
) -> AppResult<Vec<FaultWithRefs>> {
    let (filter, severity) = build_filter(state, query).await?;
    let mut faults = fault::find_with_refs(&state.pool, &filter).await?;
    enrich_all(&mut faults, shared::util::now_millis());
    if let Some(wanted) = severity {
        faults.retain(|f| f.fault.severity == wanted);
    }
    Ok(faults)
}

/// GET /api/faults - filtered, enriched list
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<FaultListQuery>,
) -> AppResult<Json<Vec<FaultWithRefs>>> {
    let faults = fetch_filtered(&state, &query).await?;
    Ok(Json(faults))
}

/// POST /api/faults - create a customer-circuit fault
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FaultCreate>,
) -> AppResult<Json<Fault>> {
    validate_required_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.ticket_number, "ticket_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.fault_type, "type", MAX_NAME_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_NAME_LEN)?;

    customer::find_by_id(&state.pool, payload.customer_id)
        .await?
        .ok_or_else(|| {
            AppError::validation(format!("Customer {} does not exist", payload.customer_id))
        })?;
    department::find_by_id(&state.pool, payload.assigned_to_id)
        .await?
        .ok_or_else(|| {
            AppError::validation(format!(
                "Department {} does not exist",
                payload.assigned_to_id
            ))
        })?;

    let severity = classify_severity(payload.pending_hours.unwrap_or(0.0));
    let mut created = fault::create(&state.pool, &payload, severity).await?;
    enrich(&mut created, shared::util::now_millis());
    Ok(Json(created))
}

/// POST /api/faults/general - create a general (non-customer) fault
pub async fn create_general(
    State(state): State<ServerState>,
    Json(payload): Json<FaultGeneralCreate>,
) -> AppResult<Json<Fault>> {
    validate_required_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.general_type, "general_type", MAX_NAME_LEN)?;
    validate_optional_text(&payload.general_reference, "general_reference", MAX_NAME_LEN)?;

    if let Some(dept) = payload.assigned_to_id {
        department::find_by_id(&state.pool, dept)
            .await?
            .ok_or_else(|| AppError::validation(format!("Department {dept} does not exist")))?;
    }

    let severity = classify_severity(0.0);
    let mut created = fault::create_general(&state.pool, &payload, severity).await?;
    enrich(&mut created, shared::util::now_millis());
    Ok(Json(created))
}

/// PUT /api/faults/{id} - field updates plus lifecycle side effects
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<FaultUpdate>,
) -> AppResult<Json<Fault>> {
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let mut updated = faults::update_fault(&state.pool, id, current_user.id, payload).await?;
    enrich(&mut updated, shared::util::now_millis());
    Ok(Json(updated))
}

/// POST /api/faults/{id}/transfer - reassign the owning department
pub async fn transfer(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<FaultTransfer>,
) -> AppResult<Json<Fault>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let mut updated = faults::transfer_fault(&state.pool, id, current_user.id, payload).await?;
    enrich(&mut updated, shared::util::now_millis());
    Ok(Json(updated))
}

/// Detail payload: the joined fault row plus its notes.
#[derive(Debug, Serialize)]
pub struct FaultDetails {
    #[serde(flatten)]
    pub fault: FaultWithRefs,
    pub notes: Vec<FaultNote>,
}

/// GET /api/faults/{id}/details
pub async fn details(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<FaultDetails>> {
    let mut found = fault::find_with_refs_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Fault {id} not found")))?;
    enrich(&mut found.fault, shared::util::now_millis());

    let notes = fault_note::find_by_fault(&state.pool, id).await?;
    Ok(Json(FaultDetails {
        fault: found,
        notes,
    }))
}

/// GET /api/faults/{id}/history - newest-first audit trail
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<FaultHistoryEntry>>> {
    fault::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Fault {id} not found")))?;

    let entries = fault_history::find_by_fault(&state.pool, id).await?;
    Ok(Json(entries))
}

/// POST /api/faults/{id}/notes - append a note, attributed to the actor
pub async fn create_note(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<FaultNoteCreate>,
) -> AppResult<Json<FaultNote>> {
    validate_required_text(&payload.content, "content", MAX_NOTE_LEN)?;

    fault::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Fault {id} not found")))?;

    let note = fault_note::create(
        &state.pool,
        id,
        &payload.content,
        current_user.id,
        current_user.department_id,
    )
    .await?;
    Ok(Json(note))
}

/// DELETE /api/faults/{id} - hard delete (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = fault::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Fault {id} not found")));
    }
    Ok(Json(true))
}

// ── Reporting ───────────────────────────────────────────────────────

/// GET /api/faults/metrics - summary counts over the filtered window
pub async fn metrics(
    State(state): State<ServerState>,
    Query(query): Query<FaultListQuery>,
) -> AppResult<Json<FaultMetrics>> {
    let faults = fetch_filtered(&state, &query).await?;
    Ok(Json(report::summarize(&faults)))
}

/// GET /api/faults/charts - breakdowns plus the 7-day creation trend
pub async fn charts(
    State(state): State<ServerState>,
    Query(query): Query<FaultListQuery>,
) -> AppResult<Json<FaultCharts>> {
    let faults = fetch_filtered(&state, &query).await?;
    Ok(Json(report::build_charts(
        &faults,
        shared::util::now_millis(),
    )))
}

/// Department-scoped endpoints serve the acting user's own department.
/// Admins have the global views; the dashboard is for department users.
fn caller_department(user: &CurrentUser) -> AppResult<i64> {
    if user.is_admin() {
        return Err(AppError::forbidden(
            "Department dashboard is scoped to department users",
        ));
    }
    user.department_id
        .ok_or_else(|| AppError::validation("User has no department assignment"))
}

/// GET /api/faults/department/dashboard - caller-department fault list
pub async fn department_dashboard(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(mut query): Query<FaultListQuery>,
) -> AppResult<Json<Vec<FaultWithRefs>>> {
    let dept = caller_department(&current_user)?;
    query.department_id = Some(dept.to_string());
    let faults = fetch_filtered(&state, &query).await?;
    Ok(Json(faults))
}

/// GET /api/faults/department/metrics - status counts, grouped in SQL
pub async fn department_metrics(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<DepartmentStatusCounts>> {
    let dept = caller_department(&current_user)?;
    let rows = fault::count_by_status(&state.pool, Some(dept)).await?;
    Ok(Json(report::department_status_counts(&rows)))
}

/// Chart payload for the department dashboard.
#[derive(Debug, Serialize)]
pub struct DepartmentCharts {
    pub severity_counts: SeverityCounts,
    pub status_counts: DepartmentStatusCounts,
    pub trend: Vec<TrendPoint>,
}

/// GET /api/faults/department/charts
///
/// Severity is computed live over the department's active faults only;
/// the trend is grouped at the store level by date-truncation.
pub async fn department_charts(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<DepartmentCharts>> {
    let dept = caller_department(&current_user)?;
    let now = shared::util::now_millis();

    let active = fault::find_active_for_department(&state.pool, dept).await?;
    let mut severity_counts = SeverityCounts::default();
    for f in &active {
        severity_counts.add(live_severity(f, now), 1);
    }

    let status_rows = fault::count_by_status(&state.pool, Some(dept)).await?;

    let week_start = faults::resolve_window(Some("week"), None, None, now)
        .map(|(start, _)| start)
        .unwrap_or(now);
    let trend_rows = fault::daily_created_counts(&state.pool, Some(dept), week_start).await?;

    Ok(Json(DepartmentCharts {
        severity_counts,
        status_counts: report::department_status_counts(&status_rows),
        trend: report::zero_fill_rows(&trend_rows, now),
    }))
}
