//! Lifecycle integration tests against an in-memory database: audit
//! history, terminal snapshots, transfers and version conflicts.

mod common;

use shared::models::{
    FaultStatus, FaultTransfer, FaultUpdate, HistoryKind, Role, Severity,
};
use shared::util::now_millis;

use noc_server::db::repository::{RepoError, customer, fault, fault_history};
use noc_server::faults::{enrich_all, transfer_fault, update_fault};

use common::{backdate_fault, seed_customer, seed_department, seed_fault, seed_user, test_pool};

const HOUR_MS: i64 = 3_600_000;

#[tokio::test]
async fn status_change_appends_exactly_one_history_row() {
    let pool = test_pool().await;
    let dept = seed_department(&pool, "NOC").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(dept)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, dept).await;

    let updated = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            status: Some(FaultStatus::InProgress),
            note: Some("picked up".into()),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.status, FaultStatus::InProgress);
    assert_eq!(updated.version, 1);

    let history = fault_history::find_by_fault(&pool, fid).await.unwrap();
    assert_eq!(history.len(), 1);
    let event = &history[0].event;
    assert_eq!(event.kind, HistoryKind::StatusChanged);
    assert_eq!(event.previous_status, Some(FaultStatus::Open));
    assert_eq!(event.new_status, Some(FaultStatus::InProgress));
    assert_eq!(event.changed_by, actor);
    assert_eq!(event.note.as_deref(), Some("picked up"));
    assert_eq!(history[0].changed_by_username.as_deref(), Some("operator"));
}

#[tokio::test]
async fn update_without_status_change_writes_no_history() {
    let pool = test_pool().await;
    let dept = seed_department(&pool, "NOC").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(dept)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, dept).await;

    let updated = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            description: Some("Link down, fiber cut suspected".into()),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.description, "Link down, fiber cut suspected");
    assert_eq!(updated.status, FaultStatus::Open);
    assert_eq!(updated.version, 1);

    assert_eq!(fault_history::count_by_fault(&pool, fid).await.unwrap(), 0);
}

#[tokio::test]
async fn resolving_freezes_snapshot_once() {
    let pool = test_pool().await;
    let dept = seed_department(&pool, "NOC").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(dept)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, dept).await;

    // Fault has been open for ~15 hours.
    backdate_fault(&pool, fid, now_millis() - 15 * HOUR_MS).await;

    let resolved = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            status: Some(FaultStatus::Resolved),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();

    let resolved_at = resolved.resolved_at.expect("resolved_at set");
    assert_eq!(resolved.resolved_by, Some(actor));
    let frozen_hours = resolved.pending_hours.expect("snapshot set");
    assert!((frozen_hours - 15.0).abs() < 0.2, "got {frozen_hours}");
    assert_eq!(resolved.severity, Severity::High);

    // Reopen and resolve again; the original snapshot must survive.
    let reopened = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            status: Some(FaultStatus::Open),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(reopened.resolved_at, Some(resolved_at));

    let re_resolved = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            status: Some(FaultStatus::Resolved),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(re_resolved.resolved_at, Some(resolved_at));
    assert_eq!(re_resolved.pending_hours, Some(frozen_hours));

    assert_eq!(fault_history::count_by_fault(&pool, fid).await.unwrap(), 3);
}

#[tokio::test]
async fn closing_stamps_closed_fields() {
    let pool = test_pool().await;
    let dept = seed_department(&pool, "NOC").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(dept)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, dept).await;

    let closed = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            status: Some(FaultStatus::Closed),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();

    assert!(closed.closed_at.is_some());
    assert_eq!(closed.closed_by, Some(actor));
    assert!(closed.resolved_at.is_none());
    // Closed within the first hour of its life.
    assert_eq!(closed.severity, Severity::Low);
}

#[tokio::test]
async fn transfer_reassigns_and_audits() {
    let pool = test_pool().await;
    let noc = seed_department(&pool, "NOC").await;
    let field = seed_department(&pool, "Field Ops").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(noc)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, noc).await;

    let transferred = transfer_fault(
        &pool,
        fid,
        actor,
        FaultTransfer {
            department_id: field,
            note: Some("needs a site visit".into()),
            expected_version: Some(0),
        },
    )
    .await
    .unwrap();
    assert_eq!(transferred.assigned_to_id, Some(field));
    assert_eq!(transferred.version, 1);

    let history = fault_history::find_by_fault(&pool, fid).await.unwrap();
    assert_eq!(history.len(), 1);
    let event = &history[0].event;
    assert_eq!(event.kind, HistoryKind::Transferred);
    assert_eq!(event.from_department_id, Some(noc));
    assert_eq!(event.to_department_id, Some(field));
    assert_eq!(history[0].from_department_name.as_deref(), Some("NOC"));
    assert_eq!(history[0].to_department_name.as_deref(), Some("Field Ops"));
}

#[tokio::test]
async fn transfer_to_missing_department_changes_nothing() {
    let pool = test_pool().await;
    let noc = seed_department(&pool, "NOC").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(noc)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, noc).await;

    let err = transfer_fault(
        &pool,
        fid,
        actor,
        FaultTransfer {
            department_id: 9999,
            note: None,
            expected_version: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let stored = fault::find_by_id(&pool, fid).await.unwrap().unwrap();
    assert_eq!(stored.assigned_to_id, Some(noc));
    assert_eq!(stored.version, 0);
    assert_eq!(fault_history::count_by_fault(&pool, fid).await.unwrap(), 0);
}

#[tokio::test]
async fn stale_version_is_rejected_without_side_effects() {
    let pool = test_pool().await;
    let dept = seed_department(&pool, "NOC").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(dept)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, dept).await;

    // First writer wins.
    update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            status: Some(FaultStatus::InProgress),
            expected_version: Some(0),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();

    // Second writer still holds version 0.
    let err = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            status: Some(FaultStatus::Closed),
            expected_version: Some(0),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let stored = fault::find_by_id(&pool, fid).await.unwrap().unwrap();
    assert_eq!(stored.status, FaultStatus::InProgress);
    assert_eq!(stored.version, 1);
    assert_eq!(fault_history::count_by_fault(&pool, fid).await.unwrap(), 1);
}

#[tokio::test]
async fn reassignment_via_update_is_audited_as_transfer() {
    let pool = test_pool().await;
    let noc = seed_department(&pool, "NOC").await;
    let field = seed_department(&pool, "Field Ops").await;
    let actor = seed_user(&pool, "operator", "pw-operator-1", Role::User, Some(noc)).await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, noc).await;

    let updated = update_fault(
        &pool,
        fid,
        actor,
        FaultUpdate {
            assigned_to_id: Some(field),
            ..FaultUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.assigned_to_id, Some(field));

    let history = fault_history::find_by_fault(&pool, fid).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event.kind, HistoryKind::Transferred);
}

#[tokio::test]
async fn search_expands_to_customer_matches() {
    let pool = test_pool().await;
    let dept = seed_department(&pool, "NOC").await;
    let acme = seed_customer(&pool, "Acme Telecom").await;
    let other = seed_customer(&pool, "Borealis").await;
    let matching = seed_fault(&pool, "Port flapping", acme, dept).await;
    seed_fault(&pool, "Port flapping", other, dept).await;

    // "Acme" appears in neither fault's own text, only in the customer.
    let ids = customer::find_ids_matching(&pool, "Acme").await.unwrap();
    assert_eq!(ids, vec![acme]);

    let filter = fault::FaultListFilter {
        search: Some("Acme".into()),
        search_customer_ids: ids,
        ..fault::FaultListFilter::default()
    };
    let mut rows = fault::find_with_refs(&pool, &filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fault.id, matching);

    enrich_all(&mut rows, now_millis());
    assert_eq!(rows[0].fault.severity, Severity::Low);
    assert!(rows[0].fault.pending_hours.unwrap_or(0.0) < 0.2);
}

#[tokio::test]
async fn enrichment_derives_live_severity_for_active_faults() {
    let pool = test_pool().await;
    let dept = seed_department(&pool, "NOC").await;
    let cust = seed_customer(&pool, "Acme").await;
    let fid = seed_fault(&pool, "Link down", cust, dept).await;
    backdate_fault(&pool, fid, now_millis() - 30 * HOUR_MS).await;

    let filter = fault::FaultListFilter::default();
    let mut rows = fault::find_with_refs(&pool, &filter).await.unwrap();
    assert_eq!(rows.len(), 1);

    // Stored severity is the stale creation-time value.
    assert_eq!(rows[0].fault.severity, Severity::Low);
    enrich_all(&mut rows, now_millis());
    assert_eq!(rows[0].fault.severity, Severity::Critical);
    let hours = rows[0].fault.pending_hours.unwrap();
    assert!((hours - 30.0).abs() < 0.2, "got {hours}");
}
