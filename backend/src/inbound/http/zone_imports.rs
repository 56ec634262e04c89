//! Admin endpoints for launching and polling zone imports.

use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, ImportJobStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Body returned when an import is admitted.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportAcceptedBody {
    pub status: ImportJobStatus,
    /// Relative URL to poll for progress.
    #[schema(example = "/api/v1/admin/zones/3f0e.../import")]
    pub status_url: String,
}

fn status_url(zone_id: Uuid) -> String {
    format!("/api/v1/admin/zones/{zone_id}/import")
}

/// Start a background import for a zone.
#[utoipa::path(
    post,
    path = "/api/v1/admin/zones/{zone_id}/import",
    params(("zone_id" = Uuid, Path, description = "Zone to import")),
    responses(
        (status = 202, description = "Import admitted", body = ImportAcceptedBody),
        (status = 404, description = "Unknown zone", body = Error),
        (status = 409, description = "Import already running; details carry its status", body = Error),
        (status = 503, description = "Zone storage unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "startZoneImport"
)]
#[post("/admin/zones/{zone_id}/import")]
pub async fn start_zone_import(
    state: web::Data<HttpState>,
    zone_id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let zone_id = zone_id.into_inner();
    let status = state.zone_imports.start_import(zone_id).await?;
    Ok(HttpResponse::Accepted().json(ImportAcceptedBody {
        status,
        status_url: status_url(zone_id),
    }))
}

/// Latest status of a zone's import.
#[utoipa::path(
    get,
    path = "/api/v1/admin/zones/{zone_id}/import",
    params(("zone_id" = Uuid, Path, description = "Zone whose import to inspect")),
    responses(
        (status = 200, description = "Current import status", body = ImportJobStatus),
        (status = 404, description = "No import has run for this zone", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getZoneImportStatus"
)]
#[get("/admin/zones/{zone_id}/import")]
pub async fn get_zone_import_status(
    state: web::Data<HttpState>,
    zone_id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let status = state.zone_imports.import_status(zone_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ImportState;
    use crate::domain::ports::{FixtureAudioScriptCommand, MockZoneImportCommand};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn zone_id() -> Uuid {
        Uuid::from_u128(0x5a0e)
    }

    fn pending() -> ImportJobStatus {
        let started = Utc
            .with_ymd_and_hms(2026, 4, 2, 8, 30, 0)
            .single()
            .expect("valid timestamp");
        ImportJobStatus::pending(zone_id(), started)
    }

    async fn call(
        command: MockZoneImportCommand,
        request: test::TestRequest,
    ) -> (StatusCode, Value) {
        let state = HttpState::new(Arc::new(command), Arc::new(FixtureAudioScriptCommand));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/api/v1")
                    .service(start_zone_import)
                    .service(get_zone_import_status),
            ),
        )
        .await;
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }

    #[rstest]
    #[actix_web::test]
    async fn admitted_imports_return_202_with_poll_url() {
        let mut command = MockZoneImportCommand::new();
        command
            .expect_start_import()
            .withf(|id| *id == zone_id())
            .times(1)
            .return_once(|_| Ok(pending()));

        let uri = format!("/api/v1/admin/zones/{}/import", zone_id());
        let (status, body) = call(command, test::TestRequest::post().uri(&uri)).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"]["state"], "pending");
        assert_eq!(body["statusUrl"], uri);
    }

    #[rstest]
    #[actix_web::test]
    async fn running_imports_return_409_with_status_details() {
        let mut running = pending();
        running.state = ImportState::Enriching;
        running.advance_progress(40);
        let details = serde_json::to_value(&running).expect("status serializes");

        let mut command = MockZoneImportCommand::new();
        command.expect_start_import().return_once(move |_| {
            Err(Error::conflict("an import is already running").with_details(details))
        });

        let uri = format!("/api/v1/admin/zones/{}/import", zone_id());
        let (status, body) = call(command, test::TestRequest::post().uri(&uri)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
        assert_eq!(body["details"]["state"], "enriching");
        assert_eq!(body["details"]["progress"], 40);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_zones_return_404() {
        let mut command = MockZoneImportCommand::new();
        command
            .expect_start_import()
            .return_once(|id| Err(Error::not_found(format!("zone {id} not found"))));

        let uri = format!("/api/v1/admin/zones/{}/import", zone_id());
        let (status, body) = call(command, test::TestRequest::post().uri(&uri)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[rstest]
    #[actix_web::test]
    async fn status_endpoint_returns_latest_status() {
        let mut completed = pending();
        completed.complete(3, 1, completed.started_at);

        let mut command = MockZoneImportCommand::new();
        command
            .expect_import_status()
            .return_once(move |_| Ok(completed));

        let uri = format!("/api/v1/admin/zones/{}/import", zone_id());
        let (status, body) = call(command, test::TestRequest::get().uri(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "completed");
        assert_eq!(body["created"], 3);
        assert_eq!(body["updated"], 1);
        assert_eq!(body["zoneId"], json!(zone_id()));
    }

    #[rstest]
    #[actix_web::test]
    async fn status_for_never_imported_zone_is_404() {
        let mut command = MockZoneImportCommand::new();
        command
            .expect_import_status()
            .return_once(|_| Err(Error::not_found("no import")));

        let uri = format!("/api/v1/admin/zones/{}/import", zone_id());
        let (status, _) = call(command, test::TestRequest::get().uri(&uri)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
