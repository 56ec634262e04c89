//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the admin and health endpoints plus the domain types
//! they return. Swagger UI serves it in debug builds and the `openapi-dump`
//! binary prints it for external tooling.

use utoipa::OpenApi;

use crate::domain::{
    Category, Error, ErrorCode, ImportJobStatus, ImportState, PlaybackMode, Segment, SegmentType,
};
use crate::inbound::http::audio_scripts::{AudioScriptRequestBody, AudioScriptResponseBody};
use crate::inbound::http::zone_imports::ImportAcceptedBody;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Audio-guide backend API",
        description = "Admin interface for zone imports and audio script generation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::zone_imports::start_zone_import,
        crate::inbound::http::zone_imports::get_zone_import_status,
        crate::inbound::http::audio_scripts::generate_audio_script,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        ImportJobStatus,
        ImportState,
        ImportAcceptedBody,
        Segment,
        SegmentType,
        PlaybackMode,
        Category,
        AudioScriptRequestBody,
        AudioScriptResponseBody
    )),
    tags(
        (name = "admin", description = "Zone imports and script generation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document's shape.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/admin/zones/{zone_id}/import")]
    #[case("/api/v1/admin/pois/{poi_id}/audio-script")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn documents_every_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn import_status_schema_uses_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let status = schemas.get("ImportJobStatus").expect("ImportJobStatus schema");

        assert_object_schema_has_field(status, "zoneId");
        assert_object_schema_has_field(status, "progress");
        assert_object_schema_has_field(status, "startedAt");
    }

    #[rstest]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error, "code");
        assert_object_schema_has_field(error, "message");
    }
}
