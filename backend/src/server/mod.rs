//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use backend::doc::ApiDoc;
use backend::inbound::http::audio_scripts::generate_audio_script;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::zone_imports::{get_zone_import_status, start_zone_import};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    swagger_ui: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        swagger_ui,
    } = deps;

    let api = web::scope("/api/v1")
        .service(start_zone_import)
        .service(get_zone_import_status)
        .service(generate_audio_script);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live)
        .configure(|cfg| {
            if swagger_ui {
                cfg.service(
                    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()),
                );
            }
        })
}

/// Bind and start the Actix server, then mark it ready.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        http_state,
        swagger_ui,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        swagger_ui,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    fn deps(swagger_ui: bool) -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: web::Data::new(HttpState::default()),
            swagger_ui,
        }
    }

    #[rstest]
    #[case(test::TestRequest::get().uri("/health/ready"), StatusCode::OK)]
    #[case(test::TestRequest::get().uri("/health/live"), StatusCode::OK)]
    #[case(
        test::TestRequest::post().uri("/api/v1/admin/zones/00000000-0000-0000-0000-000000000001/import"),
        StatusCode::NOT_FOUND
    )]
    #[case(
        test::TestRequest::post().uri("/api/v1/admin/pois/00000000-0000-0000-0000-000000000001/audio-script"),
        StatusCode::SERVICE_UNAVAILABLE
    )]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] request: test::TestRequest, #[case] expected: StatusCode) {
        let app = test::init_service(build_app(deps(false))).await;
        let response = test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn openapi_document_is_served_when_enabled() {
        let app = test::init_service(build_app(deps(true))).await;
        let request = test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
