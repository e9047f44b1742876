use crate::context::ApplicationContext;
use axum::Router;
use tower_http::cors::CorsLayer;

pub mod rest_api;

pub async fn run_server(application_context: ApplicationContext) -> std::io::Result<()> {
	let address = application_context.configuration.address;
	let router = create_router(application_context);

	axum_server::bind(address).serve(router.into_make_service()).await
}

pub fn create_router(application_context: ApplicationContext) -> Router {
	Router::new()
		.nest("/api", rest_api::rest_api())
		.layer(CorsLayer::permissive())
		.with_state(application_context)
}
