mod assets;
mod graphql;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use graphql::Schema;

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Static file router with a fixed `Cache-Control` policy.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>South Texas Population Map</title></head>
<body>
<h1>South Texas Population Map</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#;

fn build_app(schema: Schema, assets_dir: &Path, dist_dir: &Path) -> Router {
    let static_files = Router::new()
        .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
        .nest("/dist", cached_static_router(dist_dir, CACHE_IMMUTABLE))
        .nest(
            "/assets",
            cached_static_router(&dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let index_path = dist_dir.join("index.html");
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(move || serve_index(index_path.clone())))
        .with_state(schema)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

async fn serve_index(index_path: PathBuf) -> Html<String> {
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::debug!(path = %index_path.display(), error = %e, "Serving fallback index");
            Html(FALLBACK_INDEX.to_string())
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let assets_dir = PathBuf::from(env_or("ASSETS_DIR", "assets"));
    let dist_dir = PathBuf::from(env_or("DIST_DIR", "dist"));
    let loaded_assets = assets::Assets::load(&assets_dir)
        .map_err(anyhow::Error::msg)
        .context("Failed to load map assets")?;

    let schema = graphql::build_schema(Arc::new(loaded_assets));
    let app = build_app(schema, &assets_dir, &dist_dir);

    let port = env_or("PORT", "3000");
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server running at http://localhost:{}", port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
