use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use fitrec::services::detection::{self, BodyShape};
use fitrec::services::season::merge_palette;
use fitrec::utils::validation::optional_label;
use fitrec::{
    init_tracing, AppState, BodyMeasurements, Config, PaletteAnalysis, RecommendError,
    RecommendationRequest, RecommendationResult, SavedRecommendation, SeasonDescriptors,
    SeasonRecommendation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
        }
    }
}

#[derive(Debug)]
struct ApiError(RecommendError);

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
struct SeasonQuery {
    season: Option<String>,
}

#[derive(Debug, Serialize)]
struct BodyShapeResponse {
    body_shape: BodyShape,
}

#[derive(Debug, Serialize)]
struct DetectedSeasonResponse {
    season: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    complementary_colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color_combinations: Option<Vec<String>>,
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "fitrec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn list_body_shapes(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.clothing.get_body_shapes().to_vec()))
}

async fn list_occasions(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.clothing.get_occasions().to_vec()))
}

async fn list_categories(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.clothing.get_clothing_categories().to_vec()))
}

async fn list_seasons(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.seasons.get_seasons().to_vec()))
}

async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Json<RecommendationResult> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected recommendation request: {}", rejection);
            return Json(RecommendationResult::failure("Invalid JSON format"));
        }
    };
    let Some(body_shape) = optional_label(request.body_shape.as_deref()) else {
        return Json(RecommendationResult::failure("Body shape is required"));
    };
    let occasion = optional_label(request.occasion.as_deref());

    let mut result = state.clothing.recommend(&body_shape, occasion.as_deref());
    if !result.success {
        return Json(result);
    }

    if let Some(season) = optional_label(request.season.as_deref()) {
        match state.seasons.get_season_recommendations(&season) {
            Ok(palette) => {
                let settings = &state.config.recommendation;
                merge_palette(
                    &mut result.recommendations,
                    &palette,
                    settings.merged_colors,
                    settings.merged_combinations,
                );
            }
            Err(e) => warn!("Skipping colour palette: {}", e),
        }
    }

    if let Some(user_id) = request.user_id {
        let record = SavedRecommendation::new(
            user_id,
            body_shape,
            result.occasion.clone(),
            result.recommendations.clone(),
        );
        if let Err(e) = state.history.save(record).await {
            error!("Failed to save recommendation for {}: {}", user_id, e);
        }
    }

    Json(result)
}

async fn season_recommendations(
    State(state): State<AppState>,
    Json(query): Json<SeasonQuery>,
) -> ApiResult<SeasonRecommendation> {
    let season = optional_label(query.season.as_deref())
        .ok_or_else(|| RecommendError::InvalidInput("Season parameter is required".to_string()))?;

    Ok(Json(state.seasons.get_season_recommendations(&season)?))
}

async fn detect_body_shape(Json(measurements): Json<BodyMeasurements>) -> ApiResult<BodyShapeResponse> {
    let body_shape = detection::detect_body_shape(&measurements)?;
    Ok(Json(BodyShapeResponse { body_shape }))
}

async fn detect_season(
    State(state): State<AppState>,
    Json(descriptors): Json<SeasonDescriptors>,
) -> ApiResult<DetectedSeasonResponse> {
    let Some(season) = detection::detect_season(&descriptors)? else {
        return Ok(Json(DetectedSeasonResponse {
            season: "Unknown".to_string(),
            complementary_colors: None,
            color_combinations: None,
        }));
    };

    let response = match state.seasons.get_season_recommendations(season) {
        Ok(palette) => DetectedSeasonResponse {
            season: palette.season,
            complementary_colors: Some(palette.complementary_colors),
            color_combinations: Some(palette.color_combinations),
        },
        Err(e) => {
            warn!("No palette for detected season {}: {}", season, e);
            DetectedSeasonResponse {
                season: season.to_string(),
                complementary_colors: None,
                color_combinations: None,
            }
        }
    };
    Ok(Json(response))
}

async fn analyze(
    State(state): State<AppState>,
    Json(descriptors): Json<SeasonDescriptors>,
) -> ApiResult<PaletteAnalysis> {
    let analysis = state.seasons.analyze(
        &descriptors.eye_color,
        &descriptors.hair_color,
        &descriptors.skin_tone,
    )?;
    Ok(Json(analysis))
}

async fn user_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SavedRecommendation>>>, StatusCode> {
    match state.history.list(user_id).await {
        Ok(history) => Ok(Json(ApiResponse::success(history))),
        Err(e) => {
            error!("Failed to load history for {}: {}", user_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/body-shapes", get(list_body_shapes))
        .route("/occasions", get(list_occasions))
        .route("/categories", get(list_categories))
        .route("/seasons", get(list_seasons))
        .route("/recommend", post(recommend))
        .route("/season-recommendations", post(season_recommendations))
        .route("/detect-body-shape", post(detect_body_shape))
        .route("/detect-season", post(detect_season))
        .route("/analyze", post(analyze))
        .route("/users/:user_id/recommendations", get(user_history))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.server.socket_addr()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &args.log_level);
    }
    init_tracing();

    let config = Config::load_or_default(&args.config)?;
    info!("Starting FitRec server with config: {:?}", config.server);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    // Training is CPU-bound and finishes before the listener opens.
    let state = AppState::new(config)?;
    runtime.block_on(serve(state))
}
