//! Web server for the diet-tracking dashboard.
//!
//! Exposes a JSON API for session, profile, records, the daily summary and
//! the AI-assisted flows, plus static file serving for the frontend.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use crate::ai::{ChatReply, ChatRole, ChatTurn, FoodScan, FoodSearchHit, NutritionAi};
use crate::domain::{
    FoodRecord, QUICK_FOODS, QuickFood, RecordInput, Session, Tab, UserProfile,
};
use crate::error::StorageError;
use crate::session::AuthProvider;
use crate::store::{RecordStore, Storage};
use crate::summary::DailySummary;

/// Quantity used when a record arrives without one.
const DEFAULT_QUANTITY: &str = "1 serving";

/// Mutable application data. All mutation happens under the state's write
/// lock, so there is a single logical writer.
pub struct AppData {
    pub profile: UserProfile,
    pub records: RecordStore,
    pub session: Session,
    pub active_tab: Tab,
    pub chat: Vec<ChatTurn>,
    pub storage: Storage,
}

impl AppData {
    /// Restores application data from storage, falling back to defaults for
    /// anything absent or malformed.
    pub fn load(storage: Storage) -> Self {
        Self {
            profile: storage.load_profile(),
            records: RecordStore::new(storage.load_records()),
            session: storage.load_session(),
            active_tab: Tab::Home,
            chat: Vec::new(),
            storage,
        }
    }
}

/// Shared application state with injected capabilities.
pub struct AppState {
    pub data: RwLock<AppData>,
    pub ai: Arc<dyn NutritionAi>,
    pub auth: Arc<dyn AuthProvider>,
}

// === JSON Request/Response Types ===

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub is_logged_in: bool,
    pub username: Option<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            is_logged_in: session.is_logged_in(),
            username: session.username.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub summary: DailySummary,
    /// Today's records, newest-first.
    pub records: Vec<FoodRecord>,
}

#[derive(Deserialize, Serialize)]
pub struct TabState {
    pub tab: Tab,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub image_base64: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// `None` when recognition failed.
    pub food: Option<FoodScan>,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub food: Option<FoodSearchHit>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct EditImageRequest {
    pub image_base64: String,
    pub instruction: String,
}

#[derive(Serialize)]
pub struct EditImageResponse {
    pub image_base64: Option<String>,
}

// === Router Setup ===

/// Creates the application router.
pub fn create_router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/session", get(get_session))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/records", get(get_records).post(add_record))
        .route("/api/quick-foods", get(get_quick_foods))
        .route("/api/profile", get(get_profile).put(set_profile))
        .route("/api/tab", get(get_tab).put(set_tab))
        .route("/api/ai/analyze", post(ai_analyze))
        .route("/api/ai/search", post(ai_search))
        .route("/api/ai/chat", post(ai_chat))
        .route("/api/ai/edit-image", post(ai_edit_image))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .with_state(state)
}

/// Runs the web server.
pub async fn run_server(
    state: Arc<AppState>,
    port: u16,
    static_dir: PathBuf,
) -> anyhow::Result<()> {
    let app = create_router(state, static_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("Server running at http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// === Helpers ===

/// Record, profile, dashboard and AI endpoints require a logged-in session.
fn require_login(data: &AppData) -> Result<(), StatusCode> {
    if data.session.is_logged_in() {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Persistence failures are logged, not retried; the in-memory mutation
/// stands either way.
fn persist(result: Result<(), StorageError>) {
    if let Err(e) = result {
        log::error!("Failed to persist state: {e}");
    }
}

// === Session Handlers ===

/// POST /api/login - verify credentials and open a session.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, StatusCode> {
    state
        .auth
        .verify(&req.username, &req.password)
        .await
        .map_err(|e| {
            log::info!("Login rejected: {e}");
            StatusCode::UNAUTHORIZED
        })?;

    let mut guard = state.data.write().await;
    let data = &mut *guard;
    data.session = Session {
        username: Some(req.username),
    };
    persist(data.storage.save_session(&data.session));

    Ok(Json(SessionResponse::from(&data.session)))
}

/// POST /api/logout - clear the session and reset navigation.
async fn logout(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let mut guard = state.data.write().await;
    let data = &mut *guard;

    data.session = Session::default();
    data.active_tab = Tab::Home;
    data.chat.clear();
    persist(data.storage.save_session(&data.session));

    Json(SessionResponse::from(&data.session))
}

/// GET /api/session - current login state.
async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let data = state.data.read().await;
    Json(SessionResponse::from(&data.session))
}

// === Dashboard and Record Handlers ===

/// GET /api/dashboard - today's summary and records.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, StatusCode> {
    let data = state.data.read().await;
    require_login(&data)?;

    let today = Local::now().date_naive();
    let summary = DailySummary::for_day(&data.profile, data.records.all(), today);
    let records = data
        .records
        .all()
        .iter()
        .filter(|r| r.local_date() == today)
        .cloned()
        .collect();

    Ok(Json(DashboardResponse { summary, records }))
}

/// GET /api/records - the full record log, newest-first.
async fn get_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FoodRecord>>, StatusCode> {
    let data = state.data.read().await;
    require_login(&data)?;
    Ok(Json(data.records.all().to_vec()))
}

/// POST /api/records - log a new food record.
async fn add_record(
    State(state): State<Arc<AppState>>,
    Json(mut input): Json<RecordInput>,
) -> Result<(StatusCode, Json<FoodRecord>), StatusCode> {
    let mut guard = state.data.write().await;
    let data = &mut *guard;
    require_login(data)?;

    if input.name.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    if input.quantity.is_empty() {
        input.quantity = DEFAULT_QUANTITY.to_string();
    }

    let record = data.records.add(input).clone();
    data.active_tab = Tab::Home;
    persist(data.storage.save_records(data.records.all()));

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/quick-foods - the static quick-pick catalog.
async fn get_quick_foods() -> Json<&'static [QuickFood]> {
    Json(QUICK_FOODS)
}

// === Profile Handlers ===

/// GET /api/profile - the current body profile.
async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Json<UserProfile>, StatusCode> {
    let data = state.data.read().await;
    require_login(&data)?;
    Ok(Json(data.profile.clone()))
}

/// PUT /api/profile - replace the body profile wholesale.
async fn set_profile(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<UserProfile>, StatusCode> {
    let mut guard = state.data.write().await;
    let data = &mut *guard;
    require_login(data)?;

    data.profile = profile;
    persist(data.storage.save_profile(&data.profile));

    Ok(Json(data.profile.clone()))
}

// === Navigation Handlers ===

/// GET /api/tab - the active navigation tab.
async fn get_tab(State(state): State<Arc<AppState>>) -> Json<TabState> {
    let data = state.data.read().await;
    Json(TabState {
        tab: data.active_tab,
    })
}

/// PUT /api/tab - switch the active navigation tab.
async fn set_tab(State(state): State<Arc<AppState>>, Json(req): Json<TabState>) -> Json<TabState> {
    let mut data = state.data.write().await;
    data.active_tab = req.tab;
    Json(TabState {
        tab: data.active_tab,
    })
}

// === AI Handlers ===

/// POST /api/ai/analyze - recognize food in a photo.
async fn ai_analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, StatusCode> {
    {
        let data = state.data.read().await;
        require_login(&data)?;
    }

    let image = BASE64
        .decode(req.image_base64.as_bytes())
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    let food = state.ai.analyze_image(&image).await;
    Ok(Json(AnalyzeResponse { food }))
}

/// POST /api/ai/search - look up calories for a food name.
async fn ai_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, StatusCode> {
    {
        let data = state.data.read().await;
        require_login(&data)?;
    }

    let food = state.ai.search_food(&req.query).await;
    Ok(Json(SearchResponse { food }))
}

/// POST /api/ai/chat - one assistant exchange.
async fn ai_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, StatusCode> {
    // Snapshot the history so the AI call runs without holding the lock.
    let history = {
        let data = state.data.read().await;
        require_login(&data)?;
        data.chat.clone()
    };

    let reply = state.ai.chat(&history, &req.message).await;

    let mut data = state.data.write().await;
    data.chat.push(ChatTurn {
        role: ChatRole::User,
        text: req.message,
    });
    data.chat.push(ChatTurn {
        role: ChatRole::Model,
        text: reply.text.clone(),
    });

    Ok(Json(reply))
}

/// POST /api/ai/edit-image - apply an edit instruction to a photo.
async fn ai_edit_image(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditImageRequest>,
) -> Result<Json<EditImageResponse>, StatusCode> {
    {
        let data = state.data.read().await;
        require_login(&data)?;
    }

    let image = BASE64
        .decode(req.image_base64.as_bytes())
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    let edited = state.ai.edit_image(&image, &req.instruction).await;
    Ok(Json(EditImageResponse {
        image_base64: edited.map(|bytes| BASE64.encode(bytes)),
    }))
}
