use actix_files::Files;
use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::{time::Duration as CookieDuration, Key};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::config::Config;
use crate::directory::{CsvDirectory, Team, TeamDirectory};
use crate::display::{render_quarter, render_roster};
use crate::error::AppError;
use crate::form::{FormField, QuarterCountForm};
use crate::host::LineupHost;
use crate::planner::Player;
use crate::permissions::{PermissionCache, LINEUP_EDIT};

const USER_KEY: &str = "user_id";
const PLANNER_KEY: &str = "planner_key";

/// One browser session's planner
pub struct PlannerSession {
    pub host: LineupHost,
    pub last_seen: DateTime<Utc>,
}

// Planners only live in memory; nothing is written back to the team store
pub struct AppState {
    pub directory: Box<dyn TeamDirectory>,
    pub permissions: Mutex<PermissionCache>,
    pub planners: Mutex<HashMap<String, PlannerSession>>,
    pub session_idle: Duration,
}

impl AppState {
    pub fn new(directory: Box<dyn TeamDirectory>, session_idle_minutes: i64) -> Self {
        Self {
            directory,
            permissions: Mutex::new(PermissionCache::new()),
            planners: Mutex::new(HashMap::new()),
            session_idle: Duration::minutes(session_idle_minutes),
        }
    }
}

#[derive(Deserialize)]
pub struct SessionRequest {
    user_id: String,
}

#[derive(Deserialize)]
pub struct LineupQuery {
    team: Option<String>,
}

#[derive(Deserialize)]
pub struct SelectTeamRequest {
    team_id: String,
}

#[derive(Deserialize)]
pub struct ClearPermissionsRequest {
    #[serde(default)]
    team_id: Option<String>,
}

#[derive(Deserialize)]
pub struct FormFieldRequest {
    field: FormField,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    quarter: usize,
    player_id: String,
}

/// Locks a mutex, recovering the data if a previous holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn new_planner_key() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}

fn current_user(session: &Session) -> Result<String, AppError> {
    session.get::<String>(USER_KEY)?.ok_or(AppError::NotSignedIn)
}

fn planner_key(session: &Session) -> Result<String, AppError> {
    if let Some(key) = session.get::<String>(PLANNER_KEY)? {
        return Ok(key);
    }
    let key = new_planner_key();
    session.insert(PLANNER_KEY, &key)?;
    Ok(key)
}

/// Runs `f` against the session's planner, creating it on first use.
/// Planners idle for longer than the configured window are dropped first.
/// The lock covers every planner, so `f` must not touch the team directory.
fn with_host<R>(state: &AppState, key: &str, f: impl FnOnce(&mut LineupHost) -> R) -> R {
    let mut planners = lock(&state.planners);
    let now = Utc::now();
    let before = planners.len();
    planners.retain(|k, s| k == key || now - s.last_seen <= state.session_idle);
    if planners.len() < before {
        log::info!("Dropped {} idle planner(s)", before - planners.len());
    }

    let entry = planners.entry(key.to_string()).or_insert_with(|| PlannerSession {
        host: LineupHost::new(),
        last_seen: now,
    });
    entry.last_seen = now;
    f(&mut entry.host)
}

/// Any membership on the team is enough to look at it
fn authorize_view(state: &AppState, team_id: &str, user_id: &str) -> Result<(), AppError> {
    let mut permissions = lock(&state.permissions);
    match permissions.membership(team_id, user_id, state.directory.as_ref())? {
        Some(_) => Ok(()),
        None => Err(AppError::Forbidden),
    }
}

fn authorize_edit(state: &AppState, team_id: &str, user_id: &str) -> Result<(), AppError> {
    let mut permissions = lock(&state.permissions);
    if permissions.has_permission(team_id, user_id, LINEUP_EDIT, state.directory.as_ref())? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn current_team_id(state: &AppState, key: &str) -> Option<String> {
    with_host(state, key, |host| host.team().map(|t| t.id.clone()))
}

/// Looks the team up, checks access and fetches its roster.
/// Runs without the planners lock held.
fn fetch_team(state: &AppState, team_id: &str, user_id: &str) -> Result<(Team, Vec<Player>), AppError> {
    let team = state
        .directory
        .team(team_id)?
        .ok_or_else(|| AppError::TeamNotFound(team_id.to_string()))?;
    authorize_view(state, &team.id, user_id)?;
    let roster = state.directory.roster(&team.id)?;
    Ok((team, roster))
}

/// Checks edit rights for the planner's current team, then runs `f` on the planner.
/// Fails with `TeamChanged` if another request switched teams in between.
fn with_editable_host<R>(
    state: &AppState,
    key: &str,
    user_id: &str,
    f: impl FnOnce(&mut LineupHost) -> Result<R, AppError>,
) -> Result<R, AppError> {
    let team_id = current_team_id(state, key).ok_or(AppError::NoTeamSelected)?;
    authorize_edit(state, &team_id, user_id)?;
    with_host(state, key, |host| {
        if host.team().map(|t| t.id.as_str()) != Some(team_id.as_str()) {
            return Err(AppError::TeamChanged);
        }
        f(host)
    })
}

fn planner_response(host: &LineupHost) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "planner": host.snapshot(),
    }))
}

fn login_location(team: Option<&str>) -> String {
    let Some(team) = team else {
        return "/login".to_string();
    };
    match serde_urlencoded::to_string([("team", team)]) {
        Ok(query) => format!("/login?{}", query),
        Err(e) => {
            log::warn!("Dropping team from login redirect: {}", e);
            "/login".to_string()
        }
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location.to_string()))
        .finish()
}

// Session endpoints

// Development stand-in: any non-empty user id is accepted without a credential check.
// A real deployment signs in against the team backend before this handler runs.
async fn sign_in(
    req: web::Json<SessionRequest>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(crate::form::ValidationError::new("User ID is required").into());
    }
    session.renew();
    session.insert(USER_KEY, user_id)?;
    session.insert(PLANNER_KEY, new_planner_key())?;
    log::info!("User {} signed in", user_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn sign_out(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if let Some(key) = session.get::<String>(PLANNER_KEY)? {
        lock(&state.planners).remove(&key);
    }
    session.purge();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Team listing
async fn list_teams(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let teams = state.directory.teams_for_user(&user_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "teams": teams})))
}

// Planner endpoints
async fn get_planner(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    current_user(&session)?;
    let key = planner_key(&session)?;
    Ok(with_host(&state, &key, |host| planner_response(host)))
}

async fn choose_team(
    req: web::Json<SelectTeamRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let key = planner_key(&session)?;
    let (team, roster) = fetch_team(&state, req.team_id.trim(), &user_id)?;
    Ok(with_host(&state, &key, |host| {
        host.load_team(team, roster);
        planner_response(host)
    }))
}

async fn reload_roster(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let key = planner_key(&session)?;
    let team_id = current_team_id(&state, &key).ok_or(AppError::NoTeamSelected)?;
    authorize_view(&state, &team_id, &user_id)?;
    let roster = state.directory.roster(&team_id)?;
    with_host(&state, &key, |host| -> Result<HttpResponse, AppError> {
        if !host.replace_roster(&team_id, roster) {
            return Err(AppError::TeamChanged);
        }
        Ok(planner_response(host))
    })
}

async fn set_quarters(
    req: web::Json<QuarterCountForm>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let key = planner_key(&session)?;
    with_editable_host(&state, &key, &user_id, |host| {
        host.change_quarter_count(&req)?;
        Ok(planner_response(host))
    })
}

async fn update_form(
    req: web::Json<FormFieldRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let key = planner_key(&session)?;
    with_editable_host(&state, &key, &user_id, |host| {
        host.update_temporary_form(req.field, &req.value);
        Ok(planner_response(host))
    })
}

/// Submits the form contents collected through `update_form`
async fn add_temporary(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let key = planner_key(&session)?;
    with_editable_host(&state, &key, &user_id, |host| {
        let player = host.submit_temporary()?;
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "player": player,
            "planner": host.snapshot(),
        })))
    })
}

async fn assign_player(
    req: web::Json<AssignRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let key = planner_key(&session)?;
    with_editable_host(&state, &key, &user_id, |host| {
        let outcome = host.drop_player(req.quarter, &req.player_id);
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "outcome": outcome,
            "planner": host.snapshot(),
        })))
    })
}

async fn unassign_player(
    req: web::Json<AssignRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user(&session)?;
    let key = planner_key(&session)?;
    with_editable_host(&state, &key, &user_id, |host| {
        let removed = host.remove_player(req.quarter, &req.player_id);
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "removed": removed,
            "planner": host.snapshot(),
        })))
    })
}

async fn clear_permissions(
    req: web::Json<ClearPermissionsRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    current_user(&session)?;
    let mut permissions = lock(&state.permissions);
    match req.team_id.as_deref() {
        Some(team_id) => {
            permissions.invalidate_team(team_id);
            log::info!("Permission cache cleared for team {}", team_id);
        }
        None => {
            permissions.clear();
            log::info!("Permission cache cleared");
        }
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// HTML fragments
async fn roster_fragment(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    current_user(&session)?;
    let key = planner_key(&session)?;
    let html = with_host(&state, &key, |host| render_roster(host.planner()))?;
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn quarter_fragment(
    index: web::Path<usize>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    current_user(&session)?;
    let key = planner_key(&session)?;
    let html = with_host(&state, &key, |host| render_quarter(host.planner(), *index))?;
    match html {
        Some(html) => Ok(HttpResponse::Ok().content_type("text/html").body(html)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({"success": false, "error": "No such quarter"}))),
    }
}

// HTML page handlers
async fn index() -> HttpResponse {
    redirect("/lineup")
}

async fn login_page() -> HttpResponse {
    let html = include_str!("../templates/login.html");
    HttpResponse::Ok().content_type("text/html").body(html)
}

async fn lineup_page(
    query: web::Query<LineupQuery>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(user_id) = session.get::<String>(USER_KEY)? else {
        return Ok(redirect(&login_location(query.team.as_deref())));
    };

    // A team in the URL skips the team listing step
    if let Some(team_id) = query.team.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let key = planner_key(&session)?;
        let fetched = fetch_team(&state, team_id, &user_id);
        with_host(&state, &key, |host| match fetched {
            Ok((team, roster)) => host.load_team(team, roster),
            Err(e) => {
                log::warn!("Could not preselect team {} for {}: {}", team_id, user_id, e);
                host.report_error(e.to_string());
            }
        });
    }

    let html = include_str!("../templates/lineup.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Registers pages and API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/login", web::get().to(login_page))
        .route("/lineup", web::get().to(lineup_page))
        .route("/api/session", web::post().to(sign_in))
        .route("/api/logout", web::post().to(sign_out))
        .route("/api/teams", web::get().to(list_teams))
        .route("/api/planner", web::get().to(get_planner))
        .route("/api/planner/team", web::post().to(choose_team))
        .route("/api/planner/reload", web::post().to(reload_roster))
        .route("/api/planner/quarters", web::post().to(set_quarters))
        .route("/api/planner/form", web::post().to(update_form))
        .route("/api/planner/temporary", web::post().to(add_temporary))
        .route("/api/planner/assign", web::post().to(assign_player))
        .route("/api/planner/unassign", web::post().to(unassign_player))
        .route("/api/permissions/clear", web::post().to(clear_permissions))
        .route("/fragments/roster", web::get().to(roster_fragment))
        .route("/fragments/quarters/{index}", web::get().to(quarter_fragment));
}

pub fn session_middleware(key: Key, config: &Config) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(config.secure_cookies)
        .session_lifecycle(
            PersistentSession::default().session_ttl(CookieDuration::minutes(config.session_idle_minutes)),
        )
        .build()
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(
        Box::new(CsvDirectory::new(&config.data_dir)),
        config.session_idle_minutes,
    ));
    let key = Key::generate();
    let bind = (config.bind.clone(), config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone(), &config))
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
