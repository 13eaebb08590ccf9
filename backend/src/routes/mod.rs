//! Route definitions for the Apiary Records Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Auth routes (public, proxied to the hosted provider)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - profile and administration
        .nest("/profile", profile_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        // Protected routes - colony records
        .nest("/apiaries", apiary_routes(state.clone()))
        .nest("/hives", hive_routes(state.clone()))
        .nest("/queens", queen_routes(state.clone()))
        .nest("/inspections", inspection_routes(state.clone()))
        .nest("/feedings", feeding_routes(state.clone()))
        .nest("/harvests", harvest_routes(state.clone()))
        .nest("/varroa", varroa_routes(state.clone()))
        .nest("/rearing", rearing_routes(state.clone()))
        // Protected routes - support and lookups
        .nest("/support", support_routes(state.clone()))
        .nest("/dropdowns", dropdown_routes(state.clone()))
        // Protected routes - reporting
        .merge(reporting_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .merge(protected)
}

fn profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_profile).put(handlers::update_profile))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin routes (role checked in handlers)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/:user_id/role", put(handlers::set_user_role))
        .route("/tickets", get(handlers::list_all_tickets))
        .route(
            "/tickets/:ticket_id",
            put(handlers::respond_to_ticket).delete(handlers::delete_ticket),
        )
        .route("/dropdowns", post(handlers::create_dropdown_category))
        .route(
            "/dropdowns/:category_id",
            put(handlers::update_dropdown_category).delete(handlers::delete_dropdown_category),
        )
        .route(
            "/dropdowns/:category_id/values",
            post(handlers::create_dropdown_value),
        )
        .route(
            "/dropdown-values/:value_id",
            put(handlers::update_dropdown_value).delete(handlers::delete_dropdown_value),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Apiary management routes (protected)
fn apiary_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_apiaries).post(handlers::create_apiary))
        .route(
            "/:apiary_id",
            get(handlers::get_apiary)
                .put(handlers::update_apiary)
                .delete(handlers::delete_apiary),
        )
        .route("/:apiary_id/hives", get(handlers::list_apiary_hives))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Hive management routes (protected)
fn hive_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_hives).post(handlers::create_hive))
        .route(
            "/:hive_id",
            get(handlers::get_hive)
                .put(handlers::update_hive)
                .delete(handlers::delete_hive),
        )
        .route("/:hive_id/inspections", get(handlers::list_hive_inspections))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Queen management routes (protected)
fn queen_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_queens).post(handlers::create_queen))
        .route(
            "/:queen_id",
            get(handlers::get_queen)
                .put(handlers::update_queen)
                .delete(handlers::delete_queen),
        )
        .route("/:queen_id/daughters", get(handlers::list_queen_daughters))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Inspection routes (protected)
fn inspection_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inspections).post(handlers::create_inspection))
        .route("/averages", get(handlers::get_inspection_averages))
        .route(
            "/:inspection_id",
            get(handlers::get_inspection)
                .put(handlers::update_inspection)
                .delete(handlers::delete_inspection),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Feeding routes (protected)
fn feeding_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_feedings).post(handlers::create_feeding))
        .route(
            "/:feeding_id",
            get(handlers::get_feeding)
                .put(handlers::update_feeding)
                .delete(handlers::delete_feeding),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Harvest routes (protected)
fn harvest_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_harvests).post(handlers::record_harvest))
        .route("/summary", get(handlers::get_harvest_summary))
        .route(
            "/:harvest_id",
            get(handlers::get_harvest)
                .put(handlers::update_harvest)
                .delete(handlers::delete_harvest),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Varroa monitoring routes (protected)
fn varroa_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/checks",
            get(handlers::list_varroa_checks).post(handlers::create_varroa_check),
        )
        .route(
            "/checks/:check_id",
            get(handlers::get_varroa_check)
                .put(handlers::update_varroa_check)
                .delete(handlers::delete_varroa_check),
        )
        .route(
            "/treatments",
            get(handlers::list_varroa_treatments).post(handlers::create_varroa_treatment),
        )
        .route(
            "/treatments/:treatment_id",
            get(handlers::get_varroa_treatment)
                .put(handlers::update_varroa_treatment)
                .delete(handlers::delete_varroa_treatment),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Queen rearing routes (protected)
fn rearing_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/batches",
            get(handlers::list_rearing_batches).post(handlers::create_rearing_batch),
        )
        .route(
            "/batches/:batch_id",
            get(handlers::get_rearing_batch)
                .put(handlers::update_rearing_batch)
                .delete(handlers::delete_rearing_batch),
        )
        .route("/batches/:batch_id/timeline", get(handlers::get_rearing_timeline))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Support ticket routes (protected)
fn support_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/tickets", get(handlers::list_my_tickets).post(handlers::create_ticket))
        .route("/tickets/:ticket_id", get(handlers::get_ticket))
        .route("/tickets/:ticket_id/close", post(handlers::close_ticket))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dropdown lookup routes (protected)
fn dropdown_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_dropdowns))
        .route("/:key", get(handlers::get_dropdown))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard and export routes (protected)
fn reporting_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/exports/:entity", get(handlers::export_records))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
