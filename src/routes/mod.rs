use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{auth, bookings, users, vehicles};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // IP-based governor for the unauthenticated endpoints
    let public_governor = create_public_governor();

    // Public routes
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .layer(public_governor);

    // Anyone can browse the fleet
    let vehicle_public_routes = Router::new()
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/{id}", get(vehicles::get_vehicle));

    // Fleet management (requires auth + admin role)
    let vehicle_admin_routes = Router::new()
        .route("/vehicles", post(vehicles::create_vehicle))
        .route("/vehicles/{id}", put(vehicles::update_vehicle))
        .route("/vehicles/{id}", delete(vehicles::delete_vehicle))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // User management; updates allow self-service, so the admin gate for
    // those lives in the handler rather than on the router
    let user_admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", delete(users::delete_user))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let user_self_routes = Router::new()
        .route("/users/{id}", put(users::update_user))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Booking lifecycle (requires auth; role rules are enforced by the
    // lifecycle engine's permission table)
    let booking_routes = Router::new()
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/{id}", patch(bookings::update_booking_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    let api_routes = vehicle_public_routes
        .merge(vehicle_admin_routes)
        .merge(user_admin_routes)
        .merge(user_self_routes)
        .merge(booking_routes);

    Router::new()
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1", api_routes)
        .with_state(state)
}
