use axum::routing::{MethodRouter, delete, get, patch, post, put};
use axum::{Extension, Router};
use axum::middleware::from_fn_with_state;
use tenura_application::AccessRequirement;
use tenura_core::AppError;
use tenura_domain::RoutePermission;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let state = &app_state;

    let auth_routes = Router::new()
        .route("/auth/logout", authenticated(state, post(handlers::auth::logout_handler)))
        .route("/auth/me", authenticated(state, get(handlers::auth::me_handler)));

    let user_routes = Router::new()
        .route(
            "/api/users",
            guarded(state, RoutePermission::UserRead, get(handlers::users::list_users_handler))
                .merge(guarded(
                    state,
                    RoutePermission::UserCreate,
                    post(handlers::users::create_user_handler),
                )),
        )
        .route(
            "/api/users/{user_id}",
            guarded(state, RoutePermission::UserRead, get(handlers::users::get_user_handler))
                .merge(guarded(
                    state,
                    RoutePermission::UserUpdate,
                    put(handlers::users::update_user_handler),
                ))
                .merge(guarded(
                    state,
                    RoutePermission::UserDelete,
                    delete(handlers::users::delete_user_handler),
                )),
        );

    let security_routes = Router::new()
        .route(
            "/api/roles",
            guarded(
                state,
                RoutePermission::RoleRead,
                get(handlers::security::list_roles_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::RoleCreate,
                post(handlers::security::create_role_handler),
            )),
        )
        .route(
            "/api/roles/{role_id}",
            guarded(state, RoutePermission::RoleRead, get(handlers::security::get_role_handler))
                .merge(guarded(
                    state,
                    RoutePermission::RoleUpdate,
                    put(handlers::security::update_role_handler),
                )),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            guarded(
                state,
                RoutePermission::RoleRead,
                get(handlers::security::list_role_permissions_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::RoleAssignPermission,
                put(handlers::security::assign_role_permissions_handler),
            )),
        )
        .route(
            "/api/roles/{role_id}/menus",
            guarded(
                state,
                RoutePermission::RoleRead,
                get(handlers::security::list_role_menus_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::RoleAssignMenu,
                put(handlers::security::assign_role_menus_handler),
            )),
        )
        .route(
            "/api/permissions",
            guarded(
                state,
                RoutePermission::PermissionRead,
                get(handlers::security::list_permissions_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::PermissionCreate,
                post(handlers::security::create_permission_handler),
            )),
        )
        .route(
            "/api/permissions/{permission_id}",
            guarded(
                state,
                RoutePermission::PermissionUpdate,
                patch(handlers::security::update_permission_handler),
            ),
        )
        .route(
            "/api/audit",
            guarded(
                state,
                RoutePermission::AuditRead,
                get(handlers::security::list_audit_log_handler),
            ),
        );

    let catalogue_routes = Router::new()
        .route(
            "/api/menus",
            guarded(state, RoutePermission::MenuRead, get(handlers::menus::list_menus_handler))
                .merge(guarded(
                    state,
                    RoutePermission::MenuCreate,
                    post(handlers::menus::create_menu_handler),
                )),
        )
        .route(
            "/api/menus/{menu_id}",
            guarded(
                state,
                RoutePermission::MenuUpdate,
                put(handlers::menus::update_menu_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::MenuDelete,
                delete(handlers::menus::delete_menu_handler),
            )),
        )
        .route(
            "/api/institutions",
            guarded(
                state,
                RoutePermission::InstitutionRead,
                get(handlers::institutions::list_institutions_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::InstitutionCreate,
                post(handlers::institutions::create_institution_handler),
            )),
        )
        .route(
            "/api/institutions/{institution_id}",
            guarded(
                state,
                RoutePermission::InstitutionRead,
                get(handlers::institutions::get_institution_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::InstitutionUpdate,
                put(handlers::institutions::update_institution_handler),
            ))
            .merge(guarded(
                state,
                RoutePermission::InstitutionDelete,
                delete(handlers::institutions::delete_institution_handler),
            )),
        )
        .route(
            "/api/institutions/{institution_id}/features",
            guarded(
                state,
                RoutePermission::FeatureRead,
                get(handlers::features::list_institution_features_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::FeatureAssign,
                put(handlers::features::set_institution_feature_handler),
            )),
        )
        .route(
            "/api/features",
            guarded(
                state,
                RoutePermission::FeatureRead,
                get(handlers::features::list_features_handler),
            )
            .merge(guarded(
                state,
                RoutePermission::FeatureCreate,
                post(handlers::features::create_feature_handler),
            )),
        )
        .route(
            "/api/features/{feature_id}",
            guarded(
                state,
                RoutePermission::FeatureUpdate,
                put(handlers::features::update_feature_handler),
            ),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(handlers::auth::login_handler))
        .merge(auth_routes)
        .merge(user_routes)
        .merge(security_routes)
        .merge(catalogue_routes)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}

/// Admits any verified identity.
fn authenticated(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), middleware::require_access))
}

/// Admits callers holding `permission`. The extension layer is added last so
/// it wraps the gate and is visible to it.
fn guarded(
    state: &AppState,
    permission: RoutePermission,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    authenticated(state, route).route_layer(Extension(AccessRequirement::permission(
        permission.as_str(),
    )))
}
