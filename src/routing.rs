//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{get_display_name_page, set_display_name_endpoint},
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    budget::update_budget_endpoint,
    currency::post_converter,
    dashboard::{get_dashboard_events, get_dashboard_page},
    endpoints,
    expense::{
        create_expense_endpoint, expense_annotation_endpoint, get_expenses_page,
        get_new_expense_page,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // The event stream is opened by `EventSource`, not HTMX, so it gets a plain redirect.
    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::DASHBOARD_EVENTS, get(get_dashboard_events))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::ACCOUNT_NAME_VIEW, get(get_display_name_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
            .route(
                endpoints::EXPENSE_ANNOTATION_API,
                post(expense_annotation_endpoint),
            )
            .route(endpoints::BUDGET_API, post(update_budget_endpoint))
            .route(endpoints::CONVERTER_API, post(post_converter))
            .route(
                endpoints::ACCOUNT_NAME_API,
                post(set_display_name_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum_test::{TestResponse, TestServer};
    use rusqlite::Connection;

    use crate::{
        AppState, PasswordHash, ValidatedPassword,
        auth::{create_user, set_display_name},
        build_router,
        currency::{ExchangeRates, SharedRates},
        endpoints,
    };

    const USERNAME: &str = "anjali";
    const PASSWORD: &str = "varkala-cliff-sunset";

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(
            conn,
            "munnar",
            "Etc/UTC",
            SharedRates::available(ExchangeRates::FIXED),
        )
        .unwrap();

        {
            let connection = state.db_connection.lock().unwrap();
            let password_hash =
                PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4).unwrap();
            let user = create_user(USERNAME, password_hash, false, &connection).unwrap();
            set_display_name(user.id, "Anjali Menon", &connection).unwrap();
        }

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer) -> TestResponse {
        server
            .post(endpoints::LOG_IN_API)
            .form(&[("username", USERNAME), ("password", PASSWORD)])
            .await
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server.get("/houseboats").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn log_in_page_is_public() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn error_page_is_public() {
        let server = get_test_server();

        server
            .get(endpoints::INTERNAL_ERROR_VIEW)
            .await
            .assert_status_internal_server_error();
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_cookie() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::ACCOUNT_NAME_VIEW,
            endpoints::DASHBOARD_EVENTS,
        ] {
            let response = server.get(page).await;

            response.assert_status_see_other();
            assert!(
                response
                    .header("location")
                    .to_str()
                    .unwrap()
                    .starts_with(endpoints::LOG_IN_VIEW),
                "{page} did not redirect to the log in page"
            );
        }
    }

    #[tokio::test]
    async fn api_routes_use_hx_redirect_without_cookie() {
        let server = get_test_server();

        for route in [
            endpoints::EXPENSES_API,
            endpoints::EXPENSE_ANNOTATION_API,
            endpoints::BUDGET_API,
            endpoints::CONVERTER_API,
            endpoints::ACCOUNT_NAME_API,
        ] {
            let response = server
                .post(route)
                .add_header("HX-Request", "true")
                .add_header("HX-Current-URL", endpoints::DASHBOARD_VIEW)
                .await;

            assert!(
                response
                    .header("hx-redirect")
                    .to_str()
                    .unwrap()
                    .starts_with(endpoints::LOG_IN_VIEW),
                "{route} did not send an HX-Redirect to the log in page"
            );
        }
    }

    #[tokio::test]
    async fn logged_in_user_can_see_pages() {
        let server = get_test_server();
        let jar = log_in(&server).await.cookies();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::ACCOUNT_NAME_VIEW,
        ] {
            server
                .get(page)
                .add_cookies(jar.clone())
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn logged_in_user_can_record_an_expense() {
        let server = get_test_server();
        let jar = log_in(&server).await.cookies();

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookies(jar.clone())
            .form(&[
                ("description", "Houseboat deposit"),
                ("paid_to", "Lakeside Cruises"),
                ("contact_info", ""),
                ("category", "accommodation"),
                ("total_amount", "18000"),
                ("advance_paid", "5000"),
                ("date", "2025-03-01"),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::DASHBOARD_VIEW);

        let expenses_page = server
            .get(endpoints::EXPENSES_VIEW)
            .add_cookies(jar)
            .await
            .text();
        assert!(expenses_page.contains("Houseboat deposit"));
    }
}
