mod common;

use common::{log_row, plan_row, FakeAuth, MemoryStore};
use fitlog::backend::{AuthEvent, AuthProvider, TableStore};
use fitlog::data::{PROGRESS_LOGS_TABLE, WORKOUT_PLANS_TABLE};
use fitlog::error::AppError;
use fitlog::models::{Credentials, NewProgressLog};
use fitlog::routes::Route;
use fitlog::views::{self, Fetch};
use fitlog::{App, Screen};
use std::sync::Arc;

fn app(auth: &Arc<FakeAuth>, store: &Arc<MemoryStore>) -> App {
    let provider: Arc<dyn AuthProvider> = auth.clone();
    let tables: Arc<dyn TableStore> = store.clone();
    App::new(provider, tables)
}

fn credentials() -> Credentials {
    Credentials::new("lifter@example.com", "hunter22")
}

#[tokio::test]
async fn test_placeholder_while_session_loading() {
    let auth = FakeAuth::new();
    auth.hold_initial_read();
    let store = MemoryStore::new();
    let app = app(&auth, &store);

    assert!(matches!(app.navigate("/progress").await, Screen::Placeholder));
    assert_eq!(store.calls(), 0);

    auth.release_initial_read();
    app.session().ready().await;
    assert!(matches!(
        app.navigate("/progress").await,
        Screen::Login {
            redirect: Some(Route::Progress)
        }
    ));
}

#[tokio::test]
async fn test_protected_route_redirects_then_returns_after_login() {
    let auth = FakeAuth::new();
    let user = auth.with_account("lifter@example.com", "hunter22");
    let store = MemoryStore::new();
    store.seed(
        PROGRESS_LOGS_TABLE,
        vec![log_row(1, &user.id, "2024-05-01", "2024-05-01T09:00:00Z", "Squat")],
    );
    let app = app(&auth, &store);
    app.session().ready().await;

    let redirect = match app.navigate("/progress").await {
        Screen::Login { redirect } => redirect,
        other => panic!("expected login screen, got {:?}", other),
    };
    assert_eq!(store.calls(), 0);

    let screen = app.login(&credentials(), redirect).await.unwrap();
    match screen {
        Screen::Progress { history } => {
            assert!(!history.loading);
            let logs = history.data.data().unwrap();
            assert_eq!(logs.len(), 1);
            assert_eq!(logs[0].exercise_name, "Squat");
        }
        other => panic!("expected progress screen, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_without_redirect_opens_dashboard() {
    let auth = FakeAuth::new();
    let user = auth.with_account("lifter@example.com", "hunter22");
    let store = MemoryStore::new();
    store.seed(WORKOUT_PLANS_TABLE, vec![plan_row(&user.id)]);
    let app = app(&auth, &store);
    app.session().ready().await;

    let screen = app.login(&credentials(), None).await.unwrap();

    match &screen {
        Screen::Dashboard { user: shown, plan } => {
            assert_eq!(shown, &user);
            assert_eq!(plan.data.data().map(|p| p.exercises.len()), Some(3));
        }
        other => panic!("expected dashboard, got {:?}", other),
    }
    assert!(views::render(&screen).contains("Strength Block"));
}

#[tokio::test]
async fn test_dashboard_without_plan_is_empty_not_failed() {
    let auth = FakeAuth::new();
    let user = auth.with_account("lifter@example.com", "hunter22");
    auth.restore(&user);
    let store = MemoryStore::new();
    let app = app(&auth, &store);
    app.session().ready().await;

    match app.navigate("/").await {
        Screen::Dashboard { plan, .. } => assert_eq!(plan.data, Fetch::Empty),
        other => panic!("expected dashboard, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_login_stays_on_login() {
    let auth = FakeAuth::new();
    auth.with_account("lifter@example.com", "hunter22");
    let store = MemoryStore::new();
    let app = app(&auth, &store);
    app.session().ready().await;

    let result = app
        .login(&Credentials::new("lifter@example.com", "nope"), Some(Route::Progress))
        .await;

    assert!(matches!(result, Err(AppError::Api(_))));
    assert!(matches!(
        app.navigate("/progress").await,
        Screen::Login { .. }
    ));
}

#[tokio::test]
async fn test_unknown_location_is_not_found() {
    let auth = FakeAuth::new();
    let store = MemoryStore::new();
    let app = app(&auth, &store);
    app.session().ready().await;

    match app.navigate("/settings").await {
        Screen::NotFound(location) => assert_eq!(location, "/settings"),
        other => panic!("expected not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_log_progress_requires_sign_in() {
    let auth = FakeAuth::new();
    let store = MemoryStore::new();
    let app = app(&auth, &store);
    app.session().ready().await;

    let entry = NewProgressLog {
        workout_name: "Leg Day".to_string(),
        exercise_name: "Squat".to_string(),
        sets_completed: 3,
        reps_achieved: "8,8,7".to_string(),
        weight_used: Some(135.0),
        workout_date: "2024-05-01".to_string(),
    };

    assert_eq!(app.log_progress(&entry).await, Err(AppError::NotAuthenticated));
    assert_eq!(store.calls(), 0);

    app.login(&credentials_for(&auth), None).await.unwrap();
    let logged = app.log_progress(&entry).await.unwrap();
    assert_eq!(Some(logged.user_id), app.session().user_id());
}

fn credentials_for(auth: &FakeAuth) -> Credentials {
    auth.with_account("lifter@example.com", "hunter22");
    credentials()
}

#[tokio::test]
async fn test_sign_out_elsewhere_protects_routes_again() {
    let auth = FakeAuth::new();
    let user = auth.with_account("lifter@example.com", "hunter22");
    auth.restore(&user);
    let store = MemoryStore::new();
    let app = app(&auth, &store);
    app.session().ready().await;
    assert!(matches!(app.navigate("/dashboard").await, Screen::Dashboard { .. }));

    auth.emit(AuthEvent::SignedOut);
    app.session().settled(|s| !s.is_authenticated()).await;

    assert!(matches!(
        app.navigate("/dashboard").await,
        Screen::Login {
            redirect: Some(Route::Dashboard)
        }
    ));
}

#[tokio::test]
async fn test_logout_returns_to_signed_out_state() {
    let auth = FakeAuth::new();
    let user = auth.with_account("lifter@example.com", "hunter22");
    auth.restore(&user);
    let store = MemoryStore::new();
    let app = app(&auth, &store);
    app.session().ready().await;

    app.logout().await.unwrap();

    assert!(!app.session().state().is_authenticated());
    assert!(auth.current_session().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_as_another_user_shows_new_identity() {
    for _ in 0..50 {
        let auth = FakeAuth::new();
        let previous = auth.with_account("previous@example.com", "hunter22");
        let next = auth.with_account("next@example.com", "hunter22");
        auth.restore(&previous);
        let store = MemoryStore::new();
        store.seed(WORKOUT_PLANS_TABLE, vec![plan_row(&next.id)]);
        let app = app(&auth, &store);
        app.session().ready().await;

        let screen = app
            .login(&Credentials::new("next@example.com", "hunter22"), None)
            .await
            .unwrap();

        match screen {
            Screen::Dashboard { user, plan } => {
                assert_eq!(user, next);
                assert!(plan.data.data().is_some());
            }
            other => panic!("expected dashboard, got {:?}", other),
        }
        assert_eq!(app.session().user_id(), Some(next.id.clone()));
    }
}
