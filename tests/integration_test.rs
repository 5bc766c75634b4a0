// Integration tests for roster-admin

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockito::Matcher;
use serde_json::json;

use roster_admin::api::{AdminApi, ApiError, HttpAdminApi, StaticToken, TokenFile};
use roster_admin::app::{ApiEvent, PendingAction};
use roster_admin::model::{Category, Course, EnrollRequest, NewUserDraft, UserPage};
use roster_admin::search::SearchQuery;

fn temp_path(tag: &str) -> std::path::PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir().join(format!("roster_admin_{}_{}_{}", tag, std::process::id(), nonce))
}

fn client(url: String, token: Option<&str>) -> HttpAdminApi {
    let credentials = Arc::new(StaticToken::new(token.map(String::from)));
    HttpAdminApi::new(url, Duration::from_secs(5), credentials).expect("build client")
}

// 1) Roster query parameters, bearer header and response decoding
#[tokio::test]
async fn list_users_sends_query_and_token() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("GET", "/api/admin/all-users-list")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search".into(), "raj".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("limit".into(), "30".into()),
        ]))
        .match_header("authorization", "Bearer op-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "users": [{
                    "_id": "u1",
                    "name": "Raj",
                    "selectedCategory": "CAT",
                    "enrolledCourses": [
                        { "courseId": { "_id": "c1", "name": "Quant" }, "status": "unlocked" },
                        { "courseId": "c2", "status": "expired" }
                    ]
                }],
                "totalPages": 3
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = client(server.url(), Some("op-token"));
    let mut query = SearchQuery::default();
    query.set_term("raj");
    let page = api.list_users(&query).await.expect("roster");
    m.assert_async().await;

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.users.len(), 1);
    let u = &page.users[0];
    assert_eq!(u.selected_category, Some(Category::Cat));
    let active: Vec<_> = u.active_enrollments().map(|c| c.id().to_string()).collect();
    assert_eq!(active, vec!["c1"]);
}

// 2) Create and enroll send camelCase JSON bodies
#[tokio::test]
async fn create_and_enroll_post_json_bodies() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/api/admin/create-user")
        .match_body(Matcher::Json(json!({
            "name": "Raj",
            "email": "raj@example.com",
            "phoneNumber": "",
            "gender": "Male",
            "city": "",
            "selectedCategory": "XAT",
            "selectedExam": ""
        })))
        .with_status(200)
        .with_body(json!({ "success": true, "message": "User created" }).to_string())
        .create_async()
        .await;
    let enroll = server
        .mock("POST", "/api/admin/enroll-user")
        .match_body(Matcher::Json(json!({ "userId": "u1", "courseId": "c1", "validityMonths": 6 })))
        .with_status(200)
        .with_body(json!({ "success": true, "message": "Enrolled for 6 months" }).to_string())
        .create_async()
        .await;

    let api = client(server.url(), None);
    let draft = NewUserDraft {
        name: "Raj".into(),
        email: "raj@example.com".into(),
        gender: "Male".into(),
        selected_category: Category::Xat,
        ..NewUserDraft::default()
    };
    assert_eq!(api.create_user(&draft).await, Ok(Some("User created".into())));
    let req = EnrollRequest { user_id: "u1".into(), course_id: "c1".into(), validity_months: 6 };
    assert_eq!(api.enroll_user(&req).await, Ok(Some("Enrolled for 6 months".into())));
    create.assert_async().await;
    enroll.assert_async().await;
}

// 3) Error mapping: non-2xx with message, success:false, and undecodable bodies
#[tokio::test]
async fn failures_carry_server_messages() {
    let mut server = mockito::Server::new_async().await;
    let _conflict = server
        .mock("POST", "/api/admin/enroll-user")
        .with_status(409)
        .with_body(json!({ "success": false, "message": "User already enrolled" }).to_string())
        .create_async()
        .await;
    let _rejected = server
        .mock("POST", "/api/admin/remove-enrollment")
        .match_body(Matcher::Json(json!({ "userId": "u1", "courseId": "c1" })))
        .with_status(200)
        .with_body(json!({ "success": false }).to_string())
        .create_async()
        .await;
    let _garbage = server
        .mock("GET", "/api/admin/all-courses-list")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let api = client(server.url(), None);
    let req = EnrollRequest { user_id: "u1".into(), course_id: "c1".into(), validity_months: 12 };
    let err = api.enroll_user(&req).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status { status: 409, message: Some("User already enrolled".into()) }
    );
    assert_eq!(err.message_or("Failed to enroll user"), "User already enrolled");

    let err = api.remove_enrollment("u1", "c1").await.unwrap_err();
    assert_eq!(err, ApiError::Rejected { message: None });
    assert_eq!(err.message_or("Failed to remove enrollment"), "Failed to remove enrollment");

    assert!(matches!(api.list_courses().await, Err(ApiError::Decode(_))));
}

// 4) Token file is consulted on every request
#[tokio::test]
async fn token_file_is_reread_per_request() {
    let path = temp_path("token");
    std::fs::write(&path, "first\n").unwrap();

    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "success": true,
        "courses": [{ "_id": "c1", "name": "Quant", "price": 4999 }]
    })
    .to_string();
    let first = server
        .mock("GET", "/api/admin/all-courses-list")
        .match_header("authorization", "Bearer first")
        .with_body(body.clone())
        .create_async()
        .await;
    let second = server
        .mock("GET", "/api/admin/all-courses-list")
        .match_header("authorization", "Bearer second")
        .with_body(body)
        .create_async()
        .await;

    let credentials = Arc::new(TokenFile::new(&path));
    let api = HttpAdminApi::new(server.url(), Duration::from_secs(5), credentials)
        .expect("build client");
    let courses = api.list_courses().await.expect("first call");
    assert_eq!(courses[0].price, Some(4999.0));
    std::fs::write(&path, "second").unwrap();
    api.list_courses().await.expect("second call");

    first.assert_async().await;
    second.assert_async().await;
    let _ = std::fs::remove_file(&path);
}

// 5) A server that never answers surfaces as a timeout
#[tokio::test]
async fn unresponsive_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hold = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let credentials = Arc::new(StaticToken::new(None));
    let api = HttpAdminApi::new(format!("http://{addr}"), Duration::from_millis(200), credentials)
        .expect("build client");
    assert_eq!(api.list_courses().await, Err(ApiError::Timeout));

    let failure = api.list_users(&SearchQuery::default()).await.unwrap_err();
    assert_eq!(failure.message_or("Failed to load users"), "Failed to load users");
    hold.abort();
}

/// Records every call and answers from canned data.
#[derive(Default)]
struct RecordingApi {
    calls: Mutex<Vec<String>>,
}

impl RecordingApi {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AdminApi for RecordingApi {
    async fn list_users(&self, query: &SearchQuery) -> Result<UserPage, ApiError> {
        self.record(format!("list_users {} {}", query.term, query.page));
        Ok(UserPage { users: vec![], total_pages: 1 })
    }

    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.record("list_courses".into());
        Err(ApiError::Timeout)
    }

    async fn create_user(&self, draft: &NewUserDraft) -> Result<Option<String>, ApiError> {
        self.record(format!("create_user {}", draft.name));
        Ok(None)
    }

    async fn enroll_user(&self, request: &EnrollRequest) -> Result<Option<String>, ApiError> {
        self.record(format!(
            "enroll_user {} {} {}",
            request.user_id, request.course_id, request.validity_months
        ));
        Ok(Some("ok".into()))
    }

    async fn remove_enrollment(&self, user_id: &str, course_id: &str) -> Result<(), ApiError> {
        self.record(format!("remove_enrollment {user_id} {course_id}"));
        Ok(())
    }
}

// 6) Actions map one-to-one onto API calls and response events
#[tokio::test]
async fn perform_routes_actions_to_api() {
    use roster_admin::app::dispatch::perform;

    let api = RecordingApi::default();
    let mut query = SearchQuery::default();
    query.set_term("raj");
    let ev = perform(&api, PendingAction::LoadRoster { seq: 7, query }).await;
    let empty = UserPage { users: vec![], total_pages: 1 };
    assert_eq!(ev, ApiEvent::RosterLoaded { seq: 7, result: Ok(empty) });

    let ev = perform(&api, PendingAction::LoadCatalog).await;
    assert_eq!(ev, ApiEvent::CatalogLoaded(Err(ApiError::Timeout)));

    let request =
        EnrollRequest { user_id: "u1".into(), course_id: "c1".into(), validity_months: 3 };
    perform(&api, PendingAction::EnrollUser { request }).await;
    let remove = PendingAction::RemoveEnrollment { user_id: "u1".into(), course_id: "c1".into() };
    perform(&api, remove).await;

    let calls = api.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "list_users raj 1".to_string(),
            "list_courses".to_string(),
            "enroll_user u1 c1 3".to_string(),
            "remove_enrollment u1 c1".to_string(),
        ]
    );
}

// 7) Dispatcher runs actions on the runtime and delivers events to the receiver
#[test]
fn dispatcher_delivers_events() {
    use roster_admin::app::Dispatcher;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let api = Arc::new(RecordingApi::default());
    let (dispatcher, mut events) = Dispatcher::new(api.clone(), runtime.handle().clone());
    let draft = NewUserDraft { name: "Raj".into(), ..Default::default() };
    dispatcher.dispatch(PendingAction::CreateUser { draft });

    let ev = events.blocking_recv().expect("event");
    assert_eq!(ev, ApiEvent::UserCreated(Ok(None)));
    assert_eq!(api.calls.lock().unwrap().as_slice(), ["create_user Raj".to_string()]);
}

// 8) Rendering shows roster rows, pagination and the active modal
#[test]
fn render_roster_with_pagination_and_confirm_prompt() {
    use ratatui::{Terminal, backend::TestBackend};
    use roster_admin::app::AppState;
    use roster_admin::ui::render;

    let users = serde_json::from_value(json!([
        { "_id": "u1", "name": "Raj Kumar", "email": "raj@example.com",
          "enrolledCourses": [
              { "courseId": { "_id": "c1", "name": "Quant Basics" }, "status": "unlocked" }
          ] },
        { "_id": "u2", "name": "", "phoneNumber": "9999999999" }
    ]))
    .unwrap();
    let mut app = AppState { users, total_pages: 3, ..AppState::default() };

    let backend = TestBackend::new(120, 30);
    let mut terminal = Terminal::new(backend).expect("create terminal");
    terminal.draw(|f| render(f, &mut app)).expect("render frame");
    let screen: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
    assert!(screen.contains("Raj Kumar"));
    assert!(screen.contains("Page 1 of 3"));
    assert!(screen.contains("Quant Basics"));

    app.request_remove_enrollment();
    terminal.draw(|f| render(f, &mut app)).expect("render frame");
    let screen: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
    assert!(screen.contains("Remove enrollment for \"Quant Basics\"?"));
}

// 9) Single page hides pagination; empty roster says so
#[test]
fn render_empty_roster() {
    use ratatui::{Terminal, backend::TestBackend};
    use roster_admin::app::AppState;
    use roster_admin::ui::render;

    let mut app = AppState::default();
    let backend = TestBackend::new(100, 24);
    let mut terminal = Terminal::new(backend).expect("create terminal");
    terminal.draw(|f| render(f, &mut app)).expect("render frame");
    let screen: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
    assert!(screen.contains("No users found"));
    assert!(!screen.contains("Page 1 of 1"));
}

// 10) Theme and keybinding files roundtrip and are created when missing
#[test]
fn theme_and_keymap_roundtrip_and_init() {
    use roster_admin::app::Theme;
    use roster_admin::app::keymap::{KeyAction, Keymap};

    let theme_path = temp_path("theme.conf").to_string_lossy().to_string();
    let t = Theme::mocha();
    t.write_file(&theme_path).expect("write theme");
    let t2 = Theme::from_file(&theme_path).expect("read theme");
    assert_eq!(format!("{:?}", t.success), format!("{:?}", t2.success));
    assert_eq!(format!("{:?}", t.header_bg), format!("{:?}", t2.header_bg));

    let keys_path = temp_path("keybinds.conf").to_string_lossy().to_string();
    let _ = std::fs::remove_file(&keys_path);
    let km = Keymap::load_or_init(&keys_path);
    assert!(std::path::Path::new(&keys_path).exists());
    let reloaded = Keymap::from_file(&keys_path).expect("read keymap");
    assert_eq!(km.keys_for(KeyAction::Enroll), reloaded.keys_for(KeyAction::Enroll));

    let _ = std::fs::remove_file(&theme_path);
    let _ = std::fs::remove_file(&keys_path);
}

// 11) Very small terminals still render, toast and dialogs included
#[test]
fn render_tiny_terminal_with_notification() {
    use ratatui::{Terminal, backend::TestBackend};
    use roster_admin::app::AppState;
    use roster_admin::ui::render;
    use std::time::Instant;

    for (w, h) in [(40, 3), (20, 2), (12, 1), (80, 5)] {
        let mut app = AppState::default();
        app.notification.error("Failed to load users", Instant::now());
        let mut terminal = Terminal::new(TestBackend::new(w, h)).expect("create terminal");
        terminal.draw(|f| render(f, &mut app)).expect("render frame");

        app.open_help();
        terminal.draw(|f| render(f, &mut app)).expect("render help");
    }
}

// 12) A blank category renders as a dash
#[test]
fn render_blank_category_as_dash() {
    use ratatui::{Terminal, backend::TestBackend};
    use roster_admin::app::AppState;
    use roster_admin::ui::render;

    let users = serde_json::from_value(json!([
        { "_id": "u1", "name": "Raj", "selectedCategory": "", "enrolledCourses": null }
    ]))
    .unwrap();
    let mut app = AppState { users, ..AppState::default() };
    assert_eq!(app.users[0].selected_category, None);

    let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("create terminal");
    terminal.draw(|f| render(f, &mut app)).expect("render frame");
    let screen: String =
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
    assert!(screen.contains("Category: —"));
    assert!(!screen.contains("Other"));
}
