//! In-process harness driving the full REST surface over the in-memory store.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix services are not `Send`. Each request builds a fresh service over the
//! shared state; the session key is fixed so cookies survive between calls.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::http::{Method, StatusCode};
use actix_web::{App, test, web};
use async_trait::async_trait;
use employee_backend::Trace;
use employee_backend::domain::ports::{Notification, NotificationError, NotificationSender};
use employee_backend::domain::{
    CredentialLoginService, EmailAddress, PasswordDigest, Profile, RegistrationInvitationBackend,
    Repositories, User, Username,
};
use employee_backend::inbound::http::routes;
use employee_backend::inbound::http::state::{HttpState, HttpStatePorts};
use employee_backend::outbound::memory::{InMemoryStore, in_memory_repositories};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub const PASSWORD: &str = "correct horse battery";

/// Notification sender keeping every delivered message.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("recorder lock").clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.sent.lock().expect("recorder lock").push(notification.clone());
        Ok(())
    }
}

/// Outcome of one API call.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub trace_id: Option<String>,
    pub body: Value,
}

pub struct ApiWorld {
    runtime: Runtime,
    local: LocalSet,
    key: Key,
    pub repositories: Repositories,
    pub notifications: Arc<RecordingSender>,
    state: HttpState,
    users: RefCell<HashMap<String, User>>,
    cookies: RefCell<HashMap<String, Cookie<'static>>>,
    pub organization_id: RefCell<Option<String>>,
    pub last: RefCell<Option<Reply>>,
}

impl ApiWorld {
    pub fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let repositories = in_memory_repositories(Arc::new(InMemoryStore::new()));
        let notifications = Arc::new(RecordingSender::default());
        let state = HttpState::new(HttpStatePorts {
            invitations: Arc::new(RegistrationInvitationBackend::new(
                repositories.users.clone(),
                notifications.clone(),
            )),
            login: Arc::new(CredentialLoginService::new(repositories.users.clone())),
            repositories: repositories.clone(),
        });
        Self {
            runtime,
            local: LocalSet::new(),
            key: Key::generate(),
            repositories,
            notifications,
            state,
            users: RefCell::new(HashMap::new()),
            cookies: RefCell::new(HashMap::new()),
            organization_id: RefCell::new(None),
            last: RefCell::new(None),
        }
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }

    /// Store an active account with the shared test password.
    pub fn seed_user(&self, username: &str, email: Option<&str>, is_staff: bool) -> User {
        let profile = Profile {
            email: email.map(|raw| EmailAddress::new(raw).expect("valid email")),
            first_name: username.to_owned(),
            ..Profile::default()
        };
        let user = User::new(Username::new(username).expect("valid username"), profile)
            .with_staff(is_staff);
        let digest = PasswordDigest::hash(PASSWORD).expect("hash password");
        let users = self.repositories.users.clone();
        let stored = user.clone();
        self.block_on(async move { users.create(&stored, Some(digest)).await })
            .expect("seed user");
        self.users.borrow_mut().insert(username.to_owned(), user.clone());
        user
    }

    pub fn user(&self, username: &str) -> User {
        self.users
            .borrow()
            .get(username)
            .cloned()
            .expect("seeded user")
    }

    /// Log `username` in and keep the session cookie for later calls.
    pub fn login(&self, username: &str) {
        let reply_cookie = self.send_raw(
            None,
            Method::POST,
            "/api/v1/auth/login",
            Some(serde_json::json!({"username": username, "password": PASSWORD})),
        );
        let (reply, cookie) = reply_cookie;
        assert_eq!(reply.status, StatusCode::NO_CONTENT, "login failed");
        self.cookies
            .borrow_mut()
            .insert(username.to_owned(), cookie.expect("session cookie"));
    }

    /// Call the API as `username` (logging in on first use) or anonymously.
    pub fn call(&self, username: Option<&str>, method: Method, path: &str, body: Option<Value>) -> Reply {
        let cookie = username.map(|name| {
            if !self.cookies.borrow().contains_key(name) {
                self.login(name);
            }
            self.cookies.borrow()[name].clone()
        });
        let (reply, _) = self.send_raw(cookie, method, path, body);
        *self.last.borrow_mut() = Some(reply.clone());
        reply
    }

    pub fn last(&self) -> Reply {
        self.last.borrow().clone().expect("a request was made")
    }

    fn send_raw(
        &self,
        cookie: Option<Cookie<'static>>,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (Reply, Option<Cookie<'static>>) {
        let state = self.state.clone();
        let key = self.key.clone();
        let path = path.to_owned();
        self.block_on(async move {
            let app = test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .wrap(
                        SessionMiddleware::builder(CookieSessionStore::default(), key)
                            .cookie_name("session".to_owned())
                            .cookie_secure(false)
                            .build(),
                    )
                    .wrap(Trace)
                    .configure(routes::configure),
            )
            .await;
            let mut request = test::TestRequest::default().method(method).uri(&path);
            if let Some(cookie) = cookie {
                request = request.cookie(cookie);
            }
            if let Some(body) = body {
                request = request.set_json(body);
            }
            let response = test::call_service(&app, request.to_request()).await;
            let status = response.status();
            let trace_id = response
                .headers()
                .get("trace-id")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let session = response
                .response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .map(Cookie::into_owned);
            let bytes = test::read_body(response).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("JSON body")
            };
            (
                Reply {
                    status,
                    trace_id,
                    body,
                },
                session,
            )
        })
    }
}
