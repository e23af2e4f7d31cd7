//! Test helpers for inbound HTTP components.

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;

use crate::domain::ports::{Notification, NotificationError, NotificationSender};
use crate::domain::{
    CredentialLoginService, EmailAddress, FoundedOrganization, OrganizationUser, PasswordDigest,
    Profile, RegistrationInvitationBackend, Repositories, User, Username,
};
use crate::inbound::http::routes;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryStore, in_memory_repositories};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Notification sender remembering everything it was asked to deliver.
#[derive(Default)]
pub struct RecordingNotificationSender {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotificationSender {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("recorder lock").clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.sent.lock().expect("recorder lock").push(notification.clone());
        Ok(())
    }
}

/// In-memory backend plus the HTTP state wired over it.
pub struct TestContext {
    pub repositories: Repositories,
    pub notifications: Arc<RecordingNotificationSender>,
    pub state: HttpState,
}

impl TestContext {
    pub fn new() -> Self {
        let repositories = in_memory_repositories(Arc::new(InMemoryStore::new()));
        let notifications = Arc::new(RecordingNotificationSender::default());
        let state = HttpState::new(HttpStatePorts {
            repositories: repositories.clone(),
            invitations: Arc::new(RegistrationInvitationBackend::new(
                repositories.users.clone(),
                notifications.clone(),
            )),
            login: Arc::new(CredentialLoginService::new(repositories.users.clone())),
        });
        Self {
            repositories,
            notifications,
            state,
        }
    }

    /// Full API surface with a test session middleware.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(test_session_middleware())
            .configure(routes::configure)
    }

    pub async fn seed_user(&self, username: &str, is_staff: bool, password: Option<&str>) -> User {
        self.seed_user_with_email(username, None, is_staff, password).await
    }

    pub async fn seed_user_with_email(
        &self,
        username: &str,
        email: Option<&str>,
        is_staff: bool,
        password: Option<&str>,
    ) -> User {
        let profile = Profile {
            email: email.map(|raw| EmailAddress::new(raw).expect("valid email")),
            first_name: username.to_owned(),
            ..Profile::default()
        };
        let user = User::new(Username::new(username).expect("valid username"), profile)
            .with_staff(is_staff);
        let digest = password.map(|raw| PasswordDigest::hash(raw).expect("hash password"));
        self.repositories
            .users
            .create(&user, digest)
            .await
            .expect("seed user");
        user
    }

    /// Create an organization owned by `founder`.
    pub async fn seed_organization(&self, name: &str, founder: &User) -> FoundedOrganization {
        let founded = FoundedOrganization::new(
            name.to_owned(),
            crate::domain::slugify(name),
            true,
            founder.id,
        );
        self.repositories
            .organizations
            .create(&founded)
            .await
            .expect("seed organization");
        founded
    }

    pub async fn seed_membership(
        &self,
        founded: &FoundedOrganization,
        user: &User,
        is_admin: bool,
    ) -> OrganizationUser {
        let membership = OrganizationUser::new(user.id, founded.organization.id, is_admin);
        self.repositories
            .memberships
            .create(&membership)
            .await
            .expect("seed membership");
        membership
    }
}

/// Session cookie set by a response.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Log in through the API and return the session cookie.
pub async fn login<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let request = actix_web::test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(serde_json::json!({"username": username, "password": password}))
        .to_request();
    let response = actix_web::test::call_service(app, request).await;
    assert!(response.status().is_success(), "login failed: {}", response.status());
    session_cookie(&response)
}
