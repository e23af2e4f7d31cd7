//! Invitation backend creating placeholder accounts for invitees.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    InvitationBackend, Notification, NotificationKind, NotificationSender, UserRepository,
};
use crate::domain::service_support::map_user_error;
use crate::domain::user::USERNAME_MAX;
use crate::domain::{EmailAddress, Error, Organization, Profile, User, Username};

const SUFFIX_LEN: usize = 8;

/// Registers inactive accounts for unknown emails and notifies members
/// through a [`NotificationSender`].
#[derive(Clone)]
pub struct RegistrationInvitationBackend {
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl RegistrationInvitationBackend {
    /// Create a backend over the user store and a notification channel.
    pub fn new(users: Arc<dyn UserRepository>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { users, notifier }
    }

    async fn deliver(&self, notification: Notification) {
        if let Err(error) = self.notifier.send(&notification).await {
            warn!(%error, kind = ?notification.kind, "notification delivery failed");
        }
    }
}

fn display_name(user: &User) -> &str {
    if user.profile.name.trim().is_empty() {
        user.username.as_ref()
    } else {
        user.profile.name.as_str()
    }
}

/// Username for an invitee: the sanitised local part of the email plus a
/// random suffix, so repeated invitations never collide.
fn placeholder_username(email: &EmailAddress) -> Result<Username, Error> {
    let stem: String = email
        .local_part()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '.' | '@' | '+' | '-' | '_'))
        .take(USERNAME_MAX - SUFFIX_LEN - 1)
        .collect();
    let stem = if stem.is_empty() { "invitee".to_owned() } else { stem };
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(SUFFIX_LEN).collect();
    Username::new(format!("{stem}-{suffix}"))
        .map_err(|err| Error::internal(format!("placeholder username rejected: {err}")))
}

#[async_trait]
impl InvitationBackend for RegistrationInvitationBackend {
    async fn register_invitee(
        &self,
        email: &EmailAddress,
        organization: &Organization,
        sender: &User,
    ) -> Result<User, Error> {
        let profile = Profile {
            email: Some(email.clone()),
            ..Profile::default()
        };
        let user = User::new(placeholder_username(email)?, profile).with_active(false);
        self.users
            .create(&user, None)
            .await
            .map_err(map_user_error)?;
        info!(
            user_id = %user.id,
            organization_id = %organization.id,
            invited_by = %sender.id,
            "invited user registered"
        );
        Ok(user)
    }

    async fn withdraw_invitee(&self, invitee: &User) -> Result<(), Error> {
        if invitee.is_active {
            return Err(Error::internal("refusing to withdraw an active account"));
        }
        self.users
            .delete(&invitee.id)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %invitee.id, "invited user withdrawn");
        Ok(())
    }

    async fn send_invitation(
        &self,
        invitee: &User,
        organization: &Organization,
        sender: &User,
    ) -> Result<(), Error> {
        let Some(recipient) = invitee.email() else {
            debug!(user_id = %invitee.id, "skipping invitation for user without email");
            return Ok(());
        };
        self.deliver(Notification {
            kind: NotificationKind::Invitation,
            recipient: recipient.to_owned(),
            subject: format!("You've been invited to join {}", organization.name),
            body: format!(
                "{} has invited you to join {}. Activate your account to get started.",
                display_name(sender),
                organization.name
            ),
        })
        .await;
        Ok(())
    }

    async fn send_notification(
        &self,
        user: &User,
        organization: &Organization,
        sender: &User,
    ) -> Result<(), Error> {
        if !user.is_active {
            debug!(user_id = %user.id, "skipping notification for inactive user");
            return Ok(());
        }
        let Some(recipient) = user.email() else {
            debug!(user_id = %user.id, "skipping notification for user without email");
            return Ok(());
        };
        self.deliver(Notification {
            kind: NotificationKind::MembershipAdded,
            recipient: recipient.to_owned(),
            subject: format!("You've been added to {}", organization.name),
            body: format!(
                "{} has added you to {}.",
                display_name(sender),
                organization.name
            ),
        })
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FoundedOrganization;
    use crate::domain::ports::{MockNotificationSender, MockUserRepository, NotificationError};
    use rstest::{fixture, rstest};

    #[fixture]
    fn sender() -> User {
        let mut user = User::new(Username::new("alice").expect("valid username"), Profile::default());
        user.profile.name = "Alice Admin".to_owned();
        user
    }

    #[fixture]
    fn organization(sender: User) -> Organization {
        FoundedOrganization::new("Acme".to_owned(), "acme".to_owned(), true, sender.id).organization
    }

    #[rstest]
    fn placeholder_usernames_keep_the_local_part() {
        let email = EmailAddress::new("bob.smith@example.com").expect("valid email");
        let username = placeholder_username(&email).expect("valid username");
        assert!(username.as_ref().starts_with("bob.smith-"));
        assert_eq!(username.as_ref().len(), "bob.smith-".len() + SUFFIX_LEN);
    }

    #[rstest]
    #[tokio::test]
    async fn registering_an_invitee_stores_an_inactive_user_silently(
        sender: User,
        organization: Organization,
    ) {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|user, password| !user.is_active && password.is_none())
            .times(1)
            .return_once(|_, _| Ok(()));
        let mut notifier = MockNotificationSender::new();
        notifier.expect_send().never();

        let backend = RegistrationInvitationBackend::new(Arc::new(users), Arc::new(notifier));
        let email = EmailAddress::new("bob@example.com").expect("valid email");
        let invited = backend
            .register_invitee(&email, &organization, &sender)
            .await
            .expect("registration succeeds");
        assert_eq!(invited.email(), Some("bob@example.com"));
        assert!(!invited.is_active);
    }

    #[rstest]
    #[tokio::test]
    async fn invitations_go_to_the_invitee_email(sender: User, organization: Organization) {
        let mut notifier = MockNotificationSender::new();
        notifier
            .expect_send()
            .withf(|n| {
                n.kind == NotificationKind::Invitation
                    && n.recipient == "bob@example.com"
                    && n.body.starts_with("Alice Admin")
            })
            .times(1)
            .return_once(|_| Ok(()));
        let backend = RegistrationInvitationBackend::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(notifier),
        );
        let mut invitee = User::new(Username::new("bob-1a2b3c4d").expect("valid"), Profile::default())
            .with_active(false);
        invitee.profile.email = Some(EmailAddress::new("bob@example.com").expect("valid"));

        backend
            .send_invitation(&invitee, &organization, &sender)
            .await
            .expect("delivery succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn withdrawing_deletes_only_inactive_accounts(sender: User) {
        let invitee = User::new(Username::new("bob-1a2b3c4d").expect("valid"), Profile::default())
            .with_active(false);
        let invitee_id = invitee.id;
        let mut users = MockUserRepository::new();
        users
            .expect_delete()
            .withf(move |id| *id == invitee_id)
            .times(1)
            .return_once(|_| Ok(true));
        let backend = RegistrationInvitationBackend::new(
            Arc::new(users),
            Arc::new(MockNotificationSender::new()),
        );

        backend.withdraw_invitee(&invitee).await.expect("withdrawn");
        let err = backend
            .withdraw_invitee(&sender)
            .await
            .expect_err("active accounts stay");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn inactive_users_are_not_notified(sender: User, organization: Organization) {
        let mut notifier = MockNotificationSender::new();
        notifier.expect_send().never();
        let backend = RegistrationInvitationBackend::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(notifier),
        );
        let mut invitee = User::new(Username::new("bob").expect("valid"), Profile::default())
            .with_active(false);
        invitee.profile.email = Some(EmailAddress::new("bob@example.com").expect("valid"));

        backend
            .send_notification(&invitee, &organization, &sender)
            .await
            .expect("skip succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn delivery_failures_do_not_fail_the_request(sender: User, organization: Organization) {
        let mut notifier = MockNotificationSender::new();
        notifier
            .expect_send()
            .times(1)
            .return_once(|_| Err(NotificationError::unavailable("webhook down")));
        let backend = RegistrationInvitationBackend::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(notifier),
        );
        let mut member = User::new(Username::new("carol").expect("valid"), Profile::default());
        member.profile.email = Some(EmailAddress::new("carol@example.com").expect("valid"));

        assert!(
            backend
                .send_notification(&member, &organization, &sender)
                .await
                .is_ok()
        );
    }
}
