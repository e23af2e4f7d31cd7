//! Port for inviting people into organizations.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, Organization, User};

/// Creates accounts for invitees and tells users about new memberships.
///
/// Registering an invitee and inviting them are separate steps so callers can
/// send the invitation only once the membership is stored, and withdraw the
/// account when it is not.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationBackend: Send + Sync {
    /// Create an inactive placeholder account for `email`, invited to
    /// `organization` by `sender`. Nothing is delivered yet.
    async fn register_invitee(
        &self,
        email: &EmailAddress,
        organization: &Organization,
        sender: &User,
    ) -> Result<User, Error>;

    /// Remove a placeholder account whose membership could not be stored.
    async fn withdraw_invitee(&self, invitee: &User) -> Result<(), Error>;

    /// Deliver the invitation to a registered invitee.
    async fn send_invitation(
        &self,
        invitee: &User,
        organization: &Organization,
        sender: &User,
    ) -> Result<(), Error>;

    /// Tell `user` they were added to `organization`. Inactive users are
    /// skipped since they have not accepted an invitation yet.
    async fn send_notification(
        &self,
        user: &User,
        organization: &Organization,
        sender: &User,
    ) -> Result<(), Error>;
}
