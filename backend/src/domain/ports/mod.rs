//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod address_repository;
mod invitation_backend;
mod login_service;
mod membership_repository;
mod notification_sender;
mod organization_repository;
mod team_repository;
mod user_repository;

#[cfg(test)]
pub use address_repository::MockAddressRepository;
pub use address_repository::{AddressPersistenceError, AddressRepository};
#[cfg(test)]
pub use invitation_backend::MockInvitationBackend;
pub use invitation_backend::InvitationBackend;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
pub use membership_repository::{MembershipPersistenceError, MembershipRepository};
#[cfg(test)]
pub use notification_sender::MockNotificationSender;
pub use notification_sender::{
    Notification, NotificationError, NotificationKind, NotificationSender,
};
#[cfg(test)]
pub use organization_repository::MockOrganizationRepository;
pub use organization_repository::{OrganizationPersistenceError, OrganizationRepository};
#[cfg(test)]
pub use team_repository::MockTeamRepository;
pub use team_repository::{TeamPersistenceError, TeamRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
