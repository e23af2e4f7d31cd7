//! Domain primitives, authorization rules and services.
//!
//! Purpose: Define strongly typed entities for the organization, team and
//! identity stores, the pure access predicates deciding staff / owner /
//! admin / self permissions, and the services that combine them with the
//! persistence ports. Nothing here depends on Actix or Diesel.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User, Organization, Team and friends: persisted entities.
//! - `*Service`: use-cases invoked by the HTTP adapter.

pub mod access;
pub mod address;
pub mod auth;
pub mod error;
pub mod ids;
pub mod organization;
pub mod ports;
pub mod slug;
pub mod team;
pub mod trace_id;
pub mod user;

mod address_service;
mod credential_login;
mod directory_service;
mod invitation_service;
mod membership_service;
mod organization_service;
mod service_support;
mod team_service;
mod user_service;

pub use self::access::OrganizationStanding;
pub use self::address::{Address, AddressChanges, AddressFields};
pub use self::address_service::AddressService;
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordDigest, PasswordHashError};
pub use self::credential_login::CredentialLoginService;
pub use self::directory_service::{
    AddressDetail, DirectoryService, MembershipDetail, OrganizationDetail, OwnerDetail,
    TeamDetail, TeamMemberDetail, UserDetail,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    AddressId, OrganizationId, OrganizationOwnerId, OrganizationUserId, TeamId, TeamMemberId,
    UserId,
};
pub use self::invitation_service::RegistrationInvitationBackend;
pub use self::membership_service::{MembershipChanges, MembershipDraft, MembershipService};
pub use self::organization::{
    FoundedOrganization, NameValidationError, Organization, OrganizationOwner, OrganizationUser,
};
pub use self::organization_service::{
    OrganizationChanges, OrganizationDraft, OrganizationService,
};
pub use self::service_support::Repositories;
pub use self::slug::{slugify, unique_slug};
pub use self::team::{Team, TeamMember};
pub use self::team_service::{
    TeamChanges, TeamDraft, TeamMemberChanges, TeamMemberDraft, TeamService,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, Gender, PhoneNumber, Profile, ProfileChanges, Salutation, User,
    UserValidationError, Username,
};
pub use self::user_service::{NewUser, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use employee_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
