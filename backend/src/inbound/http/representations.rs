//! Response bodies for the two API versions.
//!
//! `v1` bodies reference related records by id; `v2` bodies embed them. The
//! `render_*` helpers pick the shape from the request's [`ApiVersion`] and,
//! for `v2`, ask the [`DirectoryService`] to load the relations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Address, AddressDetail, AddressFields, DirectoryService, Error, MembershipDetail,
    Organization, OrganizationDetail, OrganizationOwner, OrganizationUser, OwnerDetail, Team,
    TeamDetail, TeamMember, TeamMemberDetail, User, UserDetail,
};
use crate::inbound::http::version::ApiVersion;

/// Either representation of a resource, serialised without a tag.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Versioned<S, N> {
    Simple(S),
    Nested(N),
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProfileBody {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: String,
    #[schema(example = "mrs")]
    pub salutation: Option<String>,
    #[schema(example = "female")]
    pub gender: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for ProfileBody {
    fn from(user: &User) -> Self {
        let profile = &user.profile;
        Self {
            id: *user.id.as_uuid(),
            username: user.username.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            bio: profile.bio.clone(),
            salutation: profile.salutation.map(|s| s.as_str().to_owned()),
            gender: profile.gender.map(|g| g.as_str().to_owned()),
            date_joined: user.date_joined,
        }
    }
}

/// Organization without relations.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrganizationV1 {
    pub id: Uuid,
    #[schema(example = "Test Organization")]
    pub name: String,
    #[schema(example = "test-organization")]
    pub slug: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<&Organization> for OrganizationV1 {
    fn from(organization: &Organization) -> Self {
        Self {
            id: *organization.id.as_uuid(),
            name: organization.name.clone(),
            slug: organization.slug.clone(),
            is_active: organization.is_active,
            created: organization.created,
            modified: organization.modified,
        }
    }
}

/// Organization with the profiles of its members.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrganizationV2 {
    #[serde(flatten)]
    pub organization: OrganizationV1,
    pub users_nested: Vec<ProfileBody>,
}

impl From<&OrganizationDetail> for OrganizationV2 {
    fn from(detail: &OrganizationDetail) -> Self {
        Self {
            organization: OrganizationV1::from(&detail.organization),
            users_nested: detail.users.iter().map(ProfileBody::from).collect(),
        }
    }
}

/// Organization membership referencing user and organization by id.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrganizationUserV1 {
    pub id: Uuid,
    pub is_admin: bool,
    pub user: Uuid,
    pub organization: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<&OrganizationUser> for OrganizationUserV1 {
    fn from(membership: &OrganizationUser) -> Self {
        Self {
            id: *membership.id.as_uuid(),
            is_admin: membership.is_admin,
            user: *membership.user_id.as_uuid(),
            organization: *membership.organization_id.as_uuid(),
            created: membership.created,
            modified: membership.modified,
        }
    }
}

/// Organization membership with the user profile and organization embedded.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrganizationUserV2 {
    pub id: Uuid,
    pub is_admin: bool,
    pub user_nested: ProfileBody,
    pub organization_nested: OrganizationV2,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<&MembershipDetail> for OrganizationUserV2 {
    fn from(detail: &MembershipDetail) -> Self {
        let membership = &detail.membership;
        Self {
            id: *membership.id.as_uuid(),
            is_admin: membership.is_admin,
            user_nested: ProfileBody::from(&detail.user),
            organization_nested: OrganizationV2::from(&detail.organization),
            created: membership.created,
            modified: membership.modified,
        }
    }
}

/// Owner record referencing the owning membership by id.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OwnerV1 {
    pub id: Uuid,
    pub organization_user: Uuid,
    pub organization: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<&OrganizationOwner> for OwnerV1 {
    fn from(owner: &OrganizationOwner) -> Self {
        Self {
            id: *owner.id.as_uuid(),
            organization_user: *owner.organization_user_id.as_uuid(),
            organization: *owner.organization_id.as_uuid(),
            created: owner.created,
            modified: owner.modified,
        }
    }
}

/// Owner record with membership and organization embedded.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OwnerV2 {
    pub id: Uuid,
    pub organization_user_nested: OrganizationUserV1,
    pub organization_nested: OrganizationV2,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<&OwnerDetail> for OwnerV2 {
    fn from(detail: &OwnerDetail) -> Self {
        Self {
            id: *detail.owner.id.as_uuid(),
            organization_user_nested: OrganizationUserV1::from(&detail.membership),
            organization_nested: OrganizationV2::from(&detail.organization),
            created: detail.owner.created,
            modified: detail.owner.modified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamV1 {
    pub id: Uuid,
    pub organization: Uuid,
    #[schema(example = "Platform")]
    pub name: String,
}

impl From<&Team> for TeamV1 {
    fn from(team: &Team) -> Self {
        Self {
            id: *team.id.as_uuid(),
            organization: *team.organization_id.as_uuid(),
            name: team.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamV2 {
    pub id: Uuid,
    pub organization_nested: OrganizationV2,
    pub name: String,
}

impl From<&TeamDetail> for TeamV2 {
    fn from(detail: &TeamDetail) -> Self {
        Self {
            id: *detail.team.id.as_uuid(),
            organization_nested: OrganizationV2::from(&detail.organization),
            name: detail.team.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamMemberV1 {
    pub id: Uuid,
    pub team: Uuid,
    pub organization_user: Uuid,
    pub is_admin: bool,
}

impl From<&TeamMember> for TeamMemberV1 {
    fn from(member: &TeamMember) -> Self {
        Self {
            id: *member.id.as_uuid(),
            team: *member.team_id.as_uuid(),
            organization_user: *member.organization_user_id.as_uuid(),
            is_admin: member.is_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamMemberV2 {
    pub id: Uuid,
    pub organization_user_nested: OrganizationUserV2,
    pub team_nested: TeamV1,
    pub is_admin: bool,
}

impl From<&TeamMemberDetail> for TeamMemberV2 {
    fn from(detail: &TeamMemberDetail) -> Self {
        Self {
            id: *detail.member.id.as_uuid(),
            organization_user_nested: OrganizationUserV2::from(&detail.organization_user),
            team_nested: TeamV1::from(&detail.team),
            is_admin: detail.member.is_admin,
        }
    }
}

/// Full account view, only ever shown to the account holder.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserV1 {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: String,
    pub salutation: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_home: Option<String>,
    pub phone_work: Option<String>,
    pub mobile: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for UserV1 {
    fn from(user: &User) -> Self {
        let profile = &user.profile;
        let phone = |value: &Option<crate::domain::PhoneNumber>| {
            value.as_ref().map(|number| number.as_ref().to_owned())
        };
        Self {
            id: *user.id.as_uuid(),
            username: user.username.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            name: profile.name.clone(),
            email: user.email().map(str::to_owned),
            avatar: profile.avatar.clone(),
            bio: profile.bio.clone(),
            salutation: profile.salutation.map(|s| s.as_str().to_owned()),
            date_of_birth: profile.date_of_birth,
            gender: profile.gender.map(|g| g.as_str().to_owned()),
            phone_home: phone(&profile.phone_home),
            phone_work: phone(&profile.phone_work),
            mobile: phone(&profile.mobile),
            date_joined: user.date_joined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserV2 {
    #[serde(flatten)]
    pub user: UserV1,
    pub address_nested: Vec<AddressV2>,
}

impl From<&UserDetail> for UserV2 {
    fn from(detail: &UserDetail) -> Self {
        Self {
            user: UserV1::from(&detail.user),
            address_nested: detail
                .addresses
                .iter()
                .map(|address| AddressV2::new(address, &detail.user))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AddressFieldsBody {
    #[schema(example = "1 High Street")]
    pub address1: String,
    pub address2: String,
    pub area: String,
    #[schema(example = "London")]
    pub city: String,
    pub county: String,
    pub postcode: String,
    pub country: String,
}

impl From<&AddressFields> for AddressFieldsBody {
    fn from(fields: &AddressFields) -> Self {
        Self {
            address1: fields.address1.clone(),
            address2: fields.address2.clone(),
            area: fields.area.clone(),
            city: fields.city.clone(),
            county: fields.county.clone(),
            postcode: fields.postcode.clone(),
            country: fields.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AddressV1 {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(flatten)]
    pub fields: AddressFieldsBody,
}

impl From<&Address> for AddressV1 {
    fn from(address: &Address) -> Self {
        Self {
            id: *address.id.as_uuid(),
            user: *address.user_id.as_uuid(),
            fields: AddressFieldsBody::from(&address.fields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AddressV2 {
    pub id: Uuid,
    pub user_nested: ProfileBody,
    #[serde(flatten)]
    pub fields: AddressFieldsBody,
}

impl AddressV2 {
    fn new(address: &Address, owner: &User) -> Self {
        Self {
            id: *address.id.as_uuid(),
            user_nested: ProfileBody::from(owner),
            fields: AddressFieldsBody::from(&address.fields),
        }
    }
}

impl From<&AddressDetail> for AddressV2 {
    fn from(detail: &AddressDetail) -> Self {
        Self::new(&detail.address, &detail.user)
    }
}

fn all<'a, T: 'a, B: From<&'a T>>(items: &'a [T]) -> Vec<B> {
    items.iter().map(B::from).collect()
}

pub(crate) type OrganizationBody = Versioned<OrganizationV1, OrganizationV2>;
pub(crate) type OrganizationUserBody = Versioned<OrganizationUserV1, OrganizationUserV2>;
pub(crate) type OwnerBody = Versioned<OwnerV1, OwnerV2>;
pub(crate) type TeamBody = Versioned<TeamV1, TeamV2>;
pub(crate) type TeamMemberBody = Versioned<TeamMemberV1, TeamMemberV2>;
pub(crate) type UserBody = Versioned<UserV1, UserV2>;
pub(crate) type AddressBody = Versioned<AddressV1, AddressV2>;

pub(crate) async fn render_organizations(
    directory: &DirectoryService,
    version: ApiVersion,
    items: Vec<Organization>,
) -> Result<Versioned<Vec<OrganizationV1>, Vec<OrganizationV2>>, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(all(&items)),
        ApiVersion::V2 => Versioned::Nested(all(&directory.organizations(items).await?)),
    })
}

pub(crate) async fn render_organization(
    directory: &DirectoryService,
    version: ApiVersion,
    item: Organization,
) -> Result<OrganizationBody, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(OrganizationV1::from(&item)),
        ApiVersion::V2 => Versioned::Nested(OrganizationV2::from(&directory.organization(item).await?)),
    })
}

pub(crate) async fn render_memberships(
    directory: &DirectoryService,
    version: ApiVersion,
    items: Vec<OrganizationUser>,
) -> Result<Versioned<Vec<OrganizationUserV1>, Vec<OrganizationUserV2>>, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(all(&items)),
        ApiVersion::V2 => Versioned::Nested(all(&directory.memberships(items).await?)),
    })
}

pub(crate) async fn render_membership(
    directory: &DirectoryService,
    version: ApiVersion,
    item: OrganizationUser,
) -> Result<OrganizationUserBody, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(OrganizationUserV1::from(&item)),
        ApiVersion::V2 => {
            Versioned::Nested(OrganizationUserV2::from(&directory.membership(item).await?))
        }
    })
}

pub(crate) async fn render_owner(
    directory: &DirectoryService,
    version: ApiVersion,
    item: OrganizationOwner,
) -> Result<OwnerBody, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(OwnerV1::from(&item)),
        ApiVersion::V2 => Versioned::Nested(OwnerV2::from(&directory.owner(item).await?)),
    })
}

pub(crate) async fn render_teams(
    directory: &DirectoryService,
    version: ApiVersion,
    items: Vec<Team>,
) -> Result<Versioned<Vec<TeamV1>, Vec<TeamV2>>, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(all(&items)),
        ApiVersion::V2 => Versioned::Nested(all(&directory.teams(items).await?)),
    })
}

pub(crate) async fn render_team(
    directory: &DirectoryService,
    version: ApiVersion,
    item: Team,
) -> Result<TeamBody, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(TeamV1::from(&item)),
        ApiVersion::V2 => Versioned::Nested(TeamV2::from(&directory.team(item).await?)),
    })
}

pub(crate) async fn render_team_members(
    directory: &DirectoryService,
    version: ApiVersion,
    items: Vec<TeamMember>,
) -> Result<Versioned<Vec<TeamMemberV1>, Vec<TeamMemberV2>>, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(all(&items)),
        ApiVersion::V2 => Versioned::Nested(all(&directory.team_members(items).await?)),
    })
}

pub(crate) async fn render_team_member(
    directory: &DirectoryService,
    version: ApiVersion,
    item: TeamMember,
) -> Result<TeamMemberBody, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(TeamMemberV1::from(&item)),
        ApiVersion::V2 => Versioned::Nested(TeamMemberV2::from(&directory.team_member(item).await?)),
    })
}

pub(crate) async fn render_users(
    directory: &DirectoryService,
    version: ApiVersion,
    items: Vec<User>,
) -> Result<Versioned<Vec<UserV1>, Vec<UserV2>>, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(all(&items)),
        ApiVersion::V2 => Versioned::Nested(all(&directory.users(items).await?)),
    })
}

pub(crate) async fn render_user(
    directory: &DirectoryService,
    version: ApiVersion,
    item: User,
) -> Result<UserBody, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(UserV1::from(&item)),
        ApiVersion::V2 => Versioned::Nested(UserV2::from(&directory.user(item).await?)),
    })
}

pub(crate) async fn render_addresses(
    directory: &DirectoryService,
    version: ApiVersion,
    items: Vec<Address>,
) -> Result<Versioned<Vec<AddressV1>, Vec<AddressV2>>, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(all(&items)),
        ApiVersion::V2 => Versioned::Nested(all(&directory.addresses(items).await?)),
    })
}

pub(crate) async fn render_address(
    directory: &DirectoryService,
    version: ApiVersion,
    item: Address,
) -> Result<AddressBody, Error> {
    Ok(match version {
        ApiVersion::V1 => Versioned::Simple(AddressV1::from(&item)),
        ApiVersion::V2 => Versioned::Nested(AddressV2::from(&directory.address(item).await?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FoundedOrganization, Profile, UserId, Username};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn alice() -> User {
        User::new(
            Username::new("alice").expect("valid username"),
            Profile {
                first_name: "Alice".to_owned(),
                ..Profile::default()
            },
        )
        .with_staff(true)
    }

    fn keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value
            .as_object()
            .expect("object body")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    #[rstest]
    fn organization_v2_adds_member_profiles() {
        let user = alice();
        let founded = FoundedOrganization::new(
            "Test Organization".to_owned(),
            "test-organization".to_owned(),
            true,
            user.id,
        );
        let detail = OrganizationDetail {
            organization: founded.organization.clone(),
            users: vec![user.clone()],
        };

        let simple = serde_json::to_value(OrganizationV1::from(&founded.organization))
            .expect("serialise v1");
        let nested = serde_json::to_value(OrganizationV2::from(&detail)).expect("serialise v2");

        assert_eq!(
            keys(&simple),
            ["created", "id", "is_active", "modified", "name", "slug"]
        );
        assert_eq!(nested["slug"], json!("test-organization"));
        assert_eq!(nested["users_nested"][0]["username"], json!("alice"));
        assert!(nested["users_nested"][0].get("email").is_none());
    }

    #[rstest]
    fn membership_v1_references_ids() {
        let user_id = UserId::random();
        let founded =
            FoundedOrganization::new("Acme".to_owned(), "acme".to_owned(), true, user_id);
        let body = serde_json::to_value(OrganizationUserV1::from(&founded.membership))
            .expect("serialise");
        assert_eq!(body["user"], json!(user_id.to_string()));
        assert_eq!(body["organization"], json!(founded.organization.id.to_string()));
        assert_eq!(body["is_admin"], json!(true));
    }

    #[rstest]
    fn user_v2_nests_addresses_with_owner_profile() {
        let user = alice();
        let address = Address::new(
            user.id,
            AddressFields {
                address1: "1 High Street".to_owned(),
                city: "London".to_owned(),
                ..AddressFields::default()
            },
        );
        let detail = UserDetail {
            user: user.clone(),
            addresses: vec![address],
        };

        let body = serde_json::to_value(UserV2::from(&detail)).expect("serialise");
        assert_eq!(body["username"], json!("alice"));
        assert_eq!(body["address_nested"][0]["city"], json!("London"));
        assert_eq!(
            body["address_nested"][0]["user_nested"]["id"],
            json!(user.id.to_string())
        );
    }

    #[rstest]
    fn versioned_bodies_serialise_untagged() {
        let team = Team::new(crate::domain::OrganizationId::random(), "Platform".to_owned());
        let body: TeamBody = Versioned::Simple(TeamV1::from(&team));
        let value = serde_json::to_value(body).expect("serialise");
        assert_eq!(keys(&value), ["id", "name", "organization"]);
    }
}
