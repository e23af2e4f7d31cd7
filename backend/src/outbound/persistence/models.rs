//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; repositories convert them to and
//! from domain types, re-validating stored strings on the way out.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Address, AddressFields, AddressId, EmailAddress, Organization, OrganizationId,
    OrganizationOwner, OrganizationOwnerId, OrganizationUser, OrganizationUserId, PhoneNumber,
    Profile, Team, TeamId, TeamMember, TeamMemberId, User, UserId, Username,
};

use super::schema::{
    addresses, organization_owners, organization_users, organizations, team_members, teams, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: String,
    pub salutation: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_home: Option<String>,
    pub phone_work: Option<String>,
    pub mobile: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

fn phone(field: &'static str, value: Option<String>) -> Result<Option<PhoneNumber>, String> {
    value
        .map(|raw| PhoneNumber::parse(field, raw))
        .transpose()
        .map_err(|err| err.to_string())
}

impl UserRow {
    /// Convert to the domain user, dropping the password hash.
    pub(crate) fn into_user(self) -> Result<User, String> {
        let username = Username::new(self.username).map_err(|err| err.to_string())?;
        let email = self
            .email
            .map(EmailAddress::new)
            .transpose()
            .map_err(|err| err.to_string())?;
        let salutation = self
            .salutation
            .map(|raw| raw.parse())
            .transpose()
            .map_err(|err: crate::domain::UserValidationError| err.to_string())?;
        let gender = self
            .gender
            .map(|raw| raw.parse())
            .transpose()
            .map_err(|err: crate::domain::UserValidationError| err.to_string())?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            username,
            profile: Profile {
                email,
                first_name: self.first_name,
                last_name: self.last_name,
                name: self.name,
                avatar: self.avatar,
                bio: self.bio,
                salutation,
                gender,
                date_of_birth: self.date_of_birth,
                phone_home: phone("phone_home", self.phone_home)?,
                phone_work: phone("phone_work", self.phone_work)?,
                mobile: phone("mobile", self.mobile)?,
            },
            is_staff: self.is_staff,
            is_active: self.is_active,
            date_joined: self.date_joined,
        })
    }
}

/// Insertable user; `password_hash` is only ever written here.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: Option<&'a str>,
    pub email: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub name: &'a str,
    pub avatar: Option<&'a str>,
    pub bio: &'a str,
    pub salutation: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_home: Option<&'a str>,
    pub phone_work: Option<&'a str>,
    pub mobile: Option<&'a str>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn new(user: &'a User, password_hash: Option<&'a str>) -> Self {
        let changes = UserUpdate::from(user);
        Self {
            id: *user.id.as_uuid(),
            username: changes.username,
            password_hash,
            email: changes.email,
            first_name: changes.first_name,
            last_name: changes.last_name,
            name: changes.name,
            avatar: changes.avatar,
            bio: changes.bio,
            salutation: changes.salutation,
            gender: changes.gender,
            date_of_birth: changes.date_of_birth,
            phone_home: changes.phone_home,
            phone_work: changes.phone_work,
            mobile: changes.mobile,
            is_staff: changes.is_staff,
            is_active: changes.is_active,
            date_joined: user.date_joined,
        }
    }
}

/// Changeset for user updates. `None` clears nullable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub name: &'a str,
    pub avatar: Option<&'a str>,
    pub bio: &'a str,
    pub salutation: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_home: Option<&'a str>,
    pub phone_work: Option<&'a str>,
    pub mobile: Option<&'a str>,
    pub is_staff: bool,
    pub is_active: bool,
}

impl<'a> From<&'a User> for UserUpdate<'a> {
    fn from(user: &'a User) -> Self {
        let profile = &user.profile;
        Self {
            username: user.username.as_ref(),
            email: profile.email.as_ref().map(AsRef::as_ref),
            first_name: &profile.first_name,
            last_name: &profile.last_name,
            name: &profile.name,
            avatar: profile.avatar.as_deref(),
            bio: &profile.bio,
            salutation: profile.salutation.map(|value| value.as_str()),
            gender: profile.gender.map(|value| value.as_str()),
            date_of_birth: profile.date_of_birth,
            phone_home: profile.phone_home.as_ref().map(AsRef::as_ref),
            phone_work: profile.phone_work.as_ref().map(AsRef::as_ref),
            mobile: profile.mobile.as_ref().map(AsRef::as_ref),
            is_staff: user.is_staff,
            is_active: user.is_active,
        }
    }
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address1: String,
    pub address2: String,
    pub area: String,
    pub city: String,
    pub county: String,
    pub postcode: String,
    pub country: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = addresses)]
pub(crate) struct AddressUpdate<'a> {
    pub address1: &'a str,
    pub address2: &'a str,
    pub area: &'a str,
    pub city: &'a str,
    pub county: &'a str,
    pub postcode: &'a str,
    pub country: &'a str,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            fields: AddressFields {
                address1: row.address1,
                address2: row.address2,
                area: row.area,
                city: row.city,
                county: row.county,
                postcode: row.postcode,
                country: row.country,
            },
        }
    }
}

impl From<&Address> for AddressRow {
    fn from(address: &Address) -> Self {
        let fields = address.fields.clone();
        Self {
            id: *address.id.as_uuid(),
            user_id: *address.user_id.as_uuid(),
            address1: fields.address1,
            address2: fields.address2,
            area: fields.area,
            city: fields.city,
            county: fields.county,
            postcode: fields.postcode,
            country: fields.country,
        }
    }
}

impl<'a> From<&'a Address> for AddressUpdate<'a> {
    fn from(address: &'a Address) -> Self {
        let fields = &address.fields;
        Self {
            address1: &fields.address1,
            address2: &fields.address2,
            area: &fields.area,
            city: &fields.city,
            county: &fields.county,
            postcode: &fields.postcode,
            country: &fields.country,
        }
    }
}

// ---------------------------------------------------------------------------
// Organizations, memberships and owners
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Slugs are fixed at creation, so only these columns change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organizations)]
pub(crate) struct OrganizationUpdate<'a> {
    pub name: &'a str,
    pub is_active: bool,
    pub modified: DateTime<Utc>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Self {
            id: OrganizationId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            is_active: row.is_active,
            created: row.created,
            modified: row.modified,
        }
    }
}

impl From<&Organization> for OrganizationRow {
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

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = organization_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationUserRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub is_admin: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organization_users)]
pub(crate) struct OrganizationUserUpdate {
    pub is_admin: bool,
    pub modified: DateTime<Utc>,
}

impl From<OrganizationUserRow> for OrganizationUser {
    fn from(row: OrganizationUserRow) -> Self {
        Self {
            id: OrganizationUserId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            is_admin: row.is_admin,
            created: row.created,
            modified: row.modified,
        }
    }
}

impl From<&OrganizationUser> for OrganizationUserRow {
    fn from(membership: &OrganizationUser) -> Self {
        Self {
            id: *membership.id.as_uuid(),
            user_id: *membership.user_id.as_uuid(),
            organization_id: *membership.organization_id.as_uuid(),
            is_admin: membership.is_admin,
            created: membership.created,
            modified: membership.modified,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = organization_owners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationOwnerRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organization_user_id: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<OrganizationOwnerRow> for OrganizationOwner {
    fn from(row: OrganizationOwnerRow) -> Self {
        Self {
            id: OrganizationOwnerId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            organization_user_id: OrganizationUserId::from_uuid(row.organization_user_id),
            created: row.created,
            modified: row.modified,
        }
    }
}

impl From<&OrganizationOwner> for OrganizationOwnerRow {
    fn from(owner: &OrganizationOwner) -> Self {
        Self {
            id: *owner.id.as_uuid(),
            organization_id: *owner.organization_id.as_uuid(),
            organization_user_id: *owner.organization_user_id.as_uuid(),
            created: owner.created,
            modified: owner.modified,
        }
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeamRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = teams)]
pub(crate) struct TeamUpdate<'a> {
    pub organization_id: Uuid,
    pub name: &'a str,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Self {
            id: TeamId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            name: row.name,
        }
    }
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            id: *team.id.as_uuid(),
            organization_id: *team.organization_id.as_uuid(),
            name: team.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeamMemberRow {
    pub id: Uuid,
    pub team_id: Uuid,
    pub organization_user_id: Uuid,
    pub is_admin: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = team_members)]
pub(crate) struct TeamMemberUpdate {
    pub team_id: Uuid,
    pub is_admin: bool,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            id: TeamMemberId::from_uuid(row.id),
            team_id: TeamId::from_uuid(row.team_id),
            organization_user_id: OrganizationUserId::from_uuid(row.organization_user_id),
            is_admin: row.is_admin,
        }
    }
}

impl From<&TeamMember> for TeamMemberRow {
    fn from(member: &TeamMember) -> Self {
        Self {
            id: *member.id.as_uuid(),
            team_id: *member.team_id.as_uuid(),
            organization_user_id: *member.organization_user_id.as_uuid(),
            is_admin: member.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stored_user() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "dana".to_owned(),
            password_hash: Some("$argon2id$stub".to_owned()),
            email: Some("dana@example.com".to_owned()),
            first_name: "Dana".to_owned(),
            last_name: "Scully".to_owned(),
            name: String::new(),
            avatar: None,
            bio: String::new(),
            salutation: Some("miss".to_owned()),
            gender: Some("female".to_owned()),
            date_of_birth: None,
            phone_home: Some("555-123-4567".to_owned()),
            phone_work: None,
            mobile: None,
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[rstest]
    fn user_rows_convert_to_domain_users() {
        let user = stored_user().into_user().expect("valid row");
        assert_eq!(user.username.as_ref(), "dana");
        assert_eq!(user.email(), Some("dana@example.com"));
        assert_eq!(user.profile.salutation.map(|s| s.as_str()), Some("miss"));
        assert!(user.profile.phone_home.is_some());
    }

    #[rstest]
    fn corrupt_user_rows_are_reported() {
        let mut row = stored_user();
        row.gender = Some("unknown".to_owned());
        let error = row.into_user().expect_err("invalid gender");
        assert!(error.contains("gender"));
    }

    #[rstest]
    fn user_changesets_mirror_the_profile() {
        let user = stored_user().into_user().expect("valid row");
        let insert = NewUserRow::new(&user, Some("hash"));
        assert_eq!(insert.username, "dana");
        assert_eq!(insert.password_hash, Some("hash"));
        assert_eq!(insert.gender, Some("female"));
        assert_eq!(insert.phone_home, Some("555-123-4567"));
    }
}
