//! Organization use-cases: listing, founding, renaming and deleting tenants.

use chrono::Utc;
use tracing::info;

use crate::domain::access::{
    ensure_can_create_organization, ensure_can_delete_organization,
    ensure_can_update_organization,
};
use crate::domain::organization::validate_name;
use crate::domain::service_support::{
    NOT_FOUND, Repositories, map_organization_error, name_error,
};
use crate::domain::slug::{is_valid_slug, slug_stem, slugify, unique_slug};
use crate::domain::{Error, FoundedOrganization, Organization, OrganizationId, User};

/// Payload for founding an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationDraft {
    pub name: String,
    pub is_active: bool,
}

/// Writable organization attributes; `None` leaves a value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Organization service.
#[derive(Clone)]
pub struct OrganizationService {
    repos: Repositories,
}

impl OrganizationService {
    /// Create a new service over the shared repositories.
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Organizations the caller belongs to, newest first.
    pub async fn list(&self, caller: &User) -> Result<Vec<Organization>, Error> {
        self.repos
            .organizations
            .list_for_member(&caller.id)
            .await
            .map_err(map_organization_error)
    }

    /// One of the caller's organizations.
    pub async fn retrieve(&self, caller: &User, id: &OrganizationId) -> Result<Organization, Error> {
        self.repos.member_standing(Some(id), &caller.id).await?;
        self.repos
            .organizations
            .find_by_id(id)
            .await
            .map_err(map_organization_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    /// Found an organization owned by the (staff) caller.
    pub async fn create(
        &self,
        caller: &User,
        draft: OrganizationDraft,
    ) -> Result<Organization, Error> {
        let name = validate_name(&draft.name).map_err(|err| name_error(&err))?;
        ensure_can_create_organization(caller)?;

        let base = slugify(&name);
        let taken = self
            .repos
            .organizations
            .slugs_with_prefix(slug_stem(&base))
            .await
            .map_err(map_organization_error)?;
        let slug = unique_slug(&base, &taken);
        if !is_valid_slug(&slug) {
            return Err(Error::internal(format!("derived slug {slug} is malformed")));
        }

        let founded = FoundedOrganization::new(name, slug, draft.is_active, caller.id);
        self.repos
            .organizations
            .create(&founded)
            .await
            .map_err(map_organization_error)?;
        info!(
            organization_id = %founded.organization.id,
            slug = %founded.organization.slug,
            founder = %caller.id,
            "organization created"
        );
        Ok(founded.organization)
    }

    /// Update name or activity; only the owner may do so. The slug stays.
    pub async fn update(
        &self,
        caller: &User,
        id: &OrganizationId,
        changes: OrganizationChanges,
    ) -> Result<Organization, Error> {
        let mut organization = self.retrieve(caller, id).await?;
        let name = changes
            .name
            .as_deref()
            .map(validate_name)
            .transpose()
            .map_err(|err| name_error(&err))?;

        let standing = self.repos.standing(id, &caller.id).await?;
        ensure_can_update_organization(&standing)?;

        if let Some(name) = name {
            organization.name = name;
        }
        if let Some(is_active) = changes.is_active {
            organization.is_active = is_active;
        }
        organization.modified = Utc::now();
        self.repos
            .organizations
            .update(&organization)
            .await
            .map_err(map_organization_error)?;
        Ok(organization)
    }

    /// Delete an organization and everything scoped to it; staff only.
    pub async fn destroy(&self, caller: &User, id: &OrganizationId) -> Result<(), Error> {
        self.retrieve(caller, id).await?;
        ensure_can_delete_organization(caller)?;
        let deleted = self
            .repos
            .organizations
            .delete(id)
            .await
            .map_err(map_organization_error)?;
        if !deleted {
            return Err(Error::not_found(NOT_FOUND));
        }
        info!(organization_id = %id, deleted_by = %caller.id, "organization deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "organization_service_tests.rs"]
mod tests;
