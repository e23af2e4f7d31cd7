//! PostgreSQL-backed `TeamRepository` adapter covering teams and rosters.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TeamPersistenceError, TeamRepository};
use crate::domain::{OrganizationId, Team, TeamId, TeamMember, TeamMemberId};

use super::diesel_helpers::{DieselFailure, classify, pool_message};
use super::models::{TeamMemberRow, TeamMemberUpdate, TeamRow, TeamUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{team_members, teams};

/// Diesel-backed team store.
#[derive(Clone)]
pub struct DieselTeamRepository {
    pool: DbPool,
}

impl DieselTeamRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TeamPersistenceError {
    TeamPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> TeamPersistenceError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => TeamPersistenceError::connection(message),
        DieselFailure::UniqueViolation { .. } => TeamPersistenceError::duplicate_member(),
        DieselFailure::Query(message) => TeamPersistenceError::query(message),
    }
}

#[async_trait]
impl TeamRepository for DieselTeamRepository {
    async fn create(&self, team: &Team) -> Result<(), TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(teams::table)
            .values(&TeamRow::from(team))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert team"))
    }

    async fn update(&self, team: &Team) -> Result<(), TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(teams::table.find(*team.id.as_uuid()))
            .set(&TeamUpdate {
                organization_id: *team.organization_id.as_uuid(),
                name: &team.name,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "update team"))
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(teams::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(|err| map_diesel_error(err, "delete team"))
    }

    async fn find_by_id(&self, id: &TeamId) -> Result<Option<Team>, TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TeamRow> = teams::table
            .find(*id.as_uuid())
            .select(TeamRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find team"))?;
        Ok(row.map(Team::from))
    }

    async fn list_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Team>, TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TeamRow> = teams::table
            .filter(teams::organization_id.eq(*organization_id.as_uuid()))
            .select(TeamRow::as_select())
            .order_by(teams::name.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list teams"))?;
        Ok(rows.into_iter().map(Team::from).collect())
    }

    async fn add_member(&self, member: &TeamMember) -> Result<(), TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(team_members::table)
            .values(&TeamMemberRow::from(member))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert team member"))
    }

    async fn update_member(&self, member: &TeamMember) -> Result<(), TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(team_members::table.find(*member.id.as_uuid()))
            .set(&TeamMemberUpdate {
                team_id: *member.team_id.as_uuid(),
                is_admin: member.is_admin,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "update team member"))
    }

    async fn remove_member(&self, id: &TeamMemberId) -> Result<bool, TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(team_members::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(|err| map_diesel_error(err, "delete team member"))
    }

    async fn find_member(
        &self,
        id: &TeamMemberId,
    ) -> Result<Option<TeamMember>, TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TeamMemberRow> = team_members::table
            .find(*id.as_uuid())
            .select(TeamMemberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find team member"))?;
        Ok(row.map(TeamMember::from))
    }

    async fn list_members_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<TeamMember>, TeamPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TeamMemberRow> = team_members::table
            .inner_join(teams::table)
            .filter(teams::organization_id.eq(*organization_id.as_uuid()))
            .select(TeamMemberRow::as_select())
            .order_by((teams::name.asc(), team_members::id.asc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list team members"))?;
        Ok(rows.into_iter().map(TeamMember::from).collect())
    }
}
