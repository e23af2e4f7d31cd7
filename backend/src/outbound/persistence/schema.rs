//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User accounts and their profile attributes.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        /// Argon2 PHC string; null for invited accounts.
        password_hash -> Nullable<Text>,
        email -> Nullable<Varchar>,
        first_name -> Varchar,
        last_name -> Varchar,
        name -> Varchar,
        avatar -> Nullable<Varchar>,
        bio -> Text,
        salutation -> Nullable<Varchar>,
        gender -> Nullable<Varchar>,
        date_of_birth -> Nullable<Date>,
        phone_home -> Nullable<Varchar>,
        phone_work -> Nullable<Varchar>,
        mobile -> Nullable<Varchar>,
        is_staff -> Bool,
        is_active -> Bool,
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    addresses (id) {
        id -> Uuid,
        user_id -> Uuid,
        address1 -> Varchar,
        address2 -> Varchar,
        area -> Varchar,
        city -> Varchar,
        county -> Varchar,
        postcode -> Varchar,
        country -> Varchar,
    }
}

diesel::table! {
    organizations (id) {
        id -> Uuid,
        name -> Varchar,
        /// Unique, derived from the name at creation.
        slug -> Varchar,
        is_active -> Bool,
        created -> Timestamptz,
        modified -> Timestamptz,
    }
}

diesel::table! {
    /// Memberships; unique per (user_id, organization_id).
    organization_users (id) {
        id -> Uuid,
        user_id -> Uuid,
        organization_id -> Uuid,
        is_admin -> Bool,
        created -> Timestamptz,
        modified -> Timestamptz,
    }
}

diesel::table! {
    /// One row per organization.
    organization_owners (id) {
        id -> Uuid,
        organization_id -> Uuid,
        organization_user_id -> Uuid,
        created -> Timestamptz,
        modified -> Timestamptz,
    }
}

diesel::table! {
    teams (id) {
        id -> Uuid,
        organization_id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    /// Team rosters; unique per (team_id, organization_user_id).
    team_members (id) {
        id -> Uuid,
        team_id -> Uuid,
        organization_user_id -> Uuid,
        is_admin -> Bool,
    }
}

diesel::joinable!(addresses -> users (user_id));
diesel::joinable!(organization_users -> organizations (organization_id));
diesel::joinable!(organization_users -> users (user_id));
diesel::joinable!(organization_owners -> organizations (organization_id));
diesel::joinable!(organization_owners -> organization_users (organization_user_id));
diesel::joinable!(teams -> organizations (organization_id));
diesel::joinable!(team_members -> teams (team_id));
diesel::joinable!(team_members -> organization_users (organization_user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    addresses,
    organizations,
    organization_users,
    organization_owners,
    teams,
    team_members,
);
