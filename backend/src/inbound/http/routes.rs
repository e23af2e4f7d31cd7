//! Route table for the versioned REST API.
//!
//! Every resource lives under `/api/{version}`; the [`ApiVersion`]
//! extractor rejects unknown version tokens per request.
//!
//! [`ApiVersion`]: crate::inbound::http::version::ApiVersion

use actix_web::web;

use crate::inbound::http::{addresses, auth, organization_users, organizations, teams, users};

/// Register the API scope on an application or test service.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use employee_backend::inbound::http::routes;
///
/// let _app = App::new().configure(routes::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/{version}")
            .service(auth::login)
            .service(auth::logout)
            .service(organizations::list_organizations)
            .service(organizations::create_organization)
            .service(organizations::get_organization)
            .service(organizations::replace_organization)
            .service(organizations::update_organization)
            .service(organizations::delete_organization)
            .service(organization_users::list_organization_users)
            .service(organization_users::create_organization_user)
            .service(organization_users::get_organization_user)
            .service(organization_users::replace_organization_user)
            .service(organization_users::update_organization_user)
            .service(organization_users::delete_organization_user)
            .service(organization_users::get_organization_owner)
            .service(teams::list_teams)
            .service(teams::create_team)
            .service(teams::get_team)
            .service(teams::replace_team)
            .service(teams::patch_team)
            .service(teams::delete_team)
            .service(teams::list_team_members)
            .service(teams::create_team_member)
            .service(teams::get_team_member)
            .service(teams::replace_team_member)
            .service(teams::update_team_member)
            .service(teams::delete_team_member)
            .service(users::list_users)
            .service(users::create_user)
            .service(users::get_user)
            .service(users::replace_user)
            .service(users::update_user)
            .service(users::list_profiles)
            .service(users::get_profile)
            .service(addresses::list_addresses)
            .service(addresses::create_address)
            .service(addresses::get_address)
            .service(addresses::replace_address)
            .service(addresses::update_address)
            .service(addresses::delete_address),
    );
}
