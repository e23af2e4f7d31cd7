//! Create an active staff account directly in PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;
use zeroize::Zeroizing;

use employee_backend::domain::ports::UserRepository;
use employee_backend::domain::{EmailAddress, PasswordDigest, Profile, User, Username};
use employee_backend::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};

/// `create-staff-user` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-staff-user",
    about = "Create a staff account allowed to found organizations",
    version
)]
struct CliArgs {
    /// Login name of the new account.
    #[arg(long, value_name = "name")]
    username: String,
    /// Initial password.
    #[arg(long, value_name = "password")]
    password: String,
    /// Optional contact email.
    #[arg(long, value_name = "email")]
    email: Option<String>,
    /// Database connection URL.
    #[arg(long = "database-url", value_name = "url", env = "EMS_DATABASE_URL")]
    database_url: String,
}

/// Turn the arguments into a staff user and its password hash.
fn staff_user(args: &CliArgs) -> Result<(User, PasswordDigest)> {
    let username = Username::new(args.username.trim()).context("invalid username")?;
    let email = args
        .email
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(EmailAddress::new)
        .transpose()
        .context("invalid email")?;
    let password = Zeroizing::new(args.password.clone());
    if password.trim().is_empty() {
        return Err(eyre!("password must not be blank"));
    }
    let digest = PasswordDigest::hash(password.as_str()).context("hash password")?;
    let profile = Profile {
        email,
        ..Profile::default()
    };
    Ok((User::new(username, profile).with_staff(true), digest))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> Result<()> {
    let (user, digest) = staff_user(&args)?;

    run_pending_migrations(&args.database_url)
        .await
        .context("apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(&args.database_url))
        .await
        .context("create database pool")?;
    let users = DieselUserRepository::new(pool);
    users
        .create(&user, Some(digest))
        .await
        .context("store staff user")?;

    println!("created staff user {} ({})", user.username, user.id);
    Ok(())
}
