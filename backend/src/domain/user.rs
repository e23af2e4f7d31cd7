//! User accounts and their profile attributes.
//!
//! A [`User`] carries identity (`username`, `email`), profile details shown
//! on public profiles, and account flags (`is_staff`, `is_active`). Password
//! hashes never enter this type; persistence adapters keep them separately.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Maximum username length.
pub const USERNAME_MAX: usize = 150;
/// Maximum length of `first_name` and `last_name`.
pub const PERSON_NAME_MAX: usize = 150;
/// Maximum length of the free-form `name` field.
pub const FULL_NAME_MAX: usize = 255;
/// Maximum biography length.
pub const BIO_MAX: usize = 500;
/// Maximum stored phone number length.
pub const PHONE_MAX: usize = 12;
/// Maximum email length.
pub const EMAIL_MAX: usize = 254;

/// Validation failures for user attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("username may only contain letters, digits and @/./+/-/_")]
    UsernameInvalidCharacters,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("{field} must be a valid phone number")]
    InvalidPhone { field: &'static str },
    #[error("\"{value}\" is not a valid choice for {field}")]
    InvalidChoice { field: &'static str, value: String },
}

impl UserValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername | Self::UsernameTooLong { .. } | Self::UsernameInvalidCharacters => {
                "username"
            }
            Self::InvalidEmail => "email",
            Self::TooLong { field, .. }
            | Self::Blank { field }
            | Self::InvalidPhone { field }
            | Self::InvalidChoice { field, .. } => field,
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "empty_username",
            Self::UsernameTooLong { .. } | Self::TooLong { .. } => "too_long",
            Self::UsernameInvalidCharacters => "invalid_characters",
            Self::Blank { .. } => "blank",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhone { .. } => "invalid_phone",
            Self::InvalidChoice { .. } => "invalid_choice",
        }
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[\w.@+-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"(\d{3})\D*(\d{4}|\d{3})\D*(\d{4}|\d{3})$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Check a free-text attribute against its maximum length.
pub fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), UserValidationError> {
    if value.chars().count() > max {
        return Err(UserValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Unique login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if value.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(&value) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address, compared case-insensitively when resolving invitations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into().trim().to_owned();
        if value.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::TooLong {
                field: "email",
                max: EMAIL_MAX,
            });
        }
        let Some((local, domain)) = value.rsplit_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || value.chars().any(char::is_whitespace)
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }

    /// Part before the `@`.
    pub fn local_part(&self) -> &str {
        self.0.rsplit_once('@').map_or(self.0.as_str(), |(local, _)| local)
    }

    /// Case-insensitive comparison against raw input, folding the full
    /// Unicode range the way the database's `lower()` does.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Phone number accepted in `phone_home`, `phone_work` and `mobile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a phone number for the named field.
    pub fn parse(field: &'static str, value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        check_length(field, &value, PHONE_MAX)?;
        if !phone_regex().is_match(&value) {
            return Err(UserValidationError::InvalidPhone { field });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

macro_rules! define_choice {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Stored and serialised representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UserValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UserValidationError::InvalidChoice {
                        field: $field,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

define_choice!(
    /// Self-declared gender.
    Gender, "gender" { Male => "male", Female => "female", Other => "other" }
);
define_choice!(
    /// Form of address.
    Salutation, "salutation" { Mr => "mr", Mrs => "mrs", Miss => "miss" }
);

/// Editable profile attributes of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub email: Option<EmailAddress>,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: String,
    pub salutation: Option<Salutation>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_home: Option<PhoneNumber>,
    pub phone_work: Option<PhoneNumber>,
    pub mobile: Option<PhoneNumber>,
}

impl Profile {
    /// Enforce the length limits of the free-text attributes.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        check_length("first_name", &self.first_name, PERSON_NAME_MAX)?;
        check_length("last_name", &self.last_name, PERSON_NAME_MAX)?;
        check_length("name", &self.name, FULL_NAME_MAX)?;
        check_length("bio", &self.bio, BIO_MAX)?;
        if let Some(avatar) = &self.avatar {
            check_length("avatar", avatar, FULL_NAME_MAX)?;
        }
        Ok(())
    }
}

/// Application user.
///
/// ## Invariants
/// - `username` is unique across all users.
/// - Inactive users cannot log in and are skipped by membership notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub profile: Profile,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Build an active, non-staff user joining now.
    pub fn new(username: Username, profile: Profile) -> Self {
        Self {
            id: UserId::random(),
            username,
            profile,
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    /// Mark the user as staff.
    #[must_use]
    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    /// Set the active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Email, if any, as a plain string.
    pub fn email(&self) -> Option<&str> {
        self.profile.email.as_ref().map(AsRef::as_ref)
    }
}

/// Partial update to a user's profile. `None` leaves a field unchanged; the
/// inner `Option` of nullable fields clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<Username>,
    pub email: Option<Option<EmailAddress>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<Option<String>>,
    pub bio: Option<String>,
    pub salutation: Option<Option<Salutation>>,
    pub gender: Option<Option<Gender>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub phone_home: Option<Option<PhoneNumber>>,
    pub phone_work: Option<Option<PhoneNumber>>,
    pub mobile: Option<Option<PhoneNumber>>,
}

impl ProfileChanges {
    /// Apply the changes to `user` and re-validate the profile.
    pub fn apply(self, user: &mut User) -> Result<(), UserValidationError> {
        let Self {
            username,
            email,
            first_name,
            last_name,
            name,
            avatar,
            bio,
            salutation,
            gender,
            date_of_birth,
            phone_home,
            phone_work,
            mobile,
        } = self;
        let profile = &mut user.profile;
        if let Some(value) = username {
            user.username = value;
        }
        assign(&mut profile.email, email);
        assign(&mut profile.first_name, first_name);
        assign(&mut profile.last_name, last_name);
        assign(&mut profile.name, name);
        assign(&mut profile.avatar, avatar);
        assign(&mut profile.bio, bio);
        assign(&mut profile.salutation, salutation);
        assign(&mut profile.gender, gender);
        assign(&mut profile.date_of_birth, date_of_birth);
        assign(&mut profile.phone_home, phone_home);
        assign(&mut profile.phone_work, phone_work);
        assign(&mut profile.mobile, mobile);
        profile.validate()
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
