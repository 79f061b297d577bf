//! # Session Operations
//!
//! Sign in, sign up and sign out.
//!
//! ## Password Handling
//! Passwords are optional. They are stored in the user record and compared
//! as plaintext. The comparison lives in [`credentials_match`] and nowhere
//! else, so swapping in a hash check touches one function.
//!
//! ```text
//!   stored        supplied      match
//!   None          None / ""     yes
//!   None          Some("x")     no
//!   Some("x")     Some("x")     yes (exact, case and whitespace sensitive)
//!   Some("x")     None / ""     no
//! ```

use tracing::{debug, info, warn};
use uuid::Uuid;

use grocer_core::validation::validate_new_user;
use grocer_core::{User, UserRole, ValidationError};

use crate::error::{ApiError, ApiResult};
use crate::storefront::{Storefront, WriteStatus};

/// Whether `password` opens `user`'s account. An empty password counts as
/// none, so an account without a password opens with none supplied.
pub fn credentials_match(user: &User, password: Option<&str>) -> bool {
    let stored = user.password.as_deref().filter(|p| !p.is_empty());
    let supplied = password.filter(|p| !p.is_empty());
    stored == supplied
}

impl Storefront {
    /// Signs in with a mobile number and password.
    ///
    /// ## Errors
    /// - `INVALID_CREDENTIALS` for an unknown number or a wrong password
    ///   (the two are indistinguishable)
    pub async fn login(&self, mobile: &str, password: Option<&str>) -> ApiResult<User> {
        let mobile = mobile.trim();
        let user = self
            .users
            .find(|u| u.mobile_number == mobile)
            .filter(|u| credentials_match(u, password));

        match user {
            Some(user) => {
                info!(user_id = %user.id, role = ?user.role, "Signed in");
                self.state.sign_in(user.clone());
                Ok(user)
            }
            None => {
                warn!("Sign-in rejected");
                Err(ApiError::invalid_credentials())
            }
        }
    }

    /// Registers a new user and signs them in.
    ///
    /// The first user ever registered becomes the admin; everyone after is a
    /// customer, whatever role the form carried.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` for missing fields, a malformed number or
    ///   address, or a mobile number that is already registered
    pub async fn signup(&self, mut user: User) -> ApiResult<WriteStatus> {
        user.mobile_number = user.mobile_number.trim().to_string();
        user.password = user.password.filter(|p| !p.is_empty());
        validate_new_user(&user)?;

        let (taken, first) = self.users.read(|users| {
            (
                users.iter().any(|u| u.mobile_number == user.mobile_number),
                users.is_empty(),
            )
        });
        if taken {
            return Err(ValidationError::Duplicate {
                field: "mobileNumber".to_string(),
                value: user.mobile_number,
            }
            .into());
        }

        user.role = if first { UserRole::Admin } else { UserRole::Customer };
        if user.id.trim().is_empty() {
            user.id = Uuid::new_v4().to_string();
        }

        debug!(user_id = %user.id, role = ?user.role, "Registering user");
        let status = self.persist(&self.users, &user.id, &user).await;

        self.state.sign_in(user);
        Ok(status)
    }

    /// Signs out. The basket is kept.
    pub fn logout(&self) {
        if let Some(user) = self.state.sign_out() {
            info!(user_id = %user.id, "Signed out");
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.current_user()
    }

    pub(crate) fn require_user(&self) -> ApiResult<User> {
        self.state.current_user().ok_or_else(ApiError::not_signed_in)
    }
}
