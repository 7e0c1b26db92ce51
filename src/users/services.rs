use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateUserInput, UpdateUserInput, UserResponse},
    error::{UserError, UserResult, ValidationError},
    password::CredentialHasher,
    repo::UserRepository,
    repo_types::User,
    validation::{validate_email, validate_name, validate_password, validate_role},
};

#[derive(Clone)]
pub struct CreateUserUseCase {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl CreateUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Validates, checks the email is free, hashes the password and persists.
    ///
    /// The email check and the insert are separate round trips; a concurrent
    /// create with the same email is caught by the store's unique index and
    /// still surfaces as [`UserError::EmailTaken`].
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn exec(&self, input: CreateUserInput) -> UserResult<UserResponse> {
        validate_name(&input.name)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;
        let role = validate_role(&input.role)?;

        if self.repo.get_by_email(&input.email).await?.is_some() {
            warn!("email already in use");
            return Err(UserError::EmailTaken(input.email));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = User::new(input.name, input.email, password_hash, role);

        self.repo.create(&user).await?;

        info!(user_id = %user.id, role = %user.role, admin = user.is_admin(), "user created");
        Ok(user.into())
    }
}

#[derive(Clone)]
pub struct UpdateUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl UpdateUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Applies only the supplied fields, each re-validated. The password is not
    /// updatable here.
    #[instrument(skip(self, input))]
    pub async fn exec(&self, id: Uuid, input: UpdateUserInput) -> UserResult<()> {
        if input.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate.into());
        }

        let mut user = self.repo.get_by_id(id).await?;

        if let Some(name) = input.name {
            validate_name(&name)?;
            user.name = name;
        }
        if let Some(email) = input.email {
            validate_email(&email)?;
            user.email = email;
        }
        if let Some(role) = input.role {
            user.role = validate_role(&role)?;
        }
        match input.is_active {
            Some(true) => user.activate(),
            Some(false) => user.deactivate(),
            None => {}
        }

        user.touch();
        self.repo.update(&user).await?;

        info!(user_id = %user.id, is_active = user.is_active, "user updated");
        Ok(())
    }
}
