//! User administration
//!
//! List/detail/edit over users. Every mutation is followed by a full reload
//! of the list, whether it succeeded or not.

use std::sync::Arc;

use loto_client::PosApi;
use shared::models::{Role, User, UserCreate, UserUpdate};

use crate::error::{PosError, PosResult};

/// Edit form mirroring the selected user; the password is never prefilled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl UserForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            role: user.role,
        }
    }

    fn to_create(&self) -> PosResult<UserCreate> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(PosError::InvalidInput("name and email are required".into()));
        }
        if self.password.is_empty() {
            return Err(PosError::InvalidInput("password is required".into()));
        }
        Ok(UserCreate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
        })
    }

    /// The password is only sent when one was typed
    fn to_update(&self) -> UserUpdate {
        UserUpdate {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            role: Some(self.role),
        }
    }
}

pub struct UserAdmin {
    api: Arc<dyn PosApi>,
    users: Vec<User>,
    selected: Option<String>,
    form: UserForm,
    last_error: Option<String>,
}

impl UserAdmin {
    pub fn new(api: Arc<dyn PosApi>) -> Self {
        Self {
            api,
            users: Vec::new(),
            selected: None,
            form: UserForm::default(),
            last_error: None,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn selected(&self) -> Option<&User> {
        let id = self.selected.as_deref()?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn form(&self) -> &UserForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UserForm {
        &mut self.form
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Reload the list; selects the first user when nothing is selected
    pub async fn load(&mut self) -> bool {
        match self.api.list_users().await {
            Ok(users) => {
                tracing::debug!(count = users.len(), "Users loaded");
                self.users = users;
                if self.selected.is_none()
                    && let Some(first) = self.users.first()
                {
                    self.selected = Some(first.id.clone());
                    self.form = UserForm::from_user(first);
                }
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load users");
                self.users.clear();
                self.last_error = Some(format!("Could not load users: {e}"));
                false
            }
        }
    }

    pub fn select(&mut self, user_id: &str) -> PosResult<()> {
        let user = self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| PosError::InvalidInput(format!("unknown user {user_id}")))?;
        self.form = UserForm::from_user(user);
        self.selected = Some(user.id.clone());
        Ok(())
    }

    /// Blank form for a new user
    pub fn start_create(&mut self) {
        self.form = UserForm::default();
    }

    fn fail(&mut self, action: &str, error: PosError) -> PosError {
        tracing::error!(action, error = %error, "User operation failed");
        self.last_error = Some(format!("Could not {action}: {error}"));
        error
    }

    pub async fn create(&mut self) -> PosResult<()> {
        let payload = match self.form.to_create() {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail("create the user", e)),
        };
        let result = self.api.create_user(&payload).await;
        self.load().await;
        match result {
            Ok(()) => {
                tracing::info!(email = %payload.email, role = ?payload.role, "User created");
                self.form = UserForm::default();
                self.last_error = None;
                Ok(())
            }
            Err(e) => Err(self.fail("create the user", e.into())),
        }
    }

    pub async fn update(&mut self) -> PosResult<()> {
        let Some(user_id) = self.selected.clone() else {
            return Err(self.fail("update the user", PosError::InvalidInput("no user selected".into())));
        };
        let result = self.api.update_user(&user_id, &self.form.to_update()).await;
        self.load().await;
        match result {
            Ok(()) => {
                tracing::info!(user = %user_id, "User updated");
                self.form.password.clear();
                self.last_error = None;
                Ok(())
            }
            Err(e) => Err(self.fail("update the user", e.into())),
        }
    }

    /// Logical delete; clears the selection and the form
    pub async fn delete(&mut self) -> PosResult<()> {
        let Some(user_id) = self.selected.clone() else {
            return Err(self.fail("delete the user", PosError::InvalidInput("no user selected".into())));
        };
        let result = self.api.delete_user(&user_id).await;
        if result.is_ok() {
            self.selected = None;
            self.form = UserForm::default();
        }
        self.load().await;
        match result {
            Ok(()) => {
                tracing::info!(user = %user_id, "User deactivated");
                self.last_error = None;
                Ok(())
            }
            Err(e) => Err(self.fail("delete the user", e.into())),
        }
    }
}
