//! Identity collaborator and the per-operation session context

use crate::error::{PaletteError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{watch, Mutex};

/// Display name stored when the user has none
pub const DEFAULT_DISPLAY_NAME: &str = "Usuario";

/// Minimum password length accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// The signed-in user as reported by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl CurrentUser {
    #[must_use]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
        }
    }

    #[must_use]
    pub fn with_display_name<S: Into<String>>(mut self, name: S) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name recorded on saved palettes
    #[must_use]
    pub fn owner_name(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

/// Snapshot of the current user handed to every owner-scoped operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<CurrentUser>,
}

impl SessionContext {
    #[must_use]
    pub fn signed_in(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// Capture the provider's current user
    #[must_use]
    pub fn from_provider(provider: &dyn IdentityProvider) -> Self {
        Self {
            user: provider.current_user(),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// The signed-in user, or `AuthenticationRequired`
    pub fn require_user(&self) -> Result<&CurrentUser> {
        self.user.as_ref().ok_or(PaletteError::AuthenticationRequired)
    }
}

/// Source of the current user identity and its changes
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<CurrentUser>;

    /// Receiver notified on every sign-in and sign-out
    fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser>;

    async fn sign_up(&self, display_name: &str, email: &str, password: &str)
        -> Result<CurrentUser>;

    async fn sign_out(&self) -> Result<()>;
}

/// Form-level checks run before calling [`IdentityProvider::sign_in`]
pub fn validate_sign_in(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(PaletteError::authentication(
            "Por favor completa todos los campos",
        ));
    }
    Ok(())
}

/// Form-level checks run before calling [`IdentityProvider::sign_up`]
pub fn validate_sign_up(
    display_name: &str,
    email: &str,
    password: &str,
    confirmation: &str,
) -> Result<()> {
    if display_name.trim().is_empty()
        || email.trim().is_empty()
        || password.is_empty()
        || confirmation.is_empty()
    {
        return Err(PaletteError::authentication(
            "Por favor completa todos los campos",
        ));
    }

    if password != confirmation {
        return Err(PaletteError::authentication(
            "Las contraseñas no coinciden",
        ));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PaletteError::authentication(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        },
        None => false,
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: CurrentUser,
    password: String,
}

/// Process-local identity provider for tests, demos and the CLI
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    current: watch::Sender<Option<CurrentUser>>,
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            current,
        }
    }

    /// Provider with `user` already signed in
    #[must_use]
    pub fn signed_in_as(user: CurrentUser) -> Self {
        let (current, _) = watch::channel(Some(user));
        Self {
            accounts: Mutex::new(HashMap::new()),
            current,
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    fn current_user(&self) -> Option<CurrentUser> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser> {
        let key = email.trim().to_lowercase();
        if !is_plausible_email(&key) {
            return Err(PaletteError::authentication("Email inválido"));
        }

        let accounts = self.accounts.lock().await;
        let account = accounts
            .get(&key)
            .ok_or_else(|| PaletteError::authentication("Usuario no encontrado"))?;
        if account.password != password {
            return Err(PaletteError::authentication("Contraseña incorrecta"));
        }

        let user = account.user.clone();
        drop(accounts);

        log::debug!("Signed in {}", user.id);
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser> {
        let key = email.trim().to_lowercase();
        if !is_plausible_email(&key) {
            return Err(PaletteError::authentication("Email inválido"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PaletteError::authentication("La contraseña es muy débil"));
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&key) {
            return Err(PaletteError::authentication("Este email ya está registrado"));
        }

        let user = CurrentUser {
            id: uuid::Uuid::new_v4().simple().to_string(),
            email: Some(key.clone()),
            display_name: Some(display_name.trim().to_string()),
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        drop(accounts);

        log::debug!("Registered {}", user.id);
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.current.send_replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: PaletteError) -> String {
        err.user_message()
    }

    #[test]
    fn test_require_user() {
        let anonymous = SessionContext::anonymous();
        assert!(matches!(
            anonymous.require_user(),
            Err(PaletteError::AuthenticationRequired)
        ));

        let session = SessionContext::signed_in(CurrentUser::new("u1"));
        assert_eq!(session.require_user().unwrap().id, "u1");
    }

    #[test]
    fn test_owner_name_defaults() {
        assert_eq!(CurrentUser::new("u1").owner_name(), "Usuario");
        assert_eq!(
            CurrentUser::new("u1").with_display_name("  ").owner_name(),
            "Usuario"
        );
        assert_eq!(
            CurrentUser::new("u1").with_display_name("Ana").owner_name(),
            "Ana"
        );
    }

    #[test]
    fn test_form_validation() {
        assert!(validate_sign_in("a@b.co", "secret").is_ok());
        assert_eq!(
            message(validate_sign_in("", "secret").unwrap_err()),
            "Por favor completa todos los campos"
        );

        assert!(validate_sign_up("Ana", "a@b.co", "secret1", "secret1").is_ok());
        assert_eq!(
            message(validate_sign_up("Ana", "a@b.co", "secret1", "secret2").unwrap_err()),
            "Las contraseñas no coinciden"
        );
        assert_eq!(
            message(validate_sign_up("Ana", "a@b.co", "abc", "abc").unwrap_err()),
            "La contraseña debe tener al menos 6 caracteres"
        );
        assert!(validate_sign_up(" ", "a@b.co", "secret1", "secret1").is_err());
    }

    #[tokio::test]
    async fn test_sign_up_sign_in_sign_out() {
        let identity = InMemoryIdentity::new();
        let mut changes = identity.subscribe();
        assert!(identity.current_user().is_none());

        let user = identity.sign_up("Ana", "Ana@Example.com", "secret1").await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ana"));
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().as_ref(), Some(&user));

        identity.sign_out().await.unwrap();
        assert!(identity.current_user().is_none());

        let again = identity.sign_in("ana@example.com", "secret1").await.unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(
            SessionContext::from_provider(&identity).user().map(|u| u.id.clone()),
            Some(user.id)
        );
    }

    #[tokio::test]
    async fn test_identity_errors() {
        let identity = InMemoryIdentity::new();
        identity.sign_up("Ana", "ana@example.com", "secret1").await.unwrap();

        let cases = [
            (identity.sign_in("nobody@example.com", "x").await, "Usuario no encontrado"),
            (identity.sign_in("ana@example.com", "wrong!").await, "Contraseña incorrecta"),
            (identity.sign_in("not-an-email", "secret1").await, "Email inválido"),
            (
                identity.sign_up("Ana", "ana@example.com", "secret1").await,
                "Este email ya está registrado",
            ),
            (
                identity.sign_up("Bo", "bo@example.com", "123").await,
                "La contraseña es muy débil",
            ),
        ];

        for (result, expected) in cases {
            assert_eq!(message(result.unwrap_err()), expected);
        }
    }
}
