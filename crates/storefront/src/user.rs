//! The user (account) composable.
//!
//! [`UserSession`] owns the signed-in customer's profile and sequences the
//! authentication flows: login with cart reconciliation, registration that
//! delegates to login, and logout that clears everything the session knows.
//! Error handling follows the same slot pattern as the cart composable;
//! operations never return errors.

use std::sync::Arc;

use tracing::warn;

use mercado_core::{Customer, Email};

use crate::commerce::{CommerceApi, CommerceError, CustomerInput, CustomerUpdateInput};
use crate::session::SessionStore;

/// Last error per user operation, `None` when the most recent run succeeded.
#[derive(Debug, Default)]
pub struct UserErrors {
    pub load: Option<CommerceError>,
    pub login: Option<CommerceError>,
    pub register: Option<CommerceError>,
    pub logout: Option<CommerceError>,
    pub update_user: Option<CommerceError>,
    pub change_password: Option<CommerceError>,
}

/// A requested email change. The backend requires the current password to
/// alter the account email, so the two travel together.
#[derive(Debug, Clone)]
pub struct EmailChange {
    pub email: Email,
    pub password: String,
}

/// Profile fields to update. `email` goes through its dedicated mutation
/// when it differs from the loaded profile; the rest go through the general
/// profile update.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<EmailChange>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub is_subscribed: Option<bool>,
}

/// Account state plus the operations that mutate it.
///
/// Shares the session store with the cart composable: a login here changes
/// which cart the other resolves.
pub struct UserSession<A: CommerceApi> {
    api: A,
    session: Arc<dyn SessionStore>,
    user: Option<Customer>,
    errors: UserErrors,
    loading: bool,
}

impl<A: CommerceApi> UserSession<A> {
    /// Create a user session over the given API client and session store.
    pub fn new(api: A, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session,
            user: None,
            errors: UserErrors::default(),
            loading: false,
        }
    }

    /// The loaded customer profile, if any.
    pub fn user(&self) -> Option<&Customer> {
        self.user.as_ref()
    }

    /// Per-operation error slots.
    pub const fn errors(&self) -> &UserErrors {
        &self.errors
    }

    /// Whether an operation is currently in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the session holds a customer token.
    pub fn is_authenticated(&self) -> bool {
        self.session.customer_token().is_some()
    }

    /// Load the profile for the stored customer token. Without a token
    /// there is nothing to do. A fetch failure means the token is stale;
    /// the whole session is cleared so the storefront falls back to guest.
    pub async fn load(&mut self) {
        self.errors.load = None;
        self.loading = true;

        if self.session.customer_token().is_some() {
            match self.api.customer().await {
                Ok(customer) => self.user = Some(customer),
                Err(error) => {
                    warn!(%error, "profile fetch failed, clearing session");
                    if let Err(revoke_error) = self.api.revoke_customer_token().await {
                        warn!(%revoke_error, "token revoke during cleanup failed");
                    }
                    self.clear_session();
                    self.errors.load = Some(error);
                }
            }
        }

        self.loading = false;
    }

    /// Authenticate and reconcile carts.
    ///
    /// After the token is obtained the customer cart is fetched; when a
    /// guest cart with a different id was active it is merged into the
    /// customer cart and the merged id replaces the guest id in the session
    /// store. The guest id is invalid from that point on.
    pub async fn login(&mut self, email: &Email, password: &str) {
        self.errors.login = None;
        self.loading = true;

        match self.login_inner(email, password).await {
            Ok(customer) => self.user = Some(customer),
            Err(error) => {
                warn!(%error, %email, "login failed");
                self.errors.login = Some(error);
            }
        }

        self.loading = false;
    }

    /// Create an account, then log in with the same credentials.
    pub async fn register(&mut self, input: CustomerInput) {
        self.errors.register = None;
        self.loading = true;

        match self.register_inner(input).await {
            Ok(customer) => self.user = Some(customer),
            Err(error) => {
                warn!(%error, "registration failed");
                self.errors.register = Some(error);
            }
        }

        self.loading = false;
    }

    /// Revoke the token and clear everything the session holds, including
    /// the cart id. The local state is cleared even when the revoke call
    /// fails; a session the backend no longer honors is of no use.
    pub async fn logout(&mut self) {
        self.errors.logout = None;
        self.loading = true;

        if self.session.customer_token().is_some() {
            if let Err(error) = self.api.revoke_customer_token().await {
                warn!(%error, "token revoke failed");
                self.errors.logout = Some(error);
            }
        }

        self.clear_session();
        self.loading = false;
    }

    /// Update profile fields. An email that differs from the loaded
    /// profile goes through the dedicated email mutation first, which is
    /// why [`EmailChange`] carries the current password.
    pub async fn update_user(&mut self, update: ProfileUpdate) {
        self.errors.update_user = None;
        self.loading = true;

        match self.update_user_inner(update).await {
            Ok(customer) => self.user = Some(customer),
            Err(error) => {
                warn!(%error, "profile update failed");
                self.errors.update_user = Some(error);
            }
        }

        self.loading = false;
    }

    /// Change the account password and refresh the profile from the
    /// mutation's response.
    pub async fn change_password(&mut self, current: &str, new: &str) {
        self.errors.change_password = None;
        self.loading = true;

        match self.api.change_customer_password(current, new).await {
            Ok(customer) => self.user = Some(customer),
            Err(error) => {
                warn!(%error, "password change failed");
                self.errors.change_password = Some(error);
            }
        }

        self.loading = false;
    }

    async fn login_inner(
        &mut self,
        email: &Email,
        password: &str,
    ) -> Result<Customer, CommerceError> {
        let token = self.api.generate_customer_token(email, password).await?;
        self.session.set_customer_token(Some(token));

        let guest_cart_id = self.session.cart_id();
        let customer_cart = self.api.customer_cart().await?;

        let active_cart_id = match guest_cart_id {
            Some(guest_id) if guest_id != customer_cart.id => {
                let merged = self.api.merge_carts(&guest_id, &customer_cart.id).await?;
                merged.id
            }
            _ => customer_cart.id,
        };
        self.session.set_cart_id(Some(active_cart_id));

        self.api.customer().await
    }

    async fn register_inner(&mut self, input: CustomerInput) -> Result<Customer, CommerceError> {
        let email = input.email.clone();
        let password = input.password.clone();
        self.api.create_customer(input).await?;
        self.login_inner(&email, &password).await
    }

    async fn update_user_inner(
        &mut self,
        update: ProfileUpdate,
    ) -> Result<Customer, CommerceError> {
        if let Some(change) = &update.email {
            let current = self.user.as_ref().and_then(|user| user.email.as_ref());
            if current != Some(&change.email) {
                self.api
                    .update_customer_email(&change.email, &change.password)
                    .await?;
            }
        }

        let input = CustomerUpdateInput {
            firstname: update.firstname,
            lastname: update.lastname,
            is_subscribed: update.is_subscribed,
        };
        self.api.update_customer(input).await
    }

    fn clear_session(&mut self) {
        self.session.set_customer_token(None);
        self.session.set_cart_id(None);
        self.user = None;
    }
}
