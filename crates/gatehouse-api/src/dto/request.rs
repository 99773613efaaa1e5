//! Request body shapes.

use serde::Deserialize;
use uuid::Uuid;

/// Email + password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Organisation to log into, when the user has several accounts.
    #[serde(default)]
    pub organisation_id: Option<Uuid>,
}

/// Public sign-up.
#[derive(Debug, Deserialize)]
pub struct SignupBody {
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Organisation to join.
    #[serde(default)]
    pub organisation_id: Option<Uuid>,
}

/// Administrative invitation.
#[derive(Debug, Deserialize)]
pub struct InviteBody {
    /// Email address to invite.
    pub email: String,
    /// Role names to pre-assign.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Organisation for the created account.
    #[serde(default)]
    pub organisation_id: Option<Uuid>,
    /// Establishment for the created account.
    #[serde(default)]
    pub establishment_id: Option<Uuid>,
}

/// Invitation acceptance.
#[derive(Debug, Deserialize)]
pub struct AcceptInviteBody {
    /// The invitation token.
    pub token: String,
    /// The invited email.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A bare email (reset request, validation resend).
#[derive(Debug, Deserialize)]
pub struct EmailBody {
    /// Email address.
    pub email: String,
}

/// A token presented back with its email.
#[derive(Debug, Deserialize)]
pub struct TokenEmailBody {
    /// The action token.
    pub token: String,
    /// The email the token was issued for.
    pub email: String,
}

/// Token-gated password reset.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    /// The reset token.
    pub token: String,
    /// The email the token was issued for.
    pub email: String,
    /// The new password.
    pub new_password: String,
}

/// Authenticated password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
    /// The current password.
    pub current_password: String,
    /// The new password.
    pub new_password: String,
}

/// Request a change of email address.
#[derive(Debug, Deserialize)]
pub struct ChangeEmailBody {
    /// The new address; the confirmation token is sent there.
    pub new_email: String,
}

/// Organisation creation.
#[derive(Debug, Deserialize)]
pub struct CreateOrganisationBody {
    /// Organisation name (unique).
    pub name: String,
}

/// Establishment creation.
#[derive(Debug, Deserialize)]
pub struct CreateEstablishmentBody {
    /// Owning organisation.
    pub organisation_id: Uuid,
    /// Establishment name.
    pub name: String,
}

/// Role creation/update.
#[derive(Debug, Deserialize)]
pub struct RoleBody {
    /// Role name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Claims in canonical `action:scope:resource` form.
    #[serde(default)]
    pub claims: Vec<String>,
}
