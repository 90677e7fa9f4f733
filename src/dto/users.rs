use serde::Serialize;

use crate::domain::invitation::Invitation;

/// Issued invitation; the token is only revealed here, once.
#[derive(Debug, Serialize)]
pub struct IssuedInvitation {
    pub invitation: Invitation,
    pub token: String,
}
