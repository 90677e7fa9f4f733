use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::team_member::TeamMember;

/// A client together with the members assigned to it.
#[derive(Debug, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub team: Vec<TeamMember>,
}
