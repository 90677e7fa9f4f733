//! Response bodies assembled by the services.

pub mod billing;
pub mod clients;
pub mod deliverables;
pub mod messaging;
pub mod users;
