use serde::Deserialize;
use validator::Validate;

use crate::domain::types::WorkspaceName;
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct RenameWorkspaceForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

impl TryFrom<RenameWorkspaceForm> for WorkspaceName {
    type Error = FormError;

    fn try_from(form: RenameWorkspaceForm) -> Result<Self, Self::Error> {
        form.validate()?;
        WorkspaceName::new(form.name).map_err(|_| FormError::InvalidName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_name_is_rejected() {
        let form = RenameWorkspaceForm {
            name: "   ".to_string(),
        };
        assert!(matches!(
            WorkspaceName::try_from(form),
            Err(FormError::InvalidName)
        ));
    }
}
