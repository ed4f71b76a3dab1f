use crate::actor_framework::Entity;
use crate::domain::{Profile, Role, User, UserCreate, UserPatch};
use super::error::UserError;

fn validate_profile(profile: &Profile) -> Result<(), UserError> {
    if profile.first_name.trim().is_empty() || profile.last_name.trim().is_empty() {
        return Err(UserError::ValidationError("First and last name are required".to_string()));
    }
    Ok(())
}

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from registration parameters.
    ///
    /// Vendors must carry shop details; drivers must carry licence details.
    fn from_create_params(id: String, params: UserCreate) -> Result<Self, UserError> {
        validate_profile(&params.profile)?;
        match params.role {
            Role::Vendor if params.vendor_info.is_none() => {
                return Err(UserError::ValidationError("Vendor accounts need shop details".to_string()));
            }
            Role::Driver if params.driver_info.is_none() => {
                return Err(UserError::ValidationError("Driver accounts need licence details".to_string()));
            }
            _ => {}
        }
        Ok(Self {
            id,
            role: params.role,
            profile: params.profile,
            vendor_info: params.vendor_info,
            driver_info: params.driver_info,
        })
    }

    /// Updates the user's profile and role-specific details.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(profile) = patch.profile {
            validate_profile(&profile)?;
            self.profile = profile;
        }
        if let Some(vendor_info) = patch.vendor_info {
            self.vendor_info = Some(vendor_info);
        }
        if let Some(driver_info) = patch.driver_info {
            self.driver_info = Some(driver_info);
        }
        Ok(())
    }

    /// Users have no custom actions.
    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
