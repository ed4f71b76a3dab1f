use serde::{Deserialize, Serialize};

/// Marketplace role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Passenger,
    Vendor,
    #[serde(rename = "taxi_driver")]
    Driver,
    Admin,
}

/// The authenticated caller of an engine operation.
///
/// Resolved by the surrounding authentication layer; the engine trusts it as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorInfo {
    pub shop_name: String,
    pub shop_location: Option<String>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub license_number: String,
    pub vehicle_type: Option<String>,
}

/// Represents a registered user in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: Role,
    pub profile: Profile,
    pub vendor_info: Option<VendorInfo>,
    pub driver_info: Option<DriverInfo>,
}

/// Payload for registering a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub role: Role,
    pub profile: Profile,
    pub vendor_info: Option<VendorInfo>,
    pub driver_info: Option<DriverInfo>,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub profile: Option<Profile>,
    pub vendor_info: Option<VendorInfo>,
    pub driver_info: Option<DriverInfo>,
}

/// Public projection of a participant, attached to order views and event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub role: Role,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

impl UserCreate {
    /// Creates a registration payload with only a profile.
    ///
    /// # Arguments
    /// * `role` - Marketplace role of the account
    /// * `first_name` / `last_name` - Display name parts
    pub fn new(role: Role, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            role,
            profile: Profile {
                first_name: first_name.into(),
                last_name: last_name.into(),
                phone: None,
            },
            vendor_info: None,
            driver_info: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.profile.phone = Some(phone.into());
        self
    }

    pub fn with_shop(mut self, shop_name: impl Into<String>) -> Self {
        self.vendor_info = Some(VendorInfo {
            shop_name: shop_name.into(),
            shop_location: None,
            verified: false,
        });
        self
    }

    pub fn with_vehicle(mut self, license_number: impl Into<String>, vehicle_type: impl Into<String>) -> Self {
        self.driver_info = Some(DriverInfo {
            license_number: license_number.into(),
            vehicle_type: Some(vehicle_type.into()),
        });
        self
    }
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            role: self.role,
            name: format!("{} {}", self.profile.first_name, self.profile.last_name),
            phone: self.profile.phone.clone(),
            shop_name: self.vendor_info.as_ref().map(|v| v.shop_name.clone()),
            vehicle_type: self.driver_info.as_ref().and_then(|d| d.vehicle_type.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_role_uses_legacy_wire_name() {
        assert_eq!(serde_json::to_string(&Role::Driver).unwrap(), "\"taxi_driver\"");
        let role: Role = serde_json::from_str("\"passenger\"").unwrap();
        assert_eq!(role, Role::Passenger);
    }

    #[test]
    fn test_summary_projects_role_specific_fields() {
        let vendor = User {
            id: "user_2".into(),
            role: Role::Vendor,
            profile: Profile {
                first_name: "Lineo".into(),
                last_name: "Mokoena".into(),
                phone: Some("+26650000000".into()),
            },
            vendor_info: Some(VendorInfo {
                shop_name: "Lineo's Kitchen".into(),
                shop_location: None,
                verified: true,
            }),
            driver_info: None,
        };

        let summary = vendor.summary();
        assert_eq!(summary.name, "Lineo Mokoena");
        assert_eq!(summary.shop_name.as_deref(), Some("Lineo's Kitchen"));
        assert_eq!(summary.vehicle_type, None);
    }
}
