use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Gateway customer link states. `pending` means the profile is complete but
/// no registration attempt has succeeded yet; `failed` marks a rejected
/// attempt. Both are retried by the customer-link reconciler.
pub const CUSTOMER_LINK_PENDING: &str = "pending";
pub const CUSTOMER_LINK_LINKED: &str = "linked";
pub const CUSTOMER_LINK_FAILED: &str = "failed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub profile_complete: bool,
    pub full_name: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub address_number: Option<String>,
    pub complement: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub gateway_customer_id: Option<String>,
    pub gateway_customer_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields accepted by `POST /user/profile`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub address: Option<String>,
    pub address_number: Option<String>,
    pub complement: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
}

impl ProfileFields {
    /// Returns the request-facing name of the first required field that is
    /// missing or blank, in the order the storefront form presents them.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        let required: [(&'static str, &Option<String>); 7] = [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("cpfCnpj", &self.cpf_cnpj),
            ("address", &self.address),
            ("addressNumber", &self.address_number),
            ("province", &self.province),
            ("postalCode", &self.postal_code),
        ];

        required
            .into_iter()
            .find(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> ProfileFields {
        ProfileFields {
            full_name: Some("Ana Souza".to_string()),
            phone: Some("11999990000".to_string()),
            birth_date: None,
            cpf_cnpj: Some("39053344705".to_string()),
            address: Some("Rua das Amoreiras".to_string()),
            address_number: Some("120".to_string()),
            complement: None,
            province: Some("Centro".to_string()),
            postal_code: Some("13010-001".to_string()),
        }
    }

    #[test]
    fn test_complete_profile_has_no_missing_field() {
        assert_eq!(complete_profile().first_missing_field(), None);
    }

    #[test]
    fn test_optional_fields_are_not_required() {
        let profile = complete_profile();
        assert!(profile.birth_date.is_none());
        assert!(profile.complement.is_none());
        assert_eq!(profile.first_missing_field(), None);
    }

    #[test]
    fn test_first_missing_field_follows_form_order() {
        let mut profile = complete_profile();
        profile.phone = None;
        profile.postal_code = None;
        assert_eq!(profile.first_missing_field(), Some("phone"));
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let mut profile = complete_profile();
        profile.cpf_cnpj = Some("   ".to_string());
        assert_eq!(profile.first_missing_field(), Some("cpfCnpj"));
    }
}
