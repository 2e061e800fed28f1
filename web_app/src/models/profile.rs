use serde::{Deserialize, Serialize};

use super::order::DeliveryDetails;

/// Default delivery information a user keeps for future checkouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    pub default_phone_number: Option<String>,
    pub default_country: Option<String>,
    pub default_postcode: Option<String>,
    pub default_town_or_city: Option<String>,
    pub default_street_address1: Option<String>,
    pub default_street_address2: Option<String>,
    pub default_county: Option<String>,
}

impl ProfileDefaults {
    pub fn from_delivery(details: &DeliveryDetails) -> Self {
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Self {
            default_phone_number: non_empty(&details.phone_number),
            default_country: non_empty(&details.country),
            default_postcode: details.postcode.as_deref().and_then(non_empty),
            default_town_or_city: non_empty(&details.town_or_city),
            default_street_address1: non_empty(&details.street_address1),
            default_street_address2: details.street_address2.as_deref().and_then(non_empty),
            default_county: details.county.as_deref().and_then(non_empty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub defaults: ProfileDefaults,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Delivery details used to prefill the checkout form.
    pub fn checkout_prefill(&self) -> DeliveryDetails {
        DeliveryDetails {
            full_name: self.full_name(),
            email: self.email.clone(),
            phone_number: self.defaults.default_phone_number.clone().unwrap_or_default(),
            country: self.defaults.default_country.clone().unwrap_or_default(),
            postcode: self.defaults.default_postcode.clone(),
            town_or_city: self.defaults.default_town_or_city.clone().unwrap_or_default(),
            street_address1: self
                .defaults
                .default_street_address1
                .clone()
                .unwrap_or_default(),
            street_address2: self.defaults.default_street_address2.clone(),
            county: self.defaults.default_county.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_delivery_drop_blank_fields() {
        let details = DeliveryDetails {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone_number: " 555 0100 ".into(),
            country: "GB".into(),
            postcode: Some("  ".into()),
            town_or_city: "London".into(),
            street_address1: "1 Main St".into(),
            street_address2: None,
            county: Some("Greater London".into()),
        };

        let defaults = ProfileDefaults::from_delivery(&details);

        assert_eq!(defaults.default_phone_number.as_deref(), Some("555 0100"));
        assert_eq!(defaults.default_postcode, None);
        assert_eq!(defaults.default_street_address2, None);
        assert_eq!(defaults.default_county.as_deref(), Some("Greater London"));
    }

    #[test]
    fn test_checkout_prefill() {
        let profile = UserProfile {
            id: 1,
            username: "ada".into(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "".into(),
            defaults: ProfileDefaults {
                default_country: Some("GB".into()),
                ..Default::default()
            },
        };

        let prefill = profile.checkout_prefill();

        assert_eq!(prefill.full_name, "Ada");
        assert_eq!(prefill.email, "ada@example.com");
        assert_eq!(prefill.country, "GB");
        assert_eq!(prefill.phone_number, "");
    }
}
