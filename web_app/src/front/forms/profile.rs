use serde::{Deserialize, Serialize};

use super::strip_markup;
use crate::models::profile::{ProfileDefaults, UserProfile};

const MAX_FIELD_LEN: usize = 80;

/// Delivery defaults edited on the profile page
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub default_phone_number: String,
    pub default_country: String,
    pub default_postcode: String,
    pub default_town_or_city: String,
    pub default_street_address1: String,
    pub default_street_address2: String,
    pub default_county: String,
    pub csrfmiddlewaretoken: String,
}

fn optional(value: &str) -> Result<Option<String>, ()> {
    let value = strip_markup(value);
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(());
    }
    Ok((!value.is_empty()).then_some(value))
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let defaults = &profile.defaults;
        Self {
            default_phone_number: defaults.default_phone_number.clone().unwrap_or_default(),
            default_country: defaults.default_country.clone().unwrap_or_default(),
            default_postcode: defaults.default_postcode.clone().unwrap_or_default(),
            default_town_or_city: defaults.default_town_or_city.clone().unwrap_or_default(),
            default_street_address1: defaults.default_street_address1.clone().unwrap_or_default(),
            default_street_address2: defaults.default_street_address2.clone().unwrap_or_default(),
            default_county: defaults.default_county.clone().unwrap_or_default(),
            csrfmiddlewaretoken: String::new(),
        }
    }

    /// Every field is optional; only too long values are rejected.
    pub fn validate(&self) -> Option<ProfileDefaults> {
        Some(ProfileDefaults {
            default_phone_number: optional(&self.default_phone_number).ok()?,
            default_country: optional(&self.default_country).ok()?,
            default_postcode: optional(&self.default_postcode).ok()?,
            default_town_or_city: optional(&self.default_town_or_city).ok()?,
            default_street_address1: optional(&self.default_street_address1).ok()?,
            default_street_address2: optional(&self.default_street_address2).ok()?,
            default_county: optional(&self.default_county).ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_profile_form() {
        let form = ProfileForm {
            default_country: " GB ".into(),
            default_postcode: "".into(),
            ..Default::default()
        };

        let defaults = form.validate().unwrap();
        assert_eq!(defaults.default_country.as_deref(), Some("GB"));
        assert_eq!(defaults.default_postcode, None);

        let too_long = ProfileForm {
            default_county: "x".repeat(81),
            ..Default::default()
        };
        assert!(too_long.validate().is_none());
    }

    #[test]
    fn test_validate_profile_form_keeps_ampersands() {
        let form = ProfileForm {
            default_street_address1: "Barn & Mill<b></b>".into(),
            ..Default::default()
        };

        let defaults = form.validate().unwrap();
        assert_eq!(
            defaults.default_street_address1.as_deref(),
            Some("Barn & Mill")
        );
    }
}
