use serde::{Deserialize, Serialize};

use super::strip_markup;
use crate::models::order::DeliveryDetails;

/// Max length of every order field, as stored in the database
const FIELD_LIMITS: [(&str, usize); 9] = [
    ("full_name", 50),
    ("email", 254),
    ("phone_number", 20),
    ("country", 40),
    ("postcode", 20),
    ("town_or_city", 40),
    ("street_address1", 80),
    ("street_address2", 80),
    ("county", 80),
];

/// Checkout form posted once the card payment succeeded
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub country: String,
    pub postcode: String,
    pub town_or_city: String,
    pub street_address1: String,
    pub street_address2: String,
    pub county: String,
    pub client_secret: String,
    #[serde(rename = "save-info")]
    pub save_info: Option<String>,
    pub csrfmiddlewaretoken: String,
}

fn clean(value: &str) -> String {
    strip_markup(value)
}

fn optional(value: &str) -> Option<String> {
    let value = clean(value);
    (!value.is_empty()).then_some(value)
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split('.')
                    .filter(|label| !label.is_empty())
                    .count()
                    >= 2
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

impl OrderForm {
    pub fn wants_to_save_info(&self) -> bool {
        self.save_info.is_some()
    }

    fn field(&self, name: &str) -> &str {
        match name {
            "full_name" => &self.full_name,
            "email" => &self.email,
            "phone_number" => &self.phone_number,
            "country" => &self.country,
            "postcode" => &self.postcode,
            "town_or_city" => &self.town_or_city,
            "street_address1" => &self.street_address1,
            "street_address2" => &self.street_address2,
            "county" => &self.county,
            _ => "",
        }
    }

    /// Sanitized delivery details, or the names of the invalid fields.
    pub fn validate(&self) -> Result<DeliveryDetails, Vec<String>> {
        let mut invalid = Vec::new();

        for (name, limit) in FIELD_LIMITS {
            if self.field(name).trim().chars().count() > limit {
                invalid.push(name.to_string());
            }
        }

        for (name, value) in [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
            ("country", &self.country),
            ("town_or_city", &self.town_or_city),
            ("street_address1", &self.street_address1),
        ] {
            if value.trim().is_empty() && !invalid.iter().any(|f| f == name) {
                invalid.push(name.to_string());
            }
        }

        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            invalid.push("email".to_string());
        }

        if !invalid.is_empty() {
            invalid.dedup();
            return Err(invalid);
        }

        Ok(DeliveryDetails {
            full_name: clean(&self.full_name),
            email: clean(&self.email),
            phone_number: clean(&self.phone_number),
            country: clean(&self.country),
            postcode: optional(&self.postcode),
            town_or_city: clean(&self.town_or_city),
            street_address1: clean(&self.street_address1),
            street_address2: optional(&self.street_address2),
            county: optional(&self.county),
        })
    }

    /// Form refilled with what the buyer typed, for re-rendering
    pub fn from_details(details: &DeliveryDetails) -> Self {
        Self {
            full_name: details.full_name.clone(),
            email: details.email.clone(),
            phone_number: details.phone_number.clone(),
            country: details.country.clone(),
            postcode: details.postcode.clone().unwrap_or_default(),
            town_or_city: details.town_or_city.clone(),
            street_address1: details.street_address1.clone(),
            street_address2: details.street_address2.clone().unwrap_or_default(),
            county: details.county.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}
