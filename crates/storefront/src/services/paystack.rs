//! Paystack payment gateway client.
//!
//! The inline widget runs on the client with the public key; the server's
//! responsibilities are generating a transaction reference, shaping the
//! widget's configuration, and verifying the charge with the secret key
//! before an order is recorded. All charges are in NGN, sent as kobo.

use rand::distr::{Alphanumeric, SampleString};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use maison_core::{Email, Price};

use crate::config::PaystackConfig;

const BASE_URL: &str = "https://api.paystack.co";
const REFERENCE_LEN: usize = 12;

/// Errors from gateway interaction.
#[derive(Debug, thiserror::Error)]
pub enum PaystackError {
    /// Transport or deserialization failure talking to the gateway.
    #[error("paystack request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success envelope.
    #[error("paystack rejected the request: {message}")]
    Gateway { message: String },

    /// The transaction exists but did not succeed (abandoned, failed).
    #[error("transaction not successful: status {status}")]
    NotSuccessful { status: String },

    /// A price too large to express in kobo. Never expected in practice.
    #[error("amount overflows minor units")]
    AmountOverflow,
}

/// Configuration handed to the client-side inline widget.
#[derive(Debug, Serialize)]
pub struct WidgetConfig {
    pub public_key: String,
    pub email: String,
    /// Charge amount in kobo.
    pub amount: i64,
    pub currency: &'static str,
    pub reference: String,
}

/// A server-verified charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTransaction {
    pub reference: String,
    /// What the gateway actually charged, in kobo.
    pub amount_kobo: i64,
}

#[derive(Deserialize)]
struct VerifyEnvelope {
    status: bool,
    message: String,
    data: Option<VerifyData>,
}

#[derive(Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
    amount: i64,
}

/// Paystack API client.
#[derive(Clone)]
pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: SecretString,
    public_key: String,
}

impl PaystackClient {
    #[must_use]
    pub fn new(config: &PaystackConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_owned(),
            secret_key: config.secret_key.clone(),
            public_key: config.public_key.clone(),
        }
    }

    #[cfg(test)]
    fn with_base_url(config: &PaystackConfig, base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new(config)
        }
    }

    /// Generate a fresh transaction reference for a charge attempt.
    ///
    /// This doubles as the buyer-visible order reference once the order is
    /// recorded.
    #[must_use]
    pub fn new_reference() -> String {
        let suffix = Alphanumeric.sample_string(&mut rand::rng(), REFERENCE_LEN);
        format!("ML-{suffix}")
    }

    /// Shape the inline widget's configuration for a charge.
    ///
    /// # Errors
    ///
    /// Returns [`PaystackError::AmountOverflow`] if the total cannot be
    /// expressed in kobo.
    pub fn widget_config(
        &self,
        total: Price,
        email: &Email,
        reference: &str,
    ) -> Result<WidgetConfig, PaystackError> {
        Ok(WidgetConfig {
            public_key: self.public_key.clone(),
            email: email.as_ref().to_owned(),
            amount: total.to_kobo().ok_or(PaystackError::AmountOverflow)?,
            currency: "NGN",
            reference: reference.to_owned(),
        })
    }

    /// Verify a charge with the gateway before recording the order.
    ///
    /// # Errors
    ///
    /// Returns [`PaystackError::Gateway`] when the gateway rejects the
    /// lookup and [`PaystackError::NotSuccessful`] when the transaction
    /// exists but was not charged.
    pub async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, PaystackError> {
        let url = format!("{}/transaction/verify/{reference}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PaystackError::Gateway {
                message: format!("unknown transaction reference {reference}"),
            });
        }

        let envelope: VerifyEnvelope = response.error_for_status()?.json().await?;
        let Some(data) = envelope.data else {
            return Err(PaystackError::Gateway {
                message: envelope.message,
            });
        };
        if !envelope.status || data.status != "success" {
            return Err(PaystackError::NotSuccessful {
                status: data.status,
            });
        }

        Ok(VerifiedTransaction {
            reference: data.reference,
            amount_kobo: data.amount,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> PaystackConfig {
        PaystackConfig {
            secret_key: "sk_test_secret".into(),
            public_key: "pk_test_public".to_owned(),
        }
    }

    #[test]
    fn test_reference_shape() {
        let reference = PaystackClient::new_reference();
        assert!(reference.starts_with("ML-"));
        assert_eq!(reference.len(), 3 + REFERENCE_LEN);
        assert!(reference[3..].chars().all(char::is_alphanumeric));
        assert_ne!(reference, PaystackClient::new_reference());
    }

    #[test]
    fn test_widget_config_charges_kobo() {
        let client = PaystackClient::new(&config());
        let email = Email::parse("buyer@example.com").unwrap();
        let widget = client
            .widget_config(Price::from_naira(650_000), &email, "ML-abc123")
            .unwrap();

        assert_eq!(widget.amount, 65_000_000);
        assert_eq!(widget.currency, "NGN");
        assert_eq!(widget.public_key, "pk_test_public");
        assert_eq!(widget.reference, "ML-abc123");
    }

    #[test]
    fn test_verify_envelope_parses() {
        let body = r#"{
            "status": true,
            "message": "Verification successful",
            "data": {"status": "success", "reference": "ML-abc123", "amount": 65000000}
        }"#;
        let envelope: VerifyEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.status);
        let data = envelope.data.unwrap();
        assert_eq!(data.reference, "ML-abc123");
        assert_eq!(data.amount, 65_000_000);
    }

    #[test]
    fn test_base_url_override_is_applied() {
        let client =
            PaystackClient::with_base_url(&config(), "http://127.0.0.1:9".to_owned());
        assert_eq!(client.base_url, "http://127.0.0.1:9");
    }
}
