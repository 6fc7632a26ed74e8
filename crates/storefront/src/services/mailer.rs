//! Order confirmation email over the Resend HTTP API.
//!
//! Rendering uses an Askama template under `templates/email/`; delivery is
//! a single POST. The sequencer treats delivery failure as non-fatal, so
//! this client reports errors rather than retrying.

use askama::Template;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::checkout::{ConfirmationEmail, ConfirmationMailer};
use crate::config::ResendConfig;

const RESEND_URL: &str = "https://api.resend.com/emails";

/// Errors from rendering or delivering mail.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// Transport failure reaching the mail API.
    #[error("mail request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail API answered with an error status.
    #[error("mail api error {status}: {message}")]
    Api { status: u16, message: String },

    /// Template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationTemplate<'a> {
    recipient_name: &'a str,
    order_reference: &'a str,
    items: Vec<RenderedLine>,
    total: String,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    includes_drop: bool,
}

struct RenderedLine {
    product_name: String,
    quantity: u32,
    line_total: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    reply_to: &'a str,
    subject: String,
    html: String,
}

/// Resend API client.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: SecretString,
    from_address: String,
    reply_to: String,
}

impl ResendMailer {
    #[must_use]
    pub fn new(config: &ResendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            reply_to: config.reply_to.clone(),
        }
    }

    fn render(email: &ConfirmationEmail) -> Result<String, MailerError> {
        let template = OrderConfirmationTemplate {
            recipient_name: &email.recipient_name,
            order_reference: &email.order_reference,
            items: email
                .items
                .iter()
                .map(|line| RenderedLine {
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    line_total: line.line_total.to_string(),
                })
                .collect(),
            total: email.total.to_string(),
            address: &email.address,
            city: &email.city,
            state: &email.state,
            includes_drop: email.includes_drop,
        };
        Ok(template.render()?)
    }
}

impl ConfirmationMailer for ResendMailer {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), MailerError> {
        let html = Self::render(email)?;
        let request = SendRequest {
            from: &self.from_address,
            to: vec![email.to.as_ref()],
            reply_to: &self.reply_to,
            subject: format!("Order Confirmed - {}", email.order_reference),
            html,
        };

        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(MailerError::Api { status, message });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maison_core::{Email, Price};

    use crate::checkout::ConfirmationLine;

    use super::*;

    fn sample() -> ConfirmationEmail {
        ConfirmationEmail {
            to: Email::parse("ada@example.com").unwrap(),
            recipient_name: "Ada".to_owned(),
            order_reference: "ML-abc123".to_owned(),
            items: vec![ConfirmationLine {
                product_name: "Silk Scarf".to_owned(),
                quantity: 2,
                line_total: Price::from_naira(100_000),
            }],
            total: Price::from_naira(100_000),
            address: "12 Bourdillon Road".to_owned(),
            city: "Ikoyi".to_owned(),
            state: "Lagos".to_owned(),
            includes_drop: false,
        }
    }

    #[test]
    fn test_renders_order_details() {
        let html = ResendMailer::render(&sample()).unwrap();
        assert!(html.contains("Ada"));
        assert!(html.contains("ML-abc123"));
        assert!(html.contains("Silk Scarf"));
        assert!(html.contains("\u{20a6}100000"));
        assert!(!html.contains("reserved until its release"));
    }

    #[test]
    fn test_drop_orders_mention_deferred_shipment() {
        let email = ConfirmationEmail {
            includes_drop: true,
            ..sample()
        };
        let html = ResendMailer::render(&email).unwrap();
        assert!(html.contains("reserved until its release"));
    }
}
