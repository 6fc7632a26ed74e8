//! External integrations and in-process services.

pub mod carts;
pub mod countdown;
pub mod mailer;
pub mod paystack;

pub use carts::{CartVault, SessionCartStorage};
pub use mailer::ResendMailer;
pub use paystack::PaystackClient;
