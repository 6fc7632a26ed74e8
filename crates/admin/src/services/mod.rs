//! External integrations for the back-office.

pub mod background_removal;

pub use background_removal::BackgroundRemover;
