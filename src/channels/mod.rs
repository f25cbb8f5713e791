//! Delivery channels for the dispatch engine.

pub mod channel;
pub mod email;
pub mod sms;
pub mod telegram;

pub use channel::{Channel, DeliveryOutcome, Notification, Recipient};
pub use email::{EmailChannel, EmailConfig};
pub use sms::{SmsChannel, SmsConfig};
pub use telegram::TelegramChannel;
