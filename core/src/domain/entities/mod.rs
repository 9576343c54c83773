//! Domain entities representing core business objects.

pub mod notification;
pub mod otp_record;


// Re-export commonly used types
pub use notification::{
    DeliveryOptions, DeliveryOutcome, NotificationEnvelope, NotificationKind,
    NotificationRequest, DEFAULT_EMAIL_SUBJECT,
};
pub use otp_record::{OtpRecord, DEFAULT_CODE_LENGTH, DEFAULT_TTL_MINUTES};
