//! Request and response bodies of the HTTP API

pub mod notify;
pub mod otp;
pub mod worker;

pub use notify::{NotifyRequest, NotifyResponse};
pub use otp::{GenerateOtpRequest, GenerateOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
pub use worker::{PushEnvelope, PushMessageBody, WorkerResponse};
