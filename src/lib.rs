//! Looks up vaccination appointment slots by pincode and sorts each lookup
//! into a response, a request failure or a timeout.

pub mod config;
pub mod error;
pub mod pincode;
pub mod slots;

pub use config::Config;
pub use error::AppError;
pub use pincode::{Pincode, Pincodes};
pub use slots::{FailedRequest, Outcome, SlotFinder, SlotReport, SlotResponse};
