use serde::Deserialize;

use crate::error::AppError;
use crate::pincode::Pincode;

/// A completed HTTP exchange for one pincode.
///
/// The status code is not interpreted: 4xx and 5xx responses are kept here
/// alongside 200s and callers check `status` themselves. The body is kept
/// verbatim so it can be decoded later, or printed as-is when it is not JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotResponse {
    /// Pincode this response belongs to
    pub pincode: Pincode,
    /// HTTP status code returned by the API
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl SlotResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as untyped JSON.
    pub fn json(&self) -> Result<serde_json::Value, AppError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Decodes the body into the findByPin response structure.
    pub fn sessions(&self) -> Result<FindByPinResponse, AppError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Number of slots listed in each session, in response order.
    ///
    /// A missing `sessions` array yields no entries and a session without
    /// `slots` counts as zero.
    pub fn slot_counts(&self) -> Result<Vec<usize>, AppError> {
        Ok(self
            .sessions()?
            .sessions()
            .iter()
            .map(Session::slot_count)
            .collect())
    }
}

/// Response structure for the findByPin appointment availability endpoint
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct FindByPinResponse {
    /// Vaccination sessions available at centers in the pincode
    pub sessions: Option<Vec<Session>>,
}

impl FindByPinResponse {
    pub fn sessions(&self) -> &[Session] {
        self.sessions.as_deref().unwrap_or_default()
    }
}

/// A single session at a center. Only `slots` matters for availability; the
/// descriptive fields are optional because the API omits them freely.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Session {
    pub center_id: Option<u64>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub date: Option<String>,
    pub vaccine: Option<String>,
    pub min_age_limit: Option<u32>,
    pub available_capacity: Option<f64>,
    /// Bookable time windows (e.g. "09:00AM-11:00AM")
    pub slots: Option<Vec<serde_json::Value>>,
}

impl Session {
    pub fn slot_count(&self) -> usize {
        self.slots.as_ref().map_or(0, Vec::len)
    }
}
