//! Chat endpoint client.
//!
//! Notes:
//! - One JSON POST per attempt; attempts are strictly sequential.
//! - The transport is a trait so shells and tests can swap the network out.

mod client;
mod error;
mod manager;
mod request_options;
mod transport;
mod types;

pub use client::{normalize_reply, RequestClient};
pub use error::{AttemptError, RequestError};
pub use manager::{InFlightGuard, InFlightRegistry};
pub use transport::{ChatTransport, OfflineTransport, ReqwestTransport, Transport};
pub use types::{ChatRequestBody, HistoryEntry, HttpRequest, HttpResponse, Mode, ReplyPayload};
