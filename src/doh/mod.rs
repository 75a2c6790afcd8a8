//! DNS-over-HTTPS forwarding.
//!
//! - `codec.rs`: base64url for the `dns` query parameter
//! - `translator.rs`: request rewrite and POST → GET translation
//! - `upstream.rs`: the network seam and its reqwest implementation

pub mod codec;
pub mod translator;
pub mod upstream;

pub use codec::{base64url_decode, base64url_encode};
pub use translator::DohTranslator;
pub use upstream::{HttpUpstream, OutboundRequest, Upstream};
