//! Request instrumentation
//!
//! Wraps an outbound HTTP transport with a duration histogram and a
//! status-labeled request counter. The transport itself is a collaborator
//! behind the [`HttpTransport`] port; instrumentation is transparent and
//! never swallows the transport's failures.

mod instrumented;
mod transport;

pub use instrumented::InstrumentedHttp;
pub use transport::{HttpTransport, Method, ReqwestTransport, TransportError, TransportResponse};
