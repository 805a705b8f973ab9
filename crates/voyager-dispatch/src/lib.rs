//! # voyager-dispatch
//!
//! Translates "notify contact C with context X" into channel-specific
//! [`AlertRequest`](voyager_types::AlertRequest) values. Construction is
//! pure; no call is placed and no message is sent here. Requests are
//! handed to a [`DispatchSink`], behind which external adapters perform
//! delivery.

pub mod dispatcher;
pub mod sink;

pub use dispatcher::{normalize_phone, AlertDispatcher, DispatchConfig};
pub use sink::{ChannelDispatchSink, DispatchSink, MemoryDispatchSink, TracingDispatchSink};
