pub mod line_protocol;
pub mod senders;

pub use line_protocol::{Batch, BatchBuilder, FieldValue, Point};
pub use senders::{BatchPublisher, InfluxSender};
