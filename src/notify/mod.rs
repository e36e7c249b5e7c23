pub mod sink;

pub use sink::{AdminEntry, NotificationSink, SinkEvent};
