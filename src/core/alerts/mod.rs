// Alert system module.
//
// Architecture:
// - model.rs: Alert messages, sounds and event records
// - sinks.rs: Sound, notification and overlay outputs
// - dispatcher.rs: Fans an alert out to the enabled sinks

pub mod dispatcher;
pub mod model;
pub mod sinks;
