// Workflow orchestration: stage machine, live record, driver, HTTP handlers.
// The driver is the only writer of the record.

pub mod driver;
pub mod handlers;
pub mod record;
pub mod stage;
pub mod view;
