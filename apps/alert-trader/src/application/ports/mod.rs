//! Application Ports (Driven)
//!
//! Every external collaborator the workflows consume sits behind one of these
//! traits: venue REST APIs, the tax ledger, the take-profit queue, the message
//! dispatcher and the wall clock.

mod dispatcher_port;
mod take_profit_queue_port;
mod tax_ledger_port;
mod time_source;
mod venue_port;

pub use dispatcher_port::{CronRequest, DispatchError, DispatchRequest, DispatcherPort};
pub use take_profit_queue_port::{TakeProfitItem, TakeProfitQueuePort};
pub use tax_ledger_port::{LedgerError, RealizedTrade, TaxLedgerPort};
pub use time_source::{FixedTimeSource, SystemTimeSource, TimeSource};
pub use venue_port::{VenueError, VenueFactory, VenuePort};
