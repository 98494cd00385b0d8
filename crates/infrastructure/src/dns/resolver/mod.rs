pub mod aggregate;
pub mod core;
pub mod id_generator;
pub mod options;
pub mod schedule;

pub use aggregate::{aggregate, Aggregation};
pub use self::core::DnsResolver;
pub use id_generator::{IdGenerator, RandomIdGenerator, SequenceIdGenerator};
pub use options::{Resolution, ResolverOptions};
pub use schedule::{AttemptEvent, AttemptState, Cursor, Schedule, Transition};
