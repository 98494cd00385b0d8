#![allow(dead_code)]
pub mod builders;
pub mod dns_server_mock;
pub mod mock_transport;

pub use builders::{a_record, cname_record, endpoint, name, response_to};
pub use dns_server_mock::{MockDnsServer, MockMode};
pub use mock_transport::{MockTransport, Reply, SentQuery};
