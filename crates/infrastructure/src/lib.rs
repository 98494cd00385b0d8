//! net-dns-query infrastructure: wire codec, transports and the query scheduler
pub mod dns;
