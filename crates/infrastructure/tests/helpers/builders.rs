#![allow(dead_code)]
use net_dns_query_domain::{
    DomainName, Message, RecordData, ResolverEndpoint, ResourceRecord, ResponseCode,
};
use std::net::{Ipv4Addr, SocketAddr};

pub fn name(s: &str) -> DomainName {
    DomainName::parse(s).unwrap()
}

pub fn a_record(owner: &str, ip: [u8; 4], ttl: u32) -> ResourceRecord {
    ResourceRecord::new(name(owner), ttl, RecordData::A(Ipv4Addr::from(ip)))
}

pub fn cname_record(owner: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(name(owner), 60, RecordData::Cname(name(target)))
}

/// Documentation-range endpoint, `192.0.2.<n>:53`.
pub fn endpoint(n: u8) -> ResolverEndpoint {
    ResolverEndpoint::udp(SocketAddr::from(([192, 0, 2, n], 53)))
}

pub fn response_to(query: &Message, code: ResponseCode, answers: Vec<ResourceRecord>) -> Message {
    Message::response_to(query, code).with_answers(answers)
}
