#![allow(dead_code)]
use net_dns_query_domain::{DomainName, RecordClass, RecordData, ResourceRecord};
use std::net::Ipv4Addr;

pub struct ResourceRecordBuilder {
    name: DomainName,
    ttl: u32,
    class: RecordClass,
    data: RecordData,
}

impl ResourceRecordBuilder {
    pub fn new() -> Self {
        Self {
            name: DomainName::parse("example.test").unwrap(),
            ttl: 300,
            class: RecordClass::IN,
            data: RecordData::A(Ipv4Addr::new(192, 0, 2, 1)),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = DomainName::parse(name).unwrap();
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn class(mut self, class: RecordClass) -> Self {
        self.class = class;
        self
    }

    pub fn data(mut self, data: RecordData) -> Self {
        self.data = data;
        self
    }

    pub fn cname(self, target: &str) -> Self {
        self.data(RecordData::Cname(DomainName::parse(target).unwrap()))
    }

    pub fn build(self) -> ResourceRecord {
        ResourceRecord::new(self.name, self.ttl, self.data).with_class(self.class)
    }
}

impl Default for ResourceRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
