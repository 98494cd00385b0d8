use super::{RecordClass, RecordType};
use crate::dns_name::DomainName;
use bytes::Bytes;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Typed view of a record's RDATA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(DomainName),
    Ns(DomainName),
    Ptr(DomainName),
    Mx {
        preference: u16,
        exchange: DomainName,
    },
    Txt(Vec<Bytes>),
    Soa {
        mname: DomainName,
        rname: DomainName,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: DomainName,
    },
    /// Types this crate does not interpret; the data is kept verbatim.
    Unknown { type_code: u16, data: Bytes },
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Ns(_) => RecordType::NS,
            RecordData::Ptr(_) => RecordType::PTR,
            RecordData::Mx { .. } => RecordType::MX,
            RecordData::Txt(_) => RecordType::TXT,
            RecordData::Soa { .. } => RecordType::SOA,
            RecordData::Srv { .. } => RecordType::SRV,
            RecordData::Unknown { type_code, .. } => RecordType::from_u16(*type_code),
        }
    }

    /// Uncompressed wire encoding of the data.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            RecordData::A(addr) => out.extend_from_slice(&addr.octets()),
            RecordData::Aaaa(addr) => out.extend_from_slice(&addr.octets()),
            RecordData::Cname(name) | RecordData::Ns(name) | RecordData::Ptr(name) => {
                push_name(&mut out, name)
            }
            RecordData::Mx {
                preference,
                exchange,
            } => {
                out.extend_from_slice(&preference.to_be_bytes());
                push_name(&mut out, exchange);
            }
            RecordData::Txt(strings) => {
                for s in strings {
                    // Character-strings carry a one-octet length, so longer
                    // text is split across consecutive strings.
                    if s.is_empty() {
                        out.push(0);
                    }
                    for chunk in s.chunks(255) {
                        out.push(chunk.len() as u8);
                        out.extend_from_slice(chunk);
                    }
                }
            }
            RecordData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                push_name(&mut out, mname);
                push_name(&mut out, rname);
                for value in [serial, refresh, retry, expire, minimum] {
                    out.extend_from_slice(&value.to_be_bytes());
                }
            }
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => {
                out.extend_from_slice(&priority.to_be_bytes());
                out.extend_from_slice(&weight.to_be_bytes());
                out.extend_from_slice(&port.to_be_bytes());
                push_name(&mut out, target);
            }
            RecordData::Unknown { data, .. } => out.extend_from_slice(data),
        }
        out
    }

    /// The alias target, for CNAME data.
    pub fn cname_target(&self) -> Option<&DomainName> {
        match self {
            RecordData::Cname(target) => Some(target),
            _ => None,
        }
    }
}

fn push_name(out: &mut Vec<u8>, name: &DomainName) {
    for label in name.labels() {
        out.push(label.len() as u8);
        out.extend_from_slice(&label);
    }
    out.push(0);
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(addr) => write!(f, "{}", addr),
            RecordData::Aaaa(addr) => write!(f, "{}", addr),
            RecordData::Cname(name) | RecordData::Ns(name) | RecordData::Ptr(name) => {
                write!(f, "{}", name.to_fqdn())
            }
            RecordData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange.to_fqdn()),
            RecordData::Txt(strings) => {
                let quoted: Vec<String> = strings.iter().map(|s| quote_character_string(s)).collect();
                write!(f, "{}", quoted.join(" "))
            }
            RecordData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                mname.to_fqdn(),
                rname.to_fqdn(),
                serial,
                refresh,
                retry,
                expire,
                minimum
            ),
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(f, "{} {} {} {}", priority, weight, port, target.to_fqdn()),
            RecordData::Unknown { data, .. } => {
                write!(f, "\\# {}", data.len())?;
                if !data.is_empty() {
                    write!(f, " ")?;
                    for byte in data.iter() {
                        write!(f, "{:02x}", byte)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn quote_character_string(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for &byte in raw {
        match byte {
            b'"' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03}", byte)),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: DomainName,

    pub record_type: RecordType,

    pub record_class: RecordClass,

    /// Seconds the record may be treated as valid.
    pub ttl: u32,

    /// RDATA exactly as it appeared on the wire.
    pub raw: Bytes,

    pub data: RecordData,
}

impl ResourceRecord {
    /// Builds an IN-class record whose raw bytes are the uncompressed
    /// encoding of `data`.
    pub fn new(name: DomainName, ttl: u32, data: RecordData) -> Self {
        Self {
            name,
            record_type: data.record_type(),
            record_class: RecordClass::IN,
            ttl,
            raw: Bytes::from(data.to_wire()),
            data,
        }
    }

    pub fn with_class(mut self, record_class: RecordClass) -> Self {
        self.record_class = record_class;
        self
    }

    pub fn address(&self) -> Option<IpAddr> {
        match self.data {
            RecordData::A(addr) => Some(IpAddr::V4(addr)),
            RecordData::Aaaa(addr) => Some(IpAddr::V6(addr)),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name.to_fqdn(),
            self.ttl,
            self.record_class,
            self.record_type,
            self.data
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DomainName {
        DomainName::parse(s).unwrap()
    }

    #[test]
    fn test_new_derives_type_and_raw() {
        let record = ResourceRecord::new(
            name("example.test"),
            300,
            RecordData::A(Ipv4Addr::new(93, 184, 216, 34)),
        );
        assert_eq!(record.record_type, RecordType::A);
        assert_eq!(record.record_class, RecordClass::IN);
        assert_eq!(&record.raw[..], &[93, 184, 216, 34]);
        assert_eq!(record.address(), Some("93.184.216.34".parse().unwrap()));
    }

    #[test]
    fn test_mx_wire_form() {
        let data = RecordData::Mx {
            preference: 10,
            exchange: name("mail.test"),
        };
        assert_eq!(
            data.to_wire(),
            vec![0, 10, 4, b'm', b'a', b'i', b'l', 4, b't', b'e', b's', b't', 0]
        );
    }

    #[test]
    fn test_unknown_type_follows_code() {
        let data = RecordData::Unknown {
            type_code: 99,
            data: Bytes::from_static(&[1, 2]),
        };
        assert_eq!(data.record_type(), RecordType::Unknown(99));
        assert_eq!(data.to_string(), "\\# 2 0102");
    }

    #[test]
    fn test_txt_display_quotes_and_escapes() {
        let data = RecordData::Txt(vec![
            Bytes::from_static(b"v=spf1 -all"),
            Bytes::from_static(b"say \"hi\""),
        ]);
        assert_eq!(data.to_string(), "\"v=spf1 -all\" \"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_long_txt_string_is_split_not_truncated() {
        let text = vec![b'x'; 300];
        let data = RecordData::Txt(vec![Bytes::from(text), Bytes::new()]);

        let wire = data.to_wire();
        assert_eq!(wire.len(), 1 + 255 + 1 + 45 + 1);
        assert_eq!(wire[0], 255);
        assert_eq!(wire[256], 45);
        assert_eq!(wire[302], 0);
        assert!(wire[1..256].iter().chain(&wire[257..302]).all(|&b| b == b'x'));
    }

    #[test]
    fn test_record_display() {
        let record = ResourceRecord::new(
            name("www.test"),
            60,
            RecordData::Cname(name("web.test")),
        );
        assert_eq!(record.to_string(), "www.test.\t60\tIN\tCNAME\tweb.test.");
    }
}
