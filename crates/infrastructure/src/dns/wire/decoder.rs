use super::header::{unpack_flags, HEADER_LEN};
use super::name::read_name;
use super::reader::WireReader;
use bytes::Bytes;
use net_dns_query_domain::{
    DecodeError, DomainName, Message, Question, RecordClass, RecordData, RecordType,
    ResourceRecord,
};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Smallest possible question: root name, type, class.
const MIN_QUESTION_LEN: usize = 5;
/// Smallest possible record: root name, type, class, ttl, rdlength.
const MIN_RECORD_LEN: usize = 11;

/// Decodes a complete DNS message.
///
/// Fails on the first malformed element; no partial message is returned.
pub fn decode(bytes: &[u8]) -> Result<Message, DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TooShort { len: bytes.len() });
    }

    let mut reader = WireReader::new(bytes);
    let id = reader.read_u16()?;
    let flags = reader.read_u16()?;
    let qdcount = usize::from(reader.read_u16()?);
    let ancount = usize::from(reader.read_u16()?);
    let nscount = usize::from(reader.read_u16()?);
    let arcount = usize::from(reader.read_u16()?);

    let records = ancount + nscount + arcount;
    let minimum = qdcount * MIN_QUESTION_LEN + records * MIN_RECORD_LEN;
    if minimum > reader.remaining() {
        return Err(DecodeError::SectionCountOverflow {
            declared: qdcount + records,
            remaining: reader.remaining(),
        });
    }

    let mut questions = Vec::with_capacity(qdcount);
    for _ in 0..qdcount {
        questions.push(read_question(&mut reader)?);
    }

    let answers = read_records(&mut reader, ancount)?;
    let authorities = read_records(&mut reader, nscount)?;
    let additionals = read_records(&mut reader, arcount)?;

    Ok(Message {
        header: unpack_flags(id, flags),
        questions,
        answers,
        authorities,
        additionals,
    })
}

fn read_question(reader: &mut WireReader<'_>) -> Result<Question, DecodeError> {
    let name = read_reader_name(reader)?;
    let record_type = RecordType::from_u16(reader.read_u16()?);
    let record_class = RecordClass::from_u16(reader.read_u16()?);
    Ok(Question {
        name,
        record_type,
        record_class,
    })
}

fn read_records(
    reader: &mut WireReader<'_>,
    count: usize,
) -> Result<Vec<ResourceRecord>, DecodeError> {
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(read_record(reader)?);
    }
    Ok(records)
}

fn read_record(reader: &mut WireReader<'_>) -> Result<ResourceRecord, DecodeError> {
    let name = read_reader_name(reader)?;
    let record_type = RecordType::from_u16(reader.read_u16()?);
    let record_class = RecordClass::from_u16(reader.read_u16()?);
    // RFC 2181 §8: a TTL with the top bit set is treated as zero.
    let ttl = match reader.read_u32()? {
        ttl if ttl & 0x8000_0000 != 0 => 0,
        ttl => ttl,
    };
    let rdlength = usize::from(reader.read_u16()?);

    let rdata_start = reader.position();
    let raw = reader.read_bytes(rdlength)?;
    let data = read_rdata(reader.message(), record_type, rdata_start, raw)?;

    Ok(ResourceRecord {
        name,
        record_type,
        record_class,
        ttl,
        raw: Bytes::copy_from_slice(raw),
        data,
    })
}

fn read_reader_name(reader: &mut WireReader<'_>) -> Result<DomainName, DecodeError> {
    let (name, next) = read_name(reader.message(), reader.position())?;
    reader.seek(next);
    Ok(name)
}

/// Interprets RDATA that occupies `message[start..start + raw.len()]`.
///
/// Names inside RDATA may point anywhere earlier in the message, but the
/// data itself must be consumed exactly.
fn read_rdata(
    message: &[u8],
    record_type: RecordType,
    start: usize,
    raw: &[u8],
) -> Result<RecordData, DecodeError> {
    let end = start + raw.len();
    let mut rdata = RdataReader {
        message,
        record_type,
        pos: start,
        end,
    };

    let data = match record_type {
        RecordType::A => {
            let octets: [u8; 4] = rdata.fixed()?;
            RecordData::A(Ipv4Addr::from(octets))
        }
        RecordType::AAAA => {
            let octets: [u8; 16] = rdata.fixed()?;
            RecordData::Aaaa(Ipv6Addr::from(octets))
        }
        RecordType::CNAME => RecordData::Cname(rdata.name()?),
        RecordType::NS => RecordData::Ns(rdata.name()?),
        RecordType::PTR => RecordData::Ptr(rdata.name()?),
        RecordType::MX => RecordData::Mx {
            preference: rdata.u16()?,
            exchange: rdata.name()?,
        },
        RecordType::TXT => {
            let mut strings = Vec::new();
            while rdata.pos < rdata.end {
                let len = usize::from(rdata.fixed::<1>()?[0]);
                strings.push(Bytes::copy_from_slice(rdata.take(len)?));
            }
            RecordData::Txt(strings)
        }
        RecordType::SOA => RecordData::Soa {
            mname: rdata.name()?,
            rname: rdata.name()?,
            serial: rdata.u32()?,
            refresh: rdata.u32()?,
            retry: rdata.u32()?,
            expire: rdata.u32()?,
            minimum: rdata.u32()?,
        },
        RecordType::SRV => RecordData::Srv {
            priority: rdata.u16()?,
            weight: rdata.u16()?,
            port: rdata.u16()?,
            target: rdata.name()?,
        },
        other => {
            rdata.pos = end;
            RecordData::Unknown {
                type_code: other.to_u16(),
                data: Bytes::copy_from_slice(raw),
            }
        }
    };

    if rdata.pos != end {
        return Err(DecodeError::InvalidRdata {
            record_type,
            offset: rdata.pos,
            reason: "trailing bytes after record data",
        });
    }
    Ok(data)
}

/// Cursor confined to one record's RDATA.
struct RdataReader<'a> {
    message: &'a [u8],
    record_type: RecordType,
    pos: usize,
    end: usize,
}

impl<'a> RdataReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.pos + len > self.end {
            return Err(DecodeError::InvalidRdata {
                record_type: self.record_type,
                offset: self.pos,
                reason: "record data shorter than its type requires",
            });
        }
        let slice = &self.message[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.fixed()?))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.fixed()?))
    }

    fn name(&mut self) -> Result<DomainName, DecodeError> {
        if self.pos >= self.end {
            return Err(DecodeError::InvalidRdata {
                record_type: self.record_type,
                offset: self.pos,
                reason: "missing name in record data",
            });
        }
        let (name, next) = read_name(self.message, self.pos)?;
        if next > self.end {
            return Err(DecodeError::InvalidRdata {
                record_type: self.record_type,
                offset: self.pos,
                reason: "name runs past the end of record data",
            });
        }
        self.pos = next;
        Ok(name)
    }
}
