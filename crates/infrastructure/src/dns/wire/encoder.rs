use super::header::{pack_flags, HEADER_LEN};
use net_dns_query_domain::{
    DomainName, EncodeError, Header, Message, Query, Question, ResourceRecord,
};
use std::collections::HashMap;

/// Largest offset a compression pointer can address.
const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// Encodes a one-question query with the given transaction id.
pub fn encode_query(query: &Query, id: u16) -> Vec<u8> {
    let message = Message::query(id, query);
    let mut encoder = Encoder::default();
    // A query carries its one question and nothing else.
    encoder.header(&message.header, [1, 0, 0, 0]);
    for question in &message.questions {
        encoder.question(question);
    }
    encoder.out
}

/// Encodes a full message, compressing owner and question names.
///
/// RDATA is written as produced by `RecordData::to_wire`, uncompressed, so
/// decoding the output yields the same raw bytes for every record. Fails
/// when a section count or an RDATA length does not fit in 16 bits.
pub fn encode(message: &Message) -> Result<Vec<u8>, EncodeError> {
    let counts = [
        count("question", message.questions.len())?,
        count("answer", message.answers.len())?,
        count("authority", message.authorities.len())?,
        count("additional", message.additionals.len())?,
    ];

    let mut encoder = Encoder::default();
    encoder.header(&message.header, counts);
    for question in &message.questions {
        encoder.question(question);
    }
    for record in message
        .answers
        .iter()
        .chain(&message.authorities)
        .chain(&message.additionals)
    {
        encoder.record(record)?;
    }
    Ok(encoder.out)
}

fn count(section: &'static str, count: usize) -> Result<u16, EncodeError> {
    u16::try_from(count).map_err(|_| EncodeError::TooManyEntries { section, count })
}

#[derive(Default)]
struct Encoder {
    out: Vec<u8>,
    /// Lowercased wire form of a name suffix -> offset where it was written.
    suffixes: HashMap<Vec<u8>, u16>,
}

impl Encoder {
    fn header(&mut self, header: &Header, counts: [u16; 4]) {
        self.out.reserve(HEADER_LEN + 64);
        self.u16(header.id);
        self.u16(pack_flags(header));
        for count in counts {
            self.u16(count);
        }
    }

    fn question(&mut self, question: &Question) {
        self.name(&question.name);
        self.u16(question.record_type.to_u16());
        self.u16(question.record_class.to_u16());
    }

    fn record(&mut self, record: &ResourceRecord) -> Result<(), EncodeError> {
        let rdata = record.data.to_wire();
        let rdlength = u16::try_from(rdata.len()).map_err(|_| EncodeError::RdataTooLong {
            name: record.name.clone(),
            len: rdata.len(),
        })?;

        self.name(&record.name);
        self.u16(record.record_type.to_u16());
        self.u16(record.record_class.to_u16());
        self.out.extend_from_slice(&record.ttl.to_be_bytes());
        self.u16(rdlength);
        self.out.extend_from_slice(&rdata);
        Ok(())
    }

    fn name(&mut self, name: &DomainName) {
        let labels = name.labels();
        for i in 0..labels.len() {
            let suffix = suffix_key(&labels[i..]);
            if let Some(&offset) = self.suffixes.get(&suffix) {
                self.u16(0xC000 | offset);
                return;
            }
            let here = self.out.len();
            if here <= MAX_POINTER_OFFSET {
                self.suffixes.insert(suffix, here as u16);
            }
            self.out.push(labels[i].len() as u8);
            self.out.extend_from_slice(&labels[i]);
        }
        self.out.push(0);
    }

    fn u16(&mut self, value: u16) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }
}

fn suffix_key(labels: &[Vec<u8>]) -> Vec<u8> {
    let mut key = Vec::new();
    for label in labels {
        key.push(label.len() as u8);
        key.extend(label.iter().map(u8::to_ascii_lowercase));
    }
    key
}

#[cfg(test)]
mod tests {
    use super::super::decode;
    use super::*;
    use bytes::Bytes;
    use net_dns_query_domain::{RecordData, RecordType, ResponseCode};
    use std::net::Ipv4Addr;

    fn name(s: &str) -> DomainName {
        DomainName::parse(s).unwrap()
    }

    #[test]
    fn test_encode_query_layout() {
        let query = Query::new("example.test", RecordType::A).unwrap();
        let bytes = encode_query(&query, 0xABCD);
        let mut expected = vec![0xAB, 0xCD, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
        expected.extend_from_slice(&[
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 4, b't', b'e', b's', b't', 0, 0, 1, 0, 1,
        ]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_query_without_recursion_clears_rd() {
        let query = Query::new("example.test", RecordType::A)
            .unwrap()
            .without_recursion();
        let bytes = encode_query(&query, 1);
        assert_eq!(&bytes[2..4], &[0, 0]);
    }

    #[test]
    fn test_owner_names_are_compressed() {
        let query = Query::new("example.test", RecordType::A).unwrap();
        let response = Message::response_to(&Message::query(1, &query), ResponseCode::NoError)
            .with_answers(vec![ResourceRecord::new(
                name("example.test"),
                300,
                RecordData::A(Ipv4Addr::new(93, 184, 216, 34)),
            )]);
        let bytes = encode(&response).unwrap();
        // header + question + (pointer, type, class, ttl, rdlength, rdata)
        assert_eq!(bytes.len(), 12 + 18 + 2 + 10 + 4);
        assert_eq!(&bytes[30..32], &[0xC0, 12]);
    }

    #[test]
    fn test_partial_suffix_is_compressed_case_insensitively() {
        let query = Query::new("example.test", RecordType::A).unwrap();
        let mut response = Message::response_to(&Message::query(1, &query), ResponseCode::NoError);
        response.questions[0].name = DomainName::from_labels([&b"Example"[..], &b"TEST"[..]]).unwrap();
        response.answers.push(ResourceRecord::new(
            name("www.example.test"),
            60,
            RecordData::A(Ipv4Addr::LOCALHOST),
        ));
        let bytes = encode(&response).unwrap();
        assert_eq!(&bytes[30..36], &[3, b'w', b'w', b'w', 0xC0, 12]);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.questions[0].name.as_str(), "Example.TEST");
        assert_eq!(decoded.answers[0].name.as_str(), "www.example.test");
    }

    #[test]
    fn test_root_name_is_single_zero() {
        let query = Query::new(".", RecordType::NS).unwrap();
        let bytes = encode_query(&query, 0);
        assert_eq!(&bytes[12..], &[0, 0, 2, 0, 1]);
    }

    #[test]
    fn test_encode_query_matches_full_encoder() {
        let query = Query::new("example.test", RecordType::MX).unwrap();
        assert_eq!(
            encode_query(&query, 7),
            encode(&Message::query(7, &query)).unwrap()
        );
    }

    #[test]
    fn test_oversized_rdata_is_rejected() {
        let query = Query::new("big.test", RecordType::TXT).unwrap();
        let text: Vec<Bytes> = (0..300).map(|_| Bytes::from(vec![b'a'; 255])).collect();
        let response = Message::response_to(&Message::query(1, &query), ResponseCode::NoError)
            .with_answers(vec![ResourceRecord::new(
                name("big.test"),
                60,
                RecordData::Txt(text),
            )]);

        let err = encode(&response).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::RdataTooLong { len: 76800, .. }
        ));
    }
}
