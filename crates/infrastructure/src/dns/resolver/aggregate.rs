use net_dns_query_domain::{DomainName, Message, Query, RecordType, ResolveError, ResourceRecord};
use std::collections::HashSet;

/// What one answer says about a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Last name reached by following CNAME records from the queried name.
    pub final_name: DomainName,
    /// CNAME records followed to get there.
    pub hops: usize,
    /// Matching answer records, in server order.
    pub records: Vec<ResourceRecord>,
}

impl Aggregation {
    /// The chain ended on a name the answer has nothing for; the caller
    /// should ask about `final_name` directly.
    pub fn needs_follow_up(&self) -> bool {
        self.records.is_empty() && self.hops > 0
    }
}

/// Walks the answer section's CNAME chain from the queried name and keeps
/// the records that answer the query.
///
/// CNAME and ANY queries are not chased; ANY keeps every answer record.
/// A chain longer than `max_hops` or one that revisits a name fails with
/// `ChainTooLong`.
pub fn aggregate(
    message: &Message,
    query: &Query,
    max_hops: usize,
) -> Result<Aggregation, ResolveError> {
    let wanted = query.record_type();
    if matches!(wanted, RecordType::CNAME | RecordType::ANY) {
        let records = message
            .answers
            .iter()
            .filter(|r| {
                wanted == RecordType::ANY
                    || (r.record_type == RecordType::CNAME && r.name.eq_ignore_case(query.name()))
            })
            .cloned()
            .collect();
        return Ok(Aggregation {
            final_name: query.name().clone(),
            hops: 0,
            records,
        });
    }

    let mut name = query.name().clone();
    let mut visited: HashSet<DomainName> = HashSet::from([name.to_lowercase()]);
    let mut hops = 0;

    while let Some(target) = cname_of(message, &name) {
        hops += 1;
        if hops > max_hops || !visited.insert(target.to_lowercase()) {
            return Err(ResolveError::ChainTooLong {
                name: query.name().clone(),
                limit: max_hops,
            });
        }
        name = target.clone();
    }

    let records = message
        .answers
        .iter()
        .filter(|r| r.record_type == wanted && r.name.eq_ignore_case(&name))
        .cloned()
        .collect();

    Ok(Aggregation {
        final_name: name,
        hops,
        records,
    })
}

fn cname_of<'a>(message: &'a Message, owner: &DomainName) -> Option<&'a DomainName> {
    message
        .answers
        .iter()
        .filter(|r| r.name.eq_ignore_case(owner))
        .find_map(|r| r.data.cname_target())
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_dns_query_domain::{RecordData, ResponseCode};
    use std::net::Ipv4Addr;

    fn name(s: &str) -> DomainName {
        DomainName::parse(s).unwrap()
    }

    fn cname(owner: &str, target: &str) -> ResourceRecord {
        ResourceRecord::new(name(owner), 60, RecordData::Cname(name(target)))
    }

    fn a(owner: &str, last: u8) -> ResourceRecord {
        ResourceRecord::new(name(owner), 300, RecordData::A(Ipv4Addr::new(192, 0, 2, last)))
    }

    fn answer(query: &Query, answers: Vec<ResourceRecord>) -> Message {
        Message::response_to(&Message::query(1, query), ResponseCode::NoError).with_answers(answers)
    }

    #[test]
    fn test_direct_answer() {
        let query = Query::new("example.test", RecordType::A).unwrap();
        let message = answer(&query, vec![a("example.test", 1), a("example.test", 2)]);
        let result = aggregate(&message, &query, 8).unwrap();
        assert_eq!(result.hops, 0);
        assert_eq!(result.records, vec![a("example.test", 1), a("example.test", 2)]);
    }

    #[test]
    fn test_follows_chain_case_insensitively() {
        let query = Query::new("www.example.test", RecordType::A).unwrap();
        let alias = ResourceRecord::new(
            name("www.example.test"),
            60,
            RecordData::Cname(
                DomainName::from_labels([&b"Edge"[..], &b"CDN"[..], &b"test"[..]]).unwrap(),
            ),
        );
        let mut target = a("edge.cdn.test", 7);
        target.name = DomainName::from_labels([&b"EDGE"[..], &b"cdn"[..], &b"test"[..]]).unwrap();
        let message = answer(&query, vec![alias, target.clone()]);

        let result = aggregate(&message, &query, 8).unwrap();
        assert_eq!(result.hops, 1);
        assert_eq!(result.final_name.as_str(), "Edge.CDN.test");
        assert_eq!(result.records, vec![target]);
    }

    #[test]
    fn test_records_of_other_names_are_dropped() {
        let query = Query::new("example.test", RecordType::A).unwrap();
        let message = answer(&query, vec![a("other.test", 1), a("example.test", 2)]);
        let result = aggregate(&message, &query, 8).unwrap();
        assert_eq!(result.records, vec![a("example.test", 2)]);
    }

    #[test]
    fn test_broken_chain_asks_for_follow_up() {
        let query = Query::new("alias.test", RecordType::A).unwrap();
        let message = answer(&query, vec![cname("alias.test", "real.test")]);
        let result = aggregate(&message, &query, 8).unwrap();
        assert!(result.needs_follow_up());
        assert_eq!(result.final_name.as_str(), "real.test");
    }

    #[test]
    fn test_nodata_does_not_ask_for_follow_up() {
        let query = Query::new("example.test", RecordType::AAAA).unwrap();
        let message = answer(&query, vec![a("example.test", 1)]);
        let result = aggregate(&message, &query, 8).unwrap();
        assert!(result.records.is_empty());
        assert!(!result.needs_follow_up());
    }

    #[test]
    fn test_loop_is_chain_too_long() {
        let query = Query::new("a.test", RecordType::A).unwrap();
        let message = answer(&query, vec![cname("a.test", "b.test"), cname("b.test", "a.test")]);
        assert!(matches!(
            aggregate(&message, &query, 8),
            Err(ResolveError::ChainTooLong { limit: 8, .. })
        ));
    }

    #[test]
    fn test_chain_limit() {
        let query = Query::new("c0.test", RecordType::A).unwrap();
        let chain = |len: usize| {
            let mut answers: Vec<_> = (0..len)
                .map(|i| cname(&format!("c{}.test", i), &format!("c{}.test", i + 1)))
                .collect();
            answers.push(a(&format!("c{}.test", len), 1));
            answer(&query, answers)
        };

        let result = aggregate(&chain(8), &query, 8).unwrap();
        assert_eq!(result.hops, 8);
        assert_eq!(result.records.len(), 1);
        assert!(aggregate(&chain(9), &query, 8).is_err());
    }

    #[test]
    fn test_cname_query_is_not_chased() {
        let query = Query::new("alias.test", RecordType::CNAME).unwrap();
        let message = answer(
            &query,
            vec![cname("alias.test", "real.test"), a("real.test", 1)],
        );
        let result = aggregate(&message, &query, 8).unwrap();
        assert_eq!(result.hops, 0);
        assert_eq!(result.records, vec![cname("alias.test", "real.test")]);
    }
}
