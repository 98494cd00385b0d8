use net_dns_query_domain::dns_name::MAX_NAME_WIRE_LEN;
use net_dns_query_domain::{DecodeError, DomainName};
use smallvec::SmallVec;

const POINTER_TAG: u8 = 0xC0;
const LABEL_TYPE_MASK: u8 = 0xC0;

/// Upper bound on labels plus pointers visited while reading one name.
const MAX_NAME_STEPS: usize = 256;

/// Reads a possibly compressed name starting at `start`.
///
/// Returns the name and the offset just past it in the original byte
/// stream (after the first pointer when the name is compressed). Every
/// pointer must target an offset strictly before the pointer itself and no
/// offset may be jumped to twice.
pub fn read_name(message: &[u8], start: usize) -> Result<(DomainName, usize), DecodeError> {
    let mut labels: SmallVec<[&[u8]; 8]> = SmallVec::new();
    let mut visited: SmallVec<[usize; 4]> = SmallVec::new();
    let mut wire_len = 1;
    let mut resume_at: Option<usize> = None;
    let mut pos = start;

    for _ in 0..MAX_NAME_STEPS {
        let len = *message.get(pos).ok_or(DecodeError::UnexpectedEnd {
            offset: pos,
            needed: 1,
        })?;

        match len & LABEL_TYPE_MASK {
            0x00 if len == 0 => {
                let next = resume_at.unwrap_or(pos + 1);
                let name = DomainName::from_labels(labels).map_err(|_| DecodeError::MalformedName {
                    offset: start,
                    reason: "invalid label",
                })?;
                return Ok((name, next));
            }
            0x00 => {
                let len = usize::from(len);
                let end = pos + 1 + len;
                let label =
                    message
                        .get(pos + 1..end)
                        .ok_or_else(|| DecodeError::UnexpectedEnd {
                            offset: pos + 1,
                            needed: end.saturating_sub(message.len()),
                        })?;
                wire_len += len + 1;
                if wire_len > MAX_NAME_WIRE_LEN {
                    return Err(DecodeError::MalformedName {
                        offset: pos,
                        reason: "name longer than 255 octets",
                    });
                }
                labels.push(label);
                pos = end;
            }
            POINTER_TAG => {
                let low = *message.get(pos + 1).ok_or(DecodeError::UnexpectedEnd {
                    offset: pos + 1,
                    needed: 1,
                })?;
                let target = (usize::from(len & !LABEL_TYPE_MASK) << 8) | usize::from(low);
                if target == pos {
                    return Err(DecodeError::MalformedName {
                        offset: pos,
                        reason: "self-referential compression pointer",
                    });
                }
                if target > pos {
                    return Err(DecodeError::MalformedName {
                        offset: pos,
                        reason: "forward compression pointer",
                    });
                }
                if visited.contains(&target) {
                    return Err(DecodeError::MalformedName {
                        offset: pos,
                        reason: "compression pointer loop",
                    });
                }
                visited.push(target);
                resume_at.get_or_insert(pos + 2);
                pos = target;
            }
            _ => {
                return Err(DecodeError::MalformedName {
                    offset: pos,
                    reason: "reserved label type",
                })
            }
        }
    }

    Err(DecodeError::MalformedName {
        offset: start,
        reason: "too many labels and pointers",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // "example.test" at offset 0
    const EXAMPLE_TEST: &[u8] = &[
        7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 4, b't', b'e', b's', b't', 0,
    ];

    #[test]
    fn test_read_plain_name() {
        let (name, next) = read_name(EXAMPLE_TEST, 0).unwrap();
        assert_eq!(name.as_str(), "example.test");
        assert_eq!(next, EXAMPLE_TEST.len());
    }

    #[test]
    fn test_read_root_name() {
        let (name, next) = read_name(&[0], 0).unwrap();
        assert!(name.is_root());
        assert_eq!(next, 1);
    }

    #[test]
    fn test_read_compressed_suffix() {
        let mut buf = EXAMPLE_TEST.to_vec();
        // "www" + pointer to offset 0
        buf.extend_from_slice(&[3, b'w', b'w', b'w', 0xC0, 0x00]);
        let (name, next) = read_name(&buf, 14).unwrap();
        assert_eq!(name.as_str(), "www.example.test");
        assert_eq!(next, buf.len());
    }

    #[test]
    fn test_read_chained_pointers() {
        let mut buf = EXAMPLE_TEST.to_vec();
        buf.extend_from_slice(&[3, b'w', b'w', b'w', 0xC0, 0x00]); // offset 14
        buf.extend_from_slice(&[1, b'a', 0xC0, 14]); // offset 20
        let (name, next) = read_name(&buf, 20).unwrap();
        assert_eq!(name.as_str(), "a.www.example.test");
        assert_eq!(next, 24);
    }

    #[test]
    fn test_forward_pointer_is_rejected() {
        let buf = [0xC0, 0x04, 0, 0, 3, b'c', b'o', b'm', 0];
        let err = read_name(&buf, 0).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedName {
                reason: "forward compression pointer",
                ..
            }
        ));
    }

    #[test]
    fn test_self_pointer_is_rejected() {
        let buf = [0, 0, 0xC0, 0x02];
        let err = read_name(&buf, 2).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedName {
                reason: "self-referential compression pointer",
                ..
            }
        ));
    }

    #[test]
    fn test_backward_pointer_cycle_is_rejected() {
        // offset 0: label "a", then at offset 2 a pointer back to 0
        let buf = [1, b'a', 0xC0, 0x00];
        let err = read_name(&buf, 2).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedName {
                reason: "compression pointer loop",
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_label_is_unexpected_end() {
        let buf = [5, b'a', b'b'];
        assert!(matches!(
            read_name(&buf, 0),
            Err(DecodeError::UnexpectedEnd { offset: 1, .. })
        ));
    }

    #[test]
    fn test_reserved_label_type_is_rejected() {
        let buf = [0x40, 0];
        assert!(matches!(
            read_name(&buf, 0),
            Err(DecodeError::MalformedName {
                reason: "reserved label type",
                ..
            })
        ));
    }

    #[test]
    fn test_overlong_name_is_rejected() {
        let mut buf = Vec::new();
        for _ in 0..5 {
            buf.push(63);
            buf.extend(std::iter::repeat(b'a').take(63));
        }
        buf.push(0);
        assert!(matches!(
            read_name(&buf, 0),
            Err(DecodeError::MalformedName { .. })
        ));
    }
}
