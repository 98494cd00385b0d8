use crate::errors::DomainError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_NAME_WIRE_LEN: usize = 255;

/// A domain name in presentation form, stored without the trailing dot.
///
/// Label bytes that are not printable ASCII, as well as `.` and `\` inside a
/// label, are kept escaped (`\DDD`, `\.`) so a name read off the wire keeps
/// its exact octets. The root name is stored as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(Arc<str>);

impl DomainName {
    pub fn root() -> Self {
        Self(Arc::from(""))
    }

    /// Parses a user supplied name. The trailing dot is optional and the
    /// result is lowercased.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidDomainName("empty name".to_string()));
        }
        if trimmed == "." {
            return Ok(Self::root());
        }
        if !trimmed.is_ascii() {
            return Err(DomainError::InvalidDomainName(format!(
                "'{}' contains non-ASCII characters",
                trimmed
            )));
        }

        let body = trimmed.strip_suffix('.').unwrap_or(trimmed);
        let labels = split_labels(body)
            .map_err(|reason| DomainError::InvalidDomainName(format!("'{}': {}", trimmed, reason)))?;

        Ok(Self::from_labels(labels)?.to_lowercase())
    }

    /// Builds a name from raw label octets, leftmost label first.
    pub fn from_labels<I, L>(labels: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut text = String::new();
        let mut wire_len = 1;

        for label in labels {
            let label = label.as_ref();
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName("empty label".to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "label of {} octets exceeds {}",
                    label.len(),
                    MAX_LABEL_LEN
                )));
            }
            wire_len += label.len() + 1;
            if wire_len > MAX_NAME_WIRE_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "name exceeds {} octets on the wire",
                    MAX_NAME_WIRE_LEN
                )));
            }
            if !text.is_empty() {
                text.push('.');
            }
            escape_label(label, &mut text);
        }

        Ok(Self(Arc::from(text)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw label octets, leftmost first. The root name has no labels.
    pub fn labels(&self) -> Vec<Vec<u8>> {
        // Construction already validated the escapes.
        split_labels(&self.0).unwrap_or_default()
    }

    /// Length of the uncompressed wire encoding, including the root octet.
    pub fn wire_len(&self) -> usize {
        self.labels().iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// DNS names compare case-insensitively.
    pub fn eq_ignore_case(&self, other: &DomainName) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    pub fn to_lowercase(&self) -> Self {
        Self(Arc::from(self.0.to_ascii_lowercase()))
    }

    pub fn to_fqdn(&self) -> String {
        format!("{}.", self.0)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn escape_label(label: &[u8], out: &mut String) {
    for &byte in label {
        match byte {
            b'.' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x21..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03}", byte)),
        }
    }
}

fn split_labels(text: &str) -> Result<Vec<Vec<u8>>, &'static str> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = text.as_bytes();
    let mut labels = Vec::new();
    let mut current = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let escaped = bytes.get(i + 1).ok_or("dangling escape")?;
                if escaped.is_ascii_digit() {
                    let digits = bytes.get(i + 1..i + 4).ok_or("short decimal escape")?;
                    if !digits.iter().all(u8::is_ascii_digit) {
                        return Err("malformed decimal escape");
                    }
                    let value = digits
                        .iter()
                        .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
                    let value = u8::try_from(value).map_err(|_| "decimal escape above 255")?;
                    current.push(value);
                    i += 4;
                } else {
                    current.push(*escaped);
                    i += 2;
                }
            }
            b'.' => {
                if current.is_empty() {
                    return Err("empty label");
                }
                labels.push(std::mem::take(&mut current));
                i += 1;
            }
            other => {
                current.push(other);
                i += 1;
            }
        }
    }

    if current.is_empty() {
        return Err("empty label");
    }
    labels.push(current);
    Ok(labels)
}
