use net_dns_query_domain::{Header, ResponseCode};

pub const HEADER_LEN: usize = 12;

const QR: u16 = 0x8000;
const OPCODE_MASK: u16 = 0x7800;
const OPCODE_SHIFT: u16 = 11;
const AA: u16 = 0x0400;
const TC: u16 = 0x0200;
const RD: u16 = 0x0100;
const RA: u16 = 0x0080;
const RCODE_MASK: u16 = 0x000F;

pub fn pack_flags(header: &Header) -> u16 {
    let mut flags = (u16::from(header.opcode) << OPCODE_SHIFT) & OPCODE_MASK;
    if header.is_response {
        flags |= QR;
    }
    if header.authoritative {
        flags |= AA;
    }
    if header.truncated {
        flags |= TC;
    }
    if header.recursion_desired {
        flags |= RD;
    }
    if header.recursion_available {
        flags |= RA;
    }
    flags | (u16::from(header.response_code.to_u8()) & RCODE_MASK)
}

pub fn unpack_flags(id: u16, flags: u16) -> Header {
    Header {
        id,
        is_response: flags & QR != 0,
        opcode: ((flags & OPCODE_MASK) >> OPCODE_SHIFT) as u8,
        authoritative: flags & AA != 0,
        truncated: flags & TC != 0,
        recursion_desired: flags & RD != 0,
        recursion_available: flags & RA != 0,
        response_code: ResponseCode::from_u8((flags & RCODE_MASK) as u8),
    }
}

/// Transaction id of a raw message, if it is long enough to have one.
pub fn peek_id(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes([*bytes.first()?, *bytes.get(1)?]))
}

/// TC bit of a raw message without decoding the rest of it.
pub fn peek_truncated(bytes: &[u8]) -> bool {
    bytes
        .get(2)
        .is_some_and(|b| (u16::from(*b) << 8) & TC != 0)
}

/// True when `response` carries `expected_id` and has the QR bit set.
pub fn is_response_to(expected_id: u16, response: &[u8]) -> bool {
    peek_id(response) == Some(expected_id)
        && response
            .get(2)
            .is_some_and(|b| (u16::from(*b) << 8) & QR != 0)
}
