/// Encode path with compact (hex-prefix) encoding
/// First nibble contains: odd_flag (bit 0) and leaf_flag (bit 1)
pub fn encode_path(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let odd_len = nibbles.len() % 2 == 1;
    let prefix = match (odd_len, is_leaf) {
        (true, true) => 0x3,
        (false, true) => 0x2,
        (true, false) => 0x1,
        (false, false) => 0x0,
    };

    let mut encoded = Vec::with_capacity(nibbles.len() / 2 + 1);
    let rest = if odd_len {
        // Odd length: prefix + first nibble in first byte
        encoded.push((prefix << 4) | nibbles[0]);
        &nibbles[1..]
    } else {
        encoded.push(prefix << 4);
        nibbles
    };
    for pair in rest.chunks(2) {
        encoded.push((pair[0] << 4) | pair[1]);
    }
    encoded
}

/// Decode compact-encoded path
/// Returns (nibbles, is_leaf)
pub fn decode_path(encoded: &[u8]) -> Result<(Vec<u8>, bool), &'static str> {
    let (&first, rest) = encoded.split_first().ok_or("empty compact path")?;

    let prefix = first >> 4;
    if prefix > 0x3 {
        return Err("invalid compact path flag");
    }
    let is_leaf = (prefix & 0x2) != 0;
    let odd_len = (prefix & 0x1) != 0;

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 1);
    if odd_len {
        nibbles.push(first & 0x0F);
    } else if first & 0x0F != 0 {
        return Err("non-zero padding in even compact path");
    }
    nibbles.extend(to_nibbles(rest));

    Ok((nibbles, is_leaf))
}

/// Convert bytes to nibbles (hex digits)
pub fn to_nibbles(data: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(data.len() * 2);
    for &byte in data {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0F);
    }
    nibbles
}
