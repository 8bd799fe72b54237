use filecoin_parser::{Address, BigInt, ParserContext, ParserError, Transaction};

// Minimal canonical CBOR writer for building messages
fn head(out: &mut Vec<u8>, major: u8, n: u64) {
    let m = major << 5;
    match n {
        0..=23 => out.push(m | n as u8),
        24..=0xff => out.extend([m | 24, n as u8]),
        0x100..=0xffff => {
            out.push(m | 25);
            out.extend((n as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(m | 26);
            out.extend((n as u32).to_be_bytes());
        }
        _ => {
            out.push(m | 27);
            out.extend(n.to_be_bytes());
        }
    }
}

fn uint(out: &mut Vec<u8>, n: u64) {
    head(out, 0, n);
}

fn int(out: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        head(out, 0, n as u64);
    } else {
        head(out, 1, (-1 - n) as u64);
    }
}

fn bytes(out: &mut Vec<u8>, b: &[u8]) {
    head(out, 2, b.len() as u64);
    out.extend_from_slice(b);
}

fn text(out: &mut Vec<u8>, s: &str) {
    head(out, 3, s.len() as u64);
    out.extend_from_slice(s.as_bytes());
}

const ID_ADDRESS: [u8; 3] = [0x00, 0xd2, 0x09];

fn secp_address() -> Vec<u8> {
    let mut a = vec![0x01];
    a.extend([0x5a; 20]);
    a
}

struct Message {
    version: i64,
    to: Vec<u8>,
    from: Vec<u8>,
    nonce: u64,
    value: Vec<u8>,
    gas_limit: i64,
    gas_fee_cap: Vec<u8>,
    gas_premium: Vec<u8>,
    method: u64,
    params: Option<Vec<u8>>,
}

impl Default for Message {
    fn default() -> Self {
        Message {
            version: 0,
            to: ID_ADDRESS.to_vec(),
            from: secp_address(),
            nonce: 0,
            value: vec![],
            gas_limit: 1000,
            gas_fee_cap: vec![0x00, 0x01, 0x00],
            gas_premium: vec![0x00, 0x01],
            method: 0,
            params: Some(vec![]),
        }
    }
}

impl Message {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        head(&mut out, 4, if self.params.is_some() { 10 } else { 9 });
        int(&mut out, self.version);
        bytes(&mut out, &self.to);
        bytes(&mut out, &self.from);
        uint(&mut out, self.nonce);
        bytes(&mut out, &self.value);
        int(&mut out, self.gas_limit);
        bytes(&mut out, &self.gas_fee_cap);
        bytes(&mut out, &self.gas_premium);
        uint(&mut out, self.method);
        if let Some(params) = &self.params {
            bytes(&mut out, params);
        }
        out
    }
}

fn three_params() -> Vec<u8> {
    let mut p = Vec::new();
    head(&mut p, 4, 3);
    bytes(&mut p, &[0xde, 0xad]);
    text(&mut p, "second");
    int(&mut p, -7);
    p
}

fn c_str(buf: &[u8]) -> &str {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..end]).unwrap()
}

fn parsed(msg: &Message) -> ParserContext {
    let mut ctx = ParserContext::new();
    ctx.parse(&msg.encode()).unwrap();
    ctx.validate().unwrap();
    ctx
}

#[test]
fn transfer_end_to_end() {
    let ctx = parsed(&Message::default());
    assert_eq!(ctx.num_items(), 8);

    let mut key = [0u8; 40];
    let mut val = [0u8; 40];
    assert_eq!(ctx.get_item(7, &mut key, &mut val, 0), Ok(1));
    assert_eq!(c_str(&key), "Method ");
    assert_eq!(c_str(&val), "Transfer ");

    assert_eq!(ctx.get_item(0, &mut key, &mut val, 0), Ok(1));
    assert_eq!(c_str(&key), "To ");
    assert!(c_str(&val).ends_with("01234"));

    // Empty value buffer is zero
    ctx.get_item(3, &mut key, &mut val, 0).unwrap();
    assert_eq!(c_str(&key), "Value ");
    assert_eq!(c_str(&val), "0.000000000000000000");

    assert_eq!(
        ctx.get_item(8, &mut key, &mut val, 0),
        Err(ParserError::NoData)
    );
}

#[test]
fn transfer_never_shows_params() {
    for nonce in [0, 1, 99, u64::MAX] {
        let msg = Message {
            nonce,
            ..Default::default()
        };
        assert_eq!(parsed(&msg).num_items(), 8);
    }
}

#[test]
fn method_params_are_rendered_one_at_a_time() {
    let msg = Message {
        method: 7,
        params: Some(three_params()),
        ..Default::default()
    };
    let ctx = parsed(&msg);
    assert_eq!(ctx.num_items(), 11);

    let mut key = [0u8; 40];
    let mut val = [0u8; 40];
    assert_eq!(ctx.get_item(10, &mut key, &mut val, 0), Ok(1));
    assert_eq!(c_str(&key), "Params |3| ");
    assert_eq!(c_str(&val), "-7");

    ctx.get_item(8, &mut key, &mut val, 0).unwrap();
    assert_eq!(c_str(&key), "Params |1| ");
    assert_eq!(c_str(&val), "dead");

    ctx.get_item(9, &mut key, &mut val, 0).unwrap();
    assert_eq!(c_str(&val), "second");

    ctx.get_item(7, &mut key, &mut val, 0).unwrap();
    assert_eq!(c_str(&val), "7");
}

#[test]
fn trailing_byte_after_nine_fields() {
    let msg = Message {
        params: None,
        ..Default::default()
    };
    let mut blob = msg.encode();
    blob.push(0x00);

    let mut ctx = ParserContext::new();
    assert_eq!(ctx.parse(&blob), Err(ParserError::UnexpectedTrailingData));
}

#[test]
fn secp_address_length_off_by_one() {
    let mut short = secp_address();
    short.pop();
    let mut long = secp_address();
    long.push(0x00);

    for addr in [short, long] {
        let msg = Message {
            from: addr.clone(),
            ..Default::default()
        };
        let mut ctx = ParserContext::new();
        assert_eq!(ctx.parse(&msg.encode()), Err(ParserError::InvalidAddress));
        assert_eq!(Address::try_from(addr.as_slice()), Err(ParserError::InvalidAddress));
    }
}

#[test]
fn address_keeps_protocol_and_payload() {
    let raw = secp_address();
    let tx = Transaction::from_bytes(
        &Message {
            to: raw.clone(),
            ..Default::default()
        }
        .encode(),
    )
    .unwrap();
    assert_eq!(tx.to.protocol(), Some(0x01));
    assert_eq!(tx.to.payload(), &raw[1..]);
    assert_eq!(tx.to.as_bytes(), raw.as_slice());
    assert_eq!(tx.from.as_bytes(), secp_address().as_slice());
}

#[test]
fn negative_bigints_are_rejected() {
    for sign in 1u8..=0xff {
        let buf = [sign, 0x01];
        assert_eq!(BigInt::try_from(&buf[..]), Err(ParserError::UnexpectedValue));

        let msg = Message {
            gas_premium: buf.to_vec(),
            ..Default::default()
        };
        let mut ctx = ParserContext::new();
        assert_eq!(ctx.parse(&msg.encode()), Err(ParserError::UnexpectedValue));
    }
}

#[test]
fn get_item_is_idempotent() {
    let msg = Message {
        method: 7,
        params: Some(three_params()),
        ..Default::default()
    };
    let ctx = parsed(&msg);

    for idx in 0..ctx.num_items() {
        let mut key_a = [0u8; 16];
        let mut val_a = [0u8; 16];
        let mut key_b = [0xffu8; 16];
        let mut val_b = [0xffu8; 16];
        let pages_a = ctx.get_item(idx, &mut key_a, &mut val_a, 0).unwrap();
        let pages_b = ctx.get_item(idx, &mut key_b, &mut val_b, 0).unwrap();
        assert_eq!(pages_a, pages_b);
        assert_eq!(key_a, key_b);
        assert_eq!(val_a, val_b);
    }
}

#[test]
fn pages_concatenate_to_the_full_value() {
    let ctx = parsed(&Message::default());

    let mut key = [0u8; 40];
    let mut wide = [0u8; 64];
    ctx.get_item(1, &mut key, &mut wide, 0).unwrap();
    let full = c_str(&wide).to_string();
    assert_eq!(full.len(), 41);

    let mut narrow = [0u8; 8];
    let pages = ctx.get_item(1, &mut key, &mut narrow, 0).unwrap();
    assert_eq!(pages as usize, full.len().div_ceil(7));

    let mut joined = String::new();
    for page in 0..pages {
        ctx.get_item(1, &mut key, &mut narrow, page).unwrap();
        joined.push_str(c_str(&narrow));
    }
    assert_eq!(joined, full);

    assert_eq!(
        ctx.get_item(1, &mut key, &mut narrow, pages),
        Err(ParserError::DisplayPageOutOfRange)
    );
    assert_eq!(
        ctx.get_item(1, &mut key, &mut narrow, u8::MAX),
        Err(ParserError::DisplayPageOutOfRange)
    );
}

#[test]
fn single_page_items_reject_other_pages() {
    let ctx = parsed(&Message::default());
    let mut key = [0u8; 40];
    let mut val = [0u8; 40];
    for idx in [2u8, 4, 7] {
        assert_eq!(ctx.get_item(idx, &mut key, &mut val, 0), Ok(1));
        assert_eq!(
            ctx.get_item(idx, &mut key, &mut val, 1),
            Err(ParserError::DisplayPageOutOfRange)
        );
    }
}

#[test]
fn non_canonical_encodings_are_distinct_errors() {
    // nonce written as 0x18 0x05
    let mut blob = Message::default().encode();
    let nonce_at = 1 + 1 + 4 + 1 + 21;
    assert_eq!(blob[nonce_at], 0x00);
    blob[nonce_at] = 0x05;
    blob.insert(nonce_at, 0x18);

    let mut ctx = ParserContext::new();
    assert_eq!(ctx.parse(&blob), Err(ParserError::CborNotCanonical));

    let mut truncated = Message::default().encode();
    truncated.pop();
    truncated.pop();
    assert_eq!(ctx.parse(&truncated), Err(ParserError::CborUnexpectedEof));
}

#[test]
fn new_parse_replaces_previous_transaction() {
    let mut ctx = parsed(&Message {
        method: 7,
        params: Some(three_params()),
        ..Default::default()
    });
    assert_eq!(ctx.num_items(), 11);

    ctx.parse(&Message::default().encode()).unwrap();
    assert_eq!(ctx.num_items(), 8);

    assert!(ctx.parse(&[0x8a]).is_err());
    assert_eq!(ctx.num_items(), 0);
    assert_eq!(ctx.validate(), Err(ParserError::NoData));
}

#[test]
fn tiny_value_buffer_is_reported() {
    let ctx = parsed(&Message::default());
    let mut key = [0u8; 40];
    let mut val = [0u8; 1];
    assert_eq!(
        ctx.get_item(0, &mut key, &mut val, 0),
        Err(ParserError::UnexpectedBufferEnd)
    );
}
