//! Tests for HPACK encoding

use hpack_sans_io::{
    Encoder, EncoderConfig, Header, HpackDecoder, HpackEncoder, HuffmanMode,
};

use super::init_test_logging;

fn encode_one(encoder: &mut Encoder, name: &str, value: &str) -> Vec<u8> {
    let mut dst = Vec::new();
    encoder.encode_header(&mut dst, name.as_bytes(), value.as_bytes(), false);
    dst
}

#[test]
fn test_encode_indexed_header() {
    let mut encoder = HpackEncoder::new();
    let encoded = encoder.encode(&[Header::new(":method", "GET")]);

    // Index 2 in the static table.
    assert_eq!(&encoded[..], &[0x82]);
}

#[test]
fn test_encode_literal_then_indexed() {
    init_test_logging();
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::new();
    let headers = vec![Header::new("x-custom", "v")];

    let first = encoder.encode(&headers);
    assert_eq!(first[0], 0x40);
    assert_eq!(encoder.encoder().dynamic_table().len(), 1);
    assert_eq!(decoder.decode(&first).unwrap(), headers);

    let second = encoder.encode(&headers);
    assert_eq!(&second[..], &[0xbe]);
    assert_eq!(decoder.decode(&second).unwrap(), headers);
}

#[test]
fn test_encode_multiple_headers() {
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::new();
    let headers = vec![
        Header::new(":method", "GET"),
        Header::new(":path", "/"),
        Header::new(":scheme", "https"),
    ];
    let encoded = encoder.encode(&headers);
    assert_eq!(&encoded[..], &[0x82, 0x84, 0x87]);

    let decoded = decoder.decode(&encoded).unwrap();
    assert_eq!(decoded, headers);
}

#[test]
fn test_encode_sensitive_header() {
    let mut encoder = HpackEncoder::with_config(
        EncoderConfig::default().with_huffman(HuffmanMode::Never),
    );
    let mut decoder = HpackDecoder::new();
    let headers = vec![Header::sensitive("cookie", "id=1")];

    for _ in 0..2 {
        let encoded = encoder.encode(&headers);
        // Never indexed, name index 32 (15 + 17), raw value.
        assert_eq!(&encoded[..], b"\x1f\x11\x04id=1");
        assert_eq!(decoder.decode(&encoded).unwrap(), headers);
    }
    assert!(encoder.encoder().dynamic_table().is_empty());
    assert!(decoder.decoder().dynamic_table().is_empty());
}

#[test]
fn test_encode_prefers_dynamic_exact_match() {
    let mut encoder = Encoder::default();
    // Exact static match first: nothing inserted.
    assert_eq!(encode_one(&mut encoder, ":status", "200"), [0x88]);
    // Name-only static match: inserted at 62.
    encode_one(&mut encoder, ":status", "418");
    assert_eq!(encode_one(&mut encoder, ":status", "418"), [0xbe]);
}

#[test]
fn test_encode_evicts_like_decoder() {
    let config = EncoderConfig::default().with_max_header_table_size(100);
    let mut encoder = HpackEncoder::with_config(config.clone());
    let mut decoder = HpackDecoder::with_config(
        hpack_sans_io::DecoderConfig::default().with_max_header_table_size(100),
    );

    for round in 0..5 {
        let headers = vec![
            Header::new(format!("x-h{}", round), "a"),
            Header::new(format!("x-h{}", round.max(1) - 1), "a"),
        ];
        let encoded = encoder.encode(&headers);
        assert_eq!(decoder.decode(&encoded).unwrap(), headers);
        assert!(!decoder.end_header_block());

        let ours: Vec<_> = encoder.encoder().dynamic_table().iter().cloned().collect();
        let theirs: Vec<_> = decoder.decoder().dynamic_table().iter().cloned().collect();
        assert_eq!(ours, theirs);
        assert!(encoder.encoder().dynamic_table().size() <= 100);
    }
}

#[test]
fn test_encode_huffman_modes() {
    let headers = vec![Header::new("user-agent", "curl/8.0")];

    let mut always = HpackEncoder::with_config(
        EncoderConfig::default().with_huffman(HuffmanMode::Always),
    );
    let mut never = HpackEncoder::with_config(
        EncoderConfig::default().with_huffman(HuffmanMode::Never),
    );

    let coded = always.encode(&headers);
    let raw = never.encode(&headers);
    // user-agent is static index 58; the value's H bit differs.
    assert_eq!(coded[0], 0x7a);
    assert_eq!(raw[0], 0x7a);
    assert_eq!(coded[1] & 0x80, 0x80);
    assert_eq!(raw[1], 0x08);

    for encoded in [coded, raw] {
        let decoded = HpackDecoder::new().decode(&encoded).unwrap();
        assert_eq!(decoded, headers);
    }
}

#[test]
fn test_header_new() {
    let header = Header::new("content-type", "text/html");
    assert_eq!(header.name, "content-type");
    assert_eq!(header.value, "text/html");
    assert!(!header.sensitive);
}

#[test]
fn test_header_clone() {
    let header = Header::sensitive("host", "example.com");
    let cloned = header.clone();
    assert_eq!(cloned, header);
    assert!(cloned.sensitive);
}

#[test]
fn test_encode_decode_comprehensive_roundtrip() {
    // Comprehensive roundtrip with mixed pseudo + regular headers
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::new();

    let headers = vec![
        Header::new(":status", "200"),
        Header::new("content-type", "application/json"),
        Header::new("x-request-id", "abc-123-def"),
        Header::new("set-cookie", "session=xyz"),
        Header::new("set-cookie", "theme=dark"),
        Header::new("x-empty", ""),
        Header::new("x-binary", &b"\x00\xff\x7f"[..]),
    ];

    let encoded = encoder.encode(&headers);
    let decoded = decoder.decode(&encoded).unwrap();

    assert_eq!(decoded.len(), headers.len());
    for (orig, dec) in headers.iter().zip(decoded.iter()) {
        assert_eq!(orig.name, dec.name);
        assert_eq!(orig.value, dec.value);
    }
}
