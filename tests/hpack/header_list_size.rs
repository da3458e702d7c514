//! Tests for the decoder's header list size limit

use hpack_sans_io::{
    ByteSource, Decoder, DecoderConfig, Encoder, EncoderConfig, Header, HpackDecoder, HpackEncoder,
    HuffmanMode, InputBuffer,
};

use super::{decode_block, header, init_test_logging};

fn limited(max_header_size: usize) -> Decoder {
    Decoder::new(DecoderConfig::default().with_max_header_size(max_header_size))
}

#[test]
fn test_block_over_limit_is_fully_consumed_and_truncated() {
    init_test_logging();
    let mut encoder = Encoder::new(EncoderConfig::default().with_indexing(false));
    let mut wire = Vec::new();
    encoder.encode_header(&mut wire, b"x-first", b"small", false);
    encoder.encode_header(&mut wire, b"x-second", &[b'a'; 300], false);
    encoder.encode_header(&mut wire, b"x-third", b"tiny", false);

    let mut decoder = limited(100);
    let mut input = InputBuffer::from(&wire[..]);
    let mut names = Vec::new();
    decoder
        .decode(&mut input, |n, _, _| names.push(n))
        .unwrap();

    assert_eq!(input.available(), 0);
    assert_eq!(names, ["x-first"]);
    assert!(decoder.end_header_block());
}

#[test]
fn test_exact_limit_is_not_truncated() {
    let mut decoder = limited(10);
    // :method GET is 7 + 3 bytes.
    let headers = decode_block(&mut decoder, &[0x82]).unwrap();
    assert_eq!(headers, [header(":method", "GET")]);
    assert!(!decoder.end_header_block());
}

#[test]
fn test_limit_resets_per_block() {
    let mut decoder = limited(10);
    decode_block(&mut decoder, &[0x82, 0x82]).unwrap();
    assert!(decoder.end_header_block());

    let headers = decode_block(&mut decoder, &[0x82]).unwrap();
    assert_eq!(headers.len(), 1);
    assert!(!decoder.end_header_block());
}

#[test]
fn test_truncation_is_sticky_within_block() {
    let mut decoder = limited(12);
    // 10 bytes fit, 12 more do not, and the 6 after that are dropped too.
    let headers = decode_block(&mut decoder, &[0x82, 0x87, 0x84]).unwrap();
    assert_eq!(headers, [header(":method", "GET")]);
    assert!(decoder.end_header_block());
}

#[test]
fn test_tables_stay_in_sync_when_truncated() {
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::with_config(DecoderConfig::default().with_max_header_size(64));

    let big = Header::new("x-big", "b".repeat(100));
    let small = Header::new("x-small", "s");

    // The big header is indexed by the encoder even though the decoder drops it.
    let block = encoder.encode(&[big.clone(), small.clone()]);
    let headers = decoder.decode(&block).unwrap();
    assert!(headers.is_empty());
    assert!(decoder.end_header_block());

    // Both fields are now referenced by index and must resolve identically.
    let block = encoder.encode(&[small.clone(), big.clone()]);
    assert_eq!(&block[..], &[0xbe, 0xbf]);
    let headers = decoder.decode(&block).unwrap();
    assert_eq!(headers, [small]);
    assert!(decoder.end_header_block());
}

#[test]
fn test_tables_stay_in_sync_when_huffman_expands() {
    init_test_logging();
    let mut encoder = HpackEncoder::with_config(
        EncoderConfig::default()
            .with_max_header_table_size(1100)
            .with_huffman(HuffmanMode::Always),
    );
    let mut decoder = HpackDecoder::with_config(
        DecoderConfig::default()
            .with_max_header_table_size(1100)
            .with_max_header_size(10),
    );

    // Zero bytes take 13 bits each: the value is 1625 bytes on the wire, more
    // than the table holds, while the decoded entry (1033 bytes) fits.
    let big = Header::new("x", vec![0u8; 1000]);

    let block = encoder.encode(&[big.clone()]);
    assert!(block.len() > 1100);
    assert!(decoder.decode(&block).unwrap().is_empty());
    assert!(decoder.end_header_block());
    assert_eq!(encoder.encoder().dynamic_table().len(), 1);
    assert_eq!(decoder.decoder().dynamic_table().len(), 1);

    let block = encoder.encode(&[big]);
    assert_eq!(&block[..], &[0xbe]);
    assert!(decoder.decode(&block).unwrap().is_empty());
    assert!(decoder.end_header_block());
}

#[test]
fn test_never_indexed_over_limit_is_skipped() {
    let mut decoder = limited(8);
    let headers = decode_block(&mut decoder, b"\x10\x08password\x06secret").unwrap();
    assert!(headers.is_empty());
    assert!(decoder.dynamic_table().is_empty());
    assert!(decoder.end_header_block());
}
