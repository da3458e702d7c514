//! Property-based tests for the codec.
//!
//! - Round trip: decode(encode(H)) == H across consecutive blocks
//! - Huffman: decode(encode(S)) == S for arbitrary bytes
//! - Integers: every prefix width round-trips every 31-bit value
//! - Dynamic table: FIFO eviction matches a queue model
//! - Resumability: any split of the input decodes identically

use std::collections::VecDeque;

use hpack_sans_io::huffman;
use hpack_sans_io::integer::{decode_integer, encode_integer};
use hpack_sans_io::{
    DecoderConfig, DynamicTable, EncoderConfig, Header, HeaderField, HpackDecoder, HpackEncoder,
    HuffmanMode, InputBuffer,
};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Header names drawn from a small pool so blocks repeat names and fields.
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(":method".to_string()),
        Just(":path".to_string()),
        Just("content-type".to_string()),
        Just("cookie".to_string()),
        "x-[a-c]{1,2}",
        "[a-z][a-z0-9-]{0,20}",
    ]
}

fn arb_value() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(b"GET".to_vec()),
        Just(b"/".to_vec()),
        proptest::collection::vec(b'a'..=b'd', 0..4),
        proptest::collection::vec(any::<u8>(), 0..64),
    ]
}

fn arb_header() -> impl Strategy<Value = Header> {
    (arb_name(), arb_value(), proptest::bool::weighted(0.1)).prop_map(|(name, value, sensitive)| {
        Header {
            name: name.into(),
            value: value.into(),
            sensitive,
        }
    })
}

fn arb_blocks() -> impl Strategy<Value = Vec<Vec<Header>>> {
    proptest::collection::vec(proptest::collection::vec(arb_header(), 0..12), 1..6)
}

fn arb_huffman_mode() -> impl Strategy<Value = HuffmanMode> {
    prop_oneof![
        Just(HuffmanMode::Auto),
        Just(HuffmanMode::Always),
        Just(HuffmanMode::Never),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_header_list_roundtrip(
        blocks in arb_blocks(),
        table_size in prop_oneof![Just(0usize), 0usize..512, Just(4096usize)],
        huffman in arb_huffman_mode(),
        use_indexing in any::<bool>(),
    ) {
        let mut encoder = HpackEncoder::with_config(
            EncoderConfig::default()
                .with_max_header_table_size(table_size)
                .with_huffman(huffman)
                .with_indexing(use_indexing),
        );
        let mut decoder = HpackDecoder::with_config(
            DecoderConfig::default()
                .with_max_header_table_size(table_size)
                .with_max_header_size(usize::MAX),
        );

        for headers in &blocks {
            let wire = encoder.encode(headers);
            let decoded = decoder.decode(&wire).unwrap();
            prop_assert!(!decoder.end_header_block());
            prop_assert_eq!(&decoded, headers);

            let ours: Vec<_> = encoder.encoder().dynamic_table().iter().cloned().collect();
            let theirs: Vec<_> = decoder.decoder().dynamic_table().iter().cloned().collect();
            prop_assert_eq!(ours, theirs);
        }
    }

    #[test]
    fn prop_split_input_decodes_identically(
        headers in proptest::collection::vec(arb_header(), 1..12),
        split in any::<prop::sample::Index>(),
    ) {
        let wire = HpackEncoder::new().encode(&headers);
        let at = split.index(wire.len() + 1);

        let mut decoder = HpackDecoder::new();
        let mut decoded = decoder.decode(&wire[..at]).unwrap();
        decoded.extend(decoder.decode(&wire[at..]).unwrap());
        prop_assert_eq!(decoded, headers);
        prop_assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn prop_huffman_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut coded = Vec::new();
        huffman::encode(&data, &mut coded);
        prop_assert_eq!(coded.len(), huffman::encoded_len(&data));
        prop_assert_eq!(huffman::decode(&coded).unwrap(), data);
    }

    #[test]
    fn prop_integer_roundtrip(
        value in prop_oneof![0usize..300, 0usize..=(i32::MAX as usize)],
        prefix_bits in 1u8..=8,
        high in any::<u8>(),
    ) {
        let mask = if prefix_bits == 8 { 0 } else { high & (0xFF << prefix_bits) };
        let mut wire = Vec::new();
        encode_integer(&mut wire, mask, prefix_bits, value);
        prop_assert_eq!(wire[0] & !(0xFFu8 >> (8 - prefix_bits)), mask);

        let mut input = InputBuffer::from(&wire[..]);
        prop_assert_eq!(decode_integer(&mut input, prefix_bits).unwrap(), Some(value));
        prop_assert!(input.is_empty());
    }

    #[test]
    fn prop_fifo_matches_queue_model(
        ops in proptest::collection::vec((0usize..40, 0usize..40, any::<bool>()), 1..80),
        capacity in 0usize..300,
    ) {
        let mut table = DynamicTable::new(capacity);
        let mut model: VecDeque<HeaderField> = VecDeque::new();

        for (name_len, value_len, shrink) in ops {
            if shrink {
                let capacity = table.capacity() / 2;
                table.set_capacity(capacity);
                while model.iter().map(HeaderField::size).sum::<usize>() > capacity {
                    model.pop_back();
                }
            } else {
                let field = HeaderField::new("n".repeat(name_len + 1), "v".repeat(value_len));
                table.add(field.clone());
                if field.size() > table.capacity() {
                    model.clear();
                } else {
                    model.push_front(field);
                    while model.iter().map(HeaderField::size).sum::<usize>() > table.capacity() {
                        model.pop_back();
                    }
                }
            }

            let actual: Vec<_> = table.iter().cloned().collect();
            prop_assert_eq!(&actual, &Vec::from(model.clone()));
            prop_assert_eq!(table.size(), model.iter().map(HeaderField::size).sum::<usize>());
            prop_assert!(table.size() <= table.capacity());
            for (i, field) in model.iter().enumerate() {
                let newest = model.iter().position(|f| f == field).unwrap_or(i);
                prop_assert_eq!(table.find(&field.name, &field.value), Some(newest + 1));
            }
        }
    }
}
