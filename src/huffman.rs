//! Canonical Huffman coding of string literals (RFC 7541 Appendix B).
//!
//! Encoding packs codes most-significant-bit first and pads the last byte
//! with 1-bits, a prefix of the EOS code. Decoding walks a trie one whole
//! byte at a time: internal nodes fan out 256 ways, and a code whose length
//! is not a multiple of 8 has its terminal replicated across every slot that
//! shares its prefix, so the terminal also records how many of the 8 bits it
//! actually consumed.

use std::sync::OnceLock;

use bytes::BufMut;

use crate::error::{HpackError, Result};

/// Symbol value of the end-of-string code.
pub const EOS: u16 = 256;

/// (code, bit length) for every byte value, then EOS.
#[rustfmt::skip]
static CODES: [(u32, u8); 257] = [
    (0x1ff8, 13), (0x7fffd8, 23), (0xfffffe2, 28), (0xfffffe3, 28),
    (0xfffffe4, 28), (0xfffffe5, 28), (0xfffffe6, 28), (0xfffffe7, 28),
    (0xfffffe8, 28), (0xffffea, 24), (0x3ffffffc, 30), (0xfffffe9, 28),
    (0xfffffea, 28), (0x3ffffffd, 30), (0xfffffeb, 28), (0xfffffec, 28),
    (0xfffffed, 28), (0xfffffee, 28), (0xfffffef, 28), (0xffffff0, 28),
    (0xffffff1, 28), (0xffffff2, 28), (0x3ffffffe, 30), (0xffffff3, 28),
    (0xffffff4, 28), (0xffffff5, 28), (0xffffff6, 28), (0xffffff7, 28),
    (0xffffff8, 28), (0xffffff9, 28), (0xffffffa, 28), (0xffffffb, 28),
    (0x14, 6), (0x3f8, 10), (0x3f9, 10), (0xffa, 12),
    (0x1ff9, 13), (0x15, 6), (0xf8, 8), (0x7fa, 11),
    (0x3fa, 10), (0x3fb, 10), (0xf9, 8), (0x7fb, 11),
    (0xfa, 8), (0x16, 6), (0x17, 6), (0x18, 6),
    (0x0, 5), (0x1, 5), (0x2, 5), (0x19, 6),
    (0x1a, 6), (0x1b, 6), (0x1c, 6), (0x1d, 6),
    (0x1e, 6), (0x1f, 6), (0x5c, 7), (0xfb, 8),
    (0x7ffc, 15), (0x20, 6), (0xffb, 12), (0x3fc, 10),
    (0x1ffa, 13), (0x21, 6), (0x5d, 7), (0x5e, 7),
    (0x5f, 7), (0x60, 7), (0x61, 7), (0x62, 7),
    (0x63, 7), (0x64, 7), (0x65, 7), (0x66, 7),
    (0x67, 7), (0x68, 7), (0x69, 7), (0x6a, 7),
    (0x6b, 7), (0x6c, 7), (0x6d, 7), (0x6e, 7),
    (0x6f, 7), (0x70, 7), (0x71, 7), (0x72, 7),
    (0xfc, 8), (0x73, 7), (0xfd, 8), (0x1ffb, 13),
    (0x7fff0, 19), (0x1ffc, 13), (0x3ffc, 14), (0x22, 6),
    (0x7ffd, 15), (0x3, 5), (0x23, 6), (0x4, 5),
    (0x24, 6), (0x5, 5), (0x25, 6), (0x26, 6),
    (0x27, 6), (0x6, 5), (0x74, 7), (0x75, 7),
    (0x28, 6), (0x29, 6), (0x2a, 6), (0x7, 5),
    (0x2b, 6), (0x76, 7), (0x2c, 6), (0x8, 5),
    (0x9, 5), (0x2d, 6), (0x77, 7), (0x78, 7),
    (0x79, 7), (0x7a, 7), (0x7b, 7), (0x7ffe, 15),
    (0x7fc, 11), (0x3ffd, 14), (0x1ffd, 13), (0xffffffc, 28),
    (0xfffe6, 20), (0x3fffd2, 22), (0xfffe7, 20), (0xfffe8, 20),
    (0x3fffd3, 22), (0x3fffd4, 22), (0x3fffd5, 22), (0x7fffd9, 23),
    (0x3fffd6, 22), (0x7fffda, 23), (0x7fffdb, 23), (0x7fffdc, 23),
    (0x7fffdd, 23), (0x7fffde, 23), (0xffffeb, 24), (0x7fffdf, 23),
    (0xffffec, 24), (0xffffed, 24), (0x3fffd7, 22), (0x7fffe0, 23),
    (0xffffee, 24), (0x7fffe1, 23), (0x7fffe2, 23), (0x7fffe3, 23),
    (0x7fffe4, 23), (0x1fffdc, 21), (0x3fffd8, 22), (0x7fffe5, 23),
    (0x3fffd9, 22), (0x7fffe6, 23), (0x7fffe7, 23), (0xffffef, 24),
    (0x3fffda, 22), (0x1fffdd, 21), (0xfffe9, 20), (0x3fffdb, 22),
    (0x3fffdc, 22), (0x7fffe8, 23), (0x7fffe9, 23), (0x1fffde, 21),
    (0x7fffea, 23), (0x3fffdd, 22), (0x3fffde, 22), (0xfffff0, 24),
    (0x1fffdf, 21), (0x3fffdf, 22), (0x7fffeb, 23), (0x7fffec, 23),
    (0x1fffe0, 21), (0x1fffe1, 21), (0x3fffe0, 22), (0x1fffe2, 21),
    (0x7fffed, 23), (0x3fffe1, 22), (0x7fffee, 23), (0x7fffef, 23),
    (0xfffea, 20), (0x3fffe2, 22), (0x3fffe3, 22), (0x3fffe4, 22),
    (0x7ffff0, 23), (0x3fffe5, 22), (0x3fffe6, 22), (0x7ffff1, 23),
    (0x3ffffe0, 26), (0x3ffffe1, 26), (0xfffeb, 20), (0x7fff1, 19),
    (0x3fffe7, 22), (0x7ffff2, 23), (0x3fffe8, 22), (0x1ffffec, 25),
    (0x3ffffe2, 26), (0x3ffffe3, 26), (0x3ffffe4, 26), (0x7ffffde, 27),
    (0x7ffffdf, 27), (0x3ffffe5, 26), (0xfffff1, 24), (0x1ffffed, 25),
    (0x7fff2, 19), (0x1fffe3, 21), (0x3ffffe6, 26), (0x7ffffe0, 27),
    (0x7ffffe1, 27), (0x3ffffe7, 26), (0x7ffffe2, 27), (0xfffff2, 24),
    (0x1fffe4, 21), (0x1fffe5, 21), (0x3ffffe8, 26), (0x3ffffe9, 26),
    (0xffffffd, 28), (0x7ffffe3, 27), (0x7ffffe4, 27), (0x7ffffe5, 27),
    (0xfffec, 20), (0xfffff3, 24), (0xfffed, 20), (0x1fffe6, 21),
    (0x3fffe9, 22), (0x1fffe7, 21), (0x1fffe8, 21), (0x7ffff3, 23),
    (0x3fffea, 22), (0x3fffeb, 22), (0x1ffffee, 25), (0x1ffffef, 25),
    (0xfffff4, 24), (0xfffff5, 24), (0x3ffffea, 26), (0x7ffff4, 23),
    (0x3ffffeb, 26), (0x7ffffe6, 27), (0x3ffffec, 26), (0x3ffffed, 26),
    (0x7ffffe7, 27), (0x7ffffe8, 27), (0x7ffffe9, 27), (0x7ffffea, 27),
    (0x7ffffeb, 27), (0xffffffe, 28), (0x7ffffec, 27), (0x7ffffed, 27),
    (0x7ffffee, 27), (0x7ffffef, 27), (0x7fffff0, 27), (0x3ffffee, 26),
    (0x3fffffff, 30),
];

enum Node {
    /// Child node ids indexed by the next input byte. Id 0 is the root and is
    /// never a child, so it marks an unassigned slot.
    Internal(Box<[u16; 256]>),
    /// A decoded symbol and the number of bits of the last byte it used.
    Terminal { symbol: u16, depth: u8 },
}

struct Trie {
    nodes: Vec<Node>,
}

const ROOT: usize = 0;

static TRIE: OnceLock<Trie> = OnceLock::new();

fn trie() -> &'static Trie {
    TRIE.get_or_init(Trie::build)
}

impl Trie {
    fn build() -> Self {
        let mut trie = Trie {
            nodes: vec![Node::Internal(Box::new([0; 256]))],
        };
        for (symbol, &(code, len)) in CODES.iter().enumerate() {
            trie.insert(symbol as u16, code, len);
        }
        trie
    }

    fn insert(&mut self, symbol: u16, code: u32, mut len: u8) {
        let mut current = ROOT;
        while len > 8 {
            len -= 8;
            let i = ((code >> len) & 0xFF) as usize;
            let child = self.children(current)[i];
            current = if child == 0 {
                let id = self.push(Node::Internal(Box::new([0; 256])));
                self.children(current)[i] = id;
                id as usize
            } else {
                child as usize
            };
        }

        let terminal = self.push(Node::Terminal { symbol, depth: len });
        let shift = 8 - len;
        let start = ((code << shift) & 0xFF) as usize;
        for slot in &mut self.children(current)[start..start + (1 << shift)] {
            *slot = terminal;
        }
    }

    fn push(&mut self, node: Node) -> u16 {
        self.nodes.push(node);
        (self.nodes.len() - 1) as u16
    }

    fn children(&mut self, id: usize) -> &mut [u16; 256] {
        match &mut self.nodes[id] {
            Node::Internal(children) => children,
            Node::Terminal { .. } => unreachable!("huffman code table is not prefix-free"),
        }
    }
}

/// Number of bytes `src` occupies once Huffman coded.
pub fn encoded_len(src: &[u8]) -> usize {
    let bits: usize = src.iter().map(|&b| CODES[b as usize].1 as usize).sum();
    (bits + 7) / 8
}

/// Huffman codes `src` into `dst`.
pub fn encode<B: BufMut>(src: &[u8], dst: &mut B) {
    let mut acc: u64 = 0;
    let mut bits: u32 = 0;

    for &b in src {
        let (code, len) = CODES[b as usize];
        acc = (acc << len) | u64::from(code);
        bits += u32::from(len);

        while bits >= 8 {
            bits -= 8;
            dst.put_u8((acc >> bits) as u8);
        }
        acc &= (1u64 << bits) - 1;
    }

    if bits > 0 {
        let pad = 8 - bits;
        dst.put_u8(((acc << pad) | ((1u64 << pad) - 1)) as u8);
    }
}

/// Decodes a Huffman coded string.
pub fn decode(src: &[u8]) -> Result<Vec<u8>> {
    let nodes = &trie().nodes;
    let mut out = Vec::with_capacity(src.len() * 8 / 5);
    let mut node = ROOT;
    let mut current: u32 = 0;
    let mut bits: u32 = 0;

    for &b in src {
        current = (current << 8) | u32::from(b);
        bits += 8;

        while bits >= 8 {
            let c = ((current >> (bits - 8)) & 0xFF) as usize;
            let next = child(nodes, node, c)?;
            match nodes[next] {
                Node::Terminal { symbol, depth } => {
                    if symbol == EOS {
                        return Err(HpackError::EosDecoded);
                    }
                    out.push(symbol as u8);
                    bits -= u32::from(depth);
                    node = ROOT;
                }
                Node::Internal(_) => {
                    bits -= 8;
                    node = next;
                }
            }
        }
    }

    while bits > 0 {
        let c = ((current << (8 - bits)) & 0xFF) as usize;
        let next = child(nodes, node, c)?;
        match nodes[next] {
            Node::Terminal { symbol, depth } if u32::from(depth) <= bits => {
                if symbol == EOS {
                    return Err(HpackError::EosDecoded);
                }
                out.push(symbol as u8);
                bits -= u32::from(depth);
                node = ROOT;
            }
            _ => break,
        }
    }

    // Stopping inside an internal node means at least 8 bits of padding.
    if node != ROOT {
        return Err(HpackError::InvalidPadding);
    }
    let mask = (1u32 << bits) - 1;
    if current & mask != mask {
        return Err(HpackError::InvalidPadding);
    }

    Ok(out)
}

fn child(nodes: &[Node], node: usize, c: usize) -> Result<usize> {
    match &nodes[node] {
        Node::Internal(children) if children[c] != 0 => Ok(children[c] as usize),
        _ => Err(HpackError::InvalidHuffmanCode),
    }
}
