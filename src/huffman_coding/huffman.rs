use std::cmp::Ordering;

use crate::bitstream::bitpacker::BitPacker;
use crate::tools::rle2_mtf::MAX_ALPHA_SIZE;

use super::huffman_code_from_weights::improve_code_len_from_weights;

/// Symbols per selector group.
const GROUP_SIZE: usize = 50;
/// Table refinement passes. Julian used 4.
const ITERATIONS: usize = 4;
/// Most tables a block may carry.
const MAX_TABLES: usize = 6;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NodeData {
    Kids(Box<Node>, Box<Node>),
    Leaf(u16),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    pub weight: u32,
    pub depth: u8,
    pub syms: u32,
    pub node_data: NodeData,
}

impl Node {
    pub fn new(weight: u32, depth: u8, syms: u32, node_data: NodeData) -> Node {
        Node {
            weight,
            depth,
            syms,
            node_data,
        }
    }
}

#[allow(clippy::unusual_byte_groupings)]
/// Encode MTF/RLE2 data using Julian's multi-table system and write the
/// block trailer fields: symbol map, table count, selectors, code length
/// deltas and the coded data itself.
pub fn huf_encode(
    bp: &mut BitPacker,
    rle2: &[u16],
    freqs: &[u32; MAX_ALPHA_SIZE],
    eob: u16,
    sym_map: &[u16],
) {
    let n_mtf = rle2.len();
    // 2-6 coding tables depending on how much data the block holds.
    let table_count: usize = match n_mtf {
        0..=199 => 2,
        200..=599 => 3,
        600..=1199 => 4,
        1200..=2399 => 5,
        _ => 6,
    };
    let alpha_size = eob as usize + 1;

    let mut tables = init_tables(freqs, table_count, alpha_size);
    let selector_count = n_mtf.div_ceil(GROUP_SIZE);
    let mut selectors = vec![0_usize; selector_count];

    /*
     The initial tables are coarse frequency partitions: each symbol costs 0
     in its home table and 15 everywhere else. Each pass below walks the
     block in 50-symbol groups, charges every group to its cheapest table,
     and rebuilds each table's code lengths from the frequencies it actually
     won. The groups' final table choices become the selector list.
    */
    for iter in 0..ITERATIONS {
        let mut rfreq = [[0_u32; MAX_ALPHA_SIZE]; MAX_TABLES];

        rle2.chunks(GROUP_SIZE).enumerate().for_each(|(group, chunk)| {
            let mut cost = [0_u32; MAX_TABLES];
            chunk.iter().for_each(|&sym| {
                (0..table_count).for_each(|t| cost[t] += tables[t][sym as usize])
            });

            // First table with the lowest cost wins.
            let best = cost[..table_count]
                .iter()
                .enumerate()
                .min_by_key(|&(_, &c)| c)
                .map(|(t, _)| t)
                .unwrap();

            chunk
                .iter()
                .for_each(|&sym| rfreq[best][sym as usize] += 1);

            // Only the final pass's choices are recorded.
            if iter == ITERATIONS - 1 {
                selectors[group] = best;
            }
        });

        (0..table_count).for_each(|t| {
            improve_code_len_from_weights(&mut tables[t], &rfreq[t], eob);
        });
    }

    // Symbol maps: a 16 bit L1 word plus 0-16 words of 16 bit L2 maps.
    for &word in sym_map {
        bp.out16(word);
    }

    // A 3 bit table count, then a 15 bit selector count.
    bp.out24((3 << 24) | table_count as u32);
    bp.out24((15 << 24) | selector_count as u32);

    /*
    Selectors name the coding table for each 50-symbol group: with selectors
    [0,2,0,2,1,0], symbols 1-50 are coded by table 0, 51-100 by table 2, and
    so on. They are written move-to-front transformed and unary coded.
    */
    let mut table_order = [0_usize, 1, 2, 3, 4, 5];
    for &selector in &selectors {
        let rank = table_order
            .iter()
            .position(|&t| t == selector)
            .unwrap();
        table_order.copy_within(..rank, 1);
        table_order[0] = selector;
        for _ in 0..rank {
            bp.out24(0x01_000001);
        }
        bp.out24(0x01_000000);
    }

    // Each table is serialized as its code lengths: a 5 bit origin length,
    // then one ±1 delta sequence per symbol, each closed by a 0 bit.
    let mut code_tables: Vec<Vec<u32>> = Vec::with_capacity(table_count);
    for table in tables.iter().take(table_count) {
        code_tables.push(canonical_codes(&table[..alpha_size]));

        let mut origin = table[0];
        bp.out24((5 << 24) | origin);
        for &len in table.iter().take(alpha_size) {
            let mut delta = len as i32 - origin as i32;
            origin = len;
            loop {
                match delta.cmp(&0) {
                    Ordering::Greater => {
                        bp.out24(0x02_000002);
                        delta -= 1;
                    }
                    Ordering::Less => {
                        bp.out24(0x02_000003);
                        delta += 1;
                    }
                    Ordering::Equal => break,
                }
            }
            bp.out24(0x01_000000);
        }
    }

    // Finally the data: every symbol keys its group's table.
    rle2.chunks(GROUP_SIZE).enumerate().for_each(|(group, chunk)| {
        let codes = &code_tables[selectors[group]];
        chunk.iter().for_each(|&sym| bp.out24(codes[sym as usize]));
    });
}

/// Turn code lengths into canonical codes, BitPacker out24 format (length
/// in the top byte). Codes are sequential within each length, assigned in
/// (length, symbol) order.
fn canonical_codes(lengths: &[u32]) -> Vec<u32> {
    let mut len_sym: Vec<(u32, u16)> = lengths
        .iter()
        .enumerate()
        .map(|(sym, &len)| (len, sym as u16))
        .collect();
    len_sym.sort_unstable();

    let mut codes = vec![0_u32; lengths.len()];
    let mut next = (len_sym[0].0, 0_u32);
    for &(len, sym) in &len_sym {
        if len != next.0 {
            next.1 <<= len - next.0;
            next.0 = len;
        }
        codes[sym as usize] = (len << 24) | next.1;
        next.1 += 1;
    }
    codes
}

/// Partition the alphabet into `table_count` initial coding tables by
/// frequency share: symbols inside a table's slice cost 0, all others 15.
fn init_tables(
    freqs: &[u32; MAX_ALPHA_SIZE],
    table_count: usize,
    alpha_size: usize,
) -> [[u32; MAX_ALPHA_SIZE]; MAX_TABLES] {
    let mut tables = [[15_u32; MAX_ALPHA_SIZE]; MAX_TABLES];

    let mut remaining: i64 = freqs[..alpha_size].iter().map(|&f| f as i64).sum();
    let mut part = table_count;
    let mut gs = 0_usize;
    while part > 0 {
        let target = remaining / part as i64;
        let mut ge = gs as i64 - 1;
        let mut taken = 0_i64;
        while taken < target && ge < alpha_size as i64 - 1 {
            ge += 1;
            taken += freqs[ge as usize] as i64;
        }
        // Alternate tables give back their last symbol so the tail tables
        // are not starved.
        if ge > gs as i64
            && part != table_count
            && part != 1
            && (table_count - part) % 2 == 1
        {
            taken -= freqs[ge as usize] as i64;
            ge -= 1;
        }
        if ge >= gs as i64 {
            for v in gs..=ge as usize {
                tables[part - 1][v] = 0;
            }
        }
        part -= 1;
        gs = (ge + 1) as usize;
        remaining -= taken;
    }
    tables
}
