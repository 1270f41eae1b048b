//! Burrows-Wheeler transform entry point with algorithm selection.
//!
//! The native sort compares whole rotations and parallelizes with rayon,
//! which is fast on ordinary data but degenerates on long runs and small
//! alphabets. A cheap sample test routes such blocks to the SA-IS sort
//! instead.

use std::cmp::Ordering;

use log::debug;
use rayon::prelude::*;

use super::sais::sais_bwt;
use crate::tools::freq_count::freqs;

/// Blocks below this size are not worth the comparison sort setup.
const SAIS_MIN: usize = 3_000;
/// How much of the block the repetitiveness probe looks at.
const SAMPLE_SIZE: usize = 5_000;
/// Native sort goes parallel above this block size.
const PAR_SORT_MIN: usize = 40_000;

/// Transform one block. Returns the key (the sorted row holding the
/// unrotated block) and the last column of the sorted rotation matrix.
pub fn bwt_encode(data: &[u8]) -> (u32, Vec<u8>) {
    if data.len() < SAIS_MIN || prefers_sais(&data[..SAMPLE_SIZE.min(data.len())]) {
        debug!("block sort: sa-is ({} bytes)", data.len());
        return sais_bwt(data);
    }
    debug!("block sort: native ({} bytes)", data.len());

    let mut index: Vec<u32> = (0..data.len() as u32).collect();
    if data.len() > PAR_SORT_MIN {
        index.par_sort_unstable_by(|&a, &b| rotation_order(a as usize, b as usize, data));
    } else {
        index.sort_unstable_by(|&a, &b| rotation_order(a as usize, b as usize, data));
    }

    let mut key = 0_u32;
    let mut bwt = vec![0_u8; data.len()];
    for (row, &start) in index.iter().enumerate() {
        if start == 0 {
            key = row as u32;
        }
        bwt[row] = if start == 0 {
            data[data.len() - 1]
        } else {
            data[start as usize - 1]
        };
    }
    (key, bwt)
}

/// Compare the rotations starting at `a` and `b`.
fn rotation_order(a: usize, b: usize, block: &[u8]) -> Ordering {
    block[a..]
        .iter()
        .chain(&block[..a])
        .cmp(block[b..].iter().chain(&block[..b]))
}

/// Probe a sample of the block for the data shapes that starve the
/// comparison sort: few distinct symbols, one dominant symbol, or long runs.
fn prefers_sais(sample: &[u8]) -> bool {
    let freq = freqs(sample);
    let in_use = freq.iter().filter(|&&f| f != 0).count();
    let dominant = *freq.iter().max().unwrap() as usize;
    if in_use < 20 || dominant * 10 / sample.len() >= 3 {
        return true;
    }

    let mut longest = 0_usize;
    let mut run = 1_usize;
    for pair in sample.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest * 10 / sample.len() > 2
}
