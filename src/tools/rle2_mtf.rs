//! Move-to-front transform and zero-run encoding, fused into one pass over
//! the BWT data.
//!
//! The move-to-front transform concentrates the BWT output on small symbol
//! values. Runs of the zero symbol (by far the most common after MTF) are
//! then re-coded into RUNA/RUNB sequences: a run of `n` zeros is written as
//! the bijective base-2 numeral of `n` with digits RUNA=1 and RUNB=2, least
//! significant digit first. All other MTF values shift up by one to make
//! room, and a dedicated EOB symbol terminates the block.
//!
//! Encoding also returns the frequency table and symbol map consumed by the
//! Huffman stage.

use crate::tools::symbol_map::encode_sym_map;

pub const RUNA: u16 = 0;
pub const RUNB: u16 = 1;

/// Output alphabet bound: 256 symbols plus RUNA/RUNB and EOB.
pub const MAX_ALPHA_SIZE: usize = 258;

/// Transforms one block of BWT data. Returns the MTF/RLE2 symbol stream
/// (EOB terminated), the symbol frequency table, the symbol map words, and
/// the EOB symbol value.
pub fn rle2_mtf_encode(block: &[u8]) -> (Vec<u16>, [u32; MAX_ALPHA_SIZE], Vec<u16>, u16) {
    // Find every u8 used in the input.
    let mut present = [false; 256];
    for &byte in block {
        present[byte as usize] = true;
    }

    // The MTF index starts as the used symbols in ascending order.
    let mut mtf_index = [0_u8; 256];
    let mut in_use = 0_usize;
    for (sym, &used) in present.iter().enumerate() {
        if used {
            mtf_index[in_use] = sym as u8;
            in_use += 1;
        }
    }

    let eob = in_use as u16 + 1;
    let sym_map = encode_sym_map(&present);

    // Worst case one output symbol per input byte, plus EOB.
    let mut rle2 = Vec::with_capacity(block.len() + 1);
    let mut freqs = [0_u32; MAX_ALPHA_SIZE];
    let mut zeros = 0_usize;

    for &byte in block {
        let idx = mtf_index[..in_use]
            .iter()
            .position(|&sym| sym == byte)
            .unwrap();
        if idx == 0 {
            zeros += 1;
            continue;
        }

        // Not at the front, so any pending zero run is flushed first.
        if zeros > 0 {
            push_zero_run(&mut rle2, &mut freqs, zeros);
            zeros = 0;
        }

        rle2.push(idx as u16 + 1);
        freqs[idx + 1] += 1;

        // Move the symbol to the front of the index.
        mtf_index.copy_within(..idx, 1);
        mtf_index[0] = byte;
    }

    if zeros > 0 {
        push_zero_run(&mut rle2, &mut freqs, zeros);
    }

    rle2.push(eob);
    freqs[eob as usize] += 1;

    (rle2, freqs, sym_map, eob)
}

/// Write a run of `n` zeros as RUNA/RUNB symbols (bijective base 2, least
/// significant digit first).
fn push_zero_run(rle2: &mut Vec<u16>, freqs: &mut [u32; MAX_ALPHA_SIZE], mut n: usize) {
    n -= 1;
    loop {
        let digit = (n & 1) as u16; // RUNA or RUNB
        rle2.push(digit);
        freqs[digit as usize] += 1;
        if n < 2 {
            break;
        }
        n = (n - 2) >> 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mtf_without_zero_runs() {
        // Alphabet {a,b,n}, index starts [a,b,n]:
        //   b->2, a->2, n->3, a->2, n->2, a->2, then EOB = 4.
        let (rle2, freqs, sym_map, eob) = rle2_mtf_encode(b"banana");
        assert_eq!(eob, 4);
        assert_eq!(rle2, vec![2, 2, 3, 2, 2, 2, 4]);
        assert_eq!(freqs[2], 5);
        assert_eq!(freqs[3], 1);
        assert_eq!(freqs[4], 1);
        assert_eq!(freqs.iter().sum::<u32>(), rle2.len() as u32);
        // {a,b,n} live in range 6; bits 1, 2 and 14.
        assert_eq!(sym_map, vec![0x8000 >> 6, 0x4000 | 0x2000 | 0x0002]);
    }

    #[test]
    fn zero_runs_use_runa_runb() {
        // All identical bytes: first byte hits index 0 immediately, so the
        // whole block becomes one zero run of its length.
        let (rle2, freqs, _, eob) = rle2_mtf_encode(&[7_u8; 4]);
        // run of 4: n=3 -> RUNB, n=0... bijective digits: 3 = RUNB RUNA.
        assert_eq!(rle2, vec![RUNB, RUNA, eob]);
        assert_eq!(freqs[RUNA as usize], 1);
        assert_eq!(freqs[RUNB as usize], 1);
        assert_eq!(eob, 2);
    }

    #[test]
    fn single_zero_is_runa() {
        let (rle2, _, _, eob) = rle2_mtf_encode(&[42]);
        assert_eq!(rle2, vec![RUNA, eob]);
    }

    #[test]
    fn run_lengths_one_through_eight() {
        // Check the bijective base-2 digit strings for small runs.
        let expect: [&[u16]; 8] = [
            &[RUNA],
            &[RUNB],
            &[RUNA, RUNA],
            &[RUNB, RUNA],
            &[RUNA, RUNB],
            &[RUNB, RUNB],
            &[RUNA, RUNA, RUNA],
            &[RUNB, RUNA, RUNA],
        ];
        for (run, digits) in expect.iter().enumerate() {
            let mut rle2 = Vec::new();
            let mut freqs = [0_u32; MAX_ALPHA_SIZE];
            push_zero_run(&mut rle2, &mut freqs, run + 1);
            assert_eq!(&rle2, digits, "run of {}", run + 1);
        }
    }

    #[test]
    fn trailing_symbols_shift_index() {
        // "aab": index [a,b]; a->0 (zero run), a->0, b->1 -> run of 2 (RUNB)
        // then symbol 2, then EOB 3.
        let (rle2, _, _, eob) = rle2_mtf_encode(b"aab");
        assert_eq!(eob, 3);
        assert_eq!(rle2, vec![RUNB, 2, 3]);
    }
}
