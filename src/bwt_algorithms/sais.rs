//! SA-IS based Burrows-Wheeler transform.
//!
//! SA-IS builds a suffix array, but BZIP2 sorts *rotations*, which wrap
//! around the end of the block. Rotating the block to its lexicographically
//! minimal rotation first makes the two orders coincide, so the transform
//! here is: rotate, suffix-sort, then map the row of the original start
//! position back out as the key.
//!
//! Credit to https://github.com/torfmaster/ribzip2 for the minimal-rotation
//! observation.

const EMPTY: u32 = u32::MAX;

/// Burrows-Wheeler transform of the rotations of `data` via SA-IS.
/// Returns the key (row of the unrotated block) and the transformed data.
pub fn sais_bwt(data: &[u8]) -> (u32, Vec<u8>) {
    let n = data.len();
    let offset = least_rotation(data);

    // Work on the minimal rotation; suffix order then equals rotation order.
    let mut rotated = Vec::with_capacity(n);
    rotated.extend_from_slice(&data[offset..]);
    rotated.extend_from_slice(&data[..offset]);

    // Shift the alphabet up one to make room for a unique sentinel.
    let text: Vec<u32> = rotated
        .iter()
        .map(|&b| b as u32 + 1)
        .chain(std::iter::once(0))
        .collect();
    let sa = sa_is(&text, 257);

    // The original block starts at this position of the rotated block.
    let zero_pos = ((n - offset) % n) as u32;

    let mut key = 0_u32;
    let mut bwt = vec![0_u8; n];
    // sa[0] is the sentinel suffix; the real suffixes follow.
    for (row, &p) in sa[1..].iter().enumerate() {
        if p == zero_pos {
            key = row as u32;
        }
        bwt[row] = if p == 0 {
            rotated[n - 1]
        } else {
            rotated[p as usize - 1]
        };
    }
    (key, bwt)
}

/// Index of the lexicographically minimal rotation of `s` (two-pointer
/// tournament over the cyclic string).
pub fn least_rotation(s: &[u8]) -> usize {
    let n = s.len();
    if n < 2 {
        return 0;
    }
    let (mut i, mut j, mut k) = (0_usize, 1_usize, 0_usize);
    while i < n && j < n && k < n {
        let a = s[(i + k) % n];
        let b = s[(j + k) % n];
        if a == b {
            k += 1;
            continue;
        }
        if a > b {
            i += k + 1;
        } else {
            j += k + 1;
        }
        if i == j {
            j += 1;
        }
        k = 0;
    }
    i.min(j)
}

/// Suffix array of `text` by induced sorting. `text` must end with a unique
/// sentinel 0 and all symbols must be below `sigma`.
fn sa_is(text: &[u32], sigma: usize) -> Vec<u32> {
    let n = text.len();
    if n == 1 {
        return vec![0];
    }
    if n == 2 {
        return vec![1, 0];
    }

    // Classify each position as S-type (suffix smaller than its successor)
    // or L-type. The sentinel is S by definition.
    let mut is_s = vec![false; n];
    is_s[n - 1] = true;
    for i in (0..n - 1).rev() {
        is_s[i] = text[i] < text[i + 1] || (text[i] == text[i + 1] && is_s[i + 1]);
    }
    let is_lms = |i: usize| i > 0 && is_s[i] && !is_s[i - 1];
    let lms: Vec<u32> = (1..n).filter(|&i| is_lms(i)).map(|i| i as u32).collect();

    let mut bkt_sizes = vec![0_u32; sigma];
    for &c in text {
        bkt_sizes[c as usize] += 1;
    }

    // First pass: place the LMS positions in text order, then induce. This
    // sorts the LMS *substrings*.
    let mut sa = vec![EMPTY; n];
    place_lms(&mut sa, text, &lms, &bkt_sizes);
    induce(&mut sa, text, &is_s, &bkt_sizes);

    // Name the LMS substrings in their sorted order; equal neighbors share
    // a name.
    let mut name_of = vec![EMPTY; n];
    let mut names = 0_u32;
    let mut prev = EMPTY;
    for &p in &sa {
        if is_lms(p as usize) {
            if prev != EMPTY && lms_unequal(text, &is_lms, prev as usize, p as usize) {
                names += 1;
            }
            name_of[p as usize] = names;
            prev = p;
        }
    }
    let name_count = names as usize + 1;

    // Order the LMS suffixes: directly if every name is unique, otherwise by
    // recursing on the reduced string (which again ends in a unique 0).
    let lms_sorted: Vec<u32> = if name_count == lms.len() {
        let mut order = vec![0_u32; lms.len()];
        for &p in &lms {
            order[name_of[p as usize] as usize] = p;
        }
        order
    } else {
        let reduced: Vec<u32> = lms.iter().map(|&p| name_of[p as usize]).collect();
        let reduced_sa = sa_is(&reduced, name_count);
        reduced_sa.iter().map(|&i| lms[i as usize]).collect()
    };

    // Second pass: seed with the exactly sorted LMS suffixes and induce the
    // rest.
    sa.fill(EMPTY);
    place_lms(&mut sa, text, &lms_sorted, &bkt_sizes);
    induce(&mut sa, text, &is_s, &bkt_sizes);
    sa
}

fn bucket_heads(bkt_sizes: &[u32]) -> Vec<u32> {
    let mut idx = 0;
    bkt_sizes
        .iter()
        .map(|&count| {
            let head = idx;
            idx += count;
            head
        })
        .collect()
}

fn bucket_tails(bkt_sizes: &[u32]) -> Vec<u32> {
    let mut idx = 0;
    bkt_sizes
        .iter()
        .map(|&count| {
            idx += count;
            idx - 1
        })
        .collect()
}

/// Drop the given LMS positions into the tails of their buckets, keeping
/// their relative order within each bucket. The sentinel owns slot 0
/// outright; writing it through the tail cursor would underflow bucket 0.
fn place_lms(sa: &mut [u32], text: &[u32], lms: &[u32], bkt_sizes: &[u32]) {
    let mut tails = bucket_tails(bkt_sizes);
    let last = (text.len() - 1) as u32;
    for &p in lms.iter().rev() {
        if p == last {
            continue;
        }
        let c = text[p as usize] as usize;
        sa[tails[c] as usize] = p;
        tails[c] -= 1;
    }
    sa[0] = last;
}

/// Induce the L-type entries left to right, then the S-type entries right to
/// left.
fn induce(sa: &mut [u32], text: &[u32], is_s: &[bool], bkt_sizes: &[u32]) {
    let n = sa.len();
    let mut heads = bucket_heads(bkt_sizes);
    for i in 0..n {
        let p = sa[i];
        if p != EMPTY && p > 0 && !is_s[p as usize - 1] {
            let c = text[p as usize - 1] as usize;
            sa[heads[c] as usize] = p - 1;
            heads[c] += 1;
        }
    }
    let mut tails = bucket_tails(bkt_sizes);
    for i in (0..n).rev() {
        let p = sa[i];
        if p != EMPTY && p > 0 && is_s[p as usize - 1] {
            let c = text[p as usize - 1] as usize;
            sa[tails[c] as usize] = p - 1;
            tails[c] -= 1;
        }
    }
}

/// True when the LMS substrings starting at `a` and `b` differ. Both walks
/// stop at the next LMS position, and the sentinel substring never equals
/// anything else.
fn lms_unequal(text: &[u32], is_lms: &impl Fn(usize) -> bool, a: usize, b: usize) -> bool {
    let last = text.len() - 1;
    if a == last || b == last {
        return true;
    }
    let mut i = 0;
    loop {
        if text[a + i] != text[b + i] {
            return true;
        }
        if i > 0 {
            let (at_a, at_b) = (is_lms(a + i), is_lms(b + i));
            if at_a || at_b {
                return !(at_a && at_b);
            }
        }
        i += 1;
    }
}
