//! Encode the symbol presence map used in the BZIP2 block header.
//!
//! A symbol_map records which of the 256 possible u8s occur in a block. The
//! map is a vector of u16s: the first u16 is a bit map over the 16 blocks of
//! 16 u8 values each, and one further u16 follows for every block that has at
//! least one symbol present, with its bits marking the individual values.
//!
//! For example, if the first bit of maps\[0\] is a zero, then none of the u8s
//! from 0-15 were present in the input block and no u16 is included for that
//! range.

const BIT_MASK: u16 = 0x8000;

/// Takes the presence flags of all 256 u8 values and returns the bzip2
/// symbol map. Assumes at least one symbol exists.
pub fn encode_sym_map(present: &[bool; 256]) -> Vec<u16> {
    // Index word plus up to 16 maps.
    let mut sym_maps: Vec<u16> = vec![0; 17];

    // idx >> 4 selects the range map, idx & 15 the bit within that map.
    // Eg 'A' is 0100_0001, so range 4 (0100) gets symbol bit 1 (0001) set.
    present.iter().enumerate().for_each(|(idx, &used)| {
        if used {
            sym_maps[0] |= BIT_MASK >> (idx >> 4);
            sym_maps[1 + (idx >> 4)] |= BIT_MASK >> (idx & 15);
        }
    });

    // Keep only those maps that have bits set.
    sym_maps.retain(|&map| map > 0);
    sym_maps
}
