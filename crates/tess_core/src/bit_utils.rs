/// Bit operations over registers packed into u64 words.
pub struct BitPack;

impl BitPack {
    /// Number of u64 words needed to hold `bits` bits.
    #[inline(always)]
    pub const fn words_for(bits: usize) -> usize {
        bits.div_ceil(64)
    }

    #[inline(always)]
    pub fn get(storage: &[u64], index: usize) -> bool {
        let word = storage[index / 64];
        let bit = index % 64;
        (word >> bit) & 1 == 1
    }

    #[inline(always)]
    pub fn toggle(storage: &mut [u64], index: usize) {
        storage[index / 64] ^= 1 << (index % 64);
    }

    #[inline(always)]
    pub fn set(storage: &mut [u64], index: usize, val: bool) {
        let mask = 1u64 << (index % 64);
        if val {
            storage[index / 64] |= mask;
        } else {
            storage[index / 64] &= !mask;
        }
    }

    /// Counts set bits across the whole register.
    #[inline]
    pub fn count_ones(storage: &[u64]) -> usize {
        storage.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::BitPack;

    #[test]
    fn set_get_toggle_across_word_boundary() {
        let mut reg = [0u64; 2];
        BitPack::set(&mut reg, 63, true);
        BitPack::toggle(&mut reg, 64);
        assert!(BitPack::get(&reg, 63));
        assert!(BitPack::get(&reg, 64));
        assert!(!BitPack::get(&reg, 0));
        assert_eq!(BitPack::count_ones(&reg), 2);

        BitPack::set(&mut reg, 63, false);
        BitPack::toggle(&mut reg, 64);
        assert_eq!(reg, [0, 0]);
    }

    #[test]
    fn words_for_rounds_up() {
        assert_eq!(BitPack::words_for(0), 0);
        assert_eq!(BitPack::words_for(23), 1);
        assert_eq!(BitPack::words_for(64), 1);
        assert_eq!(BitPack::words_for(65), 2);
    }
}
