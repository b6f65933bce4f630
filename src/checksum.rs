//! The default checksum function, used by tests and any host that doesn't
//! need something fancier. The engine never calls this directly — it
//! always goes through [`crate::Hooks::checksum`], so a host can swap in
//! its own routine without the crate knowing or caring.

/// Two's-complement of the 8-bit sum of `data`: `(!sum).wrapping_add(1)`.
pub fn default_checksum(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::default_checksum;

    #[test]
    fn matches_known_vectors() {
        assert_eq!(default_checksum(&[]), 0);
        assert_eq!(default_checksum(&[0xFF]), 1);
        assert_eq!(default_checksum(&[0x5A, 0xA5]), 1);
        assert_eq!(default_checksum(&[1]), 0xFF);

        let run: [u8; 100] = core::array::from_fn(|i| i as u8);
        assert_eq!(default_checksum(&run), 0xAA);
    }
}
