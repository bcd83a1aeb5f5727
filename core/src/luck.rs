use sha2::{Digest, Sha256};

/// Deterministic oracle mapping a string key to a value in `[0, 1)`.
pub trait Luck {
    fn luck(&self, key: &str) -> f64;
}

impl<L: Luck + ?Sized> Luck for &L {
    fn luck(&self, key: &str) -> f64 {
        (**self).luck(key)
    }
}

/// Default oracle backed by [`luck`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sha256Luck;

impl Luck for Sha256Luck {
    fn luck(&self, key: &str) -> f64 {
        luck(key)
    }
}

/// Adapts any closure into a [`Luck`] oracle.
#[derive(Copy, Clone, Debug)]
pub struct FnLuck<F>(pub F);

impl<F: Fn(&str) -> f64> Luck for FnLuck<F> {
    fn luck(&self, key: &str) -> f64 {
        (self.0)(key)
    }
}

/// Hashes `key` with SHA-256 and keeps the top 53 bits of the digest as a fraction.
///
/// The result is stable across processes and platforms, and always below 1.
pub fn luck(key: &str) -> f64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let bits = u64::from_be_bytes(head) >> 11;
    bits as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luck_is_deterministic() {
        assert_eq!(luck("3,5"), luck("3,5"));
        assert_eq!(Sha256Luck.luck("3,5,initialCoins"), luck("3,5,initialCoins"));
    }

    #[test]
    fn luck_stays_in_unit_interval() {
        for i in -50..50 {
            for j in -50..50 {
                let value = luck(&format!("{i},{j}"));
                assert!((0.0..1.0).contains(&value), "{value} out of range");
            }
        }
    }

    #[test]
    fn luck_distinguishes_keys() {
        assert_ne!(luck("1,2"), luck("2,1"));
        assert_ne!(luck("1,2"), luck("1,2,initialCoins"));
    }

    #[test]
    fn luck_is_roughly_uniform() {
        let below_tenth = (0..10_000)
            .filter(|n| luck(&format!("{n},0")) < 0.1)
            .count();
        assert!((800..1200).contains(&below_tenth), "{below_tenth}");
    }

    #[test]
    fn fn_luck_forwards_to_closure() {
        let fixed = FnLuck(|key: &str| if key.ends_with("initialCoins") { 0.35 } else { 0.0 });
        assert_eq!(fixed.luck("10,10,initialCoins"), 0.35);
        assert_eq!((&fixed).luck("10,10"), 0.0);
    }
}
