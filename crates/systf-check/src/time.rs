use serde::{Deserialize, Serialize};

/// Joins the two 32-bit halves of a simulation time. `high` is the most
/// significant word.
pub fn time64(high: u32, low: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    pub high: u32,
    pub low: u32,
}

impl SimTime {
    pub fn to_u64(self) -> u64 {
        time64(self.high, self.low)
    }

    pub fn from_u64(t: u64) -> Self {
        SimTime {
            high: (t >> 32) as u32,
            low: t as u32,
        }
    }
}

impl From<SimTime> for u64 {
    fn from(t: SimTime) -> u64 {
        t.to_u64()
    }
}

impl From<u64> for SimTime {
    fn from(t: u64) -> SimTime {
        SimTime::from_u64(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_halves() {
        assert_eq!(time64(0, 0), 0);
        assert_eq!(time64(1, 0xFFFF_FFFF), 0x1_FFFF_FFFF);
        assert_eq!(time64(0xFFFF_FFFF, 0xFFFF_FFFF), u64::MAX);
        assert_eq!(time64(0, 42), 42);
        assert_eq!(time64(2, 0), 2 << 32);
    }

    #[test]
    fn split_matches_decode() {
        let t = SimTime::from_u64(0x0123_4567_89AB_CDEF);
        assert_eq!(t.high, 0x0123_4567);
        assert_eq!(t.low, 0x89AB_CDEF);
        assert_eq!(u64::from(t), 0x0123_4567_89AB_CDEF);
    }
}
