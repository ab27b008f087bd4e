use serde_repr::{Deserialize_repr, Serialize_repr};

/// Suction power levels understood by the vacuum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum FanSpeed {
    Idle = 0,
    Quiet = 38,
    Balanced = 60,
    Turbo = 77,
    Max = 90,
}

impl FanSpeed {
    pub const ALL: [FanSpeed; 5] = [
        FanSpeed::Idle,
        FanSpeed::Quiet,
        FanSpeed::Balanced,
        FanSpeed::Turbo,
        FanSpeed::Max,
    ];

    /// Smallest level that is at least `requested`, saturating at [`FanSpeed::Max`].
    pub fn from_requested(requested: u8) -> FanSpeed {
        Self::ALL
            .into_iter()
            .find(|level| level.power() >= requested)
            .unwrap_or(FanSpeed::Max)
    }

    pub fn power(self) -> u8 {
        self as u8
    }
}

impl From<FanSpeed> for u8 {
    fn from(speed: FanSpeed) -> Self {
        speed.power()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_levels() {
        for level in FanSpeed::ALL {
            assert_eq!(FanSpeed::from_requested(level.power()), level);
        }
    }

    #[test]
    fn test_quantization() {
        assert_eq!(FanSpeed::from_requested(1), FanSpeed::Quiet);
        assert_eq!(FanSpeed::from_requested(37), FanSpeed::Quiet);
        assert_eq!(FanSpeed::from_requested(39), FanSpeed::Balanced);
        assert_eq!(FanSpeed::from_requested(61), FanSpeed::Turbo);
        assert_eq!(FanSpeed::from_requested(78), FanSpeed::Max);
        assert_eq!(FanSpeed::from_requested(91), FanSpeed::Max);
        assert_eq!(FanSpeed::from_requested(100), FanSpeed::Max);
    }

    #[test]
    fn test_quantization_is_monotonic() {
        for requested in 0..=100u8 {
            let level = FanSpeed::from_requested(requested);

            if requested <= 90 {
                assert!(level.power() >= requested, "{requested}");
            }

            let smaller = FanSpeed::ALL
                .into_iter()
                .filter(|l| l.power() >= requested)
                .min();
            assert_eq!(level, smaller.unwrap_or(FanSpeed::Max), "{requested}");
        }
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&FanSpeed::Turbo).unwrap(), "77");
        assert_eq!(
            serde_json::from_str::<FanSpeed>("38").unwrap(),
            FanSpeed::Quiet
        );
        assert!(serde_json::from_str::<FanSpeed>("50").is_err());
    }
}
