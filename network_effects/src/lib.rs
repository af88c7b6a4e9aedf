//! Network effects: adoption dynamics, competing platforms and two-sided
//! platform pricing

pub mod adoption;
pub mod competition;
pub mod platform;

pub use adoption::{adoption, fixed_points, AdoptionOutcome, AdoptionParams, FixedPoint, Stability};
pub use competition::{
    network_tipping, platform_competition, CompetitionOutcome, CompetitionParams, TippingPoint,
};
pub use platform::{two_sided_platform, PlatformOutcome, PlatformParams, PlatformSide};
