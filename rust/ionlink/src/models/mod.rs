pub mod dia;
pub mod feature;
pub mod identification;
pub mod peak;
pub mod scan;
pub mod tolerance;

pub use dia::DiaEntry;
pub use feature::Feature;
pub use identification::Identification;
pub use peak::{
    DeconvPeak,
    Peak,
};
pub use scan::{
    PrecursorLink,
    ScanRecord,
    ScanTable,
};
pub use tolerance::{
    MassTolerance,
    RtWindow,
};

/// Mass of a proton in daltons, used to derive m/z from neutral mass.
pub const PROTON_MASS: f64 = 1.00728;
