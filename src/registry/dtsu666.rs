//! Register map of the CHINT DTSU666 three-phase energy meter.
//!
//! Every quantity is an IEEE-754 float spread over two holding registers.
//! Instantaneous values are stored in sub-units (0.1 V, 0.001 A, 0.1 W), the
//! multipliers bring them back to V, A, W, var and Hz.

use super::profile::{ParameterSpec, Profile};

const VOLT: f64 = 0.1;
const AMP: f64 = 0.001;
const WATT: f64 = 0.1;
const VAR: f64 = 0.1;
const PF: f64 = 0.001;
const HERTZ: f64 = 0.01;
const KWH: f64 = 1.0;

const FULL: &[(&str, ParameterSpec)] = &[
    ("Uab", ParameterSpec::new(0x2000, VOLT, 1)),
    ("Ubc", ParameterSpec::new(0x2002, VOLT, 1)),
    ("Uca", ParameterSpec::new(0x2004, VOLT, 1)),
    ("Ua", ParameterSpec::new(0x2006, VOLT, 1)),
    ("Ub", ParameterSpec::new(0x2008, VOLT, 1)),
    ("Uc", ParameterSpec::new(0x200A, VOLT, 1)),
    ("Ia", ParameterSpec::new(0x200C, AMP, 2)),
    ("Ib", ParameterSpec::new(0x200E, AMP, 2)),
    ("Ic", ParameterSpec::new(0x2010, AMP, 2)),
    ("Pt", ParameterSpec::new(0x2012, WATT, 1)),
    ("Pa", ParameterSpec::new(0x2014, WATT, 1)),
    ("Pb", ParameterSpec::new(0x2016, WATT, 1)),
    ("Pc", ParameterSpec::new(0x2018, WATT, 1)),
    ("Qt", ParameterSpec::new(0x201A, VAR, 1)),
    ("Qa", ParameterSpec::new(0x201C, VAR, 1)),
    ("Qb", ParameterSpec::new(0x201E, VAR, 1)),
    ("Qc", ParameterSpec::new(0x2020, VAR, 1)),
    ("PFt", ParameterSpec::new(0x202A, PF, 3)),
    ("PFa", ParameterSpec::new(0x202C, PF, 3)),
    ("PFb", ParameterSpec::new(0x202E, PF, 3)),
    ("PFc", ParameterSpec::new(0x2030, PF, 3)),
    ("Freq", ParameterSpec::new(0x2044, HERTZ, 2)),
    ("ImpEp", ParameterSpec::new(0x401E, KWH, 2)),
    ("ExpEp", ParameterSpec::new(0x4028, KWH, 2)),
];

const BASIC: &[&str] = &["Ua", "Ub", "Uc", "Ia", "Ib", "Ic", "Pt", "Freq", "ImpEp", "ExpEp"];

const ENERGY: &[&str] = &["ImpEp", "ExpEp"];

fn subset(names: &'static [&'static str]) -> impl Iterator<Item = (&'static str, ParameterSpec)> {
    FULL.iter()
        .filter(move |(name, _)| names.contains(name))
        .copied()
}

pub fn profiles() -> Vec<Profile> {
    // Static tables are unique and non-empty, so construction cannot fail.
    [
        Profile::new("DTSU666", FULL.iter().copied()),
        Profile::new("DTSU666_BASIC", subset(BASIC)),
        Profile::new("DTSU666_ENERGY", subset(ENERGY)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid() {
        let profiles = profiles();
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].len(), FULL.len());
        assert_eq!(profiles[1].len(), BASIC.len());
        assert_eq!(profiles[2].len(), ENERGY.len());
    }

    #[test]
    fn subsets_follow_full_map_order() {
        let basic = &profiles()[1];
        let names: Vec<&str> = basic.iter().map(|(name, _)| name).collect();
        assert_eq!(names.first(), Some(&"Ua"));
        assert_eq!(names.last(), Some(&"ExpEp"));
    }
}
