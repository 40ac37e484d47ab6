//! FIPS code helpers.

/// Texas.
pub const DEFAULT_STATE: &str = "48";

/// Counties shown on the default map.
pub const DEFAULT_COUNTIES: &[&str] = &[
    "48465", "48137", "48385", "48265", "48019", "48171", "48259", "48031", "48299", "48053",
    "48491", "48287", "48453", "48021", "48149", "48177", "48187", "48177", "48285", "48123",
    "48493", "48255", "48013", "48029", "48091", "48325", "48163", "48463", "48271", "48323",
    "48507", "48127", "48209", "48039", "48273",
];

/// Left-pads `num` with zeroes to `len` characters.
pub fn zfill(num: u64, len: usize) -> String {
    format!("{num:0>len$}")
}

/// Five-digit county code; numeric ids lose their leading zeroes in some
/// topologies (`1001` for `01001`).
pub fn county_code(id: &str) -> String {
    match id.trim().parse::<u64>() {
        Ok(code) => zfill(code, 5),
        Err(_) => id.to_string(),
    }
}

/// True if the five-digit county code belongs to the two-digit state code.
pub fn in_state(county_fips: &str, state_fips: &str) -> bool {
    match county_fips.trim().parse::<u64>() {
        Ok(code) => zfill(code / 1000, 2) == state_fips,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zfill() {
        assert_eq!(zfill(1, 2), "01");
        assert_eq!(zfill(48, 2), "48");
        assert_eq!(zfill(123, 2), "123");
        assert_eq!(zfill(7, 5), "00007");
    }

    #[test]
    fn test_county_code() {
        assert_eq!(county_code("1001"), "01001");
        assert_eq!(county_code("48453"), "48453");
        assert_eq!(county_code("county"), "county");
    }

    #[test]
    fn test_in_state() {
        assert!(in_state("48465", "48"));
        assert!(!in_state("22071", "48"));
        assert!(in_state("01001", "01"));
        assert!(in_state("1001", "01"));
        assert!(!in_state("county", "48"));
    }

    #[test]
    fn test_default_counties_are_in_default_state() {
        assert_eq!(DEFAULT_COUNTIES.len(), 35);
        assert!(DEFAULT_COUNTIES.iter().all(|c| in_state(c, DEFAULT_STATE)));
    }
}
