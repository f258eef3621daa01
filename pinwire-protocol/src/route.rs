//! Route table
//!
//! Paths arrive lowercased from the parser; matching is exact except for the
//! digital prefix, whose remainder is the pin token.

/// Prefix of the per-pin routes
pub const DIGITAL_PREFIX: &str = "/digital/";

/// A matched route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route<'a> {
    /// `/`: identity banner and node name
    Root,
    /// `/serial`: serial passthrough
    Serial,
    /// `/debug`: buffered debug log
    Debug,
    /// `/digital/{token}`: one pin; the token is not validated here
    Digital(&'a str),
    /// Anything else
    Unknown,
}

impl<'a> Route<'a> {
    /// Match a path against the route table
    pub fn parse(path: &'a str) -> Self {
        match path {
            "/" => Route::Root,
            "/serial" => Route::Serial,
            "/debug" => Route::Debug,
            "/digital" => Route::Digital(""),
            _ => match path.strip_prefix(DIGITAL_PREFIX) {
                Some(token) => Route::Digital(token),
                None => Route::Unknown,
            },
        }
    }
}
