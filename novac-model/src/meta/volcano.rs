use std::fmt::Display;

/// An entry in the volcano catalog: the peak location and metadata needed to resolve a
/// `--volcano` CLI argument and to seed a default plume height for a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volcano {
    code: u32,
    name: String,
    simple_name: String,
    country: String,
    peak_latitude: f64,
    peak_longitude: f64,
    peak_altitude_masl: f64,
    hours_to_gmt: i32,
    observatory: String,
}

impl Volcano {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: u32,
        name: impl Into<String>,
        simple_name: impl Into<String>,
        country: impl Into<String>,
        peak_latitude: f64,
        peak_longitude: f64,
        peak_altitude_masl: f64,
        hours_to_gmt: i32,
        observatory: impl Into<String>,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            simple_name: simple_name.into(),
            country: country.into(),
            peak_latitude,
            peak_longitude,
            peak_altitude_masl,
            hours_to_gmt,
            observatory: observatory.into(),
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn peak_latitude(&self) -> f64 {
        self.peak_latitude
    }

    pub fn peak_longitude(&self) -> f64 {
        self.peak_longitude
    }

    pub fn peak_altitude_masl(&self) -> f64 {
        self.peak_altitude_masl
    }

    pub fn hours_to_gmt(&self) -> i32 {
        self.hours_to_gmt
    }

    pub fn observatory(&self) -> &str {
        &self.observatory
    }

    /// Whether `query` matches this volcano's name, simple name, or numeric code,
    /// case-insensitively.
    pub fn matches(&self, query: &str) -> bool {
        if let Ok(code) = query.parse::<u32>() {
            if code == self.code {
                return true;
            }
        }
        self.name.eq_ignore_ascii_case(query) || self.simple_name.eq_ignore_ascii_case(query)
    }
}

impl Display for Volcano {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {:.4}°, {:.4}°, {}m)",
            self.name, self.country, self.peak_latitude, self.peak_longitude, self.peak_altitude_masl as i64
        )
    }
}

/// An immutable catalog of known volcanoes, looked up by index or by name/code.
#[derive(Debug, Clone, Default)]
pub struct VolcanoCatalog {
    volcanoes: Vec<Volcano>,
}

impl VolcanoCatalog {
    pub fn new(volcanoes: Vec<Volcano>) -> Self {
        Self { volcanoes }
    }

    pub fn len(&self) -> usize {
        self.volcanoes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volcanoes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Volcano> {
        self.volcanoes.get(index)
    }

    pub fn find(&self, query: &str) -> Option<&Volcano> {
        self.volcanoes.iter().find(|v| v.matches(query))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Volcano> {
        self.volcanoes.iter()
    }
}
