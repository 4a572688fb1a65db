//! Concrete wiring for the inputs the pipeline treats as external collaborators: the
//! volcano catalog, the instrument-location catalog, and the DOAS fit windows. A real
//! NOVAC deployment would supply these from its own setup.xml, user-options, and
//! cross-section files, none of which this binary parses. In their place, this binary
//! accepts a single JSON document serialized from the same model types novac-model
//! already carries `serde` support for, so the pipeline can be driven end to end
//! without inventing a binary spectrum format of our own.

use std::path::Path;

use serde::Deserialize;

use novac_data::LocationCatalog;
use novac_model::data::FitWindow;
use novac_model::meta::{InstrumentLocation, Volcano, VolcanoCatalog};

use crate::result::{Error, Result};

#[derive(Deserialize)]
struct RawBootstrap {
    volcanoes: Vec<Volcano>,
    locations: Vec<InstrumentLocation>,
    fit_windows: Vec<FitWindow>,
}

/// The catalogs and fit windows a run needs, loaded once at startup.
pub struct Bootstrap {
    pub volcanoes: VolcanoCatalog,
    pub locations: LocationCatalog,
    pub fit_windows: Vec<FitWindow>,
}

/// Load a bootstrap document from `path`, typically `{workdir}/configuration/bootstrap.json`.
pub fn load(path: &Path) -> Result<Bootstrap> {
    let text = std::fs::read_to_string(path)?;
    let raw: RawBootstrap = serde_json::from_str(&text)
        .map_err(|err| Error::InvalidArgument { flag: "workdir".to_string(), reason: format!("malformed bootstrap file {}: {err}", path.display()) })?;
    let locations = LocationCatalog::from_locations(raw.locations)?;
    Ok(Bootstrap { volcanoes: VolcanoCatalog::new(raw.volcanoes), locations, fit_windows: raw.fit_windows })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_minimal_bootstrap_document() {
        let path = std::env::temp_dir().join(format!("novac-ppp-bootstrap-test-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"volcanoes": [], "locations": [], "fit_windows": []}}"#
        )
        .unwrap();
        drop(file);

        let bootstrap = load(&path).unwrap();
        assert!(bootstrap.volcanoes.is_empty());
        assert!(bootstrap.locations.is_empty());
        assert!(bootstrap.fit_windows.is_empty());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn rejects_malformed_document() {
        let path = std::env::temp_dir().join(format!("novac-ppp-bootstrap-bad-{}.json", std::process::id()));
        std::fs::write(&path, b"not json").unwrap();

        assert!(load(&path).is_err());

        std::fs::remove_file(&path).unwrap();
    }
}
