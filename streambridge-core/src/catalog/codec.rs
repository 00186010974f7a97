//! Composite library ids: `<libraryId>::<mode>`.

use streambridge_model::{CatalogMode, LibraryCatalogId};

/// Decode a composite library id. Never fails: anything unusable decodes to
/// the raw value with the default mode.
pub fn decode(raw: Option<&str>) -> LibraryCatalogId {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return LibraryCatalogId {
            library_id: raw.map(str::to_string),
            mode: CatalogMode::All,
        };
    };

    match raw.split_once(LibraryCatalogId::DELIMITER) {
        Some((library_id, token)) => {
            LibraryCatalogId::new(library_id, CatalogMode::from_token(token))
        }
        None => LibraryCatalogId::new(raw, CatalogMode::All),
    }
}

pub fn encode(id: &LibraryCatalogId) -> String {
    id.to_string()
}
