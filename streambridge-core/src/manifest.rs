use streambridge_model::{
    BehaviorHints, CatalogDefinition, CatalogKind, ConfigField, ID_PREFIX, LibraryDefinition,
    Manifest, ManifestResource, PROVIDER_ID_PREFIXES,
};

pub const ADDON_ID: &str = "org.streambridge.embyresolver";
pub const ADDON_VERSION: &str = "1.1.0";
pub const ADDON_NAME: &str = "StreamBridge: Emby to Stremio";
const ADDON_DESCRIPTION: &str = "Stream media from your personal or shared Emby server \
     using IMDb/TMDB IDs, and browse its libraries as catalogs.";
const CFG_ID_CHARS: usize = 8;

/// Manifest served before the addon is configured.
pub fn base_manifest() -> Manifest {
    let types = CatalogKind::ALL.to_vec();
    let id_prefixes: Vec<String> = PROVIDER_ID_PREFIXES
        .iter()
        .chain([&ID_PREFIX])
        .map(|prefix| prefix.to_string())
        .collect();
    Manifest {
        id: ADDON_ID.to_string(),
        version: ADDON_VERSION.to_string(),
        name: ADDON_NAME.to_string(),
        description: ADDON_DESCRIPTION.to_string(),
        catalogs: Vec::new(),
        resources: vec![
            ManifestResource {
                name: "stream".to_string(),
                types: types.clone(),
                id_prefixes: id_prefixes.clone(),
            },
            ManifestResource {
                name: "meta".to_string(),
                types: types.clone(),
                id_prefixes,
            },
            ManifestResource {
                name: "catalog".to_string(),
                types: types.clone(),
                id_prefixes: Vec::new(),
            },
        ],
        types,
        behavior_hints: BehaviorHints {
            configurable: true,
            configuration_required: true,
        },
        config: vec![
            ConfigField::text("serverUrl", "Emby Server URL"),
            ConfigField::text("userId", "Emby User ID"),
            ConfigField::text("accessToken", "Emby Access Token"),
        ],
    }
}

/// Manifest of one configured install. `cfg` is the raw path token; its
/// prefix keeps installs against different servers apart.
pub fn configured_manifest(
    cfg: &str,
    server_url: &str,
    libraries: &[LibraryDefinition],
) -> Manifest {
    let mut manifest = base_manifest();
    let suffix: String = cfg.chars().take(CFG_ID_CHARS).collect();
    manifest.id = format!("{}.{suffix}", manifest.id);
    manifest.name = format!("{} ({})", manifest.name, server_label(server_url));
    manifest.behavior_hints.configuration_required = false;
    manifest.catalogs = libraries
        .iter()
        .map(|library| {
            CatalogDefinition::new(library.kind, library.id.clone(), library.name.clone())
        })
        .collect();
    manifest
}

fn server_label(server_url: &str) -> &str {
    let label = server_url
        .strip_prefix("https://")
        .or_else(|| server_url.strip_prefix("http://"))
        .unwrap_or(server_url);
    if label.is_empty() { "Unknown Server" } else { label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_manifest_requires_configuration() {
        let manifest = base_manifest();
        assert!(manifest.behavior_hints.configuration_required);
        assert!(manifest.catalogs.is_empty());
        let resources: Vec<_> = manifest.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(resources, vec!["stream", "meta", "catalog"]);
        assert_eq!(
            manifest.resources[0].id_prefixes,
            vec!["tt", "imdb:", "tmdb:", "emby~"]
        );
        assert_eq!(
            manifest.resources[1].id_prefixes,
            manifest.resources[0].id_prefixes
        );
        assert!(manifest.resources[2].id_prefixes.is_empty());
        let keys: Vec<_> = manifest.config.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["serverUrl", "userId", "accessToken"]);
    }

    #[test]
    fn configured_manifest_is_personalized() {
        let libraries = vec![LibraryDefinition {
            id: "tv::lastAdded".into(),
            name: "Shows (Last Added)".into(),
            kind: CatalogKind::Series,
        }];
        let manifest = configured_manifest(
            "eyJzZXJ2ZXJVcmwiOiJ4In0",
            "https://emby.example.com:8920",
            &libraries,
        );

        assert_eq!(manifest.id, "org.streambridge.embyresolver.eyJzZXJ2");
        assert_eq!(
            manifest.name,
            "StreamBridge: Emby to Stremio (emby.example.com:8920)"
        );
        assert!(!manifest.behavior_hints.configuration_required);
        assert_eq!(manifest.catalogs.len(), 1);
        assert_eq!(manifest.catalogs[0].extra_supported.len(), 4);
    }

    #[test]
    fn short_cfg_and_blank_server() {
        let manifest = configured_manifest("abc", "", &[]);
        assert_eq!(manifest.id, "org.streambridge.embyresolver.abc");
        assert!(manifest.name.ends_with("(Unknown Server)"));
    }
}
