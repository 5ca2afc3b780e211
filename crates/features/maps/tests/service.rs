use serde_json::{Value, json};
use std::collections::BTreeMap;
use tempfile::TempDir;
use vista_access::{DirectoryError, DirectoryResolver, StaticDirectory};
use vista_domain::config::{AccessConfig, DirectoryConfig, MapsConfig};
use vista_domain::identity::Identity;
use vista_layers::NormalizedLayer;
use vista_maps::{ConfigStore, ExportReport, MapService, MapServiceError};
use vista_storage::DocumentStore;

fn catalog() -> Value {
    json!({
        "wmslayers": [
            {
                "id": "1",
                "caption": "Roads",
                "url": "https://gs/wms",
                "layers": ["roads:main", "roads:minor"]
            },
            { "id": "2", "caption": "Zoning", "url": "https://gs/wms", "layers": ["plan:zoning"] }
        ],
        "wmtslayers": [ { "id": "3", "caption": "Ortho", "url": "https://tiles/wmts" } ]
    })
}

fn map(visible_for_groups: &[&str], caption: &str, dropdown: bool) -> Value {
    json!({
        "map": { "projection": "EPSG:3006", "title": caption },
        "tools": [
            { "type": "print", "options": { "visibleForGroups": ["planners"] } },
            {
                "type": "layerswitcher",
                "options": {
                    "visibleForGroups": visible_for_groups,
                    "dropdownThemeMaps": dropdown,
                    "themeMapHeaderCaption": caption,
                    "baselayers": [ { "id": "3" } ],
                    "groups": [
                        {
                            "id": "g1",
                            "name": "Infrastructure",
                            "layers": [
                                { "id": "1" },
                                { "id": "2", "visibleForGroups": ["planners"] },
                                { "id": "99" }
                            ],
                            "groups": []
                        }
                    ]
                }
            }
        ]
    })
}

struct Fixture {
    _temp: TempDir,
    documents: DocumentStore,
}

async fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let documents = DocumentStore::builder().root(temp.path()).connect().await.unwrap();

    documents.write_json("layers.json", &catalog()).await.unwrap();
    documents.write_json("open.json", &map(&[], "Open data", true)).await.unwrap();
    documents.write_json("planning.json", &map(&["planners"], "Planning", true)).await.unwrap();
    documents.write_json("internal.json", &map(&[], "Internal", false)).await.unwrap();
    documents.write("broken.json", b"{ \"tools\": [").await.unwrap();
    documents
        .write_json("templates/map.template", &map(&[], "New map", false))
        .await
        .unwrap();

    Fixture { _temp: temp, documents }
}

fn directory() -> StaticDirectory {
    StaticDirectory::from(&DirectoryConfig {
        members: BTreeMap::from([
            ("alice".to_owned(), vec!["planners".to_owned(), "gis".to_owned()]),
            ("bob".to_owned(), vec!["gis".to_owned()]),
        ]),
    })
}

fn service_with<D: DirectoryResolver>(fx: &Fixture, directory: D, restrict: bool) -> MapService<D> {
    let access = AccessConfig { restrict_by_groups: restrict, ..AccessConfig::default() };
    let maps = MapsConfig { proxy: Some("/proxy/".to_owned()), ..MapsConfig::default() };
    MapService::new(ConfigStore::new(fx.documents.clone()), directory, &access, &maps)
}

fn service(fx: &Fixture, restrict: bool) -> MapService<StaticDirectory> {
    service_with(fx, directory(), restrict)
}

fn layer_ids(config: &vista_domain::document::MapConfiguration) -> Vec<String> {
    config.layer_switcher().unwrap().groups[0].layers.iter().map(|l| l.id.clone()).collect()
}

#[tokio::test]
async fn unrestricted_service_serves_documents_as_stored() {
    let fx = fixture().await;
    let svc = service(&fx, false);

    let config = svc.get_map_config("planning", &Identity::anonymous(), true).await.unwrap();

    assert_eq!(config.tools.len(), 2);
    assert_eq!(layer_ids(&config), ["1", "2", "99"]);
    assert!(svc.get_layers_store(&Identity::anonymous()).await.is_ok());
}

#[tokio::test]
async fn unrestricted_map_needs_a_valid_identity() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    assert!(svc.get_map_config("open", &"bob".into(), true).await.is_ok());

    for who in [Identity::from("mallory"), Identity::anonymous()] {
        let err = svc.get_map_config("open", &who, true).await.unwrap_err();
        assert!(matches!(err, MapServiceError::AccessDenied { .. }), "{who}: {err}");
    }

    let err = svc.get_layers_store(&"mallory".into()).await.unwrap_err();
    assert!(matches!(err, MapServiceError::AccessDenied { .. }));
}

#[tokio::test]
async fn map_level_groups_gate_the_whole_map() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    assert!(svc.get_map_config("planning", &"alice".into(), true).await.is_ok());

    let err = svc.get_map_config("planning", &"bob".into(), true).await.unwrap_err();
    assert!(matches!(err, MapServiceError::AccessDenied { .. }));
    assert!(!err.to_string().contains("planners"), "denials never name groups: {err}");
}

#[tokio::test]
async fn configurations_are_washed_per_identity() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    let for_bob = svc.get_map_config("open", &"bob".into(), true).await.unwrap();
    assert_eq!(for_bob.tools.len(), 1);
    assert_eq!(layer_ids(&for_bob), ["1", "99"]);
    assert_eq!(for_bob.map.extra["title"], "Open data");

    let for_alice = svc.get_map_config("open", &"alice".into(), true).await.unwrap();
    assert_eq!(layer_ids(&for_alice), ["1", "2", "99"]);

    let unwashed = svc.get_map_config("open", &"bob".into(), false).await.unwrap();
    assert_eq!(layer_ids(&unwashed), ["1", "2", "99"]);

    let stored: Value = fx.documents.read_json("open.json").await.unwrap();
    assert_eq!(stored, map(&[], "Open data", true), "reads never modify the store");
}

#[tokio::test]
async fn names_are_checked() {
    let fx = fixture().await;
    let svc = service(&fx, false);
    let anyone = Identity::anonymous();

    let missing = svc.get_map_config("nope", &anyone, true).await.unwrap_err();
    assert!(matches!(missing, MapServiceError::NotFound { .. }));

    for name in ["../etc/passwd", ".hidden", "layers", ""] {
        let err = svc.get_map_config(name, &anyone, true).await.unwrap_err();
        assert!(matches!(err, MapServiceError::InvalidName { .. }), "{name:?}: {err}");
    }

    let broken = svc.get_map_config("broken", &anyone, true).await.unwrap_err();
    assert!(matches!(broken, MapServiceError::MalformedDocument { .. }));
}

#[tokio::test]
async fn available_maps_exclude_the_catalog() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    assert_eq!(
        svc.get_available_maps().await.unwrap(),
        ["broken", "internal", "open", "planning"]
    );
}

#[tokio::test]
async fn theme_maps_follow_access_and_dropdown_flag() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    let for_alice = svc.get_user_specific_maps(&"alice".into()).await.unwrap();
    let names: Vec<_> = for_alice.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["open", "planning"]);
    assert_eq!(for_alice[1].title.as_deref(), Some("Planning"));

    let for_bob = svc.get_user_specific_maps(&"bob".into()).await.unwrap();
    assert_eq!(for_bob.len(), 1);
    assert_eq!(
        serde_json::to_value(&for_bob[0]).unwrap(),
        json!({ "mapConfigurationName": "open", "mapConfigurationTitle": "Open data" })
    );

    assert!(svc.get_user_specific_maps(&"mallory".into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn export_checks_the_format_first() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    let err =
        svc.export_map_config("does-not-exist", "xlsx", &"mallory".into()).await.unwrap_err();
    assert!(matches!(err, MapServiceError::UnsupportedFormat { .. }));
}

#[tokio::test]
async fn export_of_the_catalog_lists_every_layer() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    let report = svc.export_map_config("layers", "json", &"bob".into()).await.unwrap();
    let ExportReport::Catalog(index) = &report else { panic!("expected the catalog index") };

    assert_eq!(index.len(), 3);
    assert_eq!(
        serde_json::to_value(&report).unwrap()["1"],
        json!({ "name": "Roads", "subLayers": ["roads:main", "roads:minor"] })
    );
}

#[tokio::test]
async fn export_of_a_map_mirrors_the_washed_tree() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    let report = svc.export_map_config("open", "json", &"bob".into()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(
        json,
        json!({
            "baselayers": [ { "name": "Ortho" } ],
            "groups": [
                {
                    "name": "Infrastructure",
                    "layers": [
                        { "name": "Roads", "subLayers": ["roads:main", "roads:minor"] },
                        null
                    ]
                }
            ]
        })
    );
}

#[tokio::test]
async fn maps_are_created_duplicated_and_deleted() {
    let fx = fixture().await;
    let svc = service(&fx, false);
    let anyone = Identity::anonymous();

    svc.create_new_map("fresh").await.unwrap();
    let fresh = svc.get_map_config("fresh", &anyone, true).await.unwrap();
    let caption = fresh.layer_switcher().unwrap().theme_map_header_caption.clone();
    assert_eq!(caption.as_deref(), Some("New map"));

    svc.duplicate_map("open", "copy").await.unwrap();
    let original: Value = fx.documents.read_json("open.json").await.unwrap();
    let copy: Value = fx.documents.read_json("copy.json").await.unwrap();
    assert_eq!(original, copy);

    let err = svc.duplicate_map("ghost", "orphan").await.unwrap_err();
    assert!(matches!(err, MapServiceError::NotFound { .. }));
    assert!(!fx.documents.exists("orphan.json").await.unwrap());

    let err = svc.duplicate_map("open", "layers").await.unwrap_err();
    assert!(matches!(err, MapServiceError::InvalidName { .. }));

    svc.delete_map("copy").await.unwrap();
    let err = svc.delete_map("copy").await.unwrap_err();
    assert!(matches!(err, MapServiceError::NotFound { .. }));
    assert!(fx.documents.exists("layers.json").await.unwrap());
}

#[tokio::test]
async fn normalized_layers_use_the_map_properties() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    let layer = svc.get_normalized_layer("open", "1", &"bob".into()).await.unwrap();
    let NormalizedLayer::Wms(options) = layer else { panic!("expected a wms layer") };
    assert_eq!(options.url, "/proxy/https://gs/wms");
    assert_eq!(options.projection.code(), "EPSG:3006");

    let err = svc.get_normalized_layer("open", "404", &"bob".into()).await.unwrap_err();
    assert!(matches!(err, MapServiceError::NotFound { .. }));

    let err = svc.get_normalized_layer("planning", "1", &"bob".into()).await.unwrap_err();
    assert!(matches!(err, MapServiceError::AccessDenied { .. }));
}

#[tokio::test]
async fn group_queries_go_to_the_directory() {
    let fx = fixture().await;
    let svc = service(&fx, true);

    assert_eq!(svc.get_available_groups().await.unwrap(), ["gis", "planners"]);
    assert_eq!(
        svc.find_common_groups(&["alice".into(), "bob".into()]).await.unwrap(),
        ["gis"]
    );
}

#[derive(Debug)]
struct UnreachableDirectory;

impl DirectoryResolver for UnreachableDirectory {
    async fn is_user_valid(&self, _user: &Identity) -> Result<bool, DirectoryError> {
        Err(DirectoryError::Unavailable { message: "connection refused".into(), context: None })
    }

    async fn is_member_of(&self, _user: &Identity, _group: &str) -> Result<bool, DirectoryError> {
        Err(DirectoryError::Unavailable { message: "connection refused".into(), context: None })
    }

    async fn available_groups(&self) -> Result<Vec<String>, DirectoryError> {
        Err(DirectoryError::Unavailable { message: "connection refused".into(), context: None })
    }

    async fn common_groups(&self, _users: &[Identity]) -> Result<Vec<String>, DirectoryError> {
        Err(DirectoryError::Unavailable { message: "connection refused".into(), context: None })
    }
}

#[tokio::test]
async fn directory_outages_are_not_denials() {
    let fx = fixture().await;
    let svc = service_with(&fx, UnreachableDirectory, true);

    let err = svc.get_map_config("open", &"bob".into(), true).await.unwrap_err();
    assert!(matches!(err, MapServiceError::DirectoryUnavailable { .. }));

    let err = svc.get_user_specific_maps(&"bob".into()).await.unwrap_err();
    assert!(matches!(err, MapServiceError::DirectoryUnavailable { .. }));

    let err = svc.get_available_groups().await.unwrap_err();
    assert!(matches!(err, MapServiceError::DirectoryUnavailable { .. }));
}
