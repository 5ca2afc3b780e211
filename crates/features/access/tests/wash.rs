use proptest::prelude::*;
use serde_json::{Map, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use vista_access::{ConfigWasher, DirectoryError, DirectoryResolver, VisibilityFilter};
use vista_domain::document::{
    Group, LayerRef, LayerSwitcherOptions, MapConfiguration, Tool, ToolOptions,
};
use vista_domain::identity::Identity;
use vista_domain::visibility::VisibleForGroups;

/// Resolver that records every membership call.
#[derive(Debug, Default)]
struct CountingDirectory {
    groups: Vec<String>,
    fail: bool,
    calls: AtomicUsize,
}

impl CountingDirectory {
    fn member_of(groups: &[&str]) -> Self {
        Self { groups: groups.iter().map(|g| (*g).to_owned()).collect(), ..Self::default() }
    }

    fn broken() -> Self {
        Self { fail: true, ..Self::default() }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DirectoryResolver for CountingDirectory {
    async fn is_user_valid(&self, _user: &Identity) -> Result<bool, DirectoryError> {
        Ok(true)
    }

    async fn is_member_of(&self, _user: &Identity, group: &str) -> Result<bool, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DirectoryError::Unavailable { message: "ldap down".into(), context: None });
        }
        Ok(self.groups.iter().any(|g| g == group))
    }

    async fn available_groups(&self) -> Result<Vec<String>, DirectoryError> {
        Ok(self.groups.clone())
    }

    async fn common_groups(&self, _users: &[Identity]) -> Result<Vec<String>, DirectoryError> {
        Ok(Vec::new())
    }
}

fn config(value: serde_json::Value) -> MapConfiguration {
    serde_json::from_value(value).unwrap()
}

fn sample() -> MapConfiguration {
    config(json!({
        "map": { "projection": "EPSG:3006" },
        "tools": [
            { "type": "print", "options": { "visibleForGroups": ["admins"] } },
            { "type": "search", "options": { "visibleForGroups": [] } },
            {
                "type": "layerswitcher",
                "options": {
                    "visibleForGroups": [],
                    "baselayers": [
                        { "id": "orto", "visibleForGroups": ["gis"] },
                        { "id": "topo" }
                    ],
                    "groups": [
                        {
                            "id": "g1",
                            "name": "Planning",
                            "visibleForGroups": ["admins"],
                            "layers": [
                                { "id": "1", "visibleForGroups": ["gis"] },
                                { "id": "2", "visibleForGroups": ["admins"] }
                            ],
                            "groups": [
                                {
                                    "id": "g2",
                                    "layers": [ { "id": "3", "visibleForGroups": ["admins"] } ],
                                    "groups": []
                                }
                            ]
                        }
                    ]
                }
            }
        ]
    }))
}

fn ids(layers: &[LayerRef]) -> Vec<&str> {
    layers.iter().map(|l| l.id.as_str()).collect()
}

#[tokio::test]
async fn filter_short_circuits_on_first_match() {
    let groups = VisibleForGroups::new(["a", "b", "c"]);
    let user = Identity::from("alice");

    let dir = CountingDirectory::member_of(&["a"]);
    assert!(VisibilityFilter::new(&dir).is_visible(&groups, &user, "layer").await.unwrap());
    assert_eq!(dir.calls(), 1);

    let dir = CountingDirectory::member_of(&["c"]);
    assert!(VisibilityFilter::new(&dir).is_visible(&groups, &user, "layer").await.unwrap());
    assert_eq!(dir.calls(), 3);

    let dir = CountingDirectory::member_of(&[]);
    assert!(!VisibilityFilter::new(&dir).is_visible(&groups, &user, "layer").await.unwrap());
    assert_eq!(dir.calls(), 3);
}

#[tokio::test]
async fn unrestricted_nodes_skip_the_directory() {
    let dir = CountingDirectory::member_of(&[]);
    let filter = VisibilityFilter::new(&dir);

    let visible = filter
        .is_visible(&VisibleForGroups::unrestricted(), &Identity::from("alice"), "layer")
        .await
        .unwrap();

    assert!(visible);
    assert_eq!(dir.calls(), 0);
}

#[tokio::test]
async fn duplicate_groups_are_checked_once() {
    let dir = CountingDirectory::member_of(&[]);
    let groups = VisibleForGroups::new(["a", "a", "a"]);

    let visible = VisibilityFilter::new(&dir)
        .is_visible(&groups, &Identity::from("alice"), "layer")
        .await
        .unwrap();

    assert!(!visible);
    assert_eq!(dir.calls(), 1);
}

#[tokio::test]
async fn wash_prunes_tools_baselayers_and_layers() {
    let dir = CountingDirectory::member_of(&["gis"]);
    let original = sample();

    let washed = ConfigWasher::new(&dir)
        .wash_configuration(&original, &Identity::from("alice"))
        .await
        .unwrap();

    let kinds: Vec<_> = washed.tools.iter().map(|t| t.kind.as_str()).collect();
    assert_eq!(kinds, ["search", "layerswitcher"]);

    let ls = washed.layer_switcher().unwrap();
    assert_eq!(ids(&ls.baselayers), ["orto", "topo"]);
    assert_eq!(ids(&ls.groups[0].layers), ["1"]);
    assert!(ls.groups[0].groups[0].layers.is_empty());

    assert_eq!(original, sample(), "the input configuration is left untouched");
}

#[tokio::test]
async fn groups_survive_with_no_visible_children() {
    let dir = CountingDirectory::member_of(&[]);

    let washed = ConfigWasher::new(&dir)
        .wash_configuration(&sample(), &Identity::from("bob"))
        .await
        .unwrap();

    let ls = washed.layer_switcher().unwrap();
    assert_eq!(ids(&ls.baselayers), ["topo"]);
    assert_eq!(ls.groups.len(), 1);
    assert_eq!(ls.groups[0].id, "g1");
    assert!(ls.groups[0].layers.is_empty());
    assert_eq!(ls.groups[0].groups[0].id, "g2");
    assert_eq!(ls.groups[0].visible_for_groups, VisibleForGroups::new(["admins"]));
}

#[tokio::test]
async fn memberships_are_looked_up_once_per_wash() {
    let dir = CountingDirectory::member_of(&["gis"]);

    ConfigWasher::new(&dir).wash_configuration(&sample(), &Identity::from("alice")).await.unwrap();

    // One call for "admins" and one for "gis", however many nodes name them.
    assert_eq!(dir.calls(), 2);

    ConfigWasher::new(&dir).wash_configuration(&sample(), &Identity::from("alice")).await.unwrap();
    assert_eq!(dir.calls(), 4, "the memo does not outlive a wash");
}

#[tokio::test]
async fn directory_failure_aborts_the_wash() {
    let dir = CountingDirectory::broken();

    let err = ConfigWasher::new(&dir)
        .wash_configuration(&sample(), &Identity::from("alice"))
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::Unavailable { .. }));
    assert_eq!(dir.calls(), 1);
}

#[tokio::test]
async fn missing_layer_switcher_is_not_an_error() {
    let dir = CountingDirectory::member_of(&[]);
    let original = config(json!({
        "map": {},
        "tools": [
            { "type": "layerswitcher", "options": { "visibleForGroups": ["admins"] } },
            { "type": "search" }
        ]
    }));

    let washed =
        ConfigWasher::new(&dir).wash_configuration(&original, &Identity::from("bob")).await.unwrap();

    assert!(washed.layer_switcher().is_none());
    assert_eq!(washed.tools.len(), 1);
}

// --- property tests ---

const POOL: [&str; 3] = ["a", "b", "c"];

fn restriction() -> impl Strategy<Value = VisibleForGroups> {
    prop::collection::vec(prop::sample::select(POOL.to_vec()), 0..3).prop_map(VisibleForGroups::new)
}

fn layer() -> impl Strategy<Value = LayerRef> {
    ("[a-z0-9]{1,4}", restriction())
        .prop_map(|(id, vfg)| LayerRef { visible_for_groups: vfg, ..LayerRef::new(id) })
}

fn group_tree() -> impl Strategy<Value = Group> {
    let leaf = (prop::collection::vec(layer(), 0..4), restriction()).prop_map(|(layers, vfg)| {
        Group { layers, visible_for_groups: vfg, ..Group::default() }
    });

    leaf.prop_recursive(3, 32, 4, |inner| {
        (prop::collection::vec(layer(), 0..4), prop::collection::vec(inner, 0..4), restriction())
            .prop_map(|(layers, groups, vfg)| Group {
                layers,
                groups,
                visible_for_groups: vfg,
                ..Group::default()
            })
    })
}

fn configuration() -> impl Strategy<Value = MapConfiguration> {
    (prop::collection::vec(layer(), 0..4), prop::collection::vec(group_tree(), 0..3), restriction())
        .prop_map(|(baselayers, groups, tool_vfg)| {
            let switcher = Tool {
                kind: "layerswitcher".to_owned(),
                options: ToolOptions::LayerSwitcher(LayerSwitcherOptions {
                    baselayers,
                    groups,
                    ..LayerSwitcherOptions::default()
                }),
                extra: Map::new(),
            };
            let plugin = Tool {
                kind: "print".to_owned(),
                options: ToolOptions::Plugin(vista_domain::document::PluginOptions {
                    visible_for_groups: tool_vfg,
                    extra: Map::new(),
                }),
                extra: Map::new(),
            };
            MapConfiguration { tools: vec![plugin, switcher], ..MapConfiguration::default() }
        })
}

fn allowed(vfg: &VisibleForGroups, member_of: &[&str]) -> bool {
    vfg.is_unrestricted() || vfg.groups().any(|g| member_of.contains(&g))
}

fn expected_group(group: &Group, member_of: &[&str]) -> Group {
    Group {
        layers: group
            .layers
            .iter()
            .filter(|l| allowed(&l.visible_for_groups, member_of))
            .cloned()
            .collect(),
        groups: group.groups.iter().map(|g| expected_group(g, member_of)).collect(),
        ..group.clone()
    }
}

fn expected(config: &MapConfiguration, member_of: &[&str]) -> MapConfiguration {
    let tools = config
        .tools
        .iter()
        .filter(|t| allowed(t.visible_for_groups(), member_of))
        .map(|t| match &t.options {
            ToolOptions::LayerSwitcher(ls) => Tool {
                options: ToolOptions::LayerSwitcher(LayerSwitcherOptions {
                    baselayers: ls
                        .baselayers
                        .iter()
                        .filter(|l| allowed(&l.visible_for_groups, member_of))
                        .cloned()
                        .collect(),
                    groups: ls.groups.iter().map(|g| expected_group(g, member_of)).collect(),
                    ..ls.clone()
                }),
                ..t.clone()
            },
            ToolOptions::Plugin(_) => t.clone(),
        })
        .collect();

    MapConfiguration { tools, ..config.clone() }
}

fn wash(config: &MapConfiguration, dir: &CountingDirectory) -> MapConfiguration {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime
        .block_on(ConfigWasher::new(dir).wash_configuration(config, &Identity::from("alice")))
        .unwrap()
}

proptest! {
    #[test]
    fn wash_keeps_exactly_the_visible_nodes(
        config in configuration(),
        member_of in prop::sample::subsequence(POOL.to_vec(), 0..=3),
    ) {
        let dir = CountingDirectory::member_of(&member_of);
        prop_assert_eq!(wash(&config, &dir), expected(&config, &member_of));
        prop_assert!(dir.calls() <= POOL.len());
    }

    #[test]
    fn wash_is_idempotent(
        config in configuration(),
        member_of in prop::sample::subsequence(POOL.to_vec(), 0..=3),
    ) {
        let dir = CountingDirectory::member_of(&member_of);
        let once = wash(&config, &dir);
        let twice = wash(&once, &dir);
        prop_assert_eq!(once, twice);
    }
}
