use serde_json::{Value, json};
use vista_domain::document::{MapConfiguration, ToolOptions};

fn sample() -> Value {
    json!({
        "version": 1,
        "map": {
            "projection": "EPSG:3006",
            "extent": [0.0, 0.0, 10.0, 10.0],
            "geoserverLegendOptions": "fontAntiAliasing:true",
            "title": "Kommunkarta"
        },
        "tools": [
            {
                "type": "search",
                "index": 2,
                "options": { "visibleForGroups": ["gis"], "maxResults": 50 }
            },
            {
                "type": "layerswitcher",
                "options": {
                    "visibleForGroups": [],
                    "dropdownThemeMaps": true,
                    "themeMapHeaderCaption": "Planning",
                    "baselayers": [ { "id": "b1", "visibleForGroups": null, "visibleAtStart": true } ],
                    "groups": [
                        {
                            "id": "g1",
                            "name": "Roads",
                            "expanded": true,
                            "layers": [ { "id": "1", "drawOrder": 3 } ],
                            "groups": []
                        }
                    ]
                }
            },
            { "type": "print", "options": null }
        ]
    })
}

#[test]
fn parses_typed_fields() {
    let config: MapConfiguration = serde_json::from_value(sample()).unwrap();

    assert_eq!(config.map.projection.as_deref(), Some("EPSG:3006"));
    assert_eq!(config.tools.len(), 3);
    assert_eq!(config.tools[0].visible_for_groups().groups().collect::<Vec<_>>(), ["gis"]);

    let ls = config.layer_switcher().unwrap();
    assert!(ls.in_theme_dropdown());
    assert_eq!(ls.theme_map_header_caption.as_deref(), Some("Planning"));
    assert!(ls.baselayers[0].visible_for_groups.is_unrestricted());
    assert_eq!(ls.groups[0].layers[0].id, "1");
    assert!(config.map_visibility().is_unrestricted());
}

#[test]
fn unknown_fields_survive_a_roundtrip() {
    let config: MapConfiguration = serde_json::from_value(sample()).unwrap();
    let back = serde_json::to_value(&config).unwrap();

    assert_eq!(back["version"], 1);
    assert_eq!(back["map"]["title"], "Kommunkarta");
    assert_eq!(back["tools"][0]["index"], 2);
    assert_eq!(back["tools"][0]["options"]["maxResults"], 50);
    assert_eq!(back["tools"][1]["options"]["groups"][0]["expanded"], true);
    assert_eq!(back["tools"][1]["options"]["groups"][0]["layers"][0]["drawOrder"], 3);
    assert_eq!(back["tools"][1]["options"]["baselayers"][0]["visibleAtStart"], true);
}

#[test]
fn null_tool_options_become_empty() {
    let config: MapConfiguration = serde_json::from_value(sample()).unwrap();

    match &config.tools[2].options {
        ToolOptions::Plugin(options) => {
            assert!(options.visible_for_groups.is_unrestricted());
            assert!(options.extra.is_empty());
        },
        ToolOptions::LayerSwitcher(_) => panic!("print is not a layer switcher"),
    }
}

#[test]
fn missing_layer_switcher_means_unrestricted_map() {
    let config: MapConfiguration =
        serde_json::from_value(json!({ "tools": [ { "type": "draw" } ] })).unwrap();

    assert!(config.layer_switcher().is_none());
    assert!(config.map_visibility().is_unrestricted());
}

#[test]
fn malformed_layer_switcher_is_rejected() {
    let result = serde_json::from_value::<MapConfiguration>(json!({
        "tools": [ { "type": "layerswitcher", "options": { "groups": "not-a-list" } } ]
    }));
    assert!(result.is_err());
}

#[test]
fn tools_serialize_as_type_options_and_extras() {
    let config: MapConfiguration = serde_json::from_value(sample()).unwrap();
    let back = serde_json::to_value(&config.tools).unwrap();

    assert_eq!(
        back[0],
        json!({
            "type": "search",
            "options": { "visibleForGroups": ["gis"], "maxResults": 50 },
            "index": 2
        })
    );
    assert_eq!(back[1]["type"], "layerswitcher");
    assert_eq!(back[1]["options"]["themeMapHeaderCaption"], "Planning");
    assert_eq!(back[2]["options"], json!({ "visibleForGroups": [] }));

    let reparsed: MapConfiguration = serde_json::from_value(json!({ "tools": back })).unwrap();
    assert_eq!(reparsed.tools, config.tools);
}
