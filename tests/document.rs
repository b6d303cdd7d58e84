//! End-to-end tests over the definition files in tests/fixtures.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use blazon::cli::info::DocumentSummary;
use blazon::{
    BlazonError, CoatOfArms, Colour, ContainerTag, ExportOptions, History, LayerId, NamedColour,
    Symmetry, Vec2,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

fn dynasty() -> CoatOfArms {
    load_fixture("dynasty.txt").parse().unwrap()
}

fn id(s: &str) -> LayerId {
    LayerId::from(s)
}

/// Every container's layers sit in one unbroken run.
fn assert_contiguous(coa: &CoatOfArms) {
    for tag in coa.containers() {
        let indices: Vec<usize> = coa
            .layers()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.container().map(|t| &t.id) == Some(&tag.id))
            .map(|(i, _)| i)
            .collect();
        let first = indices[0];
        let expected: Vec<usize> = (first..first + indices.len()).collect();
        assert_eq!(indices, expected, "container {} is split", tag);
    }
}

#[test]
fn test_fixtures_reach_a_fixed_point() {
    for name in ["dynasty.txt", "legacy.txt"] {
        let first: CoatOfArms = load_fixture(name).parse().unwrap();
        let written = first.to_string();
        let second: CoatOfArms = written.parse().unwrap();
        assert_eq!(second.to_string(), written, "{} is not stable", name);
    }
}

#[test]
fn test_dynasty_structure() {
    let coa = dynasty();
    assert_eq!(coa.pattern(), "pattern_horizontal_split_01.dds");
    assert_eq!(coa.base_colour(1).unwrap().name(), Some(NamedColour::Blue));
    assert_eq!(coa.base_colour(3).unwrap().channels(), [12, 34, 56]);

    let ids: Vec<&str> = coa.layers().iter().map(|l| l.id().as_str()).collect();
    assert_eq!(ids, vec!["field", "lion", "eagle"]);

    let lion = coa.layer(&id("lion")).unwrap();
    assert!(lion.flip_x());
    assert!(!lion.flip_y());
    assert_eq!(lion.instance_count(), 2);
    assert_eq!(lion.instances()[0].rotation(), 15.0);
    assert_eq!(lion.colour_count(), 3);

    let eagle = coa.layer(&id("eagle")).unwrap();
    assert!(!eagle.visible());
    assert_eq!(eagle.mask().unwrap().values(), [1, 0, 0]);
    assert_eq!(eagle.container(), lion.container());
    assert_eq!(coa.source_key(), Some("coa_rd_dynasty_1"));
}

#[test]
fn test_dynasty_round_trip_preserves_layers() {
    let coa = dynasty();
    let again: CoatOfArms = coa.to_string().parse().unwrap();
    assert_eq!(again.layers(), coa.layers());
    assert_eq!(again.base_colours(), coa.base_colours());
}

/// Flattened (texture, colours, mask, instance) tuples, sorted.
fn flattened(coa: &CoatOfArms) -> Vec<String> {
    let mut rows: Vec<String> = coa
        .layers()
        .iter()
        .flat_map(|layer| {
            layer.instances().iter().map(move |inst| {
                format!(
                    "{} {:?} {:?} {:?} {:?} {}",
                    layer.texture(),
                    layer.colours(),
                    layer.mask(),
                    inst.position(),
                    inst.scale(),
                    inst.rotation()
                )
            })
        })
        .collect();
    rows.sort();
    rows
}

#[test]
fn test_split_layers_keep_flattened_content() {
    let mut coa = dynasty();
    let before = flattened(&coa);
    let parts = coa.split_layer(&id("lion")).unwrap();
    assert_eq!(parts.len(), 2);

    let again: CoatOfArms = coa.to_string().parse().unwrap();
    assert_eq!(again.layer_count(), 4);
    assert_eq!(flattened(&again), before);
    assert_contiguous(&again);
}

#[test]
fn test_written_depths_keep_order() {
    let mut coa = dynasty();
    coa.move_layer(&id("field"), 2).unwrap();
    let again: CoatOfArms = coa.to_string().parse().unwrap();
    let ids: Vec<&str> = again.layers().iter().map(|l| l.id().as_str()).collect();
    assert_eq!(ids, vec!["lion", "eagle", "field"]);
}

#[test]
fn test_legacy_containers_are_split() {
    let coa: CoatOfArms = load_fixture("legacy.txt").parse().unwrap();
    assert_eq!(
        coa.containers(),
        vec![ContainerTag {
            id: "c7".to_string(),
            name: "Stars".to_string(),
        }]
    );
    assert_eq!(coa.container_layers("c7").len(), 2);
    let written = coa.to_string();
    assert!(written.contains("container_uuid = c7"));
    assert!(written.contains("container_name = Stars"));
}

#[test]
fn test_paste_bare_emblems_above_a_layer() {
    let mut coa = dynasty();
    let added = coa
        .parse(&load_fixture("emblems.txt"), Some(&id("field")))
        .unwrap();
    assert_eq!(added.len(), 2);
    assert_eq!(coa.layer_count(), 5);
    assert_eq!(coa.index_of(&added[0]).unwrap(), 1);
    assert_eq!(coa.index_of(&added[1]).unwrap(), 2);
    assert_eq!(coa.pattern(), "pattern_horizontal_split_01.dds");
    assert_contiguous(&coa);

    let star = coa.layer(&added[1]).unwrap();
    assert_eq!(star.symmetry(), &Symmetry::rotational(4));

    // Mirrors are written out but read back as the single seed.
    let written = coa.to_string();
    assert!(written.contains("mirror = yes"));
    let again: CoatOfArms = written.parse().unwrap();
    assert_eq!(again.layers()[2].instance_count(), 1);
}

#[test]
fn test_paste_offsets_instances_and_renews_ids() {
    let mut coa = dynasty();
    let clip = coa.export_layers(&[id("lion")], false).unwrap();
    let pasted = coa.paste(&clip, None, Vec2::new(0.1, 0.0)).unwrap();
    assert_eq!(pasted.len(), 1);
    assert_ne!(pasted[0], id("lion"));

    let copy = coa.layer(&pasted[0]).unwrap();
    let x = copy.instances()[0].position().x;
    assert!((x - 0.4).abs() < 1e-9);
    assert!(copy.container().is_none());
}

#[test]
fn test_full_document_replaces_content() {
    let mut coa = dynasty();
    coa.parse(&load_fixture("legacy.txt"), Some(&id("lion")))
        .unwrap();
    assert_eq!(coa.pattern(), "pattern_solid.dds");
    assert_eq!(coa.layer_count(), 2);
    assert!(coa.layer(&id("lion")).is_err());
}

#[test]
fn test_failed_parse_leaves_document_untouched() {
    let mut coa = dynasty();
    let before = coa.to_string();
    let err = coa.parse("coa = { pattern = ", None).unwrap_err();
    assert!(matches!(err, BlazonError::Parse { .. }));
    assert_eq!(coa.to_string(), before);
}

#[test]
fn test_scattered_container_is_repaired() {
    let mut coa = dynasty();
    // The field lands between the lion and the eagle.
    coa.move_layer(&id("field"), 1).unwrap();
    assert!(coa.validate_container_contiguity().is_empty());
    assert_contiguous(&coa);
    let tags: Vec<Option<&str>> = coa
        .layers()
        .iter()
        .map(|l| l.container().map(|t| t.id.as_str()))
        .collect();
    assert_eq!(tags[0], Some("beasts"));
    assert_eq!(tags[1], None);
    assert_ne!(tags[2], Some("beasts"));
    assert!(tags[2].is_some());
}

#[test]
fn test_contiguity_holds_through_edit_sequence() {
    let mut coa = dynasty();
    let shared = ContainerTag::new("shared");
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = |bound: usize| {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((seed >> 33) as usize) % bound
    };

    for _ in 0..200 {
        let ids: Vec<LayerId> = coa.layers().iter().map(|l| l.id().clone()).collect();
        let target = ids[next(ids.len())].clone();
        match next(6) {
            0 => coa.move_layer(&target, next(ids.len())).unwrap(),
            1 => {
                coa.shift_layer_up(&target).unwrap();
            }
            2 => {
                coa.shift_layer_down(&target).unwrap();
            }
            3 if ids.len() < 12 => {
                coa.duplicate_layer(&target).unwrap();
            }
            4 if ids.len() > 2 => {
                coa.remove_layer(&target).unwrap();
            }
            _ => {
                let tag = (next(2) == 0).then(|| shared.clone());
                coa.set_container(&[target], tag).unwrap();
            }
        }
        assert_contiguous(&coa);
        assert!(coa.layers().iter().all(|l| l.instance_count() >= 1));
    }
}

#[test]
fn test_last_instance_cannot_be_removed() {
    let mut coa = dynasty();
    assert!(coa.remove_instance(&id("eagle"), 0).is_err());
    coa.remove_instance(&id("lion"), 1).unwrap();
    assert!(matches!(
        coa.remove_instance(&id("lion"), 0),
        Err(BlazonError::InvariantViolation { .. })
    ));
}

#[test]
fn test_colours_survive_either_encoding() {
    let mut coa = dynasty();
    let named = coa.to_string();
    coa.set_options(ExportOptions {
        force_rgb: true,
        ..ExportOptions::default()
    });
    let rgb = coa.to_string();
    assert!(rgb.contains("color1 = rgb { "));

    let from_named: CoatOfArms = named.parse().unwrap();
    let from_rgb: CoatOfArms = rgb.parse().unwrap();
    let channels = |c: &CoatOfArms| -> Vec<[u8; 3]> {
        c.layers()
            .iter()
            .flat_map(|l| l.colours().iter().map(Colour::channels))
            .chain(c.base_colours().iter().map(Colour::channels))
            .collect()
    };
    assert_eq!(channels(&from_named), channels(&from_rgb));
}

#[test]
fn test_texture_metadata_sets_colour_count() {
    let textures: HashMap<String, u8> = [("ce_lion_rampant.dds".to_string(), 2)].into();
    let mut coa = CoatOfArms::with_metadata(Arc::new(textures));
    coa.parse(&load_fixture("dynasty.txt"), None).unwrap();
    assert_eq!(coa.layer(&id("lion")).unwrap().colour_count(), 2);
    assert_eq!(coa.layer(&id("field")).unwrap().colour_count(), 3);
}

#[test]
fn test_undo_redo_through_history() {
    let mut coa = dynasty();
    let mut history = History::new(10);
    history.save(coa.snapshot());

    coa.remove_layer(&id("field")).unwrap();
    history.save(coa.snapshot());
    coa.set_pattern("pattern_solid.dds");
    history.save(coa.snapshot());

    let state = history.undo().unwrap().clone();
    coa.restore(&state);
    assert_eq!(coa.pattern(), "pattern_horizontal_split_01.dds");
    assert_eq!(coa.layer_count(), 2);

    let state = history.undo().unwrap().clone();
    coa.restore(&state);
    assert_eq!(coa.layer_count(), 3);
    assert!(history.undo().is_none());

    let state = history.redo().unwrap().clone();
    coa.restore(&state);
    assert_eq!(coa.layer_count(), 2);
    assert!(history.can_redo());
}

#[test]
fn test_summary_json() {
    let coa = dynasty();
    let json = serde_json::to_string_pretty(&DocumentSummary::of(&coa)).unwrap();
    insta::assert_snapshot!(json, @r##"
    {
      "pattern": "pattern_horizontal_split_01.dds",
      "colours": [
        "blue",
        "white",
        "#0C2238"
      ],
      "layers": [
        {
          "id": "field",
          "name": "ce_border_01",
          "texture": "ce_border_01.dds",
          "colours": [
            "white",
            "red",
            "red"
          ],
          "instances": 1,
          "visible": true
        },
        {
          "id": "lion",
          "name": "ce_lion_rampant",
          "texture": "ce_lion_rampant.dds",
          "colours": [
            "red",
            "yellow",
            "red"
          ],
          "instances": 2,
          "visible": true,
          "container": "Beasts"
        },
        {
          "id": "eagle",
          "name": "ce_eagle",
          "texture": "ce_eagle.dds",
          "colours": [
            "yellow",
            "red",
            "red"
          ],
          "instances": 1,
          "visible": false,
          "container": "Beasts"
        }
      ],
      "containers": [
        {
          "id": "beasts",
          "name": "Beasts",
          "layers": 2
        }
      ]
    }
    "##);
}
