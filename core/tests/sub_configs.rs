//! Sub-config tests — cap of four, unique names, the rename quirk.

use damage_calc_core::{
    model::SubConfigEntry, types::MAX_SUB_CONFIGS, CalcConfig, PetConfigPatch, PetQueueStore,
    SubConfigPatch,
};

fn store_with_pet() -> (PetQueueStore, String) {
    let mut store = PetQueueStore::new(&CalcConfig::default_test());
    let pet = store.add_pet("1001").expect("add pet");
    (store, pet.id)
}

#[test]
fn four_distinct_presets_fit_and_fifth_is_noop() {
    let (mut store, pet_id) = store_with_pet();
    let presets: Vec<String> = store.presets().to_vec();
    assert!(presets.len() > MAX_SUB_CONFIGS, "need a spare preset for the fifth add");

    for name in presets.iter().take(MAX_SUB_CONFIGS) {
        assert!(store.add_sub_config(&pet_id, name).is_some(), "add {name} failed");
    }
    assert!(store.add_sub_config(&pet_id, &presets[MAX_SUB_CONFIGS]).is_none());
    assert!(store.add_sub_config(&pet_id, "custom").is_none());
    assert_eq!(store.pet(&pet_id).unwrap().sub_configs.len(), MAX_SUB_CONFIGS);
}

#[test]
fn duplicate_name_add_is_noop() {
    let (mut store, pet_id) = store_with_pet();
    assert!(store.add_sub_config(&pet_id, "星灵").is_some());
    assert!(store.add_sub_config(&pet_id, "星灵").is_none());
    assert_eq!(store.pet(&pet_id).unwrap().sub_configs.len(), 1);
}

#[test]
fn new_entries_start_with_empty_value() {
    let (mut store, pet_id) = store_with_pet();
    let entry_id = store.add_sub_config(&pet_id, "魂卡").unwrap();
    let entry = &store.pet(&pet_id).unwrap().sub_configs[0];
    assert_eq!(entry.entry_id, entry_id);
    assert_eq!(entry.name, "魂卡");
    assert_eq!(entry.value, "");
}

#[test]
fn available_names_exclude_used_presets() {
    let (mut store, pet_id) = store_with_pet();
    let presets = store.presets().to_vec();
    store.add_sub_config(&pet_id, &presets[0]).unwrap();

    let available = store.available_sub_config_names(&pet_id);
    assert!(!available.contains(&presets[0]));
    assert_eq!(available.len(), presets.len() - 1);

    for name in presets.iter().skip(1).take(MAX_SUB_CONFIGS - 1) {
        store.add_sub_config(&pet_id, name).unwrap();
    }
    assert!(store.available_sub_config_names(&pet_id).is_empty(), "pet at cap offers nothing");
    assert!(store.available_sub_config_names("ghost").is_empty());
}

#[test]
fn colliding_rename_drops_name_but_keeps_value() {
    let (mut store, pet_id) = store_with_pet();
    let _a = store.add_sub_config(&pet_id, "星灵").unwrap();
    let b = store.add_sub_config(&pet_id, "魂卡").unwrap();

    store.update_sub_config(&pet_id, &b, SubConfigPatch {
        name: Some("星灵".into()),
        value: Some("set A".into()),
    });

    let entry = store.pet(&pet_id).unwrap().sub_configs.iter()
        .find(|s| s.entry_id == b).cloned().unwrap();
    assert_eq!(entry.name, "魂卡", "colliding rename must be dropped");
    assert_eq!(entry.value, "set A", "value must still apply");
}

#[test]
fn non_colliding_rename_applies() {
    let (mut store, pet_id) = store_with_pet();
    let a = store.add_sub_config(&pet_id, "星灵").unwrap();

    store.update_sub_config(&pet_id, &a, SubConfigPatch {
        name: Some("custom slot".into()),
        value: None,
    });
    // Renaming to its own name is not a collision.
    store.update_sub_config(&pet_id, &a, SubConfigPatch {
        name: Some("custom slot".into()),
        value: Some("v".into()),
    });

    let entry = &store.pet(&pet_id).unwrap().sub_configs[0];
    assert_eq!(entry.name, "custom slot");
    assert_eq!(entry.value, "v");
}

#[test]
fn remove_sub_config_frees_the_name() {
    let (mut store, pet_id) = store_with_pet();
    let a = store.add_sub_config(&pet_id, "星灵").unwrap();
    store.remove_sub_config(&pet_id, &a);
    assert!(store.pet(&pet_id).unwrap().sub_configs.is_empty());
    assert!(store.add_sub_config(&pet_id, "星灵").is_some());
}

#[test]
fn update_pet_drops_invalid_sub_config_lists() {
    let (mut store, pet_id) = store_with_pet();
    let entry = |id: &str, name: &str| SubConfigEntry {
        entry_id: id.into(),
        name: name.into(),
        value: String::new(),
    };

    store.update_pet(&pet_id, PetConfigPatch {
        race_id: Some("2002".into()),
        sub_configs: Some(vec![entry("x1", "dup"), entry("x2", "dup")]),
        ..Default::default()
    });
    let pet = store.pet(&pet_id).unwrap();
    assert!(pet.sub_configs.is_empty(), "duplicate names accepted");
    assert_eq!(pet.race_id, "2002", "other fields still apply");

    let five = (0..5).map(|i| entry(&format!("y{i}"), &format!("n{i}"))).collect();
    store.update_pet(&pet_id, PetConfigPatch { sub_configs: Some(five), ..Default::default() });
    assert!(store.pet(&pet_id).unwrap().sub_configs.is_empty(), "over-cap list accepted");
}
