//! Zone manifests shipped under data/zones/ must stay loadable.

use mossblade::core::data::zone::ZoneManifest;

#[test]
fn meadow_manifest_loads() {
    let m = ZoneManifest::load("meadow").expect("meadow manifest");
    assert_eq!(m.slug, "meadow");
    assert!(!m.display_name.is_empty());
    assert!(m.terrain.size >= 3);
    assert!(m.terrain.extent > 0.0);
    assert!(m.raider_count > 0);

    let p = m.grass.to_params();
    assert!(p.patch_size > 0.0);
    assert!(p.view_radius > p.lod_radius);
    assert!(p.blades_low < p.blades_high);
}

#[test]
fn unknown_zone_falls_back_to_defaults() {
    let m = ZoneManifest::load_or_default("no-such-zone");
    assert_eq!(m.slug, "no-such-zone");
    assert!(m.terrain.size >= 3);
    assert!(m.grass.to_params().blades_high > 0);
}
