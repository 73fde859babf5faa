use super::*;

const SAMPLE: &str = r#"[
    { "id": 100, "inscription": 41234567, "attributes": { "Body": "Alien", "Eyes": "Laser" } },
    { "id": 7,   "inscription": 500,      "attributes": { "Body": "mystery" } },
    { "id": 9,   "inscription": 100000,   "attributes": { "Body": "GOLD" } }
]"#;

fn sample() -> Catalog {
    Catalog::from_json_slice(SAMPLE.as_bytes()).unwrap()
}

#[test]
fn parses_records_with_extra_attributes() {
    let c = sample();
    assert_eq!(c.len(), 3);
    assert_eq!(c.policy(), CatalogPolicy::Strict);
    let r = c.record(100).unwrap();
    assert_eq!(r.attributes.body, "Alien");
    assert_eq!(r.attributes.extra["Eyes"], serde_json::json!("Laser"));
}

#[test]
fn strict_prefers_id_then_inscription() {
    let c = sample();
    assert_eq!(
        c.resolve_id("100").unwrap(),
        ResolvedId {
            id: 100,
            via: ResolvedVia::Id
        }
    );
    assert_eq!(
        c.resolve_id("41234567").unwrap(),
        ResolvedId {
            id: 100,
            via: ResolvedVia::Inscription
        }
    );
    // 500 is not an id, but it is record 7's inscription.
    assert_eq!(c.resolve_id(" 500 ").unwrap().id, 7);
}

#[test]
fn strict_rejects_unknown_numbers() {
    let c = sample();
    assert!(matches!(c.resolve_id("42"), Err(SpriteError::NotFound(_))));
    let err = c.resolve_id("99999999").unwrap_err();
    assert!(err.to_string().contains("inscription"));
}

#[test]
fn strict_errors_use_the_configured_id_range() {
    let c = sample().with_offline_range(1, 200).unwrap();
    assert_eq!(c.policy(), CatalogPolicy::Strict);
    let err = c.resolve_id("150").unwrap_err();
    assert!(err.to_string().contains("id 150 is not in the catalog"), "{err}");
    // Above the configured range, so reported as an inscription number.
    let err = c.resolve_id("300").unwrap_err();
    assert!(err.to_string().contains("inscription 300"), "{err}");
}

#[test]
fn empty_catalog_resolves_by_range() {
    let c = Catalog::from_json_slice(b"[]").unwrap();
    assert!(c.is_empty());
    assert_eq!(c.policy(), CatalogPolicy::default());
    assert_eq!(
        c.resolve_id("5").unwrap(),
        ResolvedId {
            id: 5,
            via: ResolvedVia::OfflineRange
        }
    );
    assert!(c.resolve_id("10001").is_err());
}

#[test]
fn non_numeric_input_is_a_validation_error() {
    let c = sample();
    for bad in ["", "  ", "12a", "-5", "1.0", "#100", "١٠٠"] {
        assert!(
            matches!(c.resolve_id(bad), Err(SpriteError::Validation(_))),
            "input {bad:?}"
        );
    }
}

#[test]
fn offline_policy_accepts_range_only() {
    let c = Catalog::offline(OFFLINE_ID_MIN, OFFLINE_ID_MAX).unwrap();
    assert_eq!(
        c.resolve_id("1").unwrap().via,
        ResolvedVia::OfflineRange
    );
    assert_eq!(c.resolve_id("10000").unwrap().id, 10_000);
    assert!(c.resolve_id("0").is_err());
    assert!(c.resolve_id("10001").is_err());
    assert!(c.resolve_id("99999999999999999999999").is_err());
    assert!(Catalog::offline(5, 1).is_err());
}

#[test]
fn load_first_falls_back_in_order() {
    let dir = std::env::temp_dir().join(format!("sprite_loop_catalog_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let broken = dir.join("broken.json");
    let good = dir.join("good.json");
    std::fs::write(&broken, b"{ not json").unwrap();
    std::fs::write(&good, SAMPLE).unwrap();

    let missing = dir.join("missing.json");
    let c = Catalog::load_first(&[missing.clone(), broken.clone(), good], 1, 10_000).unwrap();
    assert_eq!(c.policy(), CatalogPolicy::Strict);

    let c = Catalog::load_first(&[missing.clone(), broken], 1, 10_000).unwrap();
    assert_eq!(
        c.policy(),
        CatalogPolicy::OfflineRange { min: 1, max: 10_000 }
    );

    // A catalog that parses but lists nothing takes the configured range.
    let empty = dir.join("empty.json");
    std::fs::write(&empty, b"[]").unwrap();
    let c = Catalog::load_first(&[missing, empty], 1, 50).unwrap();
    assert_eq!(c.policy(), CatalogPolicy::OfflineRange { min: 1, max: 50 });
    assert_eq!(c.resolve_id("5").unwrap().via, ResolvedVia::OfflineRange);
    assert!(c.resolve_id("60").is_err());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn body_palette_is_case_insensitive() {
    assert_eq!(body_color("Alien"), Some(Rgba8::opaque(0x04, 0xcf, 0xe7)));
    assert_eq!(body_color("WHITE"), Some(Rgba8::opaque(0xc7, 0xbc, 0xb6)));
    assert_eq!(body_color("unknown"), None);
}

#[test]
fn background_choices_resolve() {
    let c = sample();
    assert_eq!(BackgroundChoice::None.resolve(&c, 100).unwrap(), Rgba8::WHITE);
    assert_eq!(
        BackgroundChoice::Auto.resolve(&c, 100).unwrap().to_hex(),
        "#04cfe7"
    );
    assert_eq!(
        BackgroundChoice::Auto.resolve(&c, 9).unwrap().to_hex(),
        "#ffaa01"
    );
    // Unknown body type and unknown id both fail.
    assert!(BackgroundChoice::Auto.resolve(&c, 7).is_err());
    assert!(BackgroundChoice::Auto.resolve(&c, 1).is_err());

    let custom: BackgroundChoice = "#123456".parse().unwrap();
    assert_eq!(
        custom.resolve(&c, 1).unwrap(),
        Rgba8::opaque(0x12, 0x34, 0x56)
    );
}

#[test]
fn background_choice_parses_keywords() {
    assert_eq!("auto".parse::<BackgroundChoice>().unwrap(), BackgroundChoice::Auto);
    assert_eq!("None".parse::<BackgroundChoice>().unwrap(), BackgroundChoice::None);
    assert!("purple-ish".parse::<BackgroundChoice>().is_err());
}
