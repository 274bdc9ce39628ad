use super::*;

#[test]
fn formats_with_source_tag() {
    assert_eq!(GameId::custom(42).unwrap().to_string(), "CUSTOM_GAME_42");
    assert_eq!(GameId::steam(620).unwrap().to_string(), "STEAM_620");
}

#[test]
fn parses_both_sources() {
    let id: GameId = "CUSTOM_GAME_184467".parse().unwrap();
    assert_eq!(id.source(), SourceKind::CustomGame);
    assert_eq!(id.numeric(), 184467);

    let id: GameId = "STEAM_620".parse().unwrap();
    assert_eq!(id.source(), SourceKind::Steam);
    assert_eq!(id.numeric(), 620);
}

#[test]
fn zero_is_never_a_valid_id() {
    assert!(GameId::custom(0).is_none());
    assert_eq!(
        "STEAM_0".parse::<GameId>(),
        Err(GameIdError::Zero("STEAM_0".to_string()))
    );
}

#[test]
fn rejects_unknown_prefix() {
    assert!(matches!(
        "GOG_12".parse::<GameId>(),
        Err(GameIdError::UnknownSource(_))
    ));
    // The tag must be followed by an underscore.
    assert!(matches!(
        "STEAM12".parse::<GameId>(),
        Err(GameIdError::UnknownSource(_))
    ));
}

#[test]
fn rejects_bad_numbers() {
    for input in ["CUSTOM_GAME_", "CUSTOM_GAME_-5", "CUSTOM_GAME_12a", "STEAM_99999999999"] {
        assert!(
            matches!(input.parse::<GameId>(), Err(GameIdError::InvalidNumber(_))),
            "expected InvalidNumber for {input}"
        );
    }
}

#[test]
fn serializes_as_string() {
    let id = GameId::custom(7).unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"CUSTOM_GAME_7\"");
    let back: GameId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
