use super::*;

const MINIMAL: &str = r#"{ "size": [640, 480], "frames": 3 }"#;

fn doc(json: &str) -> SceneDocument {
    SceneDocument::from_json(json).unwrap()
}

#[test]
fn minimal_document_uses_defaults() {
    let d = doc(MINIMAL);
    d.validate().unwrap();
    assert_eq!(d.fps(), 60.0);
    assert_eq!(d.frames(), 3);
    assert!(d.def().nodes.is_empty());
}

#[test]
fn nodes_and_animations_parse() {
    let d = doc(
        r#"{
            "size": [100, 100],
            "frames": 10,
            "nodes": [
                { "type": "modifier", "name": "box", "opacity": 0.5,
                  "transform": { "translate": [10, 0, 0] },
                  "children": [ { "type": "surface", "name": "card", "size": [20, null] } ] }
            ],
            "animations": [
                { "at": 0, "target": "box", "set": { "opacity": 1 },
                  "transition": { "duration": 100, "curve": "easeIn" } },
                { "at": 50, "set": { "perspective": 800 } }
            ]
        }"#,
    );
    d.validate().unwrap();
    let NodeDef::Modifier(m) = &d.def().nodes[0] else {
        panic!("expected a modifier");
    };
    assert_eq!(m.transform.unwrap().scale, [1.0, 1.0, 1.0]);
    let NodeDef::Surface(s) = &m.children[0] else {
        panic!("expected a surface");
    };
    assert_eq!(s.kind, "div");
    assert_eq!(s.size, Some([Some(20.0), None]));

    let t = d.def().animations[0].transition.as_ref().unwrap().to_transition();
    assert_eq!(t.duration, Some(100.0));
    assert!(matches!(t.curve, Some(CurveRef::Named(ref n)) if n == "easeIn"));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = SceneDocument::from_json(r#"{ "size": [1, 1], "frames": 1, "fsp": 30 }"#)
        .unwrap_err();
    assert!(matches!(err, TrellisError::Validation(_)));
}

#[test]
fn bad_numbers_fail_validation() {
    for json in [
        r#"{ "size": [1, 1], "frames": 1, "fps": 0 }"#,
        r#"{ "size": [-1, 1], "frames": 1 }"#,
        r#"{ "size": [1, 1], "frames": 1, "tween": { "duration": -5 } }"#,
    ] {
        let err = doc(json).validate().unwrap_err();
        assert!(matches!(err, TrellisError::Validation(_)), "{json}");
    }
}

#[test]
fn duplicate_names_fail_validation() {
    let d = doc(
        r#"{ "size": [1, 1], "frames": 1, "nodes": [
            { "type": "surface", "name": "a" },
            { "type": "modifier", "children": [ { "type": "surface", "name": "a" } ] }
        ] }"#,
    );
    assert!(matches!(d.validate(), Err(TrellisError::Validation(_))));
}

#[test]
fn animation_targets_must_be_modifiers() {
    let base = r#"{ "size": [1, 1], "frames": 1, "nodes": [
        { "type": "surface", "name": "card" },
        { "type": "modifier", "name": "box" } ], "animations": [ ANIM ] }"#;
    let ok = base.replace("ANIM", r#"{ "at": 0, "target": "box", "set": { "align": [1, 1] } }"#);
    doc(&ok).validate().unwrap();

    for anim in [
        r#"{ "at": 0, "target": "card", "set": { "opacity": 1 } }"#,
        r#"{ "at": 0, "target": "ghost", "set": { "opacity": 1 } }"#,
        r#"{ "at": 0, "set": { "opacity": 1 } }"#,
    ] {
        let d = doc(&base.replace("ANIM", anim));
        assert!(matches!(d.validate(), Err(TrellisError::Scene(_))), "{anim}");
    }
}

#[test]
fn bad_transitions_fail_validation() {
    for transition in [r#"{ "duration": -1 }"#, r#"{ "speed": -0.5 }"#] {
        let json = format!(
            r#"{{ "size": [1, 1], "frames": 1, "nodes": [ {{ "type": "modifier", "name": "m" }} ],
                 "animations": [ {{ "at": 0, "target": "m", "set": {{ "opacity": 0 }},
                                   "transition": {transition} }} ] }}"#
        );
        assert!(matches!(doc(&json).validate(), Err(TrellisError::Validation(_))));
    }
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = SceneDocument::from_path("does/not/exist.json").unwrap_err();
    assert!(err.to_string().contains("open scene JSON"));
}
