use super::*;

#[test]
fn kind_tracks_the_variant() {
    assert_eq!(Value::Int(1).kind(), ValueKind::Integer);
    assert_eq!(Value::text("a").kind(), ValueKind::Text);
    assert_eq!(Value::Composite(vec![]).kind(), ValueKind::Composite);
    assert_eq!(Value::entity("Person", Value::Long(1)).kind(), ValueKind::Entity);
    assert_eq!(Value::Null.kind(), ValueKind::Object);
}

#[test]
fn display_escapes_text_and_formats_composites() {
    assert_eq!(Value::text("o'neil").to_string(), "'o''neil'");
    assert_eq!(
        Value::Composite(vec![Value::Int(1), Value::Null]).to_string(),
        "(1, null)"
    );
    assert_eq!(Value::entity("Person", Value::Long(7)).to_string(), "Person#7");
}
