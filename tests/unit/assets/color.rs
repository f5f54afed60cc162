use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Rgba8 = serde_json::from_value(json!("#1E3740")).unwrap();
    assert_eq!(c, Rgba8::rgb(0x1e, 0x37, 0x40));

    let c: Rgba8 = serde_json::from_value(json!("0000ff80")).unwrap();
    assert_eq!(
        c,
        Rgba8 {
            r: 0,
            g: 0,
            b: 255,
            a: 128
        }
    );
}

#[test]
fn parses_byte_arrays() {
    let c: Rgba8 = serde_json::from_value(json!([18, 154, 116])).unwrap();
    assert_eq!(c, Rgba8::rgb(18, 154, 116));
    assert!(serde_json::from_value::<Rgba8>(json!([1, 2])).is_err());
}

#[test]
fn rejects_malformed_hex() {
    assert!(Rgba8::parse_hex("#12345").is_err());
    assert!(Rgba8::parse_hex("#zzzzzz").is_err());
}

#[test]
fn serializes_as_hex() {
    assert_eq!(
        serde_json::to_value(Rgba8::rgb(0x12, 0x9a, 0x74)).unwrap(),
        json!("#129a74")
    );
    assert_eq!(
        Rgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 4
        }
        .to_hex(),
        "#01020304"
    );
}
