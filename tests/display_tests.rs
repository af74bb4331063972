use document_ai_viewer::decode::Decoder;
use document_ai_viewer::display::{format_text, present_response, Presentation, TextOptions, ViewerContext};

const INVOICE: &str = r#"{"InvoiceNumber":{"type":"string","value":"INV-1"},"LineItems":{"type":"array","value":[{"type":"object","value":{"sku":{"type":"string","value":"A1"},"qty":{"type":"number","value":2}}}]}}"#;

#[test]
fn non_object_responses_fall_back_to_raw_text() {
    for body in ["Internal Server Error", "[1,2,3]", "\"just a string\""] {
        assert_eq!(
            present_response(body, Decoder::default()),
            Presentation::RawText(body.to_string())
        );
    }
}

#[test]
fn too_deep_response_falls_back_to_raw_text() {
    let body = r#"{"a":{"type":"array","value":[{"type":"array","value":[1]}]}}"#;
    assert!(matches!(present_response(body, Decoder::new(0)), Presentation::RawText(_)));
}

#[test]
fn context_keeps_last_successful_result() {
    let mut ctx = ViewerContext::new(Decoder::default());
    assert!(ctx.copy_json().is_none());

    assert!(matches!(ctx.show(INVOICE), Presentation::Tables(_)));
    let copied = ctx.copy_json().unwrap().to_string();
    assert!(copied.contains("\"sku\": \"A1\""));

    assert!(matches!(ctx.show("not json"), Presentation::RawText(_)));
    assert_eq!(ctx.copy_json(), Some(copied.as_str()));
}

#[test]
fn text_output_lists_tables_and_collapses_raw_json() {
    let set = match present_response(INVOICE, Decoder::default()) {
        Presentation::Tables(set) => set,
        other => panic!("expected tables, got {:?}", other),
    };

    let text = format_text(&set, TextOptions::default());
    assert!(text.contains("| InvoiceNumber | INV-1 |"));
    assert!(text.contains("LineItems\n"));
    assert!(text.contains("| sku | qty |"));
    assert!(text.contains("| A1  | 2   |"));
    assert!(text.contains("> Raw JSON"));
    assert!(!text.contains("\"InvoiceNumber\": \"INV-1\""));

    let expanded = format_text(&set, TextOptions { show_raw: true });
    assert!(expanded.contains("\"InvoiceNumber\": \"INV-1\""));
}

#[test]
fn wide_characters_keep_borders_aligned() {
    let body = r#"{"Vendor":{"type":"string","value":"株式会社"},"Ref":{"type":"string","value":"A"}}"#;
    let set = match present_response(body, Decoder::default()) {
        Presentation::Tables(set) => set,
        other => panic!("expected tables, got {:?}", other),
    };
    let text = format_text(&set, TextOptions::default());
    assert!(text.contains("| Vendor | 株式会社 |"));
    assert!(text.contains("| Ref    | A        |"));
}
