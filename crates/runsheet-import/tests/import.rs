use runsheet_core::segment::SegmentType;
use runsheet_import::{error::ErrorCode, interchange, normalize};

/// A two-page scan as the layout reader tends to answer it: fenced, with the
/// page title repeated and the session break and diagram read as notes.
const TWO_PAGE_RESPONSE: &str = r#"```json
[
  {"type": "HEADER", "content": {"title": "CIRCUIT ASSEMBLY Stage Layout", "subtitle": "WITH BRANCH REPRESENTATIVE", "date": "MORNING SESSION"}},
  {"type": "TIME_BOX", "content": {"time": "9:30", "text": "Music"}},
  {"type": "CUE", "content": {"cueLabel": "Camera 1 Preset 1", "cueId": "Main Speaker", "cueDesc": "Invites audience", "isMedia": false}},
  {"type": "NOTE", "content": {"text": "[Stage Diagram detected - Please add manually]"}},
  {"type": "HEADER", "content": {"title": "CIRCUIT ASSEMBLY"}},
  {"type": "NOTE", "content": {"text": "AFTERNOON"}},
  {"type": "SPEAKER", "content": {"text": "Please be seated."}},
  {"type": "CUE", "content": {"cueLabel": "Media", "cueId": "Track 001", "cueDesc": "Convention Theme", "isMedia": true}}
]
```"#;

#[test]
fn test_two_page_scan_is_repaired() {
    let imported = normalize(TWO_PAGE_RESPONSE).expect("Failed to normalize");
    let segments = imported.segments();

    let types: Vec<_> = segments.iter().map(|s| s.segment_type().clone()).collect();
    assert_eq!(
        types,
        vec![
            SegmentType::Header,
            SegmentType::TimeBox,
            SegmentType::Cue,
            SegmentType::Diagram,
            SegmentType::Header,
            SegmentType::Speaker,
            SegmentType::Cue,
        ]
    );

    let header = segments[0].content();
    assert_eq!(header.title.as_deref(), Some("CIRCUIT ASSEMBLY"));
    assert_eq!(header.date.as_deref(), Some("MORNING SESSION"));

    assert!(segments[3].content().stage_items().is_empty());
    assert!(segments[3].content().stage_items.is_some());
    assert_eq!(segments[4].content().subtitle.as_deref(), Some("AFTERNOON"));
    assert_eq!(segments[6].content().is_media, Some(true));

    assert_eq!(imported.warnings().len(), 1);
    assert_eq!(imported.warnings()[0].code(), Some(ErrorCode::W200));
    assert_eq!(imported.warnings()[0].record(), Some(4));
}

#[test]
fn test_normalized_document_survives_interchange() {
    let imported = normalize(TWO_PAGE_RESPONSE).expect("Failed to normalize");
    let text = interchange::to_json(imported.segments()).expect("Failed to export");

    let reloaded = interchange::from_json(&text).expect("Failed to reload");
    assert_eq!(reloaded.segments(), imported.segments());
}

#[test]
fn test_malformed_responses_are_rejected() {
    let cases = [
        ("", ErrorCode::E001),
        ("```json\n```", ErrorCode::E001),
        ("The document appears to be blank.", ErrorCode::E002),
        ("[{\"type\": \"NOTE\"", ErrorCode::E002),
        ("{\"type\": \"NOTE\", \"content\": {}}", ErrorCode::E003),
        ("\"[]\"", ErrorCode::E003),
    ];

    for (response, expected) in cases {
        let err = normalize(response).expect_err(response);
        assert_eq!(err.diagnostics()[0].code(), Some(expected), "{response:?}");
    }
}

#[test]
fn test_interchange_rejects_service_shaped_records() {
    // Service records carry no ids, which is fine, but a missing
    // `content` is a structural error for a saved run sheet.
    let err = interchange::from_json(r#"[{"type": "HEADER"}]"#).unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E102));
}
