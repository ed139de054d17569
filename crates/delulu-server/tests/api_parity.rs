//! API parity tests: response shapes match what existing clients read.
//!
//! These serialize the real result types rather than going over HTTP.

use delulu_analyze::batch::BatchAssembler;
use delulu_analyze::extract::{Extraction, Rejection};
use delulu_analyze::{Identity, Normalizer, DELULU_LABELS};

const PROSE: &str = "1. Delulu Score: Level 5 – Certified Delulu\n\
    2. Summary: You have named the kids.\n\
    3. Relationship Probability: 12%\n\
    4. Advice: Log off for a week.";

/// Single results are bare objects with the legacy field names.
#[test]
fn test_single_result_shape() {
    let result = Normalizer::default().normalize(PROSE).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    let obj = value.as_object().unwrap();
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "advice",
            "delulu_description",
            "delulu_score",
            "relationship_probability",
            "summary",
        ]
    );

    assert!(value["delulu_score"].is_u64());
    assert!(value["relationship_probability"].is_u64());
    assert!(value["summary"].is_string());
    assert!(value["advice"].is_string());
    assert_eq!(value["delulu_description"], DELULU_LABELS.label(result.score()));
}

/// Structured summaries serialize as { narrative, insights }; step advice as an array.
#[test]
fn test_structured_result_shape() {
    let result = Normalizer::default()
        .normalize(
            r#"{"delulu_score": 2, "summary": {"narrative": "Hot and cold.", "insights": ["Replies at 3am"]}, "relationship_probability": 40, "advice": ["Match their energy"]}"#,
        )
        .unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert!(value["summary"]["narrative"].is_string());
    assert!(value["summary"]["insights"].is_array());
    assert!(value["advice"].is_array());
}

/// Batch results use camelCase counters and carry identity and error per item.
#[test]
fn test_batch_result_shape() {
    let result = Normalizer::default().normalize(PROSE).unwrap();
    let extractions: Vec<Extraction> = vec![
        Ok("Them: good morning\nMe: gm".into()),
        Err(Rejection::TooShort { length: 0 }),
    ];
    let batch = BatchAssembler::assemble(
        vec![
            Identity::Url("https://img.example/a.png".into()),
            Identity::Index(1),
        ],
        &extractions,
        &result,
        None,
    );
    let value = serde_json::to_value(&batch).unwrap();

    assert_eq!(value["totalSubmitted"], 2);
    assert_eq!(value["successfulCount"], 1);
    assert!(value["items"].is_array());

    let ok = &value["items"][0];
    assert_eq!(ok["identity"], "https://img.example/a.png");
    assert!(ok["error"].is_null());
    assert_eq!(ok["delulu_score"], 5);
    assert_eq!(ok["relationship_probability"], 12);

    let failed = &value["items"][1];
    assert_eq!(failed["identity"], 1);
    assert!(failed["error"].is_string());
    for field in [
        "delulu_score",
        "delulu_description",
        "summary",
        "relationship_probability",
        "advice",
    ] {
        assert!(failed[field].is_null(), "{} should be null", field);
    }
}
