mod common;

use common::*;
use creative_check_lib::asset::encode_png;
use creative_check_lib::composition::MockupVerdict;
use creative_check_lib::Verdict;
use image::{Rgb, RgbImage};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn clean_list_screen_passes() {
    let report = clean_validator()
        .validate(&uniform_asset(720, 360, MID_GRAY, 150 * KB))
        .await;

    assert_eq!(report.classification.label(), "list screen");
    assert_eq!(report.verdict, Verdict::Pass);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(
        report.passes,
        vec![
            "Classified as list screen (720x360, guide p.4-5)".to_string(),
            "File size 150.0KB within the 200KB limit".to_string(),
            "Format Png accepted".to_string(),
            "Background color #808080 is not a forbidden color".to_string(),
            "No device mockup detected".to_string(),
            "No text detected".to_string(),
        ]
    );
}

#[tokio::test]
async fn oversized_list_screen_fails_on_size_only() {
    let report = clean_validator()
        .validate(&uniform_asset(720, 360, MID_GRAY, 250 * KB))
        .await;

    assert_eq!(report.classification.label(), "list screen");
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("200KB"), "{}", report.errors[0]);
}

#[tokio::test]
async fn unmatched_dimensions_fail_as_unclassified() {
    let report = clean_validator()
        .validate(&uniform_asset(100, 100, MID_GRAY, 10 * KB))
        .await;

    assert_eq!(report.classification.label(), "unclassified");
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("100x100"));
    // the remaining checks still ran
    assert!(report.passes.iter().any(|p| p.starts_with("Background color")));
}

#[tokio::test]
async fn black_variable_height_event_image_fails_background() {
    let report = clean_validator()
        .validate(&uniform_asset(720, 1500, [0, 0, 0], 500 * KB))
        .await;

    assert_eq!(report.classification.label(), "detail event image");
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Background is black (#000000)"));
    // category note is surfaced for manual review
    assert!(report.advisories.iter().any(|a| a.contains("variable height")));
}

#[tokio::test]
async fn download_phrase_fails_text_policy() {
    let validator = validator(
        StubDetector::Verdict(MockupVerdict::Clear),
        StubOcr(Some(vec!["쿠키 받고", "지금 다운로드 하세요"])),
    );
    let report = validator
        .validate(&uniform_asset(720, 360, MID_GRAY, 150 * KB))
        .await;

    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("다운로드"));
    assert!(report.passes.iter().any(|p| p.starts_with("File size")));
}

#[tokio::test]
async fn errors_follow_stage_order() {
    let validator = validator(
        StubDetector::Verdict(MockupVerdict::Detected),
        StubOcr(Some(vec!["포인트 적립"])),
    );
    let report = validator
        .validate(&uniform_asset(720, 360, [255, 255, 255], 300 * KB))
        .await;

    assert_eq!(report.errors.len(), 4);
    assert!(report.errors[0].starts_with("File size"));
    assert!(report.errors[1].starts_with("Background is white"));
    assert!(report.errors[2].starts_with("Device mockup detected"));
    assert!(report.errors[3].starts_with("Reward currency"));
}

#[tokio::test]
async fn participation_area_allows_device_mockup() {
    let validator = validator(
        StubDetector::Verdict(MockupVerdict::Detected),
        StubOcr(Some(Vec::new())),
    );
    let report = validator
        .validate(&uniform_asset(144, 144, MID_GRAY, 50 * KB))
        .await;

    assert_eq!(report.classification.label(), "participation area");
    assert_eq!(report.verdict, Verdict::Pass);
    assert!(report
        .advisories
        .contains(&"Device mockup detected; permitted for participation area".to_string()));
}

#[tokio::test]
async fn collaborator_failures_leave_the_rest_of_the_report() {
    let validator = validator(StubDetector::Fails, StubOcr(None));
    let report = validator
        .validate(&uniform_asset(720, 360, MID_GRAY, 150 * KB))
        .await;

    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.advisories.len(), 2);
    assert!(report.advisories[0].starts_with("composition check indeterminate"));
    assert!(report.advisories[0].contains("503"));
    assert!(report.advisories[1].starts_with("text policy check indeterminate"));
    assert!(report.passes.iter().any(|p| p.starts_with("File size")));
}

#[tokio::test]
async fn unparseable_model_output_is_indeterminate() {
    let validator = validator(
        StubDetector::Verdict(MockupVerdict::Indeterminate("no marker".into())),
        StubOcr(Some(Vec::new())),
    );
    let report = validator
        .validate(&uniform_asset(720, 360, MID_GRAY, 150 * KB))
        .await;

    assert_eq!(report.verdict, Verdict::Pass);
    assert!(!report.passes.iter().any(|p| p.contains("mockup")));
    assert!(report.advisories[0].contains("no marker"));
}

#[tokio::test]
async fn shopping_marker_adds_advisory_without_failing() {
    let validator = validator(
        StubDetector::Verdict(MockupVerdict::Clear),
        StubOcr(Some(vec!["쇼핑 특가"])),
    );
    let report = validator
        .validate(&uniform_asset(720, 360, MID_GRAY, 150 * KB))
        .await;

    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.advisories.len(), 1);
    assert!(report.advisories[0].starts_with("Shopping partnership marker"));
}

#[tokio::test]
async fn decodes_uploaded_png_bytes() {
    let pixels = RgbImage::from_pixel(120, 120, Rgb(MID_GRAY));
    let bytes = encode_png(&pixels).unwrap();

    let report = clean_validator().validate_bytes(&bytes).await.unwrap();
    assert_eq!(report.classification.label(), "icon asset");
    assert_eq!(report.byte_size, bytes.len() as u64);
    assert_eq!(report.verdict, Verdict::Pass);
}

#[tokio::test]
async fn rejects_non_image_upload() {
    assert!(clean_validator().validate_bytes(b"%PDF-1.4").await.is_err());
}
