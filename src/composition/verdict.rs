//! Extracts the mockup marker from free-form model output.
//!
//! The prompt asks for `[목업여부: YES]` / `[목업여부: NO]`, but models drift:
//! missing brackets, bold markers, full-width colons, lowercase, Korean
//! yes/no words, or an English "Mockup:" label. Models also echo the option
//! template ("[목업여부: YES] 또는 [목업여부: NO]") before answering, so such
//! pairs are skipped and the last remaining marker is the answer. A response
//! with no usable marker is indeterminate.

use regex::Regex;
use std::sync::OnceLock;

use super::MockupVerdict;

pub const MOCKUP_INSTRUCTION: &str = "이 광고 소재 이미지에 스마트폰 등 실제 기기 프레임(베젤, 홈 버튼, 노치)을 씌운 목업이 포함되어 있는지 판단하세요. \
간단한 근거를 적고, 마지막 줄에 반드시 [목업여부: YES] 또는 [목업여부: NO] 형식으로만 표기하세요.";

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:목업\s*여부|mock-?up)\s*\**\s*[:：=]\s*\**\s*(yes|no|예|네|아니오|아니요)\b",
        )
        .expect("mockup marker pattern is valid")
    })
}

/// Text between two markers that makes them a list of options, not answers.
fn is_alternative(between: &str) -> bool {
    let joiner = between
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '*' | '(' | ')'));
    joiner == "또는" || joiner == "/" || joiner == "|" || joiner.eq_ignore_ascii_case("or")
}

pub fn parse_mockup_verdict(response: &str) -> MockupVerdict {
    let markers: Vec<(usize, usize, bool)> = marker_pattern()
        .captures_iter(response)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let detected = matches!(caps[1].to_lowercase().as_str(), "yes" | "예" | "네");
            Some((whole.start(), whole.end(), detected))
        })
        .collect();

    let mut echoed = vec![false; markers.len()];
    for idx in 1..markers.len() {
        let (_, prev_end, _) = markers[idx - 1];
        let (start, _, _) = markers[idx];
        if is_alternative(&response[prev_end..start]) {
            echoed[idx - 1] = true;
            echoed[idx] = true;
        }
    }

    let answer = markers
        .iter()
        .zip(&echoed)
        .filter(|(_, echoed)| !**echoed)
        .map(|((_, _, detected), _)| *detected)
        .last();

    match answer {
        Some(true) => MockupVerdict::Detected,
        Some(false) => MockupVerdict::Clear,
        None => MockupVerdict::Indeterminate("model response has no mockup marker".into()),
    }
}
