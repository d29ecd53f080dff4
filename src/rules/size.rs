use crate::asset::Asset;
use crate::catalog::CategorySpec;
use crate::report::StageOutcome;

/// File-size limit for the matched category. The limit itself is allowed.
pub fn check_size(asset: &Asset, spec: Option<&CategorySpec>) -> StageOutcome {
    let Some(spec) = spec else {
        return StageOutcome::error(format!(
            "Non-standard size {}x{}: no guideline category matches, so the file-size limit cannot be checked",
            asset.width(),
            asset.height()
        ));
    };

    let kb = asset.size_kb();
    if kb <= spec.size_limit_kb {
        StageOutcome::pass(format!(
            "File size {kb:.1}KB within the {}KB limit",
            spec.size_limit_kb
        ))
    } else {
        StageOutcome::error(format!(
            "File size {kb:.1}KB exceeds the {}KB limit for {}",
            spec.size_limit_kb, spec.name
        ))
    }
}
