use crate::{assets::source::AnimationMode, foundation::core::Speed};

/// Subject prefix used when the caller does not supply one.
pub const DEFAULT_SUBJECT: &str = "nodemonke";

/// `<subject>_<id>_<mode>_<speed>x.<ext>`, with speed printed to one decimal.
pub fn output_file_name(
    subject: &str,
    id: u32,
    mode: AnimationMode,
    speed: Speed,
    ext: &str,
) -> String {
    let ext = ext.trim_start_matches('.');
    format!("{subject}_{id}_{}_{speed}x.{ext}", mode.as_str())
}
