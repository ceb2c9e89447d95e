use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} {pos}/{len} {wide_bar:.cyan/blue} {elapsed_precise} {msg}";

/// Progress bar for a loop over `len` files. Hidden when `visible` is false,
/// which is what tests and `--quiet` runs use.
pub fn file_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        bar.set_style(style);
    }
    bar
}
