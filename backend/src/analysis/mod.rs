pub mod confidence;
pub mod normalize;

pub(crate) fn label_contains(label: &str, needle: &str) -> bool {
    label.to_lowercase().contains(needle)
}
