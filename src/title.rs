use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Za-z][A-Za-z0-9]*$").expect("extension pattern is valid"));

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\W*(\d+(?:[.-]\d+)+)\W*").expect("version pattern is valid")
});

/// `S_invicta.xx.2.5.small.nucl.fa` becomes `S invicta xx 2.5 small nucl`.
pub fn title_from_filename(raw_name: &str) -> String {
    let name = Path::new(raw_name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| raw_name.to_string());

    let name = name.replace('"', "'");
    let name = EXTENSION.replace(&name, "").to_string();
    let name = name.replace('_', " ");
    let name = replace_periods(&name, |digit_before, digit_after| {
        !digit_before && !digit_after
    });
    let name = VERSION.replace_all(&name, " $1 ");
    // Only periods inside version numbers survive, so no `.ext` tail is left
    // for a second pass to strip.
    let name = replace_periods(&name, |digit_before, digit_after| {
        !(digit_before && digit_after)
    });
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn replace_periods<F>(name: &str, to_space: F) -> String
where
    F: Fn(bool, bool) -> bool,
{
    let chars: Vec<char> = name.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
            let digit_after = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if c == '.' && to_space(digit_before, digit_after) {
                ' '
            } else {
                c
            }
        })
        .collect()
}
