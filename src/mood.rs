const POSITIVE: &[&str] = &[
    "good", "great", "happy", "excellent", "wonderful", "amazing", "خوش", "اچھا", "بہترین",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "sad", "angry", "برا", "غمگین", "ناراض",
];

pub const BASELINE: u8 = 5;

/// Mood estimate on a 1..=10 scale. Each whitespace token moves the score half
/// a point up when it contains a positive keyword and half a point down when
/// it contains a negative one; a token can do both.
pub fn score(text: &str) -> u8 {
    // Tracked in half points so rounding is exact.
    let mut halves = i64::from(BASELINE) * 2;

    for token in text.to_lowercase().split_whitespace() {
        if POSITIVE.iter().any(|word| token.contains(word)) {
            halves += 1;
        }
        if NEGATIVE.iter().any(|word| token.contains(word)) {
            halves -= 1;
        }
    }

    // Halves round up.
    let rounded = (halves + 1).div_euclid(2);
    rounded.clamp(1, 10) as u8
}
