//! Arabic script detection.

/// Share of non-whitespace code points that must be Arabic, as a ratio
/// (3/10) so the comparison stays exact.
const THRESHOLD_NUM: usize = 3;
const THRESHOLD_DEN: usize = 10;

/// Arabic, Arabic Supplement and Arabic Extended-A blocks.
fn is_arabic(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
}

/// `true` iff more than 30% of the non-whitespace code points in `text`
/// are Arabic script. Empty or all-whitespace input is not Arabic.
pub fn detect_arabic(text: &str) -> bool {
    let (arabic, total) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(a, t), c| (a + is_arabic(c) as usize, t + 1));

    if total == 0 {
        return false;
    }
    arabic * THRESHOLD_DEN > total * THRESHOLD_NUM
}
