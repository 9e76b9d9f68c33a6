//! Arabic contextual shaping and right-to-left visual ordering.
//!
//! PDF text is drawn left to right glyph by glyph, so a right-to-left line has
//! to be shaped into presentation forms and reordered before it is encoded.
//! Letters are mapped to Arabic Presentation Forms-B (and the Persian letters
//! in Forms-A), runs of Latin letters and digits keep their own order, and
//! neutrals between two left-to-right runs stay with them.

use super::text::is_rtl_char;

/// One drawn character with the logical text it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shaped {
    pub ch: char,
    pub source: String,
}

impl Shaped {
    fn plain(ch: char) -> Self {
        Self {
            ch,
            source: ch.to_string(),
        }
    }
}

const LAM: char = '\u{0644}';

/// (letter, isolated, final, initial, medial). Zero marks a form the letter
/// does not have: right-joining letters have no initial or medial form, and
/// hamza joins on neither side.
#[rustfmt::skip]
const FORMS: &[(u32, u32, u32, u32, u32)] = &[
    (0x0621, 0xFE80, 0,      0,      0),
    (0x0622, 0xFE81, 0xFE82, 0,      0),
    (0x0623, 0xFE83, 0xFE84, 0,      0),
    (0x0624, 0xFE85, 0xFE86, 0,      0),
    (0x0625, 0xFE87, 0xFE88, 0,      0),
    (0x0626, 0xFE89, 0xFE8A, 0xFE8B, 0xFE8C),
    (0x0627, 0xFE8D, 0xFE8E, 0,      0),
    (0x0628, 0xFE8F, 0xFE90, 0xFE91, 0xFE92),
    (0x0629, 0xFE93, 0xFE94, 0,      0),
    (0x062A, 0xFE95, 0xFE96, 0xFE97, 0xFE98),
    (0x062B, 0xFE99, 0xFE9A, 0xFE9B, 0xFE9C),
    (0x062C, 0xFE9D, 0xFE9E, 0xFE9F, 0xFEA0),
    (0x062D, 0xFEA1, 0xFEA2, 0xFEA3, 0xFEA4),
    (0x062E, 0xFEA5, 0xFEA6, 0xFEA7, 0xFEA8),
    (0x062F, 0xFEA9, 0xFEAA, 0,      0),
    (0x0630, 0xFEAB, 0xFEAC, 0,      0),
    (0x0631, 0xFEAD, 0xFEAE, 0,      0),
    (0x0632, 0xFEAF, 0xFEB0, 0,      0),
    (0x0633, 0xFEB1, 0xFEB2, 0xFEB3, 0xFEB4),
    (0x0634, 0xFEB5, 0xFEB6, 0xFEB7, 0xFEB8),
    (0x0635, 0xFEB9, 0xFEBA, 0xFEBB, 0xFEBC),
    (0x0636, 0xFEBD, 0xFEBE, 0xFEBF, 0xFEC0),
    (0x0637, 0xFEC1, 0xFEC2, 0xFEC3, 0xFEC4),
    (0x0638, 0xFEC5, 0xFEC6, 0xFEC7, 0xFEC8),
    (0x0639, 0xFEC9, 0xFECA, 0xFECB, 0xFECC),
    (0x063A, 0xFECD, 0xFECE, 0xFECF, 0xFED0),
    (0x0640, 0x0640, 0x0640, 0x0640, 0x0640),
    (0x0641, 0xFED1, 0xFED2, 0xFED3, 0xFED4),
    (0x0642, 0xFED5, 0xFED6, 0xFED7, 0xFED8),
    (0x0643, 0xFED9, 0xFEDA, 0xFEDB, 0xFEDC),
    (0x0644, 0xFEDD, 0xFEDE, 0xFEDF, 0xFEE0),
    (0x0645, 0xFEE1, 0xFEE2, 0xFEE3, 0xFEE4),
    (0x0646, 0xFEE5, 0xFEE6, 0xFEE7, 0xFEE8),
    (0x0647, 0xFEE9, 0xFEEA, 0xFEEB, 0xFEEC),
    (0x0648, 0xFEED, 0xFEEE, 0,      0),
    (0x0649, 0xFEEF, 0xFEF0, 0,      0),
    (0x064A, 0xFEF1, 0xFEF2, 0xFEF3, 0xFEF4),
    (0x067E, 0xFB56, 0xFB57, 0xFB58, 0xFB59),
    (0x0686, 0xFB7A, 0xFB7B, 0xFB7C, 0xFB7D),
    (0x0698, 0xFB8A, 0xFB8B, 0,      0),
    (0x06A9, 0xFB8E, 0xFB8F, 0xFB90, 0xFB91),
    (0x06AF, 0xFB92, 0xFB93, 0xFB94, 0xFB95),
    (0x06CC, 0xFBFC, 0xFBFD, 0xFBFE, 0xFBFF),
];

fn forms(c: char) -> Option<&'static (u32, u32, u32, u32, u32)> {
    FORMS
        .binary_search_by_key(&(c as u32), |f| f.0)
        .ok()
        .map(|i| &FORMS[i])
}

/// Lam followed by an alef variant becomes one ligature: (isolated, final).
fn lam_alef(alef: char) -> Option<(u32, u32)> {
    match alef {
        '\u{0622}' => Some((0xFEF5, 0xFEF6)),
        '\u{0623}' => Some((0xFEF7, 0xFEF8)),
        '\u{0625}' => Some((0xFEF9, 0xFEFA)),
        '\u{0627}' => Some((0xFEFB, 0xFEFC)),
        _ => None,
    }
}

/// Harakat and Quranic marks; they sit on a letter without breaking its joins.
fn is_transparent(c: char) -> bool {
    matches!(
        c as u32,
        0x0610..=0x061A | 0x064B..=0x065F | 0x0670 | 0x06D6..=0x06DC | 0x06DF..=0x06E4 | 0x06E7
            | 0x06E8 | 0x06EA..=0x06ED
    )
}

fn joins_to_next(c: char) -> bool {
    forms(c).is_some_and(|f| f.3 != 0)
}

fn joins_to_prev(c: char) -> bool {
    forms(c).is_some_and(|f| f.2 != 0)
}

fn to_char(code: u32, fallback: char) -> char {
    char::from_u32(code).unwrap_or(fallback)
}

/// Replaces Arabic letters with the presentation form their neighbours call
/// for. Output stays in logical order.
pub fn shape(text: &str) -> Vec<Shaped> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let Some(&(_, isolated, final_, initial, medial)) = forms(c) else {
            out.push(Shaped::plain(c));
            i += 1;
            continue;
        };

        let prev = chars[..i].iter().rev().copied().find(|p| !is_transparent(*p));
        let next_idx = (i + 1..chars.len()).find(|&j| !is_transparent(chars[j]));
        let joined_before = final_ != 0 && prev.is_some_and(joins_to_next);

        if c == LAM {
            if let Some((j, (lig_isolated, lig_final))) =
                next_idx.and_then(|j| lam_alef(chars[j]).map(|lig| (j, lig)))
            {
                let code = if joined_before { lig_final } else { lig_isolated };
                out.push(Shaped {
                    ch: to_char(code, c),
                    source: chars[i..=j].iter().collect(),
                });
                i = j + 1;
                continue;
            }
        }

        let joins_after =
            joins_to_next(c) && next_idx.is_some_and(|j| joins_to_prev(chars[j]));
        let code = match (joined_before, joins_after) {
            (true, true) => medial,
            (true, false) => final_,
            (false, true) => initial,
            (false, false) => isolated,
        };
        out.push(Shaped {
            ch: to_char(code, c),
            source: c.to_string(),
        });
        i += 1;
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ltr,
    Rtl,
    Neutral,
}

fn direction(c: char) -> Direction {
    // Arabic-Indic digits read left to right like Latin ones
    if matches!(c as u32, 0x0660..=0x0669 | 0x06F0..=0x06F9) {
        Direction::Ltr
    } else if is_rtl_char(c) {
        Direction::Rtl
    } else if c.is_alphanumeric() {
        Direction::Ltr
    } else {
        Direction::Neutral
    }
}

fn mirror(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        c => c,
    }
}

/// Reorders one right-to-left line into drawing order.
pub fn visual_order(shaped: Vec<Shaped>) -> Vec<Shaped> {
    let directions: Vec<Direction> = shaped.iter().map(|s| direction(s.ch)).collect();
    let is_ltr: Vec<bool> = (0..directions.len())
        .map(|i| match directions[i] {
            Direction::Ltr => true,
            Direction::Rtl => false,
            Direction::Neutral => {
                let before = directions[..i].iter().rev().find(|d| **d != Direction::Neutral);
                let after = directions[i + 1..].iter().find(|d| **d != Direction::Neutral);
                before == Some(&Direction::Ltr) && after == Some(&Direction::Ltr)
            }
        })
        .collect();

    let mut runs: Vec<(bool, Vec<Shaped>)> = Vec::new();
    for (item, ltr) in shaped.into_iter().zip(is_ltr) {
        match runs.last_mut() {
            Some((run_ltr, run)) if *run_ltr == ltr => run.push(item),
            _ => runs.push((ltr, vec![item])),
        }
    }

    let mut out = Vec::new();
    for (ltr, mut run) in runs.into_iter().rev() {
        if !ltr {
            run.reverse();
            for item in &mut run {
                item.ch = mirror(item.ch);
            }
        }
        out.extend(run);
    }
    out
}

/// Shapes and reorders one line for drawing.
pub fn to_visual(line: &str) -> Vec<Shaped> {
    visual_order(shape(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(shaped: &[Shaped]) -> Vec<u32> {
        shaped.iter().map(|s| s.ch as u32).collect()
    }

    fn text(shaped: &[Shaped]) -> String {
        shaped.iter().map(|s| s.ch).collect()
    }

    #[test]
    fn test_forms_table_is_sorted() {
        assert!(FORMS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_connected_word_uses_initial_medial_final() {
        // ع ل ي
        let shaped = shape("علي");
        assert_eq!(chars(&shaped), vec![0xFECB, 0xFEE0, 0xFEF2]);
        assert_eq!(shaped[0].source, "ع");
    }

    #[test]
    fn test_right_joining_letter_breaks_the_chain() {
        // د does not join forward, so the following ا stands alone
        let shaped = shape("داد");
        assert_eq!(chars(&shaped), vec![0xFEA9, 0xFE8D, 0xFEA9]);
    }

    #[test]
    fn test_single_letter_is_isolated() {
        assert_eq!(chars(&shape("ب")), vec![0xFE8F]);
    }

    #[test]
    fn test_lam_alef_ligature() {
        let shaped = shape("لا");
        assert_eq!(chars(&shaped), vec![0xFEFB]);
        assert_eq!(shaped[0].source, "لا");

        // joined to a preceding letter it takes the final form
        let shaped = shape("سلام");
        assert_eq!(chars(&shaped), vec![0xFEB3, 0xFEFC, 0xFEE1]);
    }

    #[test]
    fn test_harakat_do_not_break_joins() {
        // بَب: the fatha sits between two joined letters
        let shaped = shape("ب\u{064E}ب");
        assert_eq!(chars(&shaped), vec![0xFE91, 0x064E, 0xFE90]);
    }

    #[test]
    fn test_latin_passes_through() {
        assert_eq!(text(&shape("React 18")), "React 18");
    }

    #[test]
    fn test_rtl_run_is_reversed() {
        let visual = to_visual("علي");
        assert_eq!(chars(&visual), vec![0xFEF2, 0xFEE0, 0xFECB]);
    }

    #[test]
    fn test_embedded_latin_and_digits_keep_their_order() {
        let visual = text(&to_visual("خبرة React 2024"));
        assert!(visual.starts_with("React 2024"), "got {visual}");
    }

    #[test]
    fn test_brackets_are_mirrored_inside_rtl_runs() {
        let visual = to_visual("(ب)");
        assert_eq!(visual.first().map(|s| s.ch), Some('('));
        assert_eq!(visual.last().map(|s| s.ch), Some(')'));
    }

    #[test]
    fn test_sources_cover_the_whole_line() {
        let line = "مطور Rust لا";
        let mut sources: Vec<char> = to_visual(line)
            .into_iter()
            .flat_map(|s| s.source.chars().collect::<Vec<_>>())
            .collect();
        let mut expected: Vec<char> = line.chars().collect();
        sources.sort_unstable();
        expected.sort_unstable();
        assert_eq!(sources, expected);
    }
}
