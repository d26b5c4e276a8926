//! Line-driven frontend helpers.
//!
//! Each input line is a list of whitespace separated tokens. A token that
//! names a key (`space`, `BackSpace`, `Left`, ...) or carries a modifier
//! prefix (`C-grave`, `S-a`, `A-x`) is one key press; any other token is
//! typed character by character, so `ni'hao 1 space` is eight keys.

use zime_core::{keysym, preedit_highlight, ModifierMask, PreeditStyle, RecordingFrontend};

/// Parse one token into key presses.
pub fn parse_token(token: &str) -> Option<Vec<(u32, ModifierMask)>> {
    let mut mask = ModifierMask::empty();
    let mut rest = token;
    const PREFIXES: [(&str, ModifierMask); 3] = [
        ("C-", ModifierMask::CONTROL),
        ("S-", ModifierMask::SHIFT),
        ("A-", ModifierMask::ALT),
    ];
    while let Some((flag, tail)) = PREFIXES
        .iter()
        .find_map(|(prefix, flag)| rest.strip_prefix(prefix).map(|tail| (*flag, tail)))
        .filter(|(_, tail)| !tail.is_empty())
    {
        mask |= flag;
        rest = tail;
    }

    if !mask.is_empty() {
        return keysym::from_name(rest).map(|code| vec![(code, mask)]);
    }
    if let Some(code) = keysym::from_name(rest) {
        return Some(vec![(code, mask)]);
    }
    Some(
        rest.chars()
            .map(|ch| (keysym::from_char(ch), ModifierMask::empty()))
            .collect(),
    )
}

/// Parse a whole line; unknown modified keys are reported by name.
pub fn parse_line(line: &str) -> Result<Vec<(u32, ModifierMask)>, String> {
    let mut keys = Vec::new();
    for token in line.split_whitespace() {
        match parse_token(token) {
            Some(mut parsed) => keys.append(&mut parsed),
            None => return Err(format!("unknown key: {token}")),
        }
    }
    Ok(keys)
}

/// Human-readable view of the frontend state. The cursor segment of the
/// preedit is wrapped in `[...]`; candidates of the current page are
/// numbered.
pub fn render(fe: &RecordingFrontend) -> String {
    let mut preedit = String::new();
    let chars: Vec<char> = fe.preedit_text.chars().collect();
    for run in preedit_highlight(&fe.preedit_text, fe.preedit_start, fe.preedit_end) {
        let text: String = chars[run.chars.clone()].iter().collect();
        match run.style {
            PreeditStyle::Cursor if !text.is_empty() => {
                preedit.push('[');
                preedit.push_str(&text);
                preedit.push(']');
            }
            _ => preedit.push_str(&text),
        }
    }

    let mut out = format!("preedit: {preedit}\naux: {}\n", fe.aux_text);
    if fe.candidates.is_some() {
        let table = &fe.table;
        let page: Vec<String> = table
            .current_page_labels()
            .iter()
            .enumerate()
            .map(|(i, label)| format!("{}.{label}", i + 1))
            .collect();
        out.push_str(&format!(
            "candidates ({}/{}): {}\n",
            table.current_page() + 1,
            table.num_pages().max(1),
            page.join(" ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use zime_core::Frontend;

    #[test]
    fn words_expand_to_characters() {
        let keys = parse_line("ni'hao 1 space").unwrap();
        assert_eq!(keys.len(), 8);
        assert_eq!(keys[2], (keysym::APOSTROPHE, ModifierMask::empty()));
        assert_eq!(keys[7], (keysym::SPACE, ModifierMask::empty()));
    }

    #[test]
    fn modifier_prefixes_stack() {
        assert_eq!(
            parse_token("C-grave"),
            Some(vec![(keysym::GRAVE, ModifierMask::CONTROL)])
        );
        assert_eq!(
            parse_token("C-S-Left"),
            Some(vec![(keysym::LEFT, ModifierMask::CONTROL | ModifierMask::SHIFT)])
        );
        assert_eq!(parse_token("C-NoSuchKey"), None);
        assert!(parse_line("C-bogus").is_err());
        // a lone "C-" is just two characters
        assert_eq!(parse_token("C-").map(|k| k.len()), Some(2));
    }

    #[test]
    fn render_marks_cursor_segment_and_page() {
        let mut fe = RecordingFrontend::with_page_size(2);
        fe.update_preedit("你好ma", 2, 4);
        fe.update_aux_string("ma");
        let labels: Vec<String> = ["嗎", "媽", "麻"].iter().map(|s| s.to_string()).collect();
        fe.update_candidates(Some(&labels));
        fe.page_down();

        assert_eq!(
            render(&fe),
            "preedit: 你好[ma]\naux: ma\ncandidates (2/2): 1.麻\n"
        );
    }
}
