/// A single vocabulary line: the headword and the senses listed for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub word: String,
    pub senses: Vec<String>,
}

impl Entry {
    /// Render back to the `word = sense1, sense2` line format.
    pub fn to_line(&self) -> String {
        format!("{} = {}", self.word, self.senses.join(", "))
    }
}

/// Parse `word = sense1, sense2; sense3` lines.
///
/// Best effort: blank lines, lines without `=`, and lines whose word or
/// senses come out empty are skipped. Never fails.
pub fn parse_vocab(text: &str) -> Vec<Entry> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(raw: &str) -> Option<Entry> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = line.split_once('=')?;
    let word = word.trim();
    if word.is_empty() {
        return None;
    }

    let senses: Vec<String> = rest
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if senses.is_empty() {
        return None;
    }

    Some(Entry {
        word: word.to_string(),
        senses,
    })
}
