//! YAML front matter, read just far enough to pull out note tags.
//!
//! Accepted shapes:
//!   tags: [work, "home/garden"]
//!   tags: work, errands
//!   tags:
//!     - work
//!     - "#home/garden"

use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    #[serde(alias = "tag", alias = "Tags")]
    tags: Option<TagList>,
}

/// A YAML list, or one comma/space separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagList {
    Many(Vec<YamlValue>),
    One(String),
}

/// Tags from a leading `---` block, and the number of lines the block spans
/// (0 when the note has no front matter).
///
/// A block that is not valid YAML still counts as front matter but yields no tags.
pub fn parse_front_matter(content: &str) -> (Vec<String>, usize) {
    let Some((yaml, lines)) = split_front_matter(content) else {
        return (Vec::new(), 0);
    };
    if yaml.trim().is_empty() {
        return (Vec::new(), lines);
    }

    let front: FrontMatter = match serde_yaml::from_str(&yaml) {
        Ok(front) => front,
        Err(err) => {
            debug!(%err, "front matter is not valid YAML");
            return (Vec::new(), lines);
        }
    };

    let mut out = Vec::new();
    match front.tags {
        Some(TagList::Many(items)) => {
            for item in items {
                match item {
                    YamlValue::String(s) => push_tag(&mut out, &s),
                    YamlValue::Number(n) => push_tag(&mut out, &n.to_string()),
                    _ => {}
                }
            }
        }
        Some(TagList::One(s)) => {
            for word in s.split(|c: char| c == ',' || c.is_whitespace()) {
                push_tag(&mut out, word);
            }
        }
        None => {}
    }
    (out, lines)
}

/// The YAML between the opening `---` and the closing `---` or `...`.
fn split_front_matter(content: &str) -> Option<(String, usize)> {
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return None;
    }

    let mut block = Vec::new();
    for line in lines {
        if matches!(line.trim_end(), "---" | "...") {
            let spanned = block.len() + 2;
            return Some((block.join("\n"), spanned));
        }
        block.push(line);
    }
    None
}

fn push_tag(out: &mut Vec<String>, raw: &str) {
    let tag = raw.trim().trim_start_matches('#').to_string();
    if !tag.is_empty() && !out.contains(&tag) {
        out.push(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_and_block_lists() {
        let inline = "---\ntitle: Plans\ntags: [work, \"home/garden\"]\n---\n- [ ] task\n";
        let (tags, lines) = parse_front_matter(inline);
        assert_eq!(tags, vec!["work", "home/garden"]);
        assert_eq!(lines, 4);

        let block = "---\ntags:\n  - Work\n  - '#errands'\nstatus: draft\n---\nbody";
        let (tags, _) = parse_front_matter(block);
        assert_eq!(tags, vec!["Work", "errands"]);
    }

    #[test]
    fn test_string_and_quoted_forms() {
        let (tags, _) = parse_front_matter("---\ntags: work, errands\n---\n");
        assert_eq!(tags, vec!["work", "errands"]);

        let (tags, _) = parse_front_matter("---\ntag: solo\n---\n");
        assert_eq!(tags, vec!["solo"]);

        // A comma inside a quoted item stays part of the tag.
        let (tags, _) = parse_front_matter("---\ntags: [\"a,b\", 2024]\n---\n");
        assert_eq!(tags, vec!["a,b", "2024"]);

        let anchored = "---\nbase: &t [x, y]\ntags: *t\n---\n";
        assert_eq!(parse_front_matter(anchored).0, vec!["x", "y"]);
    }

    #[test]
    fn test_missing_unclosed_or_invalid_front_matter() {
        assert_eq!(parse_front_matter("# Title\n- [ ] a"), (Vec::new(), 0));
        assert_eq!(parse_front_matter("---\ntags: [a]\nno end"), (Vec::new(), 0));
        assert_eq!(parse_front_matter("---\ntags: [unclosed\n---\nbody"), (Vec::new(), 3));
        assert_eq!(parse_front_matter("---\n---\nbody"), (Vec::new(), 2));
        assert_eq!(parse_front_matter("---\ntitle: x\n---\n"), (Vec::new(), 3));
    }
}
