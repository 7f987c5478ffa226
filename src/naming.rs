//! Filename parsing for the `NNN-name` convention.
//!
//! Pages and photos share one naming pattern: an optional numeric prefix
//! (`NNN-`) followed by a name. The number orders entries; a missing number
//! keeps a page out of the derived navigation.
//!
//! Dashes in the name become spaces for display:
//! - `010-about` → "about" (nav label)
//! - `020-side-projects` → "side projects"
//! - `001-Golden-Gate.jpg` → "Golden Gate" (photo alt text)

/// Result of parsing a name like `020-side-projects`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present.
    pub number: Option<u32>,
    /// Name part after `NNN-`, dashes preserved. For unnumbered entries this
    /// is the full input.
    pub name: String,
    /// Name with dashes converted to spaces.
    pub display_title: String,
}

/// Parse an entry name following the `NNN-name` convention.
///
/// - `"020-side-projects"` → number=Some(20), name="side-projects"
/// - `"001"` → number=Some(1), name=""
/// - `"thank-you"` → number=None, name="thank-you"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            name: rest.to_string(),
            display_title: rest.replace('-', " "),
        };
    }
    if let Ok(num) = name.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: name.to_string(),
        display_title: name.replace('-', " "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_page() {
        let p = parse_entry_name("010-about");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.name, "about");
        assert_eq!(p.display_title, "about");
    }

    #[test]
    fn numbered_multi_word() {
        let p = parse_entry_name("020-side-projects");
        assert_eq!(p.number, Some(20));
        assert_eq!(p.name, "side-projects");
        assert_eq!(p.display_title, "side projects");
    }

    #[test]
    fn number_only() {
        let p = parse_entry_name("001");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
        assert_eq!(p.display_title, "");
    }

    #[test]
    fn number_with_trailing_dash() {
        let p = parse_entry_name("001-");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
    }

    #[test]
    fn unnumbered_with_dashes() {
        let p = parse_entry_name("thank-you");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "thank-you");
        assert_eq!(p.display_title, "thank you");
    }

    #[test]
    fn word_before_dash_is_not_a_number() {
        let p = parse_entry_name("v2-notes");
        assert_eq!(p.number, None);
        assert_eq!(p.display_title, "v2 notes");
    }

    #[test]
    fn zero_prefix() {
        let p = parse_entry_name("000-First");
        assert_eq!(p.number, Some(0));
        assert_eq!(p.display_title, "First");
    }
}
