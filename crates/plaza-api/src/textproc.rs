//! Mention/hashtag processing for chat messages.
//!
//! Tokenization is a pure classification pass; rendering turns tokens into
//! markup and escapes all user-supplied text on the way out. Message content
//! is processed once, when the message is appended.

/// One whitespace-delimited word, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Plain(String),
    /// `@word`, marker stripped. Whether it links anywhere is decided at
    /// render time against the user directory.
    Mention(String),
    /// `#word`, kept verbatim in `raw`. `poll` is the part after the first
    /// `_` when the prefix is `#agree` or `#disagree` (may be empty).
    Hashtag { raw: String, poll: Option<String> },
}

/// Split on any whitespace and classify each word. Empty words never occur;
/// original inter-word spacing is not preserved.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .map(|word| {
            if let Some(name) = word.strip_prefix('@') {
                Token::Mention(name.to_string())
            } else if word.starts_with('#') {
                let poll = word.split_once('_').and_then(|(prefix, suffix)| {
                    (prefix == "#agree" || prefix == "#disagree")
                        .then(|| suffix.to_string())
                });
                Token::Hashtag {
                    raw: word.to_string(),
                    poll,
                }
            } else {
                Token::Plain(word.to_string())
            }
        })
        .collect()
}

/// Render tokens back into a single-space-joined string. Mentions of known
/// users become profile links; poll hashtags link to the polls page; other
/// hashtags get a styled span. Everything user-supplied is escaped.
pub fn render<F>(tokens: &[Token], is_user: F) -> String
where
    F: Fn(&str) -> bool,
{
    tokens
        .iter()
        .map(|token| match token {
            Token::Plain(word) => html_escape(word),
            Token::Mention(name) => {
                if is_user(name) {
                    format!(
                        "<a href=\"/user/{0}\" class=\"mention\">@{0}</a>",
                        html_escape(name)
                    )
                } else {
                    // Unknown name: the raw token, @ included.
                    html_escape(&format!("@{name}"))
                }
            }
            Token::Hashtag { raw, poll } => {
                if poll.is_some() {
                    format!(
                        "<a href=\"/polls\" class=\"hashtag\">{}</a>",
                        html_escape(raw)
                    )
                } else {
                    format!("<span class=\"hashtag\">{}</span>", html_escape(raw))
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenize and render in one go.
pub fn process<F>(text: &str, is_user: F) -> String
where
    F: Fn(&str) -> bool,
{
    render(&tokenize(text), is_user)
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(name: &str) -> bool {
        name == "asad" || name == "daniello"
    }

    #[test]
    fn classifies_mentions_hashtags_and_plain_words() {
        let tokens = tokenize("@asad hello #agree_climate");
        assert_eq!(
            tokens,
            vec![
                Token::Mention("asad".into()),
                Token::Plain("hello".into()),
                Token::Hashtag {
                    raw: "#agree_climate".into(),
                    poll: Some("climate".into()),
                },
            ]
        );
    }

    #[test]
    fn known_mention_becomes_profile_link() {
        let out = process("@asad hello #agree_climate", known);
        assert_eq!(
            out,
            "<a href=\"/user/asad\" class=\"mention\">@asad</a> hello \
             <a href=\"/polls\" class=\"hashtag\">#agree_climate</a>"
        );
    }

    #[test]
    fn unknown_mention_is_left_verbatim() {
        assert_eq!(process("@ghost text", known), "@ghost text");
    }

    #[test]
    fn plain_hashtag_gets_a_span() {
        assert_eq!(
            process("#welcome", known),
            "<span class=\"hashtag\">#welcome</span>"
        );
        // `#agreement` has no underscore, so it is not a poll link.
        assert_eq!(
            process("#agreement", known),
            "<span class=\"hashtag\">#agreement</span>"
        );
    }

    #[test]
    fn poll_prefix_requires_exact_match_before_first_underscore() {
        // Underscore present with an empty suffix still counts as a split.
        assert!(matches!(
            &tokenize("#agree_")[0],
            Token::Hashtag { poll: Some(s), .. } if s.is_empty()
        ));
        assert!(matches!(
            &tokenize("#disagree_tax_reform")[0],
            Token::Hashtag { poll: Some(s), .. } if s == "tax_reform"
        ));
        // Wrong prefix: styled span, not a poll link.
        assert!(matches!(
            &tokenize("#maybe_later")[0],
            Token::Hashtag { poll: None, .. }
        ));
    }

    #[test]
    fn spacing_collapses_to_single_spaces() {
        assert_eq!(process("a   b\tc\n d", known), "a b c d");
    }

    #[test]
    fn user_markup_is_escaped() {
        assert_eq!(
            process("<script>alert(1)</script>", known),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
        assert_eq!(
            process("@<b>hi</b>", known),
            "@&lt;b&gt;hi&lt;/b&gt;"
        );
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(process("", known), "");
        assert_eq!(process("   ", known), "");
    }
}
