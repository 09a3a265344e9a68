use once_cell::sync::Lazy;
use regex::Regex;

const MASK: &str = "****";

// Multi-language denylist inherited from the platform's moderation rules.
const CENSORED_WORDS: &[&str] = &[
    "fuck",
    "shit",
    "damn",
    "bitch",
    "asshole",
    "bastard",
    "dick",
    "pussy",
    "cunt",
    "slut",
    "whore",
    "fag",
    "nigger",
    "nigga",
    "cock",
    "motherfucker",
    "bullshit",
    "crap",
    "hell",
    "suck",
    "twat",
    "jerk",
    "wanker",
    "prick",
    "arse",
    "bollocks",
    "bugger",
    "bloody",
    "jala",
    "jalab",
    "jalap",
    "dalbayop",
    "dalbayob",
    "yeban",
    "yiban",
    "yibansan",
    "yibanakansan",
    "dabba",
    "cort",
    "chort",
    "chortsan",
    "chortla",
    "blya",
    "zaebal",
    "zaybal",
    "pidr",
    "pidor",
    "pidoraz",
    "pidaraz",
    "pidaras",
    "pizdes",
    "pizdesu",
    "pizdeku",
    "yeblan",
    "uyeban",
    "qoto",
    "qotoq",
    "tasho",
    "tashoq",
    "bich",
    "bic",
    "kot",
    "ko't",
    "suka",
    "sucka",
    "suchka",
    "shluxa",
    "shlyuxa",
    "wluxa",
    "wlyuxa",
    "oneni ami",
    "qotagim",
    "qo'tagim",
    "qo'tag'im",
];

static CENSOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives = CENSORED_WORDS
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    // Whole words only: substrings inside larger words stay untouched
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("censor pattern must compile")
});

/// Replace every denylisted word with the mask. Pure text transform, applied
/// once when user input crosses the submission boundary.
pub fn censor(text: &str) -> String {
    CENSOR_PATTERN.replace_all(text, MASK).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_censor_masks_whole_words() {
        assert_eq!(censor("this is fuck awesome"), "this is **** awesome");
    }

    #[test]
    fn test_censor_is_case_insensitive() {
        assert_eq!(censor("FUCK this"), "**** this");
        assert_eq!(censor("Suka blya"), "**** ****");
    }

    #[test]
    fn test_censor_ignores_substrings() {
        // "bic" and "hell" are denylisted; "classic" and "hello" are not
        assert_eq!(censor("classic hello"), "classic hello");
        assert_eq!(censor("shellfish"), "shellfish");
    }

    #[test]
    fn test_censor_handles_multiple_hits() {
        assert_eq!(censor("shit happens, shit ends"), "**** happens, **** ends");
    }

    #[test]
    fn test_censor_leaves_clean_text_alone() {
        let text = "what a beautiful sunrise over the valley";
        assert_eq!(censor(text), text);
    }
}
