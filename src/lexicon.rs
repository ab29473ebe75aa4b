use once_cell::sync::Lazy;

use crate::models::{neutral, EmotionLabel, Language};

pub const LEXICON_VERSION: &str = "2026.1";

// The English lists are the only source of English keywords. Urdu keywords are
// filed under the English label they translate to.
const ENGLISH: &[(EmotionLabel, &[&str])] = &[
    (
        EmotionLabel::Happy,
        &[
            "happy", "joy", "joyful", "excited", "cheerful", "delighted", "elated", "thrilled",
            "pleased", "glad", "amazing", "wonderful", "fantastic", "great", "awesome",
            "brilliant", "excellent", "perfect", "love", "loving",
        ],
    ),
    (
        EmotionLabel::Sad,
        &[
            "sad", "depressed", "down", "blue", "miserable", "unhappy", "gloomy", "melancholy",
            "dejected", "heartbroken", "crying", "tears", "weeping", "sorrow", "grief",
            "mourning", "lonely", "empty", "hopeless",
        ],
    ),
    (
        EmotionLabel::Angry,
        &[
            "angry", "mad", "furious", "irritated", "annoyed", "frustrated", "rage", "outraged",
            "livid", "pissed", "upset", "aggravated", "hostile", "bitter", "resentful", "hate",
            "disgusted", "revolted",
        ],
    ),
    (
        EmotionLabel::Anxious,
        &[
            "anxious", "worried", "nervous", "stressed", "tense", "uneasy", "restless",
            "agitated", "panicked", "fearful", "scared", "afraid", "terrified", "overwhelmed",
            "pressured", "troubled", "concerned", "apprehensive",
        ],
    ),
    (
        EmotionLabel::Grateful,
        &[
            "grateful", "thankful", "blessed", "appreciative", "fortunate", "lucky", "indebted",
            "obliged", "acknowledge", "recognition", "thanks", "appreciate",
        ],
    ),
    (
        EmotionLabel::Peaceful,
        &[
            "peaceful", "calm", "serene", "tranquil", "relaxed", "composed", "quiet", "still",
            "restful", "zen", "meditative", "balanced", "centered", "harmony",
        ],
    ),
    (
        EmotionLabel::Confused,
        &[
            "confused", "puzzled", "perplexed", "bewildered", "lost", "uncertain", "unclear",
            "unsure", "doubtful", "questioning", "wondering", "mixed up",
        ],
    ),
    (
        EmotionLabel::Hopeful,
        &[
            "hopeful", "optimistic", "positive", "confident", "encouraged", "inspired",
            "motivated", "determined", "ambitious", "looking forward", "bright future",
        ],
    ),
    (
        EmotionLabel::Frustrated,
        &[
            "frustrated", "stuck", "blocked", "hindered", "thwarted", "defeated", "discouraged",
            "fed up", "annoyed", "impatient", "restless",
        ],
    ),
    (
        EmotionLabel::Excited,
        &[
            "excited", "thrilled", "enthusiastic", "eager", "pumped", "energetic", "animated",
            "electrified", "stimulated", "anticipating", "can't wait",
        ],
    ),
    (
        EmotionLabel::Lonely,
        &[
            "lonely", "alone", "isolated", "solitary", "abandoned", "deserted", "friendless",
            "disconnected", "cut off", "by myself", "no one",
        ],
    ),
    (
        EmotionLabel::Content,
        &[
            "content", "satisfied", "fulfilled", "comfortable", "at ease", "pleased", "ok with",
            "fine", "good enough", "acceptable", "settled",
        ],
    ),
    (
        EmotionLabel::Overwhelmed,
        &[
            "overwhelmed", "swamped", "buried", "drowning", "too much", "overloaded",
            "stressed out", "can't cope", "breaking point", "burned out",
        ],
    ),
    (
        EmotionLabel::Proud,
        &[
            "proud", "accomplished", "achieved", "successful", "victorious", "triumphant",
            "satisfied", "fulfilled", "honored", "dignified",
        ],
    ),
    (
        EmotionLabel::Disappointed,
        &[
            "disappointed", "let down", "failed", "unsuccessful", "defeated", "discouraged",
            "disillusioned", "unsatisfied", "fallen short",
        ],
    ),
];

const URDU: &[(EmotionLabel, &[&str])] = &[
    (EmotionLabel::Happy, &["خوش", "خوشی", "مسرور", "شاد"]),
    (EmotionLabel::Sad, &["غمگین", "اداس", "دکھی", "رنجیدہ"]),
    (EmotionLabel::Angry, &["غصہ", "ناراض", "برہم", "کروڈھ"]),
    (EmotionLabel::Anxious, &["پریشان", "فکر", "تشویش", "بے چین"]),
    (EmotionLabel::Grateful, &["شکرگزار", "ممنون", "احسان مند"]),
    (EmotionLabel::Peaceful, &["پرسکون", "آرام", "سکون", "چین"]),
    (EmotionLabel::Confused, &["الجھن", "حیرت", "تذبذب"]),
    (EmotionLabel::Hopeful, &["امیدوار", "مثبت", "پر امید"]),
];

#[derive(Debug)]
pub struct LexiconEntry {
    pub emotion: EmotionLabel,
    pub keywords: Vec<(Language, Vec<String>)>,
}

impl LexiconEntry {
    fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .flat_map(|(_, words)| words.iter().map(String::as_str))
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords().any(|keyword| lowered.contains(keyword))
    }
}

#[derive(Debug)]
pub struct Lexicon {
    pub version: &'static str,
    pub entries: Vec<LexiconEntry>,
}

impl Lexicon {
    fn build() -> Self {
        let entries = EmotionLabel::ALL
            .iter()
            .filter(|label| **label != EmotionLabel::Neutral)
            .map(|&emotion| {
                let keywords: Vec<(Language, Vec<String>)> =
                    [(Language::English, ENGLISH), (Language::Urdu, URDU)]
                    .into_iter()
                    .filter_map(|(language, table)| {
                        table
                            .iter()
                            .find(|(label, _)| *label == emotion)
                            .map(|(_, words)| {
                                let words = words.iter().map(|w| w.to_lowercase()).collect();
                                (language, words)
                            })
                    })
                    .collect();
                LexiconEntry { emotion, keywords }
            })
            .collect();

        Self {
            version: LEXICON_VERSION,
            entries,
        }
    }

    pub fn entry(&self, emotion: EmotionLabel) -> Option<&LexiconEntry> {
        self.entries.iter().find(|entry| entry.emotion == emotion)
    }

    pub fn keywords_for(&self, emotion: EmotionLabel, language: Language) -> &[String] {
        self.entry(emotion)
            .and_then(|entry| {
                entry
                    .keywords
                    .iter()
                    .find(|(lang, _)| *lang == language)
                    .map(|(_, words)| words.as_slice())
            })
            .unwrap_or(&[])
    }
}

static LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::build);

pub fn lexicon() -> &'static Lexicon {
    &LEXICON
}

/// Labels whose keywords occur anywhere in `text`, in declared category order.
/// Never empty: no match yields `[neutral]`.
pub fn detect(text: &str) -> Vec<EmotionLabel> {
    if text.trim().is_empty() {
        return neutral();
    }

    let lowered = text.to_lowercase();
    let detected: Vec<EmotionLabel> = lexicon()
        .entries
        .iter()
        .filter(|entry| entry.matches(&lowered))
        .map(|entry| entry.emotion)
        .collect();

    if detected.is_empty() {
        neutral()
    } else {
        detected
    }
}

/// Keyword density for one label, scaled into `0.0..=1.0`.
pub fn intensity(text: &str, emotion: EmotionLabel) -> f64 {
    let Some(entry) = lexicon().entry(emotion) else {
        return 0.0;
    };
    if text.trim().is_empty() {
        return 0.0;
    }

    let lowered = text.to_lowercase();
    let matches: usize = entry
        .keywords()
        .map(|keyword| lowered.matches(keyword).count())
        .sum();
    let words = text.split_whitespace().count().max(1);

    (matches as f64 / words as f64 * 10.0).min(1.0)
}

pub fn detect_language(text: &str) -> Language {
    let has_urdu = text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c));
    let has_english = text.chars().any(|c| c.is_ascii_alphabetic());

    match (has_urdu, has_english) {
        (true, true) => Language::Mixed,
        (true, false) => Language::Urdu,
        _ => Language::English,
    }
}

pub fn categories() -> Vec<EmotionLabel> {
    lexicon().entries.iter().map(|entry| entry.emotion).collect()
}

pub fn is_valid_emotion(name: &str) -> bool {
    EmotionLabel::parse(name).is_some_and(|label| lexicon().entry(label).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_text_is_neutral() {
        assert_eq!(detect(""), vec![EmotionLabel::Neutral]);
        assert_eq!(detect("   \n"), vec![EmotionLabel::Neutral]);
    }

    #[test]
    fn no_match_is_neutral() {
        assert_eq!(detect("The train leaves at nine"), vec![EmotionLabel::Neutral]);
    }

    #[test]
    fn happy_and_grateful_are_detected() {
        let labels = detect("I am feeling happy and grateful today");
        assert!(labels.contains(&EmotionLabel::Happy));
        assert!(labels.contains(&EmotionLabel::Grateful));
    }

    #[test]
    fn results_follow_category_order_not_text_order() {
        let labels = detect("So CONFUSED, and then happy again");
        assert_eq!(labels, vec![EmotionLabel::Happy, EmotionLabel::Confused]);
    }

    #[test]
    fn urdu_keywords_map_to_english_labels() {
        assert_eq!(detect("آج میں بہت خوش ہوں"), vec![EmotionLabel::Happy]);
        let labels = detect("I feel اداس and worried");
        assert_eq!(labels, vec![EmotionLabel::Sad, EmotionLabel::Anxious]);
    }

    #[test]
    fn shared_keywords_hit_every_owning_category() {
        let labels = detect("honestly just annoyed");
        assert_eq!(labels, vec![EmotionLabel::Angry, EmotionLabel::Frustrated]);
    }

    #[test]
    fn no_duplicate_labels() {
        let labels = detect("happy happy joy joy خوشی");
        assert_eq!(labels, vec![EmotionLabel::Happy]);
    }

    #[test]
    fn language_detection_by_script() {
        assert_eq!(detect_language("just a normal day"), Language::English);
        assert_eq!(detect_language("میں ٹھیک ہوں"), Language::Urdu);
        assert_eq!(detect_language("aaj mood خراب hai"), Language::Mixed);
        assert_eq!(detect_language(""), Language::English);
        assert_eq!(detect_language("123 !!"), Language::English);
    }

    #[test]
    fn lexicon_covers_every_label_but_neutral() {
        let cats = categories();
        assert_eq!(cats.len(), 15);
        assert_eq!(cats.first(), Some(&EmotionLabel::Happy));
        assert_eq!(cats.last(), Some(&EmotionLabel::Disappointed));
        assert!(!lexicon().keywords_for(EmotionLabel::Anxious, Language::Urdu).is_empty());
        assert!(lexicon().keywords_for(EmotionLabel::Proud, Language::Urdu).is_empty());
        assert_eq!(lexicon().version, LEXICON_VERSION);
    }

    #[test]
    fn validity_excludes_neutral() {
        assert!(is_valid_emotion("lonely"));
        assert!(!is_valid_emotion("neutral"));
        assert!(!is_valid_emotion("bored"));
    }

    #[test]
    fn intensity_scales_and_saturates() {
        assert_eq!(intensity("", EmotionLabel::Sad), 0.0);
        assert_eq!(intensity("sad", EmotionLabel::Sad), 1.0);
        assert_eq!(intensity("nothing to see here today friends", EmotionLabel::Sad), 0.0);
        let value = intensity(
            "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen calm",
            EmotionLabel::Peaceful,
        );
        assert!((value - 0.5).abs() < 1e-9);
        assert_eq!(intensity("anything", EmotionLabel::Neutral), 0.0);
    }
}
