//! Genre Classifier
//!
//! Maps free-text signals (subject tags, title, description) to one label of
//! a small fixed taxonomy.
//!
//! # Algorithm
//! 1. Lower-case and concatenate subjects, title and description.
//! 2. Walk [`GENRE_RULES`] in order; the first rule with a keyword present
//!    (substring match) wins. Order matters: a book tagged both "crime" and
//!    "romance" is Crime.
//! 3. Fallbacks, evaluated over the non-generic subjects plus title and
//!    description: "fiction" → Literary Fiction, then generic non-fiction
//!    signal words → Non-Fiction.
//! 4. Otherwise the first non-generic subject, title-cased.
//! 5. Otherwise no genre.
//!
//! Pure and deterministic: no I/O, never returns an empty label.

use serde::{Serialize, Serializer};
use std::fmt;

/// Genre taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Crime,
    Comedy,
    Thriller,
    Fantasy,
    ScienceFiction,
    Horror,
    Mystery,
    Romance,
    YoungAdult,
    Poetry,
    Biography,
    History,
    Philosophy,
    SelfHelp,
    Business,
    Anthology,
    LiteraryFiction,
    NonFiction,
}

impl Genre {
    /// Display label, as stored in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Crime => "Crime",
            Genre::Comedy => "Comedy",
            Genre::Thriller => "Thriller",
            Genre::Fantasy => "Fantasy",
            Genre::ScienceFiction => "Science Fiction",
            Genre::Horror => "Horror",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::YoungAdult => "Young Adult",
            Genre::Poetry => "Poetry",
            Genre::Biography => "Biography",
            Genre::History => "History",
            Genre::Philosophy => "Philosophy",
            Genre::SelfHelp => "Self-Help",
            Genre::Business => "Business",
            Genre::Anthology => "Anthology",
            Genre::LiteraryFiction => "Literary Fiction",
            Genre::NonFiction => "Non-Fiction",
        }
    }

    /// Every label, rule order first, then the two fallbacks
    pub fn all() -> impl Iterator<Item = Genre> {
        GENRE_RULES
            .iter()
            .map(|rule| rule.genre)
            .chain([Genre::LiteraryFiction, Genre::NonFiction])
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output: a taxonomy label or a title-cased subject tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreLabel {
    Taxonomy(Genre),
    Subject(String),
}

impl GenreLabel {
    pub fn as_str(&self) -> &str {
        match self {
            GenreLabel::Taxonomy(genre) => genre.as_str(),
            GenreLabel::Subject(subject) => subject,
        }
    }
}

impl fmt::Display for GenreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GenreLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<GenreLabel> for String {
    fn from(label: GenreLabel) -> Self {
        match label {
            GenreLabel::Taxonomy(genre) => genre.as_str().to_string(),
            GenreLabel::Subject(subject) => subject,
        }
    }
}

/// One prioritized keyword rule
#[derive(Debug)]
pub struct GenreRule {
    pub genre: Genre,
    pub keywords: &'static [&'static str],
}

impl GenreRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

/// Prioritized rules; earlier rules win on ambiguous text
pub const GENRE_RULES: &[GenreRule] = &[
    GenreRule {
        genre: Genre::Crime,
        keywords: &["crime", "detective", "police", "noir", "murder"],
    },
    GenreRule {
        genre: Genre::Comedy,
        keywords: &["comedy", "humor", "humour", "satire", "comic novel", "funny"],
    },
    GenreRule {
        genre: Genre::Thriller,
        keywords: &["thriller", "suspense", "conspiracy"],
    },
    GenreRule {
        genre: Genre::Fantasy,
        keywords: &["fantasy", "magic", "dragon", "wizard", "mythical"],
    },
    GenreRule {
        genre: Genre::ScienceFiction,
        keywords: &[
            "science fiction",
            "sci-fi",
            "sci fi",
            "space",
            "dystopian",
            "post-apocalyptic",
            "cyberpunk",
        ],
    },
    GenreRule {
        genre: Genre::Horror,
        keywords: &["horror", "ghost", "haunted", "supernatural", "vampire"],
    },
    GenreRule {
        genre: Genre::Mystery,
        keywords: &["mystery", "whodunit", "detective story"],
    },
    GenreRule {
        genre: Genre::Romance,
        keywords: &["romance", "love story", "romantic"],
    },
    GenreRule {
        genre: Genre::YoungAdult,
        keywords: &["young adult", "ya", "teen fiction", "adolescent"],
    },
    GenreRule {
        genre: Genre::Poetry,
        keywords: &["poetry", "poem", "verse"],
    },
    GenreRule {
        genre: Genre::Biography,
        keywords: &["biography", "memoir", "autobiography"],
    },
    GenreRule {
        genre: Genre::History,
        keywords: &["history", "historical"],
    },
    GenreRule {
        genre: Genre::Philosophy,
        keywords: &["philosophy", "philosophical", "existentialism", "ethics", "metaphysics"],
    },
    GenreRule {
        genre: Genre::SelfHelp,
        keywords: &["self-help", "self help", "personal growth", "motivation"],
    },
    GenreRule {
        genre: Genre::Business,
        keywords: &["business", "management", "leadership", "entrepreneur", "economics"],
    },
    GenreRule {
        genre: Genre::Anthology,
        keywords: &["anthology", "anthologies", "short stories", "collected stories"],
    },
];

/// Signal words for the Non-Fiction fallback
const NON_FICTION_SIGNALS: &[&str] = &[
    "language",
    "culture",
    "society",
    "politics",
    "essays",
    "social life",
    "reportage",
];

/// Subjects too broad to be used as a genre on their own
const GENERIC_SUBJECTS: &[&str] = &[
    "fiction",
    "nonfiction",
    "literature",
    "juvenile fiction",
    "juvenile nonfiction",
];

fn is_generic(subject: &str) -> bool {
    GENERIC_SUBJECTS.contains(&subject)
}

/// Infer a genre from subjects, title and description
pub fn classify(
    subjects: &[String],
    title: Option<&str>,
    description: Option<&str>,
) -> Option<GenreLabel> {
    let lowered: Vec<String> = subjects.iter().map(|s| s.trim().to_lowercase()).collect();
    let title = title.unwrap_or_default().to_lowercase();
    let description = description.unwrap_or_default().to_lowercase();

    let text = lowered
        .iter()
        .map(String::as_str)
        .chain([title.as_str(), description.as_str()])
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(rule) = GENRE_RULES.iter().find(|rule| rule.matches(&text)) {
        return Some(GenreLabel::Taxonomy(rule.genre));
    }

    let fallback_text = lowered
        .iter()
        .map(String::as_str)
        .filter(|s| !is_generic(s))
        .chain([title.as_str(), description.as_str()])
        .collect::<Vec<_>>()
        .join(" ");

    // "non-fiction" must not count as a fiction signal
    let fiction_text = fallback_text
        .replace("non-fiction", " ")
        .replace("nonfiction", " ");
    if fiction_text.contains("fiction") {
        return Some(GenreLabel::Taxonomy(Genre::LiteraryFiction));
    }

    if NON_FICTION_SIGNALS.iter().any(|w| fallback_text.contains(w)) {
        return Some(GenreLabel::Taxonomy(Genre::NonFiction));
    }

    subjects
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty() && !is_generic(&s.to_lowercase()))
        .map(|s| GenreLabel::Subject(title_case(s)))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
