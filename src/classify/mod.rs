//! Label classification: maps free text to a semantic category and display color.
//!
//! Rules are evaluated top to bottom and the first match wins. Overlapping rules are
//! resolved purely by table position, so a generic rule placed above a more specific one
//! shadows it (`"President Biden"` is a `Leader`, not a `NamedLeader`).

pub mod palette;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::util::truncate_label;

static BOLD_MARKERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*").expect("valid regex"));
static WIKI_LINKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[.*?\]\]").expect("valid regex"));

static BUILTIN: LazyLock<Classifier> = LazyLock::new(Classifier::builtin);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub color: String,
    pub category: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub enum Pattern {
    /// Case-insensitive regex, usually a whole-word alternation.
    Regex(Regex),
    /// Case-insensitive plain substring.
    Substring(String),
}

impl Pattern {
    fn matches(&self, label: &str) -> bool {
        match self {
            Self::Regex(regex) => regex.is_match(label),
            Self::Substring(needle) => label.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColorRule {
    pub pattern: Pattern,
    pub color: String,
    pub category: String,
    pub description: String,
}

impl ColorRule {
    /// Builds a rule matching any of `words` on word boundaries, ignoring case.
    pub fn words(
        words: &[&str],
        color: &str,
        category: &str,
        description: &str,
    ) -> Result<Self, regex::Error> {
        let alternation = words
            .iter()
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))?;
        Ok(Self {
            pattern: Pattern::Regex(regex),
            color: color.to_owned(),
            category: category.to_owned(),
            description: description.to_owned(),
        })
    }

    pub fn substring(needle: &str, color: &str, category: &str, description: &str) -> Self {
        Self {
            pattern: Pattern::Substring(needle.to_owned()),
            color: color.to_owned(),
            category: category.to_owned(),
            description: description.to_owned(),
        }
    }

    fn classification(&self) -> Classification {
        Classification {
            color: self.color.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Classifier {
    rules: Vec<ColorRule>,
}

impl Classifier {
    pub fn new(rules: Vec<ColorRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ColorRule] {
        &self.rules
    }

    pub fn builtin() -> Self {
        let table: &[(&[&str], &str, &str, &str)] = &[
            (
                &[
                    "U.S.A", "United States", "America", "China", "Russia", "India", "Brazil",
                    "Canada", "Mexico", "Japan", "Germany", "France", "UK", "Italy", "Spain",
                    "Australia", "Korea", "Indonesia", "Thailand", "Vietnam", "Philippines",
                    "Malaysia", "Singapore", "Argentina", "Chile", "Colombia", "Peru",
                    "Venezuela", "Ecuador", "Bolivia", "Uruguay", "Paraguay", "Egypt",
                    "South Africa", "Nigeria", "Kenya", "Ghana", "Saudi Arabia", "UAE", "Israel",
                    "Turkey", "Iran", "Iraq", "Pakistan", "Bangladesh", "Afghanistan", "Ukraine",
                    "Poland", "Romania", "Sweden", "Norway", "Denmark", "Finland", "Netherlands",
                    "Belgium", "Switzerland", "Austria", "Greece", "Portugal", "Ireland",
                    "New Zealand", "Taiwan", "Hong Kong",
                ],
                palette::CYAN,
                "Country",
                "Nation states and countries",
            ),
            (
                &[
                    "Americas", "Europe", "Asia", "Africa", "Middle East", "Latin America",
                    "North America", "South America", "Central America", "Caribbean", "Pacific",
                    "Atlantic", "Mediterranean", "Balkans", "Scandinavia", "Western Europe",
                    "Eastern Europe", "Southeast Asia", "East Asia", "South Asia", "Central Asia",
                ],
                palette::LIGHT_CYAN,
                "Region",
                "Geographic regions and continents",
            ),
            (
                &[
                    "Washington", "Moscow", "Beijing", "Tokyo", "London", "Paris", "Berlin",
                    "Rome", "Madrid", "New Delhi", "Brasilia", "Ottawa", "Mexico City", "Seoul",
                    "Bangkok", "Hanoi", "Manila", "Jakarta", "Singapore", "Buenos Aires",
                    "Santiago", "Bogota", "Lima", "Caracas", "Cairo", "Johannesburg", "Lagos",
                    "Nairobi", "Riyadh", "Dubai", "Tel Aviv", "Istanbul", "Tehran", "Kiev",
                    "Warsaw",
                ],
                palette::BRIGHT_CYAN,
                "City",
                "Major cities",
            ),
            (
                &[
                    "President", "Prime Minister", "Chancellor", "King", "Queen", "Emperor",
                    "Sultan", "Emir", "Leader", "Chairman", "Secretary", "Minister", "Governor",
                    "Mayor", "Senator", "Representative", "Congressman", "Delegate",
                ],
                palette::PINK,
                "Leader",
                "Political leaders and officials",
            ),
            (
                &[
                    "Biden", "Trump", "Putin", "Xi Jinping", "Modi", "Macron", "Scholz",
                    "Trudeau", "López Obrador", "Bukele", "Zelenskyy", "Erdogan", "Netanyahu",
                    "Khamenei", "Kim Jong Un", "Moon Jae-in", "Bolsonaro", "Lula", "Milei",
                ],
                palette::HOT_PINK,
                "NamedLeader",
                "Named political leaders",
            ),
            (
                &[
                    "UN", "United Nations", "NATO", "EU", "European Union", "WHO", "IMF",
                    "World Bank", "WTO", "OPEC", "G7", "G20", "ASEAN", "African Union", "OAS",
                    "Arab League", "BRICS",
                ],
                palette::PURPLE,
                "IntlOrganization",
                "International organizations",
            ),
            (
                &[
                    "Congress", "Senate", "Parliament", "House", "Assembly", "Council", "Court",
                    "Department", "Agency", "Ministry", "Bureau", "Commission", "Committee",
                ],
                palette::VIOLET,
                "GovtOrganization",
                "Government bodies",
            ),
            (
                &[
                    "Democratic", "Republican", "Conservative", "Labour", "Liberal", "Socialist",
                    "Communist", "Green", "Nationalist", "Populist", "Party", "Movement",
                    "Coalition", "Alliance",
                ],
                palette::LAVENDER,
                "PoliticalParty",
                "Political parties and movements",
            ),
            (
                &[
                    "Election", "Summit", "Conference", "Treaty", "Agreement", "War", "Conflict",
                    "Revolution", "Coup", "Protest", "Crisis", "Referendum", "Vote",
                    "Negotiation", "Meeting", "Rally",
                ],
                palette::MAGENTA,
                "Event",
                "Political events and actions",
            ),
            (
                &[
                    "Policy", "Law", "Act", "Bill", "Constitution", "Reform", "Strategy",
                    "Initiative", "Program", "Plan", "Regulation", "Sanction", "Tariff", "Trade",
                    "Immigration", "Healthcare", "Education", "Defense", "Security",
                ],
                palette::INDIGO,
                "Policy",
                "Policies and systems",
            ),
            (
                &[
                    "Economy", "GDP", "Market", "Trade", "Export", "Import", "Investment",
                    "Inflation", "Debt", "Budget", "Tax", "Finance", "Banking", "Currency",
                    "Dollar", "Euro", "Yuan", "Peso",
                ],
                palette::AMBER,
                "Economic",
                "Economic concepts",
            ),
            (
                &[
                    "Technology", "AI", "Artificial Intelligence", "Blockchain", "Crypto",
                    "Digital", "Cyber", "Internet", "Data", "Cloud", "Innovation", "Science",
                    "Research",
                ],
                palette::TEAL,
                "Technology",
                "Technology and innovation",
            ),
            (
                &[
                    "Climate", "Environment", "Human Rights", "Democracy", "Freedom", "Justice",
                    "Equality", "Poverty", "Migration", "Refugee", "Pandemic", "Health", "COVID",
                ],
                palette::EMERALD,
                "SocialIssue",
                "Social and environmental issues",
            ),
            (
                &[
                    "Military", "Army", "Navy", "Air Force", "Defense", "Security",
                    "Intelligence", "CIA", "FBI", "NSA", "Pentagon", "Weapon", "Nuclear",
                    "Missile", "Drone",
                ],
                palette::ROSE,
                "Military",
                "Military and security",
            ),
            (
                &[
                    "Media", "Press", "News", "Journalism", "Propaganda", "Social Media",
                    "Facebook", "Twitter", "YouTube", "TikTok", "Information", "Communication",
                ],
                palette::BLUE,
                "Media",
                "Media and communication",
            ),
            (
                &[
                    "Democracy", "Authoritarianism", "Capitalism", "Socialism", "Communism",
                    "Fascism", "Liberalism", "Conservatism", "Nationalism", "Globalism",
                    "Ideology", "Doctrine", "Philosophy",
                ],
                palette::PERIWINKLE,
                "Ideology",
                "Political ideologies and philosophies",
            ),
        ];

        let rules = table
            .iter()
            .map(|(words, color, category, description)| {
                ColorRule::words(words, color, category, description)
                    .expect("builtin rule words are escaped")
            })
            .collect();

        Self::new(rules)
    }

    pub fn classify(&self, label: &str) -> Classification {
        self.classify_with_hint(label, None)
    }

    /// Like [`Classifier::classify`], but an unmatched label whose existing category is a
    /// hex color keeps that color as a `Custom` category.
    pub fn classify_with_hint(
        &self,
        label: &str,
        existing_category: Option<&str>,
    ) -> Classification {
        let clean = strip_markup(label);

        if let Some(rule) = self.rules.iter().find(|rule| rule.pattern.matches(&clean)) {
            return rule.classification();
        }

        if let Some(existing) = existing_category
            && palette::is_hex_color(existing)
        {
            return Classification {
                color: existing.to_owned(),
                category: "Custom".to_owned(),
                description: "Custom categorized node".to_owned(),
            };
        }

        Classification {
            color: palette::DEFAULT.to_owned(),
            category: "General".to_owned(),
            description: "General concept or entity".to_owned(),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// Classifies `label` against the builtin rule table.
pub fn classify(label: &str) -> Classification {
    BUILTIN.classify(label)
}

pub fn classify_with_hint(label: &str, existing_category: Option<&str>) -> Classification {
    BUILTIN.classify_with_hint(label, existing_category)
}

fn strip_markup(label: &str) -> String {
    let without_bold = BOLD_MARKERS.replace_all(label, "");
    WIKI_LINKS.replace_all(&without_bold, "").trim().to_owned()
}

/// Display form of a label: markup removed, lines joined, capped at 100 characters.
pub fn format_label(label: &str) -> String {
    let clean = strip_markup(label).replace('\n', " ");
    truncate_label(clean.trim()).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_rule_wins_over_more_specific_later_rule() {
        let result = classify("President Biden");
        assert_eq!(result.category, "Leader");
        assert_eq!(result.color, palette::PINK);
    }

    #[test]
    fn specific_rule_matches_when_generic_rule_does_not() {
        assert_eq!(classify("Biden").category, "NamedLeader");
        assert_eq!(classify("Biden").color, palette::HOT_PINK);
    }

    #[test]
    fn keyword_position_does_not_affect_priority() {
        // "Biden" appears first in the text, but the Leader rule sits higher in the table.
        assert_eq!(classify("Biden, President").category, "Leader");
    }

    #[test]
    fn matching_is_case_insensitive_and_word_bounded() {
        assert_eq!(classify("nato expansion").category, "IntlOrganization");
        // "Ukraine" is a Country; "UK" must not match inside "Ukulele".
        assert_eq!(classify("Ukulele").category, "General");
    }

    #[test]
    fn tolerates_markdown_artifacts() {
        assert_eq!(classify("**Tokyo**").category, "City");
        assert_eq!(classify("[[Paris]]").category, "General");
        assert_eq!(classify("**Moscow** [[notes]]").category, "City");
    }

    #[test]
    fn unmatched_label_gets_general_default() {
        let result = classify("sourdough starter");
        assert_eq!(result.category, "General");
        assert_eq!(result.color, palette::DEFAULT);
    }

    #[test]
    fn hex_hint_becomes_custom_only_when_no_rule_matches() {
        assert_eq!(
            classify_with_hint("sourdough", Some("#123456")).color,
            "#123456"
        );
        assert_eq!(
            classify_with_hint("sourdough", Some("#123456")).category,
            "Custom"
        );
        assert_eq!(
            classify_with_hint("Berlin", Some("#123456")).category,
            "City"
        );
        assert_eq!(
            classify_with_hint("sourdough", Some("baking")).category,
            "General"
        );
    }

    #[test]
    fn custom_tables_respect_their_own_order() {
        let classifier = Classifier::new(vec![
            ColorRule::substring("rust", "#000001", "Lang", "languages"),
            ColorRule::words(&["rust belt"], "#000002", "Place", "places").unwrap(),
        ]);
        assert_eq!(classifier.classify("The Rust Belt").category, "Lang");
        assert_eq!(classifier.classify("nothing here").category, "General");
    }

    #[test]
    fn format_label_strips_markup_and_caps_length() {
        assert_eq!(format_label("**Bold**\nline [[link]]"), "Bold line");
        assert_eq!(format_label(&"x".repeat(150)).chars().count(), 100);
    }
}
