//! Intent resolution for the visa assistant.
//!
//! [`Resolver::resolve`] maps free text to a [`ResponseDescriptor`]. It is
//! pure and total: every input yields a response, the last resort being the
//! "not sure" fallback. Checks run in a fixed priority order and the first
//! match wins:
//!
//! 1. pricing / processing-time keywords
//! 2. the "asia" region
//! 3. the "schengen" / "europe" region
//! 4. a country whose name appears in the text
//! 5. an exact menu phrase (what quick replies send back)
//! 6. fallback

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::region::Region;
use crate::visa::{CountryVisaRecord, VisaDb};

const PRICING_KEYWORDS: &[&str] = &["price", "cost", "time", "how long"];
const ASIA_KEYWORDS: &[&str] = &["asia"];
const SCHENGEN_KEYWORDS: &[&str] = &["schengen", "europe"];

const PRICING_TEXT: &str = "For the most up-to-date prices and processing times, please contact an agent directly. They can provide exact details for your specific travel dates.";
const WELCOME_TEXT: &str = "Hi there! I'm the O.S Travel bot. You can ask me about visa services for a specific country (e.g., 'Thailand') or a region (e.g., 'Schengen').";
const VISA_SERVICES_TEXT: &str = "We handle E-Visas and complex file processing. Which region are you interested in?";
const FLIGHTS_TEXT: &str = "We can help you find the best deals on flights worldwide. Please contact us directly for a booking.";
const CONTACT_TEXT: &str = "You can reach us at 051-2120700 or email info@ostravels.com. Our team is ready to help!";
const FALLBACK_TEXT: &str = "Sorry, I'm not sure about that. Try asking for a specific country (e.g., 'France') or region (e.g., 'Asia').";

/// A canned answer offered as a button. `label` is shown, `value` is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub value: String,
}

impl QuickReply {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryList {
    pub title: String,
    pub countries: Vec<CountryVisaRecord>,
}

/// What a message shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum MessageBody {
    Text(String),
    CountryInfo(CountryVisaRecord),
    CountryList(CountryList),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    CountryInfo,
    CountryList,
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::Text(_) => MessageKind::Text,
            MessageBody::CountryInfo(_) => MessageKind::CountryInfo,
            MessageBody::CountryList(_) => MessageKind::CountryList,
        }
    }

    /// Single-line summary, used for logs and plain-text output
    pub fn summary(&self) -> String {
        match self {
            MessageBody::Text(text) => text.clone(),
            MessageBody::CountryInfo(country) => format!("{} Visa", country.name),
            MessageBody::CountryList(list) => {
                format!("{} ({} countries)", list.title, list.countries.len())
            }
        }
    }
}

/// The resolver's answer: what to render and which quick replies to offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    pub body: MessageBody,
    pub replies: Vec<QuickReply>,
}

impl ResponseDescriptor {
    fn text(text: &str, replies: Vec<QuickReply>) -> Self {
        Self {
            body: MessageBody::Text(text.to_string()),
            replies,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }
}

/// Fixed phrases matched exactly after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuIntent {
    Welcome,
    VisaServices,
    OtherCountries,
    Flights,
    Contact,
}

const MENU_PHRASES: &[(&str, MenuIntent)] = &[
    ("hello", MenuIntent::Welcome),
    ("hi", MenuIntent::Welcome),
    ("welcome", MenuIntent::Welcome),
    ("all_visas", MenuIntent::VisaServices),
    ("visa", MenuIntent::VisaServices),
    ("other_countries", MenuIntent::OtherCountries),
    ("flights", MenuIntent::Flights),
    ("contact", MenuIntent::Contact),
];

impl MenuIntent {
    pub fn from_phrase(text: &str) -> Option<Self> {
        MENU_PHRASES
            .iter()
            .find(|(phrase, _)| *phrase == text)
            .map(|(_, intent)| *intent)
    }

    fn respond(self, db: &VisaDb) -> ResponseDescriptor {
        match self {
            MenuIntent::Welcome => ResponseDescriptor::text(
                WELCOME_TEXT,
                vec![
                    QuickReply::new("Visa Services", "all_visas"),
                    QuickReply::new("Book a Flight", "flights"),
                    QuickReply::new("Contact Us", "contact"),
                ],
            ),
            MenuIntent::VisaServices => ResponseDescriptor::text(
                VISA_SERVICES_TEXT,
                vec![
                    QuickReply::new("Asian Countries", "asia"),
                    QuickReply::new("Schengen Countries", "schengen"),
                    QuickReply::new("USA/UK/Canada", "other_countries"),
                ],
            ),
            MenuIntent::OtherCountries => region_list(
                db,
                Region::Other,
                vec![QuickReply::new("Main Menu", "welcome")],
            ),
            MenuIntent::Flights => ResponseDescriptor::text(
                FLIGHTS_TEXT,
                vec![
                    QuickReply::new("See Contact Info", "contact"),
                    QuickReply::new("Main Menu", "welcome"),
                ],
            ),
            MenuIntent::Contact => ResponseDescriptor::text(
                CONTACT_TEXT,
                vec![
                    QuickReply::new("Ask About Visas", "visa"),
                    QuickReply::new("Main Menu", "welcome"),
                ],
            ),
        }
    }
}

/// Lowercase and trim user text before matching
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn region_list(db: &VisaDb, region: Region, replies: Vec<QuickReply>) -> ResponseDescriptor {
    let countries = db
        .countries_in_region(region)
        .into_iter()
        .cloned()
        .collect();

    ResponseDescriptor {
        body: MessageBody::CountryList(CountryList {
            title: region.list_title().to_string(),
            countries,
        }),
        replies,
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    db: Arc<VisaDb>,
}

impl Resolver {
    pub fn new(db: Arc<VisaDb>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &VisaDb {
        &self.db
    }

    pub fn resolve(&self, user_text: &str) -> ResponseDescriptor {
        let text = normalize(user_text);

        if contains_any(&text, PRICING_KEYWORDS) {
            debug!(text = %text, "Resolved pricing question");
            return ResponseDescriptor::text(
                PRICING_TEXT,
                vec![
                    QuickReply::new("Contact an Agent", "contact"),
                    QuickReply::new("List All Visas", "all_visas"),
                ],
            );
        }

        if contains_any(&text, ASIA_KEYWORDS) {
            debug!(text = %text, "Resolved region: asia");
            return region_list(
                &self.db,
                Region::Asia,
                vec![
                    QuickReply::new("List Schengen Visas", "schengen"),
                    QuickReply::new("Contact Us", "contact"),
                ],
            );
        }

        if contains_any(&text, SCHENGEN_KEYWORDS) {
            debug!(text = %text, "Resolved region: schengen");
            return region_list(
                &self.db,
                Region::Schengen,
                vec![
                    QuickReply::new("List Asian Visas", "asia"),
                    QuickReply::new("Contact Us", "contact"),
                ],
            );
        }

        if let Some(country) = self.db.find_country(&text) {
            debug!(text = %text, country = %country.name, "Resolved country");
            return ResponseDescriptor {
                body: MessageBody::CountryInfo(country.clone()),
                replies: vec![
                    QuickReply::new("Ask About Price/Time", "price"),
                    QuickReply::new("List All Visas", "all_visas"),
                ],
            };
        }

        if let Some(intent) = MenuIntent::from_phrase(&text) {
            debug!(text = %text, ?intent, "Resolved menu phrase");
            return intent.respond(&self.db);
        }

        debug!(text = %text, "No intent matched, using fallback");
        ResponseDescriptor::text(
            FALLBACK_TEXT,
            vec![
                QuickReply::new("Visa Services", "visa"),
                QuickReply::new("Contact Us", "contact"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(VisaDb::embedded().unwrap()))
    }

    fn text_of(descriptor: &ResponseDescriptor) -> &str {
        match &descriptor.body {
            MessageBody::Text(text) => text,
            other => panic!("expected text, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_pricing_keywords_win_over_everything() {
        let r = resolver();
        let pricing = r.resolve("price");
        assert_eq!(text_of(&pricing), PRICING_TEXT);

        for input in [
            "Thailand price",
            "COST of a schengen visa",
            "processing time for asia",
            "How long does Egypt take?",
            "contact time",
        ] {
            assert_eq!(r.resolve(input), pricing, "input: {}", input);
        }
    }

    #[test]
    fn test_thailand_returns_country_info() {
        let d = resolver().resolve("Thailand");
        assert_eq!(d.kind(), MessageKind::CountryInfo);
        match d.body {
            MessageBody::CountryInfo(country) => assert_eq!(country.name, "Thailand"),
            _ => unreachable!(),
        }
        assert_eq!(d.replies[0], QuickReply::new("Ask About Price/Time", "price"));
    }

    #[test]
    fn test_country_lookup_accepts_surrounding_text() {
        let d = resolver().resolve("  I need a visa for Sri Lanka ");
        match d.body {
            MessageBody::CountryInfo(country) => assert_eq!(country.name, "Sri Lanka"),
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn test_asia_list_keeps_region_order() {
        let r = resolver();
        let d = r.resolve("asia");
        match d.body {
            MessageBody::CountryList(list) => {
                assert_eq!(list.title, "Asian Countries We Service");
                let names: Vec<String> =
                    list.countries.iter().map(|c| c.name.to_lowercase()).collect();
                assert_eq!(names, Region::Asia.members());
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert_eq!(
            d.replies,
            vec![
                QuickReply::new("List Schengen Visas", "schengen"),
                QuickReply::new("Contact Us", "contact"),
            ]
        );
    }

    #[test]
    fn test_region_keyword_beats_country_name() {
        // "asia" is checked before the country lookup
        let d = resolver().resolve("thailand in asia");
        assert_eq!(d.kind(), MessageKind::CountryList);
    }

    #[test]
    fn test_europe_lists_schengen() {
        let r = resolver();
        assert_eq!(r.resolve("Europe"), r.resolve("schengen"));
        assert_eq!(r.resolve("Europe").replies[0].value, "asia");
    }

    #[test]
    fn test_welcome_aliases_are_identical() {
        let r = resolver();
        let hello = r.resolve("hello");
        assert_eq!(text_of(&hello), WELCOME_TEXT);
        assert_eq!(r.resolve("hi"), hello);
        assert_eq!(r.resolve(" Welcome "), hello);
        assert_eq!(hello.replies.len(), 3);
    }

    #[test]
    fn test_menu_phrases() {
        let r = resolver();
        assert_eq!(r.resolve("visa"), r.resolve("all_visas"));
        assert_eq!(text_of(&r.resolve("contact")), CONTACT_TEXT);
        assert_eq!(text_of(&r.resolve("flights")), FLIGHTS_TEXT);

        match r.resolve("other_countries").body {
            MessageBody::CountryList(list) => {
                assert_eq!(list.title, "File Processing Services");
                assert_eq!(list.countries.len(), Region::Other.members().len());
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn test_menu_phrases_require_exact_match() {
        let r = resolver();
        assert_eq!(text_of(&r.resolve("contact me please")), FALLBACK_TEXT);
    }

    #[test]
    fn test_unknown_input_falls_back() {
        let r = resolver();
        let d = r.resolve("xyzzy");
        assert_eq!(text_of(&d), FALLBACK_TEXT);
        assert_eq!(
            d.replies,
            vec![
                QuickReply::new("Visa Services", "visa"),
                QuickReply::new("Contact Us", "contact"),
            ]
        );
        assert_eq!(text_of(&r.resolve("")), FALLBACK_TEXT);
    }

    #[test]
    fn test_descriptor_serializes_with_kind_tag() {
        let d = resolver().resolve("Egypt");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["body"]["kind"], "country_info");
        assert_eq!(json["body"]["payload"]["country"], "Egypt");
        assert_eq!(json["replies"][1]["value"], "all_visas");
    }
}
