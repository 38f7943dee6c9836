//! Shared result types returned by the query client.

use serde::{Deserialize, Serialize};

/// A single ranked result from a web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title, as rendered on the results page.
    pub title: String,
    /// Destination URL, with any redirector wrapper already unwrapped.
    pub url: String,
    /// Short descriptive snippet; empty when the page provided none.
    pub snippet: String,
}

/// Structured payload of a direct-answer lookup.
///
/// Mirrors the subset of the DuckDuckGo Instant Answer API the research
/// pipeline consumes. Every field defaults to empty; a malformed or
/// answerless response decodes to [`InstantAnswer::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InstantAnswer {
    /// Name of the topic the answer is about.
    pub heading: String,
    /// Plain-text topic summary.
    pub abstract_text: String,
    /// Topic summary, possibly HTML-flavoured; `abstract_text` is the
    /// plain form.
    pub r#abstract: String,
    /// Alternate topic description some answer sources fill instead of
    /// the abstract fields.
    pub description: String,
    /// Name of the source the summary was drawn from.
    pub abstract_source: String,
    /// URL of the source article.
    #[serde(rename = "AbstractURL")]
    pub abstract_url: String,
    /// Direct answer text, when the query had one.
    pub answer: String,
    /// Kind of direct answer (e.g. `calc`, `ip`).
    pub answer_type: String,
    /// Dictionary-style definition, when available.
    pub definition: String,
    /// URL of the definition source.
    #[serde(rename = "DefinitionURL")]
    pub definition_url: String,
    /// Primary external links for the topic.
    pub results: Vec<InstantAnswerTopic>,
}

/// A linked topic inside an [`InstantAnswer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InstantAnswerTopic {
    /// Destination URL for the topic.
    #[serde(rename = "FirstURL")]
    pub first_url: String,
    /// Display text for the topic.
    pub text: String,
}

impl InstantAnswer {
    /// Best-effort primary URL for the topic, if the answer carried one.
    #[must_use]
    pub fn primary_url(&self) -> Option<&str> {
        if !self.abstract_url.is_empty() {
            return Some(&self.abstract_url);
        }
        self.results
            .first()
            .map(|topic| topic.first_url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// Best-effort descriptive text for the topic.
    ///
    /// Tries the plain abstract first, then the raw abstract, the
    /// description, and finally the heading. `None` when the answer
    /// carried no text at all.
    #[must_use]
    pub fn summary_text(&self) -> Option<&str> {
        [
            &self.abstract_text,
            &self.r#abstract,
            &self.description,
            &self.heading,
        ]
        .into_iter()
        .map(String::as_str)
        .find(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_answer_decodes_api_shape() {
        let body = r#"{
            "Heading": "Acme Corporation",
            "AbstractText": "Acme is a fictional company.",
            "AbstractSource": "Wikipedia",
            "AbstractURL": "https://en.wikipedia.org/wiki/Acme_Corporation",
            "Answer": "",
            "Results": [
                { "FirstURL": "https://acme.example", "Text": "Official site" }
            ],
            "UnknownField": 42
        }"#;

        let answer: InstantAnswer = serde_json::from_str(body).expect("decode instant answer");
        assert_eq!(answer.heading, "Acme Corporation");
        assert_eq!(
            answer.abstract_url,
            "https://en.wikipedia.org/wiki/Acme_Corporation"
        );
        assert_eq!(answer.results.len(), 1);
        assert_eq!(
            answer.primary_url(),
            Some("https://en.wikipedia.org/wiki/Acme_Corporation")
        );
    }

    #[test]
    fn test_instant_answer_defaults_when_fields_missing() {
        let answer: InstantAnswer = serde_json::from_str("{}").expect("decode empty object");
        assert_eq!(answer, InstantAnswer::default());
        assert!(answer.primary_url().is_none());
    }

    #[test]
    fn test_summary_text_falls_back_through_description_fields() {
        let body = r#"{
            "Heading": "Acme Corporation",
            "Abstract": "Acme is a <b>fictional</b> company.",
            "Description": "Supplier of anvils and rocket skates."
        }"#;
        let answer: InstantAnswer = serde_json::from_str(body).expect("decode instant answer");
        assert_eq!(answer.r#abstract, "Acme is a <b>fictional</b> company.");
        assert_eq!(
            answer.summary_text(),
            Some("Acme is a <b>fictional</b> company.")
        );

        let description_only = InstantAnswer {
            description: "Supplier of anvils.".to_string(),
            heading: "Acme".to_string(),
            ..InstantAnswer::default()
        };
        assert_eq!(description_only.summary_text(), Some("Supplier of anvils."));

        let heading_only = InstantAnswer {
            heading: "Acme".to_string(),
            ..InstantAnswer::default()
        };
        assert_eq!(heading_only.summary_text(), Some("Acme"));
        assert_eq!(InstantAnswer::default().summary_text(), None);
    }

    #[test]
    fn test_primary_url_falls_back_to_first_result() {
        let answer = InstantAnswer {
            results: vec![InstantAnswerTopic {
                first_url: "https://acme.example".to_string(),
                text: "Official site".to_string(),
            }],
            ..InstantAnswer::default()
        };
        assert_eq!(answer.primary_url(), Some("https://acme.example"));
    }
}
