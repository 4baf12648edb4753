//! Record types produced by the harvesting pipeline.

use serde::{Deserialize, Serialize};

/// Topic attached to records when none is configured.
pub const DEFAULT_TOPIC: &str = "SAP";

// ---------------------------------------------------------------------------
// ContentBlock
// ---------------------------------------------------------------------------

/// One classified unit of rendered content, in document order.
///
/// `Quoted` only exists between extraction and regrouping; records handed to a
/// sink carry `QuotedGroup` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Whitespace-normalized paragraph text.
    Text { value: String },
    /// A single line of quoted text, before regrouping.
    #[serde(rename = "quoted_line")]
    Quoted { value: String },
    /// A maximal run of quoted lines. Never empty.
    #[serde(rename = "quoted")]
    QuotedGroup { lines: Vec<String> },
    /// Preformatted code, trimmed but otherwise verbatim.
    Code { value: String },
    /// An image by source URL.
    Image { src: String },
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self::Quoted {
            value: value.into(),
        }
    }

    pub fn code(value: impl Into<String>) -> Self {
        Self::Code {
            value: value.into(),
        }
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::Image { src: src.into() }
    }

    /// Short kind name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Quoted { .. } => "quoted_line",
            Self::QuotedGroup { .. } => "quoted",
            Self::Code { .. } => "code",
            Self::Image { .. } => "image",
        }
    }
}

// ---------------------------------------------------------------------------
// Page records
// ---------------------------------------------------------------------------

/// The question part of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Question title as rendered.
    pub title: String,
    /// Question body blocks.
    pub content: Vec<ContentBlock>,
    /// Page URL the question was harvested from.
    pub url: String,
}

/// One answer on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Answer body blocks.
    pub content: Vec<ContentBlock>,
    /// Net vote count shown on the page.
    pub votes: i64,
}

/// Fully assembled result for one question page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Free-form topic label for the batch (e.g. `"SAP"`).
    pub topic: String,
    /// Question tags in page order.
    pub tags: Vec<String>,
    pub question: QuestionRecord,
    /// The accepted answer, if the page marks one.
    pub accepted_answer: Option<AnswerRecord>,
    /// Every other parseable answer in page order.
    pub other_answers: Vec<AnswerRecord>,
}

impl PageRecord {
    /// Total number of answers carried by this record.
    pub fn answer_count(&self) -> usize {
        self.other_answers.len() + usize::from(self.accepted_answer.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_serialization_uses_type_tag() {
        let json = serde_json::to_value(ContentBlock::text("hello")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "type": "text", "value": "hello" }));

        let group = ContentBlock::QuotedGroup {
            lines: vec!["a".into(), "b".into()],
        };
        let json = serde_json::to_value(&group).expect("serialize");
        assert_eq!(json, serde_json::json!({ "type": "quoted", "lines": ["a", "b"] }));

        let json = serde_json::to_value(ContentBlock::image("a.png")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "type": "image", "src": "a.png" }));
    }

    #[test]
    fn block_kind_matches_tag() {
        for block in [
            ContentBlock::text("t"),
            ContentBlock::quoted("q"),
            ContentBlock::QuotedGroup { lines: vec!["q".into()] },
            ContentBlock::code("c"),
            ContentBlock::image("i"),
        ] {
            let json = serde_json::to_value(&block).expect("serialize");
            assert_eq!(json["type"], block.kind());
        }
    }

    #[test]
    fn record_serialization() {
        let record = PageRecord {
            topic: DEFAULT_TOPIC.into(),
            tags: vec!["sap".into(), "abap".into()],
            question: QuestionRecord {
                title: "How do I?".into(),
                content: vec![ContentBlock::text("body")],
                url: "https://stackoverflow.com/questions/1/how".into(),
            },
            accepted_answer: None,
            other_answers: vec![AnswerRecord {
                content: vec![ContentBlock::code("x = 1")],
                votes: -2,
            }],
        };

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["topic"], "SAP");
        assert!(json["accepted_answer"].is_null());
        assert_eq!(json["other_answers"][0]["votes"], -2);

        let parsed: PageRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, record);
        assert_eq!(parsed.answer_count(), 1);
    }
}
