//! Page record assembler.
//!
//! Locates the title, question body, tags and answers of one rendered question
//! page and turns them into a [`PageRecord`]. Bodies go through the content
//! extractor and quote regrouper from `qaharvest-content`.
//!
//! Two failure channels:
//! - a missing title or question body aborts the page with
//!   [`HarvestError::StructuralLookup`];
//! - a bad tag or answer becomes a [`FragmentError`], is logged, and the page
//!   carries on without it.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use qaharvest_content::{Node, content_blocks, normalize};
use qaharvest_shared::{
    AnswerRecord, ContentBlock, HarvestError, PageRecord, QuestionRecord, Result, SelectorsConfig,
};

// ---------------------------------------------------------------------------
// PageLayout
// ---------------------------------------------------------------------------

/// Compiled selectors describing where things live on a question page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    title: Selector,
    question_body: Selector,
    tag: Selector,
    answer: Selector,
    /// Relative to an answer container.
    answer_body: Selector,
    /// Relative to an answer container.
    vote_count: Selector,
    accepted_class: String,
}

impl PageLayout {
    /// Compile the `[selectors]` config section.
    pub fn from_config(config: &SelectorsConfig) -> Result<Self> {
        Ok(Self {
            title: compile("title", &config.title)?,
            question_body: compile("question_body", &config.question_body)?,
            tag: compile("tag", &config.tag)?,
            answer: compile("answer", &config.answer)?,
            answer_body: compile("answer_body", &config.answer_body)?,
            vote_count: compile("vote_count", &config.vote_count)?,
            accepted_class: config.accepted_class.clone(),
        })
    }

    /// Stack Overflow's current markup.
    pub fn stack_overflow() -> Result<Self> {
        Self::from_config(&SelectorsConfig::default())
    }
}

fn compile(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| HarvestError::config(format!("selectors.{field}: invalid selector `{css}`: {e}")))
}

// ---------------------------------------------------------------------------
// Fragment errors
// ---------------------------------------------------------------------------

/// A part of the page that could not be read and was left out of the record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    #[error("tag #{index} has no text")]
    EmptyTag { index: usize },

    #[error("answer #{index}: body not found")]
    MissingAnswerBody { index: usize },

    #[error("answer #{index}: vote count not found")]
    MissingVoteCount { index: usize },

    #[error("answer #{index}: vote count `{raw}` is not an integer")]
    InvalidVoteCount { index: usize, raw: String },
}

/// A record plus whatever had to be dropped to build it.
#[derive(Debug, Clone)]
pub struct AssembledPage {
    pub record: PageRecord,
    pub skipped: Vec<FragmentError>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Parse `html` and assemble the record for the page at `url`.
pub fn assemble_page(url: &Url, html: &str, layout: &PageLayout, topic: &str) -> Result<AssembledPage> {
    let document = Html::parse_document(html);
    assemble_document(url, &document, layout, topic)
}

/// Assemble a record from an already parsed document.
#[instrument(skip_all, fields(url = %url))]
pub fn assemble_document(
    url: &Url,
    document: &Html,
    layout: &PageLayout,
    topic: &str,
) -> Result<AssembledPage> {
    let title = document
        .select(&layout.title)
        .next()
        .ok_or_else(|| HarvestError::structural(url.as_str(), "title"))?;
    let body = document
        .select(&layout.question_body)
        .next()
        .ok_or_else(|| HarvestError::structural(url.as_str(), "question body"))?;

    let question = QuestionRecord {
        title: normalize(Node::from_element(title).text.as_str()),
        content: body_blocks(body, url),
        url: url.to_string(),
    };

    let mut skipped = Vec::new();

    let mut tags = Vec::new();
    for (index, el) in document.select(&layout.tag).enumerate() {
        let tag = normalize(el.text().collect::<String>().as_str());
        if tag.is_empty() {
            skip(&mut skipped, FragmentError::EmptyTag { index });
        } else {
            tags.push(tag);
        }
    }

    let mut accepted_answer = None;
    let mut other_answers = Vec::new();
    for (index, el) in document.select(&layout.answer).enumerate() {
        let answer = match read_answer(el, index, layout, url) {
            Ok(answer) => answer,
            Err(fragment) => {
                skip(&mut skipped, fragment);
                continue;
            }
        };

        let is_accepted = el.value().classes().any(|c| c == layout.accepted_class);
        if is_accepted && accepted_answer.is_none() {
            accepted_answer = Some(answer);
        } else {
            if is_accepted {
                warn!(index, "page marks more than one accepted answer, keeping the first");
            }
            other_answers.push(answer);
        }
    }

    let record = PageRecord {
        topic: topic.to_string(),
        tags,
        question,
        accepted_answer,
        other_answers,
    };

    debug!(
        tags = record.tags.len(),
        answers = record.answer_count(),
        accepted = record.accepted_answer.is_some(),
        skipped = skipped.len(),
        "page assembled"
    );

    Ok(AssembledPage { record, skipped })
}

fn read_answer(
    el: ElementRef<'_>,
    index: usize,
    layout: &PageLayout,
    url: &Url,
) -> std::result::Result<AnswerRecord, FragmentError> {
    let body = el
        .select(&layout.answer_body)
        .next()
        .ok_or(FragmentError::MissingAnswerBody { index })?;
    let vote_el = el
        .select(&layout.vote_count)
        .next()
        .ok_or(FragmentError::MissingVoteCount { index })?;

    let raw = normalize(vote_el.text().collect::<String>().as_str());
    let votes = raw
        .parse::<i64>()
        .map_err(|_| FragmentError::InvalidVoteCount { index, raw })?;

    Ok(AnswerRecord {
        content: body_blocks(body, url),
        votes,
    })
}

fn body_blocks(body: ElementRef<'_>, url: &Url) -> Vec<ContentBlock> {
    resolve_images(content_blocks(&Node::from_element(body)), url)
}

/// Make image sources absolute against the page URL.
fn resolve_images(blocks: Vec<ContentBlock>, base: &Url) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .map(|block| match block {
            ContentBlock::Image { src } => {
                let src = base.join(&src).map(|u| u.to_string()).unwrap_or(src);
                ContentBlock::Image { src }
            }
            other => other,
        })
        .collect()
}

fn skip(skipped: &mut Vec<FragmentError>, fragment: FragmentError) {
    warn!(error = %fragment, "skipping page fragment");
    skipped.push(fragment);
}
