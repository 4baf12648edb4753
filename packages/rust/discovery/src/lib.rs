//! Question URL discovery.
//!
//! Builds the list of question pages a harvest run will visit. Two ways in:
//!
//! 1. **Stack Exchange API** ([`fetch_questions`]): page through
//!    `/2.3/questions` for a tag, newest first.
//! 2. **Listing pages** ([`discover_from_listing`]): walk the site's own tag
//!    listing and follow its "next" links.
//!
//! Either way the result ends up in a URL-list CSV ([`write_url_list`]) that
//! `qaharvest run` reads back with [`read_url_list`].

pub mod listing;
pub mod stackexchange;
pub mod url_list;

pub use listing::{ListingLayout, ListingPage, discover_from_listing, parse_listing};
pub use stackexchange::{ApiOptions, QuestionSummary, fetch_questions, question_urls};
pub use url_list::{URL_COLUMN, dedup_urls, parse_url_list, read_url_list, write_url_list};
