//! Classification of a source fetch.
//!
//! The mention check is a raw substring test: the target URL string must
//! appear somewhere in the source body. It is a heuristic, not link-graph
//! parsing. Known blind spots:
//!
//! - false positives when the target URL appears as plain text rather than
//!   in a link
//! - false negatives for relative links or HTML-entity-encoded URLs

use thiserror::Error;

use super::fetch::{FetchError, SourcePage};
use crate::types::VerifiedStatus;

/// HTTP status meaning the source page was deliberately removed.
const STATUS_GONE: u16 = 410;

/// Why a verification counts as failed.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
}

/// What a fetch tells us about a mention.
#[derive(Debug)]
pub enum VerificationOutcome {
    /// The source answered 2xx or 410; the result goes into the store.
    Verified(VerifiedStatus),

    /// Anything else; the result only bumps the source's failure count.
    Failed(FailureReason),
}

/// Classifies the result of fetching a mention's source.
pub fn classify(result: Result<SourcePage, FetchError>, target: &str) -> VerificationOutcome {
    match result {
        Ok(page) if (200..300).contains(&page.status) => {
            VerificationOutcome::Verified(VerifiedStatus::Mentioned(page.body.contains(target)))
        }
        Ok(page) if page.status == STATUS_GONE => {
            VerificationOutcome::Verified(VerifiedStatus::Deleted)
        }
        Ok(page) => VerificationOutcome::Failed(FailureReason::UnexpectedStatus(page.status)),
        Err(e) => VerificationOutcome::Failed(FailureReason::Fetch(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "https://b.example/page";

    #[test]
    fn body_containing_target_is_mentioned() {
        let page = SourcePage::new(200, r#"<a href="https://b.example/page">link</a>"#);
        assert!(matches!(
            classify(Ok(page), TARGET),
            VerificationOutcome::Verified(VerifiedStatus::Mentioned(true))
        ));
    }

    #[test]
    fn body_without_target_is_not_mentioned() {
        let page = SourcePage::new(200, "<p>nothing to see</p>");
        assert!(matches!(
            classify(Ok(page), TARGET),
            VerificationOutcome::Verified(VerifiedStatus::Mentioned(false))
        ));
    }

    #[test]
    fn plain_text_occurrence_counts_as_mention() {
        let page = SourcePage::new(200, "I read https://b.example/page yesterday");
        assert!(matches!(
            classify(Ok(page), TARGET),
            VerificationOutcome::Verified(VerifiedStatus::Mentioned(true))
        ));
    }

    #[test]
    fn relative_link_is_not_detected() {
        let page = SourcePage::new(200, r#"<a href="/page">link</a>"#);
        assert!(matches!(
            classify(Ok(page), TARGET),
            VerificationOutcome::Verified(VerifiedStatus::Mentioned(false))
        ));
    }

    #[test]
    fn any_2xx_is_success() {
        let page = SourcePage::new(203, TARGET);
        assert!(matches!(
            classify(Ok(page), TARGET),
            VerificationOutcome::Verified(VerifiedStatus::Mentioned(true))
        ));
    }

    #[test]
    fn gone_is_deleted() {
        assert!(matches!(
            classify(Ok(SourcePage::new(410, "")), TARGET),
            VerificationOutcome::Verified(VerifiedStatus::Deleted)
        ));
    }

    #[test]
    fn not_found_is_a_failure() {
        assert!(matches!(
            classify(Ok(SourcePage::new(404, "")), TARGET),
            VerificationOutcome::Failed(FailureReason::UnexpectedStatus(404))
        ));
    }

    #[test]
    fn fetch_error_is_a_failure() {
        assert!(matches!(
            classify(Err(FetchError::Timeout), TARGET),
            VerificationOutcome::Failed(FailureReason::Fetch(FetchError::Timeout))
        ));
    }
}
