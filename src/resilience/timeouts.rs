//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a single network attempt with a deadline
//! - Abandon the attempt cleanly when the deadline fires
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - The abandoned future is dropped, so a late response is discarded

use std::future::Future;
use std::time::Duration;

/// The deadline elapsed before the wrapped future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` to completion or give up after `deadline`.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}
