//! Best-result ranking across candidate forms and formats.
//!
//! Order: any report beats any error; fewer fail glyphs (● ■) first, then fewer unresolved
//! glyphs (◎ �), then whichever candidate was produced first. Between two errors the earlier
//! one is kept.

use crate::error::CheckError;
use crate::report::ValidationReport;

pub type Outcome = Result<ValidationReport, CheckError>;

fn key(r: &ValidationReport) -> (usize, usize) {
  (r.tally.fail, r.tally.unresolved())
}

/// `a` was produced before `b`.
pub fn pick_better(a: Outcome, b: Outcome) -> Outcome {
  match (a, b) {
    (Ok(x), Ok(y)) => {
      if key(&y) < key(&x) {
        Ok(y)
      } else {
        Ok(x)
      }
    }
    (Ok(x), Err(_)) | (Err(_), Ok(x)) => Ok(x),
    (Err(e), Err(_)) => Err(e),
  }
}

/// Left fold of `pick_better` in iteration order; None if there are no outcomes.
pub fn best_of<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Option<Outcome> {
  outcomes.into_iter().reduce(pick_better)
}
