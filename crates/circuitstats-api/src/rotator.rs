// API token rotation on rate limiting.
//
// The Mist cloud enforces per-token request quotas. Operators can hand
// the dashboard several tokens; when one answers 429 the client moves to
// the next and stays there for later requests.

use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;
use tracing::debug;

use crate::error::Error;

/// Ordered set of API tokens with a shared "current token" cursor.
///
/// The cursor only ever moves forward (wrapping). Two requests that hit a
/// rate limit on the same token both try to advance it; only the first
/// move takes effect, so the token after the limited one is never skipped.
#[derive(Debug)]
pub struct TokenRotator {
    tokens: Vec<SecretString>,
    cursor: AtomicUsize,
}

impl TokenRotator {
    pub fn new(tokens: Vec<SecretString>) -> Result<Self, Error> {
        if tokens.is_empty() {
            return Err(Error::NoCredentials);
        }
        Ok(Self {
            tokens,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always `false`; construction rejects an empty token list.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of the token currently in use.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// The active token and its index.
    pub fn current(&self) -> (usize, &SecretString) {
        let index = self.cursor();
        (index, &self.tokens[index])
    }

    /// Move the cursor past `from`, returning the index now in effect.
    ///
    /// If another caller already moved the cursor away from `from`, its
    /// choice is kept and returned.
    pub fn advance(&self, from: usize) -> usize {
        let next = (from + 1) % self.tokens.len();
        match self
            .cursor
            .compare_exchange(from, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                debug!(from, to = next, "rotated API token");
                next
            }
            Err(actual) => actual,
        }
    }

    /// Start a rotation pass for a single request.
    pub fn pass(&self) -> RotationPass<'_> {
        RotationPass {
            rotator: self,
            index: self.cursor(),
            tried: vec![false; self.tokens.len()],
        }
    }
}

/// Per-request view of the rotator.
///
/// Bounds the retries of one request to the number of configured tokens:
/// every token gets at most one attempt, even when concurrent requests
/// move the shared cursor back onto a token this pass already used.
#[derive(Debug)]
pub struct RotationPass<'a> {
    rotator: &'a TokenRotator,
    index: usize,
    tried: Vec<bool>,
}

impl<'a> RotationPass<'a> {
    /// Index of the token this pass is using.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_token(&self) -> &'a SecretString {
        &self.rotator.tokens[self.index]
    }

    /// Record a 429 on the current token and move to the next one.
    ///
    /// Returns `false` once every token has been tried in this pass.
    pub fn rotate_on_rate_limit(&mut self) -> bool {
        if let Some(slot) = self.tried.get_mut(self.index) {
            *slot = true;
        }
        if self.tried.iter().all(|&t| t) {
            return false;
        }
        let next = self.rotator.advance(self.index);
        match self.first_untried_from(next) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    /// First token at or after `start` (wrapping) this pass hasn't used.
    fn first_untried_from(&self, start: usize) -> Option<usize> {
        let len = self.tried.len();
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&i| !self.tried[i])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn rotator(n: usize) -> TokenRotator {
        let tokens = (0..n).map(|i| SecretString::from(format!("token-{i}"))).collect();
        TokenRotator::new(tokens).unwrap()
    }

    #[test]
    fn empty_token_list_is_rejected() {
        assert!(matches!(
            TokenRotator::new(Vec::new()),
            Err(Error::NoCredentials)
        ));
    }

    #[test]
    fn pass_visits_each_token_once() {
        let rot = rotator(3);
        let mut pass = rot.pass();
        let mut seen = vec![pass.current_token().expose_secret().to_owned()];
        while pass.rotate_on_rate_limit() {
            seen.push(pass.current_token().expose_secret().to_owned());
        }
        assert_eq!(seen, ["token-0", "token-1", "token-2"]);
        assert_eq!(rot.cursor(), 2);
    }

    #[test]
    fn single_token_pass_gives_up_immediately() {
        let rot = rotator(1);
        let mut pass = rot.pass();
        assert!(!pass.rotate_on_rate_limit());
        assert_eq!(rot.cursor(), 0);
    }

    #[test]
    fn next_pass_starts_where_the_last_one_rotated_to() {
        let rot = rotator(3);
        let mut pass = rot.pass();
        assert!(pass.rotate_on_rate_limit());
        let (index, token) = rot.current();
        assert_eq!(index, 1);
        assert_eq!(token.expose_secret(), "token-1");
        assert_eq!(rot.pass().index(), 1);
    }

    #[test]
    fn concurrent_rotation_from_same_token_moves_once() {
        let rot = rotator(3);
        let mut a = rot.pass();
        let mut b = rot.pass();
        assert!(a.rotate_on_rate_limit());
        assert!(b.rotate_on_rate_limit());
        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 1);
        assert_eq!(rot.cursor(), 1);
    }

    #[test]
    fn pass_skips_tokens_it_already_tried() {
        let rot = rotator(3);
        let mut a = rot.pass();
        assert!(a.rotate_on_rate_limit());
        assert_eq!(a.index(), 1);

        // Another request burns tokens 1 and 2 and wraps the cursor to 0,
        // which `a` has already seen rate limited.
        let mut b = rot.pass();
        assert!(b.rotate_on_rate_limit());
        assert!(b.rotate_on_rate_limit());
        assert_eq!(rot.cursor(), 0);

        assert!(a.rotate_on_rate_limit());
        assert_eq!(a.index(), 2);
        assert!(!a.rotate_on_rate_limit());
    }

    #[test]
    fn cursor_wraps_to_first_token() {
        let rot = rotator(2);
        assert_eq!(rot.advance(0), 1);
        assert_eq!(rot.advance(1), 0);
        let mut pass = rot.pass();
        assert_eq!(pass.index(), 0);
        assert!(pass.rotate_on_rate_limit());
        assert!(!pass.rotate_on_rate_limit());
    }
}
