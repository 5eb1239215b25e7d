use tracing::warn;

use crate::token::claims::decode_claims;
use crate::token::Token;
use crate::utils::time::now_millis;

/// Remaining lifetime of a token in milliseconds.
///
/// A token that cannot be decoded counts as already expired: the defect is
/// logged and the caller gets a non-positive number it can compare safely,
/// never an error.
pub fn time_until_expiry(token: &Token) -> i64 {
    match decode_claims(token.value()) {
        Ok(claims) => claims.exp as i64 * 1000 - now_millis(),
        Err(e) => {
            warn!("error decoding token: {}", e);
            0
        }
    }
}

/// True when the remaining lifetime is below the given buffer.
pub fn due_for_renewal(token: &Token, buffer_seconds: u64) -> bool {
    time_until_expiry(token) < buffer_seconds as i64 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::forge_jwt;
    use crate::utils::time::now_unix;

    #[test]
    fn remaining_lifetime_tracks_exp_claim() {
        let exp = now_unix() + 600;
        let token = Token::new(forge_jwt(exp));
        let remaining = time_until_expiry(&token);
        // within a second of the expected 600s
        assert!(remaining > 599_000 && remaining <= 600_000, "got {}", remaining);
    }

    #[test]
    fn expired_token_is_negative() {
        let token = Token::new(forge_jwt(now_unix() - 60));
        assert!(time_until_expiry(&token) < 0);
    }

    #[test]
    fn malformed_token_counts_as_expired() {
        let token = Token::new("not-a-jwt".to_owned());
        assert!(time_until_expiry(&token) <= 0);
        assert!(due_for_renewal(&token, 300));
    }

    #[test]
    fn renewal_buffer_boundary() {
        let above = Token::new(forge_jwt(now_unix() + 600));
        let below = Token::new(forge_jwt(now_unix() + 60));
        assert!(!due_for_renewal(&above, 300));
        assert!(due_for_renewal(&below, 300));
    }
}
