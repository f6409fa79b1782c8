//! DIMES collection links.
//!
//! DIMES addresses a collection by a 22-character short UUID derived from the
//! ArchivesSpace URI (UUIDv5, rendered in a 57-symbol alphabet without the
//! look-alike characters `0 1 I O l`).

use uuid::Uuid;

const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const SHORT_LEN: usize = 22;

pub const DEFAULT_DIMES_BASEURL: &str = "https://dimes.rockarch.org";

/// Short UUID for `name`: URL namespace for http(s) names, DNS namespace otherwise.
pub fn short_uuid(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let ns = if lower.starts_with("http://") || lower.starts_with("https://") {
        &Uuid::NAMESPACE_URL
    } else {
        &Uuid::NAMESPACE_DNS
    };
    encode(Uuid::new_v5(ns, name.as_bytes()).as_u128())
}

fn encode(mut n: u128) -> String {
    let base = ALPHABET.len() as u128;
    let mut digits = Vec::with_capacity(SHORT_LEN);
    while n > 0 {
        digits.push(ALPHABET[(n % base) as usize]);
        n /= base;
    }
    while digits.len() < SHORT_LEN {
        digits.push(ALPHABET[0]);
    }
    digits.reverse();
    // alphabet is ASCII
    String::from_utf8(digits).unwrap_or_default()
}

/// Public DIMES link for an ArchivesSpace URI.
pub fn collection_url(dimes_base: &str, archivesspace_uri: &str) -> String {
    format!(
        "{}/collections/{}",
        dimes_base.trim_end_matches('/'),
        short_uuid(archivesspace_uri)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_uuid_matches_reference_values() {
        assert_eq!(
            short_uuid("/repositories/2/resources/123"),
            "KzzfFRyLPVAUW3JzmPshB3"
        );
        assert_eq!(
            short_uuid("/repositories/2/resources/5"),
            "jGxoWBmSAhFSSzpbEnFzHp"
        );
        assert_eq!(short_uuid("https://example.org/x"), "o9wP8CNMWEuzGkPdiTPnxN");
    }

    #[test]
    fn encode_pads_small_values() {
        assert_eq!(encode(0), "2".repeat(SHORT_LEN));
        assert_eq!(encode(57), format!("{}32", "2".repeat(SHORT_LEN - 2)));
    }

    #[test]
    fn collection_url_tolerates_trailing_slash() {
        assert_eq!(
            collection_url("https://dimes.example/", "/repositories/2/resources/5"),
            "https://dimes.example/collections/jGxoWBmSAhFSSzpbEnFzHp"
        );
    }
}
