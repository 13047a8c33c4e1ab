use rand::Rng;

/// Base-36 alphabet for the random half of a redemption code.
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RANDOM_LEN: usize = 8;
const PREFIX_LEN: usize = 4;
const FALLBACK_PREFIX: &str = "TKT";

/// Builds a human-enterable redemption code: up to four characters derived
/// from the item id, upper-cased, then a dash and eight random base-36
/// characters. Uniqueness is enforced by the ticket store's unique index;
/// callers regenerate on collision.
pub fn redemption_code(item_id: &str) -> String {
    let prefix: String = item_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(PREFIX_LEN)
        .collect::<String>()
        .to_uppercase();
    let prefix = if prefix.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    };

    let mut rng = rand::thread_rng();
    let random: String = (0..RANDOM_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();

    format!("{}-{}", prefix, random)
}
