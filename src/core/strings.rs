//! String generation helpers: URL slugs and throwaway tokens

/// Generate a URL slug from free text.
///
/// The transform: lowercase, trim, drop every character that is not an
/// ASCII word character, whitespace or hyphen, then collapse each run of
/// whitespace/underscores/hyphens into a single hyphen with no hyphen at
/// either edge.
///
/// # Examples
///
/// ```
/// use catalog::core::strings::generate_slug;
///
/// assert_eq!(generate_slug("Wireless Mouse"), "wireless-mouse");
/// assert_eq!(generate_slug("Café Crème!!  2024"), "caf-crme-2024");
/// ```
pub fn generate_slug(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for c in lowered.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator {
                slug.push('-');
                pending_separator = false;
            }
            slug.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            // Separator runs collapse to one hyphen, and only between
            // kept characters.
            pending_separator = !slug.is_empty();
        }
        // Everything else (punctuation, non-ASCII letters) is dropped.
    }

    slug
}

/// Generate a pseudo-random numeric token prefixed with `P`.
///
/// The token is derived from a scaled random fraction and carries at most
/// `length` digits. NOT cryptographically secure — this is a convenience
/// generator for throwaway values, unsuitable for issuing real credentials.
pub fn generate_password(length: u32) -> String {
    let scaled = rand::random::<f64>() * 10f64.powi(length as i32);
    format!("P{}", scaled.floor() as u64)
}
