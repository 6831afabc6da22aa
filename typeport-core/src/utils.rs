//! Case-conversion helpers for generated names and file paths.

/// Convert a name to PascalCase (e.g., "order_line" -> "OrderLine")
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert a name to camelCase (e.g., "OrderLine" -> "orderLine")
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Convert a name to snake_case (e.g., "OrderLine" -> "order_line")
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a name to kebab-case (e.g., "OrderLine" -> "order-line")
pub fn to_kebab_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Split a name into words on `_`, `-`, and lower-to-upper transitions.
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in s.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        } else {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("order"), "Order");
        assert_eq!(to_pascal_case("order_line"), "OrderLine");
        assert_eq!(to_pascal_case("orderLine"), "OrderLine");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("OrderLine"), "orderLine");
        assert_eq!(to_camel_case("order_line"), "orderLine");
        assert_eq!(to_camel_case("order"), "order");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("OrderLine"), "order_line");
        assert_eq!(to_snake_case("order-line"), "order_line");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_to_kebab_case() {
        assert_eq!(to_kebab_case("OrderLine"), "order-line");
        assert_eq!(to_kebab_case("order_line"), "order-line");
        assert_eq!(to_kebab_case("HTTPServer"), "httpserver");
    }
}
