/// Checks whether a host belongs to a target host
///
/// Both hosts are compared lower-cased. A candidate matches when it is:
/// 1. Exactly the target: "shop.example" matches "shop.example"
/// 2. A strict subdomain of the target: "www.shop.example" and "eu.cdn.shop.example"
///    both match "shop.example"
///
/// A host that merely ends with the same characters ("myshop.example") does not match.
///
/// # Examples
///
/// ```
/// use product_scout::url::host_matches;
///
/// assert!(host_matches("shop.example", "shop.example"));
/// assert!(host_matches("WWW.Shop.Example", "shop.example"));
/// assert!(!host_matches("myshop.example", "shop.example"));
/// assert!(!host_matches("shop.example", "www.shop.example"));
/// ```
pub fn host_matches(candidate: &str, target: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let target = target.to_lowercase();

    if target.is_empty() {
        return false;
    }

    candidate == target || candidate.ends_with(&format!(".{}", target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(host_matches("shop.example", "shop.example"));
        assert!(host_matches("127.0.0.1", "127.0.0.1"));
    }

    #[test]
    fn test_subdomain_match() {
        assert!(host_matches("www.shop.example", "shop.example"));
        assert!(host_matches("a.b.shop.example", "shop.example"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(host_matches("Shop.EXAMPLE", "shop.example"));
        assert!(host_matches("shop.example", "SHOP.example"));
    }

    #[test]
    fn test_suffix_without_dot_boundary() {
        assert!(!host_matches("myshop.example", "shop.example"));
        assert!(!host_matches("shop.example.evil", "shop.example"));
    }

    #[test]
    fn test_parent_does_not_match_subdomain_target() {
        assert!(!host_matches("shop.example", "eu.shop.example"));
    }

    #[test]
    fn test_empty_target() {
        assert!(!host_matches("shop.example", ""));
    }
}
