use regex::{Captures, Regex};
use std::sync::LazyLock;

static REGEX_ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(\w+)\}|\$(\w+)|%(\w+)%").expect("Invalid regex")
});

/// 展開路徑中的 `$VAR`、`${VAR}` 與 `%VAR%`，未定義的變數保持原樣
#[must_use]
pub fn expand_env_vars(input: &str) -> String {
    expand_env_vars_with(input, |name| std::env::var(name).ok())
}

pub fn expand_env_vars_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    REGEX_ENV_VAR
        .replace_all(input, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "ASTRO" => Some("/mnt/astro".to_string()),
            "STAGE" => Some("10_Blink".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_expands_all_forms() {
        assert_eq!(expand_env_vars_with("$ASTRO/x", lookup), "/mnt/astro/x");
        assert_eq!(
            expand_env_vars_with("${ASTRO}/${STAGE}", lookup),
            "/mnt/astro/10_Blink"
        );
        assert_eq!(expand_env_vars_with("%ASTRO%\\data", lookup), "/mnt/astro\\data");
    }

    #[test]
    fn test_unknown_variable_is_kept() {
        assert_eq!(expand_env_vars_with("$NOPE/lights", lookup), "$NOPE/lights");
    }

    #[test]
    fn test_plain_path_is_untouched() {
        assert_eq!(expand_env_vars_with("/data/10_Blink", lookup), "/data/10_Blink");
    }
}
