//! Command template rendering.
//!
//! Backend commands are written with `{name}` and `{version}` placeholders.
//! Substituted values are shell-quoted so a package name can never inject
//! extra shell syntax.

/// Substitute `{key}` placeholders in `template`.
///
/// Unknown placeholders are left untouched. Values are quoted with
/// [`quote`] before substitution.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, &quote(value));
    }
    rendered
}

/// Quote a value for the platform shell if it contains anything beyond
/// a conservative set of safe characters.
pub fn quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._+-/:@=,".contains(c));
    if safe {
        return value.to_string();
    }

    if cfg!(target_os = "windows") {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_placeholders() {
        let cmd = render(
            "tool install {name} --min {version}",
            &[("name", "Git.Git"), ("version", "2.43.0")],
        );
        assert_eq!(cmd, "tool install Git.Git --min 2.43.0");
    }

    #[test]
    fn render_repeats_placeholders() {
        let cmd = render("{name} && {name}", &[("name", "a")]);
        assert_eq!(cmd, "a && a");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let cmd = render("tool {action} {name}", &[("name", "pkg")]);
        assert_eq!(cmd, "tool {action} pkg");
    }

    #[test]
    fn quote_passes_safe_values() {
        assert_eq!(quote("Microsoft.VCRedist.2015+.x64"), "Microsoft.VCRedist.2015+.x64");
        assert_eq!(quote("@scope/pkg"), "@scope/pkg");
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn quote_wraps_unsafe_values() {
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("x; rm -rf /"), "'x; rm -rf /'");
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote(""), "''");
    }
}
