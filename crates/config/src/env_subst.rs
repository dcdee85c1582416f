/// Replace `${ENV_VAR}` and `${ENV_VAR:-default}` placeholders in raw config text.
///
/// Unresolvable variables without a default are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Replace placeholders using a custom lookup function.
///
/// Testable without mutating the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder literally.
            result.push_str(&rest[start..]);
            return result;
        };

        let body = &after[..end];
        let (name, default) = match body.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name).filter(|v| !v.is_empty()), default) {
            (false, Some(value), _) => result.push_str(&value),
            (false, None, Some(default)) => result.push_str(default),
            _ => {
                result.push_str("${");
                result.push_str(body);
                result.push('}');
            },
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}
