//! Variable substitution for option text.
//!
//! References look like `$(label:name)`. The compiler awaits the resolver
//! wherever an option supports variables.

use std::future::Future;

use crate::state::Instance;

/// Resolves `$(label:name)` references inside option text.
pub trait VariableResolver: Send + Sync {
    fn resolve(&self, text: &str) -> impl Future<Output = String> + Send;
}

/// Leaves text untouched.
pub struct NoVariables;

impl VariableResolver for NoVariables {
    async fn resolve(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Resolves references against the instance's observed dynamic variables.
/// Only references carrying the configured instance label are substituted.
pub struct SessionVariables<'a> {
    pub instance: &'a Instance,
}

impl VariableResolver for SessionVariables<'_> {
    async fn resolve(&self, text: &str) -> String {
        let prefix = self.instance.settings.variable_prefix.as_str();
        self.instance.with_session(|session| {
            substitute(text, |label, name| {
                (label == prefix)
                    .then(|| session.variable(name).map(str::to_string))
                    .flatten()
            })
        })
    }
}

/// Replace every `$(label:name)` for which `lookup` yields a value. Unknown
/// references and malformed fragments are kept verbatim.
pub fn substitute<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str, &str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("$(") {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        let after = tail.strip_prefix("$(").unwrap_or(tail);
        let Some((reference, remainder)) = after.split_once(')') else {
            out.push_str(tail);
            return out;
        };
        let replaced = reference
            .split_once(':')
            .and_then(|(label, name)| lookup(label, name));
        match replaced {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("$(");
                out.push_str(reference);
                out.push(')');
            }
        }
        rest = remainder;
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::settings::ConnectionSettings;

    #[test]
    fn substitutes_known_references() {
        let out = substitute("Now: $(pp:current_slide) of $(pp:total)", |label, name| {
            (label == "pp" && name == "current_slide").then(|| "4".to_string())
        });
        assert_eq!(out, "Now: 4 of $(pp:total)");
    }

    #[test]
    fn unterminated_reference_is_kept() {
        assert_eq!(substitute("a $(pp:x", |_, _| Some("y".into())), "a $(pp:x");
    }

    #[tokio::test]
    async fn session_variables_use_instance_label() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| s.set_variable("current_presentation_path", "2:3"));
        let resolver = SessionVariables { instance: &instance };

        assert_eq!(
            resolver.resolve("$(propresenter:current_presentation_path)").await,
            "2:3"
        );
        assert_eq!(
            resolver.resolve("$(other:current_presentation_path)").await,
            "$(other:current_presentation_path)"
        );
    }
}
