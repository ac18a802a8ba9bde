//! `{{ field }}` placeholder expansion over a `MessageContext`.

use crate::domain::{DomainError, MessageContext};
use crate::ports::MessageTemplateResolver;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Default template resolver. Pure string substitution, no I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderTemplateResolver;

impl PlaceholderTemplateResolver {
    pub fn new() -> Self {
        Self
    }
}

/// Render `template` against `context`.
///
/// Fails on an unclosed `{{`, an empty placeholder, or a field name the context
/// does not know. A stray `}}` is kept as literal text.
pub fn render(context: &MessageContext, template: &str) -> Result<String, DomainError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let offset = template.len() - rest.len() + start;
        let after = &rest[start + OPEN.len()..];

        let end = after.find(CLOSE).ok_or_else(|| {
            DomainError::Template(format!("unclosed placeholder at byte {}", offset))
        })?;
        let key = after[..end].trim();
        if key.is_empty() {
            return Err(DomainError::Template(format!(
                "empty placeholder at byte {}",
                offset
            )));
        }
        let value = context.field(key).ok_or_else(|| {
            DomainError::Template(format!(
                "unknown placeholder '{}' (expected one of: {})",
                key,
                MessageContext::FIELDS.join(", ")
            ))
        })?;
        out.push_str(&value);
        rest = &after[end + CLOSE.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

#[async_trait::async_trait]
impl MessageTemplateResolver for PlaceholderTemplateResolver {
    async fn resolve(
        &self,
        context: &MessageContext,
        template: &str,
    ) -> Result<String, DomainError> {
        render(context, template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn context() -> MessageContext {
        MessageContext {
            name: "Jane Wanjiru".into(),
            first_name: "Jane".into(),
            phone: "+254711000111".into(),
            email: None,
            team: Some("Ops".into()),
            join_date: NaiveDate::from_ymd_opt(2021, 3, 9),
            organization: "Umoja Welfare".into(),
        }
    }

    #[test]
    fn test_substitutes_fields() {
        let out = render(&context(), "Hi {{name}}, {{ organization }} says hello").unwrap();
        assert_eq!(out, "Hi Jane Wanjiru, Umoja Welfare says hello");
    }

    #[test]
    fn test_optional_and_date_fields() {
        let out = render(&context(), "[{{email}}] {{first_name}} since {{join_date}}").unwrap();
        assert_eq!(out, "[] Jane since 2021-03-09");
    }

    #[test]
    fn test_plain_text_and_stray_close() {
        assert_eq!(render(&context(), "no placeholders }}").unwrap(), "no placeholders }}");
        assert_eq!(render(&context(), "").unwrap(), "");
    }

    #[test]
    fn test_malformed_templates() {
        assert!(matches!(
            render(&context(), "Hi {{name"),
            Err(DomainError::Template(_))
        ));
        assert!(matches!(
            render(&context(), "Hi {{  }}"),
            Err(DomainError::Template(_))
        ));
        assert!(matches!(
            render(&context(), "Hi {{balance}}"),
            Err(DomainError::Template(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let a = render(&context(), "{{team}}/{{phone}}").unwrap();
        let b = render(&context(), "{{team}}/{{phone}}").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "Ops/+254711000111");
    }
}
