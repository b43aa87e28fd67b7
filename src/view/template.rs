use serde::{Serialize, Serializer};
use std::fmt;

/// Engine suffix used when a reference does not name one.
pub const DEFAULT_ENGINE: &str = "jinja";

/// Structured template identifier: `Bundle:Controller:name.format.engine`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateReference {
    pub bundle: String,
    pub controller: String,
    pub name: String,
    pub format: String,
    pub engine: String,
}

impl TemplateReference {
    pub fn new(
        bundle: impl Into<String>,
        controller: impl Into<String>,
        name: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            bundle: bundle.into(),
            controller: controller.into(),
            name: name.into(),
            format: format.into(),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn logical_name(&self) -> String {
        format!(
            "{}:{}:{}.{}.{}",
            self.bundle, self.controller, self.name, self.format, self.engine
        )
    }

    /// Parse a logical name. Returns `None` for anything that is not of the
    /// `Bundle:Controller:name.format.engine` shape.
    pub fn parse(logical_name: &str) -> Option<Self> {
        let mut segments = logical_name.split(':');
        let (bundle, controller, file) = (segments.next()?, segments.next()?, segments.next()?);
        if segments.next().is_some() || bundle.is_empty() {
            return None;
        }

        let mut parts = file.rsplitn(3, '.');
        let (engine, format, name) = (parts.next()?, parts.next()?, parts.next()?);
        if name.is_empty() || format.is_empty() || engine.is_empty() {
            return None;
        }
        Some(Self::new(bundle, controller, name, format).with_engine(engine))
    }
}

impl fmt::Display for TemplateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.logical_name())
    }
}

/// A template as carried by a [`View`](crate::view::View).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Template {
    Reference(TemplateReference),
    /// A plain engine path such as `errors/404.html`.
    Name(String),
}

impl Template {
    pub fn parse(raw: &str) -> Self {
        TemplateReference::parse(raw)
            .map(Template::Reference)
            .unwrap_or_else(|| Template::Name(raw.to_string()))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Reference(reference) => reference.fmt(f),
            Template::Name(name) => f.write_str(name),
        }
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<TemplateReference> for Template {
    fn from(reference: TemplateReference) -> Self {
        Template::Reference(reference)
    }
}

impl From<&str> for Template {
    fn from(raw: &str) -> Self {
        Template::parse(raw)
    }
}

impl From<String> for Template {
    fn from(raw: String) -> Self {
        Template::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_name_round_trip() {
        let reference = TemplateReference::new("FrameworkBundle", "Exception", "error", "json");
        assert_eq!(
            reference.logical_name(),
            "FrameworkBundle:Exception:error.json.jinja"
        );
        assert_eq!(
            TemplateReference::parse(&reference.logical_name()),
            Some(reference)
        );
    }

    #[test]
    fn test_parse_dotted_names_and_empty_controller() {
        let reference = TemplateReference::parse("AcmeBundle::layout.base.html.twig").unwrap();
        assert_eq!(reference.controller, "");
        assert_eq!(reference.name, "layout.base");
        assert_eq!(reference.format, "html");
        assert_eq!(reference.engine, "twig");
    }

    #[test]
    fn test_plain_names_stay_plain() {
        assert_eq!(
            Template::parse("errors/404.html"),
            Template::Name("errors/404.html".to_string())
        );
        assert!(TemplateReference::parse("Acme:Foo:index").is_none());
        assert!(TemplateReference::parse(":Foo:index.html.jinja").is_none());
        assert!(TemplateReference::parse("a:b:c:d.html.jinja").is_none());
    }
}
