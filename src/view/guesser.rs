use crate::error::{RestViewError, Result};
use crate::request::RequestAttributes;
use crate::view::TemplateReference;
use regex::Regex;
use std::sync::LazyLock;

/// A `controller` namespace segment, capturing the rest of the path up to the
/// trailing `Controller` suffix.
static CONTROLLER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|::|\\)[Cc]ontroller(?:::|\\)(.*)Controller$")
        .expect("controller name pattern is valid")
});

/// Length of the `Action` suffix stripped from action names.
const ACTION_SUFFIX_LEN: usize = 6;

/// The controller type and action that handled a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRef {
    pub class: String,
    pub action: String,
    /// Argument names of the action, used as default template variables.
    pub arguments: Vec<String>,
}

impl ControllerRef {
    pub fn new(class: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            action: action.into(),
            arguments: Vec::new(),
        }
    }

    /// Reference a controller by its Rust type path.
    pub fn of<T: ?Sized>(action: impl Into<String>) -> Self {
        Self::new(std::any::type_name::<T>(), action)
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub name: String,
    pub namespace: String,
}

impl Bundle {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    fn owns(&self, class: &str) -> bool {
        class
            .strip_prefix(self.namespace.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::") || rest.starts_with('\\'))
    }
}

/// Registered bundles, matched against controller type paths by namespace.
#[derive(Debug, Clone, Default)]
pub struct BundleRegistry {
    bundles: Vec<Bundle>,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        self.bundles.push(bundle);
        self
    }

    /// The bundle with the longest namespace containing `class`.
    pub fn bundle_for_class(&self, class: &str) -> Result<&Bundle> {
        self.bundles
            .iter()
            .filter(|bundle| bundle.owns(class))
            .max_by_key(|bundle| bundle.namespace.len())
            .ok_or_else(|| {
                RestViewError::invalid_argument(format!(
                    "The \"{}\" class does not belong to a registered bundle.",
                    class
                ))
            })
    }
}

/// Infers a template reference from the controller that handled a request.
#[derive(Debug, Clone, Default)]
pub struct TemplateGuesser {
    bundles: BundleRegistry,
}

impl TemplateGuesser {
    pub fn new(bundles: BundleRegistry) -> Self {
        Self { bundles }
    }

    /// `AcmeBundle::controller::PostController` + `showAction` becomes
    /// `Acme:Post:show.<format>.jinja`.
    pub fn guess_template_name(
        &self,
        controller: &ControllerRef,
        request: &RequestAttributes,
    ) -> Result<TemplateReference> {
        let captures = CONTROLLER_NAME.captures(&controller.class).ok_or_else(|| {
            RestViewError::invalid_argument(format!(
                "The \"{}\" class does not look like a controller class (it does not end with Controller)",
                controller.class
            ))
        })?;
        let bundle = self.bundles.bundle_for_class(&controller.class)?;

        let keep = controller
            .action
            .chars()
            .count()
            .saturating_sub(ACTION_SUFFIX_LEN);
        let name: String = controller.action.chars().take(keep).collect();

        // Nested namespaces become path segments so the logical name stays parseable.
        let controller_name = captures[1].replace("::", "/").replace('\\', "/");

        Ok(TemplateReference::new(
            bundle.name.as_str(),
            controller_name,
            name,
            request.format(),
        ))
    }
}
