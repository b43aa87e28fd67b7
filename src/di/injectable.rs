use crate::di::Container;
use crate::error::Result;

/// Types that can build themselves from the bootstrap container.
///
/// Implementations resolve every collaborator up front so the resulting value
/// never touches the container again while serving requests.
pub trait Injectable: Sized + Send + Sync + 'static {
    /// # Errors
    /// Returns an error if a required service or parameter is missing.
    fn inject(container: &Container) -> Result<Self>;
}
