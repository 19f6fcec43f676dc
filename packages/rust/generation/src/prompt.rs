//! Prompt template for description generation.

use std::path::Path;

use descenhancer_shared::{EnhancerError, ProductRecord, Result};

const NAME: &str = "{name}";
const SHORT_DESCRIPTION: &str = "{short_description}";
const LONG_DESCRIPTION: &str = "{long_description}";

/// Built-in SEO brief. Placeholders are filled per product.
const DEFAULT_TEMPLATE: &str = "\
### SEO optimization
Write a new long product description, or rework the existing one, so that it is
optimized for search engines and unique to this product. Use only the data below.
Favor specific terms so this page does not compete with sibling products for the
same keywords.

### Long description
1. Overview: three or more paragraphs highlighting what is most distinctive about
   the product, without mentioning its name.
2. Key features: lead with the most important ones.

### Product data
- Product: {name}
- Long description: {long_description}
- Short description: {short_description}
";

/// A user-prompt template with `{name}`, `{short_description}` and
/// `{long_description}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Use `text` as the template. It must reference at least `{name}`.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if !text.contains(NAME) {
            return Err(EnhancerError::validation(format!(
                "prompt template must contain the {NAME} placeholder"
            )));
        }
        Ok(Self { text })
    }

    /// Load a template from a UTF-8 text file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EnhancerError::io(path, e))?;
        Self::new(text)
    }

    /// Fill the placeholders from `product` in a single pass.
    ///
    /// Placeholder-like text inside the product data is copied verbatim.
    pub fn render(&self, product: &ProductRecord) -> String {
        let mut out = String::with_capacity(self.text.len() + product.long_description.len());
        let mut rest = self.text.as_str();

        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            let (value, consumed) = if tail.starts_with(NAME) {
                (product.name.as_str(), NAME.len())
            } else if tail.starts_with(SHORT_DESCRIPTION) {
                (product.short_description.as_str(), SHORT_DESCRIPTION.len())
            } else if tail.starts_with(LONG_DESCRIPTION) {
                (product.long_description.as_str(), LONG_DESCRIPTION.len())
            } else {
                ("{", 1)
            };
            out.push_str(value);
            rest = &tail[consumed..];
        }

        out.push_str(rest);
        out
    }
}
