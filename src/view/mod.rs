//! Error views rendered with handlebars

use crate::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

pub const NOTICE_TEMPLATE: &str = "errors.notice";

const NOTICE_SOURCE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{{title}} | {{app_name}}</title>
</head>
<body>
    <main class="notice notice-{{status}}">
        <h1>{{title}}</h1>
        <p>{{description}}</p>
    </main>
</body>
</html>
"#;

/// Data handed to the `errors.notice` view
#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    pub title: String,
    pub description: String,
    pub app_name: String,
    pub status: u16,
}

impl NoticeView {
    /// Minimal page used when the registered template cannot be rendered
    pub fn fallback_html(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>{}</title></head><body><h1>{}</h1><p>{}</p></body></html>",
            handlebars::html_escape(&self.title),
            handlebars::html_escape(&self.title),
            handlebars::html_escape(&self.description),
        )
    }
}

/// Template registry for error pages
pub struct ViewRenderer {
    registry: Handlebars<'static>,
}

impl ViewRenderer {
    /// Registry preloaded with the built-in `errors.notice` view
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_template_string(NOTICE_TEMPLATE, NOTICE_SOURCE)?;
        Ok(Self { registry })
    }

    /// Register or replace a template by name
    pub fn register_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.registry.register_template_string(name, source)?;
        Ok(())
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        Ok(self.registry.render(name, data)?)
    }
}
