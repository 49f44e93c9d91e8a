//! MiniJinja template engine wrapper

use minijinja::{context, Environment, Error, Value};
use anyhow::Result;

const CHAT_TEMPLATE: &str = include_str!("../../web/templates/chat.html");

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_debug(cfg!(debug_assertions));

        env.add_template("chat.html", CHAT_TEMPLATE)?;
        env.add_filter("truncate", truncate_text);

        Ok(Self { env })
    }

    /// Render a template with context
    pub fn render(&self, template_name: &str, ctx: Value) -> Result<String> {
        let template = self.env.get_template(template_name)?;
        Ok(template.render(ctx)?)
    }

    /// Add a template from string - requires owned strings for 'static lifetime
    pub fn add_template_owned(&mut self, name: String, content: String) -> Result<()> {
        self.env.add_template_owned(name, content)?;
        Ok(())
    }

    /// Render the chat widget page
    pub fn render_chat_page(&self, title: &str, endpoint: &str) -> Result<String> {
        self.render("chat.html", context! {
            title => title,
            endpoint => endpoint,
            fallback => crate::widget::FALLBACK_REPLY,
            version => env!("CARGO_PKG_VERSION"),
        })
    }
}

fn truncate_text(value: &Value, length: Option<usize>) -> Result<Value, Error> {
    let text = value.as_str().ok_or_else(|| {
        Error::new(minijinja::ErrorKind::InvalidOperation, "expected string")
    })?;

    let max_length = length.unwrap_or(50);
    if text.chars().count() <= max_length {
        Ok(Value::from(text))
    } else {
        let cut: String = text.chars().take(max_length).collect();
        Ok(Value::from(format!("{}...", cut)))
    }
}
