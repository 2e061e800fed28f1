use ntex::web;
use std::{collections::HashMap, sync::LazyLock};
use tera::Tera;

use super::{errors, flash};

/// Html pages and the plain text confirmation emails
pub static WEB_TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::new("web/templates/**/*")
        .unwrap_or_else(|e| panic!("web templates couldnt be parsed: {e}"));
    tera.autoescape_on(vec![".html"]);
    tera.register_filter("money", money);
    tera
});

/// `{{ amount | money }}` prints a price with two decimals
fn money(value: &tera::Value, _: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let amount = match value {
        tera::Value::Number(n) => n.as_f64(),
        tera::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| tera::Error::msg(format!("money filter cant format {value}")))?;

    Ok(tera::Value::String(format!("{amount:.2}")))
}

/// Renders a full page. Pending flash messages are drained into `messages`.
pub fn render_page(
    template_name: &str,
    mut context: tera::Context,
    session: &ntex_session::Session,
    endpoint: &str,
) -> Result<web::HttpResponse, web::Error> {
    context.insert("messages", &flash::take(session));

    let content = WEB_TEMPLATES.render(template_name, &context).map_err(|e| {
        errors::ServerError::TemplateError(format!(
            "at {endpoint} endpoint the template couldnt be rendered: {e}"
        ))
    })?;

    Ok(web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_money_filter() {
        let args = HashMap::new();

        assert_eq!(money(&json!(2.5), &args).unwrap(), json!("2.50"));
        assert_eq!(money(&json!(60), &args).unwrap(), json!("60.00"));
        assert_eq!(money(&json!("27.48"), &args).unwrap(), json!("27.48"));
        assert!(money(&json!(null), &args).is_err());
    }
}
