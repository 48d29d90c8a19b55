//! HTML templates, compiled into the binary and parsed once at start-up.

use axum::response::Html;
use tera::{Context, Tera};

use crate::ServerError;

const TEMPLATES: [(&str, &str); 9] = [
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("miniapp/index.html", include_str!("../templates/miniapp/index.html")),
    ("miniapp/detail.html", include_str!("../templates/miniapp/detail.html")),
    ("miniapp/stores.html", include_str!("../templates/miniapp/stores.html")),
    ("admin/base.html", include_str!("../templates/admin/base.html")),
    ("admin/index.html", include_str!("../templates/admin/index.html")),
    ("admin/change_list.html", include_str!("../templates/admin/change_list.html")),
    ("admin/change_form.html", include_str!("../templates/admin/change_form.html")),
];

#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, ServerError> {
        Ok(Html(self.tera.render(name, context)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_parse() {
        let templates = Templates::new().unwrap();
        for (name, _) in TEMPLATES {
            assert!(templates.tera.get_template_names().any(|n| n == name));
        }
    }

    #[test]
    fn home_extends_base() {
        let templates = Templates::new().unwrap();
        let Html(body) = templates.render("home.html", &Context::new()).unwrap();
        assert!(body.contains("<nav"));
        assert!(body.contains("href=\"/miniapp/\""));
    }
}
