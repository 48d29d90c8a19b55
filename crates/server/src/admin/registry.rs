//! Static configuration of the admin site.
//!
//! Every entity editable through `/admin/` has one [`ModelAdmin`] entry in
//! [`SITE`]. Entities without an entry (reviews, users) are not reachable on
//! their own.

use serde::Serialize;

use crate::ServerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    AppEntry,
    Store,
    Certificate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    FileUpload,
    FilterHorizontal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineStyle {
    Tabular,
}

/// A child entity edited on its parent's form.
#[derive(Debug, Serialize)]
pub struct Inline {
    /// Prefix of the inline's form fields, e.g. `reviews-0-rating`.
    pub prefix: &'static str,
    pub verbose_name_plural: &'static str,
    pub style: InlineStyle,
    /// Number of blank rows offered below the existing ones.
    pub extra: usize,
}

#[derive(Debug, Serialize)]
pub struct ModelAdmin {
    pub kind: Kind,
    pub slug: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub inlines: &'static [Inline],
    pub widgets: &'static [(&'static str, Widget)],
}

impl ModelAdmin {
    pub fn widget(&self, field: &str) -> Option<Widget> {
        self.widgets
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, widget)| *widget)
    }

    pub fn changelist_url(&self) -> String {
        format!("/admin/{}/", self.slug)
    }
}

pub static SITE: [ModelAdmin; 3] = [
    ModelAdmin {
        kind: Kind::AppEntry,
        slug: "appentry",
        verbose_name: "app entry",
        verbose_name_plural: "app entries",
        list_display: &["name", "category", "date_added", "is_active", "price"],
        inlines: &[Inline {
            prefix: "reviews",
            verbose_name_plural: "reviews",
            style: InlineStyle::Tabular,
            extra: 1,
        }],
        widgets: &[("image", Widget::FileUpload)],
    },
    ModelAdmin {
        kind: Kind::Store,
        slug: "store",
        verbose_name: "store",
        verbose_name_plural: "stores",
        list_display: &["name", "mother_company", "contact_number", "email"],
        inlines: &[],
        widgets: &[("app_varieties", Widget::FilterHorizontal)],
    },
    ModelAdmin {
        kind: Kind::Certificate,
        slug: "certificate",
        verbose_name: "certificate",
        verbose_name_plural: "certificates",
        list_display: &[
            "app",
            "certificate_name",
            "certificate_number",
            "issued_by",
            "issue_date",
            "expiry_date",
        ],
        inlines: &[],
        widgets: &[],
    },
];

pub fn lookup(slug: &str) -> Result<&'static ModelAdmin, ServerError> {
    SITE.iter()
        .find(|admin| admin.slug == slug)
        .ok_or_else(|| ServerError::NotFound(format!("admin for {slug}")))
}

/// Header text for a field name: `date_added` becomes `Date added`.
pub fn column_label(column: &str) -> String {
    let spaced = column.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
